//! Date-partitioned archive paths.
//!
//! ```text
//! <root>/YYYY/YYYY-MM/YYYY-MM-DD/<YYYYMMDD-HHMMSS>_<job id>.json
//!                                <YYYYMMDD-HHMMSS>_<job id>.prompt.txt
//!                                <YYYYMMDD-HHMMSS>_<job id>[-N].<ext>
//! ```

use std::path::{Path, PathBuf};

use midjourney_client::{EnqueueTime, JobRecord};

pub const METADATA_EXTENSION: &str = "json";
pub const PROMPT_SUFFIX: &str = ".prompt.txt";

/// Day directory for a job enqueued at `time`.
pub fn day_dir(root: &Path, time: &EnqueueTime) -> PathBuf {
    let date = time.date();
    root.join(date.format("%Y").to_string())
        .join(date.format("%Y-%m").to_string())
        .join(date.format("%Y-%m-%d").to_string())
}

/// File stem shared by all of a job's files. Sorts chronologically within
/// a day directory.
pub fn job_stem(job: &JobRecord) -> String {
    let id: String = job
        .id
        .as_str()
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    format!(
        "{}_{}",
        job.enqueue_time.datetime().format("%Y%m%d-%H%M%S"),
        id
    )
}

pub fn metadata_path(root: &Path, job: &JobRecord) -> PathBuf {
    day_dir(root, &job.enqueue_time).join(format!("{}.{METADATA_EXTENSION}", job_stem(job)))
}

pub fn prompt_path(root: &Path, job: &JobRecord) -> PathBuf {
    day_dir(root, &job.enqueue_time).join(format!("{}{PROMPT_SUFFIX}", job_stem(job)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(id: &str, enqueue_time: &str) -> JobRecord {
        JobRecord::from_value(
            0,
            json!({ "id": id, "enqueue_time": enqueue_time, "prompt": "p" }),
        )
        .unwrap()
    }

    #[test]
    fn test_paths_are_date_partitioned() {
        let job = record("abc-123", "2023-04-09 17:05:03.250000");
        let root = Path::new("archive");
        assert_eq!(
            metadata_path(root, &job),
            Path::new("archive/2023/2023-04/2023-04-09/20230409-170503_abc-123.json")
        );
        assert_eq!(
            prompt_path(root, &job),
            Path::new("archive/2023/2023-04/2023-04-09/20230409-170503_abc-123.prompt.txt")
        );
    }

    #[test]
    fn test_date_only_enqueue_time_uses_midnight() {
        let job = record("x", "2022-12-31");
        assert_eq!(job_stem(&job), "20221231-000000_x");
    }

    #[test]
    fn test_separators_in_id_are_replaced() {
        let job = record("a/b", "2022-12-31 01:02:03.0");
        assert_eq!(job_stem(&job), "20221231-010203_a_b");
    }
}
