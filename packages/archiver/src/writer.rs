//! Persists job records into the archive.

use std::path::{Path, PathBuf};

use midjourney_client::JobRecord;

use crate::error::Result;
use crate::layout;

const WRAP_WIDTH: usize = 80;
const WRAP_INDENT: &str = "    ";

/// Writes a job's JSON record and its prompt summary. Existing files at the
/// computed paths are overwritten.
#[derive(Debug, Clone)]
pub struct MetadataWriter {
    root: PathBuf,
}

impl MetadataWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Archive one job, returning the path of its JSON file.
    pub async fn write_job(&self, job: &JobRecord) -> Result<PathBuf> {
        tracing::info!(
            job_id = %job.id,
            enqueue_time = job.enqueue_time.as_str(),
            "Archiving job metadata"
        );

        let dir = layout::day_dir(&self.root, &job.enqueue_time);
        tokio::fs::create_dir_all(&dir).await?;

        let metadata_path = layout::metadata_path(&self.root, job);
        let json = serde_json::to_string_pretty(job.raw())?;
        tokio::fs::write(&metadata_path, json).await?;

        tokio::fs::write(layout::prompt_path(&self.root, job), prompt_text(job)).await?;

        Ok(metadata_path)
    }
}

/// Prompt and full command under labeled headings, wrapped for reading.
pub fn prompt_text(job: &JobRecord) -> String {
    format!(
        "Prompt:\n{}\n\nFull command:\n{}\n",
        fill(&job.prompt),
        fill(job.full_command.as_deref().unwrap_or_default())
    )
}

/// Greedy word wrap to 80 columns with a 4-space indent on every line.
///
/// Whitespace characters become spaces and runs of them are kept, except
/// where a line breaks: there they are dropped. Words are never split, so an
/// overlong word gets a line of its own.
pub fn fill(text: &str) -> String {
    let budget = WRAP_WIDTH - WRAP_INDENT.len();
    let text: String = text
        .chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .collect();

    // Stack of chunks, next one on top
    let mut chunks: Vec<&str> = split_chunks(&text).into_iter().rev().collect();
    let mut lines: Vec<String> = Vec::new();

    while !chunks.is_empty() {
        if !lines.is_empty() && chunks.last().is_some_and(|c| is_blank(c)) {
            chunks.pop();
        }

        let mut line: Vec<&str> = Vec::new();
        let mut line_len = 0;
        while let Some(&chunk) = chunks.last() {
            let len = chunk.chars().count();
            if line_len + len > budget {
                break;
            }
            line.push(chunk);
            line_len += len;
            chunks.pop();
        }
        if line.is_empty() {
            line.extend(chunks.pop());
        }
        if line.last().is_some_and(|c| is_blank(c)) {
            line.pop();
        }

        if !line.is_empty() {
            lines.push(format!("{WRAP_INDENT}{}", line.concat()));
        }
    }

    lines.join("\n")
}

/// Split into alternating runs of spaces and non-spaces.
fn split_chunks(text: &str) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut in_blank = None;
    for (i, c) in text.char_indices() {
        let blank = c == ' ';
        if in_blank.is_some_and(|b| b != blank) {
            chunks.push(&text[start..i]);
            start = i;
        }
        in_blank = Some(blank);
    }
    if start < text.len() {
        chunks.push(&text[start..]);
    }
    chunks
}

fn is_blank(chunk: &str) -> bool {
    chunk.starts_with(' ')
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    fn record(value: Value) -> JobRecord {
        JobRecord::from_value(0, value).unwrap()
    }

    #[test]
    fn test_fill_wraps_at_80_columns() {
        let text = "word ".repeat(40);
        let filled = fill(&text);
        for line in filled.lines() {
            assert!(line.starts_with(WRAP_INDENT));
            assert!(line.chars().count() <= WRAP_WIDTH, "too long: {line:?}");
        }
        assert_eq!(filled.split_whitespace().count(), 40);
    }

    #[test]
    fn test_fill_keeps_long_words_and_hyphens_whole() {
        let long = "x".repeat(100);
        let text = format!("well-known {long} end");
        let filled = fill(&text);
        let lines: Vec<&str> = filled.lines().collect();
        let long_line = format!("    {long}");
        assert_eq!(lines, vec!["    well-known", long_line.as_str(), "    end"]);
    }

    #[test]
    fn test_fill_keeps_inner_whitespace_runs() {
        assert_eq!(fill("a  b"), "    a  b");
        assert_eq!(fill("a\tb\nc"), "    a b c");
    }

    #[test]
    fn test_fill_drops_whitespace_at_line_breaks() {
        let first = "x".repeat(74);
        let filled = fill(&format!("{first}   y  "));
        assert_eq!(filled, format!("    {first}\n    y"));
    }

    #[test]
    fn test_fill_empty() {
        assert_eq!(fill(""), "");
        assert_eq!(fill("   "), "");
    }

    #[test]
    fn test_prompt_text_layout() {
        let job = record(json!({
            "id": "j1",
            "enqueue_time": "2023-01-01 00:00:00.0",
            "prompt": "a cat",
            "full_command": "a cat --v 5",
        }));
        assert_eq!(
            prompt_text(&job),
            "Prompt:\n    a cat\n\nFull command:\n    a cat --v 5\n"
        );
    }

    #[tokio::test]
    async fn test_write_job_round_trips_and_overwrites() {
        let dir = TempDir::new().unwrap();
        let writer = MetadataWriter::new(dir.path());
        let value = json!({
            "id": "j1",
            "enqueue_time": "2023-01-01 08:09:10.111111",
            "prompt": "first",
            "full_command": "first --ar 1:1",
            "type": "upscale",
            "image_paths": ["https://cdn.example.com/j1/0_0.png"],
            "nested": { "seed": 7, "flags": [true, null] },
        });

        let path = writer.write_job(&record(value.clone())).await.unwrap();
        let written: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, value);

        // Idempotent directories, overwritten files
        let mut changed = value.clone();
        changed["prompt"] = json!("second");
        let again = writer.write_job(&record(changed.clone())).await.unwrap();
        assert_eq!(again, path);
        let written: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, changed);

        let prompt = std::fs::read_to_string(path.with_file_name("20230101-080910_j1.prompt.txt")).unwrap();
        assert!(prompt.starts_with("Prompt:\n    second\n"));
    }
}
