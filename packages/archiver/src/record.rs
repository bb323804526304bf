//! Archived metadata as seen by the image downloader.

use midjourney_client::{JobId, UPSCALE};
use serde_json::Value;

/// Fields every archived record must carry, whatever its type.
const REQUIRED_FIELDS: [&str; 3] = ["id", "type", "image_paths"];

/// An archived upscale job, reduced to what the downloader needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivedJob {
    pub id: JobId,
    pub image_paths: Vec<String>,
}

/// Result of reading one metadata file. Invalid files are an expected
/// outcome of the walk, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataOutcome {
    Upscale(ArchivedJob),
    /// A well-formed record of another job type; nothing to download.
    Ignored,
    Invalid { reason: String },
}

impl MetadataOutcome {
    pub fn from_json(text: &str) -> Self {
        match serde_json::from_str::<Value>(text) {
            Ok(value) => Self::from_value(&value),
            Err(e) => Self::invalid(format!("not JSON: {e}")),
        }
    }

    /// Only presence of the required fields decides validity; their shapes
    /// matter once the record is known to be an upscale job.
    pub fn from_value(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self::invalid("not a JSON object");
        };
        if let Some(field) = REQUIRED_FIELDS.iter().find(|f| !object.contains_key(**f)) {
            return Self::invalid(format!("missing `{field}`"));
        }
        if object["type"].as_str() != Some(UPSCALE) {
            return Self::Ignored;
        }

        let Some(id) = JobId::from_value(&object["id"]) else {
            return Self::invalid("`id` is neither a string nor a number");
        };
        let Some(paths) = object["image_paths"].as_array() else {
            return Self::invalid("`image_paths` is not an array");
        };
        let Some(image_paths) = paths
            .iter()
            .map(|p| p.as_str().map(String::from))
            .collect::<Option<Vec<_>>>()
        else {
            return Self::invalid("non-string entry in `image_paths`");
        };

        Self::Upscale(ArchivedJob { id, image_paths })
    }

    fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_record() {
        let outcome = MetadataOutcome::from_value(&json!({
            "id": "abc",
            "type": "upscale",
            "image_paths": ["https://cdn.example.com/abc/0_0.png"],
            "prompt": "ignored",
        }));
        let MetadataOutcome::Upscale(job) = outcome else {
            panic!("expected upscale record");
        };
        assert_eq!(job.id.as_str(), "abc");
        assert_eq!(job.image_paths.len(), 1);
    }

    #[test]
    fn test_each_required_field() {
        let full = json!({ "id": "abc", "type": "grid", "image_paths": [] });
        for field in ["id", "type", "image_paths"] {
            let mut value = full.clone();
            value.as_object_mut().unwrap().remove(field);
            assert!(
                matches!(MetadataOutcome::from_value(&value), MetadataOutcome::Invalid { .. }),
                "expected invalid without `{field}`"
            );
        }
        assert_eq!(MetadataOutcome::from_value(&full), MetadataOutcome::Ignored);
    }

    #[test]
    fn test_other_types_are_ignored_whatever_their_shape() {
        for value in [
            json!({ "id": "x", "type": "grid", "image_paths": null }),
            json!({ "id": "x", "type": null, "image_paths": [] }),
            json!({ "id": null, "type": "variation", "image_paths": [1, 2] }),
        ] {
            assert_eq!(MetadataOutcome::from_value(&value), MetadataOutcome::Ignored);
        }
    }

    #[test]
    fn test_malformed_upscale_is_invalid() {
        for value in [
            json!({ "id": "x", "type": "upscale", "image_paths": null }),
            json!({ "id": "x", "type": "upscale", "image_paths": ["ok", 3] }),
            json!({ "id": null, "type": "upscale", "image_paths": [] }),
        ] {
            assert!(
                matches!(MetadataOutcome::from_value(&value), MetadataOutcome::Invalid { .. }),
                "expected invalid: {value}"
            );
        }
    }

    #[test]
    fn test_unparsable_text_is_invalid() {
        assert!(matches!(
            MetadataOutcome::from_json("{ not json"),
            MetadataOutcome::Invalid { .. }
        ));
        assert!(matches!(
            MetadataOutcome::from_json("[1, 2]"),
            MetadataOutcome::Invalid { .. }
        ));
    }
}
