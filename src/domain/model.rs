use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Storage-change notification for a single object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub bucket: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// GCS reports object sizes as decimal strings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_created: Option<DateTime<Utc>>,
}

impl Notification {
    pub fn new(bucket: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            name: name.into(),
            content_type: None,
            size: None,
            generation: None,
            time_created: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    /// `remote:bucket/path`
    pub source: String,
    /// `remote:bucket`
    pub destination: String,
}

impl TransferRequest {
    pub fn new(source_remote: &str, notification: &Notification, destination: &str) -> Self {
        Self {
            source: format!(
                "{}:{}/{}",
                source_remote, notification.bucket, notification.name
            ),
            destination: destination.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeliveryOutcome {
    Skipped {
        name: String,
    },
    Delivered {
        source: String,
        destination: String,
    },
    TransferFailed {
        source: String,
        destination: String,
        stderr: String,
    },
}

impl DeliveryOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }

    pub fn message(&self) -> String {
        match self {
            Self::Skipped { name } => format!("Skipped {}: outside the trigger folder", name),
            Self::Delivered {
                source,
                destination,
            } => format!("Copied {} to {}", source, destination),
            Self::TransferFailed {
                source,
                destination,
                stderr,
            } => format!(
                "Copy of {} to {} failed: {}",
                source,
                destination,
                stderr.trim()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_parses_gcs_payload() {
        let payload = serde_json::json!({
            "bucket": "src-bucket",
            "name": "processed/2024/file.tif",
            "contentType": "image/tiff",
            "size": "1024",
            "generation": "1712345678901234",
            "timeCreated": "2024-04-05T10:00:00.000Z",
            "metageneration": "1"
        });

        let notification: Notification = serde_json::from_value(payload).unwrap();
        assert_eq!(notification.bucket, "src-bucket");
        assert_eq!(notification.name, "processed/2024/file.tif");
        assert_eq!(notification.content_type.as_deref(), Some("image/tiff"));
        assert!(notification.time_created.is_some());
    }

    #[test]
    fn test_notification_requires_bucket_and_name() {
        let result: std::result::Result<Notification, _> =
            serde_json::from_value(serde_json::json!({ "bucket": "src-bucket" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_transfer_request_uses_path_verbatim() {
        let notification = Notification::new("src-bucket", "processed/a b/../c.tif");
        let request = TransferRequest::new("gcs", &notification, "otc:planet-data-prod");
        assert_eq!(request.source, "gcs:src-bucket/processed/a b/../c.tif");
        assert_eq!(request.destination, "otc:planet-data-prod");
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let outcome = DeliveryOutcome::Skipped {
            name: "raw/file.tif".to_string(),
        };
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["status"], "skipped");
        assert_eq!(value["name"], "raw/file.tif");
    }
}
