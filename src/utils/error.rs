use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("Failed to download rclone from {url}: {message}")]
    DownloadError { url: String, message: String },

    #[error("Failed to extract rclone archive {}: {message}", .archive.display())]
    ExtractionError { archive: PathBuf, message: String },

    #[error("Expected rclone binary not found at: {}", .path.display())]
    MissingBinaryError { path: PathBuf },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("rclone copy of {source_path} failed ({status}): {stderr}")]
    TransferError {
        source_path: String,
        status: String,
        stderr: String,
    },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Install,
    Configuration,
    Transfer,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl DeliveryError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::DownloadError { .. }
            | Self::ExtractionError { .. }
            | Self::MissingBinaryError { .. }
            | Self::HttpError(_) => ErrorCategory::Install,
            Self::ConfigurationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::TomlError(_) => ErrorCategory::Configuration,
            Self::TransferError { .. } => ErrorCategory::Transfer,
            Self::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Transfer => ErrorSeverity::Medium,
            ErrorCategory::Install => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// Process exit code for command-line callers.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::DownloadError { .. } | Self::HttpError(_) => {
                "Check network egress to the rclone download server and the configured version"
            }
            Self::ExtractionError { .. } => {
                "The downloaded archive is corrupt; check the download URL and free disk space"
            }
            Self::MissingBinaryError { .. } => {
                "Check that RCLONE_VERSION and RCLONE_PLATFORM match a published release"
            }
            Self::ConfigurationError { .. } | Self::InvalidConfigValueError { .. } => {
                "Set OTC_ACCESS_KEY, OTC_SECRET_KEY, OTC_ENDPOINT and GCS_SERVICE_ACCOUNT_FILE"
            }
            Self::TomlError(_) => "Fix the syntax of the delivery configuration file",
            Self::TransferError { .. } => {
                "Inspect the rclone stderr above; check remote credentials and bucket permissions"
            }
            Self::IoError(_) => "Check permissions and free space in the scratch directory",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::DownloadError { url, .. } => format!("Could not download rclone from {}", url),
            Self::ExtractionError { .. } => {
                "Could not unpack the rclone archive".to_string()
            }
            Self::MissingBinaryError { path } => {
                format!("rclone binary missing after extraction: {}", path.display())
            }
            Self::ConfigurationError { message } => format!("Configuration problem: {}", message),
            Self::TransferError { source_path, .. } => {
                format!("Copying {} to the destination failed", source_path)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DeliveryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_errors_are_medium_severity() {
        let err = DeliveryError::MissingBinaryError {
            path: PathBuf::from("/tmp/x/rclone"),
        };
        assert_eq!(err.category(), ErrorCategory::Install);
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert!(err.to_string().contains("/tmp/x/rclone"));
    }

    #[test]
    fn test_transfer_error_carries_stderr() {
        let err = DeliveryError::TransferError {
            source_path: "gcs:b/processed/a".to_string(),
            status: "exit status: 1".to_string(),
            stderr: "permission denied".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Transfer);
        assert!(err.to_string().contains("permission denied"));
    }

    #[test]
    fn test_exit_codes_follow_severity() {
        let download = DeliveryError::DownloadError {
            url: "https://downloads.rclone.org/v1.68.2/x.zip".to_string(),
            message: "HTTP 503".to_string(),
        };
        assert_eq!(download.exit_code(), 2);
        assert_eq!(DeliveryError::configuration("x").exit_code(), 1);
        assert_eq!(
            DeliveryError::IoError(std::io::Error::other("disk full")).exit_code(),
            3
        );
    }

    #[test]
    fn test_configuration_error_is_high_severity() {
        let err = DeliveryError::configuration("OTC_ENDPOINT is not set");
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert_eq!(
            err.user_friendly_message(),
            "Configuration problem: OTC_ENDPOINT is not set"
        );
    }
}
