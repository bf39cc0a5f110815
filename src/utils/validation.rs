use crate::utils::error::{DeliveryError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field_name: &str, value: &str, reason: impl Into<String>) -> DeliveryError {
    DeliveryError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(invalid(field_name, url_str, "URL cannot be empty"));
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(invalid(
                field_name,
                url_str,
                format!("Unsupported URL scheme: {}", scheme),
            )),
        },
        Err(e) => Err(invalid(
            field_name,
            url_str,
            format!("Invalid URL format: {}", e),
        )),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(invalid(field_name, path, "Path cannot be empty"));
    }

    if path.contains('\0') {
        return Err(invalid(field_name, path, "Path contains null bytes"));
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(
            field_name,
            value,
            "Value cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(invalid(
            field_name,
            &value.to_string(),
            format!("Value must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

/// Checks the `remote:bucket[/path]` shape rclone expects for a remote location.
pub fn validate_remote_location(field_name: &str, value: &str) -> Result<()> {
    match value.split_once(':') {
        Some((remote, bucket)) if !remote.is_empty() && !bucket.is_empty() => {
            if remote.contains(char::is_whitespace) {
                return Err(invalid(field_name, value, "Remote name contains whitespace"));
            }
            Ok(())
        }
        _ => Err(invalid(
            field_name,
            value,
            "Expected a location of the form remote:bucket",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("download_base_url", "https://downloads.rclone.org").is_ok());
        assert!(validate_url("download_base_url", "http://127.0.0.1:8080").is_ok());
        assert!(validate_url("download_base_url", "").is_err());
        assert!(validate_url("download_base_url", "invalid-url").is_err());
        assert!(validate_url("download_base_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("download_timeout_secs", 300, 1, 3600).is_ok());
        assert!(validate_range("download_timeout_secs", 0, 1, 3600).is_err());
    }

    #[test]
    fn test_validate_remote_location() {
        assert!(validate_remote_location("destination", "otc:planet-data-prod").is_ok());
        assert!(validate_remote_location("destination", "otc:bucket/sub").is_ok());
        assert!(validate_remote_location("destination", "planet-data-prod").is_err());
        assert!(validate_remote_location("destination", "otc:").is_err());
        assert!(validate_remote_location("destination", ":bucket").is_err());
    }

    #[test]
    fn test_validate_path() {
        assert!(validate_path("scratch_root", "/tmp").is_ok());
        assert!(validate_path("scratch_root", "").is_err());
        assert!(validate_path("scratch_root", "/tmp/\0x").is_err());
    }
}
