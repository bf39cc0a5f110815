use crate::utils::error::{DeliveryError, Result};
use std::fmt;

pub const OTC_ACCESS_KEY: &str = "OTC_ACCESS_KEY";
pub const OTC_SECRET_KEY: &str = "OTC_SECRET_KEY";
pub const OTC_ENDPOINT: &str = "OTC_ENDPOINT";
pub const GCS_SERVICE_ACCOUNT_FILE: &str = "GCS_SERVICE_ACCOUNT_FILE";

/// Secrets for the two rclone remotes, as injected through the environment.
#[derive(Clone, PartialEq, Eq)]
pub struct RemoteCredentials {
    pub otc_access_key: String,
    pub otc_secret_key: String,
    pub otc_endpoint: String,
    pub gcs_service_account_file: String,
}

impl RemoteCredentials {
    /// Reads all four values, failing on the first one that is missing or empty.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| {
                    DeliveryError::configuration(format!(
                        "Missing required environment variable: {}",
                        key
                    ))
                })
        };

        Ok(Self {
            otc_access_key: required(OTC_ACCESS_KEY)?,
            otc_secret_key: required(OTC_SECRET_KEY)?,
            otc_endpoint: required(OTC_ENDPOINT)?,
            gcs_service_account_file: required(GCS_SERVICE_ACCOUNT_FILE)?,
        })
    }
}

impl fmt::Debug for RemoteCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteCredentials")
            .field("otc_access_key", &"<redacted>")
            .field("otc_secret_key", &"<redacted>")
            .field("otc_endpoint", &self.otc_endpoint)
            .field("gcs_service_account_file", &self.gcs_service_account_file)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_env(key: &str) -> Option<String> {
        match key {
            OTC_ACCESS_KEY => Some("AKIA123".to_string()),
            OTC_SECRET_KEY => Some("s3cr3t".to_string()),
            OTC_ENDPOINT => Some("https://obs.eu-de.otc.t-systems.com".to_string()),
            GCS_SERVICE_ACCOUNT_FILE => Some("/secrets/sa.json".to_string()),
            _ => None,
        }
    }

    #[test]
    fn test_reads_all_four_values() {
        let creds = RemoteCredentials::from_lookup(full_env).unwrap();
        assert_eq!(creds.otc_access_key, "AKIA123");
        assert_eq!(creds.gcs_service_account_file, "/secrets/sa.json");
    }

    #[test]
    fn test_missing_value_names_the_variable() {
        let err = RemoteCredentials::from_lookup(|key| {
            if key == OTC_ENDPOINT {
                None
            } else {
                full_env(key)
            }
        })
        .unwrap_err();

        assert!(matches!(err, DeliveryError::ConfigurationError { .. }));
        assert!(err.to_string().contains("OTC_ENDPOINT"));
    }

    #[test]
    fn test_empty_value_counts_as_missing() {
        let err = RemoteCredentials::from_lookup(|key| {
            if key == GCS_SERVICE_ACCOUNT_FILE {
                Some(String::new())
            } else {
                full_env(key)
            }
        })
        .unwrap_err();

        assert!(err.to_string().contains("GCS_SERVICE_ACCOUNT_FILE"));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let creds = RemoteCredentials::from_lookup(full_env).unwrap();
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("AKIA123"));
        assert!(!debug.contains("s3cr3t"));
        assert!(debug.contains("obs.eu-de"));
    }
}
