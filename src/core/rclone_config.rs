use crate::config::RemoteCredentials;
use crate::domain::ports::ConfigMaterializer;
use crate::utils::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_DIR_NAME: &str = "rclone_config";
pub const CONFIG_FILE_NAME: &str = "rclone.conf";

/// Renders the `[otc]` and `[gcs]` remote sections.
///
/// Values are written verbatim; rclone's config parser takes everything after
/// `key = ` up to the end of the line.
pub fn render_config(credentials: &RemoteCredentials) -> String {
    format!(
        "[otc]\n\
         type = s3\n\
         provider = Other\n\
         access_key_id = {access_key}\n\
         secret_access_key = {secret_key}\n\
         endpoint = {endpoint}\n\
         \n\
         [gcs]\n\
         type = google cloud storage\n\
         service_account_file = {service_account_file}\n",
        access_key = credentials.otc_access_key,
        secret_key = credentials.otc_secret_key,
        endpoint = credentials.otc_endpoint,
        service_account_file = credentials.gcs_service_account_file,
    )
}

/// Writes `content` to `<scratch>/rclone_config/rclone.conf`, owner-readable only.
pub fn write_config_file(scratch: &Path, content: &str) -> Result<PathBuf> {
    let config_dir = scratch.join(CONFIG_DIR_NAME);
    fs::create_dir_all(&config_dir)?;
    let config_path = config_dir.join(CONFIG_FILE_NAME);

    fs::write(&config_path, content)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&config_path, fs::Permissions::from_mode(0o600))?;
    }

    Ok(config_path)
}

type EnvLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Reads remote credentials at materialization time and writes the config file.
pub struct EnvConfigMaterializer {
    lookup: EnvLookup,
}

impl EnvConfigMaterializer {
    pub fn from_process_env() -> Self {
        Self::with_lookup(|key| std::env::var(key).ok())
    }

    pub fn with_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            lookup: Box::new(lookup),
        }
    }
}

impl ConfigMaterializer for EnvConfigMaterializer {
    fn materialize(&self, scratch: &Path) -> Result<PathBuf> {
        // Validated before anything touches the filesystem
        let credentials = RemoteCredentials::from_lookup(|key| (self.lookup)(key))?;

        let config_path = write_config_file(scratch, &render_config(&credentials))?;
        tracing::info!("Rclone config file created at {}", config_path.display());
        Ok(config_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::credentials::{
        GCS_SERVICE_ACCOUNT_FILE, OTC_ACCESS_KEY, OTC_ENDPOINT, OTC_SECRET_KEY,
    };
    use crate::utils::error::DeliveryError;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    type Sections = BTreeMap<String, BTreeMap<String, String>>;

    fn parse_ini(content: &str) -> Sections {
        let mut sections = Sections::new();
        let mut current = None;
        for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                sections.entry(name.to_string()).or_default();
                current = Some(name.to_string());
            } else if let (Some(section), Some((key, value))) = (&current, line.split_once(" = ")) {
                sections
                    .get_mut(section)
                    .unwrap()
                    .insert(key.to_string(), value.to_string());
            }
        }
        sections
    }

    fn env(key: &str) -> Option<String> {
        match key {
            OTC_ACCESS_KEY => Some("A+/key==".to_string()),
            OTC_SECRET_KEY => Some("B secret;#x".to_string()),
            OTC_ENDPOINT => Some("https://obs.eu-de.otc.t-systems.com".to_string()),
            GCS_SERVICE_ACCOUNT_FILE => Some("/secrets/sa.json".to_string()),
            _ => None,
        }
    }

    #[test]
    fn test_config_parses_back_to_two_sections_with_literal_values() {
        let scratch = TempDir::new().unwrap();
        let path = EnvConfigMaterializer::with_lookup(env)
            .materialize(scratch.path())
            .unwrap();

        assert_eq!(
            path,
            scratch.path().join("rclone_config").join("rclone.conf")
        );

        let sections = parse_ini(&fs::read_to_string(&path).unwrap());
        assert_eq!(sections.keys().collect::<Vec<_>>(), vec!["gcs", "otc"]);

        let otc = &sections["otc"];
        assert_eq!(otc.len(), 5);
        assert_eq!(otc["type"], "s3");
        assert_eq!(otc["provider"], "Other");
        assert_eq!(otc["access_key_id"], "A+/key==");
        assert_eq!(otc["secret_access_key"], "B secret;#x");
        assert_eq!(otc["endpoint"], "https://obs.eu-de.otc.t-systems.com");

        let gcs = &sections["gcs"];
        assert_eq!(gcs.len(), 2);
        assert_eq!(gcs["type"], "google cloud storage");
        assert_eq!(gcs["service_account_file"], "/secrets/sa.json");
    }

    #[test]
    fn test_rendered_layout_matches_rclone_format() {
        let creds = RemoteCredentials::from_lookup(env).unwrap();
        assert_eq!(
            render_config(&creds),
            "[otc]\n\
             type = s3\n\
             provider = Other\n\
             access_key_id = A+/key==\n\
             secret_access_key = B secret;#x\n\
             endpoint = https://obs.eu-de.otc.t-systems.com\n\
             \n\
             [gcs]\n\
             type = google cloud storage\n\
             service_account_file = /secrets/sa.json\n"
        );
    }

    #[test]
    fn test_missing_variable_writes_nothing() {
        let scratch = TempDir::new().unwrap();
        let err = EnvConfigMaterializer::with_lookup(|key| {
            if key == OTC_SECRET_KEY {
                None
            } else {
                env(key)
            }
        })
        .materialize(scratch.path())
        .unwrap_err();

        assert!(matches!(err, DeliveryError::ConfigurationError { .. }));
        assert!(!scratch.path().join("rclone_config").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_config_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let scratch = TempDir::new().unwrap();
        let path = EnvConfigMaterializer::with_lookup(env)
            .materialize(scratch.path())
            .unwrap();
        let mode = fs::metadata(path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
