use crate::config::DeliveryConfig;
use crate::domain::ports::ToolInstaller;
use crate::utils::error::{DeliveryError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::Duration;
use zip::ZipArchive;

const BINARY_NAME: &str = "rclone";
const VERSION_MARKER: &str = ".installed-version";

/// Downloads and unpacks a pinned rclone release.
///
/// Without a cache directory every call re-fetches into the caller's scratch
/// directory. With one, a previously promoted binary whose version marker
/// matches is reused and the download is skipped.
#[derive(Debug, Clone)]
pub struct RcloneInstaller {
    client: Client,
    download_base_url: String,
    version: String,
    platform: String,
    cache_dir: Option<PathBuf>,
}

impl RcloneInstaller {
    pub fn new(
        download_base_url: impl Into<String>,
        version: impl Into<String>,
        platform: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            download_base_url: download_base_url.into(),
            version: version.into(),
            platform: platform.into(),
            cache_dir: None,
        }
    }

    pub fn from_config(config: &DeliveryConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.download_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            download_base_url: config.download_base_url.clone(),
            version: config.rclone_version.clone(),
            platform: config.rclone_platform.clone(),
            cache_dir: config.tool_cache_dir.clone(),
        })
    }

    pub fn with_cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(cache_dir.into());
        self
    }

    /// Top-level directory name inside the release archive, e.g. `rclone-v1.68.2-linux-amd64`.
    pub fn release_name(&self) -> String {
        format!("rclone-{}-{}", self.version, self.platform)
    }

    pub fn download_url(&self) -> String {
        format!(
            "{}/{}/{}.zip",
            self.download_base_url.trim_end_matches('/'),
            self.version,
            self.release_name()
        )
    }

    fn cached_binary(&self) -> Option<PathBuf> {
        let release_dir = self.cache_dir.as_ref()?.join(self.release_name());
        let binary = release_dir.join(BINARY_NAME);
        let marker = fs::read_to_string(release_dir.join(VERSION_MARKER)).ok()?;

        (marker.trim() == self.version && binary.is_file()).then_some(binary)
    }

    /// Download, extract and verify into `work_dir`, returning the binary path.
    async fn install_into(&self, work_dir: &Path) -> Result<PathBuf> {
        let release_dir = work_dir.join(self.release_name());
        let archive_path = work_dir.join(format!("{}.zip", self.release_name()));

        // Leftovers from an earlier attempt in the same directory
        if release_dir.exists() {
            fs::remove_dir_all(&release_dir)?;
        }
        if archive_path.exists() {
            fs::remove_file(&archive_path)?;
        }

        self.fetch(&archive_path).await?;
        extract_archive(&archive_path, work_dir)?;

        let binary = release_dir.join(BINARY_NAME);
        if !binary.is_file() {
            return Err(DeliveryError::MissingBinaryError { path: binary });
        }
        set_file_executable(&binary)?;

        Ok(binary)
    }

    async fn fetch(&self, archive_path: &Path) -> Result<()> {
        let url = self.download_url();
        tracing::debug!("Downloading rclone from {}", url);

        let download_error = |message: String| DeliveryError::DownloadError {
            url: url.clone(),
            message,
        };

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| download_error(e.to_string()))?;

        if !response.status().is_success() {
            return Err(download_error(format!("HTTP {}", response.status())));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| download_error(e.to_string()))?;

        tracing::debug!("Downloaded {} bytes to {}", bytes.len(), archive_path.display());
        fs::write(archive_path, &bytes)?;
        Ok(())
    }

    /// Moves a freshly installed release into the shared cache.
    ///
    /// Returns `None` when the rename fails, typically because another
    /// invocation promoted the same release first.
    fn promote(&self, cache_dir: &Path, staged_binary: &Path) -> Result<Option<PathBuf>> {
        let Some(staged_dir) = staged_binary.parent() else {
            return Ok(None);
        };
        // Another invocation already promoted this release; it may be running it
        if let Some(binary) = self.cached_binary() {
            return Ok(Some(binary));
        }

        let target_dir = cache_dir.join(self.release_name());
        fs::write(staged_dir.join(VERSION_MARKER), &self.version)?;

        if target_dir.exists() {
            // Only reached when the marker is missing or names another version
            if let Err(e) = fs::remove_dir_all(&target_dir) {
                tracing::warn!(
                    "Could not remove stale rclone cache entry {}: {}",
                    target_dir.display(),
                    e
                );
            }
        }

        match fs::rename(staged_dir, &target_dir) {
            Ok(()) => Ok(Some(target_dir.join(BINARY_NAME))),
            Err(e) => {
                tracing::debug!(
                    "Could not promote rclone into cache {}: {}",
                    target_dir.display(),
                    e
                );
                Ok(None)
            }
        }
    }

    async fn install_cached(&self, cache_dir: &Path, scratch: &Path) -> Result<PathBuf> {
        fs::create_dir_all(cache_dir)?;
        // Staged inside the cache so the final rename stays on one filesystem
        let staging = tempfile::Builder::new()
            .prefix(".staging-")
            .tempdir_in(cache_dir)?;
        let staged = self.install_into(staging.path()).await?;

        if let Some(binary) = self.promote(cache_dir, &staged)? {
            return Ok(binary);
        }
        if let Some(binary) = self.cached_binary() {
            return Ok(binary);
        }

        // Keep a private copy; the staging directory is removed on return
        let private_dir = scratch.join(self.release_name());
        fs::create_dir_all(&private_dir)?;
        let binary = private_dir.join(BINARY_NAME);
        fs::copy(&staged, &binary)?;
        set_file_executable(&binary)?;
        Ok(binary)
    }
}

#[async_trait]
impl ToolInstaller for RcloneInstaller {
    async fn install(&self, scratch: &Path) -> Result<PathBuf> {
        if let Some(binary) = self.cached_binary() {
            tracing::info!("Using cached rclone {} at {}", self.version, binary.display());
            return Ok(binary);
        }

        let binary = match &self.cache_dir {
            Some(cache_dir) => self.install_cached(cache_dir, scratch).await?,
            None => self.install_into(scratch).await?,
        };

        tracing::info!("Rclone installed successfully at {}", binary.display());
        Ok(binary)
    }
}

/// Unpacks every entry of `archive_path` below `dest`, skipping entries whose
/// names would escape it.
pub fn extract_archive(archive_path: &Path, dest: &Path) -> Result<()> {
    let extraction_error = |message: String| DeliveryError::ExtractionError {
        archive: archive_path.to_path_buf(),
        message,
    };

    let file = File::open(archive_path).map_err(|e| extraction_error(e.to_string()))?;
    let mut archive = ZipArchive::new(file).map_err(|e| extraction_error(e.to_string()))?;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| extraction_error(e.to_string()))?;
        let outpath = match entry.enclosed_name() {
            Some(path) => dest.join(path),
            None => {
                tracing::warn!("Skipping unsafe archive entry: {}", entry.name());
                continue;
            }
        };

        if entry.is_dir() {
            fs::create_dir_all(&outpath).map_err(|e| extraction_error(e.to_string()))?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            fs::create_dir_all(parent).map_err(|e| extraction_error(e.to_string()))?;
        }
        let mut outfile = File::create(&outpath).map_err(|e| extraction_error(e.to_string()))?;
        std::io::copy(&mut entry, &mut outfile).map_err(|e| extraction_error(e.to_string()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                fs::set_permissions(&outpath, fs::Permissions::from_mode(mode & 0o777))
                    .map_err(|e| extraction_error(e.to_string()))?;
            }
        }
    }

    Ok(())
}

/// Adds execute bits wherever the file already has read bits.
#[cfg(unix)]
pub fn set_file_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = fs::metadata(path)?.permissions();
    let mode = perms.mode();
    perms.set_mode(mode | ((mode & 0o444) >> 2));
    fs::set_permissions(path, perms)?;
    Ok(())
}

#[cfg(not(unix))]
pub fn set_file_executable(_path: &Path) -> Result<()> {
    Ok(())
}
