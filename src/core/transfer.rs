use crate::domain::model::TransferRequest;
use crate::domain::ports::Transfer;
use crate::utils::error::{DeliveryError, Result};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// Runs `rclone copy <source> <destination> --config <file>` once.
#[derive(Debug, Clone, Default)]
pub struct RcloneTransfer;

impl RcloneTransfer {
    pub fn new() -> Self {
        Self
    }

    pub fn copy_args(config: &Path, request: &TransferRequest) -> Vec<OsString> {
        vec![
            "copy".into(),
            request.source.as_str().into(),
            request.destination.as_str().into(),
            "--config".into(),
            config.as_os_str().to_owned(),
        ]
    }
}

#[async_trait]
impl Transfer for RcloneTransfer {
    async fn copy(&self, tool: &Path, config: &Path, request: &TransferRequest) -> Result<()> {
        tracing::debug!(
            "Running {} copy {} {}",
            tool.display(),
            request.source,
            request.destination
        );

        let output = Command::new(tool)
            .args(Self::copy_args(config, request))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| DeliveryError::TransferError {
                source_path: request.source.clone(),
                status: "not started".to_string(),
                stderr: e.to_string(),
            })?;

        if output.status.success() {
            tracing::info!("Successfully copied {} to {}", request.source, request.destination);
            return Ok(());
        }

        Err(DeliveryError::TransferError {
            source_path: request.source.clone(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}
