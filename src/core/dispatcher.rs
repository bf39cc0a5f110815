use crate::config::DeliveryConfig;
use crate::core::installer::RcloneInstaller;
use crate::core::rclone_config::EnvConfigMaterializer;
use crate::core::transfer::RcloneTransfer;
use crate::domain::model::{DeliveryOutcome, Notification, TransferRequest};
use crate::domain::ports::{ConfigMaterializer, ToolInstaller, Transfer};
use crate::utils::error::{DeliveryError, Result};
use std::path::PathBuf;

/// Routes one storage notification through install, configure and copy.
///
/// Install and configuration failures always propagate. A failed copy is
/// logged and reported as [`DeliveryOutcome::TransferFailed`] unless
/// `fail_on_transfer_error` is set.
pub struct Dispatcher<I: ToolInstaller, C: ConfigMaterializer, T: Transfer> {
    installer: I,
    materializer: C,
    transfer: T,
    trigger_prefix: String,
    source_remote: String,
    destination: String,
    scratch_root: PathBuf,
    fail_on_transfer_error: bool,
}

impl<I: ToolInstaller, C: ConfigMaterializer, T: Transfer> Dispatcher<I, C, T> {
    pub fn new(installer: I, materializer: C, transfer: T, config: &DeliveryConfig) -> Self {
        Self {
            installer,
            materializer,
            transfer,
            trigger_prefix: config.trigger_prefix.clone(),
            source_remote: config.source_remote.clone(),
            destination: config.destination.clone(),
            scratch_root: config.scratch_root(),
            fail_on_transfer_error: config.fail_on_transfer_error,
        }
    }

    pub fn admits(&self, notification: &Notification) -> bool {
        notification.name.starts_with(&self.trigger_prefix)
    }

    pub async fn handle(&self, notification: &Notification) -> Result<DeliveryOutcome> {
        tracing::info!(
            bucket = %notification.bucket,
            name = %notification.name,
            generation = notification.generation.as_deref().unwrap_or("-"),
            "Event received"
        );

        if !self.admits(notification) {
            tracing::info!(
                "Skipping file not in '{}' folder: {}",
                self.trigger_prefix,
                notification.name
            );
            return Ok(DeliveryOutcome::Skipped {
                name: notification.name.clone(),
            });
        }

        tracing::info!(
            "File {} in '{}' folder. Proceeding...",
            notification.name,
            self.trigger_prefix
        );

        // Removed when this invocation returns, whatever the outcome
        std::fs::create_dir_all(&self.scratch_root)?;
        let scratch = tempfile::Builder::new()
            .prefix("rclone-delivery-")
            .tempdir_in(&self.scratch_root)?;
        tracing::debug!("Scratch directory: {}", scratch.path().display());

        let tool = self.installer.install(scratch.path()).await?;
        let config = self.materializer.materialize(scratch.path())?;

        let request = TransferRequest::new(&self.source_remote, notification, &self.destination);

        match self.transfer.copy(&tool, &config, &request).await {
            Ok(()) => Ok(DeliveryOutcome::Delivered {
                source: request.source,
                destination: request.destination,
            }),
            Err(DeliveryError::TransferError { stderr, status, .. })
                if !self.fail_on_transfer_error =>
            {
                tracing::error!(
                    "Error copying {} to {} ({}): {}",
                    notification.name,
                    request.destination,
                    status,
                    stderr
                );
                Ok(DeliveryOutcome::TransferFailed {
                    source: request.source,
                    destination: request.destination,
                    stderr,
                })
            }
            Err(e) => {
                tracing::error!("Error copying {}: {}", notification.name, e);
                Err(e)
            }
        }
    }
}

/// The production wiring: pinned rclone download, process-environment
/// credentials, and a real `rclone copy`.
pub type RcloneDispatcher = Dispatcher<RcloneInstaller, EnvConfigMaterializer, RcloneTransfer>;

impl RcloneDispatcher {
    pub fn from_config(config: &DeliveryConfig) -> Result<Self> {
        Ok(Self::new(
            RcloneInstaller::from_config(config)?,
            EnvConfigMaterializer::from_process_env(),
            RcloneTransfer::new(),
            config,
        ))
    }
}
