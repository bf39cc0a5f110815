use crate::domain::model::TransferRequest;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Makes an executable sync tool available, returning its path.
#[async_trait]
pub trait ToolInstaller: Send + Sync {
    async fn install(&self, scratch: &Path) -> Result<PathBuf>;
}

/// Writes the two-remote rclone config file, returning its path.
pub trait ConfigMaterializer: Send + Sync {
    fn materialize(&self, scratch: &Path) -> Result<PathBuf>;
}

/// Runs one directional copy with the given tool and config.
#[async_trait]
pub trait Transfer: Send + Sync {
    async fn copy(&self, tool: &Path, config: &Path, request: &TransferRequest) -> Result<()>;
}
