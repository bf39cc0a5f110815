pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::{DeliveryConfig, RemoteCredentials};
pub use core::dispatcher::{Dispatcher, RcloneDispatcher};
pub use core::installer::RcloneInstaller;
pub use core::rclone_config::EnvConfigMaterializer;
pub use core::transfer::RcloneTransfer;
pub use domain::model::{DeliveryOutcome, Notification, TransferRequest};
pub use utils::error::{DeliveryError, Result};
