pub mod dispatcher;
pub mod installer;
pub mod rclone_config;
pub mod transfer;

pub use crate::domain::model::{DeliveryOutcome, Notification, TransferRequest};
pub use crate::domain::ports::{ConfigMaterializer, ToolInstaller, Transfer};
pub use crate::utils::error::Result;
