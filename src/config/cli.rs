use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "gcs-rclone-delivery")]
#[command(about = "Deliver processed GCS objects to OTC object storage with rclone")]
pub struct CliConfig {
    /// Source bucket of the notification
    #[arg(long, requires = "name", conflicts_with = "event")]
    pub bucket: Option<String>,

    /// Object path of the notification
    #[arg(long, requires = "bucket", conflicts_with = "event")]
    pub name: Option<String>,

    /// JSON notification payload file (`-` for stdin)
    #[arg(long, required_unless_present = "bucket")]
    pub event: Option<PathBuf>,

    /// Delivery settings TOML file
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}
