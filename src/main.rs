use anyhow::Context;
use clap::Parser;
use gcs_rclone_delivery::utils::logger;
use gcs_rclone_delivery::{
    CliConfig, DeliveryConfig, DeliveryError, DeliveryOutcome, Notification, RcloneDispatcher,
};
use std::io::Read;
use std::path::Path;

fn read_notification(cli: &CliConfig) -> anyhow::Result<Notification> {
    if let (Some(bucket), Some(name)) = (&cli.bucket, &cli.name) {
        return Ok(Notification::new(bucket, name));
    }

    let path = cli
        .event
        .as_deref()
        .context("either --event or --bucket/--name is required")?;

    let payload = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read event from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read event file {}", path.display()))?
    };

    serde_json::from_str(&payload).context("event payload is not a valid notification")
}

/// Logs and prints `error`, then exits with its severity-derived code.
fn fail(stage: &str, error: DeliveryError) -> ! {
    tracing::error!(
        "{} failed: {} (Category: {:?}, Severity: {:?})",
        stage,
        error,
        error.category(),
        error.severity()
    );
    eprintln!("{}", error.user_friendly_message());
    eprintln!("Suggestion: {}", error.recovery_suggestion());
    std::process::exit(error.exit_code().max(1));
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    logger::init_cli_logger(cli.verbose);
    tracing::debug!("CLI config: {:?}", cli);

    let notification = read_notification(&cli)?;

    let config = DeliveryConfig::load(cli.config.as_deref())
        .unwrap_or_else(|e| fail("Configuration", e));

    let dispatcher =
        RcloneDispatcher::from_config(&config).unwrap_or_else(|e| fail("Startup", e));

    match dispatcher.handle(&notification).await {
        Ok(outcome) => {
            println!("{}", outcome.message());
            if matches!(outcome, DeliveryOutcome::TransferFailed { .. }) {
                // Reported, not raised; a distinct code still helps scripted callers
                std::process::exit(4);
            }
        }
        Err(e) => fail("Delivery", e),
    }

    Ok(())
}
