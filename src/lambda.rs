use gcs_rclone_delivery::utils::logger;
use gcs_rclone_delivery::{DeliveryConfig, DeliveryOutcome, Notification, RcloneDispatcher};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde::Serialize;

#[derive(Serialize)]
pub struct Response {
    pub message: String,
    #[serde(flatten)]
    pub outcome: DeliveryOutcome,
}

async fn function_handler(
    dispatcher: &RcloneDispatcher,
    event: LambdaEvent<Notification>,
) -> Result<Response, Error> {
    let outcome = dispatcher.handle(&event.payload).await.map_err(|e| {
        tracing::error!("Delivery failed: {} ({})", e, e.recovery_suggestion());
        Box::new(e) as Box<dyn std::error::Error + Send + Sync>
    })?;

    Ok(Response {
        message: outcome.message(),
        outcome,
    })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_function_logger();

    let config = DeliveryConfig::load(None)?;
    let dispatcher = RcloneDispatcher::from_config(&config)?;
    let dispatcher = &dispatcher;

    run(service_fn(move |event: LambdaEvent<Notification>| async move {
        function_handler(dispatcher, event).await
    }))
    .await
}
