use feedback_service::config::{FeedbackConfig, SERVICE_NAME};
use feedback_service::startup::Application;
use service_core::error::AppError;
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // No subscriber exists yet, so a config failure goes to stderr.
    let config = FeedbackConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        e
    })?;

    init_tracing(
        SERVICE_NAME,
        &config.log_level,
        config.otlp_endpoint.as_deref(),
    );

    let application = Application::build(config).await?;
    application.run_until_stopped().await?;

    tracing::info!("feedback-service stopped");
    Ok(())
}
