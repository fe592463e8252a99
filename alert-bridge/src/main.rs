use alert_bridge::config::BridgeConfig;
use alert_bridge::startup::Application;
use service_core::observability::{init_tracing, shutdown_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = BridgeConfig::load();

    init_tracing(
        "alert-bridge",
        &config.log_level,
        config.otlp_endpoint.as_deref(),
    )?;

    // Any startup error exits non-zero before the listener accepts traffic.
    let application = Application::build(config).await.map_err(|e| {
        tracing::error!(error = %e, "Startup failed");
        anyhow::anyhow!("Startup failed: {}", e)
    })?;

    application.run_until_stopped().await?;

    shutdown_tracing();
    Ok(())
}
