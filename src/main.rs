use slatrack::config::Config;
use slatrack::events::EventBus;
use slatrack::infrastructure::persistence::Database;
use slatrack::services::{LogNotifier, NullAssigneeDirectory, SlaMonitor, SlaService};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "slatrack=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!(service = %config.service_name, "Configuration loaded");

    // Initialize database connection
    let db = Database::connect(&config.database_url).await?;
    tracing::info!("Database connection established");

    db.bootstrap_schema().await?;
    tracing::info!("Database schema ready");

    let event_bus = EventBus::default();
    let service = Arc::new(SlaService::new(
        Arc::new(db),
        Arc::new(LogNotifier),
        Arc::new(NullAssigneeDirectory),
        event_bus,
    ));

    let monitor = SlaMonitor::new(
        Arc::clone(&service),
        Duration::from_secs(config.broadcast_interval_secs),
        Duration::from_secs(config.violation_interval_secs),
    );
    let (broadcast_handle, violation_handle) = monitor.start();

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    broadcast_handle.abort();
    violation_handle.abort();

    Ok(())
}
