//! Demo entry point.

use std::sync::Arc;

use demo::config::Config;
use demo::error::DemoError;
use domain::UserService;
use event_store::InMemoryEventStore;

const RACING_WRITERS: usize = 4;

#[tokio::main]
async fn main() -> Result<(), DemoError> {
    let config = Config::from_env();

    // 1. Initialize tracing
    demo::telemetry::init_tracing(&config);

    // 2. Install Prometheus metrics recorder
    let metrics_handle = demo::telemetry::install_metrics()?;

    // 3. Create event store and service
    let store = InMemoryEventStore::new();
    let retry = config.retry_policy();
    let service = Arc::new(UserService::new(store.clone()).with_retry_policy(retry));
    tracing::info!(?config, "demo starting");

    // 4. Registration scenario
    let user = demo::run_scenario(&service).await?;
    println!("{}", serde_json::to_string_pretty(user.context())?);
    tracing::info!(state = %user.state(), "scenario finished");

    // 5. Racing writers
    let report = demo::race_writers(Arc::clone(&service), RACING_WRITERS).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    tracing::info!(
        streams = store.stream_count().await,
        events = store.event_count().await,
        "demo finished"
    );
    println!("{}", metrics_handle.render());
    Ok(())
}
