//! Starboard worker entry point
//!
//! Run with:
//! ```bash
//! cargo run -p starboard-gateway
//! ```
//!
//! Configuration is loaded from environment variables.

use starboard_common::{try_init_tracing_with_config, AppConfig, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!(error = %e, "Starboard worker failed");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = AppConfig::from_env().inspect_err(|e| {
        eprintln!("Failed to load configuration: {e}");
    })?;

    if let Err(e) = try_init_tracing_with_config(TracingConfig::for_environment(config.app.env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    info!(
        name = %config.app.name,
        env = ?config.app.env,
        "Starting starboard worker..."
    );

    starboard_gateway::run(config).await
}
