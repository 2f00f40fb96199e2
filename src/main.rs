//! SophIA Risk API - server entry point

use std::net::SocketAddr;

use sophia_risk::{bundle, create_router, AppState, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    init_tracing(Config::json_logs_from_env());

    // Load configuration
    let config = Config::from_env();
    tracing::info!("Environment: {}", config.environment);

    tracing::info!("SophIA Risk API starting...");
    tracing::info!("Loading model bundle from {}", config.bundle_path.display());

    // The bundle is loaded exactly once; without it the server must not start
    let bundle = match bundle::load(&config.bundle_path) {
        Ok(bundle) => bundle,
        Err(e) => {
            tracing::error!("Startup failure: {}", e);
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    // Build application state
    let state = AppState::new(bundle, config.clone());
    tracing::info!("Risk threshold: {:.2} (calibrated scale)", state.policy.threshold);

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.host, config.port);
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "sophia_risk=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
