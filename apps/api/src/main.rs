use anyhow::{Context, Result};
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use career_plan::config::Config;
use career_plan::reference::loader::load_reference;
use career_plan::taxonomy::BehaviorTaxonomy;
use career_plan::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Career Plan API v{}", env!("CARGO_PKG_VERSION"));

    // Reference data is loaded once and shared read-only; a bad workbook halts startup
    let taxonomy = BehaviorTaxonomy::standard();
    let reference = load_reference(&config.reference_workbook, &config.layout, &taxonomy)
        .with_context(|| {
            format!(
                "Could not load '{}'. Add the reference workbook to the deployment or set REFERENCE_WORKBOOK",
                config.reference_workbook
            )
        })?;
    info!(
        "Reference data loaded: {} jobs across {} areas",
        reference.len(),
        reference.areas().len()
    );

    let state = AppState::new(reference, taxonomy, config.clone());

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
