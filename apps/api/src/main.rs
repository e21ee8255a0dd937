mod assistant;
mod backend;
mod config;
mod errors;
mod layout;
mod render;
mod report;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::assistant::sessions::ChatStore;
use crate::backend::HttpBackend;
use crate::config::Config;
use crate::layout::a4_report_layout;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Medicheck API v{}", env!("CARGO_PKG_VERSION"));

    // Remote medical API
    let backend = HttpBackend::new(
        &config.api_base_url,
        Duration::from_secs(config.backend_timeout_secs),
    )?;
    info!(
        "Backend: {} (from {})",
        backend.base_url(),
        config.api_url_source
    );

    let report_layout = a4_report_layout();
    info!(
        "Report layout: {}x{}mm, columns at {}mm and {}mm, {}mm wide",
        report_layout.page_width_mm,
        report_layout.page_height_mm,
        report_layout.left_x_mm,
        report_layout.right_x_mm,
        report_layout.column_width_mm
    );

    info!(
        "Chat sessions: at most {}, dropped after {}s idle",
        config.chat_max_sessions, config.chat_idle_ttl_secs
    );
    let state = AppState::new(Arc::new(backend), report_layout).with_chat_store(ChatStore::new(
        config.chat_max_sessions,
        config.chat_idle_ttl_secs,
    ));

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict to the front-end origin once it is configurable

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
