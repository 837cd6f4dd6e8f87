pub mod api;
pub mod config;
pub mod error;
pub mod limiter;
pub mod store;
pub mod validate;

use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::EmulatorConfig;
use crate::limiter::RateLimiter;
use crate::store::SpreadsheetStore;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SpreadsheetStore>,
    pub limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(config: &EmulatorConfig) -> Self {
        Self {
            store: Arc::new(SpreadsheetStore::new()),
            limiter: Arc::new(RateLimiter::new(
                config.rate_limit_quota,
                config.rate_limit_window(),
            )),
        }
    }
}

/// Build the router with all routes and layers
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(api::router())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Serve on an already bound listener until the task is dropped
pub async fn serve(listener: TcpListener, config: &EmulatorConfig) -> anyhow::Result<()> {
    let app = app(AppState::new(config));

    tracing::info!(
        "Emulator listening on {} (quota {} per {}s)",
        listener.local_addr()?,
        config.rate_limit_quota,
        config.rate_limit_window_secs
    );

    axum::serve(listener, app).await?;

    Ok(())
}

/// Run the server with the given configuration
pub async fn run_server(config: EmulatorConfig) -> anyhow::Result<()> {
    let listener = TcpListener::bind(config.addr()).await?;
    serve(listener, &config).await
}
