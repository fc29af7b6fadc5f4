//! HTTP API over the nodetree core.
//!
//! Start with:
//! ```bash
//! PORT=3000 TREE_DB_PATH=./tree.db cargo run --bin nodetree-server
//! ```

use anyhow::Context;
use axum::extract::Request;
use axum::http::Method;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::Router;
use log::info;
use nodetree_core::db::open_db;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};

pub mod config;
pub mod http_error;
pub mod state;
pub mod tree_endpoints;

pub use config::{ConfigError, ServerConfig};
pub use http_error::HttpError;
pub use state::AppState;

/// Builds the application router with CORS and request logging.
pub fn create_router(state: AppState, config: &ServerConfig) -> Router {
    tree_endpoints::routes(state)
        .layer(middleware::from_fn(log_request))
        .layer(cors_layer(config))
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers(Any);
    match &config.cors_allow_origin {
        Some(origin) => layer.allow_origin(origin.clone()),
        None => layer.allow_origin(Any),
    }
}

async fn log_request(request: Request, next: Next) -> Response {
    let started_at = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    info!(
        "event=http_request module=server status={} method={} path={} duration_ms={}",
        response.status().as_u16(),
        method,
        path,
        started_at.elapsed().as_millis()
    );
    response
}

/// Opens the database and serves the API until Ctrl-C.
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    let conn = open_db(&config.db_path)
        .with_context(|| format!("failed to open tree database `{}`", config.db_path.display()))?;
    let app = create_router(AppState::new(conn), &config);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(
        "event=server_start module=server status=ok addr={} db_path={}",
        addr,
        config.db_path.display()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("event=server_stop module=server status=ok");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::error!("event=server_signal module=server status=error error={err}");
        // Without a signal handler, keep serving until the process is killed.
        std::future::pending::<()>().await;
    }
}
