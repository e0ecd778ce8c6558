//! Axum-based HTTP server for the car.
//!
//! Provides:
//! - GET `/action?<name>` - Run `on`, `off`, `stop` or a driving action
//! - GET `/api/actions` - Power state and accepted action names
//! - GET `/` - Web UI (`<template>/html/index.html`)
//! - GET `/css/*`, `/js/*`, `/fonts/*` - Static assets from the template directory

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    extract::{RawQuery, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};

use crate::car::Action;
use crate::config::WebConfig;
use crate::traits::PinDriver;

use super::api::{ActionResponse, ActionsResponse};
use super::shared::SharedCar;

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /action?<name> - Dispatch a named request to the car
///
/// The action name is the whole raw query string, e.g. `/action?forward`.
/// Dispatch sleeps between pin writes, so it runs on the blocking pool.
async fn action<D>(
    State(state): State<Arc<SharedCar<D>>>,
    RawQuery(query): RawQuery,
) -> Json<ActionResponse>
where
    D: PinDriver + Send + 'static,
    D::Error: std::fmt::Display,
{
    let name = query.unwrap_or_default();
    log::info!("action: {name}");

    let ok = match tokio::task::spawn_blocking(move || state.dispatch(&name)).await {
        Ok(ok) => ok,
        Err(err) => {
            log::error!("action task failed: {err}");
            false
        }
    };
    Json(ActionResponse::from_success(ok))
}

/// GET /api/actions - Power state and the action names the car accepts
async fn actions<D>(State(state): State<Arc<SharedCar<D>>>) -> Json<ActionsResponse>
where
    D: PinDriver + Send + 'static,
{
    Json(ActionsResponse {
        on: state.is_on(),
        actions: Action::ALL.to_vec(),
    })
}

/// Fallback handler for 404
async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not found")
}

// ============================================================================
// Server Builder
// ============================================================================

/// Configuration for the web server
#[derive(Debug, Clone)]
pub struct WebServerConfig {
    /// Address to bind to
    pub addr: SocketAddr,
    /// Directory with `html/index.html` and the static asset folders
    pub template_dir: PathBuf,
    /// Whether to enable CORS for all origins
    pub cors_permissive: bool,
}

impl Default for WebServerConfig {
    fn default() -> Self {
        Self::from_config(&WebConfig::default())
    }
}

impl WebServerConfig {
    /// Create a new config with the given address
    pub fn new(addr: impl Into<SocketAddr>) -> Self {
        Self {
            addr: addr.into(),
            ..Default::default()
        }
    }

    /// Set the template directory
    pub fn template_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.template_dir = dir.into();
        self
    }

    /// Set whether CORS should be permissive
    pub fn cors(mut self, permissive: bool) -> Self {
        self.cors_permissive = permissive;
        self
    }

    /// Create from shared WebConfig
    ///
    /// A host that is not an IP address falls back to `0.0.0.0`.
    pub fn from_config(config: &WebConfig) -> Self {
        let ip = config.host.parse().unwrap_or_else(|_| {
            log::warn!("invalid bind host {:?}, using 0.0.0.0", config.host.as_str());
            [0, 0, 0, 0].into()
        });
        Self {
            addr: SocketAddr::new(ip, config.port),
            template_dir: PathBuf::from(config.template_dir.as_str()),
            cors_permissive: config.cors_permissive,
        }
    }
}

fn static_dir(root: &Path, name: &str) -> ServeDir {
    ServeDir::new(root.join(name))
}

/// Build the Axum router with all routes
pub fn build_router<D>(state: Arc<SharedCar<D>>, config: &WebServerConfig) -> Router
where
    D: PinDriver + Send + 'static,
    D::Error: std::fmt::Display,
{
    let root = config.template_dir.as_path();

    let mut router = Router::new()
        .route("/action", get(action::<D>))
        .route("/api/actions", get(actions::<D>))
        .route_service("/", ServeFile::new(root.join("html").join("index.html")))
        .nest_service("/css", static_dir(root, "css"))
        .nest_service("/js", static_dir(root, "js"))
        .nest_service("/fonts", static_dir(root, "fonts"))
        .fallback(not_found)
        .with_state(state);

    if config.cors_permissive {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    router
}

/// Start the web server with shared state
///
/// This function runs until the server is shut down.
pub async fn run_server_with_state<D>(
    state: Arc<SharedCar<D>>,
    config: WebServerConfig,
) -> Result<(), std::io::Error>
where
    D: PinDriver + Send + 'static,
    D::Error: std::fmt::Display,
{
    let router = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    log::info!("web server listening on http://{}", config.addr);

    axum::serve(listener, router).await
}
