//! # HTTP Server
//!
//! Router assembly (routes, CORS, timeout, request logging) and process
//! bootstrap for the `petstore` binary.

use std::net::SocketAddr;
use std::time::Instant;

use axum::extract::Request;
use axum::http::{header, Method};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::Router;
use log::{info, warn};
use petstore_core::db::open_db;
use petstore_core::{init_logging, init_stderr_logging, SqlitePetRepository};
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;

use crate::cli::Cli;
use crate::config::{ConfigError, ServerConfig};
use crate::error::ServerError;
use crate::routes::{health_routes, pet_routes, PETS_BASE_PATH};
use crate::state::AppState;

/// HTTP server for the pet catalog
pub struct HttpServer {
    config: ServerConfig,
    router: Router,
}

impl HttpServer {
    /// Create a server over an already-opened store
    pub fn new(config: ServerConfig, state: AppState) -> Result<Self, ConfigError> {
        let router = build_router(&config, state)?;
        Ok(Self { config, router })
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Serve until Ctrl-C
    pub async fn start(self) -> Result<(), ServerError> {
        let addr: SocketAddr = self
            .config
            .socket_addr()
            .parse()
            .map_err(|_| ConfigError::InvalidAddress(self.config.socket_addr()))?;

        let listener = TcpListener::bind(addr).await?;
        info!(
            "event=http_listen module=http status=ok addr={} base_path={} cors_origin={}",
            addr, PETS_BASE_PATH, self.config.cors_origin
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("event=http_shutdown module=http status=ok");
        Ok(())
    }
}

/// Build the combined router with all endpoints and middleware
pub fn build_router(config: &ServerConfig, state: AppState) -> Result<Router, ConfigError> {
    // `list` echoes the origin only when the request carries it.
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list([config.cors_origin_header()?]))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    Ok(Router::new()
        .merge(health_routes())
        .nest(PETS_BASE_PATH, pet_routes())
        .with_state(state)
        .layer(TimeoutLayer::new(config.request_timeout()))
        .layer(cors)
        .layer(middleware::from_fn(log_requests)))
}

/// Resolves configuration, starts logging, opens the store and serves.
pub async fn run(cli: Cli) -> Result<(), ServerError> {
    let config = cli.resolve_config()?;

    let logging = match &config.log_dir {
        Some(dir) => init_logging(&config.log_level, dir),
        None => init_stderr_logging(&config.log_level),
    };
    logging.map_err(ServerError::Logging)?;

    let conn = open_db(&config.database_path)?;
    SqlitePetRepository::try_new(&conn)?;
    info!(
        "event=store_ready module=server status=ok database_path={}",
        config.database_path.display()
    );

    HttpServer::new(config, AppState::new(conn))?.start().await
}

async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started_at = Instant::now();

    let response = next.run(request).await;

    info!(
        "event=http_request module=http method={} path={} http_status={} duration_ms={}",
        method,
        path,
        response.status().as_u16(),
        started_at.elapsed().as_millis()
    );
    response
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("event=http_shutdown module=http status=error error={err}");
    }
}
