#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the accident risk tools.
//!
//! Exposes the ten query tools over HTTP: `GET /api/tools` lists their
//! definitions and `POST /api/tools/{name}` runs one with a JSON parameter
//! body. Queries run on the blocking thread pool against a shared
//! read-only [`AccidentStore`].

mod handlers;

use std::sync::Arc;

use accident_risk_analytics::{AccidentStore, AnalyticsError};
use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};

/// Shared application state.
pub struct AppState {
    /// Read-only accident store shared by every worker.
    pub store: Arc<AccidentStore>,
}

/// Errors that can stop the server from starting.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The accident store could not be opened.
    #[error(transparent)]
    Store(#[from] AnalyticsError),

    /// Binding or serving failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/tools", web::get().to(handlers::tools))
            .route("/tools/{name}", web::post().to(handlers::call_tool)),
    );
}

/// Starts the accident risk API server.
///
/// Opens the store named by `ACCIDENTS_DB_PATH` and serves on
/// `BIND_ADDR:PORT` (default `127.0.0.1:8080`). The caller provides the
/// async runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns [`ServerError::Store`] if the store cannot be opened, or
/// [`ServerError::Io`] if the server fails to bind or run.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> Result<(), ServerError> {
    log::info!("Opening accident store...");
    let store = web::block(AccidentStore::open_default)
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))??;

    let state = web::Data::new(AppState {
        store: Arc::new(store),
    });

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await?;

    Ok(())
}
