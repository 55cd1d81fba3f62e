#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the theft map dashboard.
//!
//! Serves the aggregate views under `/api`. Every view takes the same
//! comma-joined filter parameters, compiles them into a predicate, and runs
//! one query against the shared [`TheftStore`] on actix's blocking pool.
//! The store is either a read-only `DuckDB` file or a CSV loaded into
//! memory (see [`theft_map_database::db`]).

mod handlers;
pub mod heatmap;
pub mod interactive;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use theft_map_database::{TheftStore, db};

/// Default bind address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";

/// Default port.
pub const DEFAULT_PORT: u16 = 8000;

/// Shared application state.
pub struct AppState {
    /// Theft record store shared by all workers.
    pub store: Arc<dyn TheftStore>,
}

/// Registers the API routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(handlers::root)).service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/total-thefts", web::get().to(handlers::total_thefts))
            .route(
                "/higest-police-station",
                web::get().to(handlers::highest_station),
            )
            .route("/most-model", web::get().to(handlers::most_model))
            .route("/peak-time", web::get().to(handlers::peak_time))
            .route("/thefts-by-ps", web::get().to(handlers::thefts_by_station))
            .route(
                "/Time_slot-by-company",
                web::get().to(handlers::time_slots_by_company),
            )
            .route("/thefts-company", web::get().to(handlers::thefts_by_company))
            .route("/theft-data", web::get().to(handlers::theft_data))
            .route("/theft-trends", web::get().to(handlers::theft_trends))
            .route("/thefts-heatmap", web::get().to(handlers::heatmap))
            .route("/generate-report", web::post().to(handlers::generate_report)),
    );
}

/// Starts the theft map API server.
///
/// Opens the store described by the environment (`THEFT_MAP_CSV`,
/// `THEFT_MAP_DB`, `THEFT_MAP_POOL_SIZE`) and serves it on `BIND_ADDR`:`PORT`.
/// This is a regular async function; the caller provides the runtime (e.g.
/// via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the store cannot be opened, or if
/// the HTTP server fails to bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    log::info!("Opening theft store...");
    let store = db::connect_from_env().map_err(std::io::Error::other)?;

    let state = web::Data::new(AppState { store });

    let bind_addr =
        std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);

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
    .await
}
