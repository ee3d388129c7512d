#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the accident dashboard.
//!
//! Every request re-derives its charts from the cached cleaned table; the
//! table itself is loaded once per process and shared read-only.

mod handlers;

use std::sync::Arc;

use accident_dash_analytics_models::DashboardConfig;
use accident_dash_dataset::config::AppConfig;
use accident_dash_dataset::{CleanedDataset, DatasetCache, DatasetError, DatasetKey};
use accident_dash_source::progress::null_progress;
use accident_dash_source::{DatasetSource, LoadOptions};
use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};

pub use handlers::ApiFailure;

/// Shared application state.
pub struct AppState {
    /// Cleaned datasets loaded so far.
    pub cache: DatasetCache,
    /// Where the dataset comes from.
    pub source: Arc<dyn DatasetSource>,
    /// Row cap for loads.
    pub load_options: LoadOptions,
    /// Tunables for the aggregations.
    pub dashboard: DashboardConfig,
}

impl AppState {
    #[must_use]
    pub fn new(
        source: Arc<dyn DatasetSource>,
        load_options: LoadOptions,
        dashboard: DashboardConfig,
    ) -> Self {
        Self {
            cache: DatasetCache::new(),
            source,
            load_options,
            dashboard,
        }
    }

    /// Key of the configured dataset.
    #[must_use]
    pub fn dataset_key(&self) -> DatasetKey {
        DatasetKey::new(self.source.as_ref(), &self.load_options)
    }

    /// The configured dataset, loading it on first use.
    ///
    /// # Errors
    ///
    /// Returns the cached [`DatasetError`] if the dataset could not be
    /// loaded. It is served until the cache is invalidated.
    pub async fn dataset(&self) -> Result<Arc<CleanedDataset>, Arc<DatasetError>> {
        self.cache
            .get_or_load(self.source.as_ref(), &self.load_options, null_progress())
            .await
    }
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(handlers::query_config()).service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/options", web::get().to(handlers::options))
            .route("/dashboard", web::get().to(handlers::dashboard))
            .route(
                "/weather/frequency",
                web::get().to(handlers::weather_frequency),
            )
            .route("/weather/monthly", web::get().to(handlers::weather_monthly))
            .route(
                "/weather/visibility-ranges",
                web::get().to(handlers::visibility_ranges),
            )
            .route(
                "/cache/invalidate",
                web::post().to(handlers::invalidate_cache),
            ),
    );
}

/// Starts the accident dashboard API server.
///
/// Loads the configured dataset up front so the first request does not pay
/// for it. A failed load is logged and cached like a successful one, so
/// every request answers `503` without contacting the source again until
/// `POST /api/cache/invalidate` clears it. This is a regular async
/// function; the caller provides the runtime (e.g. via
/// `#[actix_web::main]`) and initializes logging.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: AppConfig, load_options: LoadOptions) -> std::io::Result<()> {
    let AppConfig {
        source,
        dashboard,
        server,
    } = config;

    let state = web::Data::new(AppState::new(Arc::new(source), load_options, dashboard));

    log::info!("Loading dataset {}...", state.dataset_key());
    match state.dataset().await {
        Ok(dataset) => log::info!("Dataset ready: {} records", dataset.table.len()),
        Err(e) => log::error!("Dataset unavailable: {e}"),
    }

    log::info!("Starting server on {}:{}", server.bind_addr, server.port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((server.bind_addr, server.port))?
    .run()
    .await
}
