pub mod auth;
pub mod config;
pub mod cors;
pub mod country;
pub mod errors;
pub mod handlers;
pub mod metrics_defs;
pub mod router;
pub mod service;

use crate::cors::Cors;
use crate::country::build_resolver;
use crate::errors::ApiError;
use crate::handlers::Handlers;
use crate::service::AnalyticsService;
use request_store::open_store;
use shared::admin_service::AdminService;
use shared::http::run_http_service;

/// Opens the store and serves the API and admin listeners until one of them fails.
pub async fn run(config: config::Config) -> Result<(), ApiError> {
    let store = open_store(config.store)
        .await
        .map_err(ApiError::StoreOpen)?;
    let resolver = build_resolver(&config.country)?;
    tracing::info!(store = store.name(), "Store ready");

    let handlers = Handlers::new(store, config.auth.secret, resolver);
    let api_service = AnalyticsService::new(handlers, Cors::new(config.cors.allowed_origins));
    // Listeners only start once the store is open.
    let admin_service = AdminService::<_, ApiError>::new(|| true);

    let api_task = run_http_service(&config.listener.host, config.listener.port, api_service);
    let admin_task = run_http_service(
        &config.admin_listener.host,
        config.admin_listener.port,
        admin_service,
    );

    tokio::try_join!(api_task, admin_task)?;
    Ok(())
}
