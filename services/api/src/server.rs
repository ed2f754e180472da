use crate::cli::ServeArgs;
use crate::infra::{admin_auth, open_store, AppState};
use crate::routes::application;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use community_relief::config::AppConfig;
use community_relief::coordination::CoordinationService;
use community_relief::error::AppError;
use community_relief::events::EventHub;
use community_relief::storage::seed_default_categories;
use community_relief::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(database) = args.database.take() {
        config.database.path = database;
    }

    telemetry::init(&config.telemetry)?;

    let store = open_store(&config.database.path)?;
    seed_default_categories(store.as_ref())?;

    let hub = EventHub::new();
    let coordination = Arc::new(CoordinationService::new(
        store.clone(),
        Arc::new(hub.clone()),
    ));
    let auth = admin_auth(store.clone(), &config.auth)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        store,
    };

    let app = application(coordination, auth, hub)
        .layer(Extension(app_state))
        .layer(prometheus_layer)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        database = %config.database.path.display(),
        "community relief dashboard ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
