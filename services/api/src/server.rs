use crate::cli::ServeArgs;
use crate::infra::{seed_directory, AppState, InMemoryListings, LogNotifier};
use crate::routes::with_listing_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tradepost::config::AppConfig;
use tradepost::error::AppError;
use tradepost::geo::InMemoryPendingRequests;
use tradepost::listings::ListingService;
use tradepost::telemetry;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let directory = Arc::new(seed_directory());
    let listings = Arc::new(InMemoryListings::new());
    let requests = Arc::new(InMemoryPendingRequests::new());
    let notifier = Arc::new(LogNotifier);
    let service = Arc::new(ListingService::new(directory, listings, requests, notifier));

    let app = with_listing_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "marketplace service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
