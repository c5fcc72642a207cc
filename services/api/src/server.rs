use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryOrderRepository};
use crate::routes::with_order_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;
use velo_orders::config::AppConfig;
use velo_orders::error::AppError;
use velo_orders::orders::{CheckoutService, HttpCreditService};
use velo_orders::telemetry;

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
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = Arc::new(InMemoryOrderRepository::default());
    let credit = Arc::new(HttpCreditService::new(&config.credit)?);
    info!(endpoint = credit.endpoint(), "credit bureau configured");
    let checkout_service = Arc::new(CheckoutService::new(repository, credit));

    let app = with_order_routes(checkout_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "checkout service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
