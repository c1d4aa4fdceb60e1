use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::{build_router, Services};
use crate::seed::seed_demo_records;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use civic_permits::config::AppConfig;
use civic_permits::error::AppError;
use civic_permits::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
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

    let services = Services::in_memory(config.pagination);
    if args.seed {
        seed_demo_records(&services)?;
    }

    let app = build_router(&services)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        per_page = config.pagination.default_per_page,
        "civic permits api ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
