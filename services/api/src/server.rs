use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryStore};
use crate::routes::{api_router, ReportContext};
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use teampulse::config::AppConfig;
use teampulse::directory::DirectoryService;
use teampulse::error::AppError;
use teampulse::evaluations::EvaluationService;
use teampulse::telemetry;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(InMemoryStore::default());
    let directory = Arc::new(DirectoryService::new(store.clone()));
    let evaluations = Arc::new(EvaluationService::new(store.clone()));
    let reports = ReportContext {
        store,
        thresholds: config.reporting,
    };

    let app = api_router(directory, evaluations, reports)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "team KPI tracker ready");

    axum::serve(listener, app).await?;
    Ok(())
}
