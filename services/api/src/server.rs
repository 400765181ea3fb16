use crate::cli::ServeArgs;
use crate::infra::{self, AppState};
use crate::routes::with_conversation_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use medscore::error::AppError;
use medscore::telemetry;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs, tests_path: Option<PathBuf>) -> Result<(), AppError> {
    let mut config = infra::load_config(tests_path)?;

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

    let service = infra::conversation_service(&config)?;
    let tests = service.catalog().len();

    let app = with_conversation_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, tests, "severity scoring service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
