use medscore::catalog::TestCatalog;
use medscore::config::AppConfig;
use medscore::conversation::ConversationService;
use medscore::error::AppError;
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Environment configuration with the command-line catalog override applied.
pub(crate) fn load_config(tests_path: Option<PathBuf>) -> Result<AppConfig, AppError> {
    let mut config = AppConfig::load()?;
    if let Some(path) = tests_path {
        config.catalog.tests_path = path;
    }
    Ok(config)
}

pub(crate) fn load_catalog(config: &AppConfig) -> Result<Arc<TestCatalog>, AppError> {
    let catalog = TestCatalog::from_path(&config.catalog.tests_path)?;
    Ok(Arc::new(catalog))
}

pub(crate) fn conversation_service(config: &AppConfig) -> Result<Arc<ConversationService>, AppError> {
    let catalog = load_catalog(config)?;
    Ok(Arc::new(ConversationService::new(
        catalog,
        config.sessions.ttl(),
    )))
}
