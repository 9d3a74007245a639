use checktruth::assessment::AssessmentEngine;
use checktruth::config::DataConfig;
use checktruth::error::AppError;
use checktruth::hazards::HazardRegistry;
use checktruth::product::ProductAnalyzer;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) data: Arc<DataConfig>,
}

/// Load the hazard table and scoring rules named by `data`. Any failure here
/// is fatal for the caller.
pub(crate) fn build_analyzer(data: &DataConfig) -> Result<ProductAnalyzer, AppError> {
    let store = data.hazard_store()?;
    let scoring = data.scoring_config()?;
    let registry = Arc::new(HazardRegistry::new(store));
    Ok(ProductAnalyzer::new(registry, AssessmentEngine::new(scoring)))
}

#[cfg(test)]
pub(crate) fn test_state(data: DataConfig) -> AppState {
    let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();
    AppState {
        readiness: Arc::new(AtomicBool::new(true)),
        metrics: Arc::new(recorder.handle()),
        data: Arc::new(data),
    }
}
