use crate::cli::ServeArgs;
use crate::infra::{build_analyzer, AppState};
use crate::routes::{cors_layer, with_analysis_routes};
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use checktruth::config::AppConfig;
use checktruth::error::AppError;
use checktruth::telemetry;
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

    let analyzer = Arc::new(build_analyzer(&config.data)?);
    info!(
        hazards = analyzer.registry().current().len(),
        custom_table = config.data.hazard_dataset.is_some(),
        "hazard reference table ready"
    );

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        data: Arc::new(config.data.clone()),
    };

    let app = with_analysis_routes(analyzer)
        .layer(Extension(app_state))
        .layer(prometheus_layer)
        .layer(cors_layer());

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "product assessment service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
