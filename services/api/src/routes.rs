use crate::infra::AppState;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use checktruth::error::AppError;
use checktruth::hazards::{HazardEntry, RiskLevel};
use checktruth::product::{ProductAnalyzer, ProductReport, ProductSubmission};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

#[derive(Debug, Serialize)]
pub(crate) struct AnalyzeResponse {
    pub(crate) status: &'static str,
    pub(crate) assessed_at: DateTime<Utc>,
    #[serde(flatten)]
    pub(crate) report: ProductReport,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct HazardQuery {
    #[serde(default)]
    pub(crate) risk_level: Option<RiskLevel>,
}

#[derive(Debug, Serialize)]
pub(crate) struct HazardListResponse {
    pub(crate) count: usize,
    pub(crate) hazards: Vec<HazardEntry>,
}

pub(crate) fn with_analysis_routes(analyzer: Arc<ProductAnalyzer>) -> Router {
    Router::new()
        .route("/api/v1/analyze", post(analyze_endpoint))
        .route("/api/v1/hazards", get(hazards_endpoint))
        .route("/api/v1/hazards/reload", post(reload_hazards_endpoint))
        .route("/api/v1/hazards/:name", get(hazard_endpoint))
        .with_state(analyzer)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

/// Any origin may call the API.
pub(crate) fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn analyze_endpoint(
    State(analyzer): State<Arc<ProductAnalyzer>>,
    Json(submission): Json<ProductSubmission>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let barcode = submission.barcode.clone();
    let report = analyzer.analyze(submission).map_err(|err| {
        warn!(barcode = barcode.as_deref().unwrap_or("-"), error = %err, "rejected product");
        AppError::from(err)
    })?;

    Ok(Json(AnalyzeResponse {
        status: "success",
        assessed_at: Utc::now(),
        report,
    }))
}

pub(crate) async fn hazards_endpoint(
    State(analyzer): State<Arc<ProductAnalyzer>>,
    Query(query): Query<HazardQuery>,
) -> Json<HazardListResponse> {
    let filter = query.risk_level;
    let store = analyzer.registry().current();
    let hazards: Vec<HazardEntry> = store
        .all()
        .filter(|entry| filter.map_or(true, |risk| entry.risk_level == risk))
        .map(|entry| entry.as_ref().clone())
        .collect();

    Json(HazardListResponse {
        count: hazards.len(),
        hazards,
    })
}

pub(crate) async fn hazard_endpoint(
    State(analyzer): State<Arc<ProductAnalyzer>>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    let store = analyzer.registry().current();
    match store.get(&name) {
        Some(entry) => (StatusCode::OK, Json(json!(entry.as_ref()))).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "status": "error", "error": format!("unknown hazard '{name}'") })),
        )
            .into_response(),
    }
}

/// Re-read the configured table and publish it; the previous table stays in
/// effect when loading fails.
pub(crate) async fn reload_hazards_endpoint(
    State(analyzer): State<Arc<ProductAnalyzer>>,
    Extension(state): Extension<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = state.data.hazard_store()?;
    let previous = analyzer.registry().replace(store);
    let current = analyzer.registry().current();

    Ok(Json(json!({
        "status": "reloaded",
        "previous_count": previous.len(),
        "count": current.len(),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{build_analyzer, test_state};
    use axum::body::Body;
    use axum::http::Request;
    use checktruth::config::DataConfig;
    use serde_json::Value;
    use tower::ServiceExt;

    fn router() -> Router {
        let data = DataConfig::default();
        let analyzer = Arc::new(build_analyzer(&data).expect("builtin analyzer"));
        with_analysis_routes(analyzer)
            .layer(Extension(test_state(data)))
            .layer(cors_layer())
    }

    async fn read_json_body(response: axum::response::Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&body).expect("json payload")
    }

    fn post_json(uri: &str, payload: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .expect("request builds")
    }

    #[tokio::test]
    async fn analyze_returns_assembled_report() {
        let response = router()
            .oneshot(post_json(
                "/api/v1/analyze",
                json!({
                    "barcode": "5000112637922",
                    "product_name": "Cherry Soda",
                    "ingredients_text": "Carbonated Water, High Fructose Corn Syrup, Red 40",
                    "nutriments": { "sugars_100g": 11.0, "salt_100g": 0.05 }
                }),
            ))
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json_body(response).await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["product_name"], "Cherry Soda");
        assert_eq!(body["ingredients"].as_array().map(Vec::len), Some(3));
        assert_eq!(body["flagged_chemicals"][0]["name"], "high fructose corn syrup");
        assert_eq!(body["flagged_chemicals"][1]["name"], "red 40");
        assert!(body["health_score"].as_u64().expect("score") <= 20);
        let warnings = body["disease_warnings"].as_array().expect("warnings");
        assert!(warnings.contains(&json!("Hyperactivity")));
    }

    #[tokio::test]
    async fn analyze_rejects_negative_nutrients() {
        let response = router()
            .oneshot(post_json(
                "/api/v1/analyze",
                json!({ "nutrients": { "sodium": -2.0 } }),
            ))
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = read_json_body(response).await;
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn hazards_can_be_filtered_by_risk() {
        let response = router()
            .oneshot(
                Request::get("/api/v1/hazards?risk_level=high")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json_body(response).await;
        let hazards = body["hazards"].as_array().expect("hazards");
        assert!(!hazards.is_empty());
        assert!(hazards.iter().all(|hazard| hazard["risk_level"] == "high"));
    }

    #[tokio::test]
    async fn unknown_hazard_is_not_found() {
        let response = router()
            .oneshot(
                Request::get("/api/v1/hazards/unobtainium")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn reload_republishes_the_table() {
        let response = router()
            .oneshot(post_json("/api/v1/hazards/reload", json!({})))
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json_body(response).await;
        assert_eq!(body["count"], body["previous_count"]);
    }

    #[tokio::test]
    async fn cross_origin_callers_are_allowed() {
        let response = router()
            .oneshot(
                Request::get("/health")
                    .header(header::ORIGIN, "https://shop.example")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|value| value.to_str().ok()),
            Some("*")
        );
    }

    #[tokio::test]
    async fn readiness_reports_ready() {
        let response = router()
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request"))
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
    }
}
