use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use storefront_core::money;

use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", post(trigger_report))
        .route("/revenue", get(revenue))
        .route("/stats", get(stats))
}

/// Kick off a report run on the background worker. Generation is
/// best-effort; callers poll `/reports/stats` for the outcome.
pub async fn trigger_report(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    if services.report_worker.trigger() {
        (
            StatusCode::ACCEPTED,
            Json(serde_json::json!({
                "ok": true,
                "path": services.report_path.display().to_string(),
            })),
        )
            .into_response()
    } else {
        errors::json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "report_unavailable",
            "report worker is not running",
        )
    }
}

pub async fn revenue(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    let revenue = services.reporter.revenue();
    (
        StatusCode::OK,
        Json(serde_json::json!({ "revenue": money::major_from_minor(revenue) })),
    )
        .into_response()
}

pub async fn stats(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    (StatusCode::OK, Json(services.report_worker.stats())).into_response()
}
