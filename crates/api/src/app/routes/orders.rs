use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use storefront_core::OrderId;
use storefront_orders::{NewOrderItem, OrderStatus};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_order))
        .route("/:id", get(get_order).delete(delete_order))
        .route("/:id/items", axum::routing::patch(upsert_item))
        .route("/:id/status", post(set_status))
        .route("/:id/total", get(order_total))
}

pub async fn create_order(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateOrderRequest>,
) -> axum::response::Response {
    let items: Vec<NewOrderItem> = body.items.into_iter().map(Into::into).collect();
    match services.ledger.create_order(&items) {
        Ok(order) => (StatusCode::CREATED, Json(dto::order_to_json(&order))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<u64>,
) -> axum::response::Response {
    match services.ledger.order(OrderId::new(id)) {
        Some(order) => (StatusCode::OK, Json(dto::order_to_json(&order))).into_response(),
        None => errors::json_error(StatusCode::NOT_FOUND, "not_found", "order not found"),
    }
}

pub async fn delete_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<u64>,
) -> axum::response::Response {
    let (removed, detail) = services.ledger.delete_order(OrderId::new(id));
    (
        StatusCode::OK,
        Json(serde_json::json!({ "ok": removed, "detail": detail })),
    )
        .into_response()
}

pub async fn upsert_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<u64>,
    Json(body): Json<dto::OrderItemRequest>,
) -> axum::response::Response {
    match services
        .ledger
        .upsert_item(OrderId::new(id), body.product_id.into(), body.count)
    {
        Ok(order) => (StatusCode::OK, Json(dto::order_to_json(&order))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// Status changes route by target state: marking an order paid goes through
/// the reconciler so the stock decrement and the flip commit together.
pub async fn set_status(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<u64>,
    Json(body): Json<dto::SetStatusRequest>,
) -> axum::response::Response {
    let order_id = OrderId::new(id);
    let result = match body.status {
        OrderStatus::Paid => services.reconciler.confirm_payment(order_id).map(|_| ()),
        OrderStatus::Unpaid => services.ledger.set_status(order_id, OrderStatus::Unpaid),
    };
    match result {
        Ok(()) => (StatusCode::OK, Json(serde_json::json!({ "ok": true }))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn order_total(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<u64>,
) -> axum::response::Response {
    match services.reporter.order_total_by_id(OrderId::new(id)) {
        Some(total) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "order_id": id,
                "total": storefront_core::money::major_from_minor(total),
            })),
        )
            .into_response(),
        None => errors::json_error(StatusCode::NOT_FOUND, "not_found", "order not found"),
    }
}
