use axum::Router;

pub mod orders;
pub mod products;
pub mod reports;
pub mod system;

/// Router for all service endpoints.
pub fn router() -> Router {
    Router::new()
        .nest("/products", products::router())
        .nest("/orders", orders::router())
        .nest("/reports", reports::router())
}
