use serde::Deserialize;
use serde_json::{Value as JsonValue, json};

use storefront_catalog::{NewProduct, Product, ProductPatch};
use storefront_core::money;
use storefront_orders::{NewOrderItem, Order, OrderStatus};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub title: String,
    #[serde(default)]
    pub image: String,
    pub price: f64,
    pub count: i64,
    #[serde(default)]
    pub description: String,
}

impl From<CreateProductRequest> for NewProduct {
    fn from(value: CreateProductRequest) -> Self {
        NewProduct {
            title: value.title,
            image: value.image,
            price: value.price,
            count: value.count,
            description: value.description,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub title: Option<String>,
    pub image: Option<String>,
    pub price: Option<f64>,
    pub count: Option<i64>,
    pub description: Option<String>,
}

impl From<UpdateProductRequest> for ProductPatch {
    fn from(value: UpdateProductRequest) -> Self {
        ProductPatch {
            title: value.title,
            image: value.image,
            price: value.price,
            count: value.count,
            description: value.description,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct OrderItemRequest {
    pub product_id: u64,
    pub count: i64,
}

impl From<OrderItemRequest> for NewOrderItem {
    fn from(value: OrderItemRequest) -> Self {
        NewOrderItem {
            product_id: value.product_id.into(),
            count: value.count,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub items: Vec<OrderItemRequest>,
}

#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: OrderStatus,
}

// -------------------------
// Response mapping
// -------------------------

pub fn product_to_json(product: &Product) -> JsonValue {
    json!({
        "id": product.id,
        "title": product.title,
        "image": product.image,
        "price": money::major_from_minor(product.price_minor),
        "count": product.count,
        "description": product.description,
    })
}

pub fn order_to_json(order: &Order) -> JsonValue {
    json!({
        "id": order.id,
        "status": order.status,
        "items": order.items.iter().map(|item| json!({
            "id": item.id,
            "product_id": item.product_id,
            "count": item.count,
        })).collect::<Vec<_>>(),
    })
}
