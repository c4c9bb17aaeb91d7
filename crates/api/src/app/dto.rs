use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_catalog::ItemKind;
use storefront_core::Address;
use storefront_infra::orders::{OrderGraph, SimpleOrderGraph};
use storefront_orders::OrderStatus;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct AddressRequest {
    pub city: String,
    pub street: String,
    pub zipcode: String,
}

impl From<AddressRequest> for Address {
    fn from(value: AddressRequest) -> Self {
        Address::new(value.city, value.street, value.zipcode)
    }
}

/// Raw member shape for the v1 registration endpoint, which deliberately
/// mirrors the entity instead of a purpose-built DTO.
#[derive(Debug, Deserialize)]
pub struct RawMemberRequest {
    pub name: String,
    pub address: Option<AddressRequest>,
}

#[derive(Debug, Deserialize)]
pub struct CreateMemberRequest {
    pub name: String,
    pub address: Option<AddressRequest>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMemberRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub member_id: String,
    pub item_id: String,
    pub count: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    pub name: String,
    pub price: i64,
    pub stock_quantity: i64,
    #[serde(flatten)]
    pub kind: ItemKind,
}

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct AddCategoryChildRequest {
    pub child_id: String,
}

#[derive(Debug, Deserialize)]
pub struct AttachCategoryItemRequest {
    pub item_id: String,
}

#[derive(Debug, Deserialize)]
pub struct OrderSearchParams {
    pub member_name: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PageParams {
    #[serde(default)]
    pub offset: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

// -------------------------
// Response DTOs
// -------------------------

/// To-one order view rendered by the v2/v3 simple endpoints.
#[derive(Debug, Serialize)]
pub struct SimpleOrderDto {
    pub order_id: storefront_core::OrderId,
    pub name: String,
    pub order_date: DateTime<Utc>,
    pub order_status: OrderStatus,
    pub address: Address,
}

impl From<&SimpleOrderGraph> for SimpleOrderDto {
    fn from(graph: &SimpleOrderGraph) -> Self {
        Self {
            order_id: graph.order_id,
            name: graph.member.name().to_string(),
            order_date: graph.order_date,
            order_status: graph.status,
            address: graph.delivery.address().clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderItemDto {
    pub item_name: String,
    pub order_price: i64,
    pub count: i64,
}

/// Full aggregate view rendered by the v2/v3/v3.1 order endpoints.
#[derive(Debug, Serialize)]
pub struct OrderDto {
    pub order_id: storefront_core::OrderId,
    pub name: String,
    pub order_date: DateTime<Utc>,
    pub order_status: OrderStatus,
    pub address: Address,
    pub order_items: Vec<OrderItemDto>,
}

impl From<&OrderGraph> for OrderDto {
    fn from(graph: &OrderGraph) -> Self {
        Self {
            order_id: graph.order_id,
            name: graph.member.name().to_string(),
            order_date: graph.order_date,
            order_status: graph.status,
            address: graph.delivery.address().clone(),
            order_items: graph
                .lines
                .iter()
                .map(|line| OrderItemDto {
                    item_name: line.item.name().to_string(),
                    order_price: line.order_item.order_price(),
                    count: line.order_item.count(),
                })
                .collect(),
        }
    }
}

/// Response envelope, so list payloads can grow fields later.
pub fn wrap_data<T: Serialize>(data: T) -> serde_json::Value {
    serde_json::json!({ "data": data })
}
