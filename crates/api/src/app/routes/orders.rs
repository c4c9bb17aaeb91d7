//! Full order aggregate views (member, delivery, lines with item names),
//! plus placement and cancellation.
//!
//! The v1-v6 list endpoints return the same logical content and differ only
//! in how it is fetched; see the store documentation for the query-count and
//! pageability tradeoffs of each strategy.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use storefront_core::{ItemId, MemberId, OrderId};

use crate::app::routes::common::search_from_params;
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/api/v1/orders", get(orders_v1))
        .route("/api/v2/orders", get(orders_v2))
        .route("/api/v3/orders", get(orders_v3))
        .route("/api/v3.1/orders", get(orders_v3_1))
        .route("/api/v4/orders", get(orders_v4))
        .route("/api/v5/orders", get(orders_v5))
        .route("/api/v6/orders", get(orders_v6))
        .route("/api/orders", post(create_order))
        .route("/api/orders/:id/cancel", post(cancel_order))
}

/// V1: naive entity loading (1 + N + N + N + M queries), graphs exposed
/// directly.
pub async fn orders_v1(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<dto::OrderSearchParams>,
) -> axum::response::Response {
    let search = match search_from_params(params) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    match services.orders.find_all_naive(&search).await {
        Ok(graphs) => (StatusCode::OK, Json(graphs)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// V2: same loading as v1, mapped to DTOs.
pub async fn orders_v2(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<dto::OrderSearchParams>,
) -> axum::response::Response {
    let search = match search_from_params(params) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    match services.orders.find_all_naive(&search).await {
        Ok(graphs) => {
            let data: Vec<dto::OrderDto> = graphs.iter().map(Into::into).collect();
            (StatusCode::OK, Json(dto::wrap_data(data))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

/// V3: single fetch-join including the line collection, deduplicated in
/// memory. Not pageable.
pub async fn orders_v3(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.orders.find_all_with_items().await {
        Ok(graphs) => {
            let data: Vec<dto::OrderDto> = graphs.iter().map(Into::into).collect();
            (StatusCode::OK, Json(dto::wrap_data(data))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

/// V3.1: paged to-one join plus batched IN-clause collection loading.
pub async fn orders_v3_1(
    Extension(services): Extension<Arc<AppServices>>,
    Query(page): Query<dto::PageParams>,
) -> axum::response::Response {
    match services
        .orders
        .find_all_paged_with_lines(page.offset, page.limit)
        .await
    {
        Ok(graphs) => {
            let data: Vec<dto::OrderDto> = graphs.iter().map(Into::into).collect();
            (StatusCode::OK, Json(dto::wrap_data(data))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

/// V4: DTO projection, one line query per order.
pub async fn orders_v4(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.order_queries.find_order_dtos().await {
        Ok(dtos) => (StatusCode::OK, Json(dto::wrap_data(dtos))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// V5: DTO projection, one IN-clause line query for all orders.
pub async fn orders_v5(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.order_queries.find_order_dtos_optimized().await {
        Ok(dtos) => (StatusCode::OK, Json(dto::wrap_data(dtos))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// V6: single flat projection, regrouped and sorted in memory. Not pageable.
pub async fn orders_v6(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.order_queries.find_order_dtos_flat().await {
        Ok(dtos) => (StatusCode::OK, Json(dto::wrap_data(dtos))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn create_order(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateOrderRequest>,
) -> axum::response::Response {
    let member_id: MemberId = match body.member_id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid member id");
        }
    };
    let item_id: ItemId = match body.item_id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid item id");
        }
    };

    match services
        .orders
        .place_order(member_id, item_id, body.count)
        .await
    {
        Ok(id) => (
            StatusCode::CREATED,
            Json(serde_json::json!({"id": id.to_string()})),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn cancel_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let order_id: OrderId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid order id");
        }
    };
    match services.orders.cancel_order(order_id).await {
        Ok(order) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "id": order.id_typed().to_string(),
                "status": order.status(),
            })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
