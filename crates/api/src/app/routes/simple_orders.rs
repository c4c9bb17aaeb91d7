//! To-one order views (order + member + delivery, no lines).
//!
//! Four variants of the same payload, in increasing order of query
//! discipline: naive entity loading (v1 exposes the graph, v2 maps to DTOs),
//! a to-one fetch-join (v3), and a direct DTO projection (v4).

use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use crate::app::routes::common::search_from_params;
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/api/v1/simple-orders", get(simple_orders_v1))
        .route("/api/v2/simple-orders", get(simple_orders_v2))
        .route("/api/v3/simple-orders", get(simple_orders_v3))
        .route("/api/v4/simple-orders", get(simple_orders_v4))
}

/// V1: naive loading (1 + N member + N delivery queries), graph exposed
/// directly.
pub async fn simple_orders_v1(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<dto::OrderSearchParams>,
) -> axum::response::Response {
    let search = match search_from_params(params) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    match services.orders.find_simple_naive(&search).await {
        Ok(graphs) => (StatusCode::OK, Json(graphs)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// V2: same query count as v1, mapped to DTOs.
pub async fn simple_orders_v2(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<dto::OrderSearchParams>,
) -> axum::response::Response {
    let search = match search_from_params(params) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    match services.orders.find_simple_naive(&search).await {
        Ok(graphs) => {
            let data: Vec<dto::SimpleOrderDto> = graphs.iter().map(Into::into).collect();
            (StatusCode::OK, Json(dto::wrap_data(data))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

/// V3: to-one fetch-join, one query.
pub async fn simple_orders_v3(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.orders.find_simple_with_member_delivery().await {
        Ok(graphs) => {
            let data: Vec<dto::SimpleOrderDto> = graphs.iter().map(Into::into).collect();
            (StatusCode::OK, Json(dto::wrap_data(data))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

/// V4: direct DTO projection, one query selecting exactly the rendered
/// columns.
pub async fn simple_orders_v4(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.order_queries.find_simple_dtos().await {
        Ok(dtos) => (StatusCode::OK, Json(dto::wrap_data(dtos))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
