use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new().route("/api/items", post(create_item).get(list_items))
}

pub async fn create_item(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateItemRequest>,
) -> axum::response::Response {
    match services
        .items
        .create(body.kind, &body.name, body.price, body.stock_quantity)
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

pub async fn list_items(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.items.find_all().await {
        Ok(items) => (StatusCode::OK, Json(dto::wrap_data(items))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
