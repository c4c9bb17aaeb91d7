use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use storefront_core::{CategoryId, ItemId};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/api/categories", post(create_category))
        .route("/api/categories/:id", get(get_category))
        .route(
            "/api/categories/:id/children",
            get(list_children).post(add_child),
        )
        .route(
            "/api/categories/:id/items",
            get(list_category_items).post(attach_item),
        )
}

fn parse_category_id(id: &str) -> Result<CategoryId, axum::response::Response> {
    id.parse().map_err(|_| {
        errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid category id")
    })
}

pub async fn create_category(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateCategoryRequest>,
) -> axum::response::Response {
    match services.categories.create(&body.name).await {
        Ok(id) => (
            StatusCode::CREATED,
            Json(serde_json::json!({"id": id.to_string()})),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_category(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let category_id = match parse_category_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.categories.find_one(category_id).await {
        Ok(category) => (StatusCode::OK, Json(category)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn add_child(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::AddCategoryChildRequest>,
) -> axum::response::Response {
    let parent_id = match parse_category_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let child_id = match parse_category_id(&body.child_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.categories.add_child(parent_id, child_id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "parent_id": parent_id.to_string(),
                "child_id": child_id.to_string(),
            })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list_children(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let category_id = match parse_category_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.categories.children(category_id).await {
        Ok(children) => (StatusCode::OK, Json(dto::wrap_data(children))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn attach_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::AttachCategoryItemRequest>,
) -> axum::response::Response {
    let category_id = match parse_category_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let item_id: ItemId = match body.item_id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid item id");
        }
    };
    match services.categories.attach_item(category_id, item_id).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list_category_items(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let category_id = match parse_category_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.categories.items(category_id).await {
        Ok(items) => (StatusCode::OK, Json(dto::wrap_data(items))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
