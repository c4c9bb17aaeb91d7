use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use storefront_core::{Address, MemberId};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route(
            "/api/v1/members",
            get(members_v1).post(create_member_v1),
        )
        .route(
            "/api/v2/members",
            get(members_v2).post(create_member_v2),
        )
        .route("/api/v2/members/:id", post(update_member_v2))
}

/// V1 list: exposes the member entities directly, ids and addresses
/// included. Kept as the worked anti-pattern; prefer the v2 DTO list.
pub async fn members_v1(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.members.find_all().await {
        Ok(members) => (StatusCode::OK, Json(members)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// V1 registration: binds the raw member shape from the request body.
pub async fn create_member_v1(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RawMemberRequest>,
) -> axum::response::Response {
    let address = body
        .address
        .map(Address::from)
        .unwrap_or_else(|| Address::new("", "", ""));
    match services.members.register(&body.name, address).await {
        Ok(id) => (
            StatusCode::CREATED,
            Json(serde_json::json!({"id": id.to_string()})),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// V2 list: name-only DTOs inside a response envelope.
pub async fn members_v2(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.members.find_all().await {
        Ok(members) => {
            let data: Vec<_> = members
                .iter()
                .map(|m| serde_json::json!({"name": m.name()}))
                .collect();
            (StatusCode::OK, Json(dto::wrap_data(data))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

/// V2 registration: request DTO decoupled from the entity.
pub async fn create_member_v2(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateMemberRequest>,
) -> axum::response::Response {
    let address = body
        .address
        .map(Address::from)
        .unwrap_or_else(|| Address::new("", "", ""));
    match services.members.register(&body.name, address).await {
        Ok(id) => (
            StatusCode::CREATED,
            Json(serde_json::json!({"id": id.to_string()})),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// Partial update via POST (not PUT; only the name changes).
pub async fn update_member_v2(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateMemberRequest>,
) -> axum::response::Response {
    let member_id: MemberId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid member id");
        }
    };
    // Update and select kept separate.
    if let Err(e) = services.members.update_name(member_id, &body.name).await {
        return errors::store_error_to_response(e);
    }
    match services.members.find_one(member_id).await {
        Ok(member) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "id": member.id_typed().to_string(),
                "name": member.name(),
            })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
