use axum::Router;

pub mod categories;
pub mod common;
pub mod items;
pub mod members;
pub mod orders;
pub mod simple_orders;
pub mod system;

/// Router for all API endpoints.
pub fn router() -> Router {
    Router::new()
        .merge(members::router())
        .merge(simple_orders::router())
        .merge(orders::router())
        .merge(items::router())
        .merge(categories::router())
}
