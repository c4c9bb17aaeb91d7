use storefront_infra::orders::OrderSearch;

use crate::app::dto::OrderSearchParams;
use crate::app::errors;

/// Translate optional query parameters into an `OrderSearch` filter.
pub fn search_from_params(
    params: OrderSearchParams,
) -> Result<OrderSearch, axum::response::Response> {
    let status = match params.status.as_deref() {
        Some(s) => Some(errors::parse_order_status(s)?),
        None => None,
    };
    Ok(OrderSearch {
        member_name: params.member_name,
        status,
    })
}
