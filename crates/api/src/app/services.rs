//! Service wiring: one shared pool, one store per aggregate.

use storefront_infra::catalog::{CategoryStore, ItemStore};
use storefront_infra::members::MemberStore;
use storefront_infra::order_queries::OrderQueryStore;
use storefront_infra::orders::OrderStore;
use storefront_infra::{connect, init_schema, StoreConfig};

/// Shared application services handed to every handler via `Extension`.
pub struct AppServices {
    pub members: MemberStore,
    pub items: ItemStore,
    pub categories: CategoryStore,
    pub orders: OrderStore,
    pub order_queries: OrderQueryStore,
}

/// Connect the pool, bootstrap the schema, and wire the stores.
pub async fn build_services(config: &StoreConfig) -> anyhow::Result<AppServices> {
    let pool = connect(config).await?;
    init_schema(&pool).await?;

    Ok(AppServices {
        members: MemberStore::new(pool.clone()),
        items: ItemStore::new(pool.clone()),
        categories: CategoryStore::new(pool.clone()),
        orders: OrderStore::new(pool.clone(), config.batch_fetch_size),
        order_queries: OrderQueryStore::new(pool),
    })
}
