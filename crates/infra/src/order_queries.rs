//! Direct-to-DTO projection queries for the order views.
//!
//! Unlike the entity-loading strategies in `orders`, these select exactly the
//! columns the API renders, at the cost of coupling repository SQL to the
//! response shape. Three collection strategies again: one query per root,
//! one IN-clause query for all roots, and one flat join reassembled in
//! memory.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;

use storefront_core::{Address, OrderId};
use storefront_orders::OrderStatus;

use crate::error::StoreResult;
use crate::orders::order_status_from_str;

/// To-one-only order view, projected straight from the database.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderSimpleQueryDto {
    pub order_id: OrderId,
    pub name: String,
    pub order_date: DateTime<Utc>,
    pub order_status: OrderStatus,
    pub address: Address,
}

/// One projected order line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderItemQueryDto {
    pub order_id: OrderId,
    pub item_name: String,
    pub order_price: i64,
    pub count: i64,
}

/// Full projected order view (root plus lines).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderQueryDto {
    pub order_id: OrderId,
    pub name: String,
    pub order_date: DateTime<Utc>,
    pub order_status: OrderStatus,
    pub address: Address,
    pub order_items: Vec<OrderItemQueryDto>,
}

/// One row of the flat single-query projection: root columns duplicated onto
/// every line row.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderFlatDto {
    pub order_id: OrderId,
    pub name: String,
    pub order_date: DateTime<Utc>,
    pub order_status: OrderStatus,
    pub address: Address,
    pub item_name: String,
    pub order_price: i64,
    pub count: i64,
}

/// Reassemble flat rows into one DTO per order.
///
/// Groups by root identity (order id), keeps the incoming row order of each
/// order's lines, and sorts the result by order id ascending.
pub(crate) fn assemble_flat(flats: Vec<OrderFlatDto>) -> Vec<OrderQueryDto> {
    let mut index: HashMap<OrderId, usize> = HashMap::new();
    let mut orders: Vec<OrderQueryDto> = Vec::new();
    for flat in flats {
        let line = OrderItemQueryDto {
            order_id: flat.order_id,
            item_name: flat.item_name,
            order_price: flat.order_price,
            count: flat.count,
        };
        match index.get(&flat.order_id) {
            Some(&at) => orders[at].order_items.push(line),
            None => {
                index.insert(flat.order_id, orders.len());
                orders.push(OrderQueryDto {
                    order_id: flat.order_id,
                    name: flat.name,
                    order_date: flat.order_date,
                    order_status: flat.order_status,
                    address: flat.address,
                    order_items: vec![line],
                });
            }
        }
    }
    orders.sort_by_key(|o| o.order_id);
    orders
}

/// Group projected lines by their parent order id, keeping row order.
pub(crate) fn group_order_items(
    items: Vec<OrderItemQueryDto>,
) -> HashMap<OrderId, Vec<OrderItemQueryDto>> {
    let mut by_order: HashMap<OrderId, Vec<OrderItemQueryDto>> = HashMap::new();
    for item in items {
        by_order.entry(item.order_id).or_default().push(item);
    }
    by_order
}

const ROOT_SELECT: &str = "SELECT o.order_id, m.name AS member_name, o.order_date, \
            o.status AS order_status, d.city AS delivery_city, \
            d.street AS delivery_street, d.zipcode AS delivery_zipcode \
     FROM orders o \
     JOIN members m ON m.member_id = o.member_id \
     JOIN deliveries d ON d.delivery_id = o.delivery_id \
     ORDER BY o.order_id";

fn root_from_row(row: &PgRow) -> StoreResult<OrderQueryDto> {
    let order_id: uuid::Uuid = row.try_get("order_id")?;
    let name: String = row.try_get("member_name")?;
    let order_date: DateTime<Utc> = row.try_get("order_date")?;
    let status: String = row.try_get("order_status")?;
    Ok(OrderQueryDto {
        order_id: OrderId::from_uuid(order_id),
        name,
        order_date,
        order_status: order_status_from_str(&status)?,
        address: address_from_row(row)?,
        order_items: Vec::new(),
    })
}

fn address_from_row(row: &PgRow) -> StoreResult<Address> {
    let city: String = row.try_get("delivery_city")?;
    let street: String = row.try_get("delivery_street")?;
    let zipcode: String = row.try_get("delivery_zipcode")?;
    Ok(Address::new(city, street, zipcode))
}

fn item_dto_from_row(row: &PgRow) -> StoreResult<OrderItemQueryDto> {
    let order_id: uuid::Uuid = row.try_get("order_id")?;
    let item_name: String = row.try_get("item_name")?;
    let order_price: i64 = row.try_get("order_price")?;
    let count: i64 = row.try_get("line_count")?;
    Ok(OrderItemQueryDto {
        order_id: OrderId::from_uuid(order_id),
        item_name,
        order_price,
        count,
    })
}

/// PostgreSQL-backed projection store for the order views.
#[derive(Debug, Clone)]
pub struct OrderQueryStore {
    pool: Arc<PgPool>,
}

impl OrderQueryStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// To-one-only projection: one query, pageable, nothing to reassemble.
    #[instrument(skip(self), err)]
    pub async fn find_simple_dtos(&self) -> StoreResult<Vec<OrderSimpleQueryDto>> {
        let rows = sqlx::query(ROOT_SELECT).fetch_all(&*self.pool).await?;
        rows.iter()
            .map(|row| {
                let root = root_from_row(row)?;
                Ok(OrderSimpleQueryDto {
                    order_id: root.order_id,
                    name: root.name,
                    order_date: root.order_date,
                    order_status: root.order_status,
                    address: root.address,
                })
            })
            .collect()
    }

    /// Root query plus one line query per order (1 + N). The root query is
    /// pageable; each order pays one extra round trip.
    #[instrument(skip(self), err)]
    pub async fn find_order_dtos(&self) -> StoreResult<Vec<OrderQueryDto>> {
        let rows = sqlx::query(ROOT_SELECT).fetch_all(&*self.pool).await?;
        let mut orders: Vec<OrderQueryDto> =
            rows.iter().map(root_from_row).collect::<StoreResult<_>>()?;

        for order in &mut orders {
            let rows = sqlx::query(
                "SELECT oi.order_id, i.name AS item_name, oi.order_price, \
                        oi.count AS line_count \
                 FROM order_items oi \
                 JOIN items i ON i.item_id = oi.item_id \
                 WHERE oi.order_id = $1 \
                 ORDER BY oi.order_item_id",
            )
            .bind(order.order_id.as_uuid())
            .fetch_all(&*self.pool)
            .await?;
            order.order_items = rows.iter().map(item_dto_from_row).collect::<StoreResult<_>>()?;
        }
        Ok(orders)
    }

    /// Root query plus one IN-clause query covering every root (1 + 1).
    #[instrument(skip(self), err)]
    pub async fn find_order_dtos_optimized(&self) -> StoreResult<Vec<OrderQueryDto>> {
        let rows = sqlx::query(ROOT_SELECT).fetch_all(&*self.pool).await?;
        let mut orders: Vec<OrderQueryDto> =
            rows.iter().map(root_from_row).collect::<StoreResult<_>>()?;

        let order_ids: Vec<uuid::Uuid> =
            orders.iter().map(|o| *o.order_id.as_uuid()).collect();

        let rows = sqlx::query(
            "SELECT oi.order_id, i.name AS item_name, oi.order_price, \
                    oi.count AS line_count \
             FROM order_items oi \
             JOIN items i ON i.item_id = oi.item_id \
             WHERE oi.order_id = ANY($1) \
             ORDER BY oi.order_item_id",
        )
        .bind(&order_ids)
        .fetch_all(&*self.pool)
        .await?;
        let items: Vec<OrderItemQueryDto> =
            rows.iter().map(item_dto_from_row).collect::<StoreResult<_>>()?;

        let mut by_order = group_order_items(items);
        for order in &mut orders {
            order.order_items = by_order.remove(&order.order_id).unwrap_or_default();
        }
        Ok(orders)
    }

    /// Flat single-query projection (1 query, duplicated root columns),
    /// regrouped in application memory. NOT pageable.
    #[instrument(skip(self), err)]
    pub async fn find_order_dtos_flat(&self) -> StoreResult<Vec<OrderQueryDto>> {
        let rows = sqlx::query(
            "SELECT o.order_id, m.name AS member_name, o.order_date, \
                    o.status AS order_status, d.city AS delivery_city, \
                    d.street AS delivery_street, d.zipcode AS delivery_zipcode, \
                    i.name AS item_name, oi.order_price, oi.count AS line_count \
             FROM orders o \
             JOIN members m ON m.member_id = o.member_id \
             JOIN deliveries d ON d.delivery_id = o.delivery_id \
             JOIN order_items oi ON oi.order_id = o.order_id \
             JOIN items i ON i.item_id = oi.item_id \
             ORDER BY oi.order_item_id",
        )
        .fetch_all(&*self.pool)
        .await?;

        let mut flats = Vec::with_capacity(rows.len());
        for row in &rows {
            let root = root_from_row(row)?;
            let line = item_dto_from_row(row)?;
            flats.push(OrderFlatDto {
                order_id: root.order_id,
                name: root.name,
                order_date: root.order_date,
                order_status: root.order_status,
                address: root.address,
                item_name: line.item_name,
                order_price: line.order_price,
                count: line.count,
            });
        }
        Ok(assemble_flat(flats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn order_id(n: u128) -> OrderId {
        OrderId::from_uuid(Uuid::from_u128(n))
    }

    fn test_address() -> Address {
        Address::new("Seoul", "Teheran-ro 1", "06000")
    }

    fn flat(order_id: OrderId, name: &str, item: &str, price: i64, count: i64) -> OrderFlatDto {
        OrderFlatDto {
            order_id,
            name: name.to_string(),
            order_date: Utc::now(),
            order_status: OrderStatus::Ordered,
            address: test_address(),
            item_name: item.to_string(),
            order_price: price,
            count,
        }
    }

    #[test]
    fn assemble_groups_by_order_id_and_keeps_line_order() {
        let id_a = order_id(1);
        let id_b = order_id(2);

        // Interleaved rows, as a join with no root ordering may produce.
        let flats = vec![
            flat(id_b, "lee", "book-3", 300, 2),
            flat(id_a, "kim", "book-1", 100, 3),
            flat(id_b, "lee", "book-4", 400, 1),
            flat(id_a, "kim", "book-2", 200, 1),
        ];

        let orders = assemble_flat(flats);
        assert_eq!(orders.len(), 2);

        // Sorted by order id ascending.
        assert_eq!(orders[0].order_id, id_a);
        assert_eq!(orders[1].order_id, id_b);

        let a_items: Vec<_> = orders[0]
            .order_items
            .iter()
            .map(|i| i.item_name.as_str())
            .collect();
        assert_eq!(a_items, ["book-1", "book-2"]);
        let b_items: Vec<_> = orders[1]
            .order_items
            .iter()
            .map(|i| i.item_name.as_str())
            .collect();
        assert_eq!(b_items, ["book-3", "book-4"]);
    }

    #[test]
    fn assemble_matches_per_root_grouping_of_the_same_rows() {
        let id_a = order_id(1);
        let id_b = order_id(2);
        let flats = vec![
            flat(id_a, "kim", "book-1", 100, 3),
            flat(id_a, "kim", "book-2", 200, 1),
            flat(id_b, "lee", "book-3", 300, 2),
        ];

        // The flat path and the grouped-lines path must agree on content.
        let assembled = assemble_flat(flats.clone());

        let lines: Vec<OrderItemQueryDto> = flats
            .iter()
            .map(|f| OrderItemQueryDto {
                order_id: f.order_id,
                item_name: f.item_name.clone(),
                order_price: f.order_price,
                count: f.count,
            })
            .collect();
        let mut by_order = group_order_items(lines);

        for order in &assembled {
            assert_eq!(
                order.order_items,
                by_order.remove(&order.order_id).unwrap()
            );
        }
        assert!(by_order.is_empty());
    }

    #[test]
    fn assemble_of_nothing_is_empty() {
        assert!(assemble_flat(Vec::new()).is_empty());
    }

    #[test]
    fn line_totals_survive_reassembly() {
        let id = order_id(7);
        let flats = vec![flat(id, "kim", "book-1", 100, 3)];
        let orders = assemble_flat(flats);
        let total: i64 = orders[0]
            .order_items
            .iter()
            .map(|i| i.order_price * i.count)
            .sum();
        assert_eq!(total, 300);
    }
}
