//! Order store: transactional placement/cancellation and the entity-loading
//! strategies.
//!
//! The loading rule all strategies follow: joining a to-one association
//! (order -> member, order -> delivery) never multiplies result rows, so it
//! is always safe to join eagerly; joining a to-many association
//! (order -> order_items) multiplies rows, so pageable paths must load the
//! collection separately (per parent, or batched with an IN-clause).

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, PgPool, Row};
use tracing::instrument;

use storefront_catalog::Item;
use storefront_core::{
    Address, DeliveryId, ItemId, MemberId, OrderId, OrderItemId,
};
use storefront_members::Member;
use storefront_orders::{Delivery, DeliveryStatus, Order, OrderItem, OrderStatus};

use crate::catalog::{self, ITEM_COLUMNS};
use crate::error::{StoreError, StoreResult};
use crate::members::{member_from_row, MEMBER_COLUMNS};

/// Canonical delivery column aliases, shared with the joined order queries.
pub(crate) const DELIVERY_COLUMNS: &str = "d.delivery_id, d.city AS delivery_city, \
     d.street AS delivery_street, d.zipcode AS delivery_zipcode, d.status AS delivery_status";

pub(crate) fn order_status_as_str(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Ordered => "ordered",
        OrderStatus::Canceled => "canceled",
    }
}

pub(crate) fn order_status_from_str(s: &str) -> StoreResult<OrderStatus> {
    match s {
        "ordered" => Ok(OrderStatus::Ordered),
        "canceled" => Ok(OrderStatus::Canceled),
        other => Err(StoreError::corrupt(format!("unknown order status: {other}"))),
    }
}

fn delivery_status_as_str(status: DeliveryStatus) -> &'static str {
    match status {
        DeliveryStatus::Ready => "ready",
        DeliveryStatus::Completed => "completed",
    }
}

fn delivery_status_from_str(s: &str) -> StoreResult<DeliveryStatus> {
    match s {
        "ready" => Ok(DeliveryStatus::Ready),
        "completed" => Ok(DeliveryStatus::Completed),
        other => Err(StoreError::corrupt(format!(
            "unknown delivery status: {other}"
        ))),
    }
}

fn delivery_from_row(row: &PgRow) -> StoreResult<Delivery> {
    let id: uuid::Uuid = row.try_get("delivery_id")?;
    let city: String = row.try_get("delivery_city")?;
    let street: String = row.try_get("delivery_street")?;
    let zipcode: String = row.try_get("delivery_zipcode")?;
    let status: String = row.try_get("delivery_status")?;
    Ok(Delivery::from_parts(
        DeliveryId::from_uuid(id),
        Address::new(city, street, zipcode),
        delivery_status_from_str(&status)?,
    ))
}

/// Filter for entity list queries (member name and/or status).
#[derive(Debug, Clone, Default)]
pub struct OrderSearch {
    pub member_name: Option<String>,
    pub status: Option<OrderStatus>,
}

/// Order with its to-one associations resolved (no lines).
///
/// This is what a pageable query may safely produce in one round trip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimpleOrderGraph {
    pub order_id: OrderId,
    pub member: Member,
    pub delivery: Delivery,
    pub order_date: DateTime<Utc>,
    pub status: OrderStatus,
}

/// One resolved order line: the line itself plus the referenced catalog item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderLineGraph {
    pub order_item: OrderItem,
    pub item: Item,
}

/// Fully-populated order graph: everything the aggregate endpoints render.
///
/// There are no lazy placeholders anywhere; a constructed graph is complete.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderGraph {
    pub order_id: OrderId,
    pub member: Member,
    pub delivery: Delivery,
    pub order_date: DateTime<Utc>,
    pub status: OrderStatus,
    pub lines: Vec<OrderLineGraph>,
}

impl OrderGraph {
    fn from_head(head: SimpleOrderGraph, lines: Vec<OrderLineGraph>) -> Self {
        Self {
            order_id: head.order_id,
            member: head.member,
            delivery: head.delivery,
            order_date: head.order_date,
            status: head.status,
            lines,
        }
    }
}

/// Collapse duplicated join rows (one per order line) back into one graph per
/// order. Keys on order identity, keeps first-seen order of the roots, and
/// keeps the incoming row order of each order's lines.
pub(crate) fn fold_joined_rows(rows: Vec<(SimpleOrderGraph, OrderLineGraph)>) -> Vec<OrderGraph> {
    let mut index: HashMap<OrderId, usize> = HashMap::new();
    let mut graphs: Vec<OrderGraph> = Vec::new();
    for (head, line) in rows {
        match index.get(&head.order_id) {
            Some(&at) => graphs[at].lines.push(line),
            None => {
                index.insert(head.order_id, graphs.len());
                graphs.push(OrderGraph::from_head(head, vec![line]));
            }
        }
    }
    graphs
}

/// Group separately-loaded lines by their parent order id, keeping row order.
pub(crate) fn group_lines_by_order(
    rows: Vec<(OrderId, OrderLineGraph)>,
) -> HashMap<OrderId, Vec<OrderLineGraph>> {
    let mut by_order: HashMap<OrderId, Vec<OrderLineGraph>> = HashMap::new();
    for (order_id, line) in rows {
        by_order.entry(order_id).or_default().push(line);
    }
    by_order
}

/// Attach grouped lines to their heads, preserving head order.
pub(crate) fn attach_lines(
    heads: Vec<SimpleOrderGraph>,
    mut by_order: HashMap<OrderId, Vec<OrderLineGraph>>,
) -> Vec<OrderGraph> {
    heads
        .into_iter()
        .map(|head| {
            let lines = by_order.remove(&head.order_id).unwrap_or_default();
            OrderGraph::from_head(head, lines)
        })
        .collect()
}

fn simple_graph_from_row(row: &PgRow) -> StoreResult<SimpleOrderGraph> {
    let order_id: uuid::Uuid = row.try_get("order_id")?;
    let order_date: DateTime<Utc> = row.try_get("order_date")?;
    let status: String = row.try_get("order_status")?;
    Ok(SimpleOrderGraph {
        order_id: OrderId::from_uuid(order_id),
        member: member_from_row(row)?,
        delivery: delivery_from_row(row)?,
        order_date,
        status: order_status_from_str(&status)?,
    })
}

fn line_graph_from_row(row: &PgRow) -> StoreResult<OrderLineGraph> {
    let item = catalog::item_from_row(row)?;
    let order_item_id: uuid::Uuid = row.try_get("order_item_id")?;
    let order_price: i64 = row.try_get("order_price")?;
    let count: i64 = row.try_get("line_count")?;
    Ok(OrderLineGraph {
        order_item: OrderItem::from_parts(
            OrderItemId::from_uuid(order_item_id),
            item.id_typed(),
            order_price,
            count,
        ),
        item,
    })
}

/// Bare row of the orders table; associations are resolved separately.
struct OrderRow {
    order_id: OrderId,
    member_id: MemberId,
    delivery_id: DeliveryId,
    order_date: DateTime<Utc>,
    status: OrderStatus,
}

fn order_row_from_row(row: &PgRow) -> StoreResult<OrderRow> {
    let order_id: uuid::Uuid = row.try_get("order_id")?;
    let member_id: uuid::Uuid = row.try_get("member_id")?;
    let delivery_id: uuid::Uuid = row.try_get("delivery_id")?;
    let order_date: DateTime<Utc> = row.try_get("order_date")?;
    let status: String = row.try_get("order_status")?;
    Ok(OrderRow {
        order_id: OrderId::from_uuid(order_id),
        member_id: MemberId::from_uuid(member_id),
        delivery_id: DeliveryId::from_uuid(delivery_id),
        order_date,
        status: order_status_from_str(&status)?,
    })
}

/// PostgreSQL-backed order store.
#[derive(Debug, Clone)]
pub struct OrderStore {
    pool: Arc<PgPool>,
    batch_fetch_size: usize,
}

impl OrderStore {
    pub fn new(pool: PgPool, batch_fetch_size: usize) -> Self {
        Self {
            pool: Arc::new(pool),
            batch_fetch_size: batch_fetch_size.max(1),
        }
    }

    /// Place a single-item order.
    #[instrument(
        skip(self),
        fields(member_id = %member_id, item_id = %item_id, count = count),
        err
    )]
    pub async fn place_order(
        &self,
        member_id: MemberId,
        item_id: ItemId,
        count: i64,
    ) -> StoreResult<OrderId> {
        self.place_order_with_lines(member_id, &[(item_id, count)])
            .await
    }

    /// Place an order with one or more lines: one transaction covering the
    /// member lookup, the row-locked stock decrements, and the cascade
    /// insert of the aggregate (delivery, order, order items).
    #[instrument(skip(self, lines), fields(member_id = %member_id), err)]
    pub async fn place_order_with_lines(
        &self,
        member_id: MemberId,
        lines: &[(ItemId, i64)],
    ) -> StoreResult<OrderId> {
        let mut tx = self.pool.begin().await?;

        let member = crate::members::find_member(&mut *tx, member_id).await?;

        let mut order_items = Vec::with_capacity(lines.len());
        for &(item_id, count) in lines {
            let mut item = catalog::find_item_for_update(&mut *tx, item_id).await?;
            let line = OrderItem::create(&mut item, count)?;
            catalog::save_item_stock(&mut *tx, &item).await?;
            order_items.push(line);
        }

        let order = Order::place(&member, order_items, Utc::now())?;
        insert_order_aggregate(&mut *tx, &order).await?;
        tx.commit().await?;

        tracing::info!(order_id = %order.id_typed(), "order placed");
        Ok(order.id_typed())
    }

    /// Cancel an order: one transaction covering the status transition and
    /// the stock restoration for every line.
    #[instrument(skip(self), fields(order_id = %order_id), err)]
    pub async fn cancel_order(&self, order_id: OrderId) -> StoreResult<Order> {
        let mut tx = self.pool.begin().await?;

        let mut order = load_order_aggregate(&mut *tx, order_id, true).await?;
        let restock = order.cancel()?;

        sqlx::query("UPDATE orders SET status = $2 WHERE order_id = $1")
            .bind(order_id.as_uuid())
            .bind(order_status_as_str(order.status()))
            .execute(&mut *tx)
            .await?;

        for (item_id, count) in restock {
            sqlx::query(
                "UPDATE items SET stock_quantity = stock_quantity + $2 WHERE item_id = $1",
            )
            .bind(item_id.as_uuid())
            .bind(count)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        tracing::info!(order_id = %order_id, "order canceled");
        Ok(order)
    }

    /// Hydrate the full order aggregate (order, delivery, lines).
    #[instrument(skip(self), fields(order_id = %order_id), err)]
    pub async fn find_one(&self, order_id: OrderId) -> StoreResult<Order> {
        let mut conn = self.pool.acquire().await?;
        load_order_aggregate(&mut *conn, order_id, false).await
    }

    async fn find_order_rows(&self, search: &OrderSearch) -> StoreResult<Vec<OrderRow>> {
        let rows = sqlx::query(
            "SELECT o.order_id, o.member_id, o.delivery_id, o.order_date, \
                    o.status AS order_status \
             FROM orders o \
             JOIN members m ON m.member_id = o.member_id \
             WHERE ($1::text IS NULL OR m.name = $1) \
               AND ($2::text IS NULL OR o.status = $2) \
             ORDER BY o.order_id",
        )
        .bind(search.member_name.as_deref())
        .bind(search.status.map(order_status_as_str))
        .fetch_all(&*self.pool)
        .await?;
        rows.iter().map(order_row_from_row).collect()
    }

    /// Naive strategy for the to-one views: one query for the orders, then
    /// one member and one delivery query per order (1 + N + N).
    #[instrument(skip(self, search), err)]
    pub async fn find_simple_naive(
        &self,
        search: &OrderSearch,
    ) -> StoreResult<Vec<SimpleOrderGraph>> {
        let order_rows = self.find_order_rows(search).await?;
        let mut conn = self.pool.acquire().await?;

        let mut graphs = Vec::with_capacity(order_rows.len());
        for row in order_rows {
            let member = crate::members::find_member(&mut *conn, row.member_id).await?;
            let delivery = find_delivery(&mut *conn, row.delivery_id).await?;
            graphs.push(SimpleOrderGraph {
                order_id: row.order_id,
                member,
                delivery,
                order_date: row.order_date,
                status: row.status,
            });
        }
        Ok(graphs)
    }

    /// Naive strategy for the full aggregate views: one query for the
    /// orders, then per order the member, delivery, and line queries, and
    /// per line the item query (1 + N + N + N + M).
    #[instrument(skip(self, search), err)]
    pub async fn find_all_naive(&self, search: &OrderSearch) -> StoreResult<Vec<OrderGraph>> {
        let order_rows = self.find_order_rows(search).await?;
        let mut conn = self.pool.acquire().await?;

        let mut graphs = Vec::with_capacity(order_rows.len());
        for row in order_rows {
            let member = crate::members::find_member(&mut *conn, row.member_id).await?;
            let delivery = find_delivery(&mut *conn, row.delivery_id).await?;

            let line_rows = sqlx::query(
                "SELECT order_item_id, item_id, order_price, count AS line_count \
                 FROM order_items WHERE order_id = $1 ORDER BY order_item_id",
            )
            .bind(row.order_id.as_uuid())
            .fetch_all(&mut *conn)
            .await?;

            let mut lines = Vec::with_capacity(line_rows.len());
            for line_row in &line_rows {
                let order_item_id: uuid::Uuid = line_row.try_get("order_item_id")?;
                let item_id: uuid::Uuid = line_row.try_get("item_id")?;
                let order_price: i64 = line_row.try_get("order_price")?;
                let count: i64 = line_row.try_get("line_count")?;

                let item = find_item(&mut *conn, ItemId::from_uuid(item_id)).await?;
                lines.push(OrderLineGraph {
                    order_item: OrderItem::from_parts(
                        OrderItemId::from_uuid(order_item_id),
                        item.id_typed(),
                        order_price,
                        count,
                    ),
                    item,
                });
            }

            graphs.push(OrderGraph {
                order_id: row.order_id,
                member,
                delivery,
                order_date: row.order_date,
                status: row.status,
                lines,
            });
        }
        Ok(graphs)
    }

    /// Fetch-join of the to-one associations only: one query, no row
    /// multiplication, pageable.
    #[instrument(skip(self), err)]
    pub async fn find_simple_with_member_delivery(&self) -> StoreResult<Vec<SimpleOrderGraph>> {
        let rows = sqlx::query(&format!(
            "SELECT o.order_id, o.order_date, o.status AS order_status, \
                    {MEMBER_COLUMNS}, {DELIVERY_COLUMNS} \
             FROM orders o \
             JOIN members m ON m.member_id = o.member_id \
             JOIN deliveries d ON d.delivery_id = o.delivery_id \
             ORDER BY o.order_id"
        ))
        .fetch_all(&*self.pool)
        .await?;
        rows.iter().map(simple_graph_from_row).collect()
    }

    /// Fetch-join including the line collection: one query, duplicated root
    /// rows (one per line), deduplicated in memory. NOT pageable: a LIMIT
    /// here would cut lines, not orders.
    #[instrument(skip(self), err)]
    pub async fn find_all_with_items(&self) -> StoreResult<Vec<OrderGraph>> {
        let rows = sqlx::query(&format!(
            "SELECT o.order_id, o.order_date, o.status AS order_status, \
                    {MEMBER_COLUMNS}, {DELIVERY_COLUMNS}, \
                    oi.order_item_id, oi.order_price, oi.count AS line_count, \
                    {ITEM_COLUMNS} \
             FROM orders o \
             JOIN members m ON m.member_id = o.member_id \
             JOIN deliveries d ON d.delivery_id = o.delivery_id \
             JOIN order_items oi ON oi.order_id = o.order_id \
             JOIN items i ON i.item_id = oi.item_id \
             ORDER BY o.order_id, oi.order_item_id"
        ))
        .fetch_all(&*self.pool)
        .await?;

        let mut joined = Vec::with_capacity(rows.len());
        for row in &rows {
            joined.push((simple_graph_from_row(row)?, line_graph_from_row(row)?));
        }
        Ok(fold_joined_rows(joined))
    }

    /// Paged to-one fetch-join plus batched collection loading: the root
    /// query joins only to-one associations (safe to page), then the lines
    /// of up to `batch_fetch_size` orders are fetched per IN-clause query
    /// (1 + ceil(N / batch) queries).
    #[instrument(skip(self), fields(offset = offset, limit = limit), err)]
    pub async fn find_all_paged_with_lines(
        &self,
        offset: i64,
        limit: i64,
    ) -> StoreResult<Vec<OrderGraph>> {
        let rows = sqlx::query(&format!(
            "SELECT o.order_id, o.order_date, o.status AS order_status, \
                    {MEMBER_COLUMNS}, {DELIVERY_COLUMNS} \
             FROM orders o \
             JOIN members m ON m.member_id = o.member_id \
             JOIN deliveries d ON d.delivery_id = o.delivery_id \
             ORDER BY o.order_id \
             OFFSET $1 LIMIT $2"
        ))
        .bind(offset)
        .bind(limit)
        .fetch_all(&*self.pool)
        .await?;
        let heads: Vec<SimpleOrderGraph> = rows
            .iter()
            .map(simple_graph_from_row)
            .collect::<StoreResult<_>>()?;

        let order_ids: Vec<uuid::Uuid> = heads.iter().map(|h| *h.order_id.as_uuid()).collect();

        let mut line_rows: Vec<(OrderId, OrderLineGraph)> = Vec::new();
        for chunk in order_ids.chunks(self.batch_fetch_size) {
            let rows = sqlx::query(&format!(
                "SELECT oi.order_id, oi.order_item_id, oi.order_price, \
                        oi.count AS line_count, {ITEM_COLUMNS} \
                 FROM order_items oi \
                 JOIN items i ON i.item_id = oi.item_id \
                 WHERE oi.order_id = ANY($1) \
                 ORDER BY oi.order_item_id"
            ))
            .bind(chunk)
            .fetch_all(&*self.pool)
            .await?;
            for row in &rows {
                let order_id: uuid::Uuid = row.try_get("order_id")?;
                line_rows.push((OrderId::from_uuid(order_id), line_graph_from_row(row)?));
            }
        }

        Ok(attach_lines(heads, group_lines_by_order(line_rows)))
    }
}

async fn find_delivery(conn: &mut PgConnection, id: DeliveryId) -> StoreResult<Delivery> {
    let row = sqlx::query(&format!(
        "SELECT {DELIVERY_COLUMNS} FROM deliveries d WHERE d.delivery_id = $1"
    ))
    .bind(id.as_uuid())
    .fetch_optional(conn)
    .await?
    .ok_or_else(StoreError::not_found)?;
    delivery_from_row(&row)
}

async fn find_item(conn: &mut PgConnection, id: ItemId) -> StoreResult<Item> {
    let row = sqlx::query(&format!(
        "SELECT {ITEM_COLUMNS} FROM items i WHERE i.item_id = $1"
    ))
    .bind(id.as_uuid())
    .fetch_optional(conn)
    .await?
    .ok_or_else(StoreError::not_found)?;
    catalog::item_from_row(&row)
}

async fn insert_order_aggregate(conn: &mut PgConnection, order: &Order) -> StoreResult<()> {
    let delivery = order.delivery();
    sqlx::query(
        "INSERT INTO deliveries (delivery_id, city, street, zipcode, status) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(delivery.id_typed().as_uuid())
    .bind(&delivery.address().city)
    .bind(&delivery.address().street)
    .bind(&delivery.address().zipcode)
    .bind(delivery_status_as_str(delivery.status()))
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        "INSERT INTO orders (order_id, member_id, delivery_id, order_date, status) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(order.id_typed().as_uuid())
    .bind(order.member_id().as_uuid())
    .bind(delivery.id_typed().as_uuid())
    .bind(order.order_date())
    .bind(order_status_as_str(order.status()))
    .execute(&mut *conn)
    .await?;

    for line in order.order_items() {
        sqlx::query(
            "INSERT INTO order_items (order_item_id, order_id, item_id, order_price, count) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(line.id_typed().as_uuid())
        .bind(order.id_typed().as_uuid())
        .bind(line.item_id().as_uuid())
        .bind(line.order_price())
        .bind(line.count())
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

async fn load_order_aggregate(
    conn: &mut PgConnection,
    order_id: OrderId,
    for_update: bool,
) -> StoreResult<Order> {
    let lock = if for_update { " FOR UPDATE" } else { "" };
    let row = sqlx::query(&format!(
        "SELECT o.order_id, o.member_id, o.delivery_id, o.order_date, \
                o.status AS order_status \
         FROM orders o WHERE o.order_id = $1{lock}"
    ))
    .bind(order_id.as_uuid())
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(StoreError::not_found)?;
    let order_row = order_row_from_row(&row)?;

    let delivery = find_delivery(&mut *conn, order_row.delivery_id).await?;

    let line_rows = sqlx::query(
        "SELECT order_item_id, item_id, order_price, count AS line_count \
         FROM order_items WHERE order_id = $1 ORDER BY order_item_id",
    )
    .bind(order_id.as_uuid())
    .fetch_all(&mut *conn)
    .await?;

    let mut order_items = Vec::with_capacity(line_rows.len());
    for row in &line_rows {
        let order_item_id: uuid::Uuid = row.try_get("order_item_id")?;
        let item_id: uuid::Uuid = row.try_get("item_id")?;
        let order_price: i64 = row.try_get("order_price")?;
        let count: i64 = row.try_get("line_count")?;
        order_items.push(OrderItem::from_parts(
            OrderItemId::from_uuid(order_item_id),
            ItemId::from_uuid(item_id),
            order_price,
            count,
        ));
    }

    Ok(Order::from_parts(
        order_row.order_id,
        order_row.member_id,
        delivery,
        order_items,
        order_row.order_date,
        order_row.status,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_catalog::ItemKind;

    fn test_member(name: &str) -> Member {
        Member::from_parts(
            MemberId::new(),
            name.to_string(),
            Address::new("Seoul", "Teheran-ro 1", "06000"),
        )
    }

    fn test_delivery() -> Delivery {
        Delivery::from_parts(
            DeliveryId::new(),
            Address::new("Seoul", "Teheran-ro 1", "06000"),
            DeliveryStatus::Ready,
        )
    }

    fn test_head(member_name: &str) -> SimpleOrderGraph {
        SimpleOrderGraph {
            order_id: OrderId::new(),
            member: test_member(member_name),
            delivery: test_delivery(),
            order_date: Utc::now(),
            status: OrderStatus::Ordered,
        }
    }

    fn test_line(item_name: &str, price: i64, count: i64) -> OrderLineGraph {
        let item = Item::from_parts(
            ItemId::new(),
            ItemKind::Book {
                author: "kim".to_string(),
                isbn: "979-11-00000-00-0".to_string(),
            },
            item_name.to_string(),
            price,
            100,
        );
        OrderLineGraph {
            order_item: OrderItem::from_parts(OrderItemId::new(), item.id_typed(), price, count),
            item,
        }
    }

    #[test]
    fn fold_collapses_duplicated_rows_to_one_graph_per_order() {
        let head_a = test_head("kim");
        let head_b = test_head("lee");

        // Two lines for order a, one for order b: three joined rows.
        let rows = vec![
            (head_a.clone(), test_line("book-1", 100, 3)),
            (head_a.clone(), test_line("book-2", 200, 1)),
            (head_b.clone(), test_line("book-3", 300, 2)),
        ];
        assert_eq!(rows.len(), 3);

        let graphs = fold_joined_rows(rows);
        assert_eq!(graphs.len(), 2);
        assert_eq!(graphs[0].order_id, head_a.order_id);
        assert_eq!(graphs[0].lines.len(), 2);
        assert_eq!(graphs[0].lines[0].item.name(), "book-1");
        assert_eq!(graphs[0].lines[1].item.name(), "book-2");
        assert_eq!(graphs[1].order_id, head_b.order_id);
        assert_eq!(graphs[1].lines.len(), 1);
    }

    #[test]
    fn fold_keeps_first_seen_root_order() {
        let heads: Vec<_> = (0..5).map(|i| test_head(&format!("m{i}"))).collect();
        let mut rows = Vec::new();
        for head in &heads {
            for _ in 0..3 {
                rows.push((head.clone(), test_line("book", 10, 1)));
            }
        }

        // Row count before dedup: sum over orders of line count.
        assert_eq!(rows.len(), 5 * 3);
        let graphs = fold_joined_rows(rows);
        assert_eq!(graphs.len(), 5);
        let folded: Vec<_> = graphs.iter().map(|g| g.order_id).collect();
        let expected: Vec<_> = heads.iter().map(|h| h.order_id).collect();
        assert_eq!(folded, expected);
    }

    #[test]
    fn attach_lines_matches_fold_on_the_same_data() {
        let head_a = test_head("kim");
        let head_b = test_head("lee");
        let line_a1 = test_line("book-1", 100, 3);
        let line_a2 = test_line("book-2", 200, 1);
        let line_b1 = test_line("book-3", 300, 2);

        let joined = vec![
            (head_a.clone(), line_a1.clone()),
            (head_a.clone(), line_a2.clone()),
            (head_b.clone(), line_b1.clone()),
        ];
        let folded = fold_joined_rows(joined);

        let grouped = group_lines_by_order(vec![
            (head_a.order_id, line_a1),
            (head_a.order_id, line_a2),
            (head_b.order_id, line_b1),
        ]);
        let attached = attach_lines(vec![head_a, head_b], grouped);

        assert_eq!(folded, attached);
    }

    #[test]
    fn attach_lines_keeps_orders_without_lines() {
        let head = test_head("kim");
        let attached = attach_lines(vec![head.clone()], HashMap::new());
        assert_eq!(attached.len(), 1);
        assert!(attached[0].lines.is_empty());
    }

    #[test]
    fn status_codecs_roundtrip() {
        for status in [OrderStatus::Ordered, OrderStatus::Canceled] {
            assert_eq!(
                order_status_from_str(order_status_as_str(status)).unwrap(),
                status
            );
        }
        assert!(order_status_from_str("shipped").is_err());
    }
}
