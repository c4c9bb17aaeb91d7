use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_catalog::Item;
use storefront_core::{
    Address, AggregateRoot, DeliveryId, DomainError, DomainResult, Entity, ItemId, MemberId,
    OrderId, OrderItemId,
};
use storefront_members::Member;

/// Order status lifecycle. The transition is one-directional:
/// `Ordered` -> `Canceled`, never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Ordered,
    Canceled,
}

/// Delivery status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Ready,
    Completed,
}

/// Delivery: owned by an order, carries a copy of the member's address as it
/// was at order time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    id: DeliveryId,
    address: Address,
    status: DeliveryStatus,
}

impl Delivery {
    fn for_address(address: Address) -> Self {
        Self {
            id: DeliveryId::new(),
            address,
            status: DeliveryStatus::Ready,
        }
    }

    /// Rehydrate a delivery from stored state.
    pub fn from_parts(id: DeliveryId, address: Address, status: DeliveryStatus) -> Self {
        Self {
            id,
            address,
            status,
        }
    }

    pub fn id_typed(&self) -> DeliveryId {
        self.id
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn status(&self) -> DeliveryStatus {
        self.status
    }

    pub fn complete(&mut self) {
        self.status = DeliveryStatus::Completed;
    }
}

/// Order line: references an item by id and freezes the price the item had
/// when the order was placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    id: OrderItemId,
    item_id: ItemId,
    order_price: i64,
    count: i64,
}

impl OrderItem {
    /// Create an order line against an item, decrementing its stock.
    ///
    /// Captures the item's current price; the line is not affected by later
    /// price changes. Fails with `InsufficientStock` (stock untouched) when
    /// the item cannot cover `count`.
    pub fn create(item: &mut Item, count: i64) -> DomainResult<Self> {
        if count <= 0 {
            return Err(DomainError::validation("count must be positive"));
        }
        item.remove_stock(count)?;
        Ok(Self {
            id: OrderItemId::new(),
            item_id: item.id_typed(),
            order_price: item.price(),
            count,
        })
    }

    /// Rehydrate an order line from stored state.
    pub fn from_parts(id: OrderItemId, item_id: ItemId, order_price: i64, count: i64) -> Self {
        Self {
            id,
            item_id,
            order_price,
            count,
        }
    }

    pub fn id_typed(&self) -> OrderItemId {
        self.id
    }

    pub fn item_id(&self) -> ItemId {
        self.item_id
    }

    pub fn order_price(&self) -> i64 {
        self.order_price
    }

    pub fn count(&self) -> i64 {
        self.count
    }

    pub fn total_price(&self) -> i64 {
        self.order_price * self.count
    }
}

/// Aggregate root: Order.
///
/// Owns its order items and delivery (they are persisted and deleted with
/// it). The member and the catalog items are independent aggregates
/// referenced by id only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    member_id: MemberId,
    delivery: Delivery,
    order_items: Vec<OrderItem>,
    order_date: DateTime<Utc>,
    status: OrderStatus,
}

impl Order {
    /// Place an order for a member.
    ///
    /// Builds the delivery from the member's current address. Stock has
    /// already been taken by `OrderItem::create`; this only assembles the
    /// aggregate.
    pub fn place(
        member: &Member,
        order_items: Vec<OrderItem>,
        order_date: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if order_items.is_empty() {
            return Err(DomainError::validation("order needs at least one line"));
        }
        Ok(Self {
            id: OrderId::new(),
            member_id: member.id_typed(),
            delivery: Delivery::for_address(member.address().clone()),
            order_items,
            order_date,
            status: OrderStatus::Ordered,
        })
    }

    /// Rehydrate an order from stored state.
    pub fn from_parts(
        id: OrderId,
        member_id: MemberId,
        delivery: Delivery,
        order_items: Vec<OrderItem>,
        order_date: DateTime<Utc>,
        status: OrderStatus,
    ) -> Self {
        Self {
            id,
            member_id,
            delivery,
            order_items,
            order_date,
            status,
        }
    }

    pub fn id_typed(&self) -> OrderId {
        self.id
    }

    pub fn member_id(&self) -> MemberId {
        self.member_id
    }

    pub fn delivery(&self) -> &Delivery {
        &self.delivery
    }

    pub fn order_items(&self) -> &[OrderItem] {
        &self.order_items
    }

    pub fn order_date(&self) -> DateTime<Utc> {
        self.order_date
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Sum of line totals.
    pub fn total_price(&self) -> i64 {
        self.order_items.iter().map(OrderItem::total_price).sum()
    }

    /// Cancel the order.
    ///
    /// Double-cancel is an explicit conflict, not a silent no-op, and a
    /// completed delivery blocks cancellation. Returns the restock plan
    /// (item id, count) the caller must apply to the catalog; the order does
    /// not reach into item aggregates itself.
    pub fn cancel(&mut self) -> DomainResult<Vec<(ItemId, i64)>> {
        if self.status == OrderStatus::Canceled {
            return Err(DomainError::conflict("order is already canceled"));
        }
        if self.delivery.status() == DeliveryStatus::Completed {
            return Err(DomainError::invariant(
                "cannot cancel an order that has been delivered",
            ));
        }
        self.status = OrderStatus::Canceled;
        Ok(self
            .order_items
            .iter()
            .map(|line| (line.item_id(), line.count()))
            .collect())
    }
}

impl Entity for Order {
    type Id = OrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AggregateRoot for Order {}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use storefront_catalog::ItemKind;

    fn test_member() -> Member {
        Member::register("kim", Address::new("Seoul", "Teheran-ro 1", "06000")).unwrap()
    }

    fn book(name: &str, price: i64, stock: i64) -> Item {
        Item::create(
            ItemKind::Book {
                author: "kim".to_string(),
                isbn: "979-11-00000-00-0".to_string(),
            },
            name,
            price,
            stock,
        )
        .unwrap()
    }

    #[test]
    fn placing_an_order_decrements_stock_and_totals_the_lines() {
        let member = test_member();
        let mut item = book("book-1", 100, 10);

        let line = OrderItem::create(&mut item, 3).unwrap();
        let order = Order::place(&member, vec![line], Utc::now()).unwrap();

        assert_eq!(item.stock_quantity(), 7);
        assert_eq!(order.total_price(), 300);
        assert_eq!(order.status(), OrderStatus::Ordered);
        assert_eq!(order.delivery().address(), member.address());
        assert_eq!(order.delivery().status(), DeliveryStatus::Ready);
    }

    #[test]
    fn order_price_is_frozen_at_placement() {
        let member = test_member();
        let mut item = book("book-1", 100, 10);
        let line = OrderItem::create(&mut item, 2).unwrap();
        let order = Order::place(&member, vec![line], Utc::now()).unwrap();

        // A later catalog price change does not touch the captured price.
        let repriced = Item::from_parts(
            item.id_typed(),
            item.kind().clone(),
            item.name().to_string(),
            999,
            item.stock_quantity(),
        );
        assert_eq!(repriced.price(), 999);
        assert_eq!(order.order_items()[0].order_price(), 100);
        assert_eq!(order.total_price(), 200);
    }

    #[test]
    fn ordering_more_than_stock_fails_and_leaves_stock_unchanged() {
        let mut item = book("book-1", 100, 10);
        let err = OrderItem::create(&mut item, 11).unwrap_err();
        match err {
            DomainError::InsufficientStock {
                requested,
                available,
            } => {
                assert_eq!(requested, 11);
                assert_eq!(available, 10);
            }
            _ => panic!("Expected InsufficientStock error"),
        }
        assert_eq!(item.stock_quantity(), 10);
    }

    #[test]
    fn canceling_restores_stock_and_sets_canceled() {
        let member = test_member();
        let mut item = book("book-1", 100, 10);
        let line = OrderItem::create(&mut item, 3).unwrap();
        let mut order = Order::place(&member, vec![line], Utc::now()).unwrap();

        let restock = order.cancel().unwrap();
        for (item_id, count) in restock {
            assert_eq!(item_id, item.id_typed());
            item.add_stock(count).unwrap();
        }

        assert_eq!(order.status(), OrderStatus::Canceled);
        assert_eq!(item.stock_quantity(), 10);
    }

    #[test]
    fn double_cancel_is_a_conflict() {
        let member = test_member();
        let mut item = book("book-1", 100, 10);
        let line = OrderItem::create(&mut item, 1).unwrap();
        let mut order = Order::place(&member, vec![line], Utc::now()).unwrap();

        order.cancel().unwrap();
        let err = order.cancel().unwrap_err();
        match err {
            DomainError::Conflict(_) => {}
            _ => panic!("Expected Conflict error for double cancel"),
        }
        assert_eq!(order.status(), OrderStatus::Canceled);
    }

    #[test]
    fn cannot_cancel_a_delivered_order() {
        let member = test_member();
        let mut item = book("book-1", 100, 10);
        let line = OrderItem::create(&mut item, 1).unwrap();
        let mut order = Order::place(&member, vec![line], Utc::now()).unwrap();

        // Mark the delivery completed, then try to cancel.
        let mut delivery = order.delivery().clone();
        delivery.complete();
        let mut order = Order::from_parts(
            order.id_typed(),
            order.member_id(),
            delivery,
            order.order_items().to_vec(),
            order.order_date(),
            order.status(),
        );

        let err = order.cancel().unwrap_err();
        match err {
            DomainError::InvariantViolation(_) => {}
            _ => panic!("Expected InvariantViolation for delivered order"),
        }
        assert_eq!(order.status(), OrderStatus::Ordered);
    }

    #[test]
    fn count_must_be_positive() {
        let mut item = book("book-1", 100, 10);
        for count in [0, -1] {
            let err = OrderItem::create(&mut item, count).unwrap_err();
            match err {
                DomainError::Validation(_) => {}
                _ => panic!("Expected Validation error for count {count}"),
            }
        }
        assert_eq!(item.stock_quantity(), 10);
    }

    #[test]
    fn order_needs_at_least_one_line() {
        let member = test_member();
        let err = Order::place(&member, vec![], Utc::now()).unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error for empty order"),
        }
    }

    #[test]
    fn total_price_sums_multiple_lines() {
        let member = test_member();
        let mut book1 = book("book-1", 100, 10);
        let mut book2 = book("book-2", 250, 5);
        let lines = vec![
            OrderItem::create(&mut book1, 3).unwrap(),
            OrderItem::create(&mut book2, 2).unwrap(),
        ];
        let order = Order::place(&member, lines, Utc::now()).unwrap();
        assert_eq!(order.total_price(), 300 + 500);
    }

    proptest! {
        #[test]
        fn place_then_cancel_always_restores_stock(
            price in 0i64..1_000,
            stock in 1i64..1_000,
            count in 1i64..1_000,
        ) {
            let member = test_member();
            let mut item = book("book-1", price, stock);
            if count <= stock {
                let line = OrderItem::create(&mut item, count).unwrap();
                let mut order = Order::place(&member, vec![line], Utc::now()).unwrap();
                prop_assert_eq!(item.stock_quantity(), stock - count);
                prop_assert_eq!(order.total_price(), price * count);
                for (_, n) in order.cancel().unwrap() {
                    item.add_stock(n).unwrap();
                }
            } else {
                prop_assert!(OrderItem::create(&mut item, count).is_err());
            }
            prop_assert_eq!(item.stock_quantity(), stock);
        }
    }
}
