use serde::{Deserialize, Serialize};

use storefront_core::{AggregateRoot, DomainError, DomainResult, Entity, ItemId};

/// Item subtype, flattened from the original single-table inheritance into a
/// tagged union. The tag doubles as the `kind` discriminator column value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ItemKind {
    Book { author: String, isbn: String },
    Album { artist: String, etc: String },
    Movie { director: String, actor: String },
}

impl ItemKind {
    /// Discriminator value persisted in the `kind` column.
    pub fn discriminator(&self) -> &'static str {
        match self {
            ItemKind::Book { .. } => "book",
            ItemKind::Album { .. } => "album",
            ItemKind::Movie { .. } => "movie",
        }
    }
}

/// Catalog item: something a member can order.
///
/// `price` is the *current* price in the smallest currency unit; orders
/// capture it into `order_price` at placement time and are not affected by
/// later changes. `stock_quantity` never goes negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    id: ItemId,
    kind: ItemKind,
    name: String,
    price: i64,
    stock_quantity: i64,
}

impl Item {
    pub fn create(
        kind: ItemKind,
        name: impl Into<String>,
        price: i64,
        stock_quantity: i64,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if price < 0 {
            return Err(DomainError::validation("price cannot be negative"));
        }
        if stock_quantity < 0 {
            return Err(DomainError::validation("stock quantity cannot be negative"));
        }
        Ok(Self {
            id: ItemId::new(),
            kind,
            name,
            price,
            stock_quantity,
        })
    }

    /// Rehydrate an item from stored state.
    pub fn from_parts(
        id: ItemId,
        kind: ItemKind,
        name: String,
        price: i64,
        stock_quantity: i64,
    ) -> Self {
        Self {
            id,
            kind,
            name,
            price,
            stock_quantity,
        }
    }

    pub fn id_typed(&self) -> ItemId {
        self.id
    }

    pub fn kind(&self) -> &ItemKind {
        &self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> i64 {
        self.price
    }

    pub fn stock_quantity(&self) -> i64 {
        self.stock_quantity
    }

    /// Increase stock (order cancellation, restocking).
    pub fn add_stock(&mut self, quantity: i64) -> DomainResult<()> {
        if quantity < 0 {
            return Err(DomainError::validation("stock delta cannot be negative"));
        }
        self.stock_quantity += quantity;
        Ok(())
    }

    /// Decrease stock (order placement).
    ///
    /// Fails without changing anything when the remaining stock would go
    /// negative; there is no partial fulfillment.
    pub fn remove_stock(&mut self, quantity: i64) -> DomainResult<()> {
        if quantity < 0 {
            return Err(DomainError::validation("stock delta cannot be negative"));
        }
        let rest = self.stock_quantity - quantity;
        if rest < 0 {
            return Err(DomainError::InsufficientStock {
                requested: quantity,
                available: self.stock_quantity,
            });
        }
        self.stock_quantity = rest;
        Ok(())
    }
}

impl Entity for Item {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AggregateRoot for Item {}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn book(price: i64, stock: i64) -> Item {
        Item::create(
            ItemKind::Book {
                author: "kim".to_string(),
                isbn: "979-11-00000-00-0".to_string(),
            },
            "book-1",
            price,
            stock,
        )
        .unwrap()
    }

    #[test]
    fn remove_stock_decrements_by_exactly_count() {
        let mut item = book(100, 10);
        item.remove_stock(3).unwrap();
        assert_eq!(item.stock_quantity(), 7);
    }

    #[test]
    fn remove_stock_fails_and_leaves_stock_unchanged_when_insufficient() {
        let mut item = book(100, 10);
        let err = item.remove_stock(11).unwrap_err();
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
    fn add_stock_restores_quantity() {
        let mut item = book(100, 10);
        item.remove_stock(3).unwrap();
        item.add_stock(3).unwrap();
        assert_eq!(item.stock_quantity(), 10);
    }

    #[test]
    fn create_rejects_negative_stock() {
        let err = Item::create(
            ItemKind::Movie {
                director: "bong".to_string(),
                actor: "song".to_string(),
            },
            "movie-1",
            100,
            -1,
        )
        .unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error for negative stock"),
        }
    }

    #[test]
    fn kind_tag_is_the_discriminator() {
        let item = book(100, 10);
        let json = serde_json::to_value(item.kind()).unwrap();
        assert_eq!(json["kind"], "book");
        assert_eq!(item.kind().discriminator(), "book");
    }

    proptest! {
        #[test]
        fn remove_then_add_restores_stock(stock in 0i64..10_000, taken in 0i64..10_000) {
            let mut item = book(100, stock);
            if taken <= stock {
                item.remove_stock(taken).unwrap();
                item.add_stock(taken).unwrap();
            } else {
                prop_assert!(item.remove_stock(taken).is_err());
            }
            prop_assert_eq!(item.stock_quantity(), stock);
        }
    }
}
