//! Orders domain module.
//!
//! This crate contains business rules for the order aggregate (order, order
//! items, delivery), implemented purely as deterministic domain logic (no IO,
//! no HTTP, no storage).

pub mod order;

pub use order::{Delivery, DeliveryStatus, Order, OrderItem, OrderStatus};
