//! Catalog domain module (items and categories).
//!
//! This crate contains business rules for the item catalog, implemented
//! purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod category;
pub mod item;

pub use category::Category;
pub use item::{Item, ItemKind};
