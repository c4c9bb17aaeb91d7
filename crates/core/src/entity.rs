//! Entity traits: identity + continuity across state changes.

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

/// Aggregate root marker.
///
/// An aggregate root is the entity through which its owned entities are
/// created, persisted, and deleted (here: `Order` owns `OrderItem` and
/// `Delivery`). Independent aggregates are referenced by id, never held as
/// mutually-pointing managed references.
pub trait AggregateRoot: Entity {}
