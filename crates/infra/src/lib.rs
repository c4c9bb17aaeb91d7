//! Persistence layer: PostgreSQL-backed stores for every aggregate, plus the
//! aggregate-fetch strategies the API exposes.
//!
//! Structure:
//! - `db`: pool construction, configuration, idempotent schema bootstrap
//! - `members` / `catalog`: plain CRUD stores
//! - `orders`: the order aggregate store — transactional placement and
//!   cancellation, and the entity-loading strategies (naive per-order loads,
//!   fetch-join with in-memory dedup, paged to-one join with batched
//!   IN-clause collections)
//! - `order_queries`: direct-to-DTO projection queries (per-root, batched,
//!   flat single-query) and the pure reassembly helpers they share

pub mod catalog;
pub mod db;
pub mod error;
pub mod members;
pub mod order_queries;
pub mod orders;

pub use db::{connect, init_schema, StoreConfig, DEFAULT_BATCH_FETCH_SIZE};
pub use error::{StoreError, StoreResult};
