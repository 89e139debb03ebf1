//! CityStore Core — Concurrent Hierarchical City Store
//!
//! An in-memory store of city records organized as country → state → city,
//! with a query engine that answers scoped or unscoped lookups newest first.
//!
//! # Architecture
//!
//! - **Store**: flat `(country, state)` region table; empty levels are pruned
//!   as soon as they empty out
//! - **Gate**: inserts and removes take turns through a mutex + condvar gate
//!   holding `writing`/`deleting` flags
//! - **Query engine**: collect → sort by founding date → date filter
//!   (unscoped only) → full or reduced projection
//!
//! # No Persistence
//!
//! Everything lives in RAM for the lifetime of the process. There is no
//! write-ahead log and no recovery; a restart starts from an empty store.

pub mod config;
pub mod date;
pub mod error;
pub mod gate;
pub mod query;
pub mod record;
pub mod stats;
pub mod store;

// Re-export key types for convenience
pub use config::{Config, ReadConsistency};
pub use date::FoundingDate;
pub use error::{CityError, CityResult};
pub use gate::{Mutation, MutationGate, MutationGuard};
pub use query::{CityQuery, QueryEngine};
pub use record::{CityList, CityProjection, CityRecord, ReducedCity};
pub use stats::{StatsSnapshot, StoreStats};
pub use store::CityStore;
