//! Behavior over the entity store.
//!
//! Each service holds the shared [`SqliteStore`](crate::storage::SqliteStore)
//! and runs its writes inside a single immediate transaction, so every guard
//! decision is made against committed state.

pub mod aggregates;
pub mod assignment;
pub mod entities;
pub mod lifecycle;
pub mod policy;
pub mod repurchase;

pub use aggregates::AggregateService;
pub use assignment::AssignmentService;
pub use entities::EntityService;
pub use lifecycle::LifecycleService;
pub use repurchase::RepurchaseService;
