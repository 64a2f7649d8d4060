//! Domain model for logged meals.
//!
//! # Responsibility
//! - Define canonical data structures used by the store and aggregation.
//!
//! # Invariants
//! - Every meal is identified by a stable `MealId`.
//! - Deletion is a hard removal from the collection; there are no tombstones.

pub mod collection;
pub mod meal;
