//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define storage contracts the meal store depends on.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository APIs return transport errors only; decoding and domain
//!   checks belong to the service layer.

pub mod blob_repo;
