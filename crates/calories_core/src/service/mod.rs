//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into meal-level APIs.
//! - Keep UI layers decoupled from storage details.

pub mod day_aggregator;
pub mod meal_session;
pub mod meal_store;
