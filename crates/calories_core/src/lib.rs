//! Core data layer for CaloriesCalc.
//! Owns persisted meals and the per-day nutrition view; UI layers call in.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, StoreConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::collection::MealCollection;
pub use model::meal::{Meal, MealId, MealType, MealValidationError};
pub use repo::blob_repo::{BlobRepository, RepoError, RepoResult, SqliteBlobRepository};
pub use service::day_aggregator::{
    can_advance_to_next_day, meals_on_day, shift_day, totals, DayStep, NutritionTotals,
};
pub use service::meal_session::{DayView, MealSession};
pub use service::meal_store::{MealStore, StoreError, StoreResult, MEALS_KEY};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
