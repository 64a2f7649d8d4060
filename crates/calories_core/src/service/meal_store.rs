//! Durable owner of the meal collection.
//!
//! # Responsibility
//! - Load the collection from the `meals` blob and write it back in full.
//! - Provide add/update/delete entry points that validate, normalize and
//!   persist in one step.
//!
//! # Invariants
//! - Every mutation triggers exactly one full write of the collection.
//! - The in-memory collection only changes after its write has committed,
//!   so a failed write leaves memory and storage in agreement.
//! - Undecodable stored data is reported as `DataCorruption` and is never
//!   overwritten implicitly.

use crate::model::collection::MealCollection;
use crate::model::meal::{Meal, MealId, MealValidationError};
use crate::repo::blob_repo::{BlobRepository, RepoError};
use log::{error, info, warn};
use std::collections::{BTreeSet, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Storage key of the serialized collection.
pub const MEALS_KEY: &str = "meals";

pub type StoreResult<T> = Result<T, StoreError>;

/// Error for meal store operations.
#[derive(Debug)]
pub enum StoreError {
    /// Persisted blob exists but cannot be decoded into a collection.
    DataCorruption(String),
    /// No meal with this id exists.
    NotFound(MealId),
    /// Row index does not address a meal in the collection.
    PositionOutOfRange { position: usize, len: usize },
    /// Reading or writing the blob failed.
    Storage(RepoError),
    /// Submission rejected before any write.
    Validation(MealValidationError),
}

impl StoreError {
    /// Whether this error means the referenced meal does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::PositionOutOfRange { .. })
    }

    fn code(&self) -> &'static str {
        match self {
            Self::DataCorruption(_) => "data_corruption",
            Self::NotFound(_) | Self::PositionOutOfRange { .. } => "not_found",
            Self::Storage(_) => "storage_failed",
            Self::Validation(_) => "validation_failed",
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DataCorruption(details) => write!(f, "stored meals are corrupt: {details}"),
            Self::NotFound(id) => write!(f, "meal not found: {id}"),
            Self::PositionOutOfRange { position, len } => {
                write!(f, "no meal at position {position} (collection has {len})")
            }
            Self::Storage(err) => write!(f, "meal storage failed: {err}"),
            Self::Validation(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Storage(value)
    }
}

impl From<MealValidationError> for StoreError {
    fn from(value: MealValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Meal store over a keyed blob repository.
pub struct MealStore<R: BlobRepository> {
    repo: R,
    meals: MealCollection,
}

impl<R: BlobRepository> MealStore<R> {
    /// Creates a store with an empty in-memory collection. Call [`load`]
    /// to read persisted meals.
    ///
    /// [`load`]: MealStore::load
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            meals: MealCollection::new(),
        }
    }

    /// Creates a store and loads the persisted collection.
    pub fn open(repo: R) -> StoreResult<Self> {
        let mut store = Self::new(repo);
        store.load()?;
        Ok(store)
    }

    /// Current in-memory collection.
    pub fn meals(&self) -> &MealCollection {
        &self.meals
    }

    /// Replaces the in-memory collection with the persisted one.
    ///
    /// # Contract
    /// - Missing blob loads as an empty collection.
    /// - On `DataCorruption` or `Storage` errors the in-memory collection is
    ///   left untouched.
    pub fn load(&mut self) -> StoreResult<&MealCollection> {
        let started_at = Instant::now();
        let loaded = match self.read_collection() {
            Ok(collection) => collection,
            Err(err) => {
                error!(
                    "event=meals_load module=store status=error duration_ms={} error_code={} error={}",
                    started_at.elapsed().as_millis(),
                    err.code(),
                    err
                );
                return Err(err);
            }
        };

        info!(
            "event=meals_load module=store status=ok count={} duration_ms={}",
            loaded.len(),
            started_at.elapsed().as_millis()
        );
        self.meals = loaded;
        Ok(&self.meals)
    }

    /// Writes `collection` in full and adopts it as the in-memory state.
    pub fn save(&mut self, collection: MealCollection) -> StoreResult<()> {
        if let Some(id) = collection.find_duplicate_id() {
            return Err(MealValidationError::DuplicateId(id).into());
        }
        self.commit(collection, "save")?;
        Ok(())
    }

    /// Validates, clamps and appends `meal`, then persists.
    ///
    /// # Errors
    /// - `Validation` for negative calories, a blank name or a taken id.
    /// - `Storage` when the write fails; the collection is unchanged.
    pub fn add(&mut self, mut meal: Meal) -> StoreResult<&MealCollection> {
        meal.prepare_for_save()?;

        let mut next = self.meals.clone();
        next.push(meal)
            .map_err(|rejected| MealValidationError::DuplicateId(rejected.id()))?;
        self.commit(next, "add")
    }

    /// Replaces the mutable fields of meal `id` with those of `updated`.
    ///
    /// The id of `updated` is ignored; identity never changes.
    ///
    /// # Errors
    /// - `NotFound` when no meal has `id`; nothing is written.
    /// - `Validation` when `updated` fails submission checks.
    pub fn update(&mut self, id: MealId, mut updated: Meal) -> StoreResult<&MealCollection> {
        if !self.meals.contains(id) {
            warn!("event=meals_update module=store status=error error_code=not_found meal_id={id}");
            return Err(StoreError::NotFound(id));
        }
        updated.prepare_for_save()?;

        let mut next = self.meals.clone();
        if let Some(existing) = next.get_mut(id) {
            existing.apply_edit(updated);
        }
        self.commit(next, "update")
    }

    /// Removes every meal in `ids`.
    ///
    /// # Errors
    /// - `NotFound` for the first unknown id; nothing is removed or written.
    pub fn delete(&mut self, ids: &[MealId]) -> StoreResult<&MealCollection> {
        if let Some(missing) = ids.iter().copied().find(|id| !self.meals.contains(*id)) {
            warn!(
                "event=meals_delete module=store status=error error_code=not_found meal_id={missing}"
            );
            return Err(StoreError::NotFound(missing));
        }

        let targets: HashSet<MealId> = ids.iter().copied().collect();
        let mut next = self.meals.clone();
        next.remove_ids(&targets);
        self.commit(next, "delete")
    }

    /// Removes the meals at the given collection indices.
    ///
    /// # Errors
    /// - `PositionOutOfRange` for the first index past the end; nothing is
    ///   removed or written.
    pub fn delete_positions(
        &mut self,
        positions: &BTreeSet<usize>,
    ) -> StoreResult<&MealCollection> {
        let len = self.meals.len();
        if let Some(&position) = positions.iter().find(|&&position| position >= len) {
            return Err(StoreError::PositionOutOfRange { position, len });
        }

        let mut next = self.meals.clone();
        next.remove_positions(positions);
        self.commit(next, "delete")
    }

    /// Overwrites stored meals with an empty collection.
    ///
    /// This is the explicit "start fresh" path after `DataCorruption`; callers
    /// must have the user's confirmation before invoking it.
    pub fn reset(&mut self) -> StoreResult<()> {
        warn!(
            "event=meals_reset module=store status=start previous_count={}",
            self.meals.len()
        );
        self.commit(MealCollection::new(), "reset")?;
        Ok(())
    }

    fn read_collection(&self) -> StoreResult<MealCollection> {
        let Some(bytes) = self.repo.read_blob(MEALS_KEY)? else {
            return Ok(MealCollection::new());
        };

        let collection: MealCollection = serde_json::from_slice(&bytes)
            .map_err(|err| StoreError::DataCorruption(err.to_string()))?;
        if let Some(id) = collection.find_duplicate_id() {
            return Err(StoreError::DataCorruption(format!(
                "meal id {id} appears more than once"
            )));
        }
        Ok(collection)
    }

    fn commit(&mut self, next: MealCollection, op: &'static str) -> StoreResult<&MealCollection> {
        let started_at = Instant::now();
        let write_result = serde_json::to_vec(&next)
            .map_err(|err| StoreError::DataCorruption(format!("failed to encode meals: {err}")))
            .and_then(|bytes| Ok(self.repo.write_blob(MEALS_KEY, &bytes)?));

        if let Err(err) = write_result {
            error!(
                "event=meals_save module=store status=error op={} duration_ms={} error_code={} error={}",
                op,
                started_at.elapsed().as_millis(),
                err.code(),
                err
            );
            return Err(err);
        }

        info!(
            "event=meals_save module=store status=ok op={} count={} duration_ms={}",
            op,
            next.len(),
            started_at.elapsed().as_millis()
        );
        self.meals = next;
        Ok(&self.meals)
    }
}

#[cfg(test)]
mod tests {
    use super::{MealStore, StoreError, MEALS_KEY};
    use crate::db::DbError;
    use crate::model::meal::{Meal, MealType};
    use crate::repo::blob_repo::{BlobRepository, RepoError, RepoResult};
    use chrono::{Local, TimeZone};
    use std::cell::RefCell;

    /// In-memory repository whose writes can be forced to fail.
    #[derive(Default)]
    struct FlakyRepo {
        blob: RefCell<Option<Vec<u8>>>,
        fail_writes: bool,
    }

    impl BlobRepository for FlakyRepo {
        fn read_blob(&self, _key: &str) -> RepoResult<Option<Vec<u8>>> {
            Ok(self.blob.borrow().clone())
        }

        fn write_blob(&self, _key: &str, value: &[u8]) -> RepoResult<()> {
            if self.fail_writes {
                return Err(RepoError::Db(DbError::Io(std::io::Error::other("disk full"))));
            }
            *self.blob.borrow_mut() = Some(value.to_vec());
            Ok(())
        }

        fn delete_blob(&self, _key: &str) -> RepoResult<bool> {
            Ok(self.blob.borrow_mut().take().is_some())
        }
    }

    fn lunch() -> Meal {
        let date = Local.with_ymd_and_hms(2024, 5, 2, 13, 0, 0).unwrap();
        Meal::with_details(date, "Pasta", MealType::Lunch, 650)
    }

    #[test]
    fn failed_write_leaves_collection_unchanged() {
        let repo = FlakyRepo {
            fail_writes: true,
            ..FlakyRepo::default()
        };
        let mut store = MealStore::new(repo);

        let err = store.add(lunch()).unwrap_err();

        assert!(matches!(err, StoreError::Storage(_)));
        assert!(store.meals().is_empty());
    }

    #[test]
    fn corrupt_blob_is_reported_and_kept() {
        let repo = FlakyRepo::default();
        repo.write_blob(MEALS_KEY, b"{not json").unwrap();
        let mut store = MealStore::new(&repo);

        let err = store.load().unwrap_err();

        assert!(matches!(err, StoreError::DataCorruption(_)));
        assert_eq!(repo.read_blob(MEALS_KEY).unwrap().as_deref(), Some(&b"{not json"[..]));
    }
}
