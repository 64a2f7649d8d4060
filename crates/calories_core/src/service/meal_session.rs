//! UI-facing session over the meal store.
//!
//! # Responsibility
//! - Drive the explicit lifecycle: `start` loads, every `resume` reloads,
//!   every mutation saves through the store.
//! - Own the reference-day cursor and its navigation rules.
//! - Assemble the per-day view (meals, totals, forward-navigation flag).
//!
//! # Invariants
//! - The cursor never moves past the current local moment via `next_day`
//!   or `pick_day`.
//! - Mutations go through `MealStore`; the session keeps no copy of meals.

use crate::model::collection::MealCollection;
use crate::model::meal::{Meal, MealId};
use crate::repo::blob_repo::BlobRepository;
use crate::service::day_aggregator::{
    calendar_day, can_advance_to_next_day, meals_on_day, shift_day, totals, DayStep,
    NutritionTotals,
};
use crate::service::meal_store::{MealStore, StoreError, StoreResult};
use chrono::{DateTime, Local, NaiveDate};
use log::{debug, info};
use std::collections::BTreeSet;

/// Everything a day screen renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayView<'a> {
    pub day: NaiveDate,
    /// Meals on `day`, in collection order. Row indices refer to this list.
    pub meals: Vec<&'a Meal>,
    pub totals: NutritionTotals,
    pub can_advance: bool,
}

/// Meal session bound to one store.
pub struct MealSession<R: BlobRepository> {
    store: MealStore<R>,
    cursor: DateTime<Local>,
}

impl<R: BlobRepository> MealSession<R> {
    /// Wraps `store` with the cursor at the current moment. Nothing is
    /// loaded until [`start`](MealSession::start).
    pub fn new(store: MealStore<R>) -> Self {
        Self::with_cursor(store, Local::now())
    }

    pub fn with_cursor(store: MealStore<R>, cursor: DateTime<Local>) -> Self {
        Self { store, cursor }
    }

    /// Application start: loads persisted meals.
    pub fn start(&mut self) -> StoreResult<()> {
        info!("event=session_start module=session status=start");
        self.store.load()?;
        Ok(())
    }

    /// Foreground-resume transition: reloads persisted meals.
    pub fn resume(&mut self) -> StoreResult<()> {
        debug!("event=session_resume module=session status=start");
        self.store.load()?;
        Ok(())
    }

    /// Discards unreadable stored meals after the user confirmed starting
    /// fresh.
    pub fn reset_after_corruption(&mut self) -> StoreResult<()> {
        self.store.reset()
    }

    pub fn meals(&self) -> &MealCollection {
        self.store.meals()
    }

    pub fn store(&self) -> &MealStore<R> {
        &self.store
    }

    pub fn cursor(&self) -> DateTime<Local> {
        self.cursor
    }

    /// Builds the view for the cursor's calendar day.
    pub fn day_view(&self) -> DayView<'_> {
        let meals = meals_on_day(self.store.meals(), &self.cursor);
        let totals = totals(meals.iter().copied());
        DayView {
            day: calendar_day(&self.cursor),
            meals,
            totals,
            can_advance: can_advance_to_next_day(&self.cursor),
        }
    }

    /// Moves the cursor one day back. Always allowed.
    pub fn previous_day(&mut self) {
        self.cursor = shift_day(self.cursor, DayStep::Previous);
    }

    /// Moves the cursor one day forward; returns `false` and stays put when
    /// the cursor is already on today.
    pub fn next_day(&mut self) -> bool {
        if !can_advance_to_next_day(&self.cursor) {
            return false;
        }
        self.cursor = shift_day(self.cursor, DayStep::Next).min(Local::now());
        true
    }

    /// Jumps to `day`, clamped to the current moment.
    pub fn pick_day(&mut self, day: DateTime<Local>) {
        self.cursor = day.min(Local::now());
    }

    /// Blank meal dated at the cursor, ready for the add form.
    pub fn new_meal_draft(&self) -> Meal {
        Meal::new(self.cursor)
    }

    pub fn add_meal(&mut self, meal: Meal) -> StoreResult<MealId> {
        let id = meal.id();
        self.store.add(meal)?;
        Ok(id)
    }

    pub fn edit_meal(&mut self, id: MealId, edited: Meal) -> StoreResult<()> {
        self.store.update(id, edited)?;
        Ok(())
    }

    pub fn delete_meals(&mut self, ids: &[MealId]) -> StoreResult<()> {
        self.store.delete(ids)?;
        Ok(())
    }

    /// Deletes rows of the current day view by their index in
    /// [`DayView::meals`].
    pub fn delete_day_rows(&mut self, rows: &BTreeSet<usize>) -> StoreResult<()> {
        let day_ids: Vec<MealId> = self.day_view().meals.iter().map(|meal| meal.id()).collect();
        let mut ids = Vec::with_capacity(rows.len());
        for &row in rows {
            let id = day_ids
                .get(row)
                .copied()
                .ok_or(StoreError::PositionOutOfRange {
                    position: row,
                    len: day_ids.len(),
                })?;
            ids.push(id);
        }
        self.delete_meals(&ids)
    }
}
