//! Ordered meal collection.
//!
//! # Invariants
//! - No two meals share a `MealId`.
//! - Order carries no meaning beyond display; aggregation must not depend on it.

use crate::model::meal::{Meal, MealId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// The full set of logged meals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MealCollection {
    meals: Vec<Meal>,
}

impl MealCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.meals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meals.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Meal> {
        self.meals.iter()
    }

    pub fn as_slice(&self) -> &[Meal] {
        &self.meals
    }

    pub fn get(&self, id: MealId) -> Option<&Meal> {
        self.meals.iter().find(|meal| meal.id() == id)
    }

    pub fn contains(&self, id: MealId) -> bool {
        self.position(id).is_some()
    }

    /// Index of the meal with `id`, if present.
    pub fn position(&self, id: MealId) -> Option<usize> {
        self.meals.iter().position(|meal| meal.id() == id)
    }

    /// Appends `meal`, returning it back when its id is already taken.
    pub fn push(&mut self, meal: Meal) -> Result<(), Meal> {
        if self.contains(meal.id()) {
            return Err(meal);
        }
        self.meals.push(meal);
        Ok(())
    }

    pub(crate) fn get_mut(&mut self, id: MealId) -> Option<&mut Meal> {
        self.meals.iter_mut().find(|meal| meal.id() == id)
    }

    /// Removes every meal whose id is in `ids`; returns how many were removed.
    pub(crate) fn remove_ids(&mut self, ids: &HashSet<MealId>) -> usize {
        let before = self.meals.len();
        self.meals.retain(|meal| !ids.contains(&meal.id()));
        before - self.meals.len()
    }

    /// Removes meals at the given indices; indices must be in range.
    pub(crate) fn remove_positions(&mut self, positions: &BTreeSet<usize>) {
        // Reverse order keeps the remaining indices valid.
        for &position in positions.iter().rev() {
            self.meals.remove(position);
        }
    }

    /// First id that appears more than once, if any.
    pub fn find_duplicate_id(&self) -> Option<MealId> {
        let mut seen = HashSet::with_capacity(self.meals.len());
        self.meals
            .iter()
            .map(Meal::id)
            .find(|id| !seen.insert(*id))
    }

    pub fn into_vec(self) -> Vec<Meal> {
        self.meals
    }
}

impl<'a> IntoIterator for &'a MealCollection {
    type Item = &'a Meal;
    type IntoIter = std::slice::Iter<'a, Meal>;

    fn into_iter(self) -> Self::IntoIter {
        self.meals.iter()
    }
}

impl IntoIterator for MealCollection {
    type Item = Meal;
    type IntoIter = std::vec::IntoIter<Meal>;

    fn into_iter(self) -> Self::IntoIter {
        self.meals.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::MealCollection;
    use crate::model::meal::{Meal, MealType};
    use chrono::{Local, TimeZone};
    use std::collections::BTreeSet;

    fn meal(name: &str) -> Meal {
        let date = Local.with_ymd_and_hms(2024, 3, 11, 12, 0, 0).unwrap();
        Meal::with_details(date, name, MealType::Lunch, 200)
    }

    #[test]
    fn push_rejects_duplicate_ids() {
        let mut meals = MealCollection::new();
        let soup = meal("soup");
        meals.push(soup.clone()).unwrap();

        let rejected = meals.push(soup.clone()).unwrap_err();
        assert_eq!(rejected, soup);
        assert_eq!(meals.len(), 1);
    }

    #[test]
    fn remove_positions_handles_unsorted_input() {
        let mut meals = MealCollection::new();
        for name in ["a", "b", "c", "d"] {
            meals.push(meal(name)).unwrap();
        }

        meals.remove_positions(&BTreeSet::from([3, 0]));

        let names: Vec<_> = meals.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["b", "c"]);
    }
}
