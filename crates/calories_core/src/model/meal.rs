//! Meal domain model.
//!
//! # Responsibility
//! - Define the canonical record for one logged food intake event.
//! - Own save-time normalization (macro clamping) and submission checks.
//!
//! # Invariants
//! - `id` is stable and never reassigned after construction.
//! - Absent macros (`None`) mean "not recorded" and are distinct from zero.
//! - Saved macros are never negative; clamping happens at save time only.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Calories assigned to a freshly constructed meal.
pub const DEFAULT_CALORIES: i32 = 100;

/// Stable opaque identifier for a logged meal.
///
/// Serialized as a bare UUID string so identity survives storage round-trips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MealId(Uuid);

impl MealId {
    /// Generates a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing UUID, e.g. one read back from storage.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Display for MealId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fixed meal categories, in picker display order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MealType {
    #[default]
    Breakfast,
    Lunch,
    Dinner,
    Supper,
    Snack,
}

impl MealType {
    /// All variants in the order a picker lists them.
    pub const ALL: [MealType; 5] = [
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Dinner,
        MealType::Supper,
        MealType::Snack,
    ];

    /// Human-readable label, identical to the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Breakfast => "Breakfast",
            Self::Lunch => "Lunch",
            Self::Dinner => "Dinner",
            Self::Supper => "Supper",
            Self::Snack => "Snack",
        }
    }
}

impl Display for MealType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealType {
    type Err = MealValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| MealValidationError::UnknownMealType(value.to_string()))
    }
}

/// Submission-time validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MealValidationError {
    /// Calories must be `>= 0`; rejected rather than corrected.
    NegativeCalories(i32),
    /// Name is empty or whitespace-only.
    BlankName,
    /// Meal type label does not match any known category.
    UnknownMealType(String),
    /// A meal with the same id is already in the collection.
    DuplicateId(MealId),
}

impl Display for MealValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NegativeCalories(value) => {
                write!(f, "calories can't be negative (got {value})")
            }
            Self::BlankName => write!(f, "meal name must not be empty"),
            Self::UnknownMealType(value) => write!(f, "unknown meal type `{value}`"),
            Self::DuplicateId(id) => write!(f, "meal id already exists: {id}"),
        }
    }
}

impl Error for MealValidationError {}

/// One logged food intake event with nutritional metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meal {
    id: MealId,
    /// Moment of consumption, interpreted in the local calendar.
    pub date: DateTime<Local>,
    pub name: String,
    pub meal_type: MealType,
    pub calories: i32,
    pub proteins: Option<i32>,
    pub carbs: Option<i32>,
    pub fats: Option<i32>,
}

impl Meal {
    /// Creates a blank meal for `date` with a generated id and defaults
    /// (empty name, breakfast, 100 kcal, no macros recorded).
    pub fn new(date: DateTime<Local>) -> Self {
        Self::with_id(MealId::generate(), date)
    }

    /// Creates a blank meal with a caller-provided id.
    ///
    /// Used by import paths where identity already exists.
    pub fn with_id(id: MealId, date: DateTime<Local>) -> Self {
        Self {
            id,
            date,
            name: String::new(),
            meal_type: MealType::default(),
            calories: DEFAULT_CALORIES,
            proteins: None,
            carbs: None,
            fats: None,
        }
    }

    pub fn with_details(
        date: DateTime<Local>,
        name: impl Into<String>,
        meal_type: MealType,
        calories: i32,
    ) -> Self {
        let mut meal = Self::new(date);
        meal.name = name.into();
        meal.meal_type = meal_type;
        meal.calories = calories;
        meal
    }

    pub fn id(&self) -> MealId {
        self.id
    }

    /// Records all three macros at once.
    pub fn set_nutrition(&mut self, proteins: i32, carbs: i32, fats: i32) {
        self.proteins = Some(proteins);
        self.carbs = Some(carbs);
        self.fats = Some(fats);
    }

    /// Checks the fields a submission must satisfy before it is saved.
    ///
    /// # Errors
    /// - `NegativeCalories` when `calories < 0`.
    /// - `BlankName` when `name` is empty after trimming.
    pub fn validate(&self) -> Result<(), MealValidationError> {
        if self.calories < 0 {
            return Err(MealValidationError::NegativeCalories(self.calories));
        }
        if self.name.trim().is_empty() {
            return Err(MealValidationError::BlankName);
        }
        Ok(())
    }

    /// Replaces negative recorded macros with zero. Absent macros stay absent.
    pub fn clamp_macros(&mut self) {
        for value in [&mut self.proteins, &mut self.carbs, &mut self.fats] {
            if let Some(amount) = value {
                *amount = (*amount).max(0);
            }
        }
    }

    /// Validates and normalizes this meal for persistence.
    pub fn prepare_for_save(&mut self) -> Result<(), MealValidationError> {
        self.validate()?;
        self.clamp_macros();
        Ok(())
    }

    /// Copies every mutable field from `edited`, keeping this meal's id.
    pub fn apply_edit(&mut self, edited: Meal) {
        let Meal {
            id: _,
            date,
            name,
            meal_type,
            calories,
            proteins,
            carbs,
            fats,
        } = edited;
        self.date = date;
        self.name = name;
        self.meal_type = meal_type;
        self.calories = calories;
        self.proteins = proteins;
        self.carbs = carbs;
        self.fats = fats;
    }

    /// List row label, e.g. `Breakfast: Eggs | 300 kcal`.
    pub fn summary_line(&self) -> String {
        format!("{}: {} | {} kcal", self.meal_type, self.name, self.calories)
    }

    /// Returns whether the consumption time lies after `now`.
    pub fn is_in_future(&self, now: DateTime<Local>) -> bool {
        self.date > now
    }
}

#[cfg(test)]
mod tests {
    use super::{Meal, MealType, MealValidationError};
    use chrono::{Local, TimeZone};

    fn noon() -> chrono::DateTime<Local> {
        Local.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn clamp_keeps_absent_macros_absent() {
        let mut meal = Meal::with_details(noon(), "Toast", MealType::Breakfast, 150);
        meal.proteins = Some(-3);
        meal.fats = Some(4);

        meal.clamp_macros();

        assert_eq!(meal.proteins, Some(0));
        assert_eq!(meal.carbs, None);
        assert_eq!(meal.fats, Some(4));
    }

    #[test]
    fn meal_type_parses_labels_case_insensitively() {
        assert_eq!(" supper ".parse::<MealType>().unwrap(), MealType::Supper);
        let err = "brunch".parse::<MealType>().unwrap_err();
        assert_eq!(err, MealValidationError::UnknownMealType("brunch".into()));
    }
}
