//! Per-day view derivation over the meal collection.
//!
//! # Responsibility
//! - Bucket meals by local calendar day and sum their nutrition.
//! - Decide day-navigation boundaries.
//!
//! # Invariants
//! - Every function here is pure over its inputs plus the local clock.
//! - Day equality compares local calendar dates, never timestamps.
//! - Forward navigation stops at today; backward navigation has no floor.

use crate::model::meal::Meal;
use chrono::{DateTime, Days, Duration, Local, NaiveDate, TimeZone};

/// Nutrition sums for one day. Absent macros count as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NutritionTotals {
    pub calories: i64,
    pub proteins: i64,
    pub carbs: i64,
    pub fats: i64,
}

/// One-day navigation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayStep {
    Previous,
    Next,
}

impl DayStep {
    fn days(self) -> i64 {
        match self {
            Self::Previous => -1,
            Self::Next => 1,
        }
    }
}

/// Local calendar date of a moment.
pub fn calendar_day(moment: &DateTime<Local>) -> NaiveDate {
    moment.date_naive()
}

/// Today's date in the local calendar.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Meals whose date falls on the same local calendar day as `day`, in
/// collection order.
pub fn meals_on_day<'a, I>(meals: I, day: &DateTime<Local>) -> Vec<&'a Meal>
where
    I: IntoIterator<Item = &'a Meal>,
{
    meals_on_date(meals, calendar_day(day))
}

/// Same as [`meals_on_day`] for an already-resolved calendar date.
pub fn meals_on_date<'a, I>(meals: I, date: NaiveDate) -> Vec<&'a Meal>
where
    I: IntoIterator<Item = &'a Meal>,
{
    meals
        .into_iter()
        .filter(|meal| calendar_day(&meal.date) == date)
        .collect()
}

/// Sums calories and macros over `meals`.
pub fn totals<'a, I>(meals: I) -> NutritionTotals
where
    I: IntoIterator<Item = &'a Meal>,
{
    meals
        .into_iter()
        .fold(NutritionTotals::default(), |acc, meal| NutritionTotals {
            calories: acc.calories + i64::from(meal.calories),
            proteins: acc.proteins + i64::from(meal.proteins.unwrap_or(0)),
            carbs: acc.carbs + i64::from(meal.carbs.unwrap_or(0)),
            fats: acc.fats + i64::from(meal.fats.unwrap_or(0)),
        })
}

/// Whether navigation may move forward from `day`; false only on today.
pub fn can_advance_to_next_day(day: &DateTime<Local>) -> bool {
    can_advance_from(calendar_day(day), today())
}

/// Clock-free form of [`can_advance_to_next_day`].
pub fn can_advance_from(day: NaiveDate, today: NaiveDate) -> bool {
    day != today
}

/// Moves `day` one calendar day in `step` direction, keeping the local time
/// of day.
///
/// When the shifted wall-clock time does not exist locally (DST gap), the
/// earliest valid mapping is used; failing that, exactly 24 hours are added.
pub fn shift_day(day: DateTime<Local>, step: DayStep) -> DateTime<Local> {
    let naive = day.naive_local();
    let magnitude = Days::new(step.days().unsigned_abs());
    let shifted = match step {
        DayStep::Previous => naive.checked_sub_days(magnitude),
        DayStep::Next => naive.checked_add_days(magnitude),
    };

    shifted
        .and_then(|candidate| Local.from_local_datetime(&candidate).earliest())
        .or_else(|| day.checked_add_signed(Duration::days(step.days())))
        .unwrap_or(day)
}
