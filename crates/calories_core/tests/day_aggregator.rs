use calories_core::db::open_db_in_memory;
use calories_core::service::day_aggregator::{can_advance_from, meals_on_date, today};
use calories_core::{
    can_advance_to_next_day, meals_on_day, shift_day, totals, DayStep, Meal, MealCollection,
    MealStore, MealType, NutritionTotals, SqliteBlobRepository,
};
use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone};

fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Local> {
    Local
        .with_ymd_and_hms(year, month, day, hour, minute, 0)
        .unwrap()
}

fn meal_on(date: DateTime<Local>, calories: i32) -> Meal {
    Meal::with_details(date, "meal", MealType::Lunch, calories)
}

#[test]
fn added_meal_appears_once_on_its_day() {
    let conn = open_db_in_memory().unwrap();
    let mut store = MealStore::open(SqliteBlobRepository::try_new(&conn).unwrap()).unwrap();

    let mut eggs = Meal::with_details(at(2024, 1, 1, 8, 0), "Eggs", MealType::Breakfast, 300);
    eggs.set_nutrition(20, 2, 18);
    store.add(eggs.clone()).unwrap();

    let day = meals_on_day(store.meals(), &at(2024, 1, 1, 17, 45));
    assert_eq!(day, vec![&eggs]);
    assert_eq!(
        totals(day),
        NutritionTotals {
            calories: 300,
            proteins: 20,
            carbs: 2,
            fats: 18,
        }
    );
}

#[test]
fn totals_are_bucketed_per_calendar_day() {
    let mut meals = MealCollection::new();
    meals.push(meal_on(at(2024, 1, 1, 8, 0), 300)).unwrap();
    meals.push(meal_on(at(2024, 1, 2, 9, 0), 500)).unwrap();
    meals.push(meal_on(at(2024, 1, 1, 19, 0), 450)).unwrap();

    let first = totals(meals_on_day(&meals, &at(2024, 1, 1, 12, 0)));
    let second = totals(meals_on_day(&meals, &at(2024, 1, 2, 12, 0)));

    assert_eq!(first.calories, 750);
    assert_eq!(second.calories, 500);
}

#[test]
fn day_bucket_spans_whole_local_day() {
    let mut meals = MealCollection::new();
    let early = meal_on(at(2024, 6, 10, 0, 30), 100);
    let late = meal_on(at(2024, 6, 10, 23, 30), 200);
    let next_day = meal_on(at(2024, 6, 11, 0, 30), 400);
    for meal in [early.clone(), next_day, late.clone()] {
        meals.push(meal).unwrap();
    }

    let date = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
    assert_eq!(meals_on_date(&meals, date), vec![&early, &late]);
}

#[test]
fn absent_macros_count_as_zero() {
    let mut with_macros = meal_on(at(2024, 1, 1, 8, 0), 300);
    with_macros.set_nutrition(20, 2, 18);
    let mut only_carbs = meal_on(at(2024, 1, 1, 13, 0), 200);
    only_carbs.carbs = Some(40);
    let bare = meal_on(at(2024, 1, 1, 19, 0), 100);

    let sums = totals([&with_macros, &only_carbs, &bare]);

    assert_eq!(
        sums,
        NutritionTotals {
            calories: 600,
            proteins: 20,
            carbs: 42,
            fats: 18,
        }
    );
}

#[test]
fn totals_do_not_depend_on_collection_order() {
    let mut samples = Vec::new();
    for (hour, calories, proteins) in [(7, 320, Some(12)), (12, 610, None), (20, 540, Some(33))] {
        let mut meal = meal_on(at(2024, 2, 14, hour, 0), calories);
        meal.proteins = proteins;
        samples.push(meal);
    }
    samples.push(meal_on(at(2024, 2, 15, 9, 0), 999));

    let day = at(2024, 2, 14, 12, 0);
    let forward: MealCollection = collect(samples.iter().cloned());
    let reversed: MealCollection = collect(samples.iter().rev().cloned());

    assert_eq!(
        totals(meals_on_day(&forward, &day)),
        totals(meals_on_day(&reversed, &day))
    );
    assert_eq!(totals(meals_on_day(&forward, &day)).calories, 1470);
}

#[test]
fn meals_on_day_preserves_input_order() {
    let a = meal_on(at(2024, 1, 1, 20, 0), 1);
    let b = meal_on(at(2024, 1, 1, 7, 0), 2);
    let day = meals_on_day([&a, &b], &at(2024, 1, 1, 12, 0));
    assert_eq!(day, vec![&a, &b]);
}

#[test]
fn cannot_advance_from_today_but_can_from_yesterday() {
    let now = Local::now();
    assert!(!can_advance_to_next_day(&now));

    let yesterday = shift_day(now, DayStep::Previous);
    assert!(can_advance_to_next_day(&yesterday));
    assert!(can_advance_from(yesterday.date_naive(), today()));
}

#[test]
fn backward_navigation_has_no_floor() {
    let old = at(1999, 1, 1, 12, 0);
    assert!(can_advance_to_next_day(&old));
    let older = shift_day(old, DayStep::Previous);
    assert_eq!(older.date_naive(), NaiveDate::from_ymd_opt(1998, 12, 31).unwrap());
}

#[test]
fn shift_day_moves_one_calendar_day() {
    let day = at(2024, 12, 31, 9, 15);
    let next = shift_day(day, DayStep::Next);
    assert_eq!(next.date_naive(), NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    assert_eq!(next - day, Duration::days(1));
}

fn collect(meals: impl Iterator<Item = Meal>) -> MealCollection {
    let mut collection = MealCollection::new();
    for meal in meals {
        collection.push(meal).unwrap();
    }
    collection
}
