//! Read-only rollups over the stored collections.

use std::collections::HashSet;

use chrono::{Datelike, Days, Local, NaiveDate};

use crate::food_db::round1;
use crate::models::{
    Bmi, BmiCategory, DATE_FORMAT, DailyReport, Dashboard, DayStats, FoodEntry,
    MealDistribution, NutritionSummary, StudySummary, WeightEntry, WorkoutEntry,
    WorkoutSummary, format_date,
};
use crate::store::Store;

/// Weekday labels indexed by days from Sunday.
const WEEKDAY_LABELS: [&str; 7] = ["周日", "周一", "周二", "周三", "周四", "周五", "周六"];

const STREAK_LOOKBACK_DAYS: u32 = 365;

/// The current local calendar date.
#[must_use]
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn nutrition_of<'a>(foods: impl IntoIterator<Item = &'a FoodEntry>) -> NutritionSummary {
    foods
        .into_iter()
        .fold(NutritionSummary::default(), |mut acc, f| {
            acc.calories += f.calories;
            acc.carbs += f.carbs;
            acc.protein += f.protein;
            acc.fat += f.fat;
            acc
        })
}

fn workout_of<'a>(workouts: impl IntoIterator<Item = &'a WorkoutEntry>) -> WorkoutSummary {
    workouts
        .into_iter()
        .fold(WorkoutSummary::default(), |mut acc, w| {
            acc.calories += w.calories;
            acc.duration = acc.duration.saturating_add(w.duration);
            acc.distance += w.distance;
            acc
        })
}

fn day_stats(
    foods: &[FoodEntry],
    workouts: &[WorkoutEntry],
    day: NaiveDate,
    label: String,
) -> DayStats {
    let date = format_date(day);
    let nutrition = nutrition_of(foods.iter().filter(|f| f.date == date));
    let burned = workout_of(workouts.iter().filter(|w| w.date == date));
    DayStats {
        date,
        label,
        calories_in: nutrition.calories,
        calories_out: burned.calories,
        carbs: nutrition.carbs,
        protein: nutrition.protein,
        fat: nutrition.fat,
    }
}

/// BMI for a weight in kilograms and height in centimetres. The reported
/// value is rounded to one decimal; the band uses the unrounded figure.
#[must_use]
pub fn bmi(weight_kg: f64, height_cm: f64) -> Option<Bmi> {
    if weight_kg <= 0.0 || height_cm <= 0.0 || !weight_kg.is_finite() || !height_cm.is_finite() {
        return None;
    }
    let metres = height_cm / 100.0;
    let raw = weight_kg / (metres * metres);
    Some(Bmi {
        value: round1(raw),
        category: BmiCategory::classify(raw),
    })
}

impl Store {
    #[must_use]
    pub fn daily_summary(&self, date: NaiveDate) -> NutritionSummary {
        nutrition_of(&self.foods_by_date(date))
    }

    #[must_use]
    pub fn daily_workout_summary(&self, date: NaiveDate) -> WorkoutSummary {
        workout_of(&self.workouts_by_date(date))
    }

    #[must_use]
    pub fn daily_study_summary(&self, date: NaiveDate) -> StudySummary {
        let studies = self.studies_by_date(date);
        StudySummary {
            duration: studies
                .iter()
                .fold(0u32, |acc, s| acc.saturating_add(s.duration)),
            items: studies.len(),
            completed_tasks: studies.iter().map(|s| s.tasks.len()).sum(),
        }
    }

    #[must_use]
    pub fn streak_days(&self) -> u32 {
        self.streak_days_at(today())
    }

    /// Consecutive days with at least one food entry, counting back from
    /// `today`. An empty `today` is skipped once without breaking the run.
    #[must_use]
    pub fn streak_days_at(&self, today: NaiveDate) -> u32 {
        let logged: HashSet<String> = self.foods().into_iter().map(|f| f.date).collect();

        let mut streak = 0;
        let mut day = today;
        for i in 0..STREAK_LOOKBACK_DAYS {
            if logged.contains(&format_date(day)) {
                streak += 1;
            } else if i > 0 {
                break;
            }
            let Some(prev) = day.pred_opt() else {
                break;
            };
            day = prev;
        }
        streak
    }

    #[must_use]
    pub fn weekly_stats(&self) -> Vec<DayStats> {
        self.weekly_stats_at(today())
    }

    /// Seven days ending with `today`, oldest first, labelled by weekday.
    #[must_use]
    pub fn weekly_stats_at(&self, today: NaiveDate) -> Vec<DayStats> {
        self.rollup(today, 7, |day| {
            WEEKDAY_LABELS[day.weekday().num_days_from_sunday() as usize].to_string()
        })
    }

    #[must_use]
    pub fn monthly_stats(&self) -> Vec<DayStats> {
        self.monthly_stats_at(today())
    }

    /// Thirty days ending with `today`, oldest first, labelled `M/D`.
    #[must_use]
    pub fn monthly_stats_at(&self, today: NaiveDate) -> Vec<DayStats> {
        self.rollup(today, 30, |day| format!("{}/{}", day.month(), day.day()))
    }

    fn rollup(
        &self,
        today: NaiveDate,
        days: u64,
        label: impl Fn(NaiveDate) -> String,
    ) -> Vec<DayStats> {
        let foods = self.foods();
        let workouts = self.workouts();
        (0..days)
            .rev()
            .filter_map(|offset| today.checked_sub_days(Days::new(offset)))
            .map(|day| day_stats(&foods, &workouts, day, label(day)))
            .collect()
    }

    #[must_use]
    pub fn meal_distribution(&self, date: NaiveDate) -> MealDistribution {
        self.foods_by_date(date)
            .iter()
            .fold(MealDistribution::default(), |mut acc, f| {
                acc.add(f.meal_type, f.calories);
                acc
            })
    }

    /// The most recently dated weight record.
    #[must_use]
    pub fn latest_weight(&self) -> Option<WeightEntry> {
        self.weights()
            .into_iter()
            .max_by(|a, b| a.date.cmp(&b.date))
    }

    /// Latest weight minus the weight recorded exactly `days` days before
    /// the latest record. `None` when either record or value is missing.
    #[must_use]
    pub fn weight_change(&self, days: u32) -> Option<f64> {
        let weights = self.weights();
        let latest = weights.iter().max_by(|a, b| a.date.cmp(&b.date))?;
        let latest_date = NaiveDate::parse_from_str(&latest.date, DATE_FORMAT).ok()?;
        let earlier_date = format_date(latest_date.checked_sub_days(Days::new(u64::from(days)))?);
        let earlier = weights.iter().find(|w| w.date == earlier_date)?;
        Some(latest.value()? - earlier.value()?)
    }

    /// BMI from the settings height and the latest weight, falling back to
    /// the settings' current weight.
    #[must_use]
    pub fn current_bmi(&self) -> Option<Bmi> {
        let settings = self.settings();
        let height = settings.height?;
        let weight = self
            .latest_weight()
            .and_then(|w| w.value())
            .or(settings.current_weight)?;
        bmi(weight, height)
    }

    #[must_use]
    pub fn dashboard(&self) -> Dashboard {
        self.dashboard_at(today())
    }

    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub fn dashboard_at(&self, today: NaiveDate) -> Dashboard {
        let nutrition = self.daily_summary(today);
        let workout = self.daily_workout_summary(today);
        let calorie_goal = self.settings().calorie_goal;
        let goal_progress = if calorie_goal == 0 {
            0
        } else {
            (nutrition.calories / f64::from(calorie_goal) * 100.0)
                .round()
                .clamp(0.0, 100.0) as u32
        };

        Dashboard {
            date: format_date(today),
            nutrition,
            workout,
            calorie_balance: nutrition.calories - workout.calories,
            streak_days: self.streak_days_at(today),
            calorie_goal,
            goal_progress,
        }
    }

    #[must_use]
    pub fn daily_report(&self, date: NaiveDate) -> DailyReport {
        DailyReport {
            date: format_date(date),
            studies: self.studies_by_date(date),
            nutrition: self.daily_summary(date),
            workout: self.daily_workout_summary(date),
            study: self.daily_study_summary(date),
        }
    }
}
