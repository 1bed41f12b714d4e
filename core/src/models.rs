use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Error returned when a string names none of a closed set of tags.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid {kind} '{value}'. Must be one of: {allowed}")]
pub struct ParseTagError {
    pub kind: &'static str,
    pub value: String,
    pub allowed: String,
}

/// Closed enumeration persisted as a lowercase tag, with a display label
/// and icon for every variant.
macro_rules! tagged_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($variant:ident => $tag:literal, $label:literal, $icon:literal;)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $tag)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $tag,)+
                }
            }

            #[must_use]
            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }

            #[must_use]
            pub fn icon(self) -> &'static str {
                match self {
                    $($name::$variant => $icon,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ParseTagError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let lower = s.trim().to_lowercase();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == lower)
                    .ok_or_else(|| ParseTagError {
                        kind: $kind,
                        value: s.to_string(),
                        allowed: $name::ALL
                            .iter()
                            .map(|v| v.as_str())
                            .collect::<Vec<_>>()
                            .join(", "),
                    })
            }
        }
    };
}

tagged_enum! {
    MealType, "meal type" {
        Breakfast => "breakfast", "早餐", "fa-sun";
        Lunch => "lunch", "午餐", "fa-cloud-sun";
        Dinner => "dinner", "晚餐", "fa-moon";
        Snack => "snack", "加餐", "fa-cookie";
    }
}

tagged_enum! {
    WorkoutType, "workout type" {
        Running => "running", "跑步", "fa-running";
        Cycling => "cycling", "骑行", "fa-bicycle";
        Swimming => "swimming", "游泳", "fa-swimmer";
        Strength => "strength", "力量训练", "fa-dumbbell";
        Walking => "walking", "步行", "fa-walking";
        Hiit => "hiit", "HIIT", "fa-fire-alt";
        Yoga => "yoga", "瑜伽", "fa-spa";
        Other => "other", "其他", "fa-heartbeat";
    }
}

tagged_enum! {
    StudyCategory, "study category" {
        Reading => "reading", "阅读", "fa-book-reader";
        Coding => "coding", "编程", "fa-code";
        Course => "course", "课程", "fa-chalkboard-teacher";
        Practice => "practice", "练习", "fa-pencil-alt";
        Other => "other", "其他", "fa-folder";
    }
}

/// Where a workout came from. Any source other than `manual`, such as a
/// device name written by a file upload, reads as `Imported`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutSource {
    #[default]
    Manual,
    #[serde(other)]
    Imported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

/// Numeric fields written by hand-edited or older exports may be missing,
/// null, or strings. Those decode to zero instead of rejecting the whole
/// collection.
mod lenient {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn parse(value: &Value) -> Option<f64> {
        match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
        .filter(|v| v.is_finite())
    }

    pub fn number<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        Ok(parse(&Value::deserialize(d)?).unwrap_or(0.0))
    }

    pub fn optional_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Ok(parse(&Value::deserialize(d)?))
    }

    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    fn to_count(n: f64) -> u32 {
        n.trunc().clamp(0.0, f64::from(u32::MAX)) as u32
    }

    pub fn count<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
        Ok(parse(&Value::deserialize(d)?).map_or(0, to_count))
    }

    pub fn optional_count<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
        Ok(parse(&Value::deserialize(d)?).map(to_count))
    }

    /// Any value that does not decode as `T` reads as absent.
    pub fn optional<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(serde_json::from_value(Value::deserialize(d)?).ok())
    }
}

// --- Food entries ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodEntry {
    pub id: String,
    pub date: String,
    pub meal_type: MealType,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub weight: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub calories: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub carbs: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub protein: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub fat: f64,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewFoodEntry {
    pub date: NaiveDate,
    pub meal_type: MealType,
    pub name: String,
    pub weight: f64,
    pub calories: f64,
    pub carbs: f64,
    pub protein: f64,
    pub fat: f64,
    pub note: String,
}

#[derive(Debug, Clone, Default)]
pub struct FoodUpdate {
    pub date: Option<NaiveDate>,
    pub meal_type: Option<MealType>,
    pub name: Option<String>,
    pub weight: Option<f64>,
    pub calories: Option<f64>,
    pub carbs: Option<f64>,
    pub protein: Option<f64>,
    pub fat: Option<f64>,
    pub note: Option<String>,
}

// --- Workout entries ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutEntry {
    pub id: String,
    pub date: String,
    #[serde(rename = "type")]
    pub workout_type: WorkoutType,
    #[serde(default)]
    pub start_time: String,
    #[serde(default, deserialize_with = "lenient::count")]
    pub duration: u32,
    #[serde(default, deserialize_with = "lenient::number")]
    pub calories: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub distance: f64,
    #[serde(default, deserialize_with = "lenient::count")]
    pub avg_heart_rate: u32,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub source: WorkoutSource,
    #[serde(default)]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewWorkoutEntry {
    pub date: NaiveDate,
    pub workout_type: WorkoutType,
    pub start_time: String,
    pub duration: u32,
    pub calories: f64,
    pub distance: f64,
    pub avg_heart_rate: u32,
    pub note: String,
    pub source: WorkoutSource,
}

#[derive(Debug, Clone, Default)]
pub struct WorkoutUpdate {
    pub date: Option<NaiveDate>,
    pub workout_type: Option<WorkoutType>,
    pub start_time: Option<String>,
    pub duration: Option<u32>,
    pub calories: Option<f64>,
    pub distance: Option<f64>,
    pub avg_heart_rate: Option<u32>,
    pub note: Option<String>,
    pub source: Option<WorkoutSource>,
}

// --- Notes ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteEntry {
    pub id: String,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewNoteEntry {
    pub date: NaiveDate,
    pub title: Option<String>,
    pub content: String,
}

#[derive(Debug, Clone, Default)]
pub struct NoteUpdate {
    pub date: Option<NaiveDate>,
    pub title: Option<Option<String>>,
    pub content: Option<String>,
}

// --- Study entries ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyEntry {
    pub id: String,
    pub date: String,
    pub category: StudyCategory,
    #[serde(default, deserialize_with = "lenient::count")]
    pub duration: u32,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reflection: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<String>,
    #[serde(default)]
    pub tasks: Vec<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewStudyEntry {
    pub date: NaiveDate,
    pub category: StudyCategory,
    pub duration: u32,
    pub topic: String,
    pub content: String,
    pub reflection: Option<String>,
    pub resources: Option<String>,
    pub tasks: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct StudyUpdate {
    pub date: Option<NaiveDate>,
    pub category: Option<StudyCategory>,
    pub duration: Option<u32>,
    pub topic: Option<String>,
    pub content: Option<String>,
    pub reflection: Option<Option<String>>,
    pub resources: Option<Option<String>>,
    pub tasks: Option<Vec<String>>,
}

// --- Weight ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightEntry {
    pub date: String,
    #[serde(
        default,
        deserialize_with = "lenient::optional_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub morning_weight: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient::optional_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub evening_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl WeightEntry {
    /// The day's representative weight: morning, else evening.
    #[must_use]
    pub fn value(&self) -> Option<f64> {
        self.morning_weight.or(self.evening_weight)
    }
}

#[derive(Debug, Clone)]
pub struct WeightInput {
    pub date: NaiveDate,
    pub morning_weight: Option<f64>,
    pub evening_weight: Option<f64>,
}

// --- Settings ---

/// User profile and daily goals. Stored records are merged over the
/// defaults field by field: a missing or unreadable field takes its default
/// and the rest of the record is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredSettings")]
pub struct Settings {
    pub nickname: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    /// Centimetres.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_weight: Option<f64>,
    pub calorie_goal: u32,
    pub carbs_goal: u32,
    pub protein_goal: u32,
    pub fat_goal: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            nickname: "用户".to_string(),
            gender: None,
            birth_date: None,
            height: None,
            current_weight: None,
            target_weight: None,
            calorie_goal: 2000,
            carbs_goal: 250,
            protein_goal: 100,
            fat_goal: 65,
        }
    }
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct StoredSettings {
    #[serde(deserialize_with = "lenient::optional")]
    nickname: Option<String>,
    #[serde(deserialize_with = "lenient::optional")]
    gender: Option<Gender>,
    #[serde(deserialize_with = "lenient::optional")]
    birth_date: Option<String>,
    #[serde(deserialize_with = "lenient::optional_number")]
    height: Option<f64>,
    #[serde(deserialize_with = "lenient::optional_number")]
    current_weight: Option<f64>,
    #[serde(deserialize_with = "lenient::optional_number")]
    target_weight: Option<f64>,
    #[serde(deserialize_with = "lenient::optional_count")]
    calorie_goal: Option<u32>,
    #[serde(deserialize_with = "lenient::optional_count")]
    carbs_goal: Option<u32>,
    #[serde(deserialize_with = "lenient::optional_count")]
    protein_goal: Option<u32>,
    #[serde(deserialize_with = "lenient::optional_count")]
    fat_goal: Option<u32>,
}

impl From<StoredSettings> for Settings {
    fn from(stored: StoredSettings) -> Self {
        let defaults = Settings::default();
        Settings {
            nickname: stored.nickname.unwrap_or(defaults.nickname),
            gender: stored.gender,
            birth_date: stored.birth_date.filter(|d| !d.is_empty()),
            height: stored.height,
            current_weight: stored.current_weight,
            target_weight: stored.target_weight,
            calorie_goal: stored.calorie_goal.unwrap_or(defaults.calorie_goal),
            carbs_goal: stored.carbs_goal.unwrap_or(defaults.carbs_goal),
            protein_goal: stored.protein_goal.unwrap_or(defaults.protein_goal),
            fat_goal: stored.fat_goal.unwrap_or(defaults.fat_goal),
        }
    }
}

// --- Food database ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodDatabaseItem {
    pub name: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub calories_per_100g: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub carbs_per_100g: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub protein_per_100g: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub fat_per_100g: f64,
}

// --- Derived views ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct NutritionSummary {
    pub calories: f64,
    pub carbs: f64,
    pub protein: f64,
    pub fat: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct WorkoutSummary {
    pub calories: f64,
    pub duration: u32,
    pub distance: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudySummary {
    pub duration: u32,
    pub items: usize,
    pub completed_tasks: usize,
}

/// One day of a weekly or monthly rollup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayStats {
    pub date: String,
    pub label: String,
    pub calories_in: f64,
    pub calories_out: f64,
    pub carbs: f64,
    pub protein: f64,
    pub fat: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MealDistribution {
    pub breakfast: f64,
    pub lunch: f64,
    pub dinner: f64,
    pub snack: f64,
}

impl MealDistribution {
    #[must_use]
    pub fn get(&self, meal: MealType) -> f64 {
        match meal {
            MealType::Breakfast => self.breakfast,
            MealType::Lunch => self.lunch,
            MealType::Dinner => self.dinner,
            MealType::Snack => self.snack,
        }
    }

    fn slot(&mut self, meal: MealType) -> &mut f64 {
        match meal {
            MealType::Breakfast => &mut self.breakfast,
            MealType::Lunch => &mut self.lunch,
            MealType::Dinner => &mut self.dinner,
            MealType::Snack => &mut self.snack,
        }
    }

    pub fn add(&mut self, meal: MealType, calories: f64) {
        *self.slot(meal) += calories;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    /// Fixed thresholds: <18.5, <24, <28, otherwise obese.
    #[must_use]
    pub fn classify(bmi: f64) -> Self {
        if bmi < 18.5 {
            Self::Underweight
        } else if bmi < 24.0 {
            Self::Normal
        } else if bmi < 28.0 {
            Self::Overweight
        } else {
            Self::Obese
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Underweight => "偏瘦",
            Self::Normal => "正常",
            Self::Overweight => "偏胖",
            Self::Obese => "肥胖",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bmi {
    /// Rounded to one decimal.
    pub value: f64,
    pub category: BmiCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub date: String,
    pub nutrition: NutritionSummary,
    pub workout: WorkoutSummary,
    pub calorie_balance: f64,
    pub streak_days: u32,
    pub calorie_goal: u32,
    /// Percent of the calorie goal eaten, capped at 100.
    pub goal_progress: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyReport {
    pub date: String,
    pub studies: Vec<StudyEntry>,
    pub nutrition: NutritionSummary,
    pub workout: WorkoutSummary,
    pub study: StudySummary,
}

// --- Export / Import ---

pub const EXPORT_VERSION: i64 = 1;

fn default_export_version() -> i64 {
    EXPORT_VERSION
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportData {
    #[serde(default = "default_export_version")]
    pub version: i64,
    pub foods: Vec<FoodEntry>,
    pub workouts: Vec<WorkoutEntry>,
    pub notes: Vec<NoteEntry>,
    pub studies: Vec<StudyEntry>,
    pub settings: Settings,
    pub food_database: Vec<FoodDatabaseItem>,
    #[serde(default)]
    pub weights: Vec<WeightEntry>,
    pub exported_at: String,
}

/// Import document: every collection is optional and only the ones present
/// are replaced. Unknown top-level fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImportData {
    pub foods: Option<Vec<FoodEntry>>,
    pub workouts: Option<Vec<WorkoutEntry>>,
    pub notes: Option<Vec<NoteEntry>>,
    pub studies: Option<Vec<StudyEntry>>,
    pub settings: Option<Settings>,
    pub food_database: Option<Vec<FoodDatabaseItem>>,
    pub weights: Option<Vec<WeightEntry>>,
}

impl From<ExportData> for ImportData {
    fn from(data: ExportData) -> Self {
        Self {
            foods: Some(data.foods),
            workouts: Some(data.workouts),
            notes: Some(data.notes),
            studies: Some(data.studies),
            settings: Some(data.settings),
            food_database: Some(data.food_database),
            weights: Some(data.weights),
        }
    }
}
