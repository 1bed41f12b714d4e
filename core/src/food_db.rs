//! Per-100g nutrition lookup table: seeded with common foods and grown each
//! time a new food name is logged.

use tracing::{debug, info};

use crate::models::{FoodDatabaseItem, FoodEntry, NutritionSummary};
use crate::store::{Collection, Store};

/// (name, kcal, carbs, protein, fat) per 100 g.
const DEFAULT_FOODS: [(&str, f64, f64, f64, f64); 24] = [
    ("鸡胸肉", 165.0, 0.0, 31.0, 3.6),
    ("米饭", 116.0, 25.6, 2.6, 0.3),
    ("鸡蛋", 144.0, 0.7, 13.3, 9.5),
    ("牛肉", 250.0, 0.0, 26.0, 15.0),
    ("三文鱼", 208.0, 0.0, 20.0, 13.0),
    ("西兰花", 34.0, 7.0, 2.8, 0.4),
    ("燕麦", 389.0, 66.0, 17.0, 7.0),
    ("香蕉", 89.0, 23.0, 1.1, 0.3),
    ("苹果", 52.0, 14.0, 0.3, 0.2),
    ("牛奶", 42.0, 5.0, 3.4, 1.0),
    ("酸奶", 59.0, 3.6, 10.0, 0.7),
    ("豆腐", 76.0, 1.9, 8.0, 4.8),
    ("虾", 99.0, 0.2, 24.0, 0.3),
    ("猪肉", 242.0, 0.0, 27.0, 14.0),
    ("面条", 138.0, 25.0, 4.5, 2.0),
    ("面包", 265.0, 49.0, 9.0, 3.2),
    ("红薯", 86.0, 20.0, 1.6, 0.1),
    ("土豆", 77.0, 17.0, 2.0, 0.1),
    ("黄瓜", 16.0, 3.6, 0.7, 0.1),
    ("番茄", 18.0, 3.9, 0.9, 0.2),
    ("生菜", 15.0, 2.9, 1.4, 0.2),
    ("坚果", 607.0, 21.0, 21.0, 54.0),
    ("花生", 567.0, 16.0, 26.0, 49.0),
    ("蛋白粉", 375.0, 7.5, 75.0, 3.8),
];

#[must_use]
pub fn default_foods() -> Vec<FoodDatabaseItem> {
    DEFAULT_FOODS
        .iter()
        .map(|&(name, calories, carbs, protein, fat)| FoodDatabaseItem {
            name: name.to_string(),
            calories_per_100g: calories,
            carbs_per_100g: carbs,
            protein_per_100g: protein,
            fat_per_100g: fat,
        })
        .collect()
}

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

impl FoodDatabaseItem {
    /// Build an item from a logged portion: totals scaled to 100 g.
    /// Returns `None` for a non-positive weight.
    #[must_use]
    pub fn from_portion(name: &str, weight: f64, totals: &NutritionSummary) -> Option<Self> {
        if weight <= 0.0 || !weight.is_finite() {
            return None;
        }
        let per_100g = |total: f64| total / weight * 100.0;
        Some(Self {
            name: name.to_string(),
            calories_per_100g: per_100g(totals.calories).round(),
            carbs_per_100g: round1(per_100g(totals.carbs)),
            protein_per_100g: round1(per_100g(totals.protein)),
            fat_per_100g: round1(per_100g(totals.fat)),
        })
    }

    /// Nutrition for a `weight`-gram serving: calories to the nearest kcal,
    /// macros to one decimal.
    #[must_use]
    pub fn portion(&self, weight: f64) -> NutritionSummary {
        let scale = |per_100g: f64| per_100g * weight / 100.0;
        NutritionSummary {
            calories: scale(self.calories_per_100g).round(),
            carbs: round1(scale(self.carbs_per_100g)),
            protein: round1(scale(self.protein_per_100g)),
            fat: round1(scale(self.fat_per_100g)),
        }
    }
}

impl Store {
    /// The food database, seeding the defaults on first access.
    #[must_use]
    pub fn food_database(&self) -> Vec<FoodDatabaseItem> {
        let items: Vec<FoodDatabaseItem> = self.get_collection(Collection::FoodDatabase);
        if !items.is_empty() {
            return items;
        }
        let seed = default_foods();
        if self.set_collection(Collection::FoodDatabase, &seed) {
            info!(items = seed.len(), "Seeded food database");
        }
        seed
    }

    #[must_use]
    pub fn search_food_database(&self, keyword: &str) -> Vec<FoodDatabaseItem> {
        let keyword = keyword.to_lowercase();
        self.food_database()
            .into_iter()
            .filter(|item| item.name.to_lowercase().contains(&keyword))
            .collect()
    }

    #[must_use]
    pub fn find_food(&self, name: &str) -> Option<FoodDatabaseItem> {
        self.food_database().into_iter().find(|item| item.name == name)
    }

    /// Record a new food from a logged portion. Skipped, returning `false`,
    /// when the name is already known or the weight is not positive.
    pub fn add_to_food_database(&self, name: &str, weight: f64, totals: &NutritionSummary) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        let Some(item) = FoodDatabaseItem::from_portion(name, weight, totals) else {
            return false;
        };

        let mut items = self.food_database();
        if items.iter().any(|existing| existing.name == name) {
            return false;
        }
        items.push(item);
        let saved = self.set_collection(Collection::FoodDatabase, &items);
        if saved {
            debug!(name, "Added food to database");
        }
        saved
    }

    pub(crate) fn learn_food(&self, entry: &FoodEntry) -> bool {
        let totals = NutritionSummary {
            calories: entry.calories,
            carbs: entry.carbs,
            protein: entry.protein,
            fat: entry.fat,
        };
        self.add_to_food_database(&entry.name, entry.weight, &totals)
    }
}
