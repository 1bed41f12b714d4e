use anyhow::{Context, Result, bail};
use clap::Args;
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use fittrack_core::Store;
use fittrack_core::models::{FoodDatabaseItem, FoodEntry, FoodUpdate, MealType, NewFoodEntry};

use super::helpers::{
    no_neg_zero, not_found, parse_date, parse_optional_date, parse_weight, print_json, truncate,
};

/// Nutrition totals for a logged portion.
#[derive(Args, Debug, Default)]
pub(crate) struct NutritionArgs {
    /// Calories (kcal) for the portion
    #[arg(long)]
    pub calories: Option<f64>,
    /// Carbs (g) for the portion
    #[arg(long)]
    pub carbs: Option<f64>,
    /// Protein (g) for the portion
    #[arg(long)]
    pub protein: Option<f64>,
    /// Fat (g) for the portion
    #[arg(long)]
    pub fat: Option<f64>,
}

impl NutritionArgs {
    fn is_empty(&self) -> bool {
        self.calories.is_none()
            && self.carbs.is_none()
            && self.protein.is_none()
            && self.fat.is_none()
    }
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn cmd_food_add(
    store: &Store,
    name: &str,
    weight: &str,
    meal: &str,
    date: Option<String>,
    nutrition: &NutritionArgs,
    note: Option<String>,
    json: bool,
) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        bail!("Food name must not be empty");
    }
    let weight = parse_weight(weight)?;
    let meal_type: MealType = meal.parse()?;
    let date = parse_date(date)?;

    // Known foods fill in whatever was not given explicitly
    let known = store.find_food(name).map(|item| item.portion(weight));
    if nutrition.calories.is_none() && known.is_none() {
        bail!(
            "'{name}' is not in the food database. Pass --calories (and optionally --carbs, --protein, --fat)"
        );
    }
    let known = known.unwrap_or_default();

    let entry = store
        .add_food(NewFoodEntry {
            date,
            meal_type,
            name: name.to_string(),
            weight,
            calories: nutrition.calories.unwrap_or(known.calories),
            carbs: nutrition.carbs.unwrap_or(known.carbs),
            protein: nutrition.protein.unwrap_or(known.protein),
            fat: nutrition.fat.unwrap_or(known.fat),
            note: note.unwrap_or_default(),
        })
        .context("Failed to save food entry (storage may be full)")?;

    if json {
        print_json(&entry)?;
    } else {
        println!(
            "Logged {} {:.0}g for {} on {}: {:.0} kcal | C:{:.1}g P:{:.1}g F:{:.1}g",
            entry.name,
            entry.weight,
            entry.meal_type.label(),
            entry.date,
            entry.calories,
            entry.carbs,
            entry.protein,
            entry.fat
        );
        println!("  ID: {}", entry.id);
    }

    Ok(())
}

pub(crate) fn cmd_food_list(
    store: &Store,
    date: Option<String>,
    meal: Option<&str>,
    json: bool,
) -> Result<()> {
    let date = parse_date(date)?;
    let meal = meal.map(str::parse::<MealType>).transpose()?;
    let foods = store.foods_by_date_and_meal(date, meal);

    if json {
        return print_json(&foods);
    }

    if foods.is_empty() {
        eprintln!("No food entries for {}", date.format("%Y-%m-%d"));
        process::exit(2);
    }

    print_food_entries(&foods);
    let total = store.daily_summary(date);
    if meal.is_none() {
        println!(
            "  TOTAL: {:.0} kcal | C:{:.0}g P:{:.0}g F:{:.0}g",
            no_neg_zero(total.calories),
            no_neg_zero(total.carbs),
            no_neg_zero(total.protein),
            no_neg_zero(total.fat)
        );
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn cmd_food_update(
    store: &Store,
    id: &str,
    name: Option<String>,
    weight: Option<&str>,
    meal: Option<&str>,
    date: Option<String>,
    nutrition: &NutritionArgs,
    note: Option<String>,
    json: bool,
) -> Result<()> {
    if name.is_none()
        && weight.is_none()
        && meal.is_none()
        && date.is_none()
        && nutrition.is_empty()
        && note.is_none()
    {
        bail!(
            "Nothing to update. Provide at least one of --name, --weight, --meal, --date, --calories, --carbs, --protein, --fat or --note"
        );
    }

    let update = FoodUpdate {
        date: parse_optional_date(date)?,
        meal_type: meal.map(str::parse::<MealType>).transpose()?,
        name,
        weight: weight.map(parse_weight).transpose()?,
        calories: nutrition.calories,
        carbs: nutrition.carbs,
        protein: nutrition.protein,
        fat: nutrition.fat,
        note,
    };

    let Some(entry) = store.update_food(id, update) else {
        not_found(&format!("Food entry {id} not found"), json);
    };

    if json {
        print_json(&entry)?;
    } else {
        println!(
            "Updated {}: {} {:.0}g for {} on {}, {:.0} kcal",
            entry.id,
            entry.name,
            entry.weight,
            entry.meal_type.label(),
            entry.date,
            entry.calories
        );
    }
    Ok(())
}

pub(crate) fn cmd_food_delete(store: &Store, id: &str, json: bool) -> Result<()> {
    let removed = store.try_delete::<FoodEntry>(id).context("Failed to delete food entry")?;
    if !removed {
        not_found(&format!("Food entry {id} not found"), json);
    }
    if json {
        println!("{}", serde_json::json!({ "deleted": id }));
    } else {
        println!("Deleted food entry {id}");
    }
    Ok(())
}

/// Search the per-100g food database. With a weight, also show the
/// nutrition of that serving.
pub(crate) fn cmd_food_search(
    store: &Store,
    keyword: &str,
    weight: Option<&str>,
    json: bool,
) -> Result<()> {
    let items = store.search_food_database(keyword);
    let weight = weight.map(parse_weight).transpose()?;

    if json {
        if let Some(w) = weight {
            let servings: Vec<_> = items
                .iter()
                .map(|item| {
                    serde_json::json!({ "item": item, "weight": w, "portion": item.portion(w) })
                })
                .collect();
            return print_json(&servings);
        }
        return print_json(&items);
    }

    if items.is_empty() {
        eprintln!("No foods matching '{keyword}'");
        process::exit(2);
    }

    print_database_items(&items, weight);
    Ok(())
}

fn print_food_entries(foods: &[FoodEntry]) {
    #[derive(Tabled)]
    struct FoodRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Meal")]
        meal: String,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Weight")]
        weight: String,
        #[tabled(rename = "Calories")]
        calories: String,
        #[tabled(rename = "Carbs")]
        carbs: String,
        #[tabled(rename = "Protein")]
        protein: String,
        #[tabled(rename = "Fat")]
        fat: String,
    }

    let rows: Vec<FoodRow> = foods
        .iter()
        .map(|f| FoodRow {
            id: f.id.clone(),
            meal: f.meal_type.label().to_string(),
            name: truncate(&f.name, 30),
            weight: format!("{:.0}g", f.weight),
            calories: format!("{:.0}", no_neg_zero(f.calories)),
            carbs: format!("{:.1}g", no_neg_zero(f.carbs)),
            protein: format!("{:.1}g", no_neg_zero(f.protein)),
            fat: format!("{:.1}g", no_neg_zero(f.fat)),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(3..)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

fn print_database_items(items: &[FoodDatabaseItem], weight: Option<f64>) {
    #[derive(Tabled)]
    struct ItemRow {
        #[tabled(rename = "#")]
        idx: usize,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Cal/100g")]
        calories: String,
        #[tabled(rename = "C/100g")]
        carbs: String,
        #[tabled(rename = "P/100g")]
        protein: String,
        #[tabled(rename = "F/100g")]
        fat: String,
        #[tabled(rename = "Serving kcal")]
        serving: String,
    }

    let rows: Vec<ItemRow> = items
        .iter()
        .enumerate()
        .map(|(i, item)| ItemRow {
            idx: i + 1,
            name: truncate(&item.name, 30),
            calories: format!("{:.0}", item.calories_per_100g),
            carbs: format!("{:.1}", item.carbs_per_100g),
            protein: format!("{:.1}", item.protein_per_100g),
            fat: format!("{:.1}", item.fat_per_100g),
            serving: weight.map_or("-".into(), |w| format!("{:.0}", item.portion(w).calories)),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}
