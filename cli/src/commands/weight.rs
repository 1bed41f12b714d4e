use anyhow::{Context, Result, bail};
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use fittrack_core::Store;
use fittrack_core::models::{WeightEntry, WeightInput};

use super::helpers::{not_found, parse_date, print_json};

const LBS_PER_KG: f64 = 2.20462;
const KG_PER_LB: f64 = 0.453_592;

fn to_kg(value: f64, unit: &str) -> Result<f64> {
    if value <= 0.0 {
        bail!("Weight must be greater than 0");
    }
    match unit.to_lowercase().as_str() {
        "kg" => Ok(value),
        "lbs" | "lb" => Ok(value * KG_PER_LB),
        _ => bail!("Invalid unit '{unit}'. Use 'kg' or 'lbs'"),
    }
}

fn format_reading(kg: Option<f64>) -> String {
    kg.map_or_else(|| "-".to_string(), |kg| format!("{kg:.1}"))
}

pub(crate) fn cmd_weight_log(
    store: &Store,
    morning: Option<f64>,
    evening: Option<f64>,
    unit: &str,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    if morning.is_none() && evening.is_none() {
        bail!("Provide --morning and/or --evening");
    }
    let morning_weight = morning.map(|v| to_kg(v, unit)).transpose()?;
    let evening_weight = evening.map(|v| to_kg(v, unit)).transpose()?;
    let date = parse_date(date)?;

    let entry = store
        .save_weight(&WeightInput {
            date,
            morning_weight,
            evening_weight,
        })
        .context("Failed to save weight (storage may be full)")?;

    if json {
        print_json(&entry)?;
    } else {
        println!(
            "Logged weight for {}: morning {} kg, evening {} kg",
            entry.date,
            format_reading(entry.morning_weight),
            format_reading(entry.evening_weight)
        );
    }
    Ok(())
}

pub(crate) fn cmd_weight_show(store: &Store, date: Option<String>, json: bool) -> Result<()> {
    let date = parse_date(date)?;
    let Some(entry) = store.get_weight(date) else {
        not_found(
            &format!("No weight entry for {}", date.format("%Y-%m-%d")),
            json,
        );
    };

    if json {
        return print_json(&entry);
    }

    println!("{}:", entry.date);
    for (label, reading) in [("Morning", entry.morning_weight), ("Evening", entry.evening_weight)] {
        if let Some(kg) = reading {
            println!("  {label}: {kg:.1} kg ({:.1} lbs)", kg * LBS_PER_KG);
        }
    }
    Ok(())
}

/// Show recorded weights, newest first, optionally only the latest `limit`.
pub(crate) fn cmd_weight_history(store: &Store, limit: Option<usize>, json: bool) -> Result<()> {
    let mut entries: Vec<WeightEntry> = store.weights();
    entries.reverse();
    if let Some(limit) = limit {
        entries.truncate(limit);
    }

    if json {
        return print_json(&entries);
    }

    if entries.is_empty() {
        eprintln!("No weight entries found. Use `fittrack weight log` to record your weight.");
        process::exit(2);
    }

    #[derive(Tabled)]
    struct WeightRow {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Morning (kg)")]
        morning: String,
        #[tabled(rename = "Evening (kg)")]
        evening: String,
        #[tabled(rename = "Diff")]
        diff: String,
    }

    let rows: Vec<WeightRow> = entries
        .iter()
        .map(|e| WeightRow {
            date: e.date.clone(),
            morning: format_reading(e.morning_weight),
            evening: format_reading(e.evening_weight),
            diff: match (e.morning_weight, e.evening_weight) {
                (Some(m), Some(ev)) => format!("{:+.1}", ev - m),
                _ => "-".to_string(),
            },
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{table}");
    Ok(())
}

pub(crate) fn cmd_weight_change(store: &Store, days: u32, json: bool) -> Result<()> {
    let change = store.weight_change(days);
    let latest = store.latest_weight();

    if json {
        println!(
            "{}",
            serde_json::json!({ "days": days, "latest": latest, "change": change })
        );
        return Ok(());
    }

    let Some(change) = change else {
        eprintln!("Not enough data: need records on the latest date and {days} days before it");
        process::exit(2);
    };
    let since = latest.map(|l| l.date).unwrap_or_default();
    println!("Change over {days} days (to {since}): {change:+.1} kg");
    Ok(())
}

pub(crate) fn cmd_weight_delete(store: &Store, date: Option<String>, json: bool) -> Result<()> {
    let date = parse_date(date)?;
    let date_str = date.format("%Y-%m-%d").to_string();
    let removed = store.try_delete_weight(date).context("Failed to delete weight entry")?;
    if !removed {
        not_found(&format!("No weight entry for {date_str}"), json);
    }

    if json {
        println!("{}", serde_json::json!({ "deleted": date_str }));
    } else {
        println!("Deleted weight entry for {date_str}");
    }
    Ok(())
}
