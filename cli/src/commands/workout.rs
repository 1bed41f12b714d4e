use anyhow::{Context, Result, bail};
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use fittrack_core::Store;
use fittrack_core::models::{NewWorkoutEntry, WorkoutEntry, WorkoutSource, WorkoutType};

use super::helpers::{
    format_minutes, no_neg_zero, not_found, parse_date, parse_start_time, print_json, truncate,
};

#[allow(clippy::too_many_arguments)]
pub(crate) fn cmd_workout_add(
    store: &Store,
    workout_type: &str,
    duration: u32,
    calories: f64,
    distance: Option<f64>,
    heart_rate: Option<u32>,
    start: Option<&str>,
    date: Option<String>,
    note: Option<String>,
    json: bool,
) -> Result<()> {
    if duration == 0 {
        bail!("Duration must be greater than 0 minutes");
    }
    if calories < 0.0 {
        bail!("Calories must not be negative");
    }
    let workout_type: WorkoutType = workout_type.parse()?;

    // A start time pins the date
    let start = start.map(parse_start_time).transpose()?;
    let date = match start {
        Some(t) if date.is_none() => t.date(),
        _ => parse_date(date)?,
    };

    let entry = store
        .add_workout(NewWorkoutEntry {
            date,
            workout_type,
            start_time: start
                .map(|t| t.format("%Y-%m-%dT%H:%M").to_string())
                .unwrap_or_default(),
            duration,
            calories,
            distance: distance.unwrap_or(0.0),
            avg_heart_rate: heart_rate.unwrap_or(0),
            note: note.unwrap_or_default(),
            source: WorkoutSource::Manual,
        })
        .context("Failed to save workout (storage may be full)")?;

    if json {
        print_json(&entry)?;
    } else {
        println!(
            "Logged {} for {} on {}: {:.0} kcal burned",
            entry.workout_type.label(),
            format_minutes(entry.duration),
            entry.date,
            entry.calories
        );
        println!("  ID: {}", entry.id);
    }
    Ok(())
}

pub(crate) fn cmd_workout_list(store: &Store, date: Option<String>, json: bool) -> Result<()> {
    let date = parse_date(date)?;
    let workouts = store.workouts_by_date(date);

    if json {
        return print_json(&workouts);
    }

    if workouts.is_empty() {
        eprintln!("No workouts for {}", date.format("%Y-%m-%d"));
        process::exit(2);
    }

    #[derive(Tabled)]
    struct WorkoutRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Type")]
        kind: String,
        #[tabled(rename = "Start")]
        start: String,
        #[tabled(rename = "Duration")]
        duration: String,
        #[tabled(rename = "Calories")]
        calories: String,
        #[tabled(rename = "Distance")]
        distance: String,
        #[tabled(rename = "Avg HR")]
        heart_rate: String,
        #[tabled(rename = "Note")]
        note: String,
    }

    let rows: Vec<WorkoutRow> = workouts
        .iter()
        .map(|w| WorkoutRow {
            id: w.id.clone(),
            kind: w.workout_type.label().to_string(),
            start: w
                .start_time
                .split_once('T')
                .map_or_else(|| "-".to_string(), |(_, time)| time.to_string()),
            duration: format_minutes(w.duration),
            calories: format!("{:.0}", no_neg_zero(w.calories)),
            distance: if w.distance > 0.0 {
                format!("{:.2} km", w.distance)
            } else {
                "-".to_string()
            },
            heart_rate: if w.avg_heart_rate > 0 {
                w.avg_heart_rate.to_string()
            } else {
                "-".to_string()
            },
            note: truncate(&w.note, 30),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(3..7)).with(Alignment::right()))
        .to_string();
    println!("{table}");

    let total = store.daily_workout_summary(date);
    println!(
        "  TOTAL: {} | {:.0} kcal | {:.2} km",
        format_minutes(total.duration),
        no_neg_zero(total.calories),
        no_neg_zero(total.distance)
    );
    Ok(())
}

pub(crate) fn cmd_workout_delete(store: &Store, id: &str, json: bool) -> Result<()> {
    let removed = store.try_delete::<WorkoutEntry>(id).context("Failed to delete workout")?;
    if !removed {
        not_found(&format!("Workout {id} not found"), json);
    }
    if json {
        println!("{}", serde_json::json!({ "deleted": id }));
    } else {
        println!("Deleted workout {id}");
    }
    Ok(())
}
