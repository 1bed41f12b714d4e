use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use fittrack_core::models::{DailyReport, Dashboard, DayStats, MealType};
use fittrack_core::{Store, bmi};

use super::helpers::{format_minutes, no_neg_zero, not_found, parse_date, print_json, truncate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum Period {
    Week,
    Month,
}

pub(crate) fn cmd_summary(store: &Store, date: Option<String>, json: bool) -> Result<()> {
    #[derive(Serialize)]
    struct SummaryOutput {
        #[serde(flatten)]
        dashboard: Dashboard,
        report: DailyReport,
    }

    let date = parse_date(date)?;
    let dashboard = store.dashboard_at(date);
    let report = store.daily_report(date);

    if json {
        return print_json(&SummaryOutput { dashboard, report });
    }

    let n = &dashboard.nutrition;
    let w = &dashboard.workout;
    let s = &report.study;
    if n.calories == 0.0 && w.duration == 0 && s.items == 0 {
        eprintln!("No entries for {}", dashboard.date);
        process::exit(2);
    }

    println!("=== {} ===\n", dashboard.date);
    println!(
        "  IN:      {:.0} kcal | C:{:.0}g P:{:.0}g F:{:.0}g",
        no_neg_zero(n.calories),
        no_neg_zero(n.carbs),
        no_neg_zero(n.protein),
        no_neg_zero(n.fat)
    );
    println!(
        "  OUT:     {:.0} kcal ({}, {:.2} km)",
        no_neg_zero(w.calories),
        format_minutes(w.duration),
        no_neg_zero(w.distance)
    );
    println!("  BALANCE: {:+.0} kcal", no_neg_zero(dashboard.calorie_balance));
    println!(
        "  GOAL:    {}% of {} kcal",
        dashboard.goal_progress, dashboard.calorie_goal
    );
    println!(
        "  STUDY:   {} across {} sessions, {} tasks",
        format_minutes(s.duration),
        s.items,
        s.completed_tasks
    );
    for study in &report.studies {
        println!(
            "    - [{}] {} ({})",
            study.category.label(),
            truncate(&study.topic, 40),
            format_minutes(study.duration)
        );
    }
    println!("  STREAK:  {} days", dashboard.streak_days);

    Ok(())
}

pub(crate) fn cmd_stats(store: &Store, period: Period, json: bool) -> Result<()> {
    let days = match period {
        Period::Week => store.weekly_stats(),
        Period::Month => store.monthly_stats(),
    };

    if json {
        return print_json(&days);
    }

    if days.iter().all(|d| d.calories_in == 0.0 && d.calories_out == 0.0) {
        let span = match period {
            Period::Week => "7",
            Period::Month => "30",
        };
        eprintln!("No entries in the last {span} days");
        process::exit(2);
    }

    print_day_stats(&days);
    Ok(())
}

fn print_day_stats(days: &[DayStats]) {
    #[derive(Tabled)]
    struct DayRow {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Day")]
        label: String,
        #[tabled(rename = "In")]
        calories_in: String,
        #[tabled(rename = "Out")]
        calories_out: String,
        #[tabled(rename = "Net")]
        net: String,
        #[tabled(rename = "Carbs")]
        carbs: String,
        #[tabled(rename = "Protein")]
        protein: String,
        #[tabled(rename = "Fat")]
        fat: String,
    }

    let rows: Vec<DayRow> = days
        .iter()
        .map(|d| DayRow {
            date: d.date.clone(),
            label: d.label.clone(),
            calories_in: format!("{:.0}", no_neg_zero(d.calories_in)),
            calories_out: format!("{:.0}", no_neg_zero(d.calories_out)),
            net: format!("{:.0}", no_neg_zero(d.calories_in - d.calories_out)),
            carbs: format!("{:.0}g", no_neg_zero(d.carbs)),
            protein: format!("{:.0}g", no_neg_zero(d.protein)),
            fat: format!("{:.0}g", no_neg_zero(d.fat)),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..)).with(Alignment::right()))
        .to_string();
    println!("{table}");

    #[allow(clippy::cast_precision_loss)]
    let count = days.len() as f64;
    let avg_in = days.iter().map(|d| d.calories_in).sum::<f64>() / count;
    let avg_out = days.iter().map(|d| d.calories_out).sum::<f64>() / count;
    println!(
        "  AVERAGE: {:.0} kcal in | {:.0} kcal out",
        no_neg_zero(avg_in),
        no_neg_zero(avg_out)
    );
}

pub(crate) fn cmd_meals(store: &Store, date: Option<String>, json: bool) -> Result<()> {
    let date = parse_date(date)?;
    let dist = store.meal_distribution(date);

    if json {
        return print_json(&dist);
    }

    let total: f64 = MealType::ALL.iter().map(|m| dist.get(*m)).sum();
    if total == 0.0 {
        eprintln!("No food entries for {}", date.format("%Y-%m-%d"));
        process::exit(2);
    }

    #[derive(Tabled)]
    struct MealRow {
        #[tabled(rename = "Meal")]
        meal: String,
        #[tabled(rename = "Calories")]
        calories: String,
        #[tabled(rename = "Share")]
        share: String,
    }

    let rows: Vec<MealRow> = MealType::ALL
        .iter()
        .map(|m| {
            let cal = dist.get(*m);
            MealRow {
                meal: m.label().to_string(),
                calories: format!("{:.0}", no_neg_zero(cal)),
                share: format!("{:.0}%", no_neg_zero(cal / total * 100.0)),
            }
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{table}");
    Ok(())
}

/// BMI from explicit figures, or from stored settings and weights.
pub(crate) fn cmd_bmi(
    store: &Store,
    weight: Option<f64>,
    height: Option<f64>,
    json: bool,
) -> Result<()> {
    let result = match (weight, height) {
        (Some(w), Some(h)) => bmi(w, h),
        (None, None) => store.current_bmi(),
        (w, h) => {
            let settings = store.settings();
            let h = h.or(settings.height);
            let w = w
                .or_else(|| store.latest_weight().and_then(|e| e.value()))
                .or(settings.current_weight);
            w.zip(h).and_then(|(w, h)| bmi(w, h))
        }
    };

    let Some(result) = result else {
        not_found(
            "BMI unavailable. Set a height with `fittrack settings set --height` and log a weight",
            json,
        );
    };

    if json {
        return print_json(&result);
    }
    println!("BMI: {:.1} ({})", result.value, result.category.label());
    Ok(())
}
