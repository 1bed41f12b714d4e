mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::{
    NutritionArgs, Period, SettingsArgs, cmd_bmi, cmd_clear, cmd_export, cmd_food_add,
    cmd_food_delete, cmd_food_list, cmd_food_search, cmd_food_update, cmd_import, cmd_meals,
    cmd_note_add, cmd_note_delete, cmd_note_list, cmd_note_search, cmd_settings_set,
    cmd_settings_show, cmd_stats, cmd_study_add, cmd_study_delete, cmd_study_list, cmd_summary,
    cmd_weight_change, cmd_weight_delete, cmd_weight_history, cmd_weight_log, cmd_weight_show,
    cmd_workout_add, cmd_workout_delete, cmd_workout_list,
};
use crate::config::Config;
use fittrack_core::{Store, StoreOptions};

#[derive(Parser)]
#[command(
    name = "fittrack",
    version,
    about = "Track food, workouts, study sessions, notes and weight",
    long_about = "Track food, workouts, study sessions, notes and weight.\n\n\
        Data lives in a local SQLite file. Set FITTRACK_DATA_DIR to move it and\n\
        RUST_LOG=debug to see what the store is doing."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log and manage food entries
    Food {
        #[command(subcommand)]
        command: FoodCommands,
    },
    /// Log and manage workouts
    Workout {
        #[command(subcommand)]
        command: WorkoutCommands,
    },
    /// Write and search notes
    Note {
        #[command(subcommand)]
        command: NoteCommands,
    },
    /// Log and manage study sessions
    Study {
        #[command(subcommand)]
        command: StudyCommands,
    },
    /// Track body weight
    Weight {
        #[command(subcommand)]
        command: WeightCommands,
    },
    /// Show the daily dashboard (defaults to today)
    Summary {
        /// Date (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show calories in/out per day for the last week or month
    Stats {
        /// Period to show
        #[arg(value_enum, default_value = "week")]
        period: Period,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show calories per meal for a day
    Meals {
        /// Date (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Compute BMI from settings and the latest weight, or from explicit values
    Bmi {
        /// Weight in kg
        #[arg(long)]
        weight: Option<f64>,
        /// Height in cm
        #[arg(long)]
        height: Option<f64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show or change profile and daily goals
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
    /// Export all data as JSON
    Export {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Import a JSON export, replacing the collections it contains
    Import {
        /// Path to the export file
        file: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete all stored data
    Clear {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum FoodCommands {
    /// Log a food. Nutrition is filled from the food database unless given.
    Add {
        /// Food name
        name: String,
        /// Portion weight (e.g. "150" or "150g")
        weight: String,
        /// Meal type: breakfast, lunch, dinner, snack
        #[arg(short, long, default_value = "snack")]
        meal: String,
        /// Date (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        #[arg(long)]
        date: Option<String>,
        #[command(flatten)]
        nutrition: NutritionArgs,
        /// Optional note
        #[arg(long)]
        note: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List food entries for a day
    List {
        /// Date (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        date: Option<String>,
        /// Only this meal type
        #[arg(short, long)]
        meal: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Update a food entry
    Update {
        /// Entry ID
        id: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New portion weight
        #[arg(long)]
        weight: Option<String>,
        /// New meal type
        #[arg(long)]
        meal: Option<String>,
        /// New date
        #[arg(long)]
        date: Option<String>,
        #[command(flatten)]
        nutrition: NutritionArgs,
        /// New note
        #[arg(long)]
        note: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a food entry
    Delete {
        /// Entry ID
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Search the food database
    Search {
        /// Keyword (case-insensitive)
        keyword: String,
        /// Also show nutrition for a serving of this weight
        #[arg(short, long)]
        weight: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum WorkoutCommands {
    /// Log a workout
    Add {
        /// running, cycling, swimming, strength, walking, hiit, yoga, other
        #[arg(value_name = "TYPE")]
        workout_type: String,
        /// Duration in minutes
        duration: u32,
        /// Calories burned
        #[arg(short, long, default_value = "0")]
        calories: f64,
        /// Distance in km
        #[arg(long)]
        distance: Option<f64>,
        /// Average heart rate (bpm)
        #[arg(long)]
        heart_rate: Option<u32>,
        /// Start time (YYYY-MM-DDTHH:MM); sets the date when --date is absent
        #[arg(long)]
        start: Option<String>,
        /// Date (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Optional note
        #[arg(long)]
        note: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List workouts for a day
    List {
        /// Date (default: today)
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a workout
    Delete {
        /// Workout ID
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum NoteCommands {
    /// Write a note
    Add {
        /// Note text
        content: String,
        /// Optional title
        #[arg(short, long)]
        title: Option<String>,
        /// Date (default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List notes (all, or one date)
    List {
        /// Date filter
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Search note titles and content
    Search {
        /// Keyword (case-insensitive)
        keyword: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a note
    Delete {
        /// Note ID
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum StudyCommands {
    /// Log a study session
    Add {
        /// What was studied
        topic: String,
        /// Duration in minutes
        duration: u32,
        /// reading, coding, course, practice, other
        #[arg(short, long, default_value = "other")]
        category: String,
        /// Details
        #[arg(long)]
        content: Option<String>,
        /// Completed task (repeatable)
        #[arg(long = "task")]
        tasks: Vec<String>,
        /// Reflection
        #[arg(long)]
        reflection: Option<String>,
        /// Resources used
        #[arg(long)]
        resources: Option<String>,
        /// Date (default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List study sessions for a day
    List {
        /// Date (default: today)
        date: Option<String>,
        /// Only this category
        #[arg(short, long)]
        category: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a study session
    Delete {
        /// Session ID
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum WeightCommands {
    /// Log morning and/or evening weight for a day
    Log {
        /// Morning weight
        #[arg(long)]
        morning: Option<f64>,
        /// Evening weight
        #[arg(long)]
        evening: Option<f64>,
        /// Unit: kg or lbs (default: kg)
        #[arg(short, long, default_value = "kg")]
        unit: String,
        /// Date (default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show weight for a date (default: today)
    Show {
        /// Date (default: today)
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show weight history, newest first
    History {
        /// Number of records to show (default: all)
        #[arg(short, long)]
        limit: Option<usize>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the change from the record N days before the latest one
    Change {
        /// Days back from the latest record
        #[arg(short, long, default_value = "7")]
        days: u32,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete the weight record for a date
    Delete {
        /// Date (default: today)
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum SettingsCommands {
    /// Show current settings
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change one or more settings
    Set {
        #[command(flatten)]
        fields: SettingsArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

#[allow(clippy::too_many_lines)]
fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let store = Store::open_with(
        &config.db_path,
        StoreOptions {
            quota_bytes: config.quota_bytes,
        },
    )?;
    tracing::debug!(path = %config.db_path.display(), "Using database");

    match cli.command {
        Commands::Food { command } => match command {
            FoodCommands::Add {
                name,
                weight,
                meal,
                date,
                nutrition,
                note,
                json,
            } => cmd_food_add(&store, &name, &weight, &meal, date, &nutrition, note, json),
            FoodCommands::List { date, meal, json } => {
                cmd_food_list(&store, date, meal.as_deref(), json)
            }
            FoodCommands::Update {
                id,
                name,
                weight,
                meal,
                date,
                nutrition,
                note,
                json,
            } => cmd_food_update(
                &store,
                &id,
                name,
                weight.as_deref(),
                meal.as_deref(),
                date,
                &nutrition,
                note,
                json,
            ),
            FoodCommands::Delete { id, json } => cmd_food_delete(&store, &id, json),
            FoodCommands::Search {
                keyword,
                weight,
                json,
            } => cmd_food_search(&store, &keyword, weight.as_deref(), json),
        },
        Commands::Workout { command } => match command {
            WorkoutCommands::Add {
                workout_type,
                duration,
                calories,
                distance,
                heart_rate,
                start,
                date,
                note,
                json,
            } => cmd_workout_add(
                &store,
                &workout_type,
                duration,
                calories,
                distance,
                heart_rate,
                start.as_deref(),
                date,
                note,
                json,
            ),
            WorkoutCommands::List { date, json } => cmd_workout_list(&store, date, json),
            WorkoutCommands::Delete { id, json } => cmd_workout_delete(&store, &id, json),
        },
        Commands::Note { command } => match command {
            NoteCommands::Add {
                content,
                title,
                date,
                json,
            } => cmd_note_add(&store, &content, title, date, json),
            NoteCommands::List { date, json } => cmd_note_list(&store, date, json),
            NoteCommands::Search { keyword, json } => cmd_note_search(&store, &keyword, json),
            NoteCommands::Delete { id, json } => cmd_note_delete(&store, &id, json),
        },
        Commands::Study { command } => match command {
            StudyCommands::Add {
                topic,
                duration,
                category,
                content,
                tasks,
                reflection,
                resources,
                date,
                json,
            } => cmd_study_add(
                &store, &topic, duration, &category, content, tasks, reflection, resources, date,
                json,
            ),
            StudyCommands::List {
                date,
                category,
                json,
            } => cmd_study_list(&store, date, category.as_deref(), json),
            StudyCommands::Delete { id, json } => cmd_study_delete(&store, &id, json),
        },
        Commands::Weight { command } => match command {
            WeightCommands::Log {
                morning,
                evening,
                unit,
                date,
                json,
            } => cmd_weight_log(&store, morning, evening, &unit, date, json),
            WeightCommands::Show { date, json } => cmd_weight_show(&store, date, json),
            WeightCommands::History { limit, json } => cmd_weight_history(&store, limit, json),
            WeightCommands::Change { days, json } => cmd_weight_change(&store, days, json),
            WeightCommands::Delete { date, json } => cmd_weight_delete(&store, date, json),
        },
        Commands::Summary { date, json } => cmd_summary(&store, date, json),
        Commands::Stats { period, json } => cmd_stats(&store, period, json),
        Commands::Meals { date, json } => cmd_meals(&store, date, json),
        Commands::Bmi {
            weight,
            height,
            json,
        } => cmd_bmi(&store, weight, height, json),
        Commands::Settings { command } => match command {
            SettingsCommands::Show { json } => cmd_settings_show(&store, json),
            SettingsCommands::Set { fields, json } => cmd_settings_set(&store, fields, json),
        },
        Commands::Export { output, json } => cmd_export(&store, output.as_deref(), json),
        Commands::Import { file, json } => cmd_import(&store, &file, json),
        Commands::Clear { yes, json } => cmd_clear(&store, yes, json),
    }
}
