use anyhow::{Context, Result, bail};
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use fittrack_core::Store;
use fittrack_core::models::{NewStudyEntry, StudyCategory, StudyEntry};

use super::helpers::{format_minutes, not_found, parse_date, print_json, truncate};

#[allow(clippy::too_many_arguments)]
pub(crate) fn cmd_study_add(
    store: &Store,
    topic: &str,
    duration: u32,
    category: &str,
    content: Option<String>,
    tasks: Vec<String>,
    reflection: Option<String>,
    resources: Option<String>,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    if topic.trim().is_empty() {
        bail!("Topic must not be empty");
    }
    if duration == 0 {
        bail!("Duration must be greater than 0 minutes");
    }
    let category: StudyCategory = category.parse()?;
    let date = parse_date(date)?;

    let entry = store
        .add_study(NewStudyEntry {
            date,
            category,
            duration,
            topic: topic.trim().to_string(),
            content: content.unwrap_or_default(),
            reflection: reflection.filter(|r| !r.trim().is_empty()),
            resources: resources.filter(|r| !r.trim().is_empty()),
            tasks: tasks
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
        })
        .context("Failed to save study session (storage may be full)")?;

    if json {
        print_json(&entry)?;
    } else {
        println!(
            "Logged {} {} on {}: {} ({} tasks)",
            entry.category.label(),
            format_minutes(entry.duration),
            entry.date,
            entry.topic,
            entry.tasks.len()
        );
        println!("  ID: {}", entry.id);
    }
    Ok(())
}

pub(crate) fn cmd_study_list(
    store: &Store,
    date: Option<String>,
    category: Option<&str>,
    json: bool,
) -> Result<()> {
    let date = parse_date(date)?;
    let category = category.map(str::parse::<StudyCategory>).transpose()?;
    let studies = store.studies_by_date_and_category(date, category);

    if json {
        return print_json(&studies);
    }

    if studies.is_empty() {
        eprintln!("No study sessions for {}", date.format("%Y-%m-%d"));
        process::exit(2);
    }

    #[derive(Tabled)]
    struct StudyRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Category")]
        category: String,
        #[tabled(rename = "Topic")]
        topic: String,
        #[tabled(rename = "Duration")]
        duration: String,
        #[tabled(rename = "Tasks")]
        tasks: usize,
    }

    let rows: Vec<StudyRow> = studies
        .iter()
        .map(|s| StudyRow {
            id: s.id.clone(),
            category: s.category.label().to_string(),
            topic: truncate(&s.topic, 30),
            duration: format_minutes(s.duration),
            tasks: s.tasks.len(),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(3..)).with(Alignment::right()))
        .to_string();
    println!("{table}");

    if category.is_none() {
        let total = store.daily_study_summary(date);
        println!(
            "  TOTAL: {} across {} sessions, {} tasks",
            format_minutes(total.duration),
            total.items,
            total.completed_tasks
        );
    }
    Ok(())
}

pub(crate) fn cmd_study_delete(store: &Store, id: &str, json: bool) -> Result<()> {
    let removed = store.try_delete::<StudyEntry>(id).context("Failed to delete study entry")?;
    if !removed {
        not_found(&format!("Study session {id} not found"), json);
    }
    if json {
        println!("{}", serde_json::json!({ "deleted": id }));
    } else {
        println!("Deleted study session {id}");
    }
    Ok(())
}
