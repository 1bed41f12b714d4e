use anyhow::{Context, Result, bail};
use std::process;
use tabled::{Table, Tabled, settings::Style};

use fittrack_core::Store;
use fittrack_core::models::{NewNoteEntry, NoteEntry};

use super::helpers::{not_found, parse_date, parse_optional_date, print_json, truncate};

pub(crate) fn cmd_note_add(
    store: &Store,
    content: &str,
    title: Option<String>,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    if content.trim().is_empty() {
        bail!("Note content must not be empty");
    }
    let date = parse_date(date)?;
    let title = title.filter(|t| !t.trim().is_empty());

    let note = store
        .add_note(NewNoteEntry {
            date,
            title,
            content: content.to_string(),
        })
        .context("Failed to save note (storage may be full)")?;

    if json {
        print_json(&note)?;
    } else {
        println!("Saved note for {}", note.date);
        println!("  ID: {}", note.id);
    }
    Ok(())
}

/// List notes for one date, or all notes when no date is given.
pub(crate) fn cmd_note_list(store: &Store, date: Option<String>, json: bool) -> Result<()> {
    let notes = match parse_optional_date(date)? {
        Some(d) => store.get_by_date::<NoteEntry>(d),
        None => store.notes(),
    };

    if json {
        return print_json(&notes);
    }

    if notes.is_empty() {
        eprintln!("No notes found");
        process::exit(2);
    }

    print_notes(&notes);
    Ok(())
}

pub(crate) fn cmd_note_search(store: &Store, keyword: &str, json: bool) -> Result<()> {
    let notes = store.search_notes(keyword);

    if json {
        return print_json(&notes);
    }

    if notes.is_empty() {
        eprintln!("No notes matching '{keyword}'");
        process::exit(2);
    }

    print_notes(&notes);
    Ok(())
}

pub(crate) fn cmd_note_delete(store: &Store, id: &str, json: bool) -> Result<()> {
    let removed = store.try_delete::<NoteEntry>(id).context("Failed to delete note")?;
    if !removed {
        not_found(&format!("Note {id} not found"), json);
    }
    if json {
        println!("{}", serde_json::json!({ "deleted": id }));
    } else {
        println!("Deleted note {id}");
    }
    Ok(())
}

fn print_notes(notes: &[NoteEntry]) {
    #[derive(Tabled)]
    struct NoteRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Title")]
        title: String,
        #[tabled(rename = "Content")]
        content: String,
    }

    let rows: Vec<NoteRow> = notes
        .iter()
        .map(|n| NoteRow {
            id: n.id.clone(),
            date: n.date.clone(),
            title: n.title.as_deref().map(|t| truncate(t, 24)).unwrap_or_default(),
            content: truncate(&n.content.replace('\n', " "), 50),
        })
        .collect();

    let table = Table::new(&rows).with(Style::rounded()).to_string();
    println!("{table}");
}
