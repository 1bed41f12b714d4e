use anyhow::{Context, Result, bail};
use std::fs;
use std::path::Path;

use fittrack_core::Store;

/// Write every collection as one JSON document, to `output` or stdout.
pub(crate) fn cmd_export(store: &Store, output: Option<&Path>, json: bool) -> Result<()> {
    let data = store.export_json().context("Failed to serialize export")?;

    let Some(path) = output else {
        println!("{data}");
        return Ok(());
    };

    fs::write(path, &data).with_context(|| format!("Failed to write {}", path.display()))?;
    if json {
        println!(
            "{}",
            serde_json::json!({ "exported": path.display().to_string(), "bytes": data.len() })
        );
    } else {
        eprintln!("Exported {} bytes to {}", data.len(), path.display());
    }
    Ok(())
}

pub(crate) fn cmd_import(store: &Store, file: &Path, json: bool) -> Result<()> {
    let contents = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    if !store.import_json(&contents) {
        bail!(
            "Import failed: {} is not a valid export or storage is full. No data was changed",
            file.display()
        );
    }

    if json {
        println!("{}", serde_json::json!({ "imported": file.display().to_string() }));
    } else {
        println!("Imported {}", file.display());
    }
    Ok(())
}

pub(crate) fn cmd_clear(store: &Store, yes: bool, json: bool) -> Result<()> {
    if !yes {
        bail!("This deletes all records and settings. Re-run with --yes to confirm");
    }
    if !store.clear_all() {
        bail!("Failed to clear some collections");
    }

    if json {
        println!("{}", serde_json::json!({ "cleared": true }));
    } else {
        println!("All data cleared");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use fittrack_core::models::{MealType, NewFoodEntry};

    #[test]
    fn test_export_then_import_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backup.json");

        let source = Store::open_in_memory().unwrap();
        source
            .add_food(NewFoodEntry {
                date: NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
                meal_type: MealType::Dinner,
                name: "三文鱼".to_string(),
                weight: 150.0,
                calories: 312.0,
                carbs: 0.0,
                protein: 30.0,
                fat: 19.5,
                note: String::new(),
            })
            .unwrap();
        cmd_export(&source, Some(path.as_path()), true).unwrap();

        let target = Store::open_in_memory().unwrap();
        cmd_import(&target, &path, true).unwrap();
        assert_eq!(target.foods(), source.foods());
    }

    #[test]
    fn test_import_invalid_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "not json").unwrap();

        let store = Store::open_in_memory().unwrap();
        assert!(cmd_import(&store, &path, true).is_err());
        assert!(cmd_import(&store, &dir.path().join("missing.json"), true).is_err());
    }

    #[test]
    fn test_clear_requires_confirmation() {
        let store = Store::open_in_memory().unwrap();
        assert!(cmd_clear(&store, false, true).is_err());
        assert!(cmd_clear(&store, true, true).is_ok());
    }
}
