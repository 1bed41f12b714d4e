use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::Args;

use fittrack_core::Store;
use fittrack_core::models::{Gender, Settings, format_date};

use super::helpers::print_json;

#[derive(Args, Debug, Default)]
pub(crate) struct SettingsArgs {
    /// Display name
    #[arg(long)]
    pub nickname: Option<String>,
    /// male or female
    #[arg(long)]
    pub gender: Option<String>,
    /// Birth date (YYYY-MM-DD)
    #[arg(long)]
    pub birth_date: Option<String>,
    /// Height in cm
    #[arg(long)]
    pub height: Option<f64>,
    /// Current weight in kg
    #[arg(long)]
    pub current_weight: Option<f64>,
    /// Target weight in kg
    #[arg(long)]
    pub target_weight: Option<f64>,
    /// Daily calorie goal (kcal)
    #[arg(long)]
    pub calorie_goal: Option<u32>,
    /// Daily carbs goal (g)
    #[arg(long)]
    pub carbs_goal: Option<u32>,
    /// Daily protein goal (g)
    #[arg(long)]
    pub protein_goal: Option<u32>,
    /// Daily fat goal (g)
    #[arg(long)]
    pub fat_goal: Option<u32>,
}

fn parse_gender(s: &str) -> Result<Gender> {
    match s.trim().to_lowercase().as_str() {
        "male" | "m" => Ok(Gender::Male),
        "female" | "f" => Ok(Gender::Female),
        _ => bail!("Invalid gender '{s}'. Use 'male' or 'female'"),
    }
}

fn positive(value: Option<f64>, name: &str) -> Result<Option<f64>> {
    match value {
        Some(v) if v <= 0.0 => bail!("{name} must be greater than 0"),
        other => Ok(other),
    }
}

/// Merge the given fields into `settings`. Returns whether anything was given.
fn apply(args: SettingsArgs, settings: &mut Settings) -> Result<bool> {
    let mut changed = false;

    if let Some(nickname) = args.nickname {
        let nickname = nickname.trim();
        if nickname.is_empty() {
            bail!("Nickname must not be empty");
        }
        settings.nickname = nickname.to_string();
        changed = true;
    }
    if let Some(gender) = args.gender {
        settings.gender = Some(parse_gender(&gender)?);
        changed = true;
    }
    if let Some(birth_date) = args.birth_date {
        let date = NaiveDate::parse_from_str(birth_date.trim(), "%Y-%m-%d")
            .with_context(|| format!("Invalid birth date '{birth_date}'. Use YYYY-MM-DD"))?;
        settings.birth_date = Some(format_date(date));
        changed = true;
    }
    for (value, slot, name) in [
        (args.height, &mut settings.height, "Height"),
        (args.current_weight, &mut settings.current_weight, "Current weight"),
        (args.target_weight, &mut settings.target_weight, "Target weight"),
    ] {
        if let Some(v) = positive(value, name)? {
            *slot = Some(v);
            changed = true;
        }
    }
    for (value, slot) in [
        (args.calorie_goal, &mut settings.calorie_goal),
        (args.carbs_goal, &mut settings.carbs_goal),
        (args.protein_goal, &mut settings.protein_goal),
        (args.fat_goal, &mut settings.fat_goal),
    ] {
        if let Some(v) = value {
            *slot = v;
            changed = true;
        }
    }

    Ok(changed)
}

pub(crate) fn cmd_settings_show(store: &Store, json: bool) -> Result<()> {
    let settings = store.settings();
    if json {
        return print_json(&settings);
    }
    print_settings(&settings);
    Ok(())
}

pub(crate) fn cmd_settings_set(store: &Store, args: SettingsArgs, json: bool) -> Result<()> {
    let mut settings = store.settings();
    if !apply(args, &mut settings)? {
        bail!("Nothing to set. Run `fittrack settings set --help` for the available fields");
    }
    if !store.save_settings(&settings) {
        bail!("Failed to save settings (storage may be full)");
    }

    if json {
        return print_json(&settings);
    }
    println!("Settings saved");
    print_settings(&settings);
    Ok(())
}

fn print_settings(s: &Settings) {
    let opt = |v: Option<f64>, unit: &str| {
        v.map_or_else(|| "-".to_string(), |v| format!("{v:.1} {unit}"))
    };
    println!("  Nickname:       {}", s.nickname);
    println!(
        "  Gender:         {}",
        match s.gender {
            Some(Gender::Male) => "male",
            Some(Gender::Female) => "female",
            None => "-",
        }
    );
    println!("  Birth date:     {}", s.birth_date.as_deref().unwrap_or("-"));
    println!("  Height:         {}", opt(s.height, "cm"));
    println!("  Current weight: {}", opt(s.current_weight, "kg"));
    println!("  Target weight:  {}", opt(s.target_weight, "kg"));
    println!(
        "  Daily goals:    {} kcal | C:{}g P:{}g F:{}g",
        s.calorie_goal, s.carbs_goal, s.protein_goal, s.fat_goal
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_merges_given_fields() {
        let mut settings = Settings::default();
        let changed = apply(
            SettingsArgs {
                nickname: Some(" Ann ".to_string()),
                height: Some(170.0),
                calorie_goal: Some(1800),
                ..SettingsArgs::default()
            },
            &mut settings,
        )
        .unwrap();

        assert!(changed);
        assert_eq!(settings.nickname, "Ann");
        assert_eq!(settings.height, Some(170.0));
        assert_eq!(settings.calorie_goal, 1800);
        assert_eq!(settings.fat_goal, 65);
    }

    #[test]
    fn test_apply_nothing_given() {
        let mut settings = Settings::default();
        assert!(!apply(SettingsArgs::default(), &mut settings).unwrap());
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_apply_rejects_bad_values() {
        let mut settings = Settings::default();
        let bad_gender = SettingsArgs {
            gender: Some("other".to_string()),
            ..SettingsArgs::default()
        };
        assert!(apply(bad_gender, &mut settings).is_err());

        let bad_height = SettingsArgs {
            height: Some(0.0),
            ..SettingsArgs::default()
        };
        assert!(apply(bad_height, &mut settings).is_err());

        let bad_date = SettingsArgs {
            birth_date: Some("1990-13-01".to_string()),
            ..SettingsArgs::default()
        };
        assert!(apply(bad_date, &mut settings).is_err());
    }

    #[test]
    fn test_parse_gender() {
        assert_eq!(parse_gender("Female").unwrap(), Gender::Female);
        assert_eq!(parse_gender("m").unwrap(), Gender::Male);
        assert!(parse_gender("x").is_err());
    }
}
