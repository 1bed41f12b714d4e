use anyhow::{Context, Result, bail};
use chrono::{Days, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::process;

use fittrack_core::today;

/// Parse a gram weight: "150" or "150g".
pub(crate) fn parse_weight(s: &str) -> Result<f64> {
    let trimmed = s.trim().trim_end_matches('g').trim();
    let value: f64 = trimmed
        .parse()
        .with_context(|| format!("Invalid weight: '{s}'. Use a number like '150' or '150g'"))?;
    if value <= 0.0 {
        bail!("Weight must be greater than 0");
    }
    Ok(value)
}

pub(crate) fn parse_date(date_str: Option<String>) -> Result<NaiveDate> {
    let today = today();
    match date_str.as_deref().map(str::trim) {
        None | Some("today") => Ok(today),
        Some("yesterday") => today
            .checked_sub_days(Days::new(1))
            .context("Date out of range"),
        Some("tomorrow") => today
            .checked_add_days(Days::new(1))
            .context("Date out of range"),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| {
            format!("Invalid date '{s}'. Use YYYY-MM-DD or today/yesterday/tomorrow")
        }),
    }
}

/// Like [`parse_date`] but keeps "no date given" distinct.
pub(crate) fn parse_optional_date(date_str: Option<String>) -> Result<Option<NaiveDate>> {
    date_str.map(|s| parse_date(Some(s))).transpose()
}

/// Parse a workout start time, "YYYY-MM-DDTHH:MM" or with a space separator.
pub(crate) fn parse_start_time(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();
    ["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .with_context(|| format!("Invalid start time '{s}'. Use YYYY-MM-DDTHH:MM"))
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) fn json_error(message: &str) -> String {
    #[derive(Serialize)]
    struct CliError<'a> {
        error: &'a str,
    }
    serde_json::to_string(&CliError { error: message })
        .unwrap_or_else(|_| format!("{{\"error\":\"{message}\"}}"))
}

/// Report a missing record and exit with status 2.
pub(crate) fn not_found(message: &str, json: bool) -> ! {
    if json {
        println!("{}", json_error(message));
    } else {
        eprintln!("{message}");
    }
    process::exit(2);
}

pub(crate) fn no_neg_zero(v: f64) -> f64 {
    if v == 0.0 { 0.0 } else { v }
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}

/// Format minutes as "1h 05m", or "45m" under an hour.
pub(crate) fn format_minutes(minutes: u32) -> String {
    if minutes < 60 {
        format!("{minutes}m")
    } else {
        format!("{}h {:02}m", minutes / 60, minutes % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parse_weight() {
        assert!((parse_weight("200").unwrap() - 200.0).abs() < f64::EPSILON);
        assert!((parse_weight("200g").unwrap() - 200.0).abs() < f64::EPSILON);
        assert!((parse_weight("200.5g").unwrap() - 200.5).abs() < f64::EPSILON);
        assert!((parse_weight(" 50 ").unwrap() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_weight_invalid() {
        assert!(parse_weight("abc").is_err());
        assert!(parse_weight("0").is_err());
        assert!(parse_weight("-50g").is_err());
    }

    #[test]
    fn test_parse_date_none() {
        assert_eq!(parse_date(None).unwrap(), today());
    }

    #[test]
    fn test_parse_date_keywords() {
        let today = today();
        assert_eq!(parse_date(Some("today".to_string())).unwrap(), today);
        assert_eq!(
            parse_date(Some("yesterday".to_string())).unwrap(),
            today - chrono::Duration::days(1)
        );
        assert_eq!(
            parse_date(Some("tomorrow".to_string())).unwrap(),
            today + chrono::Duration::days(1)
        );
    }

    #[test]
    fn test_parse_date_iso() {
        let date = parse_date(Some("2024-01-15".to_string())).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    }

    #[test]
    fn test_parse_date_invalid() {
        assert!(parse_date(Some("nope".to_string())).is_err());
        assert!(parse_date(Some("2024-02-30".to_string())).is_err());
    }

    #[test]
    fn test_parse_optional_date() {
        assert!(parse_optional_date(None).unwrap().is_none());
        assert_eq!(
            parse_optional_date(Some("2024-01-15".to_string())).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
    }

    #[test]
    fn test_parse_start_time() {
        let t = parse_start_time("2024-06-15T07:30").unwrap();
        assert_eq!(t.date(), NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());
        assert_eq!(t.hour(), 7);
        assert_eq!(t.minute(), 30);
        assert!(parse_start_time("2024-06-15 18:05").is_ok());
        assert!(parse_start_time("7:30").is_err());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world this is long", 10), "hello w...");
    }

    #[test]
    fn test_truncate_utf8() {
        assert_eq!(truncate("Crème fraîche", 10), "Crème f...");
        assert_eq!(truncate("今天练了腿和核心力量训练", 8), "今天练了腿...");
    }

    #[test]
    fn test_no_neg_zero() {
        assert_eq!(no_neg_zero(-0.0).to_bits(), 0.0_f64.to_bits());
        assert_eq!(no_neg_zero(5.0), 5.0);
        assert_eq!(no_neg_zero(-3.0), -3.0);
    }

    #[test]
    fn test_format_minutes() {
        assert_eq!(format_minutes(45), "45m");
        assert_eq!(format_minutes(60), "1h 00m");
        assert_eq!(format_minutes(125), "2h 05m");
    }
}
