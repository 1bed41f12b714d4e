use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

use fittrack_core::db::DEFAULT_QUOTA_BYTES;

const DATA_DIR_ENV: &str = "FITTRACK_DATA_DIR";
const QUOTA_ENV: &str = "FITTRACK_QUOTA_BYTES";

pub struct Config {
    pub db_path: PathBuf,
    pub quota_bytes: usize,
}

impl Config {
    pub fn load() -> Result<Self> {
        let data_dir = match std::env::var_os(DATA_DIR_ENV) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => ProjectDirs::from("", "", "fittrack")
                .context("Could not determine home directory")?
                .data_dir()
                .to_path_buf(),
        };
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        let quota_bytes = parse_quota(std::env::var(QUOTA_ENV).ok().as_deref())?;

        Ok(Config {
            db_path: data_dir.join("fittrack.db"),
            quota_bytes,
        })
    }
}

fn parse_quota(raw: Option<&str>) -> Result<usize> {
    match raw.map(str::trim) {
        None | Some("") => Ok(DEFAULT_QUOTA_BYTES),
        Some(s) => s
            .parse()
            .with_context(|| format!("Invalid {QUOTA_ENV} '{s}'. Use a byte count")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quota_default() {
        assert_eq!(parse_quota(None).unwrap(), DEFAULT_QUOTA_BYTES);
        assert_eq!(parse_quota(Some("  ")).unwrap(), DEFAULT_QUOTA_BYTES);
    }

    #[test]
    fn test_parse_quota_value() {
        assert_eq!(parse_quota(Some("1048576")).unwrap(), 1_048_576);
        assert!(parse_quota(Some("lots")).is_err());
        assert!(parse_quota(Some("-5")).is_err());
    }
}
