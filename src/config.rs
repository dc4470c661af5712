use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Datelike;

use crate::http_client::DEFAULT_TIMEOUT_SECS;
use crate::persist::DEFAULT_HISTORY_FILE;
use crate::results_feed::SQUIGGLE_BASE_URL;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub history_path: PathBuf,
    pub year: i32,
    pub squiggle_base_url: String,
    pub timeout_secs: u64,
    pub contact: String,
    pub log_level: String,
    pub log_format: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            history_path: PathBuf::from(DEFAULT_HISTORY_FILE),
            year: chrono::Local::now().year(),
            squiggle_base_url: SQUIGGLE_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            contact: String::new(),
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}

impl Settings {
    /// Reads `.env.local`, then `.env`, then the process environment.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut settings = Self::default();

        if let Some(path) = get("TIPSTER_HISTORY_PATH") {
            settings.history_path = PathBuf::from(path.trim());
        }
        if let Some(year) = get("TIPSTER_YEAR") {
            settings.year = year
                .trim()
                .parse()
                .with_context(|| format!("TIPSTER_YEAR is not a year: {year}"))?;
        }
        if let Some(url) = get("SQUIGGLE_BASE_URL") {
            settings.squiggle_base_url = url.trim().to_string();
        }
        if let Some(secs) = get("SQUIGGLE_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .with_context(|| format!("SQUIGGLE_TIMEOUT_SECS is not a number: {secs}"))?;
            settings.timeout_secs = secs.max(1);
        }
        if let Some(contact) = get("TIPSTER_CONTACT") {
            settings.contact = contact.trim().to_string();
        }
        if let Some(level) = get("TIPSTER_LOG") {
            settings.log_level = level.trim().to_string();
        }
        if let Some(format) = get("TIPSTER_LOG_FORMAT") {
            settings.log_format = format.trim().to_ascii_lowercase();
        }
        Ok(settings)
    }
}
