use crate::i18n::LanguageRegistry;
use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_LANGUAGE: &str = "en";
const DEFAULT_LOCALES: &str = "en=./en.json,es=./es.json";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_PREFERENCE_FILE: &str = ".page-i18n/preferences.json";
const DEFAULT_PREFERENCE_KEY: &str = "lang";

#[derive(Debug, Clone)]
pub struct Config {
    // Languages
    pub registry: LanguageRegistry,

    // Dictionary retrieval
    pub base_url: Option<String>,
    pub locale_dir: PathBuf,
    pub fetch_timeout: Option<Duration>,

    // Preference
    pub preference_file: PathBuf,
    pub preference_key: String,
}

impl Config {
    /// Build a configuration for `default_language` and `(code, locator)` pairs,
    /// with file-based retrieval and the default timeout and preference location.
    pub fn new(default_language: &str, locales: &[(&str, &str)]) -> Result<Self> {
        let registry = LanguageRegistry::new(default_language, locales.iter().copied())
            .context("Invalid language configuration")?;

        Ok(Self {
            registry,
            base_url: None,
            locale_dir: PathBuf::from("."),
            fetch_timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            preference_file: PathBuf::from(DEFAULT_PREFERENCE_FILE),
            preference_key: DEFAULT_PREFERENCE_KEY.to_string(),
        })
    }

    pub fn from_env() -> Result<Self> {
        let default_language =
            std::env::var("I18N_DEFAULT_LANG").unwrap_or_else(|_| DEFAULT_LANGUAGE.to_string());
        let locales = parse_locales(
            &std::env::var("I18N_LOCALES").unwrap_or_else(|_| DEFAULT_LOCALES.to_string()),
        )
        .context("I18N_LOCALES is invalid")?;

        let timeout_secs = match std::env::var("I18N_FETCH_TIMEOUT_SECS") {
            Ok(value) => value
                .trim()
                .parse::<u64>()
                .with_context(|| format!("I18N_FETCH_TIMEOUT_SECS is not a number: {}", value))?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            registry: LanguageRegistry::new(&default_language, locales)
                .context("Invalid language configuration")?,

            base_url: std::env::var("I18N_BASE_URL")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            locale_dir: std::env::var("I18N_LOCALE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".")),
            // 0 disables the timeout
            fetch_timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),

            preference_file: std::env::var("I18N_PREFERENCE_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_PREFERENCE_FILE)),
            preference_key: std::env::var("I18N_PREFERENCE_KEY")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_PREFERENCE_KEY.to_string()),
        })
    }
}

/// Parse `code=locator` pairs separated by commas.
///
/// # Example
/// ```ignore
/// let locales = parse_locales("en=./en.json, es=./es.json")?;
/// assert_eq!(locales[1], ("es".to_string(), "./es.json".to_string()));
/// ```
pub fn parse_locales(raw: &str) -> Result<Vec<(String, String)>> {
    let mut locales = Vec::new();

    for entry in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let Some((code, locator)) = entry.split_once('=') else {
            bail!("Invalid locale entry: '{}'. Expected code=locator", entry);
        };
        locales.push((code.trim().to_string(), locator.trim().to_string()));
    }

    if locales.is_empty() {
        bail!("No locales configured");
    }

    Ok(locales)
}
