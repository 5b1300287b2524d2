//! Language registry: the set of languages a translator recognizes.
//!
//! The registry maps every recognized language to the locator of its
//! dictionary resource and marks exactly one language as the default. It is
//! built from configuration and handed to the translator at construction, so
//! two translators with different language sets can live side by side.

use crate::i18n::LanguageCode;
use thiserror::Error;

/// Errors raised when building a registry from configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("no languages configured")]
    Empty,

    #[error("invalid language code: '{0}'")]
    InvalidCode(String),

    #[error("language '{0}' is configured more than once")]
    Duplicate(String),

    #[error("language '{0}' has an empty resource locator")]
    EmptyLocator(String),

    #[error("default language '{0}' has no configured resource")]
    DefaultNotRegistered(String),
}

/// Configuration for a recognized language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageConfig {
    /// Normalized language code (e.g., "en", "es")
    pub code: LanguageCode,

    /// Where the dictionary lives (e.g., "./es.json"); interpreted by the dictionary source
    pub locator: String,

    /// Whether this is the default language (exactly one is)
    pub is_default: bool,
}

/// The recognized languages, in configuration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

impl LanguageRegistry {
    /// Build a registry from a default language and `(code, locator)` pairs.
    ///
    /// # Returns
    /// * `Ok(LanguageRegistry)` if every code is valid and unique and the
    ///   default language is among them
    /// * `Err(RegistryError)` describing the first problem found
    pub fn new<I, C, L>(default_language: &str, locales: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = (C, L)>,
        C: AsRef<str>,
        L: Into<String>,
    {
        let default_code = LanguageCode::new(default_language);
        let mut languages: Vec<LanguageConfig> = Vec::new();

        for (code, locator) in locales {
            let raw = code.as_ref();
            if !is_valid_code(raw.trim()) {
                return Err(RegistryError::InvalidCode(raw.to_string()));
            }

            let code = LanguageCode::new(raw);
            if languages.iter().any(|lang| lang.code == code) {
                return Err(RegistryError::Duplicate(code.to_string()));
            }

            let locator: String = locator.into();
            let locator = locator.trim().to_string();
            if locator.is_empty() {
                return Err(RegistryError::EmptyLocator(code.to_string()));
            }

            let is_default = code == default_code;
            languages.push(LanguageConfig {
                code,
                locator,
                is_default,
            });
        }

        if languages.is_empty() {
            return Err(RegistryError::Empty);
        }

        if !languages.iter().any(|lang| lang.is_default) {
            return Err(RegistryError::DefaultNotRegistered(default_code.to_string()));
        }

        Ok(Self { languages })
    }

    /// Get a language configuration by its code (case-insensitive).
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        let code = LanguageCode::new(code);
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// Return the normalized code if `code` is recognized.
    pub fn recognize(&self, code: &str) -> Option<LanguageCode> {
        self.get_by_code(code).map(|lang| lang.code.clone())
    }

    /// The resource locator for a language, if it is registered.
    pub fn locator(&self, code: &LanguageCode) -> Option<&str> {
        self.languages
            .iter()
            .find(|lang| &lang.code == code)
            .map(|lang| lang.locator.as_str())
    }

    /// The default language.
    pub fn default_language(&self) -> &LanguageCode {
        // `new` refuses to build a registry without a default entry
        &self
            .languages
            .iter()
            .find(|lang| lang.is_default)
            .unwrap_or(&self.languages[0])
            .code
    }

    /// Check whether `code` is the default language.
    pub fn is_default(&self, code: &LanguageCode) -> bool {
        self.default_language() == code
    }

    /// All recognized languages in configuration order.
    pub fn list(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().collect()
    }
}

impl Default for LanguageRegistry {
    /// English (default) and Spanish, served from `./en.json` and `./es.json`.
    fn default() -> Self {
        Self {
            languages: vec![
                LanguageConfig {
                    code: LanguageCode::new("en"),
                    locator: "./en.json".to_string(),
                    is_default: true,
                },
                LanguageConfig {
                    code: LanguageCode::new("es"),
                    locator: "./es.json".to_string(),
                    is_default: false,
                },
            ],
        }
    }
}

/// Language codes are ASCII letters, digits and hyphens, starting with a letter.
fn is_valid_code(code: &str) -> bool {
    let mut chars = code.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
        }
        _ => false,
    }
}
