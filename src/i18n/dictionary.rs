//! Key/value dictionaries and their validated parsing.
//!
//! External dictionary content is a flat JSON object of string to string.
//! Parsing keeps every string entry, drops anything else (numbers, booleans,
//! null, nested objects or arrays) and records the dropped keys in a
//! [`ParseReport`] so that malformed entries are noticed instead of coerced.

use crate::i18n::LanguageCode;
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors that make a whole dictionary unusable.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a JSON object at the top level, found {0}")]
    NotAnObject(&'static str),
}

/// Report of entries dropped while parsing a dictionary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseReport {
    /// Keys whose values were not strings, with a short description of what was found
    pub rejected: Vec<(String, &'static str)>,
}

impl ParseReport {
    /// Check if every entry was accepted
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// A parsed dictionary together with its report.
#[derive(Debug, Clone)]
pub struct ParsedDictionary {
    pub dictionary: Dictionary,
    pub report: ParseReport,
}

/// An immutable mapping from key to translated value for one language.
///
/// Values may contain inline markup (`<br>`, `<b>`); they are stored verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dictionary {
    language: LanguageCode,
    entries: BTreeMap<String, String>,
}

impl Dictionary {
    /// An empty dictionary for `language`, used when retrieval fails.
    pub fn empty(language: LanguageCode) -> Self {
        Self {
            language,
            entries: BTreeMap::new(),
        }
    }

    /// Build a dictionary from already-typed entries.
    pub fn from_entries<I, K, V>(language: LanguageCode, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            language,
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Parse external JSON content.
    ///
    /// # Returns
    /// * `Ok(ParsedDictionary)` when the content is a JSON object; non-string
    ///   values are dropped and listed in the report
    /// * `Err(ParseError)` when the content is not JSON or not an object
    pub fn parse(language: LanguageCode, content: &str) -> Result<ParsedDictionary, ParseError> {
        let value: Value = serde_json::from_str(content)?;

        let object = match value {
            Value::Object(object) => object,
            other => return Err(ParseError::NotAnObject(kind_of(&other))),
        };

        let mut entries = BTreeMap::new();
        let mut report = ParseReport::default();

        for (key, value) in object {
            match value {
                Value::String(text) => {
                    entries.insert(key, text);
                }
                other => report.rejected.push((key, kind_of(&other))),
            }
        }

        Ok(ParsedDictionary {
            dictionary: Self { language, entries },
            report,
        })
    }

    /// The language this dictionary belongs to.
    pub fn language(&self) -> &LanguageCode {
        &self.language
    }

    /// The raw value stored for `key`, including empty strings.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// The usable value for `key`.
    ///
    /// An empty string counts as missing, so callers move on to the fallback.
    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|value| !value.is_empty())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

/// A value resolved for a key, and where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution<'a> {
    pub value: &'a str,
    pub from_fallback: bool,
}

/// Resolve `key` against the primary dictionary, then the fallback.
///
/// The fallback is only consulted when the primary value is absent or empty;
/// it never overrides a usable primary value.
pub fn lookup_with_fallback<'a>(
    key: &str,
    primary: &'a Dictionary,
    fallback: Option<&'a Dictionary>,
) -> Option<Resolution<'a>> {
    if let Some(value) = primary.lookup(key) {
        return Some(Resolution {
            value,
            from_fallback: false,
        });
    }

    fallback.and_then(|dict| dict.lookup(key)).map(|value| Resolution {
        value,
        from_fallback: true,
    })
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
