//! Language codes and locale-hint parsing.

use std::fmt;

/// A language identifier such as `"en"` or `"es"`.
///
/// Codes are trimmed and stored lowercase. Whether a code is *recognized* is
/// decided by the [`LanguageRegistry`](crate::i18n::LanguageRegistry), not by
/// this type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LanguageCode(String);

impl LanguageCode {
    /// Create a code, normalizing case and surrounding whitespace.
    pub fn new(code: &str) -> Self {
        Self(code.trim().to_ascii_lowercase())
    }

    /// The normalized code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LanguageCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl AsRef<str> for LanguageCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Extract the primary language subtag from a host locale hint.
///
/// Accepts BCP 47 tags (`"es-ES"`) as well as POSIX locale strings
/// (`"es_ES.UTF-8"`, `"de_DE@euro"`). Returns `None` for an empty hint.
///
/// # Example
/// ```ignore
/// assert_eq!(primary_subtag("es-ES").as_deref(), Some("es"));
/// ```
pub fn primary_subtag(hint: &str) -> Option<String> {
    let primary = hint
        .trim()
        .split(['-', '_', '.', '@'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();

    if primary.is_empty() {
        None
    } else {
        Some(primary)
    }
}
