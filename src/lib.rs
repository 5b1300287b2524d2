//! Translate `data-i18n` tagged page elements from per-language dictionaries.
//!
//! A [`Translator`] resolves the starting language from a saved preference or
//! the host locale, fetches the language's dictionary together with the
//! default language's dictionary as fallback, rewrites every tagged element of
//! a [`Document`](document::Document) and remembers the language for next time.

pub mod config;
pub mod document;
pub mod i18n;
pub mod preference;
pub mod translator;

pub use translator::{ApplyOutcome, ApplyReport, ApplyTicket, PreparedTranslation, Translator};
