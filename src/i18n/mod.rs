//! Internationalization (i18n) building blocks.
//!
//! This module holds everything the translator needs to know about languages
//! and their dictionaries. The document and preference seams live in their own
//! top-level modules.
//!
//! # Architecture
//!
//! - `language`: `LanguageCode` value type and locale-hint parsing
//! - `registry`: the fixed set of recognized languages and their resource locators
//! - `dictionary`: strongly typed key/value dictionaries and validated parsing
//! - `source`: where dictionary content comes from (HTTP, filesystem, memory)
//!
//! # Example
//!
//! ```rust,ignore
//! use page_i18n::i18n::{LanguageRegistry, Dictionary};
//!
//! let registry = LanguageRegistry::default();
//! let spanish = registry.recognize("es").expect("es is registered");
//! let dict = Dictionary::parse(spanish, r#"{"greet": "Hola"}"#)?.dictionary;
//! ```

mod dictionary;
mod language;
mod registry;
mod source;

pub use dictionary::{lookup_with_fallback, Dictionary, ParseError, ParseReport, ParsedDictionary, Resolution};
pub use language::{primary_subtag, LanguageCode};
pub use registry::{LanguageConfig, LanguageRegistry, RegistryError};
pub use source::{DictionarySource, FetchError, FileSource, HttpSource, MemorySource};
