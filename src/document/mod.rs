//! The page being translated.
//!
//! The translator never owns the page. It talks to it through the [`Document`]
//! trait, which exposes the language attribute and every element tagged with
//! a translation key. Two implementations ship with the crate: [`Page`], an
//! in-memory model for embedding, and [`HtmlDocument`], which rewrites HTML
//! text in place.

mod html;
mod page;

pub use html::HtmlDocument;
pub use page::{Element, Page};

use crate::i18n::LanguageCode;
use regex::Regex;
use std::sync::OnceLock;

/// Attribute that marks an element as translatable.
pub const KEY_ATTRIBUTE: &str = "data-i18n";

/// What an element is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementRole {
    /// Regular content; receives values verbatim, markup included
    Content,
    /// The page title; receives plain text only
    Title,
}

/// An element carrying a translation key.
pub trait TranslatableNode {
    fn key(&self) -> &str;
    fn role(&self) -> ElementRole;
    fn content(&self) -> &str;
    fn set_content(&mut self, value: &str);
}

/// A page whose tagged elements can be rewritten.
pub trait Document {
    /// The current language attribute, if any.
    fn language(&self) -> Option<&str>;

    fn set_language(&mut self, lang: &LanguageCode);

    /// Every element carrying a translation key, in document order.
    fn translatable_nodes(&mut self) -> Vec<&mut dyn TranslatableNode>;
}

static TAG_REGEX: OnceLock<Regex> = OnceLock::new();

/// Remove markup tags, keeping the text between them.
///
/// # Example
/// ```ignore
/// assert_eq!(strip_markup("Hello <b>World</b>"), "Hello World");
/// ```
pub fn strip_markup(value: &str) -> String {
    let regex = TAG_REGEX.get_or_init(|| Regex::new(r"<[^>]+>").unwrap());
    regex.replace_all(value, "").into_owned()
}
