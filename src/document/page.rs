//! In-memory document model.

use crate::document::{Document, ElementRole, TranslatableNode};
use crate::i18n::LanguageCode;

/// A translatable element held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub key: String,
    pub role: ElementRole,
    pub content: String,
}

impl Element {
    pub fn new(key: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            role: ElementRole::Content,
            content: content.into(),
        }
    }

    pub fn title(key: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            role: ElementRole::Title,
            content: content.into(),
        }
    }
}

impl TranslatableNode for Element {
    fn key(&self) -> &str {
        &self.key
    }

    fn role(&self) -> ElementRole {
        self.role
    }

    fn content(&self) -> &str {
        &self.content
    }

    fn set_content(&mut self, value: &str) {
        self.content = value.to_string();
    }
}

/// A page made of tagged elements, with an optional language attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    lang: Option<String>,
    elements: Vec<Element>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_element(mut self, element: Element) -> Self {
        self.elements.push(element);
        self
    }

    pub fn push(&mut self, element: Element) {
        self.elements.push(element);
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Content of the first element with `key`.
    pub fn content_of(&self, key: &str) -> Option<&str> {
        self.elements
            .iter()
            .find(|element| element.key == key)
            .map(|element| element.content.as_str())
    }

    /// Content of the title element, if the page has one.
    pub fn title(&self) -> Option<&str> {
        self.elements
            .iter()
            .find(|element| element.role == ElementRole::Title)
            .map(|element| element.content.as_str())
    }
}

impl Document for Page {
    fn language(&self) -> Option<&str> {
        self.lang.as_deref()
    }

    fn set_language(&mut self, lang: &LanguageCode) {
        self.lang = Some(lang.to_string());
    }

    fn translatable_nodes(&mut self) -> Vec<&mut dyn TranslatableNode> {
        self.elements
            .iter_mut()
            .map(|element| element as &mut dyn TranslatableNode)
            .collect()
    }
}
