//! HTML text as a translatable document.
//!
//! This is a lightweight scanner, not a full HTML parser. It locates every
//! element whose opening tag carries a `data-i18n` key, remembers the byte
//! range of its inner content and splices translated content back in on
//! [`HtmlDocument::render`]. Everything outside those ranges is reproduced
//! byte for byte. Keyed elements nested inside another keyed element are
//! ignored because the outer element's content replaces them. Comments and
//! the bodies of `<script>` and `<style>` are never scanned.

use crate::document::{Document, ElementRole, TranslatableNode, KEY_ATTRIBUTE};
use crate::i18n::LanguageCode;
use regex::Regex;
use std::ops::Range;
use std::sync::OnceLock;
use tracing::warn;

/// Elements that never have content.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

static OPEN_TAG_REGEX: OnceLock<Regex> = OnceLock::new();
static KEY_ATTR_REGEX: OnceLock<Regex> = OnceLock::new();
static HTML_TAG_REGEX: OnceLock<Regex> = OnceLock::new();
static LANG_ATTR_REGEX: OnceLock<Regex> = OnceLock::new();
static RAW_TEXT_REGEX: OnceLock<Regex> = OnceLock::new();

// Attribute lists may contain `>` inside quoted values
fn open_tag_regex() -> &'static Regex {
    OPEN_TAG_REGEX.get_or_init(|| {
        Regex::new(r#"<([A-Za-z][A-Za-z0-9-]*)((?:\s(?:"[^"]*"|'[^']*'|[^'">])*)?)>"#).unwrap()
    })
}

fn key_attr_regex() -> &'static Regex {
    KEY_ATTR_REGEX.get_or_init(|| {
        Regex::new(r#"(?i)(?:^|\s)data-i18n\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+))"#)
            .unwrap()
    })
}

fn html_tag_regex() -> &'static Regex {
    HTML_TAG_REGEX.get_or_init(|| {
        Regex::new(r#"(?i)<html(?:\s(?:"[^"]*"|'[^']*'|[^'">])*)?>"#).unwrap()
    })
}

fn lang_attr_regex() -> &'static Regex {
    LANG_ATTR_REGEX.get_or_init(|| {
        Regex::new(r#"(?i)(\slang\s*=\s*)(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#).unwrap()
    })
}

/// Start of a comment, or a `<script>`/`<style>` opening tag (lowercase input).
fn raw_text_regex() -> &'static Regex {
    RAW_TEXT_REGEX.get_or_init(|| {
        Regex::new(r#"<!--|<(script|style)(?:\s(?:"[^"]*"|'[^']*'|[^'">])*)?>"#).unwrap()
    })
}

/// A keyed element found in the HTML source.
#[derive(Debug, Clone)]
struct HtmlNode {
    key: String,
    role: ElementRole,
    content_range: Range<usize>,
    content: String,
}

impl TranslatableNode for HtmlNode {
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

/// An HTML page with `data-i18n` tagged elements.
#[derive(Debug, Clone)]
pub struct HtmlDocument {
    source: String,
    html_tag: Option<Range<usize>>,
    lang: Option<String>,
    lang_changed: bool,
    nodes: Vec<HtmlNode>,
}

impl HtmlDocument {
    /// Scan `source` for tagged elements and the `<html lang>` attribute.
    ///
    /// Tagged elements without a closing tag are skipped with a warning,
    /// so pages relying on optional end tags still translate everything else.
    pub fn parse(source: impl Into<String>) -> Self {
        let source = source.into();
        // Same byte offsets as `source`: lowercase, with comments and raw text blanked
        let scan = mask_raw_text(&source.to_ascii_lowercase());

        let html_tag = html_tag_regex().find(&scan).map(|m| m.range());
        let lang = html_tag
            .as_ref()
            .and_then(|range| lang_attr_regex().captures(&source[range.clone()]))
            .and_then(|caps| caps.get(2).or(caps.get(3)).or(caps.get(4)))
            .map(|m| m.as_str().to_string());

        let mut nodes: Vec<HtmlNode> = Vec::new();
        let mut covered_until = 0;

        for caps in open_tag_regex().captures_iter(&scan) {
            let (Some(open_tag), Some(tag)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let attributes = caps.get(2).map_or("", |m| &source[m.range()]);
            let Some(key) = key_attribute(attributes) else {
                continue;
            };
            let tag = tag.as_str();

            if tag == "html" {
                warn!("i18n: {} on <html> is not supported, ignoring '{}'", KEY_ATTRIBUTE, key);
                continue;
            }
            if open_tag.start() < covered_until {
                warn!("i18n: '{}' is nested inside another translated element, ignoring", key);
                continue;
            }
            if VOID_ELEMENTS.contains(&tag) || attributes.trim_end().ends_with('/') {
                warn!("i18n: <{}> for '{}' cannot hold content, ignoring", tag, key);
                continue;
            }

            let Some(close) = find_closing_tag(&scan, tag, open_tag.end()) else {
                warn!("i18n: <{}> for '{}' has no closing tag, ignoring", tag, key);
                continue;
            };

            let content_range = open_tag.end()..close;
            covered_until = close;
            nodes.push(HtmlNode {
                role: if tag == "title" {
                    ElementRole::Title
                } else {
                    ElementRole::Content
                },
                content: source[content_range.clone()].to_string(),
                content_range,
                key,
            });
        }

        Self {
            source,
            html_tag,
            lang,
            lang_changed: false,
            nodes,
        }
    }

    /// Keys of all tagged elements, in document order.
    pub fn keys(&self) -> Vec<&str> {
        self.nodes.iter().map(|node| node.key.as_str()).collect()
    }

    /// Current content of the first element with `key`.
    pub fn content_of(&self, key: &str) -> Option<&str> {
        self.nodes
            .iter()
            .find(|node| node.key == key)
            .map(|node| node.content.as_str())
    }

    /// Current content of the `<title>` element, if it is tagged.
    pub fn title(&self) -> Option<&str> {
        self.nodes
            .iter()
            .find(|node| node.role == ElementRole::Title)
            .map(|node| node.content.as_str())
    }

    /// Produce the HTML with all current contents and the language attribute applied.
    pub fn render(&self) -> String {
        let html_tag = match (&self.html_tag, &self.lang) {
            (Some(range), Some(lang)) if self.lang_changed => {
                Some((range.clone(), with_lang(&self.source[range.clone()], lang)))
            }
            _ => None,
        };

        let mut edits: Vec<(Range<usize>, &str)> = self
            .nodes
            .iter()
            .map(|node| (node.content_range.clone(), node.content.as_str()))
            .collect();
        if let Some((range, text)) = &html_tag {
            edits.push((range.clone(), text.as_str()));
        }
        edits.sort_by_key(|(range, _)| range.start);

        let mut out = String::with_capacity(self.source.len());
        let mut cursor = 0;
        for (range, text) in edits {
            if range.start < cursor {
                continue;
            }
            out.push_str(&self.source[cursor..range.start]);
            out.push_str(text);
            cursor = range.end;
        }
        out.push_str(&self.source[cursor..]);
        out
    }
}

impl Document for HtmlDocument {
    fn language(&self) -> Option<&str> {
        self.lang.as_deref()
    }

    fn set_language(&mut self, lang: &LanguageCode) {
        self.lang = Some(lang.to_string());
        self.lang_changed = true;
    }

    fn translatable_nodes(&mut self) -> Vec<&mut dyn TranslatableNode> {
        self.nodes
            .iter_mut()
            .map(|node| node as &mut dyn TranslatableNode)
            .collect()
    }
}

fn key_attribute(attributes: &str) -> Option<String> {
    let caps = key_attr_regex().captures(attributes)?;
    caps.get(1)
        .or(caps.get(2))
        .or(caps.get(3))
        .map(|m| m.as_str().trim().to_string())
}

/// Blank out comments and `<script>`/`<style>` bodies in lowercased HTML.
///
/// Blanked bytes become spaces, so offsets into the result are offsets into
/// the original text. An unterminated comment or raw-text body runs to the end.
fn mask_raw_text(lower: &str) -> String {
    let mut masked = String::with_capacity(lower.len());
    let mut cursor = 0;

    while let Some(caps) = raw_text_regex().captures_at(lower, cursor) {
        let Some(found) = caps.get(0) else {
            break;
        };
        let blank = match caps.get(1) {
            Some(tag) => {
                let close = format!("</{}", tag.as_str());
                found.end()..find_tag(lower, &close, found.end()).unwrap_or(lower.len())
            }
            None => {
                let end = lower[found.end()..]
                    .find("-->")
                    .map_or(lower.len(), |offset| found.end() + offset + 3);
                found.start()..end
            }
        };

        masked.push_str(&lower[cursor..blank.start]);
        masked.extend(std::iter::repeat(' ').take(blank.len()));
        cursor = blank.end;
    }

    masked.push_str(&lower[cursor..]);
    masked
}

/// Rewrite an `<html ...>` opening tag so that it carries `lang`.
fn with_lang(tag: &str, lang: &str) -> String {
    let regex = lang_attr_regex();
    if let Some(caps) = regex.captures(tag) {
        if let (Some(whole), Some(prefix)) = (caps.get(0), caps.get(1)) {
            return format!(
                "{}{}\"{}\"{}",
                &tag[..whole.start()],
                prefix.as_str(),
                lang,
                &tag[whole.end()..]
            );
        }
    }

    // "<html" is five bytes; insert the attribute right after the tag name
    format!("{} lang=\"{}\"{}", &tag[..5], lang, &tag[5..])
}

/// Byte offset of the `</tag` that closes an element whose content starts at `from`.
fn find_closing_tag(lower: &str, tag: &str, from: usize) -> Option<usize> {
    let open = format!("<{}", tag);
    let close = format!("</{}", tag);
    let mut depth = 0usize;
    let mut pos = from;

    loop {
        let next_close = find_tag(lower, &close, pos)?;
        match find_tag(lower, &open, pos).filter(|&start| start < next_close) {
            Some(start) => {
                depth += 1;
                pos = start + open.len();
            }
            None if depth == 0 => return Some(next_close),
            None => {
                depth -= 1;
                pos = next_close + close.len();
            }
        }
    }
}

/// Find `needle` at or after `from`, requiring a tag-name boundary after it.
fn find_tag(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    let mut pos = from;
    while let Some(offset) = haystack[pos..].find(needle) {
        let start = pos + offset;
        let end = start + needle.len();
        match haystack[end..].chars().next() {
            Some(c) if c == '>' || c == '/' || c.is_ascii_whitespace() => return Some(start),
            Some(_) => pos = end,
            None => return None,
        }
    }
    None
}
