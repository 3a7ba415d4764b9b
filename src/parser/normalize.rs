use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};

// ASCII only: U+00A0 has to survive for the grouped-number pattern.
static ASCII_WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t\r\n\x0C]+").unwrap());
static HEADING_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1, h2").unwrap());

/// Flattened text of one fetched page.
#[derive(Debug, Clone, Default)]
pub struct PageText {
    pub text: String,
    pub headings: Vec<String>,
}

impl PageText {
    pub fn from_html(html: &str) -> Self {
        let doc = Html::parse_document(html);

        let text = flatten(doc.root_element().text());
        let headings = doc
            .select(&HEADING_SEL)
            .map(|h| flatten(h.text()))
            .filter(|t| !t.is_empty())
            .collect();

        Self { text, headings }
    }

    #[cfg(test)]
    pub fn from_plain(text: &str) -> Self {
        Self {
            text: flatten(std::iter::once(text)),
            headings: Vec::new(),
        }
    }
}

/// Trim every text node, drop empty ones, join with single spaces.
fn flatten<'a>(nodes: impl Iterator<Item = &'a str>) -> String {
    nodes
        .map(|t| ASCII_WS_RE.replace_all(t, " "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
