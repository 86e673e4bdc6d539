//! Documents handed to the engine by the document source.
//!
//! The engine never fetches anything. A collaborator supplies
//! `{ url, text_content, raw_markup }`; [`Document::from_html`] builds one
//! from raw HTML when only markup is available.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Node, Selector};
use serde::{Deserialize, Serialize};
use url::Url;

/// Elements whose text never reaches `text_content`.
const SKIPPED_ELEMENTS: &[&str] = &["head", "script", "style", "noscript", "template", "svg"];

/// Elements that start a new line in `text_content`.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hr", "li", "main", "nav", "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

/// Keywords that mark a plain-text line as a section heading when the markup
/// has no `<h*>` elements.
const HEADING_HINTS: &[&str] = &[
    "about", "team", "contact", "meet", "leadership", "staff", "people", "directors",
    "management", "get in touch", "our story", "who we are", "founder", "owner",
];

static HEADING_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1, h2, h3, h4, h5, h6").expect("valid selector"));

static TITLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("valid selector"));

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// One page relevant to a company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub url: String,
    pub text_content: String,
    #[serde(default)]
    pub raw_markup: String,
}

/// Rough page role, used to route pages to strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Team,
    Contact,
    General,
}

/// A headed region of `text_content`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub heading: String,
    /// Byte offset of the heading in `text_content`.
    pub start: usize,
    /// Byte offset where the next section starts (or the text ends).
    pub end: usize,
}

impl Document {
    pub fn new(
        url: impl Into<String>,
        text_content: impl Into<String>,
        raw_markup: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            text_content: text_content.into(),
            raw_markup: raw_markup.into(),
        }
    }

    /// Build a document from raw HTML, deriving `text_content` from the body.
    pub fn from_html(url: impl Into<String>, html: &str) -> Self {
        let doc = Html::parse_document(html);
        let mut out = String::new();
        walk(doc.root_element(), &mut out);

        let text_content = out
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        Self {
            url: url.into(),
            text_content,
            raw_markup: html.to_string(),
        }
    }

    /// Contents of the `<title>` element, if any.
    pub fn title(&self) -> Option<String> {
        if self.raw_markup.is_empty() {
            return None;
        }
        let html = Html::parse_document(&self.raw_markup);
        html.select(&TITLE_SEL).next().map(|el| {
            el.text()
                .flat_map(str::split_whitespace)
                .collect::<Vec<_>>()
                .join(" ")
        })
    }

    /// Classify the page from its URL path and title.
    pub fn kind(&self) -> DocumentKind {
        let path = Url::parse(&self.url)
            .map(|u| u.path().to_lowercase())
            .unwrap_or_else(|_| self.url.to_lowercase());
        let title = self.title().unwrap_or_default().to_lowercase();
        let hay = format!("{path} {title}");

        if ["contact", "get-in-touch", "get in touch", "enquir"]
            .iter()
            .any(|k| hay.contains(k))
        {
            DocumentKind::Contact
        } else if [
            "about", "team", "people", "staff", "leadership", "meet", "who-we-are",
            "who we are", "management", "directors", "our-story", "our story",
        ]
        .iter()
        .any(|k| hay.contains(k))
        {
            DocumentKind::Team
        } else {
            DocumentKind::General
        }
    }

    /// Host part of the URL, if it parses.
    pub fn host(&self) -> Option<String> {
        Url::parse(&self.url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
    }

    /// Split `text_content` into headed sections.
    ///
    /// Headings come from `<h1>`–`<h6>` in the markup, located in order in the
    /// text. Without markup headings, short lines containing a heading keyword
    /// are used instead.
    pub fn sections(&self) -> Vec<Section> {
        let text = &self.text_content;
        let mut starts: Vec<(String, usize)> = Vec::new();

        if !self.raw_markup.is_empty() {
            let doc = Html::parse_document(&self.raw_markup);
            let mut cursor = 0;
            for el in doc.select(&HEADING_SEL) {
                let heading = el.text().collect::<Vec<_>>().join(" ");
                let heading = heading.split_whitespace().collect::<Vec<_>>().join(" ");
                if heading.is_empty() {
                    continue;
                }
                if let Some(pos) = text[cursor..].find(&heading) {
                    starts.push((heading.clone(), cursor + pos));
                    cursor += pos + heading.len();
                }
            }
        }

        if starts.is_empty() {
            let mut offset = 0;
            for line in text.split_inclusive('\n') {
                let trimmed = line.trim();
                let lower = trimmed.to_lowercase();
                let short = trimmed.split_whitespace().count() <= 6;
                let sentence = trimmed.ends_with('.') || trimmed.contains('@');
                if short && !sentence && HEADING_HINTS.iter().any(|h| lower.contains(h)) {
                    starts.push((trimmed.to_string(), offset));
                }
                offset += line.len();
            }
        }

        let mut sections = Vec::with_capacity(starts.len());
        for (i, (heading, start)) in starts.iter().enumerate() {
            let end = starts.get(i + 1).map(|(_, s)| *s).unwrap_or(text.len());
            sections.push(Section {
                heading: heading.clone(),
                start: *start,
                end,
            });
        }
        sections
    }
}

// ---------------------------------------------------------------------------
// Markup → text
// ---------------------------------------------------------------------------

fn walk(el: ElementRef<'_>, out: &mut String) {
    let name = el.value().name();
    if SKIPPED_ELEMENTS.contains(&name) {
        return;
    }

    let block = BLOCK_ELEMENTS.contains(&name);
    if block {
        break_line(out);
    }

    for child in el.children() {
        match child.value() {
            Node::Text(text) => push_words(out, text),
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    walk(child_el, out);
                }
            }
            _ => {}
        }
    }

    if block {
        break_line(out);
    }
}

fn push_words(out: &mut String, text: &str) {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let needs_space = !out.is_empty() && !out.ends_with([' ', '\n']);

    if collapsed.is_empty() {
        if needs_space && !text.is_empty() {
            out.push(' ');
        }
        return;
    }

    if needs_space && text.starts_with(char::is_whitespace) {
        out.push(' ');
    }
    out.push_str(&collapsed);
    if text.ends_with(char::is_whitespace) {
        out.push(' ');
    }
}

fn break_line(out: &mut String) {
    while out.ends_with(' ') {
        out.pop();
    }
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}
