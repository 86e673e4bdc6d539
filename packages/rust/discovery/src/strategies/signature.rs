//! Email-signature and footer strategy.
//!
//! A name directly after a sign-off ("Kind regards,\nJohn Smith") is a strong
//! signal; a name in the page `<footer>` is a weak one.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use execscout_shared::text::SIGNATURE_CLOSING_PATTERN;
use execscout_shared::{CompanyMeta, Document, RawCandidate, Result, StrategySource};
use regex::Regex;
use scraper::{Html, Selector};

use super::{ExtractionStrategy, NAME_PATTERN, find_names, refine, to_candidate};

const CLOSING_CONFIDENCE: f64 = 0.8;
const FOOTER_CONFIDENCE: f64 = 0.6;

/// A sign-off, optionally one line break, then a name.
static CLOSING_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"{SIGNATURE_CLOSING_PATTERN}[ \t]*(?:\r?\n[ \t]*)?{NAME_PATTERN}"
    ))
    .expect("valid regex")
});

static FOOTER_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("footer").expect("valid selector"));

pub struct SignatureStrategy {
    context_chars: usize,
}

impl SignatureStrategy {
    pub fn new(context_chars: usize) -> Self {
        Self { context_chars }
    }
}

impl ExtractionStrategy for SignatureStrategy {
    fn name(&self) -> &str {
        "signature"
    }

    fn source(&self) -> StrategySource {
        StrategySource::Signature
    }

    fn cache_id(&self) -> String {
        format!("{}:{}", self.name(), self.context_chars)
    }

    fn extract(&self, doc: &Document, _company: &CompanyMeta) -> Result<Vec<RawCandidate>> {
        let text = &doc.text_content;
        let mut out = Vec::new();
        let mut seen = BTreeSet::new();

        for caps in CLOSING_NAME_RE.captures_iter(text) {
            let Some(m) = caps.name("name") else { continue };
            if let Some(found) = refine(m.as_str(), m.start()) {
                if seen.insert(found.start) {
                    out.push(to_candidate(
                        doc,
                        &found,
                        StrategySource::Signature,
                        CLOSING_CONFIDENCE,
                        self.context_chars,
                    ));
                }
            }
        }

        if let Some(start) = footer_start(doc) {
            for found in find_names(text, start..text.len()) {
                if seen.insert(found.start) {
                    out.push(to_candidate(
                        doc,
                        &found,
                        StrategySource::Signature,
                        FOOTER_CONFIDENCE,
                        self.context_chars,
                    ));
                }
            }
        }

        Ok(out)
    }
}

/// Byte offset in `text_content` where the page footer begins, located by
/// the footer's first line of text.
fn footer_start(doc: &Document) -> Option<usize> {
    if doc.raw_markup.is_empty() {
        return None;
    }
    let html = Html::parse_document(&doc.raw_markup);
    let footer = html.select(&FOOTER_SEL).last()?;
    let first_line = footer
        .text()
        .map(|t| t.split_whitespace().collect::<Vec<_>>().join(" "))
        .find(|t| !t.is_empty())?;
    doc.text_content.rfind(&first_line)
}
