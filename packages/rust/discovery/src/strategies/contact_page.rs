//! Contact-page strategy.
//!
//! Two passes: explicit "contact / speak to / ask for <Name>" phrasing
//! anywhere in the document, then any other name inside a contact section
//! (or anywhere on a page that is itself a contact page).

use std::collections::BTreeSet;
use std::sync::LazyLock;

use execscout_shared::{CompanyMeta, Document, DocumentKind, RawCandidate, Result, StrategySource};
use regex::Regex;

use super::{ExtractionStrategy, NAME_PATTERN, find_names, refine, to_candidate};

const EXPLICIT_CONFIDENCE: f64 = 0.9;
const SECTION_CONFIDENCE: f64 = 0.7;

const CONTACT_HEADINGS: &[&str] = &["contact", "get in touch", "enquir", "reach us", "speak to"];

static EXPLICIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b(?i:contact|speak[ \t]+(?:to|with)|talk[ \t]+to|ask[ \t]+for|call)[ \t]+{NAME_PATTERN}"
    ))
    .expect("valid regex")
});

pub struct ContactPageStrategy {
    context_chars: usize,
}

impl ContactPageStrategy {
    pub fn new(context_chars: usize) -> Self {
        Self { context_chars }
    }
}

impl ExtractionStrategy for ContactPageStrategy {
    fn name(&self) -> &str {
        "contact_page"
    }

    fn source(&self) -> StrategySource {
        StrategySource::ContactPage
    }

    fn cache_id(&self) -> String {
        format!("{}:{}", self.name(), self.context_chars)
    }

    fn extract(&self, doc: &Document, _company: &CompanyMeta) -> Result<Vec<RawCandidate>> {
        let text = &doc.text_content;
        let mut out = Vec::new();
        let mut seen = BTreeSet::new();

        for caps in EXPLICIT_RE.captures_iter(text) {
            let Some(m) = caps.name("name") else { continue };
            if let Some(found) = refine(m.as_str(), m.start()) {
                if seen.insert(found.start) {
                    out.push(to_candidate(
                        doc,
                        &found,
                        StrategySource::ContactPage,
                        EXPLICIT_CONFIDENCE,
                        self.context_chars,
                    ));
                }
            }
        }

        let mut ranges: Vec<_> = doc
            .sections()
            .into_iter()
            .filter(|s| {
                let heading = s.heading.to_lowercase();
                CONTACT_HEADINGS.iter().any(|h| heading.contains(h))
            })
            .map(|s| s.start..s.end)
            .collect();
        if doc.kind() == DocumentKind::Contact {
            ranges = vec![0..text.len()];
        }

        for range in ranges {
            for found in find_names(text, range) {
                if seen.insert(found.start) {
                    out.push(to_candidate(
                        doc,
                        &found,
                        StrategySource::ContactPage,
                        SECTION_CONFIDENCE,
                        self.context_chars,
                    ));
                }
            }
        }

        Ok(out)
    }
}
