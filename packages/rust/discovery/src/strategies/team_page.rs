//! Team / about-page strategy.
//!
//! Scans sections headed like a team listing ("Meet the Team", "About",
//! "Our Directors", ...). A page whose URL or title marks it as a team page
//! is scanned whole when it has no such heading.

use execscout_shared::{CompanyMeta, Document, DocumentKind, RawCandidate, Result, StrategySource};

use super::{ExtractionStrategy, dedup_by_position, find_names, to_candidate};

const CONFIDENCE: f64 = 0.8;

const TEAM_HEADINGS: &[&str] = &[
    "about", "team", "meet", "leadership", "people", "staff", "management", "directors",
    "who we are", "our story", "founder", "owner",
];

pub struct TeamPageStrategy {
    context_chars: usize,
}

impl TeamPageStrategy {
    pub fn new(context_chars: usize) -> Self {
        Self { context_chars }
    }
}

impl ExtractionStrategy for TeamPageStrategy {
    fn name(&self) -> &str {
        "team_page"
    }

    fn source(&self) -> StrategySource {
        StrategySource::TeamPage
    }

    fn cache_id(&self) -> String {
        format!("{}:{}", self.name(), self.context_chars)
    }

    fn accepts(&self, doc: &Document) -> bool {
        doc.kind() != DocumentKind::Contact
    }

    fn extract(&self, doc: &Document, _company: &CompanyMeta) -> Result<Vec<RawCandidate>> {
        let text = &doc.text_content;
        let mut ranges: Vec<_> = doc
            .sections()
            .into_iter()
            .filter(|s| {
                let heading = s.heading.to_lowercase();
                TEAM_HEADINGS.iter().any(|h| heading.contains(h))
            })
            .map(|s| s.start..s.end)
            .collect();

        if ranges.is_empty() && doc.kind() == DocumentKind::Team {
            ranges.push(0..text.len());
        }

        let matches = ranges
            .into_iter()
            .flat_map(|r| find_names(text, r))
            .collect();

        Ok(dedup_by_position(matches)
            .iter()
            .map(|m| to_candidate(doc, m, StrategySource::TeamPage, CONFIDENCE, self.context_chars))
            .collect())
    }
}
