//! Social-profile strategy: names recovered from LinkedIn profile slugs.
//!
//! Links are found in the visible text and in `href`s of the markup. A link
//! that only appears in markup is positioned at the end of the text.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use execscout_shared::text::context_window;
use execscout_shared::{CompanyMeta, Document, RawCandidate, Result, StrategySource};
use regex::Regex;

use super::{ExtractionStrategy, guess_title, refine};

const CONFIDENCE: f64 = 0.7;

static LINKEDIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)https?://(?:[a-z]{2,3}\.)?linkedin\.com/(?:in|pub)/([A-Za-z0-9_.%\-]+)/?")
        .expect("valid regex")
});

pub struct SocialProfileStrategy {
    context_chars: usize,
}

impl SocialProfileStrategy {
    pub fn new(context_chars: usize) -> Self {
        Self { context_chars }
    }
}

impl ExtractionStrategy for SocialProfileStrategy {
    fn name(&self) -> &str {
        "social_profile"
    }

    fn source(&self) -> StrategySource {
        StrategySource::SocialProfile
    }

    fn cache_id(&self) -> String {
        format!("{}:{}", self.name(), self.context_chars)
    }

    fn extract(&self, doc: &Document, _company: &CompanyMeta) -> Result<Vec<RawCandidate>> {
        let text = &doc.text_content;
        let mut out = Vec::new();
        let mut seen_slugs = BTreeSet::new();

        let in_text = LINKEDIN_RE.captures_iter(text).filter_map(|caps| {
            let whole = caps.get(0)?;
            Some((caps[1].to_string(), Some((whole.start(), whole.end()))))
        });
        let in_markup = LINKEDIN_RE
            .captures_iter(&doc.raw_markup)
            .map(|caps| (caps[1].to_string(), None));

        for (slug, span) in in_text.chain(in_markup) {
            if !seen_slugs.insert(slug.to_lowercase()) {
                continue;
            }
            let Some(name) = slug_to_name(&slug) else { continue };
            // Same lexicon filter the text strategies apply.
            let Some(found) = refine(&name, 0) else { continue };

            let (start, end) = span.unwrap_or((text.len(), text.len()));
            out.push(RawCandidate {
                name: found.name,
                source: StrategySource::SocialProfile,
                confidence: CONFIDENCE,
                context: match span {
                    Some(_) => context_window(text, start, end, self.context_chars),
                    None => format!("linkedin profile: {slug}"),
                },
                document_index: 0,
                document_position: start,
                title_guess: span.and_then(|_| guess_title(text, start, end)),
            });
        }

        Ok(out)
    }
}

/// `"sarah-jones-4a1b2c3"` → `"Sarah Jones"`.
///
/// Trailing parts containing digits (LinkedIn's disambiguation suffixes) are
/// dropped; what remains must be two or three alphabetic parts.
pub fn slug_to_name(slug: &str) -> Option<String> {
    let mut parts: Vec<&str> = slug
        .trim_end_matches('/')
        .split(['-', '_', '.'])
        .filter(|p| !p.is_empty())
        .collect();
    while parts
        .last()
        .is_some_and(|p| p.chars().any(|c| c.is_ascii_digit()))
    {
        parts.pop();
    }
    if !(2..=3).contains(&parts.len())
        || parts.iter().any(|p| !p.chars().all(|c| c.is_alphabetic()))
    {
        return None;
    }

    Some(
        parts
            .iter()
            .map(|p| {
                let mut chars = p.chars();
                match chars.next() {
                    Some(first) => {
                        first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                    }
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_to_names() {
        assert_eq!(slug_to_name("sarah-jones-4a1b2c3").as_deref(), Some("Sarah Jones"));
        assert_eq!(slug_to_name("gary-thompson/").as_deref(), Some("Gary Thompson"));
        assert_eq!(slug_to_name("jsmith1984"), None);
        assert_eq!(slug_to_name("one-two-three-four"), None);
    }
}
