//! Extraction strategy trait and the built-in strategies.
//!
//! Each strategy reads one document (or, for [`StrategyScope::PerCompany`]
//! strategies, the company as a whole) and proposes raw name candidates. The
//! orchestrator runs every registered strategy independently; nothing here
//! shares state between runs.

mod contact_page;
mod registry;
mod signature;
mod social_profile;
mod team_page;

use std::collections::BTreeSet;
use std::ops::Range;
use std::sync::{Arc, LazyLock};

use execscout_classifier::lexicon::{
    ROLE_TERMS, is_business_term, is_lead_in, is_location_term, is_object_term,
};
use execscout_shared::text::{ceil_boundary, context_window, floor_boundary};
use execscout_shared::{CompanyMeta, Document, RawCandidate, Result, StrategySource};
use regex::Regex;

pub use contact_page::ContactPageStrategy;
pub use registry::{NoRegistry, RegistryLookup, RegistryStrategy};
pub use signature::SignatureStrategy;
pub use social_profile::{SocialProfileStrategy, slug_to_name};
pub use team_page::TeamPageStrategy;

/// Length of the context string attached to each candidate.
pub const DEFAULT_CONTEXT_CHARS: usize = 200;

/// How far before / after a name, on its own line, a role phrase may sit to
/// count as its title.
const TITLE_LOOKBEHIND: usize = 40;
const TITLE_LOOKAHEAD: usize = 60;

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// What a strategy runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyScope {
    /// Once per accepted document.
    PerDocument,
    /// Once per company, against a synthetic document for the company root.
    PerCompany,
}

/// A name-extraction heuristic.
///
/// Implementations must be pure with respect to their inputs: the same
/// document and company always produce the same candidates in the same
/// order. `document_index` on returned candidates is filled in by the
/// orchestrator.
pub trait ExtractionStrategy: Send + Sync {
    /// Human-readable strategy name for tracing and warnings.
    fn name(&self) -> &str;

    /// Source tag stamped on every candidate this strategy emits.
    fn source(&self) -> StrategySource;

    fn scope(&self) -> StrategyScope {
        StrategyScope::PerDocument
    }

    /// Whether this strategy wants to see `doc` at all.
    fn accepts(&self, _doc: &Document) -> bool {
        true
    }

    /// Propose candidates from one document.
    fn extract(&self, doc: &Document, company: &CompanyMeta) -> Result<Vec<RawCandidate>>;

    /// Identity folded into discovery cache keys. Strategies that can emit
    /// different candidates for the same input must report different ids.
    fn cache_id(&self) -> String {
        self.name().to_string()
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Holds registered strategies in run order.
#[derive(Clone)]
pub struct StrategyRegistry {
    strategies: Vec<Arc<dyn ExtractionStrategy>>,
}

impl StrategyRegistry {
    /// All five built-in strategies, with the no-op registry lookup.
    pub fn new() -> Self {
        Self::with_context_chars(DEFAULT_CONTEXT_CHARS)
    }

    /// Built-in strategies producing context strings of `context_chars`.
    pub fn with_context_chars(context_chars: usize) -> Self {
        Self {
            strategies: vec![
                Arc::new(TeamPageStrategy::new(context_chars)),
                Arc::new(ContactPageStrategy::new(context_chars)),
                Arc::new(SignatureStrategy::new(context_chars)),
                Arc::new(SocialProfileStrategy::new(context_chars)),
                Arc::new(RegistryStrategy::new(Arc::new(NoRegistry))),
            ],
        }
    }

    /// A registry with no strategies at all.
    pub fn empty() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    /// Replace the registry strategy's lookup (e.g. a Companies House client).
    pub fn with_lookup(mut self, lookup: Arc<dyn RegistryLookup>) -> Self {
        self.strategies
            .retain(|s| s.source() != StrategySource::Registry);
        self.strategies.push(Arc::new(RegistryStrategy::new(lookup)));
        self
    }

    /// Append a strategy; it runs after the ones already registered.
    pub fn register(mut self, strategy: Arc<dyn ExtractionStrategy>) -> Self {
        self.strategies.push(strategy);
        self
    }

    pub fn strategies(&self) -> &[Arc<dyn ExtractionStrategy>] {
        &self.strategies
    }

    /// Cache ids of the registered strategies, in run order.
    pub fn cache_ids(&self) -> Vec<String> {
        self.strategies.iter().map(|s| s.cache_id()).collect()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Name matching shared by the text strategies
// ---------------------------------------------------------------------------

/// Optional honorific, then `Given|Initial [Middle] Surname [Third]`.
/// The `name` group excludes the honorific. Separators are spaces or tabs
/// only, so a name never spans two lines.
pub(crate) const NAME_PATTERN: &str = r"(?:\b(?:Mr|Mrs|Ms|Miss|Mx|Dr|Prof|Sir|Dame)\.?[ \t]+)?\b(?P<name>(?:[A-Z][a-z]+(?:-[A-Z][a-z]+)?|[A-Z]\.|[B-HJ-Z])(?:[ \t]+[A-Z]\.?)?[ \t]+(?:Ma?c|O'|D')?[A-Z][a-z]+(?:[-'][A-Z][a-z]+)?(?:[ \t]+(?:Ma?c|O'|D')?[A-Z][a-z]+(?:-[A-Z][a-z]+)?)?)\b";

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(NAME_PATTERN).expect("valid regex"));

static ROLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    let mut terms: Vec<&str> = ROLE_TERMS.to_vec();
    terms.sort_by_key(|t| std::cmp::Reverse(t.len()));
    let alternation = terms
        .iter()
        .map(|t| t.split(' ').map(regex::escape).collect::<Vec<_>>().join(r"[\s-]+"))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{alternation})\b")).expect("valid regex")
});

/// A cleaned name match inside a document's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NameMatch {
    pub name: String,
    pub start: usize,
    pub end: usize,
}

/// Every plausible name in `text[range]`, in text order.
pub(crate) fn find_names(text: &str, range: Range<usize>) -> Vec<NameMatch> {
    let from = floor_boundary(text, range.start);
    let to = ceil_boundary(text, range.end);
    NAME_RE
        .captures_iter(&text[from..to])
        .filter_map(|caps| {
            let m = caps.name("name")?;
            refine(m.as_str(), from + m.start())
        })
        .collect()
}

/// Clean a raw regex match found at byte `offset`.
///
/// Strips lead-in words ("Meet", "Contact", ...), drops a trailing third
/// token that is a business, location or role word, and rejects anything
/// left with fewer than two tokens, containing a location/object term, or
/// made only of role words ("Managing Director").
pub(crate) fn refine(raw: &str, offset: usize) -> Option<NameMatch> {
    let spans = token_spans(raw);
    let mut lo = 0;
    let mut hi = spans.len();

    while lo < hi && is_lead_in(&raw[spans[lo].clone()]) {
        lo += 1;
    }
    while hi - lo > 2 {
        let last = &raw[spans[hi - 1].clone()];
        if is_business_term(last) || is_location_term(last) || is_role_word(last) {
            hi -= 1;
        } else {
            break;
        }
    }
    if hi - lo < 2 {
        return None;
    }

    let (start, end) = (spans[lo].start, spans[hi - 1].end);
    let name = &raw[start..end];
    if name
        .split_whitespace()
        .any(|t| is_location_term(t) || is_object_term(t))
        || name.split_whitespace().all(is_role_word)
    {
        return None;
    }

    Some(NameMatch {
        name: name.to_string(),
        start: offset + start,
        end: offset + end,
    })
}

fn token_spans(s: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut start: Option<usize> = None;
    for (i, c) in s.char_indices() {
        match (c.is_whitespace(), start) {
            (true, Some(st)) => {
                spans.push(st..i);
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(st) = start {
        spans.push(st..s.len());
    }
    spans
}

fn is_role_word(token: &str) -> bool {
    let t = token.to_lowercase();
    ROLE_TERMS
        .iter()
        .any(|term| term.split(' ').any(|w| w == t))
}

/// The role phrase belonging to the name at `start..end`.
///
/// Only the name's own line is searched: first the text after the name (up
/// to 60 characters), then the text before it (up to 40). Failing that, a
/// following line holding nothing but a role ("Robert Clarke\nDirector")
/// is taken. Roles on earlier lines belong to someone else.
pub(crate) fn guess_title(text: &str, start: usize, end: usize) -> Option<String> {
    let line_start = text[..start].rfind('\n').map_or(0, |i| i + 1);
    let line_end = text[end..].find('\n').map_or(text.len(), |i| end + i);
    let from = floor_boundary(text, line_start.max(start.saturating_sub(TITLE_LOOKBEHIND)));
    let to = ceil_boundary(text, line_end.min(end.saturating_add(TITLE_LOOKAHEAD)));

    let after = || ROLE_RE.find(&text[end..to]).map(|m| m.as_str());
    let before = || ROLE_RE.find_iter(&text[from..start]).last().map(|m| m.as_str());
    let next_line = || {
        let rest = text.get(line_end + 1..)?;
        let line = rest.lines().next()?.trim();
        ROLE_RE
            .find(line)
            .filter(|m| m.start() == 0 && m.end() == line.len())
            .map(|m| m.as_str())
    };

    after().or_else(before).or_else(next_line).map(title_case)
}

/// `"managing  director"` → `"Managing Director"`, `"co-owner"` →
/// `"Co-Owner"`, acronyms upper-cased.
pub(crate) fn title_case(title: &str) -> String {
    title
        .split_whitespace()
        .map(|word| {
            let lower = word.to_lowercase();
            if matches!(lower.as_str(), "ceo" | "cfo" | "coo" | "cto" | "md") {
                return lower.to_uppercase();
            }
            let mut out = String::with_capacity(word.len());
            let mut capitalize = true;
            for c in lower.chars() {
                if capitalize {
                    out.extend(c.to_uppercase());
                } else {
                    out.push(c);
                }
                capitalize = c == '-';
            }
            out
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Build a candidate for `m`. `document_index` is left at zero for the
/// orchestrator to fill in.
pub(crate) fn to_candidate(
    doc: &Document,
    m: &NameMatch,
    source: StrategySource,
    confidence: f64,
    context_chars: usize,
) -> RawCandidate {
    let text = &doc.text_content;
    RawCandidate {
        name: m.name.clone(),
        source,
        confidence,
        context: context_window(text, m.start, m.end, context_chars),
        document_index: 0,
        document_position: m.start,
        title_guess: guess_title(text, m.start, m.end),
    }
}

/// Drop repeat matches of the same span, keeping the first.
pub(crate) fn dedup_by_position(matches: Vec<NameMatch>) -> Vec<NameMatch> {
    let mut seen = BTreeSet::new();
    matches
        .into_iter()
        .filter(|m| seen.insert(m.start))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(text: &str) -> Vec<String> {
        find_names(text, 0..text.len())
            .into_iter()
            .map(|m| m.name)
            .collect()
    }

    #[test]
    fn finds_plain_and_initial_names() {
        assert_eq!(names("Owner of the Business: Mr M Zubair"), vec!["M Zubair"]);
        assert_eq!(names("Contact M. Zubair today"), vec!["M. Zubair"]);
        assert_eq!(
            names("Sarah Jones - Managing Director\nDavid Patel - Operations Manager"),
            vec!["Sarah Jones", "David Patel"]
        );
        assert_eq!(names("Kevin O'Brien and David McAllister"), vec!["Kevin O'Brien", "David McAllister"]);
    }

    #[test]
    fn names_never_span_lines() {
        assert_eq!(names("Many thanks,\nRobert Clarke\nDirector"), vec!["Robert Clarke"]);
    }

    #[test]
    fn strips_lead_in_and_trailing_role_words() {
        let found = find_names("Meet Sarah Jones today", 0..22);
        assert_eq!(found[0].name, "Sarah Jones");
        assert_eq!(found[0].start, 5);
        assert_eq!(names("Sarah Jones Managing\nDirector"), vec!["Sarah Jones"]);
    }

    #[test]
    fn drops_locations_objects_and_fragments() {
        assert!(names("serving the West Midlands").is_empty());
        assert!(names("Contact Us").is_empty());
        assert!(names("Our Services").is_empty());
        assert!(names("Replacement Radiator Valves").is_empty());
        assert!(names("A Great service").is_empty());
    }

    #[test]
    fn leaves_business_phrases_to_the_classifier() {
        assert_eq!(names("Gas Safe registered"), vec!["Gas Safe"]);
    }

    #[test]
    fn guesses_title_from_the_names_own_line() {
        let text = "Sarah Jones - Managing Director\nSarah founded the company.";
        assert_eq!(guess_title(text, 0, 11).as_deref(), Some("Managing Director"));

        let text = "Speak to Gary Thompson, owner and lead engineer.";
        let start = text.find("Gary").unwrap();
        assert_eq!(guess_title(text, start, start + 13).as_deref(), Some("Owner"));

        let text = "Owner of the Business: Mr M Zubair";
        let start = text.find("M Zubair").unwrap();
        assert_eq!(guess_title(text, start, start + 8).as_deref(), Some("Owner"));

        let text = "For quotes please contact Bob Clarke on 020 8123 9999.";
        let start = text.find("Bob").unwrap();
        assert_eq!(guess_title(text, start, start + 10), None);
    }

    #[test]
    fn previous_lines_role_is_not_inherited() {
        let text = "Sarah Jones - Managing Director\nDavid Patel - Office Manager\nTom Baker";
        let david = text.find("David").unwrap();
        assert_eq!(guess_title(text, david, david + 11).as_deref(), Some("Office Manager"));

        let tom = text.find("Tom").unwrap();
        assert_eq!(guess_title(text, tom, tom + 9), None);

        let text = "Owner: Gary Thompson\nPriya Sharma";
        let priya = text.find("Priya").unwrap();
        assert_eq!(guess_title(text, priya, priya + 12), None);
    }

    #[test]
    fn role_on_the_following_line_counts_only_alone() {
        let text = "Many thanks,\nRobert Clarke\nDirector\nrobert.clarke@example.co.uk";
        let start = text.find("Robert").unwrap();
        assert_eq!(guess_title(text, start, start + 13).as_deref(), Some("Director"));

        let text = "Robert Clarke\nOur director will call you back.";
        assert_eq!(guess_title(text, 0, 13), None);
    }

    #[test]
    fn title_casing() {
        assert_eq!(title_case("managing  director"), "Managing Director");
        assert_eq!(title_case("co-owner"), "Co-Owner");
        assert_eq!(title_case("ceo"), "CEO");
    }

    #[test]
    fn registry_holds_all_built_ins() {
        let registry = StrategyRegistry::new();
        let sources: Vec<StrategySource> =
            registry.strategies().iter().map(|s| s.source()).collect();
        assert_eq!(
            sources,
            vec![
                StrategySource::TeamPage,
                StrategySource::ContactPage,
                StrategySource::Signature,
                StrategySource::SocialProfile,
                StrategySource::Registry,
            ]
        );
        assert_eq!(StrategyRegistry::empty().len(), 0);
    }

    #[test]
    fn cache_ids_follow_context_length_and_lookup() {
        struct Officers;
        impl RegistryLookup for Officers {
            fn officers(&self, _company: &CompanyMeta) -> Result<Vec<RawCandidate>> {
                Ok(Vec::new())
            }
        }

        let base = StrategyRegistry::new().cache_ids();
        assert_eq!(base, StrategyRegistry::new().cache_ids());
        assert_eq!(base[0], "team_page:200");
        assert_ne!(base, StrategyRegistry::with_context_chars(120).cache_ids());
        assert_ne!(base, StrategyRegistry::new().with_lookup(Arc::new(Officers)).cache_ids());
    }
}
