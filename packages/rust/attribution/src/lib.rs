//! Contact attribution: linking emails, phones, and profiles to people.
//!
//! [`ContactAttributor::attribute`] runs the four methods as rounds in
//! precedence order. Each round visits candidates by merged confidence
//! (highest first) and lets every candidate claim at most one unclaimed token
//! per contact kind. A token, identified by its normalized value, is claimed
//! at most once, so a name-pattern match can never be stolen by a nearer
//! proximity match.

pub mod tokens;

use std::collections::{BTreeMap, HashSet};
use std::ops::Range;

use execscout_classifier::lexicon::is_decision_maker_title;
use execscout_classifier::{given_name_variants, name_parts};
use execscout_shared::text::signature_closings;
use execscout_shared::{
    AttributedContact, AttributionConfig, AttributionMethod, CompanyMeta, ContactKind,
    ContactToken, Document, MergedCandidate,
};
use regex::Regex;
use tracing::{debug, instrument};

pub use tokens::{document_tokens, extract_tokens};

const NAME_MATCH_BASE: f64 = 0.85;
const NAME_MATCH_STEP: f64 = 0.05;
const NAME_MATCH_CAP: f64 = 0.95;
const SIGNATURE_CEILING: f64 = 0.85;
const SIGNATURE_FLOOR: f64 = 0.8;
/// A name must start this close after a sign-off to own it.
const SIGNATURE_NAME_REACH: usize = 60;

const METHODS: [AttributionMethod; 4] = [
    AttributionMethod::NamePatternMatch,
    AttributionMethod::SignatureAdjacency,
    AttributionMethod::ProximityWindow,
    AttributionMethod::RoleFallback,
];

// ---------------------------------------------------------------------------
// Attributor
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct ContactAttributor {
    config: AttributionConfig,
}

impl ContactAttributor {
    pub fn new(config: AttributionConfig) -> Self {
        Self { config }
    }

    /// Assign `tokens` (from [`extract_tokens`] over `documents`) to
    /// `candidates`.
    ///
    /// Output is grouped by candidate in confidence order, then by kind.
    #[instrument(skip_all, fields(company = %company.name, candidates = candidates.len(), tokens = tokens.len()))]
    pub fn attribute(
        &self,
        candidates: &[MergedCandidate],
        tokens: &[ContactToken],
        documents: &[Document],
        company: &CompanyMeta,
    ) -> Vec<AttributedContact> {
        let mut order: Vec<&MergedCandidate> = candidates.iter().collect();
        order.sort_by(|a, b| {
            b.merged_confidence
                .total_cmp(&a.merged_confidence)
                .then(a.first_seen.cmp(&b.first_seen))
        });
        let subjects: Vec<Subject<'_>> = order
            .into_iter()
            .map(|c| Subject::new(c, documents))
            .collect();

        let mut claimed: HashSet<(ContactKind, String)> = HashSet::new();
        let mut assigned: BTreeMap<(usize, ContactKind), AttributedContact> = BTreeMap::new();

        for method in METHODS {
            for (rank, subject) in subjects.iter().enumerate() {
                for kind in ContactKind::ALL {
                    if assigned.contains_key(&(rank, kind)) {
                        continue;
                    }
                    let open: Vec<&ContactToken> = tokens
                        .iter()
                        .filter(|t| t.kind == kind && !claimed.contains(&t.claim_key()))
                        .collect();
                    if open.is_empty() {
                        continue;
                    }

                    let found = match method {
                        AttributionMethod::NamePatternMatch => {
                            self.by_name_pattern(subject, &open, company)
                        }
                        AttributionMethod::SignatureAdjacency => {
                            self.by_signature(subject, &open, documents)
                        }
                        AttributionMethod::ProximityWindow => self.by_proximity(subject, &open),
                        AttributionMethod::RoleFallback => self.by_role(subject, &open),
                    };

                    if let Some((token, confidence)) = found {
                        debug!(
                            candidate = %subject.candidate.canonical_name,
                            ?kind,
                            ?method,
                            value = %token.value,
                            confidence,
                            "contact attributed"
                        );
                        claimed.insert(token.claim_key());
                        assigned.insert(
                            (rank, kind),
                            AttributedContact {
                                candidate: subject.candidate.canonical_name.clone(),
                                token: token.clone(),
                                method,
                                confidence,
                            },
                        );
                    }
                }
            }
        }

        assigned.into_values().collect()
    }

    /// Email local part or profile slug spells the candidate's name.
    fn by_name_pattern<'t>(
        &self,
        subject: &Subject<'_>,
        open: &[&'t ContactToken],
        company: &CompanyMeta,
    ) -> Option<(&'t ContactToken, f64)> {
        let (first, last) = subject.parts.as_ref()?;
        best(open.iter().filter_map(|&token| {
            let (handle, own_domain) = match token.kind {
                ContactKind::Email => {
                    let (local, domain) = token.value.rsplit_once('@')?;
                    (local.to_lowercase(), company.owns_domain(domain))
                }
                ContactKind::SocialProfile => {
                    let slug = token.value.trim_end_matches('/').rsplit('/').next()?;
                    (slug.to_lowercase(), false)
                }
                ContactKind::Phone => return None,
            };

            let segments: Vec<&str> = handle
                .split(|c: char| !c.is_alphabetic())
                .filter(|s| !s.is_empty())
                .collect();
            let last_hit = last.chars().count() >= 2
                && segments
                    .iter()
                    .any(|s| surname_in_segment(s, last, first, &subject.given_variants));
            let first_hit = if first.chars().count() == 1 {
                // Initials only count next to the surname ("m.zubair", "mzubair").
                last_hit && segments.first().is_some_and(|s| s.starts_with(first.as_str()))
            } else {
                segments.iter().any(|s| {
                    subject
                        .given_variants
                        .iter()
                        .any(|v| v.chars().count() >= 2 && s.starts_with(v.as_str()))
                })
            };
            if !(first_hit || last_hit) {
                return None;
            }

            let mut confidence = NAME_MATCH_BASE;
            if first_hit && last_hit {
                confidence += NAME_MATCH_STEP;
            }
            if own_domain {
                confidence += NAME_MATCH_STEP;
            }
            Some((token, confidence.min(NAME_MATCH_CAP)))
        }))
    }

    /// Token inside the signature block that follows a sign-off naming the
    /// candidate.
    fn by_signature<'t>(
        &self,
        subject: &Subject<'_>,
        open: &[&'t ContactToken],
        documents: &[Document],
    ) -> Option<(&'t ContactToken, f64)> {
        let window = self.config.signature_window.max(1);
        let mut hits = Vec::new();

        for (index, doc) in documents.iter().enumerate() {
            let Some(occurrences) = subject.occurrences.get(index) else { continue };
            for closing in signature_closings(&doc.text_content) {
                let signed = occurrences
                    .iter()
                    .any(|o| o.start >= closing.end && o.start - closing.end <= SIGNATURE_NAME_REACH);
                if !signed {
                    continue;
                }
                for &token in open.iter().filter(|t| t.document_index == index) {
                    let pos = token.document_position;
                    if pos < closing.end || pos - closing.end > window {
                        continue;
                    }
                    let distance = (pos - closing.end) as f64 / window as f64;
                    let confidence =
                        SIGNATURE_CEILING - (SIGNATURE_CEILING - SIGNATURE_FLOOR) * distance;
                    hits.push((token, confidence));
                }
            }
        }
        best(hits.into_iter())
    }

    /// Nearest token to any occurrence of the candidate's name, confidence
    /// decaying linearly from the ceiling to the floor across the window.
    fn by_proximity<'t>(
        &self,
        subject: &Subject<'_>,
        open: &[&'t ContactToken],
    ) -> Option<(&'t ContactToken, f64)> {
        let cfg = &self.config;
        let window = cfg.proximity_window.max(1);

        let nearest = open
            .iter()
            .filter_map(|&token| {
                let occurrences = subject.occurrences.get(token.document_index)?;
                let start = token.document_position;
                let end = start + token.value.len();
                occurrences
                    .iter()
                    .map(|o| gap(o, start..end))
                    .min()
                    .filter(|d| *d <= window)
                    .map(|d| (d, token))
            })
            .min_by(|(da, ta), (db, tb)| da.cmp(db).then(position(ta).cmp(&position(tb))))?;

        let (distance, token) = nearest;
        let decay = (cfg.proximity_ceiling - cfg.proximity_floor) * distance as f64 / window as f64;
        Some((token, (cfg.proximity_ceiling - decay).max(cfg.proximity_floor)))
    }

    /// Decision-makers take the company's first unclaimed token of the kind.
    fn by_role<'t>(
        &self,
        subject: &Subject<'_>,
        open: &[&'t ContactToken],
    ) -> Option<(&'t ContactToken, f64)> {
        if !subject.decision_maker {
            return None;
        }
        open.iter()
            .min_by_key(|t| position(t))
            .map(|&t| (t, self.config.role_fallback_confidence))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// A candidate with its searchable name forms precomputed.
struct Subject<'a> {
    candidate: &'a MergedCandidate,
    /// Lower-case first and last name tokens.
    parts: Option<(String, String)>,
    given_variants: Vec<String>,
    /// Byte ranges of any of the candidate's names, per document.
    occurrences: Vec<Vec<Range<usize>>>,
    decision_maker: bool,
}

impl<'a> Subject<'a> {
    fn new(candidate: &'a MergedCandidate, documents: &[Document]) -> Self {
        let parts = name_parts(&candidate.canonical_name);
        let mut given_variants: Vec<String> = Vec::new();
        for name in candidate.search_names() {
            if let Some((first, _)) = name_parts(name) {
                for v in given_name_variants(&first) {
                    if !given_variants.contains(&v) {
                        given_variants.push(v);
                    }
                }
            }
        }

        let pattern = name_pattern(&candidate.search_names());
        let occurrences = documents
            .iter()
            .map(|doc| match &pattern {
                Some(re) => re.find_iter(&doc.text_content).map(|m| m.range()).collect(),
                None => Vec::new(),
            })
            .collect();

        Self {
            candidate,
            parts,
            given_variants,
            occurrences,
            decision_maker: candidate
                .title_guess
                .as_deref()
                .is_some_and(is_decision_maker_title),
        }
    }
}

/// The surname fills a handle segment, alone or glued to the given name or
/// its initial ("zubair", "mzubair", "garythompson", "thompsong").
fn surname_in_segment(segment: &str, last: &str, first: &str, given_variants: &[String]) -> bool {
    let glued = |rest: &str| {
        rest.is_empty()
            || (rest.chars().count() == 1 && first.starts_with(rest))
            || given_variants.iter().any(|v| v == rest)
    };
    segment.strip_prefix(last).is_some_and(glued) || segment.strip_suffix(last).is_some_and(glued)
}

/// Case-insensitive alternation of `names`, whitespace-flexible. Dots after
/// initials are optional, so `M. Zubair` also finds `M Zubair`.
fn name_pattern(names: &[&str]) -> Option<Regex> {
    let alternatives: Vec<String> = names
        .iter()
        .map(|n| {
            n.split_whitespace()
                .map(|token| match token.strip_suffix('.') {
                    Some(bare) => format!(r"{}\.?", regex::escape(bare)),
                    None => regex::escape(token),
                })
                .collect::<Vec<_>>()
                .join(r"\s+")
        })
        .filter(|a| !a.is_empty())
        .collect();
    if alternatives.is_empty() {
        return None;
    }
    Regex::new(&format!(r"(?i)\b(?:{})\b", alternatives.join("|"))).ok()
}

/// Characters between two spans; zero when they overlap.
fn gap(a: &Range<usize>, b: Range<usize>) -> usize {
    if b.start >= a.end {
        b.start - a.end
    } else if a.start >= b.end {
        a.start - b.end
    } else {
        0
    }
}

fn position(token: &ContactToken) -> (usize, usize) {
    (token.document_index, token.document_position)
}

/// Highest confidence, then earliest position.
fn best<'t>(
    hits: impl Iterator<Item = (&'t ContactToken, f64)>,
) -> Option<(&'t ContactToken, f64)> {
    hits.fold(None, |acc, (token, confidence)| match acc {
        Some((kept, kept_conf))
            if kept_conf > confidence
                || (kept_conf == confidence && position(kept) <= position(token)) =>
        {
            Some((kept, kept_conf))
        }
        _ => Some((token, confidence)),
    })
}
