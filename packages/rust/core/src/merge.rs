//! Deduplication of classified candidates into one record per person.
//!
//! Candidates are grouped by [`comparison_key`], so `M Zubair` and
//! `Mr. M. Zubair` or `Bob Clarke` and `Robert Clarke` land together.

use std::collections::{BTreeMap, BTreeSet};

use execscout_classifier::{comparison_key, normalize_name};
use execscout_shared::{MergeConfig, MergedCandidate, PersonClassification, RawCandidate};
use tracing::debug;

/// A raw candidate together with its classifier verdict.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedCandidate {
    pub candidate: RawCandidate,
    pub classification: PersonClassification,
}

impl ClassifiedCandidate {
    fn seen_at(&self) -> (usize, usize) {
        (
            self.candidate.document_index,
            self.candidate.document_position,
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct Merger {
    config: MergeConfig,
}

impl Merger {
    pub fn new(config: MergeConfig) -> Self {
        Self { config }
    }

    /// Merge accepted candidates into one [`MergedCandidate`] per person.
    ///
    /// Rejected classifications are dropped. Output is ordered by merged
    /// confidence (descending), then first sighting, then name.
    pub fn merge(&self, candidates: Vec<ClassifiedCandidate>) -> Vec<MergedCandidate> {
        let mut groups: BTreeMap<String, Vec<ClassifiedCandidate>> = BTreeMap::new();
        for c in candidates {
            if c.classification.rejected {
                debug!(name = %c.candidate.name, "rejected candidate reached the merger, dropped");
                continue;
            }
            let key = comparison_key(&c.candidate.name);
            if key.is_empty() {
                continue;
            }
            groups.entry(key).or_default().push(c);
        }

        let mut merged: Vec<MergedCandidate> = groups
            .into_values()
            .map(|mut group| {
                group.sort_by(|a, b| {
                    a.seen_at()
                        .cmp(&b.seen_at())
                        .then(a.candidate.source.cmp(&b.candidate.source))
                });
                self.merge_group(&group)
            })
            .collect();

        merged.sort_by(|a, b| {
            b.merged_confidence
                .total_cmp(&a.merged_confidence)
                .then(a.first_seen.cmp(&b.first_seen))
                .then_with(|| a.canonical_name.cmp(&b.canonical_name))
        });
        merged
    }

    /// `group` is non-empty and sorted by first sighting.
    fn merge_group(&self, group: &[ClassifiedCandidate]) -> MergedCandidate {
        let member_names: BTreeSet<String> = group
            .iter()
            .map(|c| normalize_name(&c.candidate.name))
            .collect();
        let sources: BTreeSet<_> = group.iter().map(|c| c.candidate.source).collect();

        let max_confidence = group
            .iter()
            .map(|c| c.candidate.confidence)
            .fold(0.0_f64, f64::max);
        let corroboration =
            self.config.corroboration_bonus * sources.len().saturating_sub(1) as f64;
        let merged_confidence = (max_confidence + corroboration).min(1.0).max(max_confidence);

        let person_probability = group
            .iter()
            .map(|c| c.classification.person_probability)
            .fold(0.0_f64, f64::max);

        // Longest surface form, then strongest, then earliest.
        let canonical_name = group
            .iter()
            .map(|c| (normalize_name(&c.candidate.name), c.candidate.confidence))
            .reduce(|best, next| {
                let longer = next.0.chars().count() > best.0.chars().count();
                let same = next.0.chars().count() == best.0.chars().count();
                if longer || (same && next.1 > best.1) { next } else { best }
            })
            .map(|(name, _)| name)
            .unwrap_or_default();

        let best_context = group
            .iter()
            .map(|c| c.candidate.context.as_str())
            .reduce(|best, next| {
                if next.chars().count() > best.chars().count() { next } else { best }
            })
            .unwrap_or_default()
            .to_string();

        let title_guess = group
            .iter()
            .filter_map(|c| c.candidate.title_guess.as_ref().map(|t| (t, c.candidate.confidence)))
            .reduce(|best, next| if next.1 > best.1 { next } else { best })
            .map(|(title, _)| title.clone());

        let first_seen = group
            .iter()
            .map(ClassifiedCandidate::seen_at)
            .min()
            .unwrap_or_default();

        MergedCandidate {
            canonical_name,
            member_names,
            sources,
            merged_confidence,
            person_probability,
            best_context,
            title_guess,
            first_seen,
        }
    }
}
