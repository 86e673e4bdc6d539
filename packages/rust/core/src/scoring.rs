//! Quality scoring: per-person profiles and the company report.

use std::collections::BTreeMap;

use execscout_classifier::lexicon::is_decision_maker_title;
use execscout_shared::{
    AttributedContact, CompanyReport, ContactKind, ExecutiveProfile, Grade, MergedCandidate,
    QualityMetrics, QualityTier, ScoringConfig,
};

/// Weight of the decision-maker ratio in the company score.
pub const DECISION_MAKER_WEIGHT: f64 = 0.4;
/// Weight of the share of profiles with at least one contact.
pub const CONTACT_WEIGHT: f64 = 0.35;
/// Weight of the share of profiles at tier High or better.
pub const HIGH_CONFIDENCE_WEIGHT: f64 = 0.25;

#[derive(Debug, Clone, Default)]
pub struct QualityScorer {
    config: ScoringConfig,
}

impl QualityScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Build the profile for `candidate` from the contacts attributed to it.
    ///
    /// `contacts` may hold other candidates' contacts; only those naming
    /// `candidate` are used, one per kind.
    pub fn score(
        &self,
        candidate: &MergedCandidate,
        contacts: &[AttributedContact],
    ) -> ExecutiveProfile {
        let cfg = &self.config;

        let mut by_kind: BTreeMap<ContactKind, &AttributedContact> = BTreeMap::new();
        for contact in contacts
            .iter()
            .filter(|c| c.candidate == candidate.canonical_name)
        {
            by_kind
                .entry(contact.token.kind)
                .and_modify(|held| {
                    let stronger = contact.confidence > held.confidence;
                    let tied_earlier =
                        contact.confidence == held.confidence && contact.method < held.method;
                    if stronger || tied_earlier {
                        *held = contact;
                    }
                })
                .or_insert(contact);
        }
        let value = |kind: ContactKind| by_kind.get(&kind).map(|c| c.token.value.clone());

        let is_decision_maker = candidate
            .title_guess
            .as_deref()
            .is_some_and(is_decision_maker_title);

        let mut confidence = cfg.person_weight * candidate.person_probability
            + (1.0 - cfg.person_weight) * candidate.merged_confidence;
        for (kind, bonus) in [
            (ContactKind::Email, cfg.email_bonus),
            (ContactKind::Phone, cfg.phone_bonus),
            (ContactKind::SocialProfile, cfg.social_bonus),
        ] {
            if by_kind.contains_key(&kind) {
                confidence += bonus;
            }
        }
        if is_decision_maker {
            confidence += cfg.decision_maker_bonus;
        }
        let confidence = confidence.clamp(0.0, 1.0);

        ExecutiveProfile {
            name: candidate.canonical_name.clone(),
            title: candidate.title_guess.clone(),
            email: value(ContactKind::Email),
            phone: value(ContactKind::Phone),
            social_profile: value(ContactKind::SocialProfile),
            is_decision_maker,
            confidence,
            quality_tier: QualityTier::from_confidence(confidence),
            sources: candidate.sources.clone(),
        }
    }

    /// Aggregate `profiles` into a company score and grade.
    pub fn report(&self, profiles: &[ExecutiveProfile]) -> CompanyReport {
        if profiles.is_empty() {
            return CompanyReport::failed();
        }

        let total = profiles.len() as f64;
        let ratio = |pred: fn(&ExecutiveProfile) -> bool| {
            profiles.iter().filter(|p| pred(p)).count() as f64 / total
        };
        let metrics = QualityMetrics {
            profile_count: profiles.len(),
            decision_maker_ratio: ratio(|p| p.is_decision_maker),
            contact_ratio: ratio(ExecutiveProfile::has_contact),
            high_confidence_ratio: ratio(|p| p.quality_tier <= QualityTier::High),
        };

        let score = (DECISION_MAKER_WEIGHT * metrics.decision_maker_ratio
            + CONTACT_WEIGHT * metrics.contact_ratio
            + HIGH_CONFIDENCE_WEIGHT * metrics.high_confidence_ratio)
            .clamp(0.0, 1.0);

        CompanyReport {
            score,
            grade: Grade::from_score(score),
            metrics,
        }
    }
}
