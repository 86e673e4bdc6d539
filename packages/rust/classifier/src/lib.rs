//! Person-vs-business name classification.
//!
//! [`NameClassifier::classify`] scores a candidate string for "is this a real
//! person's name" using the lexicons in [`lexicon`]. It is deterministic and
//! stateless: the same name and context always give the same
//! [`PersonClassification`], whatever order candidates are classified in.
//!
//! No candidate reaches the deduplicator without passing this gate.

pub mod lexicon;
pub mod normalize;

use std::sync::LazyLock;

use execscout_shared::text::{contains_term, word_string};
use execscout_shared::{ClassifierConfig, PersonClassification};
use regex::Regex;

use lexicon::{
    BIOGRAPHICAL_MARKERS, ROLE_TERMS, is_business_phrase, is_business_term, is_honorific,
    normalize_token,
};

pub use normalize::{
    canonical_given_name, comparison_key, given_name_variants, name_parts, normalize_name,
};

/// `Given [Middle|M.] Surname`, surnames with Mc/Mac/O'/D' prefixes and
/// hyphen or apostrophe parts.
static PERSON_SHAPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Z][a-z]+(?:-[A-Z][a-z]+)?(?: [A-Z]\.?| [A-Z][a-z]+)? (?:Ma?c|O'|D')?[A-Z][a-z]+(?:[-'][A-Z][a-z]+)?$",
    )
    .expect("valid regex")
});

/// `M. Surname` / `M. J. Surname`.
static INITIAL_SHAPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z]\.?(?: [A-Z]\.?)? (?:Ma?c|O'|D')?[A-Z][a-z]+(?:[-'][A-Z][a-z]+)?$")
        .expect("valid regex")
});

/// Scores candidate strings against the configured weights.
#[derive(Debug, Clone, Default)]
pub struct NameClassifier {
    config: ClassifierConfig,
}

impl NameClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify `name`, using `context` (the text around it) for biographical
    /// and role evidence.
    pub fn classify(&self, name: &str, context: &str) -> PersonClassification {
        let cfg = &self.config;
        let mut score = cfg.base_score;
        let mut reasons: Vec<String> = Vec::new();

        let all_tokens: Vec<&str> = name.split_whitespace().collect();
        let honorifics = all_tokens.iter().take_while(|t| is_honorific(t)).count();
        let tokens = &all_tokens[honorifics..];
        if honorifics > 0 {
            reasons.push("honorific prefix ignored".into());
        }
        let bare = tokens.join(" ");

        // Shape penalties
        if tokens.len() > 4 {
            score -= cfg.token_count_penalty;
            reasons.push(format!("-{:.2} more than four tokens", cfg.token_count_penalty));
        } else if tokens.len() < 2 {
            score -= cfg.single_token_penalty;
            reasons.push(format!("-{:.2} single token", cfg.single_token_penalty));
        }
        if bare.chars().any(|c| c.is_ascii_digit()) {
            score -= cfg.digit_penalty;
            reasons.push(format!("-{:.2} contains digits", cfg.digit_penalty));
        }
        if bare
            .chars()
            .any(|c| !(c.is_alphanumeric() || c.is_whitespace() || matches!(c, '.' | '-' | '\'')))
        {
            score -= cfg.symbol_penalty;
            reasons.push(format!("-{:.2} contains symbols", cfg.symbol_penalty));
        }

        // Lexicon penalties on the name itself
        let mut name_overlap = false;
        for token in tokens {
            if is_business_term(token) {
                name_overlap = true;
                score -= cfg.name_term_penalty;
                reasons.push(format!(
                    "-{:.2} name token '{}' is a business/service term",
                    cfg.name_term_penalty,
                    normalize_token(token)
                ));
            }
        }
        if is_business_phrase(&bare) {
            name_overlap = true;
            score -= cfg.name_phrase_penalty;
            reasons.push(format!("-{:.2} name is a service phrase", cfg.name_phrase_penalty));
        }

        // Pattern bonus
        if PERSON_SHAPE_RE.is_match(&bare) || INITIAL_SHAPE_RE.is_match(&bare) {
            score += cfg.pattern_bonus;
            reasons.push(format!("+{:.2} person-name shape", cfg.pattern_bonus));
        }

        // Context evidence, ignoring the name's own words
        let own: Vec<String> = tokens.iter().map(|t| normalize_token(t)).collect();
        let words = word_string(context);
        let context_words: Vec<&str> = words
            .split_whitespace()
            .filter(|w| !own.iter().any(|o| o == w))
            .collect();

        let roles: Vec<&str> = ROLE_TERMS
            .iter()
            .copied()
            .filter(|t| contains_term(&words, t))
            .collect();

        let mut business_hits: Vec<&str> = context_words
            .iter()
            .copied()
            .filter(|w| is_business_term(w))
            .collect();
        business_hits.sort_unstable();
        business_hits.dedup();
        if !business_hits.is_empty() {
            // A trade word next to "owner" describes the business, not the name.
            if !name_overlap && !roles.is_empty() {
                reasons.push(format!(
                    "business terms in context ignored beside a role ({})",
                    business_hits.join(", ")
                ));
            } else {
                let penalty = (cfg.context_term_penalty * business_hits.len() as f64)
                    .min(cfg.context_penalty_cap);
                score -= penalty;
                reasons.push(format!(
                    "-{penalty:.2} business terms in context ({})",
                    business_hits.join(", ")
                ));
            }
        }

        if !roles.is_empty() {
            let bonus = (cfg.role_bonus * roles.len() as f64).min(cfg.role_bonus_cap);
            score += bonus;
            reasons.push(format!("+{bonus:.2} role terms in context ({})", roles.join(", ")));
        }

        let bio: Vec<&str> = BIOGRAPHICAL_MARKERS
            .iter()
            .copied()
            .filter(|t| contains_term(&words, t))
            .collect();
        if !bio.is_empty() {
            let bonus =
                (cfg.biographical_bonus * bio.len() as f64).min(cfg.biographical_bonus_cap);
            score += bonus;
            reasons.push(format!(
                "+{bonus:.2} biographical markers in context ({})",
                bio.join(", ")
            ));
        }

        let person_probability = score.clamp(0.0, 1.0);
        let rejected = person_probability < cfg.acceptance_threshold;
        if rejected {
            reasons.push(format!(
                "rejected: {person_probability:.2} below threshold {:.2}",
                cfg.acceptance_threshold
            ));
        }

        PersonClassification {
            candidate_name: name.to_string(),
            person_probability,
            rejected,
            reasons,
        }
    }
}
