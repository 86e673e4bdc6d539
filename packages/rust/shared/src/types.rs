//! Core domain types flowing through the discovery → attribution → scoring pipeline.
//!
//! Every stage fully constructs its output before handing it, by value, to the
//! next one. Nothing here is mutated after construction.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CompanyMeta
// ---------------------------------------------------------------------------

/// Caller-supplied company metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyMeta {
    /// Trading name, e.g. "MS Heating and Plumbing".
    pub name: String,
    /// Primary web domain, e.g. `msheatingandplumbing.co.uk`.
    pub domain: String,
}

impl CompanyMeta {
    pub fn new(name: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            domain: domain.into(),
        }
    }

    /// Whether `host` is the company's domain (or a subdomain of it).
    pub fn owns_domain(&self, host: &str) -> bool {
        let own = bare_domain(&self.domain);
        let host = bare_domain(host);
        if own.is_empty() {
            return false;
        }
        host == own || host.ends_with(&format!(".{own}"))
    }
}

fn bare_domain(domain: &str) -> String {
    let d = domain.trim().trim_end_matches('.').to_lowercase();
    d.strip_prefix("www.").map(str::to_string).unwrap_or(d)
}

// ---------------------------------------------------------------------------
// Raw candidates
// ---------------------------------------------------------------------------

/// Which extraction strategy produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategySource {
    TeamPage,
    ContactPage,
    Signature,
    SocialProfile,
    Registry,
}

impl StrategySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TeamPage => "team_page",
            Self::ContactPage => "contact_page",
            Self::Signature => "signature",
            Self::SocialProfile => "social_profile",
            Self::Registry => "registry",
        }
    }
}

impl std::fmt::Display for StrategySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A string one strategy suspects is a person's name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCandidate {
    /// Matched name, honorific removed.
    pub name: String,
    pub source: StrategySource,
    /// Strategy confidence in `[0, 1]`.
    pub confidence: f64,
    /// Up to 200 characters of text surrounding the match.
    pub context: String,
    /// Index of the document in the company's document set.
    pub document_index: usize,
    /// Byte offset of the match in the document's text content.
    pub document_position: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_guess: Option<String>,
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Result of the Name Classifier; a pure function of name + context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonClassification {
    pub candidate_name: String,
    pub person_probability: f64,
    pub rejected: bool,
    /// Every bonus and penalty applied, in application order.
    pub reasons: Vec<String>,
}

// ---------------------------------------------------------------------------
// Merged candidates
// ---------------------------------------------------------------------------

/// One person, merged across strategies and documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedCandidate {
    pub canonical_name: String,
    /// Surface variants seen in the documents.
    pub member_names: BTreeSet<String>,
    /// Never empty.
    pub sources: BTreeSet<StrategySource>,
    /// At least the maximum confidence of any contributing raw candidate.
    pub merged_confidence: f64,
    /// Highest person probability the classifier gave any member.
    pub person_probability: f64,
    pub best_context: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_guess: Option<String>,
    /// Earliest (document index, byte offset) at which the person was seen.
    pub first_seen: (usize, usize),
}

impl MergedCandidate {
    /// All names worth searching for in document text: the canonical form and
    /// every surface variant.
    pub fn search_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = vec![self.canonical_name.as_str()];
        for member in &self.member_names {
            if member != &self.canonical_name {
                names.push(member.as_str());
            }
        }
        names
    }
}

// ---------------------------------------------------------------------------
// Contacts
// ---------------------------------------------------------------------------

/// Kind of contact detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactKind {
    Email,
    Phone,
    SocialProfile,
}

impl ContactKind {
    pub const ALL: [ContactKind; 3] = [Self::Email, Self::Phone, Self::SocialProfile];
}

/// One occurrence of a contact detail in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactToken {
    pub kind: ContactKind,
    pub value: String,
    pub document_index: usize,
    pub document_position: usize,
}

impl ContactToken {
    /// Identity used for exclusivity: two occurrences of the same address are
    /// one claimable contact.
    pub fn claim_key(&self) -> (ContactKind, String) {
        (self.kind, normalize_contact(self.kind, &self.value))
    }
}

/// Canonical comparison form of a contact value.
pub fn normalize_contact(kind: ContactKind, value: &str) -> String {
    match kind {
        ContactKind::Email => value.trim().to_lowercase(),
        ContactKind::Phone => {
            let digits: String = value.chars().filter(|c| c.is_ascii_digit()).collect();
            match digits.strip_prefix("44") {
                Some(rest) if value.trim_start().starts_with('+') => {
                    format!("0{}", rest.trim_start_matches('0'))
                }
                _ => digits,
            }
        }
        ContactKind::SocialProfile => value
            .trim()
            .to_lowercase()
            .trim_end_matches('/')
            .replace("http://", "https://"),
    }
}

/// How a contact came to be linked to a candidate, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributionMethod {
    NamePatternMatch,
    SignatureAdjacency,
    ProximityWindow,
    RoleFallback,
}

/// A contact token assigned to a merged candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributedContact {
    /// Canonical name of the owning [`MergedCandidate`].
    pub candidate: String,
    pub token: ContactToken,
    pub method: AttributionMethod,
    pub confidence: f64,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Outreach usability band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum QualityTier {
    Premium,
    High,
    Medium,
    Low,
}

impl QualityTier {
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 0.9 {
            Self::Premium
        } else if confidence >= 0.75 {
            Self::High
        } else if confidence >= 0.6 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Final per-person output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutiveProfile {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_profile: Option<String>,
    pub is_decision_maker: bool,
    pub confidence: f64,
    pub quality_tier: QualityTier,
    pub sources: BTreeSet<StrategySource>,
}

impl ExecutiveProfile {
    pub fn has_contact(&self) -> bool {
        self.email.is_some() || self.phone.is_some() || self.social_profile.is_some()
    }
}

/// Company-level letter grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.85 {
            Self::A
        } else if score >= 0.7 {
            Self::B
        } else if score >= 0.55 {
            Self::C
        } else if score >= 0.4 {
            Self::D
        } else {
            Self::F
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::F => "F",
        };
        f.write_str(s)
    }
}

/// Aggregate ratios behind a company grade.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub profile_count: usize,
    pub decision_maker_ratio: f64,
    pub contact_ratio: f64,
    pub high_confidence_ratio: f64,
}

/// Company quality report handed to the caller for storage or display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyReport {
    pub score: f64,
    pub grade: Grade,
    pub metrics: QualityMetrics,
}

impl CompanyReport {
    /// Report for a company that produced nothing usable.
    pub fn failed() -> Self {
        Self {
            score: 0.0,
            grade: Grade::F,
            metrics: QualityMetrics::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Warnings
// ---------------------------------------------------------------------------

/// Category of a soft failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    StrategyFailure,
    Timeout,
    Cache,
}

/// A recovered failure, reported next to the results instead of aborting them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingWarning {
    pub kind: WarningKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<StrategySource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn company_domain_matching() {
        let company = CompanyMeta::new("MS Heating", "www.MSHeatingAndPlumbing.co.uk");
        assert!(company.owns_domain("msheatingandplumbing.co.uk"));
        assert!(company.owns_domain("mail.msheatingandplumbing.co.uk"));
        assert!(!company.owns_domain("gmail.com"));
        assert!(!company.owns_domain("notmsheatingandplumbing.co.uk"));
    }

    #[test]
    fn phone_normalization_folds_country_code() {
        assert_eq!(normalize_contact(ContactKind::Phone, "0808 1929 786"), "08081929786");
        assert_eq!(normalize_contact(ContactKind::Phone, "+44 808 1929 786"), "08081929786");
        assert_eq!(normalize_contact(ContactKind::Phone, "+44 (0)808 1929 786"), "08081929786");
    }

    #[test]
    fn claim_key_ignores_surface_differences() {
        let a = ContactToken {
            kind: ContactKind::Email,
            value: "Gary@Example.co.uk".into(),
            document_index: 0,
            document_position: 10,
        };
        let b = ContactToken {
            value: "gary@example.co.uk".into(),
            document_index: 2,
            document_position: 99,
            ..a.clone()
        };
        assert_eq!(a.claim_key(), b.claim_key());
    }

    #[test]
    fn tier_bands() {
        assert_eq!(QualityTier::from_confidence(0.95), QualityTier::Premium);
        assert_eq!(QualityTier::from_confidence(0.9), QualityTier::Premium);
        assert_eq!(QualityTier::from_confidence(0.8), QualityTier::High);
        assert_eq!(QualityTier::from_confidence(0.6), QualityTier::Medium);
        assert_eq!(QualityTier::from_confidence(0.59), QualityTier::Low);
    }

    #[test]
    fn grade_bands() {
        assert_eq!(Grade::from_score(1.0), Grade::A);
        assert_eq!(Grade::from_score(0.7), Grade::B);
        assert_eq!(Grade::from_score(0.56), Grade::C);
        assert_eq!(Grade::from_score(0.4), Grade::D);
        assert_eq!(Grade::from_score(0.0), Grade::F);
        assert_eq!(CompanyReport::failed().grade.to_string(), "F");
    }

    #[test]
    fn profile_serialization_skips_missing_contacts() {
        let profile = ExecutiveProfile {
            name: "Jane Doe".into(),
            title: None,
            email: Some("jane@example.com".into()),
            phone: None,
            social_profile: None,
            is_decision_maker: false,
            confidence: 0.7,
            quality_tier: QualityTier::Medium,
            sources: BTreeSet::from([StrategySource::TeamPage]),
        };

        let json = serde_json::to_string(&profile).expect("serialize");
        assert!(json.contains("\"quality_tier\":\"Medium\""));
        assert!(json.contains("\"team_page\""));
        assert!(!json.contains("phone"));
        let parsed: ExecutiveProfile = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, profile);
    }
}
