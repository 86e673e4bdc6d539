//! Shared types, error model, and configuration for ExecScout.
//!
//! This crate is the foundation depended on by all other ExecScout crates.
//! It provides:
//! - [`ExecScoutError`]: the unified error type
//! - The pipeline data model ([`RawCandidate`], [`MergedCandidate`], [`ExecutiveProfile`], ...)
//! - [`Document`] and its section/kind helpers
//! - Configuration ([`AppConfig`] and its per-stage sections, config loading)

pub mod config;
pub mod document;
pub mod error;
pub mod text;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, AttributionConfig, ClassifierConfig, DiscoveryConfig, MergeConfig, ScoringConfig,
    config_dir, config_file_path, init_config, load_config, load_config_from,
};
pub use document::{Document, DocumentKind, Section};
pub use error::{ExecScoutError, Result};
pub use types::{
    AttributedContact, AttributionMethod, CompanyMeta, CompanyReport, ContactKind, ContactToken,
    ExecutiveProfile, Grade, MergedCandidate, PersonClassification, ProcessingWarning,
    QualityMetrics, QualityTier, RawCandidate, StrategySource, WarningKind, normalize_contact,
};
