//! Core pipeline and domain logic for ExecScout.
//!
//! This crate ties discovery, classification, attribution and scoring into
//! the end-to-end company workflow ([`ExecutiveFinder::process_company`]).
//! It also owns the two stages that need the full candidate set: the
//! [`merge`] deduplicator and the [`scoring`] quality scorer.

pub mod merge;
pub mod pipeline;
pub mod scoring;

pub use merge::{ClassifiedCandidate, Merger};
pub use pipeline::{
    CompanyJob, CompanyResult, ExecutiveFinder, ProgressReporter, SilentProgress,
};
pub use scoring::QualityScorer;
