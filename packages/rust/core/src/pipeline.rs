//! End-to-end company pipeline: documents → discovery → classification →
//! merge → attribution → scoring.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use execscout_attribution::{ContactAttributor, extract_tokens};
use execscout_classifier::NameClassifier;
use execscout_discovery::{DiscoveryCache, Orchestrator, RegistryLookup, StrategyRegistry};
use execscout_shared::{
    AppConfig, AttributedContact, CompanyMeta, CompanyReport, Document, ExecutiveProfile,
    ProcessingWarning, WarningKind,
};

use crate::merge::{ClassifiedCandidate, Merger};
use crate::scoring::QualityScorer;

/// Everything produced for one company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyResult {
    pub run_id: Uuid,
    pub company: CompanyMeta,
    /// Ordered by merged confidence, then first sighting.
    pub profiles: Vec<ExecutiveProfile>,
    /// The contact assignments behind the profiles.
    pub contacts: Vec<AttributedContact>,
    pub report: CompanyReport,
    pub warnings: Vec<ProcessingWarning>,
    pub processed_at: DateTime<Utc>,
}

impl CompanyResult {
    /// Result for a company whose inputs could not be processed at all.
    pub fn failed(company: CompanyMeta, message: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::now_v7(),
            company,
            profiles: Vec::new(),
            contacts: Vec::new(),
            report: CompanyReport::failed(),
            warnings: vec![ProcessingWarning {
                kind: WarningKind::StrategyFailure,
                strategy: None,
                document: None,
                message: message.into(),
            }],
            processed_at: Utc::now(),
        }
    }
}

/// One company queued for batch processing.
#[derive(Debug, Clone)]
pub struct CompanyJob {
    pub company: CompanyMeta,
    pub documents: Vec<Document>,
}

/// Progress callback for batch runs.
pub trait ProgressReporter: Send + Sync {
    /// Called before company `index` (zero-based) of `total` starts.
    fn company_started(&self, company: &CompanyMeta, index: usize, total: usize);
    /// Called once a company's result is ready.
    fn company_finished(&self, result: &CompanyResult, index: usize, total: usize);
    /// Called when the whole batch completes.
    fn done(&self, results: &[CompanyResult]);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn company_started(&self, _company: &CompanyMeta, _index: usize, _total: usize) {}
    fn company_finished(&self, _result: &CompanyResult, _index: usize, _total: usize) {}
    fn done(&self, _results: &[CompanyResult]) {}
}

/// The assembled engine. Holds no per-company state, so one finder can
/// serve any number of companies.
pub struct ExecutiveFinder {
    config: AppConfig,
    orchestrator: Orchestrator,
    classifier: NameClassifier,
    merger: Merger,
    attributor: ContactAttributor,
    scorer: QualityScorer,
}

impl ExecutiveFinder {
    pub fn new(config: AppConfig) -> Self {
        Self {
            orchestrator: Orchestrator::new(config.discovery.clone()),
            classifier: NameClassifier::new(config.classifier.clone()),
            merger: Merger::new(config.merge.clone()),
            attributor: ContactAttributor::new(config.attribution.clone()),
            scorer: QualityScorer::new(config.scoring.clone()),
            config,
        }
    }

    /// Reuse discovery results for unchanged inputs.
    pub fn with_cache(mut self, cache: Arc<dyn DiscoveryCache>) -> Self {
        self.orchestrator = self.orchestrator.with_cache(cache);
        self
    }

    /// Back the registry strategy with a real lookup.
    pub fn with_registry_lookup(mut self, lookup: Arc<dyn RegistryLookup>) -> Self {
        let registry =
            StrategyRegistry::with_context_chars(self.config.discovery.context_chars)
                .with_lookup(lookup);
        self.orchestrator = self.orchestrator.with_registry(registry);
        self
    }

    /// Replace the strategy set entirely.
    pub fn with_strategies(mut self, registry: StrategyRegistry) -> Self {
        self.orchestrator = self.orchestrator.with_registry(registry);
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Run the full pipeline for one company.
    ///
    /// Never fails: soft failures are returned in `warnings`, and a company
    /// where nothing survives gets an empty profile list and grade F.
    #[instrument(skip_all, fields(company = %company.name, documents = documents.len()))]
    pub async fn process_company(
        &self,
        company: &CompanyMeta,
        documents: Vec<Document>,
    ) -> CompanyResult {
        let start = Instant::now();
        let run_id = Uuid::now_v7();
        info!(%run_id, domain = %company.domain, "processing company");

        let documents: Arc<[Document]> = documents.into();
        let outcome = self.orchestrator.discover(company, documents.clone()).await;
        if outcome.timed_out {
            warn!("company deadline reached, continuing with partial candidates");
        }

        // --- Classification ---
        let raw_count = outcome.candidates.len();
        let accepted: Vec<ClassifiedCandidate> = outcome
            .candidates
            .into_iter()
            .filter_map(|candidate| {
                let classification = self.classifier.classify(&candidate.name, &candidate.context);
                if classification.rejected {
                    debug!(
                        name = %candidate.name,
                        source = %candidate.source,
                        probability = classification.person_probability,
                        reasons = ?classification.reasons,
                        "candidate rejected"
                    );
                    return None;
                }
                Some(ClassifiedCandidate {
                    candidate,
                    classification,
                })
            })
            .collect();
        info!(raw = raw_count, accepted = accepted.len(), "classification complete");

        // --- Merge ---
        let merged = self.merger.merge(accepted);

        // --- Attribution ---
        let tokens = extract_tokens(&documents);
        let contacts = self
            .attributor
            .attribute(&merged, &tokens, &documents, company);
        debug!(tokens = tokens.len(), attributed = contacts.len(), "attribution complete");

        // --- Scoring ---
        let profiles: Vec<ExecutiveProfile> = merged
            .iter()
            .map(|candidate| self.scorer.score(candidate, &contacts))
            .collect();
        let report = self.scorer.report(&profiles);

        info!(
            profiles = profiles.len(),
            grade = %report.grade,
            score = report.score,
            warnings = outcome.warnings.len(),
            from_cache = outcome.from_cache,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "company processed"
        );

        CompanyResult {
            run_id,
            company: company.clone(),
            profiles,
            contacts,
            report,
            warnings: outcome.warnings,
            processed_at: Utc::now(),
        }
    }

    /// Process `jobs` one after another. One company's failure never affects
    /// the others.
    #[instrument(skip_all, fields(companies = jobs.len()))]
    pub async fn process_batch(
        &self,
        jobs: Vec<CompanyJob>,
        progress: &dyn ProgressReporter,
    ) -> Vec<CompanyResult> {
        let total = jobs.len();
        let mut results = Vec::with_capacity(total);

        for (index, job) in jobs.into_iter().enumerate() {
            progress.company_started(&job.company, index, total);
            let result = self.process_company(&job.company, job.documents).await;
            progress.company_finished(&result, index, total);
            results.push(result);
        }

        let graded = results.iter().filter(|r| !r.profiles.is_empty()).count();
        info!(total, graded, "batch complete");
        progress.done(&results);
        results
    }
}

impl Default for ExecutiveFinder {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}
