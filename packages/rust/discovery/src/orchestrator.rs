//! Concurrent discovery over a company's document set.
//!
//! One task per (strategy, document) pair, bounded by a semaphore. Results
//! are gathered behind a full barrier: nothing is returned until every
//! launched task has finished, failed, or been cancelled by the per-company
//! deadline. Candidates come back in launch order, so a run is
//! deterministic however the tasks interleave.
//!
//! Strategies run on the blocking pool, where aborting a task cannot stop a
//! closure that has already started. On the deadline the run is flagged as
//! cancelled: closures that have not started return at once, and running
//! ones keep their semaphore permit until they finish, so a company never
//! has more than `concurrency` strategy threads alive.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use execscout_shared::{
    CompanyMeta, DiscoveryConfig, Document, ExecScoutError, ProcessingWarning, RawCandidate,
    Result, StrategySource, WarningKind,
};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::cache::{DiscoveryCache, fingerprint};
use crate::strategies::{ExtractionStrategy, StrategyRegistry, StrategyScope};

// ---------------------------------------------------------------------------
// DiscoveryOutcome
// ---------------------------------------------------------------------------

/// Everything one discovery call produced.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryOutcome {
    /// Raw candidates from every strategy that completed, in launch order.
    pub candidates: Vec<RawCandidate>,
    /// Soft failures: failed, panicked, or timed-out strategy runs.
    pub warnings: Vec<ProcessingWarning>,
    /// Served from the cache without running any strategy.
    pub from_cache: bool,
    /// The per-company deadline cancelled at least one task.
    pub timed_out: bool,
}

/// One launched strategy run.
struct StrategyTask {
    strategy: String,
    source: StrategySource,
    document_index: Option<usize>,
    document_url: Option<String>,
    handle: JoinHandle<Result<Vec<RawCandidate>>>,
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Runs the registered strategies over one company's documents.
pub struct Orchestrator {
    config: DiscoveryConfig,
    registry: StrategyRegistry,
    cache: Option<Arc<dyn DiscoveryCache>>,
}

impl Orchestrator {
    /// Create an orchestrator with all built-in strategies and no cache.
    pub fn new(config: DiscoveryConfig) -> Self {
        let registry = StrategyRegistry::with_context_chars(config.context_chars);
        Self {
            config,
            registry,
            cache: None,
        }
    }

    /// Replace the strategy set.
    pub fn with_registry(mut self, registry: StrategyRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Consult and fill `cache` around each discovery run.
    pub fn with_cache(mut self, cache: Arc<dyn DiscoveryCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    /// Run every strategy against `documents` and collect their candidates.
    ///
    /// Never fails: strategy errors, panics, and the deadline all become
    /// warnings next to whatever the other strategies found.
    #[instrument(skip_all, fields(company = %company.name, documents = documents.len()))]
    pub async fn discover(
        &self,
        company: &CompanyMeta,
        documents: Arc<[Document]>,
    ) -> DiscoveryOutcome {
        let mut warnings = Vec::new();

        let cache_key = self
            .cache
            .as_ref()
            .map(|_| fingerprint(company, &documents, &self.registry.cache_ids()));
        if let (Some(cache), Some(key)) = (&self.cache, &cache_key) {
            match cache.get(key) {
                Ok(Some(candidates)) => {
                    info!(candidates = candidates.len(), "discovery served from cache");
                    return DiscoveryOutcome {
                        candidates,
                        from_cache: true,
                        ..DiscoveryOutcome::default()
                    };
                }
                Ok(None) => debug!("discovery cache miss"),
                Err(e) => {
                    warn!(error = %e, "discovery cache read failed");
                    warnings.push(cache_warning(&e));
                }
            }
        }

        let started = Instant::now();
        let deadline = started + Duration::from_millis(self.config.company_timeout_ms);
        let cancelled = Arc::new(AtomicBool::new(false));
        let tasks = self.launch(company, &documents, &cancelled);
        info!(
            tasks = tasks.len(),
            concurrency = self.config.concurrency,
            "starting discovery"
        );

        let mut candidates = Vec::new();
        let mut timed_out = false;

        // Barrier: every task is awaited (or aborted) before anything is returned.
        for mut task in tasks {
            match tokio::time::timeout_at(deadline, &mut task.handle).await {
                Ok(Ok(Ok(found))) => {
                    debug!(
                        strategy = %task.strategy,
                        document = ?task.document_index,
                        candidates = found.len(),
                        "strategy completed"
                    );
                    let index = task.document_index.unwrap_or(0);
                    candidates.extend(found.into_iter().map(|c| RawCandidate {
                        document_index: index,
                        ..c
                    }));
                }
                Ok(Ok(Err(e))) => {
                    warn!(strategy = %task.strategy, document = ?task.document_url, error = %e, "strategy failed");
                    warnings.push(task.warning(WarningKind::StrategyFailure, e.to_string()));
                }
                Ok(Err(join_err)) => {
                    let e = ExecScoutError::strategy(&task.strategy, join_err.to_string());
                    warn!(strategy = %task.strategy, document = ?task.document_url, error = %e, "strategy task aborted");
                    warnings.push(task.warning(WarningKind::StrategyFailure, e.to_string()));
                }
                Err(_) => {
                    cancelled.store(true, Ordering::Release);
                    task.handle.abort();
                    timed_out = true;
                    let e = ExecScoutError::Timeout {
                        elapsed_ms: started.elapsed().as_millis() as u64,
                    };
                    warn!(strategy = %task.strategy, document = ?task.document_url, "strategy cancelled by deadline");
                    warnings.push(task.warning(WarningKind::Timeout, e.to_string()));
                }
            }
        }

        info!(
            candidates = candidates.len(),
            failures = warnings.len(),
            timed_out,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "discovery completed"
        );

        if let (Some(cache), Some(key)) = (&self.cache, &cache_key) {
            if warnings.is_empty() {
                if let Err(e) = cache.set(key, &candidates) {
                    warn!(error = %e, "discovery cache write failed");
                    warnings.push(cache_warning(&e));
                }
            }
        }

        DiscoveryOutcome {
            candidates,
            warnings,
            from_cache: false,
            timed_out,
        }
    }

    /// Spawn one task per (strategy, accepted document) pair, plus one per
    /// company-scoped strategy.
    fn launch(
        &self,
        company: &CompanyMeta,
        documents: &Arc<[Document]>,
        cancelled: &Arc<AtomicBool>,
    ) -> Vec<StrategyTask> {
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency.max(1) as usize));
        let company = Arc::new(company.clone());
        let mut tasks = Vec::new();

        for strategy in self.registry.strategies() {
            match strategy.scope() {
                StrategyScope::PerCompany => {
                    tasks.push(spawn_task(
                        strategy.clone(),
                        None,
                        documents.clone(),
                        company.clone(),
                        semaphore.clone(),
                        cancelled.clone(),
                    ));
                }
                StrategyScope::PerDocument => {
                    for (index, doc) in documents.iter().enumerate() {
                        if !strategy.accepts(doc) {
                            debug!(strategy = strategy.name(), url = %doc.url, "document not accepted");
                            continue;
                        }
                        tasks.push(spawn_task(
                            strategy.clone(),
                            Some(index),
                            documents.clone(),
                            company.clone(),
                            semaphore.clone(),
                            cancelled.clone(),
                        ));
                    }
                }
            }
        }

        tasks
    }
}

fn spawn_task(
    strategy: Arc<dyn ExtractionStrategy>,
    document_index: Option<usize>,
    documents: Arc<[Document]>,
    company: Arc<CompanyMeta>,
    semaphore: Arc<Semaphore>,
    cancelled: Arc<AtomicBool>,
) -> StrategyTask {
    let name = strategy.name().to_string();
    let source = strategy.source();
    let document_url = document_index.map(|i| documents[i].url.clone());
    let task_name = name.clone();

    let handle = tokio::spawn(async move {
        let permit = semaphore
            .acquire_owned()
            .await
            .map_err(|e| ExecScoutError::strategy(&task_name, format!("semaphore closed: {e}")))?;

        // Strategies are synchronous pattern matching; keep them off the async workers.
        let blocking_name = task_name.clone();
        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            if cancelled.load(Ordering::Acquire) {
                return Err(ExecScoutError::strategy(blocking_name, "cancelled by deadline"));
            }
            match document_index {
                Some(i) => strategy.extract(&documents[i], &company),
                None => {
                    let root = Document::new(format!("https://{}/", company.domain), "", "");
                    strategy.extract(&root, &company)
                }
            }
        })
        .await
        .map_err(|e| ExecScoutError::strategy(&task_name, format!("strategy panicked: {e}")))?
    });

    StrategyTask {
        strategy: name,
        source,
        document_index,
        document_url,
        handle,
    }
}

impl StrategyTask {
    fn warning(&self, kind: WarningKind, message: String) -> ProcessingWarning {
        ProcessingWarning {
            kind,
            strategy: Some(self.source),
            document: self.document_url.clone(),
            message,
        }
    }
}

fn cache_warning(e: &ExecScoutError) -> ProcessingWarning {
    ProcessingWarning {
        kind: WarningKind::Cache,
        strategy: None,
        document: None,
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;
    use crate::cache::MemoryCache;

    struct Fixed(&'static str);

    impl ExtractionStrategy for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }
        fn source(&self) -> StrategySource {
            StrategySource::TeamPage
        }
        fn extract(&self, doc: &Document, _company: &CompanyMeta) -> Result<Vec<RawCandidate>> {
            Ok(vec![RawCandidate {
                name: self.0.into(),
                source: StrategySource::TeamPage,
                confidence: 0.8,
                context: doc.text_content.clone(),
                document_index: 0,
                document_position: 0,
                title_guess: None,
            }])
        }
    }

    struct Failing;

    impl ExtractionStrategy for Failing {
        fn name(&self) -> &str {
            "failing"
        }
        fn source(&self) -> StrategySource {
            StrategySource::Signature
        }
        fn extract(&self, _doc: &Document, _company: &CompanyMeta) -> Result<Vec<RawCandidate>> {
            Err(ExecScoutError::parse("malformed markup"))
        }
    }

    struct Panicking;

    impl ExtractionStrategy for Panicking {
        fn name(&self) -> &str {
            "panicking"
        }
        fn source(&self) -> StrategySource {
            StrategySource::SocialProfile
        }
        fn extract(&self, _doc: &Document, _company: &CompanyMeta) -> Result<Vec<RawCandidate>> {
            panic!("strategy bug")
        }
    }

    struct Slow;

    impl ExtractionStrategy for Slow {
        fn name(&self) -> &str {
            "slow"
        }
        fn source(&self) -> StrategySource {
            StrategySource::ContactPage
        }
        fn extract(&self, _doc: &Document, _company: &CompanyMeta) -> Result<Vec<RawCandidate>> {
            std::thread::sleep(Duration::from_millis(400));
            Ok(Vec::new())
        }
    }

    struct Counting(Arc<AtomicUsize>);

    impl ExtractionStrategy for Counting {
        fn name(&self) -> &str {
            "counting"
        }
        fn source(&self) -> StrategySource {
            StrategySource::Registry
        }
        fn scope(&self) -> StrategyScope {
            StrategyScope::PerCompany
        }
        fn extract(&self, doc: &Document, _company: &CompanyMeta) -> Result<Vec<RawCandidate>> {
            assert_eq!(doc.url, "https://example.co.uk/");
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
    }

    fn company() -> CompanyMeta {
        CompanyMeta::new("Example Ltd", "example.co.uk")
    }

    fn documents(n: usize) -> Arc<[Document]> {
        (0..n)
            .map(|i| Document::new(format!("https://example.co.uk/p{i}"), format!("page {i}"), ""))
            .collect::<Vec<_>>()
            .into()
    }

    fn orchestrator(registry: StrategyRegistry) -> Orchestrator {
        Orchestrator::new(DiscoveryConfig::default()).with_registry(registry)
    }

    #[tokio::test]
    async fn failures_do_not_abort_other_strategies() {
        let registry = StrategyRegistry::empty()
            .register(Arc::new(Fixed("Jane Doe")))
            .register(Arc::new(Failing))
            .register(Arc::new(Panicking));

        let outcome = orchestrator(registry).discover(&company(), documents(2)).await;

        assert_eq!(outcome.candidates.len(), 2);
        assert_eq!(outcome.warnings.len(), 4);
        assert!(outcome
            .warnings
            .iter()
            .all(|w| w.kind == WarningKind::StrategyFailure));
        assert!(outcome.warnings[0].message.contains("malformed markup"));
        assert!(!outcome.timed_out);
    }

    #[tokio::test]
    async fn candidates_carry_document_index_in_launch_order() {
        let registry = StrategyRegistry::empty().register(Arc::new(Fixed("Jane Doe")));
        let outcome = orchestrator(registry).discover(&company(), documents(3)).await;

        let indexes: Vec<usize> = outcome.candidates.iter().map(|c| c.document_index).collect();
        assert_eq!(indexes, vec![0, 1, 2]);
        assert_eq!(outcome.candidates[2].context, "page 2");
    }

    #[tokio::test]
    async fn company_scoped_strategies_run_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = StrategyRegistry::empty().register(Arc::new(Counting(calls.clone())));
        orchestrator(registry).discover(&company(), documents(4)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn deadline_keeps_completed_results() {
        let config = DiscoveryConfig {
            company_timeout_ms: 100,
            ..DiscoveryConfig::default()
        };
        let registry = StrategyRegistry::empty()
            .register(Arc::new(Fixed("Jane Doe")))
            .register(Arc::new(Slow));
        let outcome = Orchestrator::new(config)
            .with_registry(registry)
            .discover(&company(), documents(1))
            .await;

        assert!(outcome.timed_out);
        assert_eq!(outcome.candidates.len(), 1);
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].kind, WarningKind::Timeout);
        assert_eq!(outcome.warnings[0].strategy, Some(StrategySource::ContactPage));
    }

    struct SlowCounting(Arc<AtomicUsize>);

    impl ExtractionStrategy for SlowCounting {
        fn name(&self) -> &str {
            "slow_counting"
        }
        fn source(&self) -> StrategySource {
            StrategySource::ContactPage
        }
        fn extract(&self, _doc: &Document, _company: &CompanyMeta) -> Result<Vec<RawCandidate>> {
            self.0.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(300));
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn deadline_stops_strategy_work_that_has_not_started() {
        let calls = Arc::new(AtomicUsize::new(0));
        let config = DiscoveryConfig {
            company_timeout_ms: 100,
            concurrency: 1,
            ..DiscoveryConfig::default()
        };
        let registry = StrategyRegistry::empty().register(Arc::new(SlowCounting(calls.clone())));
        let outcome = Orchestrator::new(config)
            .with_registry(registry)
            .discover(&company(), documents(3))
            .await;

        assert!(outcome.timed_out);
        assert_eq!(outcome.warnings.len(), 3);
        // Long enough for the running closure and any stray ones to finish.
        tokio::time::sleep(Duration::from_millis(900)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cache_serves_repeat_runs_and_skips_failed_ones() {
        let cache = Arc::new(MemoryCache::new());
        let clean = orchestrator(StrategyRegistry::empty().register(Arc::new(Fixed("Jane Doe"))))
            .with_cache(cache.clone());

        let first = clean.discover(&company(), documents(1)).await;
        assert!(!first.from_cache);
        let second = clean.discover(&company(), documents(1)).await;
        assert!(second.from_cache);
        assert_eq!(first.candidates, second.candidates);

        let failing = orchestrator(StrategyRegistry::empty().register(Arc::new(Failing)))
            .with_cache(cache.clone());
        failing.discover(&company(), documents(2)).await;
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn cache_entries_are_not_shared_across_strategy_sets() {
        let cache = Arc::new(MemoryCache::new());
        let jane = orchestrator(StrategyRegistry::empty().register(Arc::new(Fixed("Jane Doe"))))
            .with_cache(cache.clone());
        let with_registry = orchestrator(
            StrategyRegistry::empty()
                .register(Arc::new(Fixed("Jane Doe")))
                .with_lookup(Arc::new(crate::strategies::NoRegistry)),
        )
        .with_cache(cache.clone());

        jane.discover(&company(), documents(1)).await;
        let other = with_registry.discover(&company(), documents(1)).await;
        assert!(!other.from_cache);
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn empty_document_set_still_runs_company_strategies() {
        let outcome = Orchestrator::new(DiscoveryConfig::default())
            .discover(&company(), Vec::new().into())
            .await;
        assert!(outcome.candidates.is_empty());
        assert!(outcome.warnings.is_empty());
    }
}
