//! Business-registry strategy.
//!
//! Officer lookups (Companies House and the like) live behind
//! [`RegistryLookup`] so the engine never talks to the network itself. The
//! default [`NoRegistry`] finds nobody.

use std::sync::Arc;

use execscout_shared::{CompanyMeta, Document, RawCandidate, Result, StrategySource};

use super::{ExtractionStrategy, StrategyScope, refine};

/// Source of registered officers for a company.
pub trait RegistryLookup: Send + Sync {
    /// Officers on record for `company`. Returned candidates are re-tagged
    /// with [`StrategySource::Registry`].
    fn officers(&self, company: &CompanyMeta) -> Result<Vec<RawCandidate>>;

    /// Distinguishes lookups in discovery cache keys.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Lookup used when no registry is configured.
pub struct NoRegistry;

impl RegistryLookup for NoRegistry {
    fn officers(&self, _company: &CompanyMeta) -> Result<Vec<RawCandidate>> {
        Ok(Vec::new())
    }
}

pub struct RegistryStrategy {
    lookup: Arc<dyn RegistryLookup>,
}

impl RegistryStrategy {
    pub fn new(lookup: Arc<dyn RegistryLookup>) -> Self {
        Self { lookup }
    }
}

impl ExtractionStrategy for RegistryStrategy {
    fn name(&self) -> &str {
        "registry"
    }

    fn source(&self) -> StrategySource {
        StrategySource::Registry
    }

    fn scope(&self) -> StrategyScope {
        StrategyScope::PerCompany
    }

    fn cache_id(&self) -> String {
        format!("registry:{}", self.lookup.name())
    }

    fn extract(&self, _doc: &Document, company: &CompanyMeta) -> Result<Vec<RawCandidate>> {
        let officers = self.lookup.officers(company)?;
        Ok(officers
            .into_iter()
            .filter_map(|c| {
                let name = refine(&c.name, 0)?.name;
                Some(RawCandidate {
                    name,
                    source: StrategySource::Registry,
                    confidence: c.confidence.clamp(0.0, 1.0),
                    ..c
                })
            })
            .collect())
    }
}
