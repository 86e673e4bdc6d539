//! Discovery result cache.
//!
//! Keyed by a SHA-256 fingerprint of the company, its documents and the
//! strategy set that ran, so a changed page set or a differently configured
//! orchestrator never serves stale candidates. Only runs that finished
//! without warnings are stored. Candidates are cached before classification,
//! so classifier settings are not part of the key.

use std::collections::HashMap;
use std::sync::Mutex;

use execscout_shared::{CompanyMeta, Document, ExecScoutError, RawCandidate, Result};
use sha2::{Digest, Sha256};

/// Storage for raw candidates of completed discovery runs.
pub trait DiscoveryCache: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<RawCandidate>>>;
    fn set(&self, key: &str, candidates: &[RawCandidate]) -> Result<()>;
}

/// Stable fingerprint of a company's inputs and the strategies run over them.
pub fn fingerprint(company: &CompanyMeta, documents: &[Document], strategies: &[String]) -> String {
    let mut hasher = Sha256::new();
    for id in strategies {
        hasher.update(id.as_bytes());
        hasher.update([0u8]);
    }
    hasher.update([2u8]);
    hasher.update(company.name.as_bytes());
    hasher.update([0u8]);
    hasher.update(company.domain.to_lowercase().as_bytes());
    for doc in documents {
        hasher.update([1u8]);
        hasher.update(doc.url.as_bytes());
        hasher.update([0u8]);
        hasher.update(doc.text_content.as_bytes());
        hasher.update([0u8]);
        hasher.update(doc.raw_markup.as_bytes());
    }
    format!("{:x}", hasher.finalize())
}

/// In-process cache.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Vec<RawCandidate>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiscoveryCache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<Vec<RawCandidate>>> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| ExecScoutError::Cache(format!("cache lock poisoned: {e}")))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, candidates: &[RawCandidate]) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| ExecScoutError::Cache(format!("cache lock poisoned: {e}")))?;
        entries.insert(key.to_string(), candidates.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_tracks_document_changes() {
        let company = CompanyMeta::new("MS Heating", "msheatingandplumbing.co.uk");
        let a = vec![Document::new("https://x/about", "Mr M Zubair", "")];
        let b = vec![Document::new("https://x/about", "Mr M Zubair, Owner", "")];

        let ids = vec!["team_page:200".to_string()];

        assert_eq!(fingerprint(&company, &a, &ids), fingerprint(&company, &a, &ids));
        assert_ne!(fingerprint(&company, &a, &ids), fingerprint(&company, &b, &ids));
        assert_eq!(fingerprint(&company, &a, &ids).len(), 64);
    }

    #[test]
    fn fingerprint_tracks_strategy_set() {
        let company = CompanyMeta::new("MS Heating", "msheatingandplumbing.co.uk");
        let docs = vec![Document::new("https://x/about", "Mr M Zubair", "")];
        let plain = vec!["team_page:200".to_string()];
        let with_registry = vec!["team_page:200".to_string(), "registry:officers".to_string()];

        assert_ne!(
            fingerprint(&company, &docs, &plain),
            fingerprint(&company, &docs, &with_registry)
        );
    }

    #[test]
    fn memory_cache_roundtrip() {
        let cache = MemoryCache::new();
        assert!(cache.get("k").unwrap().is_none());
        cache.set("k", &[]).unwrap();
        assert_eq!(cache.get("k").unwrap(), Some(Vec::new()));
        assert_eq!(cache.len(), 1);
    }
}
