//! Application configuration for ExecScout.
//!
//! User config lives at `~/.execscout/execscout.toml`. Every weighting
//! constant in the engine is a field here with a calibrated default, so
//! callers tune thresholds in one place instead of per call site.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ExecScoutError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "execscout.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".execscout";

// ---------------------------------------------------------------------------
// Config structs (matching execscout.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    #[serde(default)]
    pub classifier: ClassifierConfig,

    #[serde(default)]
    pub merge: MergeConfig,

    #[serde(default)]
    pub attribution: AttributionConfig,

    #[serde(default)]
    pub scoring: ScoringConfig,
}

/// `[discovery]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Maximum strategy executions in flight at once.
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,

    /// Per-company processing budget in milliseconds.
    #[serde(default = "default_company_timeout_ms")]
    pub company_timeout_ms: u64,

    /// Length of the context string stored with each raw candidate.
    #[serde(default = "default_context_chars")]
    pub context_chars: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            company_timeout_ms: default_company_timeout_ms(),
            context_chars: default_context_chars(),
        }
    }
}

fn default_concurrency() -> u32 {
    8
}
fn default_company_timeout_ms() -> u64 {
    30_000
}
fn default_context_chars() -> usize {
    200
}

/// `[classifier]` section. Scores start at `base_score` and are adjusted
/// additively, then clamped to `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub base_score: f64,
    /// Names scoring below this are rejected.
    pub acceptance_threshold: f64,
    /// Per name token found in the business/service lexicon.
    pub name_term_penalty: f64,
    /// When the whole name is a known service phrase.
    pub name_phrase_penalty: f64,
    /// Per distinct business term in the context window.
    pub context_term_penalty: f64,
    pub context_penalty_cap: f64,
    /// Name has a canonical person-name shape.
    pub pattern_bonus: f64,
    /// Per distinct executive-role term in the context window.
    pub role_bonus: f64,
    pub role_bonus_cap: f64,
    /// Per distinct biographical marker in the context window.
    pub biographical_bonus: f64,
    pub biographical_bonus_cap: f64,
    /// More than four tokens.
    pub token_count_penalty: f64,
    pub single_token_penalty: f64,
    pub digit_penalty: f64,
    pub symbol_penalty: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            base_score: 0.5,
            acceptance_threshold: 0.65,
            name_term_penalty: 0.45,
            name_phrase_penalty: 0.3,
            context_term_penalty: 0.02,
            context_penalty_cap: 0.1,
            pattern_bonus: 0.25,
            role_bonus: 0.1,
            role_bonus_cap: 0.2,
            biographical_bonus: 0.05,
            biographical_bonus_cap: 0.1,
            token_count_penalty: 0.3,
            single_token_penalty: 0.25,
            digit_penalty: 0.4,
            symbol_penalty: 0.3,
        }
    }
}

/// `[merge]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Added per extra independent strategy that saw the same person.
    pub corroboration_bonus: f64,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            corroboration_bonus: 0.1,
        }
    }
}

/// `[attribution]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributionConfig {
    /// Max characters between a name occurrence and a token.
    pub proximity_window: usize,
    /// Max characters after a sign-off in which a token counts as part of it.
    pub signature_window: usize,
    /// Proximity confidence at distance zero.
    pub proximity_ceiling: f64,
    /// Proximity confidence at the edge of the window.
    pub proximity_floor: f64,
    pub role_fallback_confidence: f64,
}

impl Default for AttributionConfig {
    fn default() -> Self {
        Self {
            proximity_window: 150,
            signature_window: 200,
            proximity_ceiling: 0.75,
            proximity_floor: 0.3,
            role_fallback_confidence: 0.5,
        }
    }
}

/// `[scoring]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Share of person probability (vs. merged strategy confidence) in the
    /// classification term.
    pub person_weight: f64,
    pub email_bonus: f64,
    pub phone_bonus: f64,
    pub social_bonus: f64,
    pub decision_maker_bonus: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            person_weight: 0.5,
            email_bonus: 0.06,
            phone_bonus: 0.05,
            social_bonus: 0.04,
            decision_maker_bonus: 0.08,
        }
    }
}

impl AppConfig {
    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.discovery.concurrency == 0 {
            return Err(ExecScoutError::config("discovery.concurrency must be at least 1"));
        }
        let threshold = self.classifier.acceptance_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ExecScoutError::config(format!(
                "classifier.acceptance_threshold must be within [0, 1], got {threshold}"
            )));
        }
        let a = &self.attribution;
        if a.proximity_floor > a.proximity_ceiling {
            return Err(ExecScoutError::config(
                "attribution.proximity_floor must not exceed proximity_ceiling",
            ));
        }
        if !(0.0..=1.0).contains(&self.scoring.person_weight) {
            return Err(ExecScoutError::config("scoring.person_weight must be within [0, 1]"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.execscout/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ExecScoutError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.execscout/execscout.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load and validate the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ExecScoutError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        ExecScoutError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    config.validate()?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| ExecScoutError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| ExecScoutError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ExecScoutError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("acceptance_threshold"));
        assert!(toml_str.contains("corroboration_bonus"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed, config);
    }

    #[test]
    fn partial_sections_fill_defaults() {
        let toml_str = r#"
[discovery]
concurrency = 2

[classifier]
acceptance_threshold = 0.7
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.discovery.concurrency, 2);
        assert_eq!(config.discovery.company_timeout_ms, 30_000);
        assert_eq!(config.classifier.acceptance_threshold, 0.7);
        assert_eq!(config.classifier.base_score, 0.5);
        assert_eq!(config.merge.corroboration_bonus, 0.1);
    }

    #[test]
    fn validation_rejects_zero_concurrency() {
        let mut config = AppConfig::default();
        config.discovery.concurrency = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("concurrency"));
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn load_from_file() {
        let dir = std::env::temp_dir().join(format!("execscout-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("execscout.toml");
        std::fs::write(&path, "[merge]\ncorroboration_bonus = 0.2\n").unwrap();

        let config = load_config_from(&path).expect("load");
        assert_eq!(config.merge.corroboration_bonus, 0.2);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
