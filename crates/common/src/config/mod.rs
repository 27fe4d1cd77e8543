//! Configuration management for CiteCtx
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with CITECTX__)
//! - Configuration files (config/default.toml, config/{env}.toml, config/local.toml)
//! - Default values
//!
//! Every loaded configuration is validated before it is handed out, so an
//! invalid parameter aborts the run before any document is processed.

use crate::errors::{AppError, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Environment variable prefix for overrides, e.g. `CITECTX__MRF__NEIGHBOURHOOD=2`
pub const ENV_PREFIX: &str = "CITECTX";

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct AppConfig {
    /// Belief propagation parameters
    #[serde(default)]
    #[validate(nested)]
    pub mrf: MrfConfig,

    /// Feature weights for the self-belief prior
    #[serde(default)]
    #[validate(nested)]
    pub self_belief: SelfBeliefWeights,

    /// Adjacency bonuses for sentence relatedness
    #[serde(default)]
    #[validate(nested)]
    pub relatedness: RelatednessWeights,

    /// Corpus-level execution
    #[serde(default)]
    #[validate(nested)]
    pub corpus: CorpusConfig,

    /// Logging and metrics
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct MrfConfig {
    /// Window radius: sentences i and j are connected iff 0 < |i - j| <= neighbourhood
    #[serde(default = "default_neighbourhood")]
    pub neighbourhood: usize,

    /// A message counts as changed if any component moves by more than this
    #[serde(default = "default_delta")]
    #[validate(range(exclusive_min = 0.0))]
    pub delta: f64,

    /// Sweep budget per document
    #[serde(default = "default_max_iterations")]
    #[validate(range(min = 1))]
    pub max_iterations: usize,

    /// Minimum final REFERENCE belief for a positive prediction
    #[serde(default = "default_belief_threshold")]
    #[validate(range(exclusive_min = 0.0, exclusive_max = 1.0))]
    pub belief_threshold: f64,

    /// Floor applied to normalized self-beliefs of non-explicit sentences
    #[serde(default = "default_min_belief")]
    #[validate(range(min = 0.0, exclusive_max = 1.0))]
    pub min_belief: f64,

    /// Positive predictions must lie within this many positions of an explicit reference
    #[serde(default = "default_context_window")]
    pub context_window: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct SelfBeliefWeights {
    /// Sentence mentions the cited main author
    #[serde(default = "default_author_weight")]
    pub author: f64,

    /// Sentence contains one of the cited work's acronyms
    #[serde(default = "default_acronym_weight")]
    pub acronym: f64,

    /// Sentence contains one of the cited work's lexical hooks
    #[serde(default = "default_hooks_weight")]
    pub hooks: f64,

    /// Sentence starts with a numbered section header
    #[serde(default = "default_header_weight")]
    pub header: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct RelatednessWeights {
    /// Later sentence starts with a connector ("However", "Moreover", ...)
    #[serde(default = "default_connector_bonus")]
    pub connector: f64,

    /// Later sentence contains a determiner followed by a work noun ("this approach")
    #[serde(default = "default_det_work_bonus")]
    pub det_work: f64,

    /// Later sentence starts with a third person pronoun
    #[serde(default = "default_pronoun_bonus")]
    pub pronoun: f64,

    /// Later sentence starts with a determiner or with "It"
    #[serde(default = "default_determiner_bonus")]
    pub determiner: f64,

    /// Sentences are adjacent and no other rule matched
    #[serde(default = "default_adjacent_bonus")]
    pub adjacent: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct CorpusConfig {
    /// Maximum documents classified at once on the blocking pool
    #[serde(default = "default_max_concurrent_documents")]
    #[validate(range(min = 1))]
    pub max_concurrent_documents: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,

    /// Record metrics through the global metrics recorder
    #[serde(default = "default_metrics_enabled")]
    pub metrics_enabled: bool,
}

// Default value functions
fn default_neighbourhood() -> usize { 4 }
fn default_delta() -> f64 { 0.02 }
fn default_max_iterations() -> usize { 10 }
fn default_belief_threshold() -> f64 { 0.4 }
fn default_min_belief() -> f64 { 0.3 }
fn default_context_window() -> usize { 2 }
fn default_author_weight() -> f64 { 2.0 }
fn default_acronym_weight() -> f64 { 1.0 }
fn default_hooks_weight() -> f64 { 1.0 }
fn default_header_weight() -> f64 { -1.0 }
fn default_connector_bonus() -> f64 { 4.0 }
fn default_det_work_bonus() -> f64 { 3.0 }
fn default_pronoun_bonus() -> f64 { 2.0 }
fn default_determiner_bonus() -> f64 { 1.5 }
fn default_adjacent_bonus() -> f64 { 1.0 }
fn default_max_concurrent_documents() -> usize { 4 }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { true }
fn default_metrics_enabled() -> bool { true }

impl Default for MrfConfig {
    fn default() -> Self {
        Self {
            neighbourhood: default_neighbourhood(),
            delta: default_delta(),
            max_iterations: default_max_iterations(),
            belief_threshold: default_belief_threshold(),
            min_belief: default_min_belief(),
            context_window: default_context_window(),
        }
    }
}

impl Default for SelfBeliefWeights {
    fn default() -> Self {
        Self {
            author: default_author_weight(),
            acronym: default_acronym_weight(),
            hooks: default_hooks_weight(),
            header: default_header_weight(),
        }
    }
}

impl Default for RelatednessWeights {
    fn default() -> Self {
        Self {
            connector: default_connector_bonus(),
            det_work: default_det_work_bonus(),
            pronoun: default_pronoun_bonus(),
            determiner: default_determiner_bonus(),
            adjacent: default_adjacent_bonus(),
        }
    }
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            max_concurrent_documents: default_max_concurrent_documents(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: default_json_logging(),
            metrics_enabled: default_metrics_enabled(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        let env = std::env::var("CITECTX_ENV").unwrap_or_else(|_| "development".to_string());

        let config: AppConfig = Config::builder()
            // Load base config file
            .add_source(File::with_name("config/default").required(false))

            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))

            // Load local overrides
            .add_source(File::with_name("config/local").required(false))

            // Load from environment variables with CITECTX__ prefix
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
            )

            .build()?
            .try_deserialize()?;

        config.ensure_valid()?;
        Ok(config)
    }

    /// Load from a specific file (format chosen by extension)
    pub fn from_file(path: &str) -> Result<Self> {
        let config: AppConfig = Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
            )
            .build()?
            .try_deserialize()?;

        config.ensure_valid()?;
        Ok(config)
    }

    /// Run the declared field rules plus the checks `validator` cannot express
    pub fn ensure_valid(&self) -> Result<()> {
        self.validate()?;

        let weights = [
            ("self_belief.author", self.self_belief.author),
            ("self_belief.acronym", self.self_belief.acronym),
            ("self_belief.hooks", self.self_belief.hooks),
            ("self_belief.header", self.self_belief.header),
            ("relatedness.connector", self.relatedness.connector),
            ("relatedness.det_work", self.relatedness.det_work),
            ("relatedness.pronoun", self.relatedness.pronoun),
            ("relatedness.determiner", self.relatedness.determiner),
            ("relatedness.adjacent", self.relatedness.adjacent),
        ];
        if let Some((name, value)) = weights.iter().find(|(_, w)| !w.is_finite()) {
            return Err(AppError::Configuration {
                message: format!("{} must be finite, got {}", name, value),
            });
        }

        // NaN slips through range rules
        if self.mrf.delta.is_nan() || self.mrf.belief_threshold.is_nan() || self.mrf.min_belief.is_nan() {
            return Err(AppError::Configuration {
                message: "mrf probabilities must not be NaN".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.mrf.neighbourhood, 4);
        assert_eq!(config.mrf.max_iterations, 10);
        assert!((config.mrf.delta - 0.02).abs() < 1e-12);
        assert!((config.mrf.min_belief - 0.3).abs() < 1e-12);
        assert_eq!(config.relatedness.connector, 4.0);
        assert!(config.ensure_valid().is_ok());
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let mut config = AppConfig::default();
        config.mrf.max_iterations = 0;
        let err = config.ensure_valid().unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_threshold_bounds() {
        let mut config = AppConfig::default();
        config.mrf.belief_threshold = 1.0;
        assert!(config.ensure_valid().is_err());

        config.mrf.belief_threshold = 0.0;
        assert!(config.ensure_valid().is_err());

        config.mrf.belief_threshold = 0.5;
        assert!(config.ensure_valid().is_ok());
    }

    #[test]
    fn test_non_positive_delta_rejected() {
        let mut config = AppConfig::default();
        config.mrf.delta = 0.0;
        assert!(config.ensure_valid().is_err());
    }

    #[test]
    fn test_non_finite_weight_rejected() {
        let mut config = AppConfig::default();
        config.self_belief.acronym = f64::NAN;
        let err = config.ensure_valid().unwrap_err();
        assert!(err.to_string().contains("self_belief.acronym"));
    }

    #[test]
    fn test_from_file_partial_overrides() {
        let path = std::env::temp_dir().join(format!("citectx-config-{}.toml", std::process::id()));
        std::fs::write(&path, "[mrf]\nneighbourhood = 2\nbelief_threshold = 0.55\n").unwrap();

        let config = AppConfig::from_file(path.to_str().unwrap()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.mrf.neighbourhood, 2);
        assert!((config.mrf.belief_threshold - 0.55).abs() < 1e-12);
        // Untouched sections keep their defaults
        assert_eq!(config.mrf.max_iterations, 10);
        assert_eq!(config.self_belief.author, 2.0);
    }
}
