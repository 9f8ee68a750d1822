//! Engine Configuration
//!
//! Thresholds that turn raw graph measurements into caller-facing labels and
//! warnings. They are policy, not mechanism: the graph algorithms never read
//! them, only the tool-facing [`Engine`](crate::engine::Engine) does.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid engine config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("risk threshold `medium` ({medium}) exceeds `high` ({high})")]
    InvertedRiskThresholds { medium: usize, high: usize },
}

/// Risk label attached to a dependency report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Direct-dependency counts above which a token is labelled riskier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskThresholds {
    /// More than this many direct dependencies is `High`.
    pub high: usize,
    /// More than this many direct dependencies is `Medium`.
    pub medium: usize,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self { high: 3, medium: 1 }
    }
}

impl RiskThresholds {
    /// Classify a direct dependency count.
    pub fn classify(&self, direct_dependencies: usize) -> RiskLevel {
        if direct_dependencies > self.high {
            RiskLevel::High
        } else if direct_dependencies > self.medium {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

/// Tunables for the tool-facing engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub risk: RiskThresholds,

    /// Warn when a change batch impacts more than this many tokens.
    pub impact_warning_threshold: usize,

    /// Upper bound on the depth a caller may request for a dependency report.
    pub max_cascade_depth: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            risk: RiskThresholds::default(),
            impact_warning_threshold: 10,
            max_cascade_depth: None,
        }
    }
}

impl EngineConfig {
    /// Parse and check a JSON configuration. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.check()?;
        Ok(config)
    }

    /// Check that the thresholds are consistent.
    pub fn check(&self) -> Result<(), ConfigError> {
        if self.risk.medium > self.risk.high {
            return Err(ConfigError::InvertedRiskThresholds {
                medium: self.risk.medium,
                high: self.risk.high,
            });
        }
        Ok(())
    }

    /// Clamp a requested cascade depth to the configured maximum.
    pub fn effective_depth(&self, requested: usize) -> usize {
        match self.max_cascade_depth {
            Some(max) => requested.min(max.max(1)),
            None => requested,
        }
    }
}
