//! Tool Responses
//!
//! Serializable payloads returned by the [`Engine`](super::Engine). Field
//! names are camelCase on the wire so tool layers can forward them as-is.

use serde::Serialize;

use crate::analysis::{CascadeResult, Reached, ValidationResult};
use crate::config::RiskLevel;

/// One direction of a dependency report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeSummary {
    /// Tokens one hop away.
    pub direct: Vec<String>,
    /// Every token within the requested depth, with its hop count.
    pub cascade: Vec<Reached>,
    /// Number of tokens in `cascade`.
    pub impact: usize,
    /// True when more tokens exist beyond the requested depth.
    pub truncated: bool,
}

impl From<CascadeResult> for EdgeSummary {
    fn from(result: CascadeResult) -> Self {
        Self {
            direct: result.direct().map(str::to_string).collect(),
            impact: result.reached.len(),
            truncated: result.truncated,
            cascade: result.reached,
        }
    }
}

/// Response to `GetDependencies`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyReport {
    pub token: String,
    /// Depth actually used, after clamping.
    pub depth: usize,
    pub dependencies: EdgeSummary,
    pub dependents: EdgeSummary,
    /// `dependencies.impact + dependents.impact`.
    pub complexity: usize,
    pub risk: RiskLevel,
}

/// Something the caller should know about a change batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ChangeWarning {
    #[serde(rename_all = "camelCase")]
    UnknownReference { token: String, reference: String },

    #[serde(rename_all = "camelCase")]
    ParseFailure {
        token: String,
        fragment: String,
        offset: usize,
    },

    #[serde(rename_all = "camelCase")]
    DuplicateChange { token: String },

    #[serde(rename_all = "camelCase")]
    NewToken { token: String },

    #[serde(rename_all = "camelCase")]
    ImpactExceedsThreshold { tokens_affected: usize, threshold: usize },
}

/// Size of the downstream blast radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactSummary {
    pub tokens_affected: usize,
    pub cascade_depth: usize,
}

/// Response to `ValidateChanges`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeReport {
    pub valid: bool,
    pub circular_dependencies: Vec<Vec<String>>,
    pub warnings: Vec<ChangeWarning>,
    pub impact: ImpactSummary,
}

impl ChangeReport {
    /// Translate a validation result, flagging impact above `threshold`.
    pub fn from_validation(result: ValidationResult, threshold: usize) -> Self {
        let mut warnings = Vec::new();

        for unknown in &result.unknown_references {
            warnings.push(ChangeWarning::UnknownReference {
                token: unknown.token.clone(),
                reference: unknown.missing_ref.clone(),
            });
        }
        for err in &result.parse_errors {
            warnings.push(ChangeWarning::ParseFailure {
                token: err.token.clone(),
                fragment: err.fragment.clone(),
                offset: err.offset,
            });
        }
        warnings.extend(
            result
                .duplicate_changes
                .iter()
                .map(|token| ChangeWarning::DuplicateChange {
                    token: token.clone(),
                }),
        );
        warnings.extend(result.new_tokens.iter().map(|token| ChangeWarning::NewToken {
            token: token.clone(),
        }));
        if result.impacted_count > threshold {
            warnings.push(ChangeWarning::ImpactExceedsThreshold {
                tokens_affected: result.impacted_count,
                threshold,
            });
        }

        Self {
            valid: result.valid,
            circular_dependencies: result.introduced_cycles,
            warnings,
            impact: ImpactSummary {
                tokens_affected: result.impacted_count,
                cascade_depth: result.max_impact_depth,
            },
        }
    }
}

/// Response to `ScheduleGeneration`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationReport {
    pub target: String,
    /// Inputs-before-outputs order, ending with the target.
    pub order: Vec<String>,
    /// Tokens whose generation rule ran; empty for a dry run.
    pub executed: Vec<String>,
    pub dry_run: bool,
}
