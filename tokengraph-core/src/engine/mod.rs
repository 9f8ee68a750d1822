//! Tool-Facing Engine
//!
//! The engine is what presentation layers talk to. It owns the current graph
//! (through a [`GraphHandle`]) and the [`EngineConfig`] policy, and exposes
//! one call per tool concept:
//!
//! - [`Engine::get_dependencies`]: dependency and dependent cascades with a
//!   risk label
//! - [`Engine::validate_changes`]: cycle, reference and impact check for a
//!   batch of proposed values
//! - [`Engine::schedule_generation`]: generation order for a token, optionally
//!   running a [`RuleExecutor`] over it
//!
//! Every call takes its own `Arc` to the current graph, so calls never block
//! each other and a concurrent [`Engine::refresh`] cannot change the graph
//! underneath a running query.

mod handle;
mod report;

pub use handle::{GraphHandle, RefreshOutcome, TokenSource};
pub use report::{
    ChangeReport, ChangeWarning, DependencyReport, EdgeSummary, GenerationReport, ImpactSummary,
};

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::analysis::{cascade, schedule, validate, Direction};
use crate::config::{ConfigError, EngineConfig};
use crate::error::{BuildError, CycleError, NotFoundError, ScheduleError};
use crate::graph::{GraphNode, TokenGraph};
use crate::token::{ProposedChange, Token};

/// Errors surfaced to tool layers.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    #[error(transparent)]
    Cycle(#[from] CycleError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("generation rule failed for `{token}`: {message}")]
    RuleFailed {
        token: String,
        message: String,
        /// Tokens generated successfully before the failure.
        completed: Vec<String>,
    },
}

impl From<ScheduleError> for EngineError {
    fn from(err: ScheduleError) -> Self {
        match err {
            ScheduleError::NotFound(e) => EngineError::NotFound(e),
            ScheduleError::Cycle(e) => EngineError::Cycle(e),
        }
    }
}

/// A generation rule reported failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RuleError {
    pub message: String,
}

impl RuleError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The external collaborator that (re)generates a computed token.
///
/// Called once per token, in schedule order, so every input has already been
/// generated when a token's rule runs.
pub trait RuleExecutor {
    fn generate(&mut self, node: &GraphNode) -> Result<(), RuleError>;
}

impl<F> RuleExecutor for F
where
    F: FnMut(&GraphNode) -> Result<(), RuleError>,
{
    fn generate(&mut self, node: &GraphNode) -> Result<(), RuleError> {
        self(node)
    }
}

/// The token graph engine.
#[derive(Debug, Default)]
pub struct Engine {
    graph: GraphHandle,
    config: EngineConfig,
}

impl Engine {
    /// Create an engine with an empty graph at version 0.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            graph: GraphHandle::default(),
            config,
        }
    }

    /// Create an engine around an already-built graph.
    pub fn with_graph(graph: TokenGraph, config: EngineConfig) -> Self {
        Self {
            graph: GraphHandle::new(graph),
            config,
        }
    }

    /// Build a graph from `tokens` and wrap it in an engine.
    pub fn from_tokens(tokens: &[Token], config: EngineConfig) -> Result<Self, EngineError> {
        Ok(Self::with_graph(TokenGraph::build(tokens)?, config))
    }

    /// Create an empty engine from a JSON configuration.
    pub fn from_json_config(json: &str) -> Result<Self, EngineError> {
        Ok(Self::new(EngineConfig::from_json_str(json)?))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The current graph.
    pub fn graph(&self) -> Arc<TokenGraph> {
        self.graph.current()
    }

    pub fn handle(&self) -> &GraphHandle {
        &self.graph
    }

    /// Rebuild from the token store if it has moved to a new version.
    pub fn refresh<S: TokenSource + ?Sized>(
        &self,
        source: &S,
    ) -> Result<RefreshOutcome, EngineError> {
        Ok(self.graph.refresh(source)?)
    }

    /// Dependencies and dependents of `name` up to `depth` hops.
    pub fn get_dependencies(
        &self,
        name: &str,
        depth: usize,
    ) -> Result<DependencyReport, EngineError> {
        let graph = self.graph.current();
        let depth = self.config.effective_depth(depth).max(1);

        let upstream = cascade(graph.as_ref(), name, Direction::Upstream, depth)?;
        let downstream = cascade(graph.as_ref(), name, Direction::Downstream, depth)?;

        let dependencies = EdgeSummary::from(upstream);
        let dependents = EdgeSummary::from(downstream);
        let risk = self.config.risk.classify(dependencies.direct.len());

        Ok(DependencyReport {
            token: name.to_string(),
            depth,
            complexity: dependencies.impact + dependents.impact,
            dependencies,
            dependents,
            risk,
        })
    }

    /// Check a batch of proposed values against the current graph.
    ///
    /// Never fails: problems are reported through `valid` and `warnings`.
    pub fn validate_changes(&self, changes: &[ProposedChange]) -> ChangeReport {
        let graph = self.graph.current();
        let result = validate(&graph, changes);
        ChangeReport::from_validation(result, self.config.impact_warning_threshold)
    }

    /// The generation order for `name`, without running any rule.
    pub fn plan_generation(&self, name: &str) -> Result<GenerationReport, EngineError> {
        let graph = self.graph.current();
        let order = schedule(graph.as_ref(), name)?;
        Ok(GenerationReport {
            target: name.to_string(),
            order,
            executed: Vec::new(),
            dry_run: true,
        })
    }

    /// Order `name` and its inputs and, unless `dry_run`, run `executor` over
    /// them in that order.
    ///
    /// The first rule failure stops the run.
    pub fn schedule_generation(
        &self,
        name: &str,
        dry_run: bool,
        executor: &mut dyn RuleExecutor,
    ) -> Result<GenerationReport, EngineError> {
        let graph = self.graph.current();
        let order = schedule(graph.as_ref(), name)?;

        if dry_run {
            debug!(token = name, tokens = order.len(), "generation dry run");
            return Ok(GenerationReport {
                target: name.to_string(),
                order,
                executed: Vec::new(),
                dry_run: true,
            });
        }

        let mut executed = Vec::with_capacity(order.len());
        for token in &order {
            let node = graph.get(token)?;
            if let Err(err) = executor.generate(node) {
                warn!(requested = name, token = %token, error = %err, "generation rule failed");
                return Err(EngineError::RuleFailed {
                    token: token.clone(),
                    message: err.message,
                    completed: executed,
                });
            }
            executed.push(token.clone());
        }

        debug!(token = name, tokens = executed.len(), "generation complete");
        Ok(GenerationReport {
            target: name.to_string(),
            order,
            executed,
            dry_run: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RiskLevel;

    fn engine(tokens: &[(&str, &str)]) -> Engine {
        let tokens: Vec<Token> = tokens.iter().map(|(n, v)| Token::new(*n, *v, "")).collect();
        Engine::from_tokens(&tokens, EngineConfig::default()).unwrap()
    }

    fn chain() -> Engine {
        engine(&[("base", "1"), ("mid", "{base}+1"), ("top", "{mid}*2")])
    }

    #[test]
    fn dependency_report_for_chain() {
        let report = chain().get_dependencies("top", 3).unwrap();
        assert_eq!(report.dependencies.direct, vec!["mid"]);
        let cascade: Vec<_> = report.dependencies.cascade.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(cascade, vec!["mid", "base"]);
        assert_eq!(report.dependents.impact, 0);
        assert_eq!(report.complexity, 2);
        assert_eq!(report.risk, RiskLevel::Low);
    }

    #[test]
    fn many_direct_dependencies_are_high_risk() {
        let report = engine(&[
            ("a", "1"),
            ("b", "2"),
            ("c", "3"),
            ("d", "4"),
            ("mix", "{a} {b} {c} {d}"),
        ])
        .get_dependencies("mix", 1)
        .unwrap();
        assert_eq!(report.risk, RiskLevel::High);
    }

    #[test]
    fn configured_depth_clamp_applies() {
        let tokens: Vec<Token> = [("base", "1"), ("mid", "{base}"), ("top", "{mid}")]
            .iter()
            .map(|(n, v)| Token::new(*n, *v, ""))
            .collect();
        let config = EngineConfig {
            max_cascade_depth: Some(1),
            ..EngineConfig::default()
        };
        let report = Engine::from_tokens(&tokens, config)
            .unwrap()
            .get_dependencies("top", 10)
            .unwrap();
        assert_eq!(report.depth, 1);
        assert!(report.dependencies.truncated);
    }

    #[test]
    fn unknown_token_is_not_found() {
        assert!(matches!(
            chain().get_dependencies("ghost", 1),
            Err(EngineError::NotFound(e)) if e.name == "ghost"
        ));
    }

    #[test]
    fn dry_run_never_invokes_rules() {
        let mut calls = 0;
        let mut executor = |_: &GraphNode| -> Result<(), RuleError> {
            calls += 1;
            Ok(())
        };
        let report = chain()
            .schedule_generation("top", true, &mut executor)
            .unwrap();
        assert_eq!(report.order, vec!["base", "mid", "top"]);
        assert!(report.executed.is_empty());
        assert_eq!(calls, 0);
    }

    #[test]
    fn rules_run_in_schedule_order() {
        let mut seen = Vec::new();
        let mut executor = |node: &GraphNode| -> Result<(), RuleError> {
            seen.push(node.name().to_string());
            Ok(())
        };
        let report = chain()
            .schedule_generation("top", false, &mut executor)
            .unwrap();
        assert_eq!(report.executed, vec!["base", "mid", "top"]);
        assert_eq!(seen, vec!["base", "mid", "top"]);
    }

    #[test]
    fn rule_failure_stops_generation() {
        let mut executor = |node: &GraphNode| -> Result<(), RuleError> {
            if node.name() == "mid" {
                Err(RuleError::new("bad expression"))
            } else {
                Ok(())
            }
        };
        match chain().schedule_generation("top", false, &mut executor) {
            Err(EngineError::RuleFailed {
                token,
                message,
                completed,
            }) => {
                assert_eq!(token, "mid");
                assert_eq!(message, "bad expression");
                assert_eq!(completed, vec!["base"]);
            }
            other => panic!("expected rule failure, got {other:?}"),
        }
    }

    #[test]
    fn plan_matches_dry_run() {
        let engine = chain();
        let plan = engine.plan_generation("top").unwrap();
        assert!(plan.dry_run);
        assert_eq!(plan.order, vec!["base", "mid", "top"]);
    }

    #[test]
    fn validation_reports_through_engine() {
        let engine = engine(&[("p", "{q}"), ("q", "5")]);
        let report = engine.validate_changes(&[ProposedChange::new("q", "{p}")]);
        assert!(!report.valid);
        assert_eq!(report.circular_dependencies.len(), 1);
        assert_eq!(report.impact.tokens_affected, 1);
    }

    #[test]
    fn json_config_is_applied() {
        let engine = Engine::from_json_config(r#"{"impactWarningThreshold":0}"#).unwrap();
        assert_eq!(engine.config().impact_warning_threshold, 0);
        assert_eq!(engine.graph().version(), 0);
    }
}
