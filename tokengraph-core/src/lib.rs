//! Tokengraph Core
//!
//! This crate models a design-token store as a directed graph of value
//! references and answers three questions about it:
//!
//! - What does a token depend on, and what depends on it?
//! - If some tokens change, what is the blast radius, and is the result still
//!   acyclic?
//! - In what order must computed tokens be generated so that every token's
//!   inputs are ready first?
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `token`: token records consumed from the external store
//! - `reference`: extraction of `{token.name}` references from raw values
//! - `graph`: the immutable token graph, its builder and copy-on-write overlay
//! - `analysis`: cycle detection, cascades, change validation and scheduling
//! - `engine`: tool-facing operations and the rebuild-and-swap graph handle
//! - `config`: risk and impact thresholds
//!
//! Every operation is synchronous, in-memory and CPU-bound. A built graph is
//! never mutated, so it can be shared freely between threads.
//!
//! # Example
//!
//! ```rust
//! use tokengraph_core::{Engine, EngineConfig, ProposedChange, Token};
//!
//! let tokens = vec![
//!     Token::new("base", "1", "spacing"),
//!     Token::new("mid", "{base}+1", "spacing"),
//!     Token::new("top", "{mid}*2", "spacing"),
//! ];
//! let engine = Engine::from_tokens(&tokens, EngineConfig::default()).unwrap();
//!
//! let report = engine.get_dependencies("top", 3).unwrap();
//! assert_eq!(report.dependencies.impact, 2);
//!
//! let plan = engine.plan_generation("top").unwrap();
//! assert_eq!(plan.order, vec!["base", "mid", "top"]);
//!
//! let check = engine.validate_changes(&[ProposedChange::new("base", "{top}")]);
//! assert!(!check.valid);
//! ```

pub mod analysis;
pub mod config;
pub mod engine;
pub mod error;
pub mod graph;
pub mod reference;
pub mod token;

pub use analysis::{CascadeResult, Direction, ValidationResult};
pub use config::{EngineConfig, RiskLevel, RiskThresholds};
pub use engine::{Engine, EngineError, RuleError, RuleExecutor, TokenSource};
pub use error::{
    BuildError, CycleError, DuplicateTokenError, NotFoundError, ParseError, ScheduleError,
    UnknownReferenceError,
};
pub use graph::{DependencyView, GraphNode, TokenGraph};
pub use token::{ProposedChange, Token};
