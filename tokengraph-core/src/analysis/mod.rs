//! Graph Analyses
//!
//! Read-only algorithms over anything implementing
//! [`DependencyView`](crate::graph::DependencyView):
//!
//! - `cycle`: proves acyclicity or returns a concrete cycle path
//! - `cascade`: bounded transitive closure in either direction
//! - `validator`: simulates proposed changes on an overlay
//! - `scheduler`: inputs-before-outputs generation order
//!
//! None of these mutate the graph they are given, so any number of them may
//! run concurrently against the same shared graph.

mod cascade;
mod cycle;
mod scheduler;
mod validator;

pub use cascade::{cascade, cascade_all, CascadeResult, Direction, Reached};
pub use cycle::{canonical_cycle, collect_cycles_from, detect_cycle, detect_cycle_from};
pub use scheduler::{schedule, topological_sort};
pub use validator::{validate, ValidationResult};
