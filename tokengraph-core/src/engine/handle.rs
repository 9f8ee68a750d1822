//! Graph Handle
//!
//! Holds the "current graph" reference and swaps it when the token store
//! moves to a new version.
//!
//! # Lifecycle
//!
//! Readers call [`GraphHandle::current`] and get an `Arc` to an immutable
//! graph; the lock is held only long enough to clone the pointer. A refresh
//! builds the replacement graph with no lock held and then swaps the pointer
//! under a short write lock. Readers that took the old `Arc` finish against
//! the old graph, and nobody ever sees a half-built one.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::error::BuildError;
use crate::graph::TokenGraph;
use crate::token::Token;

/// The external token store, as seen by the engine.
pub trait TokenSource {
    /// Monotonic version of the store's contents.
    fn version(&self) -> u64;

    /// A full, consistent snapshot of every token at [`version`](Self::version).
    fn snapshot(&self) -> Vec<Token>;
}

/// What a refresh did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The store version matched the current graph; nothing was built.
    Unchanged { version: u64 },

    /// A new graph was built and swapped in.
    Rebuilt { previous: u64, version: u64 },

    /// A new graph was built, but a concurrent refresh had already installed
    /// the same or a newer version, so it was discarded.
    Superseded { current: u64, built: u64 },
}

/// Shared pointer to the current token graph.
#[derive(Debug)]
pub struct GraphHandle {
    current: RwLock<Arc<TokenGraph>>,
}

impl GraphHandle {
    /// Create a handle around an already-built graph.
    pub fn new(graph: TokenGraph) -> Self {
        Self {
            current: RwLock::new(Arc::new(graph)),
        }
    }

    /// Get the current graph.
    pub fn current(&self) -> Arc<TokenGraph> {
        self.current.read().clone()
    }

    /// Version of the current graph.
    pub fn version(&self) -> u64 {
        self.current.read().version()
    }

    /// Rebuild from `source` if its version differs from the current graph.
    ///
    /// On a build error the current graph stays in place.
    pub fn refresh<S: TokenSource + ?Sized>(
        &self,
        source: &S,
    ) -> Result<RefreshOutcome, BuildError> {
        let version = source.version();
        let current = self.version();
        if version == current {
            debug!(version, "token store unchanged");
            return Ok(RefreshOutcome::Unchanged { version });
        }

        let graph = TokenGraph::build_versioned(&source.snapshot(), version)?;

        let mut slot = self.current.write();
        let installed = slot.version();
        // Another refresh may have landed while we were building.
        if installed != current && installed >= version {
            return Ok(RefreshOutcome::Superseded {
                current: installed,
                built: version,
            });
        }
        *slot = Arc::new(graph);
        drop(slot);

        info!(previous = installed, version, "token graph rebuilt");
        Ok(RefreshOutcome::Rebuilt {
            previous: installed,
            version,
        })
    }
}

impl Default for GraphHandle {
    fn default() -> Self {
        Self::new(TokenGraph::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::DependencyView;

    struct FixedSource {
        version: u64,
        tokens: Vec<Token>,
    }

    impl TokenSource for FixedSource {
        fn version(&self) -> u64 {
            self.version
        }

        fn snapshot(&self) -> Vec<Token> {
            self.tokens.clone()
        }
    }

    fn source(version: u64, tokens: &[(&str, &str)]) -> FixedSource {
        FixedSource {
            version,
            tokens: tokens.iter().map(|(n, v)| Token::new(*n, *v, "")).collect(),
        }
    }

    #[test]
    fn starts_empty_at_version_zero() {
        let handle = GraphHandle::default();
        assert_eq!(handle.version(), 0);
        assert!(handle.current().is_empty());
    }

    #[test]
    fn refresh_swaps_in_new_graph() {
        let handle = GraphHandle::default();
        let outcome = handle.refresh(&source(1, &[("a", "1"), ("b", "{a}")])).unwrap();
        assert_eq!(outcome, RefreshOutcome::Rebuilt { previous: 0, version: 1 });
        assert_eq!(handle.current().len(), 2);
    }

    #[test]
    fn same_version_is_not_rebuilt() {
        let handle = GraphHandle::default();
        handle.refresh(&source(3, &[("a", "1")])).unwrap();
        let outcome = handle.refresh(&source(3, &[("a", "1"), ("b", "2")])).unwrap();
        assert_eq!(outcome, RefreshOutcome::Unchanged { version: 3 });
        assert_eq!(handle.current().len(), 1);
    }

    #[test]
    fn failed_build_keeps_previous_graph() {
        let handle = GraphHandle::default();
        handle.refresh(&source(1, &[("a", "1")])).unwrap();

        let err = handle.refresh(&source(2, &[("a", "{b}"), ("b", "{a}")])).unwrap_err();
        assert!(matches!(err, BuildError::Cycle(_)));
        assert_eq!(handle.version(), 1);
        assert!(handle.current().contains("a"));
    }

    #[test]
    fn old_readers_keep_their_graph() {
        let handle = GraphHandle::default();
        handle.refresh(&source(1, &[("a", "1")])).unwrap();
        let before = handle.current();

        handle.refresh(&source(2, &[("x", "1"), ("y", "{x}")])).unwrap();

        assert!(before.contains("a"));
        assert!(!handle.current().contains("a"));
    }
}
