//! Per-run traversal bookkeeping.
//!
//! All marking lives in hash-keyed side tables owned by the traversal;
//! caller nodes are never touched. The state is cleared at the start of
//! every `perform` call.

use std::collections::HashMap;

/// Visitation status of a node, derived from [`TraversalState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeState {
    /// The node's hash.
    pub hash: String,
    /// The node has been reached.
    pub is_discovered: bool,
    /// The node's exploration is complete.
    pub is_processed: bool,
}

/// Discovered, processed and parent tables for one traversal.
///
/// Invariants:
/// - a hash is in `processed` only if it is in `discovered`;
/// - a hash gets a parent at most once (first discoverer wins), and the
///   root never gets one.
#[derive(Debug, Clone)]
pub struct TraversalState<T> {
    discovered: HashMap<String, T>,
    processed: HashMap<String, T>,
    parent: HashMap<String, String>,
    edges_reported: usize,
}

impl<T> Default for TraversalState<T> {
    fn default() -> Self {
        Self {
            discovered: HashMap::new(),
            processed: HashMap::new(),
            parent: HashMap::new(),
            edges_reported: 0,
        }
    }
}

impl<T> TraversalState<T> {
    /// Create an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.discovered.clear();
        self.processed.clear();
        self.parent.clear();
        self.edges_reported = 0;
    }

    /// Status of the node with `hash`.
    #[must_use]
    pub fn status(&self, hash: &str) -> NodeState {
        NodeState {
            hash: hash.to_string(),
            is_discovered: self.is_discovered(hash),
            is_processed: self.is_processed(hash),
        }
    }

    #[must_use]
    pub fn is_discovered(&self, hash: &str) -> bool {
        self.discovered.contains_key(hash)
    }

    #[must_use]
    pub fn is_processed(&self, hash: &str) -> bool {
        self.processed.contains_key(hash)
    }

    /// Record `node` as discovered. Idempotent.
    pub fn discover(&mut self, hash: &str, node: T) {
        if !self.discovered.contains_key(hash) {
            self.discovered.insert(hash.to_string(), node);
        }
    }

    /// Record `node` as processed, discovering it first if needed.
    /// Idempotent.
    pub fn process(&mut self, hash: &str, node: T)
    where
        T: Clone,
    {
        if self.processed.contains_key(hash) {
            return;
        }
        if !self.discovered.contains_key(hash) {
            self.discovered.insert(hash.to_string(), node.clone());
        }
        self.processed.insert(hash.to_string(), node);
    }

    /// Record `parent` as the discoverer of `child`.
    ///
    /// Returns `false` (and leaves the table alone) if `child` already has a
    /// parent.
    pub fn set_parent(&mut self, child: &str, parent: &str) -> bool {
        if self.parent.contains_key(child) {
            return false;
        }
        self.parent.insert(child.to_string(), parent.to_string());
        true
    }

    /// Hash of the node that discovered `hash`, if any.
    #[must_use]
    pub fn parent(&self, hash: &str) -> Option<&str> {
        self.parent.get(hash).map(String::as_str)
    }

    /// The node stored under `hash` at discovery time.
    #[must_use]
    pub fn node(&self, hash: &str) -> Option<&T> {
        self.discovered.get(hash)
    }

    /// Hashes on the parent chain from `ancestor` down to `descendant`,
    /// both inclusive.
    ///
    /// Walks the parent map upward from `descendant`. With no `ancestor`, or
    /// one that is not on the chain, the walk stops at the root and the
    /// returned path starts there instead.
    #[must_use]
    pub fn chain(&self, ancestor: Option<&str>, descendant: &str) -> Vec<String> {
        let mut chain = vec![descendant.to_string()];
        let mut current = descendant;
        while Some(current) != ancestor {
            match self.parent(current) {
                Some(parent) => {
                    chain.push(parent.to_string());
                    current = parent;
                }
                None => break,
            }
        }
        chain.reverse();
        chain
    }

    pub(crate) fn count_edge(&mut self) {
        self.edges_reported += 1;
    }

    #[must_use]
    pub fn discovered_count(&self) -> usize {
        self.discovered.len()
    }

    #[must_use]
    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }

    /// Number of edges handed to `process_edge` in the current run.
    #[must_use]
    pub const fn edges_reported(&self) -> usize {
        self.edges_reported
    }
}
