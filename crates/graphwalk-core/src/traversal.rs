//! Shared traversal core.
//!
//! [`GraphTraversal`] owns the validated options and the per-run
//! [`TraversalState`]. Both [`DepthFirstSearch`](crate::DepthFirstSearch) and
//! [`BreadthFirstSearch`](crate::BreadthFirstSearch) go through it for hashing,
//! adjacency resolution, marking and edge reporting, so the two algorithms
//! share one edge policy.
//!
//! # Edge policy
//!
//! Visiting `target` from `origin`:
//!
//! - if `target` is undiscovered, the edge is a tree edge: the parent entry
//!   is recorded and the edge is always reported;
//! - otherwise the edge is reported when the graph is directed, or when
//!   `target` is discovered but not processed and is not `origin`'s own
//!   parent (that would be the tree edge seen from the other side).
//!
//! Undirected graphs therefore report each edge once and directed graphs
//! report each arc once.

use tracing::trace;

use crate::error::TraversalError;
use crate::options::{EdgeInfo, TraversalOptions, Visit};
use crate::state::{NodeState, TraversalState};

/// Options plus per-run state, with the primitives both searches use.
#[derive(Debug)]
pub struct GraphTraversal<'a, T> {
    options: TraversalOptions<'a, T>,
    state: TraversalState<T>,
}

impl<'a, T: Clone> GraphTraversal<'a, T> {
    #[must_use]
    pub fn new(options: TraversalOptions<'a, T>) -> Self {
        Self {
            options,
            state: TraversalState::new(),
        }
    }

    /// Compute the hash of `node` with the configured identity function.
    ///
    /// # Errors
    ///
    /// Propagates any failure of the hash callback.
    pub fn hash(&mut self, node: &T) -> Result<String, TraversalError<T>> {
        Ok((self.options.node_hash)(node)?)
    }

    /// Neighbors of `node`, normalized to a list.
    ///
    /// # Errors
    ///
    /// Propagates any failure of the adjacency callback.
    pub fn resolve_adjacency(&mut self, node: &T) -> Result<Vec<T>, TraversalError<T>> {
        Ok(self.options.adjacency.resolve(node)?)
    }

    /// Visitation status of `node` in the current (or last) run.
    ///
    /// # Errors
    ///
    /// Propagates any failure of the hash callback.
    pub fn node_state(&mut self, node: &T) -> Result<NodeState, TraversalError<T>> {
        let hash = self.hash(node)?;
        Ok(self.state.status(&hash))
    }

    /// Mark `node` as discovered. Idempotent.
    ///
    /// # Errors
    ///
    /// Propagates any failure of the hash callback.
    pub fn mark_discovered(&mut self, node: &T) -> Result<(), TraversalError<T>> {
        let hash = self.hash(node)?;
        self.state.discover(&hash, node.clone());
        Ok(())
    }

    /// Mark `node` as processed. Idempotent.
    ///
    /// # Errors
    ///
    /// Propagates any failure of the hash callback.
    pub fn mark_processed(&mut self, node: &T) -> Result<(), TraversalError<T>> {
        let hash = self.hash(node)?;
        self.state.process(&hash, node.clone());
        Ok(())
    }

    /// Clear all per-run tables.
    pub fn reset_state(&mut self) {
        self.state.clear();
    }

    #[must_use]
    pub const fn is_directed(&self) -> bool {
        self.options.directed
    }

    /// Read-only view of the per-run tables.
    #[must_use]
    pub const fn state(&self) -> &TraversalState<T> {
        &self.state
    }

    /// The node that first discovered `node`, if any.
    ///
    /// # Errors
    ///
    /// Propagates any failure of the hash callback.
    pub fn parent_of(&mut self, node: &T) -> Result<Option<T>, TraversalError<T>> {
        let hash = self.hash(node)?;
        Ok(self
            .state
            .parent(&hash)
            .and_then(|parent| self.state.node(parent))
            .cloned())
    }

    /// Nodes on the parent chain from the root of the last run down to
    /// `node`, both inclusive. Empty if `node` was never discovered.
    ///
    /// # Errors
    ///
    /// Propagates any failure of the hash callback.
    pub fn path_from_root(&mut self, node: &T) -> Result<Vec<T>, TraversalError<T>> {
        let hash = self.hash(node)?;
        if !self.state.is_discovered(&hash) {
            return Ok(Vec::new());
        }
        Ok(self.find_path(None, &hash).0)
    }

    /// Rebuild the parent chain from `target` down to `origin`.
    ///
    /// With `target == None` the chain runs from the root. Returns the nodes
    /// and their hashes, in visitation order. Hashes are the ones the last
    /// run computed, so this works without calling the hash function again.
    #[must_use]
    pub fn find_path(&self, target: Option<&str>, origin: &str) -> (Vec<T>, Vec<String>) {
        let hashes = self.state.chain(target, origin);
        let nodes = hashes
            .iter()
            .filter_map(|hash| self.state.node(hash).cloned())
            .collect();
        (nodes, hashes)
    }

    // -----------------------------------------------------------------------
    // Hash-keyed primitives used by the algorithms
    // -----------------------------------------------------------------------

    pub(crate) fn discover(&mut self, hash: &str, node: T) {
        trace!(node = hash, "discovered");
        self.state.discover(hash, node);
    }

    pub(crate) fn finish(&mut self, hash: &str, node: T) {
        trace!(node = hash, "processed");
        self.state.process(hash, node);
    }

    pub(crate) fn is_discovered(&self, hash: &str) -> bool {
        self.state.is_discovered(hash)
    }

    pub(crate) fn is_processed(&self, hash: &str) -> bool {
        self.state.is_processed(hash)
    }

    pub(crate) fn set_parent(&mut self, child: &str, parent: &str) {
        self.state.set_parent(child, parent);
    }

    pub(crate) fn parent_hash(&self, hash: &str) -> Option<&str> {
        self.state.parent(hash)
    }

    /// Whether an edge into an already discovered `target` gets reported.
    pub(crate) fn reports_non_tree_edge(&self, origin: &str, target: &str) -> bool {
        if self.options.directed {
            return true;
        }
        !self.state.is_processed(target) && self.state.parent(origin) != Some(target)
    }

    pub(crate) fn process_node(&mut self, node: &T) -> Result<Visit, TraversalError<T>> {
        Ok((self.options.process_node)(node)?)
    }

    pub(crate) fn report_edge(
        &mut self,
        origin: (&T, &str),
        target: (&T, &str),
        info: EdgeInfo,
    ) -> Result<(), TraversalError<T>> {
        trace!(
            origin = origin.1,
            target = target.1,
            kind = info.kind.as_str(),
            level = info.level,
            "edge"
        );
        self.state.count_edge();
        (self.options.process_edge)(origin.0, target.0, info)?;
        Ok(())
    }
}
