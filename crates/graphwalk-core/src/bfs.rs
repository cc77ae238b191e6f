//! Breadth-first search.
//!
//! Nodes are visited layer by layer from the root using a FIFO queue. Every
//! queued entry carries its level (edge count from the root), and the level
//! of the target side is passed to `process_edge` in [`EdgeInfo::level`].
//! Parent chains recorded by a BFS run are shortest paths back to the root.

use std::collections::{HashMap, VecDeque};

use tracing::debug;

use crate::error::TraversalError;
use crate::options::{EdgeInfo, EdgeKind, TraversalOptions, TraversalOrder, Visit};
use crate::state::NodeState;
use crate::traversal::GraphTraversal;

#[derive(Debug)]
struct Entry<T> {
    node: T,
    hash: String,
    level: usize,
}

/// Layered traversal over caller-defined nodes.
#[derive(Debug)]
pub struct BreadthFirstSearch<'a, T> {
    core: GraphTraversal<'a, T>,
    levels: HashMap<String, usize>,
}

impl<'a, T: Clone> BreadthFirstSearch<'a, T> {
    #[must_use]
    pub fn new(options: TraversalOptions<'a, T>) -> Self {
        Self {
            core: GraphTraversal::new(options),
            levels: HashMap::new(),
        }
    }

    #[must_use]
    pub const fn core(&self) -> &GraphTraversal<'a, T> {
        &self.core
    }

    pub const fn core_mut(&mut self) -> &mut GraphTraversal<'a, T> {
        &mut self.core
    }

    /// Visitation status of `node` after (or during an aborted) run.
    ///
    /// # Errors
    ///
    /// Propagates any failure of the hash callback.
    pub fn node_state(&mut self, node: &T) -> Result<NodeState, TraversalError<T>> {
        self.core.node_state(node)
    }

    /// Level at which `node` was discovered in the last run, or `None` if it
    /// was not reached.
    ///
    /// # Errors
    ///
    /// Propagates any failure of the hash callback.
    pub fn level_of(&mut self, node: &T) -> Result<Option<usize>, TraversalError<T>> {
        let hash = self.core.hash(node)?;
        Ok(self.levels.get(&hash).copied())
    }

    /// Walk everything reachable from `root`, nearest nodes first.
    ///
    /// # Errors
    ///
    /// Returns [`TraversalError::Callback`] if any callback fails.
    pub fn perform(&mut self, root: T, order: TraversalOrder) -> Result<(), TraversalError<T>> {
        self.core.reset_state();
        self.levels.clear();
        debug!(%order, directed = self.core.is_directed(), "breadth-first search started");

        let result = self.run(root, order);

        match &result {
            Ok(()) => debug!(
                nodes = self.core.state().processed_count(),
                edges = self.core.state().edges_reported(),
                depth = self.levels.values().max().copied().unwrap_or_default(),
                "breadth-first search finished"
            ),
            Err(err) => debug!(error = %err, "breadth-first search aborted"),
        }
        result
    }

    fn run(&mut self, root: T, order: TraversalOrder) -> Result<(), TraversalError<T>> {
        let hash = self.core.hash(&root)?;
        let mut queue = VecDeque::new();
        self.enqueue(&mut queue, root, hash, 0);

        while let Some(Entry { node, hash, level }) = queue.pop_front() {
            let expand = match order {
                TraversalOrder::PreOrder => self.core.process_node(&node)? == Visit::Continue,
                TraversalOrder::PostOrder => true,
            };

            if expand {
                for target in self.core.resolve_adjacency(&node)? {
                    let target_hash = self.core.hash(&target)?;
                    self.step(&mut queue, (&node, &hash), target, target_hash, level + 1)?;
                }
            }

            if order == TraversalOrder::PostOrder {
                self.core.process_node(&node)?;
            }
            self.core.finish(&hash, node);
        }
        Ok(())
    }

    fn enqueue(&mut self, queue: &mut VecDeque<Entry<T>>, node: T, hash: String, level: usize) {
        self.core.discover(&hash, node.clone());
        self.levels.insert(hash.clone(), level);
        queue.push_back(Entry { node, hash, level });
    }

    /// Handle the edge `origin → target`, where `target` sits at `level`.
    fn step(
        &mut self,
        queue: &mut VecDeque<Entry<T>>,
        origin: (&T, &str),
        target: T,
        target_hash: String,
        level: usize,
    ) -> Result<(), TraversalError<T>> {
        let (origin, origin_hash) = origin;

        if !self.core.is_discovered(&target_hash) {
            self.core.set_parent(&target_hash, origin_hash);
            self.core.report_edge(
                (origin, origin_hash),
                (&target, &target_hash),
                EdgeInfo {
                    kind: EdgeKind::Tree,
                    level: Some(level),
                },
            )?;
            self.enqueue(queue, target, target_hash, level);
            return Ok(());
        }

        if self.core.reports_non_tree_edge(origin_hash, &target_hash) {
            // Only the node being expanded is both discovered and open in
            // the sense of a DFS ancestor.
            let kind = if target_hash == origin_hash {
                EdgeKind::Back
            } else {
                EdgeKind::Cross
            };
            self.core.report_edge(
                (origin, origin_hash),
                (&target, &target_hash),
                EdgeInfo {
                    kind,
                    level: Some(level),
                },
            )?;
        }
        Ok(())
    }
}
