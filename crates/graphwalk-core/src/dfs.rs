//! Depth-first search.
//!
//! # Overview
//!
//! [`DepthFirstSearch`] walks everything reachable from a root, in
//! neighbor-resolution order, following the classic discovered/processed
//! scheme. Two strategies are available:
//!
//! - **Recursive**: one call frame per open node.
//! - **Iterative**: an explicit stack of open nodes, each with a cursor over
//!   its remaining neighbors. Use it for graphs deep enough to exhaust the
//!   thread stack.
//!
//! Both strategies drive the same open/step/close primitives, so they produce
//! the same sequence of callbacks for the same graph and order.
//!
//! # Processed timing
//!
//! A node becomes processed once all of its neighbors have been handled,
//! whatever the order. In pre-order `process_node` fires on discovery, but
//! the node stays "open" until its subtree is done. This keeps back edges
//! (edges into open nodes) meaningful in both orders.
//!
//! # Cycle detection
//!
//! [`DepthFirstSearch::with_cycle_detection`] checks every reported edge
//! before it reaches `process_edge`. An edge into an open node closes a
//! cycle; in undirected graphs the edge back to the origin's own parent is
//! excluded. The traversal then fails with [`TraversalError::Cycle`] and no
//! further callbacks fire.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{CycleError, TraversalError};
use crate::options::{EdgeInfo, EdgeKind, ParseNameError, TraversalOptions, TraversalOrder, Visit};
use crate::state::NodeState;
use crate::traversal::GraphTraversal;

// ---------------------------------------------------------------------------
// Strategy
// ---------------------------------------------------------------------------

/// How the DFS keeps track of open nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Call-stack recursion.
    #[default]
    Recursive,
    /// Explicit stack of open nodes.
    Iterative,
}

impl Strategy {
    /// Stable lowercase name, as accepted by [`FromStr`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Recursive => "recursive",
            Self::Iterative => "iterative",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "recursive" => Ok(Self::Recursive),
            "iterative" => Ok(Self::Iterative),
            _ => Err(ParseNameError {
                kind: "strategy",
                value: s.to_string(),
                expected: "recursive, iterative",
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// DepthFirstSearch
// ---------------------------------------------------------------------------

/// An open node on the iterative strategy's stack.
struct Frame<T> {
    node: T,
    hash: String,
    pending: std::vec::IntoIter<T>,
}

/// Depth-first traversal over caller-defined nodes.
#[derive(Debug)]
pub struct DepthFirstSearch<'a, T> {
    core: GraphTraversal<'a, T>,
    detect_cycles: bool,
}

impl<'a, T: Clone> DepthFirstSearch<'a, T> {
    #[must_use]
    pub fn new(options: TraversalOptions<'a, T>) -> Self {
        Self {
            core: GraphTraversal::new(options),
            detect_cycles: false,
        }
    }

    /// A DFS that fails with [`TraversalError::Cycle`] on the first back edge.
    ///
    /// In undirected graphs the edge from a node back to its own parent is
    /// the tree edge walked in reverse and never counts. Directed graphs have
    /// no such exclusion: `A → B → A` is reported as a two-node cycle.
    #[must_use]
    pub fn with_cycle_detection(options: TraversalOptions<'a, T>) -> Self {
        Self {
            core: GraphTraversal::new(options),
            detect_cycles: true,
        }
    }

    #[must_use]
    pub const fn detects_cycles(&self) -> bool {
        self.detect_cycles
    }

    /// Shared core, for inspecting the last run.
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

    /// Walk everything reachable from `root`.
    ///
    /// State from any previous run is discarded first.
    ///
    /// # Errors
    ///
    /// - [`TraversalError::Cycle`] if cycle detection is on and a back edge
    ///   is found.
    /// - [`TraversalError::Callback`] if any callback fails.
    pub fn perform(
        &mut self,
        root: T,
        order: TraversalOrder,
        strategy: Strategy,
    ) -> Result<(), TraversalError<T>> {
        self.core.reset_state();
        debug!(
            %order,
            %strategy,
            directed = self.core.is_directed(),
            detect_cycles = self.detect_cycles,
            "depth-first search started"
        );

        let root_hash = self.core.hash(&root)?;
        let result = match strategy {
            Strategy::Recursive => self.visit(root, &root_hash, order),
            Strategy::Iterative => self.walk(root, root_hash, order),
        };

        match &result {
            Ok(()) => debug!(
                nodes = self.core.state().processed_count(),
                edges = self.core.state().edges_reported(),
                "depth-first search finished"
            ),
            Err(TraversalError::Cycle(cycle)) => warn!(%cycle, "depth-first search aborted"),
            Err(err) => debug!(error = %err, "depth-first search aborted"),
        }
        result
    }

    /// Recursive strategy.
    fn visit(&mut self, node: T, hash: &str, order: TraversalOrder) -> Result<(), TraversalError<T>> {
        for target in self.open(&node, hash, order)? {
            let target_hash = self.core.hash(&target)?;
            if self.step(&node, hash, &target, &target_hash)? {
                self.visit(target, &target_hash, order)?;
            }
        }
        self.close(node, hash, order)
    }

    /// Iterative strategy.
    fn walk(&mut self, root: T, root_hash: String, order: TraversalOrder) -> Result<(), TraversalError<T>> {
        let mut stack: Vec<Frame<T>> = Vec::new();
        self.push(&mut stack, root, root_hash, order)?;

        while let Some(frame) = stack.last_mut() {
            let Some(target) = frame.pending.next() else {
                if let Some(done) = stack.pop() {
                    self.close(done.node, &done.hash, order)?;
                }
                continue;
            };

            let target_hash = self.core.hash(&target)?;
            let Some(origin) = stack.last() else {
                break;
            };
            if self.step(&origin.node, &origin.hash, &target, &target_hash)? {
                self.push(&mut stack, target, target_hash, order)?;
            }
        }
        Ok(())
    }

    fn push(
        &mut self,
        stack: &mut Vec<Frame<T>>,
        node: T,
        hash: String,
        order: TraversalOrder,
    ) -> Result<(), TraversalError<T>> {
        let pending = self.open(&node, &hash, order)?.into_iter();
        stack.push(Frame { node, hash, pending });
        Ok(())
    }

    /// Discover `node` and return the neighbors left to explore.
    fn open(&mut self, node: &T, hash: &str, order: TraversalOrder) -> Result<Vec<T>, TraversalError<T>> {
        self.core.discover(hash, node.clone());
        if order == TraversalOrder::PreOrder && self.core.process_node(node)? == Visit::Prune {
            return Ok(Vec::new());
        }
        self.core.resolve_adjacency(node)
    }

    /// Finish `node` once its neighbors are exhausted.
    fn close(&mut self, node: T, hash: &str, order: TraversalOrder) -> Result<(), TraversalError<T>> {
        if order == TraversalOrder::PostOrder {
            // Pruning is meaningless here: the neighbors are already done.
            self.core.process_node(&node)?;
        }
        self.core.finish(hash, node);
        Ok(())
    }

    /// Handle the edge `origin → target`. Returns `true` when `target` was
    /// undiscovered and must be entered next.
    fn step(
        &mut self,
        origin: &T,
        origin_hash: &str,
        target: &T,
        target_hash: &str,
    ) -> Result<bool, TraversalError<T>> {
        if !self.core.is_discovered(target_hash) {
            self.core.set_parent(target_hash, origin_hash);
            self.emit(origin, origin_hash, target, target_hash, EdgeKind::Tree)?;
            return Ok(true);
        }

        if self.core.reports_non_tree_edge(origin_hash, target_hash) {
            let kind = if self.core.is_processed(target_hash) {
                EdgeKind::Cross
            } else {
                EdgeKind::Back
            };
            self.emit(origin, origin_hash, target, target_hash, kind)?;
        }
        Ok(false)
    }

    fn emit(
        &mut self,
        origin: &T,
        origin_hash: &str,
        target: &T,
        target_hash: &str,
        kind: EdgeKind,
    ) -> Result<(), TraversalError<T>> {
        if self.detect_cycles {
            self.check_cycle(origin_hash, target, target_hash)?;
        }
        self.core.report_edge(
            (origin, origin_hash),
            (target, target_hash),
            EdgeInfo { kind, level: None },
        )
    }

    fn check_cycle(&self, origin_hash: &str, target: &T, target_hash: &str) -> Result<(), TraversalError<T>> {
        if !self.core.is_discovered(target_hash) || self.core.is_processed(target_hash) {
            return Ok(());
        }
        if !self.core.is_directed() && self.core.parent_hash(origin_hash) == Some(target_hash) {
            return Ok(());
        }

        let (mut path, mut hashes) = self.core.find_path(Some(target_hash), origin_hash);
        path.push(target.clone());
        hashes.push(target_hash.to_string());
        Err(TraversalError::Cycle(CycleError { path, hashes }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    type Adj = HashMap<&'static str, Vec<&'static str>>;

    fn adj(edges: &[(&'static str, &[&'static str])]) -> Adj {
        edges.iter().map(|(k, v)| (*k, v.to_vec())).collect()
    }

    fn run(
        edges: &Adj,
        order: TraversalOrder,
        strategy: Strategy,
        directed: bool,
    ) -> (Vec<&'static str>, Vec<(&'static str, &'static str, EdgeKind)>) {
        let mut nodes = Vec::new();
        let mut seen_edges = Vec::new();
        {
            let options = TraversalOptions::builder()
                .directed(directed)
                .node_hash(|n: &&str| Ok((*n).to_string()))
                .children(|n: &&str| Ok(edges.get(n).cloned().unwrap_or_default()))
                .process_node(|n: &&str| {
                    nodes.push(*n);
                    Ok(Visit::Continue)
                })
                .process_edge(|a: &&str, b: &&str, info: EdgeInfo| {
                    seen_edges.push((*a, *b, info.kind));
                    Ok(())
                })
                .build()
                .expect("options");
            let mut dfs = DepthFirstSearch::new(options);
            dfs.perform("1", order, strategy).expect("dfs");
        }
        (nodes, seen_edges)
    }

    /// `1 → {2,3}`, `2 → 5`, `5 → 4`, `3 → 4`, `4 → 1`.
    fn sample() -> Adj {
        adj(&[
            ("1", &["2", "3"]),
            ("2", &["5"]),
            ("5", &["4"]),
            ("3", &["4"]),
            ("4", &["1"]),
        ])
    }

    /// The same shape without the `4 → 1` arc.
    fn diamond() -> Adj {
        adj(&[
            ("1", &["2", "3"]),
            ("2", &["5"]),
            ("5", &["4"]),
            ("3", &["4"]),
        ])
    }

    #[test]
    fn post_order_visits_children_first() {
        for strategy in [Strategy::Recursive, Strategy::Iterative] {
            let (nodes, _) = run(&sample(), TraversalOrder::PostOrder, strategy, true);
            assert_eq!(nodes, ["4", "5", "2", "3", "1"], "{strategy}");
        }
    }

    #[test]
    fn pre_order_visits_parents_first() {
        for strategy in [Strategy::Recursive, Strategy::Iterative] {
            let (nodes, _) = run(&sample(), TraversalOrder::PreOrder, strategy, true);
            assert_eq!(nodes, ["1", "2", "5", "4", "3"], "{strategy}");
        }
    }

    #[test]
    fn directed_reports_arcs_into_processed_nodes() {
        let (_, edges) = run(&sample(), TraversalOrder::PostOrder, Strategy::Recursive, true);
        assert_eq!(
            edges,
            [
                ("1", "2", EdgeKind::Tree),
                ("2", "5", EdgeKind::Tree),
                ("5", "4", EdgeKind::Tree),
                ("4", "1", EdgeKind::Back),
                ("1", "3", EdgeKind::Tree),
                ("3", "4", EdgeKind::Cross),
            ]
        );
    }

    #[test]
    fn undirected_triangle_reports_each_edge_once() {
        let triangle = adj(&[("1", &["2", "3"]), ("2", &["1", "3"]), ("3", &["1", "2"])]);
        for order in [TraversalOrder::PreOrder, TraversalOrder::PostOrder] {
            for strategy in [Strategy::Recursive, Strategy::Iterative] {
                let (_, edges) = run(&triangle, order, strategy, false);
                assert_eq!(
                    edges,
                    [
                        ("1", "2", EdgeKind::Tree),
                        ("2", "3", EdgeKind::Tree),
                        ("3", "1", EdgeKind::Back),
                    ],
                    "{order} {strategy}"
                );
            }
        }
    }

    /// Run a cycle-detecting DFS that must fail; returns the error and the
    /// number of `process_node` and `process_edge` calls that went through.
    fn detect(
        edges: &Adj,
        root: &'static str,
        directed: bool,
        order: TraversalOrder,
        strategy: Strategy,
    ) -> (TraversalError<&'static str>, usize, usize) {
        let mut nodes_seen = 0;
        let mut edges_seen = 0;
        let err = {
            let options = TraversalOptions::builder()
                .directed(directed)
                .node_hash(|n: &&str| Ok((*n).to_string()))
                .children(|n: &&str| Ok(edges.get(n).cloned().unwrap_or_default()))
                .process_node(|_: &&str| {
                    nodes_seen += 1;
                    Ok(Visit::Continue)
                })
                .process_edge(|_: &&str, _: &&str, _: EdgeInfo| {
                    edges_seen += 1;
                    Ok(())
                })
                .build()
                .expect("options");
            let mut dfs = DepthFirstSearch::with_cycle_detection(options);
            assert!(dfs.detects_cycles());
            dfs.perform(root, order, strategy).expect_err("cycle expected")
        };
        (err, nodes_seen, edges_seen)
    }

    #[test]
    fn three_node_cycle_is_reported_with_closed_path() {
        let graph = adj(&[("A", &["B"]), ("B", &["C"]), ("C", &["A"])]);
        for strategy in [Strategy::Recursive, Strategy::Iterative] {
            let (err, _, edges_seen) = detect(&graph, "A", true, TraversalOrder::PostOrder, strategy);
            let cycle = err.as_cycle().expect("cycle error");
            assert_eq!(cycle.path, ["A", "B", "C", "A"]);
            assert_eq!(cycle.hashes, ["A", "B", "C", "A"]);
            // A->B and B->C went through, the closing edge did not.
            assert_eq!(edges_seen, 2);
        }
    }

    #[test]
    fn no_callbacks_fire_after_the_closing_edge() {
        // Directed A -> B -> A; C hangs off B and must never be reached.
        let graph = adj(&[("A", &["B"]), ("B", &["A", "C"])]);
        for strategy in [Strategy::Recursive, Strategy::Iterative] {
            let (err, nodes_seen, edges_seen) = detect(&graph, "A", true, TraversalOrder::PreOrder, strategy);
            assert_eq!(err.as_cycle().expect("cycle").path, ["A", "B", "A"]);
            assert_eq!((nodes_seen, edges_seen), (2, 1), "pre-order {strategy}");

            // Both nodes are still open when the cycle closes.
            let (err, nodes_seen, edges_seen) = detect(&graph, "A", true, TraversalOrder::PostOrder, strategy);
            assert_eq!(err.as_cycle().expect("cycle").path, ["A", "B", "A"]);
            assert_eq!((nodes_seen, edges_seen), (0, 1), "post-order {strategy}");
        }
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let graph = adj(&[("A", &["A"])]);
        let (err, _, edges_seen) = detect(&graph, "A", true, TraversalOrder::PostOrder, Strategy::Recursive);
        let cycle = err.as_cycle().expect("cycle error");
        assert!(cycle.is_self_loop());
        assert_eq!(cycle.path, ["A", "A"]);
        assert_eq!(edges_seen, 0);
    }

    #[test]
    fn directed_two_cycle_is_mutual() {
        let graph = adj(&[("A", &["B"]), ("B", &["A"])]);
        let (err, _, _) = detect(&graph, "A", true, TraversalOrder::PostOrder, Strategy::Iterative);
        assert!(err.as_cycle().is_some_and(CycleError::is_mutual));
    }

    #[test]
    fn undirected_tree_has_no_cycle() {
        let graph = adj(&[("A", &["B", "C"]), ("B", &["A"]), ("C", &["A"])]);
        let options = TraversalOptions::builder()
            .directed(false)
            .node_hash(|n: &&str| Ok((*n).to_string()))
            .children(|n: &&str| Ok(graph.get(n).cloned().unwrap_or_default()))
            .build()
            .expect("options");
        let mut dfs = DepthFirstSearch::with_cycle_detection(options);
        dfs.perform("A", TraversalOrder::PreOrder, Strategy::Recursive)
            .expect("no cycle");
        let state = dfs.node_state(&"C").expect("state");
        assert!(state.is_processed);
    }

    #[test]
    fn undirected_triangle_is_a_cycle() {
        let graph = adj(&[("A", &["B", "C"]), ("B", &["A", "C"]), ("C", &["A", "B"])]);
        let (err, _, _) = detect(&graph, "A", false, TraversalOrder::PostOrder, Strategy::Recursive);
        assert_eq!(err.as_cycle().expect("cycle").path, ["A", "B", "C", "A"]);
    }

    #[test]
    fn acyclic_diamond_passes_cycle_detection() {
        let options = TraversalOptions::builder()
            .node_hash(|n: &&str| Ok((*n).to_string()))
            .children(|n: &&str| {
                let edges = diamond();
                Ok(edges.get(n).cloned().unwrap_or_default())
            })
            .build()
            .expect("options");
        let mut dfs = DepthFirstSearch::with_cycle_detection(options);
        dfs.perform("1", TraversalOrder::PostOrder, Strategy::Iterative)
            .expect("diamond is acyclic");
    }

    #[test]
    fn prune_skips_subtree_but_not_siblings() {
        for strategy in [Strategy::Recursive, Strategy::Iterative] {
            let graph = sample();
            let mut nodes = Vec::new();
            {
                let options = TraversalOptions::builder()
                    .node_hash(|n: &&str| Ok((*n).to_string()))
                    .children(|n: &&str| Ok(graph.get(n).cloned().unwrap_or_default()))
                    .process_node(|n: &&str| {
                        nodes.push(*n);
                        Ok(if *n == "2" { Visit::Prune } else { Visit::Continue })
                    })
                    .build()
                    .expect("options");
                let mut dfs = DepthFirstSearch::new(options);
                dfs.perform("1", TraversalOrder::PreOrder, strategy).expect("dfs");
                assert!(dfs.node_state(&"2").expect("state").is_processed);
                assert!(!dfs.node_state(&"5").expect("state").is_discovered);
            }
            // 4 is still reached through 3.
            assert_eq!(nodes, ["1", "2", "3", "4"], "{strategy}");
        }
    }

    #[test]
    fn callback_errors_abort_unchanged() {
        let graph = sample();
        let mut processed = 0;
        let err = {
            let options = TraversalOptions::builder()
                .node_hash(|n: &&str| Ok((*n).to_string()))
                .children(|n: &&str| Ok(graph.get(n).cloned().unwrap_or_default()))
                .process_node(|n: &&str| {
                    if *n == "5" {
                        anyhow::bail!("refusing {n}");
                    }
                    processed += 1;
                    Ok(Visit::Continue)
                })
                .build()
                .expect("options");
            let mut dfs = DepthFirstSearch::new(options);
            dfs.perform("1", TraversalOrder::PostOrder, Strategy::Iterative)
                .expect_err("must fail")
        };
        assert!(matches!(err, TraversalError::Callback(_)));
        assert_eq!(err.to_string(), "refusing 5");
        // Only 4 finished before 5 failed.
        assert_eq!(processed, 1);
    }

    #[test]
    fn perform_resets_state_between_runs() {
        let graph = diamond();
        let options = TraversalOptions::builder()
            .node_hash(|n: &&str| Ok((*n).to_string()))
            .children(|n: &&str| Ok(graph.get(n).cloned().unwrap_or_default()))
            .build()
            .expect("options");
        let mut dfs = DepthFirstSearch::new(options);
        dfs.perform("1", TraversalOrder::PostOrder, Strategy::Recursive).expect("first");
        assert_eq!(dfs.core().state().processed_count(), 5);

        dfs.perform("3", TraversalOrder::PostOrder, Strategy::Recursive).expect("second");
        assert_eq!(dfs.core().state().processed_count(), 2);
        assert!(!dfs.node_state(&"1").expect("state").is_discovered);
        assert_eq!(dfs.core_mut().path_from_root(&"4").expect("path"), ["3", "4"]);
    }

    #[test]
    fn strategy_parses() {
        assert_eq!("Iterative".parse::<Strategy>(), Ok(Strategy::Iterative));
        assert_eq!(Strategy::default(), Strategy::Recursive);
        assert!("sideways".parse::<Strategy>().is_err());
    }
}
