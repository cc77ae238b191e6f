//! Traversal options.
//!
//! [`TraversalOptions`] is an explicit configuration struct: required
//! fields (node hash, adjacency) are checked once in
//! [`TraversalOptionsBuilder::build`], optional callbacks default to no-ops.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::adjacency::{AdjacencyResolver, Neighbors, PropertyLookup};
use crate::error::TraversalError;

// ---------------------------------------------------------------------------
// TraversalOrder
// ---------------------------------------------------------------------------

/// When `process_node` fires relative to a node's neighbors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TraversalOrder {
    /// Before the neighbors are explored.
    #[serde(alias = "pre")]
    PreOrder,
    /// After the neighbors are explored.
    #[default]
    #[serde(alias = "post")]
    PostOrder,
}

impl TraversalOrder {
    /// Stable lowercase name, as accepted by [`FromStr`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PreOrder => "pre-order",
            Self::PostOrder => "post-order",
        }
    }
}

impl fmt::Display for TraversalOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for unrecognized enum names in config files and flags.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct ParseNameError {
    /// What was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
    /// Accepted spellings.
    pub expected: &'static str,
}

impl FromStr for TraversalOrder {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pre" | "preorder" | "pre-order" => Ok(Self::PreOrder),
            "post" | "postorder" | "post-order" => Ok(Self::PostOrder),
            _ => Err(ParseNameError {
                kind: "traversal order",
                value: s.to_string(),
                expected: "pre, post",
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Visit
// ---------------------------------------------------------------------------

/// Returned by `process_node` to steer expansion of that node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visit {
    /// Keep going.
    #[default]
    Continue,
    /// Do not expand this node's neighbors. Only meaningful in pre-order;
    /// other branches are unaffected.
    Prune,
}

// ---------------------------------------------------------------------------
// Edges
// ---------------------------------------------------------------------------

/// Classification of a reported edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeKind {
    /// Leads to the target's first discovery.
    Tree,
    /// Target is discovered but not yet processed (an open DFS ancestor).
    Back,
    /// Target was already processed, or (BFS) waiting in the queue.
    Cross,
}

impl EdgeKind {
    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tree => "tree",
            Self::Back => "back",
            Self::Cross => "cross",
        }
    }
}

/// Extra context passed along with every reported edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeInfo {
    /// How the edge relates to the traversal tree.
    pub kind: EdgeKind,
    /// BFS level of the target side (`origin level + 1`); `None` for DFS.
    pub level: Option<usize>,
}

// ---------------------------------------------------------------------------
// Callback types
// ---------------------------------------------------------------------------

/// Maps a node to its stable identity.
pub type HashFn<'a, T> = Box<dyn FnMut(&T) -> anyhow::Result<String> + 'a>;
/// Called once per reachable node.
pub type NodeFn<'a, T> = Box<dyn FnMut(&T) -> anyhow::Result<Visit> + 'a>;
/// Called once per reported edge `(origin, target, info)`.
pub type EdgeFn<'a, T> = Box<dyn FnMut(&T, &T, EdgeInfo) -> anyhow::Result<()> + 'a>;

// ---------------------------------------------------------------------------
// TraversalOptions
// ---------------------------------------------------------------------------

/// Resolved, validated traversal options.
pub struct TraversalOptions<'a, T> {
    pub(crate) directed: bool,
    pub(crate) adjacency: AdjacencyResolver<'a, T>,
    pub(crate) node_hash: HashFn<'a, T>,
    pub(crate) process_node: NodeFn<'a, T>,
    pub(crate) process_edge: EdgeFn<'a, T>,
}

impl<'a, T> TraversalOptions<'a, T> {
    /// Start building options.
    #[must_use]
    pub fn builder() -> TraversalOptionsBuilder<'a, T> {
        TraversalOptionsBuilder::default()
    }

    /// Whether the graph is treated as directed.
    #[must_use]
    pub const fn is_directed(&self) -> bool {
        self.directed
    }
}

impl<T> fmt::Debug for TraversalOptions<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraversalOptions")
            .field("directed", &self.directed)
            .field("adjacency", &self.adjacency)
            .finish_non_exhaustive()
    }
}

/// Builder for [`TraversalOptions`].
pub struct TraversalOptionsBuilder<'a, T> {
    directed: bool,
    adjacency: Option<AdjacencyResolver<'a, T>>,
    node_hash: Option<HashFn<'a, T>>,
    process_node: Option<NodeFn<'a, T>>,
    process_edge: Option<EdgeFn<'a, T>>,
}

impl<T> Default for TraversalOptionsBuilder<'_, T> {
    fn default() -> Self {
        Self {
            directed: true,
            adjacency: None,
            node_hash: None,
            process_node: None,
            process_edge: None,
        }
    }
}

impl<'a, T> TraversalOptionsBuilder<'a, T> {
    /// Treat the graph as directed (default) or undirected.
    #[must_use]
    pub const fn directed(mut self, directed: bool) -> Self {
        self.directed = directed;
        self
    }

    /// Set the node identity function.
    #[must_use]
    pub fn node_hash<F>(mut self, f: F) -> Self
    where
        F: FnMut(&T) -> anyhow::Result<String> + 'a,
    {
        self.node_hash = Some(Box::new(f));
        self
    }

    /// Set the adjacency resolver.
    #[must_use]
    pub fn adjacency(mut self, resolver: AdjacencyResolver<'a, T>) -> Self {
        self.adjacency = Some(resolver);
        self
    }

    /// Resolve neighbors with a function.
    #[must_use]
    pub fn children<F, N>(self, f: F) -> Self
    where
        F: FnMut(&T) -> anyhow::Result<N> + 'a,
        N: Into<Neighbors<T>>,
    {
        self.adjacency(AdjacencyResolver::by_function(f))
    }

    /// Resolve neighbors by reading a named property.
    #[must_use]
    pub fn children_property(self, property: impl Into<String>) -> Self
    where
        T: PropertyLookup,
    {
        self.adjacency(AdjacencyResolver::by_name(property))
    }

    /// Set the per-node callback.
    #[must_use]
    pub fn process_node<F>(mut self, f: F) -> Self
    where
        F: FnMut(&T) -> anyhow::Result<Visit> + 'a,
    {
        self.process_node = Some(Box::new(f));
        self
    }

    /// Set the per-edge callback.
    #[must_use]
    pub fn process_edge<F>(mut self, f: F) -> Self
    where
        F: FnMut(&T, &T, EdgeInfo) -> anyhow::Result<()> + 'a,
    {
        self.process_edge = Some(Box::new(f));
        self
    }

    /// Validate and produce the options.
    ///
    /// # Errors
    ///
    /// Returns [`TraversalError::Configuration`] if the node hash function or
    /// the adjacency resolver was never set.
    pub fn build(self) -> Result<TraversalOptions<'a, T>, TraversalError<T>> {
        let node_hash = self
            .node_hash
            .ok_or(TraversalError::Configuration { option: "node_hash" })?;
        let adjacency = self
            .adjacency
            .ok_or(TraversalError::Configuration { option: "adjacency" })?;

        Ok(TraversalOptions {
            directed: self.directed,
            adjacency,
            node_hash,
            process_node: self
                .process_node
                .unwrap_or_else(|| Box::new(|_: &T| -> anyhow::Result<Visit> { Ok(Visit::Continue) })),
            process_edge: self.process_edge.unwrap_or_else(|| {
                Box::new(|_: &T, _: &T, _: EdgeInfo| -> anyhow::Result<()> { Ok(()) })
            }),
        })
    }
}
