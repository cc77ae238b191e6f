//! graphwalk-core library.
//!
//! Depth-first and breadth-first traversal over caller-defined nodes. The
//! engine never inspects a node directly: it identifies nodes through a
//! caller-supplied hash function and enumerates neighbors through an
//! [`AdjacencyResolver`].
//!
//! # Modules
//!
//! - [`adjacency`]: neighbor resolution and normalization.
//! - [`options`]: validated traversal options and callback types.
//! - [`state`]: per-run discovered/processed/parent bookkeeping.
//! - [`traversal`]: the shared core both algorithms build on.
//! - [`dfs`]: recursive and iterative DFS, optional cycle detection.
//! - [`bfs`]: layered BFS with level tracking.
//! - [`identity`]: ready-made node hash functions for JSON documents.
//! - [`config`]: TOML configuration and dotted-path lookup.
//!
//! # Conventions
//!
//! - **Errors**: library operations return [`TraversalError`]; caller
//!   callbacks return `anyhow::Result` and their failures pass through
//!   unmodified.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod adjacency;
pub mod bfs;
pub mod config;
pub mod dfs;
pub mod error;
pub mod identity;
pub mod options;
pub mod state;
pub mod traversal;

pub use adjacency::{AdjacencyResolver, Neighbors, PropertyLookup};
pub use bfs::BreadthFirstSearch;
pub use dfs::{DepthFirstSearch, Strategy};
pub use error::{CycleError, ErrorCode, TraversalError};
pub use options::{EdgeInfo, EdgeKind, TraversalOptions, TraversalOrder, Visit};
pub use state::{NodeState, TraversalState};
pub use traversal::GraphTraversal;
