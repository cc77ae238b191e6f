//! Subcommands and the traversal runner they share.

pub mod bfs;
pub mod completions;
pub mod config;
pub mod cycles;
pub mod dfs;

use std::cell::RefCell;
use std::path::PathBuf;

use clap::Args;
use graphwalk_core::config::GraphwalkConfig;
use graphwalk_core::identity::NodeIdentity;
use graphwalk_core::{
    AdjacencyResolver, BreadthFirstSearch, DepthFirstSearch, EdgeInfo, EdgeKind, Strategy,
    TraversalError, TraversalOptions, TraversalOrder, Visit,
};
use serde::Serialize;
use serde_json::Value;

use crate::document::{Document, symmetrize};
use crate::output::CliError;

/// Input arguments common to every traversal command.
#[derive(Args, Debug, Clone, Default)]
pub struct GraphArgs {
    /// Graph document (JSON, or TOML when the name ends in `.toml`).
    pub file: PathBuf,

    /// Start node id for adjacency documents.
    #[arg(long, value_name = "ID")]
    pub root: Option<String>,

    /// Treat every edge as undirected.
    #[arg(long)]
    pub undirected: bool,

    /// Property holding a node's children in tree documents.
    #[arg(long, value_name = "NAME")]
    pub children: Option<String>,

    /// Field identifying tree nodes (default: content hash).
    #[arg(long, value_name = "FIELD")]
    pub id: Option<String>,
}

/// Which engine to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Dfs {
        strategy: Strategy,
        detect_cycles: bool,
    },
    Bfs,
}

impl Algorithm {
    const fn name(self) -> &'static str {
        match self {
            Self::Dfs { .. } => "dfs",
            Self::Bfs => "bfs",
        }
    }
}

/// Flags merged over config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub order: TraversalOrder,
    pub directed: bool,
    pub children: String,
    pub id: Option<String>,
    pub root: Option<String>,
}

impl Settings {
    /// Flags win; anything left unset comes from `config`.
    pub fn resolve(args: &GraphArgs, order: Option<TraversalOrder>, config: &GraphwalkConfig) -> Self {
        Self {
            order: order.unwrap_or(config.traversal.order),
            directed: !args.undirected && config.traversal.directed,
            children: args
                .children
                .clone()
                .unwrap_or_else(|| config.input.children.clone()),
            id: args.id.clone().or_else(|| config.input.id.clone()),
            root: args.root.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeRecord {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EdgeRecord {
    pub from: String,
    pub to: String,
    pub kind: EdgeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<usize>,
}

/// Everything a traversal reported, in callback order.
#[derive(Debug, Clone, Serialize)]
pub struct TraversalReport {
    pub algorithm: &'static str,
    pub order: TraversalOrder,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<Strategy>,
    pub directed: bool,
    pub root: String,
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<EdgeRecord>,
}

/// How a traversal ended.
#[derive(Debug)]
pub enum Outcome {
    Done(TraversalReport),
    /// Node ids of the cycle, first id repeated at the end.
    Cycle(Vec<String>),
    Failed(CliError),
}

/// Run `algorithm` over `doc`.
///
/// # Errors
///
/// Fails only when an adjacency document offers no start node. Traversal
/// failures are reported through [`Outcome`].
pub fn traverse(doc: &Document, settings: &Settings, algorithm: Algorithm) -> anyhow::Result<Outcome> {
    match doc {
        Document::Tree(value) => {
            let identity = NodeIdentity::from_field(settings.id.as_deref());
            let hash = |n: &&Value| identity.hash(n);
            let adjacency = AdjacencyResolver::by_name(settings.children.clone());
            Ok(run(algorithm, settings, value, &hash, adjacency))
        }
        Document::Adjacency { root, edges } => {
            let mut edges = edges.clone();
            if !settings.directed {
                symmetrize(&mut edges);
            }
            let start = Document::adjacency_root(root.as_deref(), settings.root.as_deref(), &edges)?;
            let hash = |n: &&str| -> anyhow::Result<String> { Ok((*n).to_string()) };
            let adjacency = AdjacencyResolver::by_function(|n: &&str| {
                Ok(edges
                    .get(*n)
                    .map(|targets| targets.iter().map(String::as_str).collect::<Vec<_>>()))
            });
            Ok(run(algorithm, settings, start, &hash, adjacency))
        }
    }
}

fn run<T: Clone>(
    algorithm: Algorithm,
    settings: &Settings,
    root: T,
    hash: &dyn Fn(&T) -> anyhow::Result<String>,
    adjacency: AdjacencyResolver<'_, T>,
) -> Outcome {
    let root_id = match hash(&root) {
        Ok(id) => id,
        Err(err) => return Outcome::Failed(CliError::from(&TraversalError::<T>::from(err))),
    };

    let visited: RefCell<Vec<(String, T)>> = RefCell::new(Vec::new());
    let edges: RefCell<Vec<EdgeRecord>> = RefCell::new(Vec::new());

    let options = TraversalOptions::builder()
        .directed(settings.directed)
        .node_hash(hash)
        .adjacency(adjacency)
        .process_node(|n: &T| {
            visited.borrow_mut().push((hash(n)?, n.clone()));
            Ok(Visit::Continue)
        })
        .process_edge(|a: &T, b: &T, info: EdgeInfo| {
            edges.borrow_mut().push(EdgeRecord {
                from: hash(a)?,
                to: hash(b)?,
                kind: info.kind,
                level: info.level,
            });
            Ok(())
        })
        .build();

    let result = options.and_then(|options| match algorithm {
        Algorithm::Dfs {
            strategy,
            detect_cycles,
        } => {
            let mut dfs = if detect_cycles {
                DepthFirstSearch::with_cycle_detection(options)
            } else {
                DepthFirstSearch::new(options)
            };
            dfs.perform(root, settings.order, strategy).map(|()| Vec::new())
        }
        Algorithm::Bfs => {
            let mut bfs = BreadthFirstSearch::new(options);
            bfs.perform(root, settings.order)?;
            visited
                .borrow()
                .iter()
                .map(|(_, node)| bfs.level_of(node))
                .collect::<Result<Vec<_>, _>>()
        }
    });

    match result {
        Ok(levels) => {
            let nodes = visited
                .take()
                .into_iter()
                .enumerate()
                .map(|(i, (id, _))| NodeRecord {
                    id,
                    level: levels.get(i).copied().flatten(),
                })
                .collect();
            Outcome::Done(TraversalReport {
                algorithm: algorithm.name(),
                order: settings.order,
                strategy: match algorithm {
                    Algorithm::Dfs { strategy, .. } => Some(strategy),
                    Algorithm::Bfs => None,
                },
                directed: settings.directed,
                root: root_id,
                nodes,
                edges: edges.take(),
            })
        }
        Err(TraversalError::Cycle(cycle)) => Outcome::Cycle(cycle.hashes),
        Err(err) => Outcome::Failed(CliError::from(&err)),
    }
}
