//! Graph documents read from disk.
//!
//! Two shapes are accepted, in JSON or TOML:
//!
//! - **Tree**: any nested document. Each node keeps its neighbors under a
//!   property (`children` unless configured otherwise).
//! - **Adjacency**: a top-level `edges` table mapping node ids to lists of
//!   neighbor ids, plus an optional `root`.
//!
//! ```toml
//! root = "build"
//!
//! [edges]
//! build = ["test", "lint"]
//! test = "deploy"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// A loaded graph document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Document {
    /// Nested nodes; the whole document is the root.
    Tree(Value),
    /// Explicit adjacency lists keyed by node id.
    Adjacency {
        /// Id of the start node, if the document names one.
        root: Option<String>,
        /// Neighbor ids per node id, in document order.
        edges: BTreeMap<String, Vec<String>>,
    },
}

#[derive(Deserialize)]
struct AdjacencyDoc {
    #[serde(default)]
    root: Option<String>,
    edges: BTreeMap<String, OneOrMany>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl From<OneOrMany> for Vec<String> {
    fn from(value: OneOrMany) -> Self {
        match value {
            OneOrMany::One(id) => vec![id],
            OneOrMany::Many(ids) => ids,
        }
    }
}

impl Document {
    /// Read and classify the document at `path`. Files ending in `.toml`
    /// are parsed as TOML, everything else as JSON.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or parsed, or if an `edges` table
    /// is present but malformed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        let doc = Self::parse(&content, is_toml)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        debug!(path = %path.display(), kind = doc.kind(), "loaded document");
        Ok(doc)
    }

    /// Parse document text.
    ///
    /// # Errors
    ///
    /// Fails on syntax errors and malformed `edges` tables.
    pub fn parse(content: &str, is_toml: bool) -> Result<Self> {
        let value: Value = if is_toml {
            toml::from_str(content)?
        } else {
            serde_json::from_str(content)?
        };
        Self::from_value(value)
    }

    fn from_value(value: Value) -> Result<Self> {
        if !value.get("edges").is_some_and(Value::is_object) {
            return Ok(Self::Tree(value));
        }
        let doc: AdjacencyDoc =
            serde_json::from_value(value).context("`edges` must map ids to an id or a list of ids")?;
        Ok(Self::Adjacency {
            root: doc.root,
            edges: doc
                .edges
                .into_iter()
                .map(|(id, targets)| (id, targets.into()))
                .collect(),
        })
    }

    /// Short name of the document shape, for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Tree(_) => "tree",
            Self::Adjacency { .. } => "adjacency",
        }
    }

    /// Start node of an adjacency document: the `--root` override, then
    /// the document's `root`, then the first id in sorted order.
    ///
    /// # Errors
    ///
    /// Fails when there is no candidate at all, i.e. an empty `edges` table
    /// and no root given.
    pub fn adjacency_root<'d>(
        root: Option<&'d str>,
        override_root: Option<&'d str>,
        edges: &'d BTreeMap<String, Vec<String>>,
    ) -> Result<&'d str> {
        if let Some(root) = override_root.or(root) {
            return Ok(root);
        }
        edges
            .keys()
            .next()
            .map(String::as_str)
            .ok_or_else(|| anyhow!("document has no nodes; pass --root to name a start node"))
    }
}

/// Add the reverse of every edge that is not already listed, so a document
/// that lists each undirected edge once can be walked as undirected.
pub fn symmetrize(edges: &mut BTreeMap<String, Vec<String>>) {
    let forward: Vec<(String, String)> = edges
        .iter()
        .flat_map(|(from, targets)| targets.iter().map(move |to| (from.clone(), to.clone())))
        .collect();
    for (from, to) in forward {
        let back = edges.entry(to).or_default();
        if !back.contains(&from) {
            back.push(from);
        }
    }
}
