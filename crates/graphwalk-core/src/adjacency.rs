//! Neighbor resolution.
//!
//! A traversal learns a node's neighbors through an [`AdjacencyResolver`],
//! which is either a named property read off the node ([`PropertyLookup`])
//! or an arbitrary function. Whatever the resolver produces is normalized
//! through [`Neighbors`] into a plain `Vec`: nothing becomes an empty list, a
//! bare value becomes a one-element list, a list stays a list.

use std::fmt;

// ---------------------------------------------------------------------------
// Neighbors
// ---------------------------------------------------------------------------

/// The raw shape of a node's adjacency before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Neighbors<T> {
    /// No adjacency at all (missing or null property).
    None,
    /// A single neighbor stored directly rather than in a list.
    One(T),
    /// A list of neighbors, in resolution order.
    Many(Vec<T>),
}

impl<T> Neighbors<T> {
    /// Normalize into a sequence.
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::None => Vec::new(),
            Self::One(node) => vec![node],
            Self::Many(nodes) => nodes,
        }
    }
}

impl<T> Default for Neighbors<T> {
    fn default() -> Self {
        Self::None
    }
}

impl<T> From<Vec<T>> for Neighbors<T> {
    fn from(nodes: Vec<T>) -> Self {
        Self::Many(nodes)
    }
}

impl<T> From<Option<T>> for Neighbors<T> {
    fn from(node: Option<T>) -> Self {
        node.map_or(Self::None, Self::One)
    }
}

impl<T> From<Option<Vec<T>>> for Neighbors<T> {
    fn from(nodes: Option<Vec<T>>) -> Self {
        nodes.map_or(Self::None, Self::Many)
    }
}

impl<T> FromIterator<T> for Neighbors<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::Many(iter.into_iter().collect())
    }
}

// ---------------------------------------------------------------------------
// PropertyLookup
// ---------------------------------------------------------------------------

/// Node types whose neighbors can be read from a named field.
///
/// Implement this to use [`AdjacencyResolver::by_name`] with your own node
/// type. Implementations for JSON and TOML document nodes are provided.
pub trait PropertyLookup: Sized {
    /// Read the field `name` and return it as adjacency.
    fn property(&self, name: &str) -> Neighbors<Self>;
}

impl<'a> PropertyLookup for &'a serde_json::Value {
    fn property(&self, name: &str) -> Neighbors<Self> {
        let node: &'a serde_json::Value = *self;
        match node.get(name) {
            None | Some(serde_json::Value::Null) => Neighbors::None,
            Some(serde_json::Value::Array(items)) => items.iter().collect(),
            Some(other) => Neighbors::One(other),
        }
    }
}

impl<'a> PropertyLookup for &'a toml::Value {
    fn property(&self, name: &str) -> Neighbors<Self> {
        let node: &'a toml::Value = *self;
        match node.get(name) {
            None => Neighbors::None,
            Some(toml::Value::Array(items)) => items.iter().collect(),
            Some(other) => Neighbors::One(other),
        }
    }
}

// ---------------------------------------------------------------------------
// AdjacencyResolver
// ---------------------------------------------------------------------------

/// Boxed neighbor function.
pub type NeighborFn<'a, T> = Box<dyn FnMut(&T) -> anyhow::Result<Neighbors<T>> + 'a>;

/// How a traversal enumerates the neighbors of a node.
pub enum AdjacencyResolver<'a, T> {
    /// Read a named property off the node.
    ByName {
        /// Property to read.
        property: String,
        /// Reader captured from the node type's [`PropertyLookup`] impl.
        read: fn(&T, &str) -> Neighbors<T>,
    },
    /// Call a function for every node.
    ByFunction(NeighborFn<'a, T>),
}

impl<'a, T> AdjacencyResolver<'a, T> {
    /// Resolve neighbors by reading `property` off each node.
    #[must_use]
    pub fn by_name(property: impl Into<String>) -> Self
    where
        T: PropertyLookup,
    {
        Self::ByName {
            property: property.into(),
            read: T::property,
        }
    }

    /// Resolve neighbors by calling `f` on each node.
    #[must_use]
    pub fn by_function<F, N>(mut f: F) -> Self
    where
        F: FnMut(&T) -> anyhow::Result<N> + 'a,
        N: Into<Neighbors<T>>,
    {
        Self::ByFunction(Box::new(move |node| f(node).map(Into::into)))
    }

    /// Produce the normalized neighbor list of `node`.
    ///
    /// # Errors
    ///
    /// Returns whatever error a [`AdjacencyResolver::ByFunction`] callback
    /// raises, unchanged.
    pub fn resolve(&mut self, node: &T) -> anyhow::Result<Vec<T>> {
        let neighbors = match self {
            Self::ByName { property, read } => read(node, property),
            Self::ByFunction(f) => f(node)?,
        };
        Ok(neighbors.into_vec())
    }
}

impl<T> fmt::Debug for AdjacencyResolver<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ByName { property, .. } => f.debug_tuple("ByName").field(property).finish(),
            Self::ByFunction(_) => f.write_str("ByFunction(..)"),
        }
    }
}
