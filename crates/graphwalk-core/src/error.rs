use std::fmt;

/// Machine-readable error codes for agent-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    MissingOption,
    InvalidConfig,
    CycleDetected,
    CallbackFailed,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::MissingOption => "E1001",
            Self::InvalidConfig => "E1002",
            Self::CycleDetected => "E2001",
            Self::CallbackFailed => "E3001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::MissingOption => "Required traversal option missing",
            Self::InvalidConfig => "Config file parse error",
            Self::CycleDetected => "Cycle detected during traversal",
            Self::CallbackFailed => "Traversal callback failed",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::MissingOption => {
                Some("Provide both a node hash function and an adjacency resolver.")
            }
            Self::InvalidConfig => Some("Fix syntax in graphwalk.toml and retry."),
            Self::CycleDetected => Some("Remove one edge of the reported path to break the cycle."),
            Self::CallbackFailed => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors raised by [`DepthFirstSearch`](crate::DepthFirstSearch) and
/// [`BreadthFirstSearch`](crate::BreadthFirstSearch).
#[derive(Debug, thiserror::Error)]
pub enum TraversalError<T> {
    /// A required option was not supplied when the options were built.
    #[error("missing required traversal option `{option}`")]
    Configuration {
        /// Name of the missing option.
        option: &'static str,
    },

    /// The cycle-detecting DFS found a back edge.
    #[error("{0}")]
    Cycle(CycleError<T>),

    /// A caller-supplied callback failed; the error is passed through as-is.
    #[error(transparent)]
    Callback(#[from] anyhow::Error),
}

impl<T> TraversalError<T> {
    /// Return the machine-readable error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Configuration { .. } => ErrorCode::MissingOption,
            Self::Cycle(_) => ErrorCode::CycleDetected,
            Self::Callback(_) => ErrorCode::CallbackFailed,
        }
    }

    /// The cycle carried by this error, if it is a [`TraversalError::Cycle`].
    #[must_use]
    pub const fn as_cycle(&self) -> Option<&CycleError<T>> {
        match self {
            Self::Cycle(cycle) => Some(cycle),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// CycleError
// ---------------------------------------------------------------------------

/// A cycle closed by a back edge during a cycle-detecting DFS.
///
/// `path` starts at the back edge's target, follows the parent chain down to
/// the edge's origin, and repeats the target at the end. For a traversal
/// that walks `A → B → C` and then finds `C → A`, the path is
/// `[A, B, C, A]`. `hashes` holds the node hashes in the same order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleError<T> {
    /// Nodes forming the cycle, first node repeated at the end.
    pub path: Vec<T>,
    /// Hashes of `path`, index for index.
    pub hashes: Vec<String>,
}

impl<T> CycleError<T> {
    /// Number of distinct nodes in the cycle (path length minus the repeated
    /// start node).
    #[must_use]
    pub fn cycle_len(&self) -> usize {
        if self.hashes.len() <= 1 {
            return 0;
        }
        self.hashes.len() - 1
    }

    /// Returns `true` if the cycle is a node pointing at itself.
    #[must_use]
    pub fn is_self_loop(&self) -> bool {
        self.cycle_len() == 1
    }

    /// Returns `true` if this is a 2-node cycle (A ↔ B).
    #[must_use]
    pub fn is_mutual(&self) -> bool {
        self.cycle_len() == 2
    }

    /// Consume the error and return the node path.
    #[must_use]
    pub fn into_path(self) -> Vec<T> {
        self.path
    }
}

impl<T> fmt::Display for CycleError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let first = self.hashes.first().map_or("", String::as_str);
        if self.is_self_loop() {
            write!(f, "cycle detected: self-loop on '{first}'")
        } else if self.is_mutual() {
            write!(
                f,
                "cycle detected: mutual edge between '{first}' and '{}'",
                self.hashes[1]
            )
        } else {
            write!(
                f,
                "cycle detected ({} nodes): {}",
                self.cycle_len(),
                self.hashes.join(" → ")
            )
        }
    }
}

impl<T: fmt::Debug> std::error::Error for CycleError<T> {}
