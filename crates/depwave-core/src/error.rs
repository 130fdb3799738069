use std::fmt;

/// Failures raised by graph construction and the sequencing operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    /// A full ordering or layering could not place every node.
    #[error("dependency cycle detected: {} item(s) could not be ordered", unresolved.len())]
    CycleDetected {
        /// Nodes never released by the traversal, in discovery order.
        unresolved: Vec<String>,
        /// Strongly connected components that form cycles, each sorted by id.
        cycles: Vec<Vec<String>>,
    },

    /// The plan document could not be turned into a graph.
    #[error("malformed input: {0}")]
    MalformedInput(String),
}

impl PlanError {
    /// Machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::CycleDetected { .. } => ErrorCode::CycleDetected,
            Self::MalformedInput(_) => ErrorCode::MalformedInput,
        }
    }
}

/// Machine-readable error codes for agent-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InputNotFound,
    ConfigParseError,
    MalformedInput,
    CycleDetected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::InputNotFound => "E1001",
            Self::ConfigParseError => "E1002",
            Self::MalformedInput => "E2001",
            Self::CycleDetected => "E2003",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::InputNotFound => "Input file not found",
            Self::ConfigParseError => "Config file parse error",
            Self::MalformedInput => "Malformed plan document",
            Self::CycleDetected => "Dependency cycle detected",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::InputNotFound => Some("Check the path, or pass `-` to read the plan from stdin."),
            Self::ConfigParseError => Some("Fix syntax in depwave.toml and retry."),
            Self::MalformedInput => {
                Some("Every item needs a unique, non-empty `id`; dependencies must be a list of ids.")
            }
            Self::CycleDetected => Some("Remove or adjust dependencies to keep the graph acyclic."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
