use std::fmt::Display;

/// Errors surfaced by loading, validating and solving an instance.
#[derive(Debug)]
pub enum SolverError {
    /// Malformed or inconsistent instance data. Raised before any search begins.
    Validation(String),
    /// No feasible assignment can exist under the current capacities.
    InfeasibleInstance(String),
    /// The construction heuristic could not place every location.
    NoSolutionFound(String),
    Io(std::io::Error),
    Json(serde_json::Error),
    Csv(csv::Error),
}

pub type SolverResult<T> = Result<T, SolverError>;

impl SolverError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn infeasible(msg: impl Into<String>) -> Self {
        Self::InfeasibleInstance(msg.into())
    }
}

impl Display for SolverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(msg) => write!(f, "Validation error: {msg}"),
            Self::InfeasibleInstance(msg) => write!(f, "Infeasible instance: {msg}"),
            Self::NoSolutionFound(msg) => write!(f, "No solution found: {msg}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Json(e) => write!(f, "JSON error: {e}"),
            Self::Csv(e) => write!(f, "CSV error: {e}"),
        }
    }
}

impl std::error::Error for SolverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Csv(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SolverError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for SolverError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl From<csv::Error> for SolverError {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e)
    }
}
