//! Error types for each boundary of the planner.

use thiserror::Error;

/// Failures talking to the OSRM HTTP service. Always recovered locally.
#[derive(Debug, Error)]
pub enum OsrmError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("OSRM responded with code {0}")]
    Code(String),

    #[error("Incomplete response")]
    IncompleteResponse,
}

#[derive(Debug, Error)]
pub enum SolverError {
    #[error("invalid model: {0}")]
    InvalidModel(String),
}

#[derive(Debug, Error)]
pub enum ReconstructError {
    #[error("route references unknown location {index} (only {size} locations)")]
    UnknownLocation { index: usize, size: usize },
}

/// Errors surfaced to the caller of [`crate::planner::Planner::plan`].
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("no feasible solution with {vehicles} vehicles")]
    Infeasible { vehicles: usize },

    #[error("unexpected failure: {0}")]
    Unexpected(String),
}

impl From<SolverError> for PlanError {
    fn from(err: SolverError) -> Self {
        PlanError::Unexpected(err.to_string())
    }
}

impl From<ReconstructError> for PlanError {
    fn from(err: ReconstructError) -> Self {
        PlanError::Unexpected(err.to_string())
    }
}

impl PlanError {
    /// Machine-readable category.
    pub fn code(&self) -> &'static str {
        match self {
            PlanError::InvalidInput(_) => "invalid_input",
            PlanError::Infeasible { .. } => "infeasible",
            PlanError::Unexpected(_) => "unexpected_failure",
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            PlanError::InvalidInput(_) | PlanError::Infeasible { .. } => 400,
            PlanError::Unexpected(_) => 500,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            PlanError::InvalidInput(_) => "Invalid plan request",
            PlanError::Infeasible { .. } => "No feasible solution found",
            PlanError::Unexpected(_) => "Failed to solve the routing problem",
        }
    }

    pub fn details(&self) -> String {
        match self {
            PlanError::InvalidInput(detail) | PlanError::Unexpected(detail) => detail.clone(),
            PlanError::Infeasible { vehicles } => format!(
                "No assignment fits {vehicles} vehicles; try fewer clients or a larger vehicle capacity"
            ),
        }
    }
}
