//! Error and feasibility signals for the presolver.

use std::fmt;

use thiserror::Error;

use cqm_core::ModelError;

/// Errors that can occur during presolve.
#[derive(Error, Debug)]
pub enum PresolveError {
    /// Model data is malformed (NaN biases)
    #[error("invalid model: {0}")]
    InvalidModel(String),

    /// The model was proven to have no feasible assignment.
    /// The message is stable and consumed by callers.
    #[error("infeasible")]
    Infeasible,

    /// API misuse: operations after detach, reduction before normalization,
    /// or an unsupported vartype transition
    #[error("logic error: {0}")]
    Logic(String),
}

impl From<ModelError> for PresolveError {
    fn from(err: ModelError) -> Self {
        PresolveError::Logic(err.to_string())
    }
}

/// Result type for presolve operations.
pub type PresolveResult<T> = Result<T, PresolveError>;

/// What presolve has learned about the model's feasibility.
///
/// Presolve proves infeasibility when a reduction exposes a contradiction;
/// it never proves feasibility, so the status otherwise stays `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Feasibility {
    /// Nothing has been proven
    #[default]
    Unknown,

    /// The model is known to have a feasible assignment
    Feasible,

    /// The model is known to have no feasible assignment
    Infeasible,
}

impl fmt::Display for Feasibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feasibility::Unknown => write!(f, "Unknown"),
            Feasibility::Feasible => write!(f, "Feasible"),
            Feasibility::Infeasible => write!(f, "Infeasible"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infeasible_message_is_stable() {
        assert_eq!(PresolveError::Infeasible.to_string(), "infeasible");
    }

    #[test]
    fn test_model_error_maps_to_logic() {
        let err = PresolveError::from(ModelError::LengthMismatch(2, 3));
        assert!(matches!(err, PresolveError::Logic(_)));
    }
}
