//! Error types for the model container.

use thiserror::Error;

use crate::vartype::Vartype;

/// Errors that can occur while building or mutating a model.
#[derive(Error, Debug)]
pub enum ModelError {
    /// Variable index does not exist in the model
    #[error("variable {0} out of range (model has {1} variables)")]
    VariableOutOfRange(usize, usize),

    /// Constraint index does not exist in the model
    #[error("constraint {0} out of range (model has {1} constraints)")]
    ConstraintOutOfRange(usize, usize),

    /// Bounds are inverted or incompatible with the variable type
    #[error("invalid bounds [{lb}, {ub}] for {vartype} variable")]
    InvalidBounds {
        /// Type the variable was declared with
        vartype: Vartype,
        /// Requested lower bound
        lb: f64,
        /// Requested upper bound
        ub: f64,
    },

    /// Parallel variable/coefficient slices differ in length
    #[error("variables and coefficients differ in length ({0} vs {1})")]
    LengthMismatch(usize, usize),

    /// Requested vartype transition is not implemented
    #[error("unsupported vartype change: {from} -> {to}")]
    UnsupportedVartypeChange {
        /// Current type of the variable
        from: Vartype,
        /// Requested type
        to: Vartype,
    },
}

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;
