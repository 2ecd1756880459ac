//! Constrained quadratic model container.
//!
//! A constrained quadratic model (CQM) is an objective quadratic expression
//! and a list of quadratic constraints over typed, bounded variables:
//!
//! ```text
//! minimize    E_obj(x)
//! subject to  E_c(x) ◯ rhs_c     for every constraint c, ◯ ∈ {≤, =, ≥}
//! ```
//!
//! where each expression is a quadratic polynomial (linear biases per
//! variable, quadratic biases per pair, and a scalar offset) and each
//! variable is binary, spin, integer, or real with numeric bounds.
//!
//! This crate provides the container only. Preprocessing lives in the
//! `cqm-presolve` crate, which drives the mutations exposed here
//! (`fix_variable`, `change_vartype`, bound edits, constraint removal).

#![warn(clippy::all)]

pub mod constraint;
pub mod error;
pub mod expression;
pub mod model;
pub mod vartype;

pub use constraint::{Constraint, Sense};
pub use error::{ModelError, ModelResult};
pub use expression::Expression;
pub use model::{ConstrainedQuadraticModel, VariableInfo};
pub use vartype::Vartype;
