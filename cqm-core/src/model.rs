//! The constrained quadratic model container.

use crate::constraint::{Constraint, Sense};
use crate::error::{ModelError, ModelResult};
use crate::expression::Expression;
use crate::vartype::Vartype;

/// Type and bounds of a single variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariableInfo {
    /// Variable type
    pub vartype: Vartype,
    /// Lower bound
    pub lower_bound: f64,
    /// Upper bound
    pub upper_bound: f64,
}

/// A constrained quadratic model: an objective expression and a list of
/// constraints over typed, bounded variables.
///
/// Variables are dense indices assigned in insertion order. Removing a
/// variable (via [`fix_variable`](Self::fix_variable)) shifts all subsequent
/// indices down by one; removing a constraint compacts constraint indices.
#[derive(Debug, Clone, Default)]
pub struct ConstrainedQuadraticModel {
    variables: Vec<VariableInfo>,
    /// Objective expression. Edits are not tracked by the container.
    pub objective: Expression,
    constraints: Vec<Constraint>,
}

impl ConstrainedQuadraticModel {
    /// Create an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of variables.
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    /// Number of constraints.
    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Add a variable with explicit bounds, returning its index.
    ///
    /// Binary and spin variables have fixed domains; any other bounds are
    /// rejected. For integer and real variables `lb <= ub` is required.
    pub fn add_variable(&mut self, vartype: Vartype, lb: f64, ub: f64) -> ModelResult<usize> {
        // NaN bounds fail every arm
        let valid = match vartype {
            Vartype::Binary => lb == 0.0 && ub == 1.0,
            Vartype::Spin => lb == -1.0 && ub == 1.0,
            Vartype::Integer | Vartype::Real => lb <= ub,
        };
        if !valid {
            return Err(ModelError::InvalidBounds { vartype, lb, ub });
        }
        self.variables.push(VariableInfo {
            vartype,
            lower_bound: lb,
            upper_bound: ub,
        });
        Ok(self.variables.len() - 1)
    }

    /// Add `count` variables of one type with its default bounds, returning
    /// the index of the first.
    pub fn add_variables(&mut self, vartype: Vartype, count: usize) -> usize {
        let first = self.variables.len();
        let info = VariableInfo {
            vartype,
            lower_bound: vartype.default_lower_bound(),
            upper_bound: vartype.default_upper_bound(),
        };
        self.variables.extend(std::iter::repeat(info).take(count));
        first
    }

    /// Type of variable `v`.
    pub fn vartype(&self, v: usize) -> Vartype {
        self.variables[v].vartype
    }

    /// Lower bound of variable `v`.
    pub fn lower_bound(&self, v: usize) -> f64 {
        self.variables[v].lower_bound
    }

    /// Upper bound of variable `v`.
    pub fn upper_bound(&self, v: usize) -> f64 {
        self.variables[v].upper_bound
    }

    /// Set the lower bound of variable `v`.
    ///
    /// Bounds are not checked against each other: preprocessing deliberately
    /// drives them past one another and resolves the collapse itself.
    pub fn set_lower_bound(&mut self, v: usize, bound: f64) {
        self.variables[v].lower_bound = bound;
    }

    /// Set the upper bound of variable `v`.
    pub fn set_upper_bound(&mut self, v: usize, bound: f64) {
        self.variables[v].upper_bound = bound;
    }

    /// Change the type of variable `v`.
    ///
    /// Only the spin-to-binary transition is implemented: every expression
    /// is rewritten over a binary carrier via `s = 2x - 1` and the domain
    /// becomes [0, 1]. Changing to the current type is a no-op.
    pub fn change_vartype(&mut self, vartype: Vartype, v: usize) -> ModelResult<()> {
        let n = self.num_variables();
        let Some(info) = self.variables.get_mut(v) else {
            return Err(ModelError::VariableOutOfRange(v, n));
        };
        if info.vartype == vartype {
            return Ok(());
        }
        match (info.vartype, vartype) {
            (Vartype::Spin, Vartype::Binary) => {
                *info = VariableInfo {
                    vartype: Vartype::Binary,
                    lower_bound: 0.0,
                    upper_bound: 1.0,
                };
                self.objective.substitute_variable(v, 2.0, -1.0);
                for constraint in &mut self.constraints {
                    constraint.lhs.substitute_variable(v, 2.0, -1.0);
                }
                Ok(())
            }
            (from, to) => Err(ModelError::UnsupportedVartypeChange { from, to }),
        }
    }

    /// Fix variable `v` to `value` and remove it from the model.
    ///
    /// The value folds into the objective's offset and into each
    /// constraint's right-hand side (keeping constraint expressions free of
    /// offsets), the variable is dropped, and all subsequent variable
    /// indices shift down by one.
    pub fn fix_variable(&mut self, v: usize, value: f64) -> ModelResult<()> {
        if v >= self.num_variables() {
            return Err(ModelError::VariableOutOfRange(v, self.num_variables()));
        }
        self.objective.fix_variable(v, value);
        self.objective.shift_indices_above(v);
        for constraint in &mut self.constraints {
            let offset_before = constraint.lhs.offset();
            constraint.lhs.fix_variable(v, value);
            let folded = constraint.lhs.offset() - offset_before;
            if folded != 0.0 {
                constraint.set_rhs(constraint.rhs() - folded);
                constraint.lhs.set_offset(offset_before);
            }
            constraint.lhs.shift_indices_above(v);
        }
        self.variables.remove(v);
        Ok(())
    }

    /// Add a linear constraint `sum(coeffs[i] * vars[i]) sense rhs`,
    /// returning its index.
    pub fn add_linear_constraint(
        &mut self,
        vars: &[usize],
        coeffs: &[f64],
        sense: Sense,
        rhs: f64,
    ) -> ModelResult<usize> {
        if vars.len() != coeffs.len() {
            return Err(ModelError::LengthMismatch(vars.len(), coeffs.len()));
        }
        if let Some(&v) = vars.iter().find(|&&v| v >= self.num_variables()) {
            return Err(ModelError::VariableOutOfRange(v, self.num_variables()));
        }
        let mut constraint = Constraint::new(sense, rhs);
        for (&v, &coeff) in vars.iter().zip(coeffs) {
            constraint.lhs.add_linear(v, coeff);
        }
        self.constraints.push(constraint);
        Ok(self.constraints.len() - 1)
    }

    /// Add a fully-formed constraint, returning its index.
    pub fn add_constraint(&mut self, constraint: Constraint) -> ModelResult<usize> {
        if let Some(v) = constraint
            .lhs
            .variables()
            .find(|&v| v >= self.num_variables())
        {
            return Err(ModelError::VariableOutOfRange(v, self.num_variables()));
        }
        self.constraints.push(constraint);
        Ok(self.constraints.len() - 1)
    }

    /// Remove constraint `i`; subsequent constraint indices shift down.
    pub fn remove_constraint(&mut self, i: usize) -> ModelResult<()> {
        if i >= self.constraints.len() {
            return Err(ModelError::ConstraintOutOfRange(i, self.constraints.len()));
        }
        self.constraints.remove(i);
        Ok(())
    }

    /// Constraint `i`.
    pub fn constraint(&self, i: usize) -> &Constraint {
        &self.constraints[i]
    }

    /// Mutable reference to constraint `i`.
    pub fn constraint_mut(&mut self, i: usize) -> &mut Constraint {
        &mut self.constraints[i]
    }

    /// All constraints, in index order.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Mutable view of all constraints, in index order.
    pub fn constraints_mut(&mut self) -> &mut [Constraint] {
        &mut self.constraints
    }

    /// Whether constraint `i` encodes a one-hot choice: linear, every linear
    /// bias exactly 1, sense `==`, right-hand side 1, and every variable
    /// binary.
    pub fn constraint_is_onehot(&self, i: usize) -> bool {
        let constraint = &self.constraints[i];
        if !constraint.lhs.is_linear()
            || constraint.sense() != Sense::Eq
            || constraint.rhs() != 1.0
            || constraint.lhs.num_variables() == 0
        {
            return false;
        }
        constraint.lhs.variables().all(|v| {
            self.variables[v].vartype == Vartype::Binary && constraint.lhs.linear(v) == 1.0
        })
    }

    /// Check that every expression references existing variables and that
    /// every variable's bounds are ordered.
    pub fn validate(&self) -> ModelResult<()> {
        let n = self.num_variables();
        for info in &self.variables {
            if info.lower_bound > info.upper_bound {
                return Err(ModelError::InvalidBounds {
                    vartype: info.vartype,
                    lb: info.lower_bound,
                    ub: info.upper_bound,
                });
            }
        }
        if let Some(v) = self.objective.variables().find(|&v| v >= n) {
            return Err(ModelError::VariableOutOfRange(v, n));
        }
        for constraint in &self.constraints {
            if let Some(v) = constraint.lhs.variables().find(|&v| v >= n) {
                return Err(ModelError::VariableOutOfRange(v, n));
            }
        }
        Ok(())
    }
}
