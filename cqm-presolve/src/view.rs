//! Mutation-tracking façade over the model.
//!
//! Reductions change the sample space three ways: adding a variable, fixing
//! (and removing) a variable, and re-expressing a variable over a different
//! domain. The view intercepts exactly those mutations and appends one
//! [`Transform`] per occurrence; everything else (bias edits, bound edits,
//! constraint add/remove) passes through untracked. Replaying the log in
//! reverse maps a reduced-space sample back to the original index space
//! without any mapping table.

use cqm_core::{Constraint, ConstrainedQuadraticModel, Expression, Sense, Vartype};

use crate::error::{PresolveError, PresolveResult};

/// One sample-space change applied during reduction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transform {
    /// Variable `v` was fixed to `value` and removed
    Fix {
        /// Index the variable had when it was removed
        v: usize,
        /// Assigned value
        value: f64,
    },

    /// Variable `v` was re-expressed; an original assignment is recovered
    /// as `multiplier * reduced + offset`
    Substitute {
        /// Index of the re-expressed variable
        v: usize,
        /// Multiplier of the affine map back to the original domain
        multiplier: f64,
        /// Offset of the affine map back to the original domain
        offset: f64,
    },

    /// Variable `v` was introduced by presolve and has no counterpart in
    /// the original model
    Add {
        /// Index the variable had when it was introduced
        v: usize,
    },
}

/// Owns the model and the ordered transform log.
#[derive(Debug, Default)]
pub(crate) struct ModelView {
    model: ConstrainedQuadraticModel,
    transforms: Vec<Transform>,
}

impl ModelView {
    pub(crate) fn new(model: ConstrainedQuadraticModel) -> Self {
        Self {
            model,
            transforms: Vec::new(),
        }
    }

    pub(crate) fn model(&self) -> &ConstrainedQuadraticModel {
        &self.model
    }

    pub(crate) fn num_variables(&self) -> usize {
        self.model.num_variables()
    }

    pub(crate) fn num_constraints(&self) -> usize {
        self.model.num_constraints()
    }

    pub(crate) fn vartype(&self, v: usize) -> Vartype {
        self.model.vartype(v)
    }

    pub(crate) fn lower_bound(&self, v: usize) -> f64 {
        self.model.lower_bound(v)
    }

    pub(crate) fn upper_bound(&self, v: usize) -> f64 {
        self.model.upper_bound(v)
    }

    pub(crate) fn set_lower_bound(&mut self, v: usize, bound: f64) {
        self.model.set_lower_bound(v, bound);
    }

    pub(crate) fn set_upper_bound(&mut self, v: usize, bound: f64) {
        self.model.set_upper_bound(v, bound);
    }

    pub(crate) fn objective(&self) -> &Expression {
        &self.model.objective
    }

    pub(crate) fn objective_mut(&mut self) -> &mut Expression {
        &mut self.model.objective
    }

    pub(crate) fn constraint(&self, i: usize) -> &Constraint {
        self.model.constraint(i)
    }

    pub(crate) fn constraint_mut(&mut self, i: usize) -> &mut Constraint {
        self.model.constraint_mut(i)
    }

    pub(crate) fn constraints_mut(&mut self) -> &mut [Constraint] {
        self.model.constraints_mut()
    }

    pub(crate) fn add_linear_constraint(
        &mut self,
        vars: &[usize],
        coeffs: &[f64],
        sense: Sense,
        rhs: f64,
    ) -> PresolveResult<usize> {
        Ok(self.model.add_linear_constraint(vars, coeffs, sense, rhs)?)
    }

    pub(crate) fn remove_constraint(&mut self, i: usize) -> PresolveResult<()> {
        Ok(self.model.remove_constraint(i)?)
    }

    /// Tracked: add a variable, logging an `Add` transform.
    pub(crate) fn add_variable(
        &mut self,
        vartype: Vartype,
        lb: f64,
        ub: f64,
    ) -> PresolveResult<usize> {
        let v = self.model.add_variable(vartype, lb, ub)?;
        self.transforms.push(Transform::Add { v });
        Ok(v)
    }

    /// Tracked: change a variable's type, logging a `Substitute` transform.
    /// Only the spin-to-binary transition is supported.
    pub(crate) fn change_vartype(&mut self, vartype: Vartype, v: usize) -> PresolveResult<()> {
        if self.model.vartype(v) == Vartype::Spin && vartype == Vartype::Binary {
            self.transforms.push(Transform::Substitute {
                v,
                multiplier: 2.0,
                offset: -1.0,
            });
            self.model.change_vartype(vartype, v)?;
            Ok(())
        } else {
            Err(PresolveError::Logic(format!(
                "unsupported vartype change: {} -> {}",
                self.model.vartype(v),
                vartype
            )))
        }
    }

    /// Tracked: fix a variable to a value and remove it, logging a `Fix`
    /// transform. Subsequent variable indices shift down by one.
    pub(crate) fn fix_variable(&mut self, v: usize, value: f64) -> PresolveResult<()> {
        self.model.fix_variable(v, value)?;
        self.transforms.push(Transform::Fix { v, value });
        Ok(())
    }

    /// Move the model out, leaving an empty one. The transform log persists
    /// so samples can still be restored.
    pub(crate) fn detach_model(&mut self) -> ConstrainedQuadraticModel {
        std::mem::take(&mut self.model)
    }

    pub(crate) fn transforms(&self) -> &[Transform] {
        &self.transforms
    }

    /// Map a reduced-space sample back to the original variable space by
    /// undoing the transforms back to front.
    pub(crate) fn restore(&self, mut sample: Vec<f64>) -> Vec<f64> {
        for transform in self.transforms.iter().rev() {
            match *transform {
                Transform::Fix { v, value } => sample.insert(v, value),
                Transform::Substitute {
                    v,
                    multiplier,
                    offset,
                } => sample[v] = multiplier * sample[v] + offset,
                Transform::Add { v } => {
                    sample.remove(v);
                }
            }
        }
        sample
    }
}
