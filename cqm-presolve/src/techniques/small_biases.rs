//! Removal of negligibly small linear biases.

use crate::techniques::FEASIBILITY_TOLERANCE;
use crate::view::ModelView;

const CONDITIONAL_REMOVAL_BIAS_LIMIT: f64 = 1.0e-3;
const CONDITIONAL_REMOVAL_LIMIT: f64 = 1.0e-2;
const UNCONDITIONAL_REMOVAL_BIAS_LIMIT: f64 = 1.0e-10;
const SUM_REDUCTION_LIMIT: f64 = 1.0e-1;

/// Drop linear biases too small to affect feasibility.
///
/// Only linear constraints are touched. A bias below the unconditional
/// limit is always dropped. A bias below the conditional limit is dropped
/// only when its worst-case contribution (`|a| * range * n`) is noise, and
/// then only if the accumulated magnitude over all such candidates stays
/// under the sum limit, in which case the right-hand side absorbs the
/// candidates evaluated at their lower bounds. Candidates rejected at the
/// sum check are kept; the unconditional ones are dropped regardless.
pub(crate) fn remove_small_biases(view: &mut ModelView) -> bool {
    let mut changed = false;
    for i in 0..view.num_constraints() {
        changed |= prune_constraint(view, i);
    }
    changed
}

fn prune_constraint(view: &mut ModelView, i: usize) -> bool {
    let mut removable: Vec<usize> = Vec::new();
    let mut conditional: Vec<usize> = Vec::new();
    let mut reduction = 0.0;
    let mut reduction_magnitude = 0.0;

    {
        let constraint = view.constraint(i);
        if !constraint.lhs.is_linear() {
            return false;
        }
        let num_variables = constraint.lhs.num_variables() as f64;
        for v in constraint.lhs.variables() {
            let a = constraint.lhs.linear(v);
            let lb = view.lower_bound(v);
            let range = view.upper_bound(v) - lb;
            if a.abs() < CONDITIONAL_REMOVAL_BIAS_LIMIT
                && a.abs() * range * num_variables
                    < CONDITIONAL_REMOVAL_LIMIT * FEASIBILITY_TOLERANCE
            {
                conditional.push(v);
                reduction += a * lb;
                reduction_magnitude += a.abs() * range;
            }
            if a.abs() < UNCONDITIONAL_REMOVAL_BIAS_LIMIT {
                removable.push(v);
            }
        }
    }

    if reduction_magnitude < SUM_REDUCTION_LIMIT * FEASIBILITY_TOLERANCE {
        let constraint = view.constraint_mut(i);
        constraint.set_rhs(constraint.rhs() - reduction);
        removable.extend(conditional);
    }

    let changed = !removable.is_empty();
    for v in removable {
        view.constraint_mut(i).lhs.remove_variable(v);
    }
    changed
}
