//! Absorption of empty and single-variable constraints.

use cqm_core::Sense;

use crate::error::{PresolveError, PresolveResult};
use crate::view::ModelView;

/// Remove constraints over zero or one variable.
///
/// An empty hard constraint is a tautology or a contradiction: its offset
/// is checked exactly against the right-hand side and a violation proves
/// infeasibility. Empty constraints are removed either way, soft ones
/// without any check.
///
/// A single-variable hard constraint `a*v ◯ rhs` is absorbed into `v`'s
/// bounds and removed. Soft single-variable constraints are left alone.
pub(crate) fn remove_single_variable_constraints(view: &mut ModelView) -> PresolveResult<bool> {
    let mut changed = false;
    let mut i = 0;
    while i < view.num_constraints() {
        let constraint = view.constraint(i);
        let num_variables = constraint.lhs.num_variables();

        if num_variables == 0 {
            if !constraint.is_soft() {
                let lhs = constraint.lhs.offset();
                let violated = match constraint.sense() {
                    Sense::Eq => lhs != constraint.rhs(),
                    Sense::Le => lhs > constraint.rhs(),
                    Sense::Ge => lhs < constraint.rhs(),
                };
                if violated {
                    return Err(PresolveError::Infeasible);
                }
            }
            view.remove_constraint(i)?;
            changed = true;
            continue;
        }

        if num_variables == 1 && !constraint.is_soft() {
            let Some(v) = constraint.lhs.variables().next() else {
                i += 1;
                continue;
            };
            let a = constraint.lhs.linear(v);
            debug_assert!(a != 0.0, "zero biases are removed before absorption");
            if a == 0.0 {
                i += 1;
                continue;
            }

            // a*v ◯ rhs, so v ◯' (rhs - offset) / a
            let bound = (constraint.rhs() - constraint.lhs.offset()) / a;
            let sense = constraint.sense();

            if sense == Sense::Eq {
                view.set_lower_bound(v, bound.max(view.lower_bound(v)));
                view.set_upper_bound(v, bound.min(view.upper_bound(v)));
            } else if (sense == Sense::Le) != (a < 0.0) {
                view.set_upper_bound(v, bound.min(view.upper_bound(v)));
            } else {
                view.set_lower_bound(v, bound.max(view.lower_bound(v)));
            }

            view.remove_constraint(i)?;
            changed = true;
            continue;
        }

        i += 1;
    }
    Ok(changed)
}
