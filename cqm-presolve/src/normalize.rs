//! Normalization: idempotent rewrites that put a model in canonical form.
//!
//! After the full suite runs, the model has no NaN biases, no spin
//! variables, zero constraint offsets, no self-interactions, no `>=`
//! constraints, and only valid, pairwise variable-disjoint discrete
//! markers.

use rustc_hash::{FxHashMap, FxHashSet};

use cqm_core::{Expression, Sense, Vartype};

use crate::error::{PresolveError, PresolveResult};
use crate::view::ModelView;

/// Fail on any NaN linear bias, quadratic bias, or offset. Never mutates.
pub(crate) fn check_nan(view: &ModelView) -> PresolveResult<bool> {
    check_expression_nan(view.objective())?;
    for i in 0..view.num_constraints() {
        check_expression_nan(&view.constraint(i).lhs)?;
    }
    Ok(false)
}

fn check_expression_nan(expression: &Expression) -> PresolveResult<()> {
    for (_, _, bias) in expression.iter_quadratic() {
        if bias.is_nan() {
            return Err(PresolveError::InvalidModel("biases cannot be NAN".into()));
        }
    }
    for v in expression.variables() {
        if expression.linear(v).is_nan() {
            return Err(PresolveError::InvalidModel("biases cannot be NAN".into()));
        }
    }
    if expression.offset().is_nan() {
        return Err(PresolveError::InvalidModel("biases cannot be NAN".into()));
    }
    Ok(())
}

/// Convert every spin variable to binary, logging a substitution per
/// variable.
pub(crate) fn spin_to_binary(view: &mut ModelView) -> PresolveResult<bool> {
    let mut changed = false;
    for v in 0..view.num_variables() {
        if view.vartype(v) == Vartype::Spin {
            view.change_vartype(Vartype::Binary, v)?;
            changed = true;
        }
    }
    Ok(changed)
}

/// Move every constraint offset into its right-hand side.
/// E.g. `x + 1 <= 2` becomes `x <= 1`.
pub(crate) fn remove_offsets(view: &mut ModelView) -> bool {
    let mut changed = false;
    for constraint in view.constraints_mut() {
        let offset = constraint.lhs.offset();
        if offset != 0.0 {
            constraint.set_rhs(constraint.rhs() - offset);
            constraint.lhs.set_offset(0.0);
            changed = true;
        }
    }
    changed
}

/// Replace every self-interaction `v*v` by `v*v'` for a fresh variable `v'`
/// with `v`'s type and bounds, then constrain `v - v' = 0`.
///
/// The auxiliary mapping is shared across the objective and all
/// constraints, so each self-looped variable gets exactly one auxiliary no
/// matter how many expressions it loops in. The equality constraints are
/// added only after every expression has been walked.
pub(crate) fn remove_self_loops(view: &mut ModelView) -> PresolveResult<bool> {
    let mut aux: FxHashMap<usize, usize> = FxHashMap::default();
    let mut order: Vec<(usize, usize)> = Vec::new();

    let num_constraints = view.num_constraints();
    for target in std::iter::once(None).chain((0..num_constraints).map(Some)) {
        let expression = match target {
            None => view.objective(),
            Some(i) => &view.constraint(i).lhs,
        };
        let loops: Vec<(usize, f64)> = expression
            .variables()
            .filter(|&v| expression.has_interaction(v, v))
            .map(|v| (v, expression.quadratic(v, v)))
            .collect();

        for (v, bias) in loops {
            let substitute = match aux.get(&v) {
                Some(&existing) => existing,
                None => {
                    let fresh =
                        view.add_variable(view.vartype(v), view.lower_bound(v), view.upper_bound(v))?;
                    aux.insert(v, fresh);
                    order.push((v, fresh));
                    fresh
                }
            };
            let expression = match target {
                None => view.objective_mut(),
                Some(i) => &mut view.constraint_mut(i).lhs,
            };
            expression.add_quadratic(v, substitute, bias);
            expression.remove_interaction(v, v);
        }
    }

    for &(v, substitute) in &order {
        view.add_linear_constraint(&[v, substitute], &[1.0, -1.0], Sense::Eq, 0.0)?;
    }

    Ok(!order.is_empty())
}

/// Convert every `>=` constraint into `<=` by scaling through by -1.
pub(crate) fn flip_constraints(view: &mut ModelView) -> bool {
    let mut changed = false;
    for constraint in view.constraints_mut() {
        if constraint.sense() == Sense::Ge {
            constraint.scale(-1.0);
            changed = true;
        }
    }
    changed
}

/// Clear discrete markers that are not one-hot, then enforce pairwise
/// variable-disjointness among the survivors: walking in constraint index
/// order, a marked constraint sharing a variable with an earlier kept one
/// loses its marker.
pub(crate) fn remove_invalid_markers(view: &mut ModelView) -> bool {
    let mut changed = false;

    for i in 0..view.num_constraints() {
        if view.constraint(i).marked_discrete() && !view.model().constraint_is_onehot(i) {
            view.constraint_mut(i).mark_discrete(false);
            changed = true;
        }
    }

    let mut claimed: FxHashSet<usize> = FxHashSet::default();
    for i in 0..view.num_constraints() {
        if !view.constraint(i).marked_discrete() {
            continue;
        }
        let vars: Vec<usize> = view.constraint(i).lhs.variables().collect();
        if vars.iter().any(|v| claimed.contains(v)) {
            view.constraint_mut(i).mark_discrete(false);
            changed = true;
        } else {
            claimed.extend(vars);
        }
    }

    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use cqm_core::{Constraint, ConstrainedQuadraticModel};

    #[test]
    fn test_check_nan_rejects_linear() {
        let mut cqm = ConstrainedQuadraticModel::new();
        cqm.add_variables(Vartype::Binary, 1);
        cqm.objective.set_linear(0, f64::NAN);
        let view = ModelView::new(cqm);
        assert!(matches!(
            check_nan(&view),
            Err(PresolveError::InvalidModel(_))
        ));
    }

    #[test]
    fn test_check_nan_rejects_constraint_offset() {
        let mut cqm = ConstrainedQuadraticModel::new();
        cqm.add_variables(Vartype::Binary, 1);
        let i = cqm
            .add_linear_constraint(&[0], &[1.0], Sense::Le, 1.0)
            .unwrap();
        cqm.constraint_mut(i).lhs.set_offset(f64::NAN);
        let view = ModelView::new(cqm);
        assert!(check_nan(&view).is_err());
    }

    #[test]
    fn test_check_nan_passes_clean_model() {
        let mut cqm = ConstrainedQuadraticModel::new();
        cqm.add_variables(Vartype::Binary, 2);
        cqm.objective.set_quadratic(0, 1, 1.0);
        let view = ModelView::new(cqm);
        assert!(!check_nan(&view).unwrap());
    }

    #[test]
    fn test_spin_to_binary_converts_all() {
        let mut cqm = ConstrainedQuadraticModel::new();
        cqm.add_variables(Vartype::Spin, 2);
        cqm.add_variables(Vartype::Integer, 1);
        let mut view = ModelView::new(cqm);

        assert!(spin_to_binary(&mut view).unwrap());
        assert_eq!(view.vartype(0), Vartype::Binary);
        assert_eq!(view.vartype(1), Vartype::Binary);
        assert_eq!(view.vartype(2), Vartype::Integer);
        assert_eq!(view.transforms().len(), 2);

        // second run is a no-op
        assert!(!spin_to_binary(&mut view).unwrap());
    }

    #[test]
    fn test_remove_offsets() {
        let mut cqm = ConstrainedQuadraticModel::new();
        cqm.add_variables(Vartype::Binary, 1);
        let i = cqm
            .add_linear_constraint(&[0], &[1.0], Sense::Le, 2.0)
            .unwrap();
        cqm.constraint_mut(i).lhs.set_offset(1.0);
        let mut view = ModelView::new(cqm);

        assert!(remove_offsets(&mut view));
        assert_eq!(view.constraint(0).lhs.offset(), 0.0);
        assert_eq!(view.constraint(0).rhs(), 1.0);
        assert!(!remove_offsets(&mut view));
    }

    #[test]
    fn test_remove_self_loops_in_objective() {
        let mut cqm = ConstrainedQuadraticModel::new();
        cqm.add_variables(Vartype::Binary, 1);
        cqm.objective.set_quadratic(0, 0, 3.0);
        let mut view = ModelView::new(cqm);

        assert!(remove_self_loops(&mut view).unwrap());

        assert_eq!(view.num_variables(), 2);
        assert_eq!(view.vartype(1), Vartype::Binary);
        assert!(!view.objective().has_interaction(0, 0));
        assert_eq!(view.objective().quadratic(0, 1), 3.0);

        // v - v' == 0
        assert_eq!(view.num_constraints(), 1);
        let constraint = view.constraint(0);
        assert_eq!(constraint.sense(), Sense::Eq);
        assert_eq!(constraint.rhs(), 0.0);
        assert_eq!(constraint.lhs.linear(0), 1.0);
        assert_eq!(constraint.lhs.linear(1), -1.0);
    }

    #[test]
    fn test_self_loop_auxiliary_is_shared() {
        // the same variable self-loops in the objective and a constraint
        let mut cqm = ConstrainedQuadraticModel::new();
        cqm.add_variables(Vartype::Integer, 1);
        cqm.objective.set_quadratic(0, 0, 1.0);
        let mut constraint = Constraint::new(Sense::Le, 4.0);
        constraint.lhs.set_quadratic(0, 0, 2.0);
        cqm.add_constraint(constraint).unwrap();
        let mut view = ModelView::new(cqm);

        assert!(remove_self_loops(&mut view).unwrap());

        // one auxiliary, one equality constraint
        assert_eq!(view.num_variables(), 2);
        assert_eq!(view.num_constraints(), 2);
        assert_eq!(view.objective().quadratic(0, 1), 1.0);
        assert_eq!(view.constraint(0).lhs.quadratic(0, 1), 2.0);
    }

    #[test]
    fn test_flip_constraints() {
        let mut cqm = ConstrainedQuadraticModel::new();
        cqm.add_variables(Vartype::Binary, 2);
        cqm.add_linear_constraint(&[0, 1], &[1.0, 1.0], Sense::Eq, 1.0)
            .unwrap();
        cqm.add_linear_constraint(&[0, 1], &[1.0, 1.0], Sense::Le, 1.0)
            .unwrap();
        cqm.add_linear_constraint(&[0, 1], &[1.0, 1.0], Sense::Ge, 1.0)
            .unwrap();
        let mut view = ModelView::new(cqm);

        assert!(flip_constraints(&mut view));

        // EQ and LE untouched
        assert_eq!(view.constraint(0).sense(), Sense::Eq);
        assert_eq!(view.constraint(0).rhs(), 1.0);
        assert_eq!(view.constraint(1).sense(), Sense::Le);
        assert_eq!(view.constraint(1).lhs.linear(0), 1.0);

        // GE flipped
        let flipped = view.constraint(2);
        assert_eq!(flipped.sense(), Sense::Le);
        assert_eq!(flipped.rhs(), -1.0);
        assert_eq!(flipped.lhs.linear(0), -1.0);
        assert_eq!(flipped.lhs.linear(1), -1.0);

        assert!(!flip_constraints(&mut view));
    }

    #[test]
    fn test_markers_cleared_when_not_onehot() {
        let mut cqm = ConstrainedQuadraticModel::new();
        cqm.add_variables(Vartype::Binary, 2);
        let i = cqm
            .add_linear_constraint(&[0, 1], &[1.0, 2.0], Sense::Eq, 1.0)
            .unwrap();
        cqm.constraint_mut(i).mark_discrete(true);
        let mut view = ModelView::new(cqm);

        assert!(remove_invalid_markers(&mut view));
        assert!(!view.constraint(0).marked_discrete());
    }

    #[test]
    fn test_overlapping_markers_keep_lower_index() {
        let mut cqm = ConstrainedQuadraticModel::new();
        cqm.add_variables(Vartype::Binary, 3);
        let a = cqm
            .add_linear_constraint(&[0, 1], &[1.0, 1.0], Sense::Eq, 1.0)
            .unwrap();
        let b = cqm
            .add_linear_constraint(&[1, 2], &[1.0, 1.0], Sense::Eq, 1.0)
            .unwrap();
        cqm.constraint_mut(a).mark_discrete(true);
        cqm.constraint_mut(b).mark_discrete(true);
        let mut view = ModelView::new(cqm);

        assert!(remove_invalid_markers(&mut view));
        assert!(view.constraint(a).marked_discrete());
        assert!(!view.constraint(b).marked_discrete());
    }

    #[test]
    fn test_disjoint_markers_survive() {
        let mut cqm = ConstrainedQuadraticModel::new();
        cqm.add_variables(Vartype::Binary, 4);
        let a = cqm
            .add_linear_constraint(&[0, 1], &[1.0, 1.0], Sense::Eq, 1.0)
            .unwrap();
        let b = cqm
            .add_linear_constraint(&[2, 3], &[1.0, 1.0], Sense::Eq, 1.0)
            .unwrap();
        cqm.constraint_mut(a).mark_discrete(true);
        cqm.constraint_mut(b).mark_discrete(true);
        let mut view = ModelView::new(cqm);

        assert!(!remove_invalid_markers(&mut view));
        assert!(view.constraint(a).marked_discrete());
        assert!(view.constraint(b).marked_discrete());
    }
}
