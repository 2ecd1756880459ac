//! Removal of exactly-zero biases.

use cqm_core::Expression;

use crate::view::ModelView;

/// Drop every zero-bias interaction from the objective and all
/// constraints, then drop every variable left with a zero linear bias and
/// no interactions.
pub(crate) fn remove_zero_biases(view: &mut ModelView) -> bool {
    let mut changed = prune_expression(view.objective_mut());
    for i in 0..view.num_constraints() {
        changed |= prune_expression(&mut view.constraint_mut(i).lhs);
    }
    changed
}

fn prune_expression(expression: &mut Expression) -> bool {
    let dead_interactions: Vec<(usize, usize)> = expression
        .iter_quadratic()
        .filter(|&(_, _, bias)| bias == 0.0)
        .map(|(u, v, _)| (u, v))
        .collect();
    for &(u, v) in &dead_interactions {
        expression.remove_interaction(u, v);
    }

    // a zero-linear variable stays while it still interacts with something
    let dead_variables: Vec<usize> = expression
        .variables()
        .filter(|&v| expression.linear(v) == 0.0 && expression.degree(v) == 0)
        .collect();
    for &v in &dead_variables {
        expression.remove_variable(v);
    }

    !dead_interactions.is_empty() || !dead_variables.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cqm_core::{ConstrainedQuadraticModel, Sense, Vartype};

    #[test]
    fn test_zero_interaction_and_variable_removed() {
        let mut cqm = ConstrainedQuadraticModel::new();
        cqm.add_variables(Vartype::Integer, 2);
        cqm.objective.set_quadratic(0, 1, 0.0);
        cqm.objective.set_linear(0, 1.5);
        let mut view = ModelView::new(cqm);

        assert!(remove_zero_biases(&mut view));

        let objective = view.objective();
        assert_eq!(objective.num_interactions(), 0);
        assert_eq!(objective.num_variables(), 1);
        assert_eq!(objective.linear(0), 1.5);

        assert!(!remove_zero_biases(&mut view));
    }

    #[test]
    fn test_zero_linear_with_live_interaction_stays() {
        let mut cqm = ConstrainedQuadraticModel::new();
        cqm.add_variables(Vartype::Binary, 2);
        cqm.objective.set_quadratic(0, 1, 2.0);
        let mut view = ModelView::new(cqm);

        assert!(!remove_zero_biases(&mut view));
        assert_eq!(view.objective().num_variables(), 2);
    }

    #[test]
    fn test_constraints_are_pruned_too() {
        let mut cqm = ConstrainedQuadraticModel::new();
        cqm.add_variables(Vartype::Binary, 2);
        let i = cqm
            .add_linear_constraint(&[0, 1], &[1.0, 0.0], Sense::Le, 1.0)
            .unwrap();
        let mut view = ModelView::new(cqm);

        assert!(remove_zero_biases(&mut view));
        assert_eq!(view.constraint(i).lhs.num_variables(), 1);
        assert_eq!(view.constraint(i).lhs.linear(0), 1.0);
    }
}
