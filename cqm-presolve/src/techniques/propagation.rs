//! Domain propagation over linear constraints.

use cqm_core::{Sense, Vartype};

use crate::error::{PresolveError, PresolveResult};
use crate::techniques::{FEASIBILITY_TOLERANCE, INF};
use crate::view::ModelView;

const NEW_BOUND_MAX: f64 = 1.0e8;
const MIN_CHANGE_FOR_BOUND_UPDATE: f64 = 1.0e-3;

/// Tighten variable bounds from the extreme activities of each hard linear
/// constraint. A candidate bound that contradicts the variable's current
/// domain proves infeasibility. Binary variables are skipped.
pub(crate) fn propagate_domains(view: &mut ModelView) -> PresolveResult<bool> {
    let mut changed = false;
    for i in 0..view.num_constraints() {
        changed |= propagate_constraint(view, i)?;
    }
    Ok(changed)
}

/// Extreme values of the constraint's remaining terms with `exclude`
/// removed, under current bounds. Any term over an unbounded side collapses
/// the corresponding activity to the sentinel.
fn min_max_activities(view: &ModelView, i: usize, exclude: usize) -> (f64, f64) {
    let mut min_activity = 0.0;
    let mut max_activity = 0.0;
    let constraint = view.constraint(i);
    for v in constraint.lhs.variables() {
        if v == exclude {
            continue;
        }
        let a = constraint.lhs.linear(v);
        let lb = view.lower_bound(v);
        let ub = view.upper_bound(v);
        debug_assert!(ub >= lb);

        if a > 0.0 {
            if lb > -INF {
                min_activity += a * lb;
            } else {
                min_activity = -INF;
            }
            if ub < INF {
                max_activity += a * ub;
            } else {
                max_activity = INF;
            }
        } else {
            if ub < INF {
                min_activity += a * ub;
            } else {
                min_activity = -INF;
            }
            if lb > -INF {
                max_activity += a * lb;
            } else {
                max_activity = INF;
            }
        }
    }
    (min_activity, max_activity)
}

fn propagate_constraint(view: &mut ModelView, i: usize) -> PresolveResult<bool> {
    {
        let constraint = view.constraint(i);
        if !constraint.lhs.is_linear() || constraint.is_soft() {
            return Ok(false);
        }
    }

    let equality = view.constraint(i).sense() == Sense::Eq;
    let variables: Vec<usize> = view.constraint(i).lhs.variables().collect();
    let min_change = MIN_CHANGE_FOR_BOUND_UPDATE * FEASIBILITY_TOLERANCE;
    let mut changed = false;

    for v in variables {
        if view.vartype(v) == Vartype::Binary {
            continue;
        }

        let (min_activity, max_activity) = min_max_activities(view, i, v);

        let constraint = view.constraint(i);
        let a = constraint.lhs.linear(v);
        let rhs = constraint.rhs();
        let lb = view.lower_bound(v);
        let ub = view.upper_bound(v);
        debug_assert!(ub >= lb);

        // candidate bounds; the second one only matters for equalities
        let pnb1 = (rhs - min_activity) / a;
        let pnb2 = (rhs - max_activity) / a;
        if pnb1.abs() > NEW_BOUND_MAX {
            continue;
        }
        if equality && pnb2.abs() > NEW_BOUND_MAX {
            continue;
        }

        if a > 0.0 {
            if min_activity > -INF && rhs < INF && ub - pnb1 > min_change {
                if pnb1 > lb && pnb1 < ub {
                    view.set_upper_bound(v, pnb1);
                    changed = true;
                } else if pnb1 < lb {
                    return Err(PresolveError::Infeasible);
                }
            }
            if equality && max_activity < INF && rhs > -INF && pnb2 - lb > min_change {
                if pnb2 > lb && pnb2 < ub {
                    view.set_lower_bound(v, pnb2);
                    changed = true;
                } else if pnb2 > ub {
                    return Err(PresolveError::Infeasible);
                }
            }
        }
        if a < 0.0 {
            if min_activity > -INF && rhs < INF && pnb1 - lb > min_change {
                if pnb1 > lb && pnb1 < ub {
                    view.set_lower_bound(v, pnb1);
                    changed = true;
                } else if pnb1 > ub {
                    return Err(PresolveError::Infeasible);
                }
            }
            if equality && max_activity < INF && rhs > -INF && ub - pnb2 > min_change {
                if pnb2 > lb && pnb2 < ub {
                    view.set_upper_bound(v, pnb2);
                    changed = true;
                } else if pnb2 < lb {
                    return Err(PresolveError::Infeasible);
                }
            }
        }
    }

    Ok(changed)
}
