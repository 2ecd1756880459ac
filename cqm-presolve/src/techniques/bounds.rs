//! Bound-domain walks: vartype tightening and fixed-variable elimination.

use crate::error::PresolveResult;
use crate::view::ModelView;

/// Round the bounds of integral variables inward to integers: upper bounds
/// down to their floor, lower bounds up to their ceiling. Real variables
/// are unchanged.
pub(crate) fn tighten_bounds(view: &mut ModelView) -> bool {
    let mut changed = false;
    for v in 0..view.num_variables() {
        if !view.vartype(v).is_integral() {
            continue;
        }
        let ub = view.upper_bound(v);
        if ub != ub.floor() {
            view.set_upper_bound(v, ub.floor());
            changed = true;
        }
        let lb = view.lower_bound(v);
        if lb != lb.ceil() {
            view.set_lower_bound(v, lb.ceil());
            changed = true;
        }
    }
    changed
}

/// Fix and remove every variable whose bounds have collapsed to a point.
///
/// Fixing shifts subsequent indices down, so the cursor walks past the
/// variable that slides into the freed slot; the driver's next round picks
/// it up.
pub(crate) fn remove_fixed_variables(view: &mut ModelView) -> PresolveResult<bool> {
    let mut changed = false;
    let mut v = 0;
    while v < view.num_variables() {
        if view.lower_bound(v) == view.upper_bound(v) {
            let value = view.lower_bound(v);
            view.fix_variable(v, value)?;
            changed = true;
        }
        v += 1;
    }
    Ok(changed)
}
