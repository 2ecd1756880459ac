//! Presolver for constrained quadratic models.
//!
//! The presolver rewrites a model into an equivalent but smaller,
//! better-conditioned one, and maps feasible assignments of the reduced
//! model back to the original variable space:
//!
//! 1. **Normalization** puts the model in canonical form: no NaN biases,
//!    no spin variables, zero constraint offsets, no self-interactions,
//!    no `>=` constraints, only valid discrete markers.
//! 2. **Reduction techniques** shrink it: zero- and small-bias removal,
//!    single-variable constraint absorption, vartype bound tightening,
//!    domain propagation, and fixed-variable elimination, iterated to a
//!    fixed point.
//! 3. **Restoration** replays the logged sample-space transforms in
//!    reverse over a reduced-space sample.
//!
//! Reductions do not preserve objective values, only the feasible set's
//! structure; energies of restored samples may differ from the reduced
//! model's.
//!
//! # Example
//!
//! ```
//! use cqm_core::{ConstrainedQuadraticModel, Sense, Vartype};
//! use cqm_presolve::{Presolver, TechniqueFlags};
//!
//! let mut cqm = ConstrainedQuadraticModel::new();
//! cqm.add_variables(Vartype::Spin, 1);
//! cqm.objective.set_linear(0, 1.0);
//!
//! let mut presolver = Presolver::new(cqm);
//! presolver.set_techniques(TechniqueFlags::ALL);
//! presolver.apply()?;
//!
//! // the solver works on the reduced model; its samples restore to the
//! // original (spin) space
//! let sample = presolver.restore(vec![0.0]);
//! assert_eq!(sample, vec![-1.0]);
//! # Ok::<(), cqm_presolve::PresolveError>(())
//! ```

#![warn(clippy::all)]

pub mod error;
pub mod flags;
mod normalize;
mod techniques;
mod view;

pub use error::{Feasibility, PresolveError, PresolveResult};
pub use flags::TechniqueFlags;
pub use view::Transform;

use cqm_core::ConstrainedQuadraticModel;

use crate::view::ModelView;

const MAX_NUM_ROUNDS: usize = 100;

/// Rewrites a model into an equivalent reduced one and lifts reduced-space
/// samples back to the original variable space.
///
/// The presolver owns the model until [`detach_model`](Self::detach_model);
/// afterwards only [`restore`](Self::restore) remains usable.
#[derive(Debug, Default)]
pub struct Presolver {
    view: ModelView,
    techniques: TechniqueFlags,
    detached: bool,
    normalized: bool,
    feasibility: Feasibility,
}

impl Presolver {
    /// Construct a presolver over a model. No techniques are enabled until
    /// [`set_techniques`](Self::set_techniques) is called.
    pub fn new(model: ConstrainedQuadraticModel) -> Self {
        Self {
            view: ModelView::new(model),
            techniques: TechniqueFlags::NONE,
            detached: false,
            normalized: false,
            feasibility: Feasibility::Unknown,
        }
    }

    /// Currently enabled techniques.
    pub fn techniques(&self) -> TechniqueFlags {
        self.techniques
    }

    /// Select which techniques [`apply`](Self::apply) runs.
    pub fn set_techniques(&mut self, techniques: TechniqueFlags) {
        self.techniques = techniques;
    }

    /// What presolve has proven about feasibility so far.
    pub fn feasibility(&self) -> Feasibility {
        self.feasibility
    }

    /// The held model.
    pub fn model(&self) -> &ConstrainedQuadraticModel {
        self.view.model()
    }

    /// The sample-space transforms applied so far, in application order.
    pub fn transforms(&self) -> &[Transform] {
        self.view.transforms()
    }

    /// Put the model in canonical form. Returns whether anything changed.
    pub fn normalize(&mut self) -> PresolveResult<bool> {
        if self.detached {
            return Err(PresolveError::Logic(
                "model has been detached, so there is no model to presolve".into(),
            ));
        }

        let mut changed = false;
        changed |= normalize::check_nan(&self.view)?;
        changed |= normalize::spin_to_binary(&mut self.view)?;
        changed |= normalize::remove_offsets(&mut self.view);
        changed |= normalize::remove_self_loops(&mut self.view)?;
        changed |= normalize::flip_constraints(&mut self.view);
        changed |= normalize::remove_invalid_markers(&mut self.view);

        self.normalized = true;
        Ok(changed)
    }

    /// Normalize, then iterate the enabled techniques to a fixed point.
    /// Returns whether anything changed.
    pub fn apply(&mut self) -> PresolveResult<bool> {
        let mut changed = self.normalize()?;
        changed |= self.reduce()?;
        Ok(changed)
    }

    /// Lift a reduced-space sample to the original variable space by
    /// replaying the transform log in reverse. Never fails and remains
    /// usable after [`detach_model`](Self::detach_model).
    pub fn restore(&self, sample: Vec<f64>) -> Vec<f64> {
        self.view.restore(sample)
    }

    /// Move the reduced model out. The transform log is kept so samples can
    /// still be restored; normalize/apply calls are rejected afterwards.
    pub fn detach_model(&mut self) -> ConstrainedQuadraticModel {
        self.detached = true;
        self.view.detach_model()
    }

    fn reduce(&mut self) -> PresolveResult<bool> {
        if self.detached {
            return Err(PresolveError::Logic(
                "model has been detached, so there is no model to presolve".into(),
            ));
        }
        if !self.normalized {
            return Err(PresolveError::Logic(
                "model must be normalized before techniques are applied".into(),
            ));
        }
        if self.techniques.is_empty() {
            return Ok(false);
        }

        let mut changed_any = false;
        let mut changed = true;
        for _ in 0..MAX_NUM_ROUNDS {
            if !changed {
                break;
            }
            changed = false;

            // compact expressions first so absorption and tightening see
            // live terms, then let propagation expose fixings
            changed |= techniques::remove_zero_biases(&mut self.view);
            changed |= techniques::remove_small_biases(&mut self.view);
            let absorbed = techniques::remove_single_variable_constraints(&mut self.view);
            changed |= self.note_infeasible(absorbed)?;
            changed |= techniques::tighten_bounds(&mut self.view);
            let propagated = techniques::propagate_domains(&mut self.view);
            changed |= self.note_infeasible(propagated)?;
            changed |= techniques::remove_fixed_variables(&mut self.view)?;

            changed_any |= changed;
        }

        // markers can go stale while constraints shrink
        changed_any |= normalize::remove_invalid_markers(&mut self.view);

        #[cfg(debug_assertions)]
        {
            let renormalized = self.normalize()?;
            debug_assert!(!renormalized, "reduction left the model non-canonical");
        }

        Ok(changed_any)
    }

    fn note_infeasible(&mut self, result: PresolveResult<bool>) -> PresolveResult<bool> {
        if matches!(result, Err(PresolveError::Infeasible)) {
            self.feasibility = Feasibility::Infeasible;
        }
        result
    }
}

impl From<ConstrainedQuadraticModel> for Presolver {
    fn from(model: ConstrainedQuadraticModel) -> Self {
        Self::new(model)
    }
}
