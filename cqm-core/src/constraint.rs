//! Sensed constraints.

use std::fmt;

use rustc_hash::FxHashSet;

use crate::expression::Expression;

/// Comparison sense of a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    /// Left-hand side is at most the right-hand side
    Le,

    /// Left-hand side is at least the right-hand side
    Ge,

    /// Left-hand side equals the right-hand side
    Eq,
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sense::Le => write!(f, "<="),
            Sense::Ge => write!(f, ">="),
            Sense::Eq => write!(f, "=="),
        }
    }
}

/// A quadratic constraint: `lhs(x) sense rhs`.
///
/// A constraint may be soft (violations are permitted at a penalty weight)
/// and may carry a discrete marker asserting that it encodes a one-hot
/// categorical variable. Neither attribute changes the predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    /// Left-hand-side expression. Edits are not tracked by the container.
    pub lhs: Expression,
    sense: Sense,
    rhs: f64,
    weight: Option<f64>,
    discrete: bool,
}

impl Constraint {
    /// Create an empty constraint with the given sense and right-hand side.
    pub fn new(sense: Sense, rhs: f64) -> Self {
        Self {
            lhs: Expression::new(),
            sense,
            rhs,
            weight: None,
            discrete: false,
        }
    }

    /// Comparison sense.
    pub fn sense(&self) -> Sense {
        self.sense
    }

    /// Set the comparison sense.
    pub fn set_sense(&mut self, sense: Sense) {
        self.sense = sense;
    }

    /// Right-hand side.
    pub fn rhs(&self) -> f64 {
        self.rhs
    }

    /// Set the right-hand side.
    pub fn set_rhs(&mut self, rhs: f64) {
        self.rhs = rhs;
    }

    /// Penalty weight, if the constraint is soft.
    pub fn weight(&self) -> Option<f64> {
        self.weight
    }

    /// Make the constraint soft with the given penalty weight, or hard with
    /// `None`.
    pub fn set_weight(&mut self, weight: Option<f64>) {
        self.weight = weight;
    }

    /// Whether the constraint is soft.
    pub fn is_soft(&self) -> bool {
        self.weight.is_some()
    }

    /// Whether the constraint carries the discrete (one-hot) marker.
    pub fn marked_discrete(&self) -> bool {
        self.discrete
    }

    /// Set or clear the discrete marker.
    pub fn mark_discrete(&mut self, marked: bool) {
        self.discrete = marked;
    }

    /// Multiply the expression and the right-hand side by `factor`.
    /// A negative factor flips `Le` and `Ge`.
    pub fn scale(&mut self, factor: f64) {
        self.lhs.scale(factor);
        self.rhs *= factor;
        if factor < 0.0 {
            self.sense = match self.sense {
                Sense::Le => Sense::Ge,
                Sense::Ge => Sense::Le,
                Sense::Eq => Sense::Eq,
            };
        }
    }

    /// Whether this constraint and `other` have any variable in common.
    pub fn shares_variables(&self, other: &Constraint) -> bool {
        let (small, large) = if self.lhs.num_variables() <= other.lhs.num_variables() {
            (self, other)
        } else {
            (other, self)
        };
        let vars: FxHashSet<usize> = small.lhs.variables().collect();
        large.lhs.variables().any(|v| vars.contains(&v))
    }

    /// Whether the predicate holds at an assignment, within `tol`.
    pub fn satisfied(&self, sample: &[f64], tol: f64) -> bool {
        let lhs = self.lhs.energy(sample);
        match self.sense {
            Sense::Le => lhs <= self.rhs + tol,
            Sense::Ge => lhs >= self.rhs - tol,
            Sense::Eq => (lhs - self.rhs).abs() <= tol,
        }
    }
}
