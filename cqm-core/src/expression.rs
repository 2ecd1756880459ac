//! Quadratic expressions over model variables.
//!
//! An expression is a quadratic polynomial: a linear bias per variable, a
//! quadratic bias per unordered variable pair (self-pairs allowed), and a
//! scalar offset. Variables are dense indices into the owning model.
//!
//! Storage is an adjacency structure rather than a matrix: the presolver
//! removes variables and interactions incrementally and relabels indices
//! when the model drops a variable, so the layout must stay cheap to edit.

use std::collections::BTreeMap;

/// A quadratic polynomial over variable indices.
///
/// Every variable with a quadratic term also carries a linear entry
/// (possibly zero); the adjacency is symmetric, with a self-pair `(v, v)`
/// stored once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expression {
    linear: BTreeMap<usize, f64>,
    adj: BTreeMap<usize, BTreeMap<usize, f64>>,
    offset: f64,
}

impl Expression {
    /// Create an empty expression.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of variables with an entry in this expression.
    pub fn num_variables(&self) -> usize {
        self.linear.len()
    }

    /// Iterate the variables of this expression in ascending index order.
    pub fn variables(&self) -> impl Iterator<Item = usize> + '_ {
        self.linear.keys().copied()
    }

    /// Whether `v` has an entry in this expression.
    pub fn contains(&self, v: usize) -> bool {
        self.linear.contains_key(&v)
    }

    /// Linear bias of `v`, or 0 if `v` is not in the expression.
    pub fn linear(&self, v: usize) -> f64 {
        self.linear.get(&v).copied().unwrap_or(0.0)
    }

    /// Set the linear bias of `v`, adding `v` to the expression if absent.
    pub fn set_linear(&mut self, v: usize, bias: f64) {
        self.linear.insert(v, bias);
    }

    /// Add to the linear bias of `v`, adding `v` to the expression if absent.
    pub fn add_linear(&mut self, v: usize, bias: f64) {
        *self.linear.entry(v).or_insert(0.0) += bias;
    }

    /// Quadratic bias between `u` and `v`, or 0 if there is no interaction.
    pub fn quadratic(&self, u: usize, v: usize) -> f64 {
        self.adj
            .get(&u)
            .and_then(|nbrs| nbrs.get(&v))
            .copied()
            .unwrap_or(0.0)
    }

    /// Whether an interaction between `u` and `v` is present.
    pub fn has_interaction(&self, u: usize, v: usize) -> bool {
        self.adj.get(&u).is_some_and(|nbrs| nbrs.contains_key(&v))
    }

    /// Set the quadratic bias between `u` and `v`, adding either variable to
    /// the expression if absent. A zero bias is stored, not dropped.
    pub fn set_quadratic(&mut self, u: usize, v: usize, bias: f64) {
        self.linear.entry(u).or_insert(0.0);
        self.linear.entry(v).or_insert(0.0);
        self.set_adjacency(u, v, bias);
    }

    /// Add to the quadratic bias between `u` and `v`, adding either variable
    /// to the expression if absent.
    pub fn add_quadratic(&mut self, u: usize, v: usize, bias: f64) {
        let updated = self.quadratic(u, v) + bias;
        self.set_quadratic(u, v, updated);
    }

    /// Remove the interaction between `u` and `v`, keeping both variables in
    /// the expression. Returns whether an interaction was present.
    pub fn remove_interaction(&mut self, u: usize, v: usize) -> bool {
        let mut removed = false;
        if let Some(nbrs) = self.adj.get_mut(&u) {
            removed = nbrs.remove(&v).is_some();
            if nbrs.is_empty() {
                self.adj.remove(&u);
            }
        }
        if u != v {
            if let Some(nbrs) = self.adj.get_mut(&v) {
                nbrs.remove(&u);
                if nbrs.is_empty() {
                    self.adj.remove(&v);
                }
            }
        }
        removed
    }

    /// Total number of interactions, counting each unordered pair once.
    pub fn num_interactions(&self) -> usize {
        self.adj
            .iter()
            .map(|(&u, nbrs)| nbrs.range(u..).count())
            .sum()
    }

    /// Number of interactions involving `v` (a self-pair counts once).
    pub fn degree(&self, v: usize) -> usize {
        self.adj.get(&v).map_or(0, BTreeMap::len)
    }

    /// Iterate quadratic terms as `(u, v, bias)` with `u <= v`, each
    /// unordered pair once, in deterministic order.
    pub fn iter_quadratic(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.adj.iter().flat_map(|(&u, nbrs)| {
            nbrs.range(u..).map(move |(&v, &bias)| (u, v, bias))
        })
    }

    /// Scalar offset.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Set the scalar offset.
    pub fn set_offset(&mut self, offset: f64) {
        self.offset = offset;
    }

    /// Add to the scalar offset.
    pub fn add_offset(&mut self, offset: f64) {
        self.offset += offset;
    }

    /// Remove `v` and all its interactions from the expression.
    /// Returns whether `v` was present.
    pub fn remove_variable(&mut self, v: usize) -> bool {
        if self.linear.remove(&v).is_none() {
            return false;
        }
        if let Some(nbrs) = self.adj.remove(&v) {
            for u in nbrs.keys() {
                if *u == v {
                    continue;
                }
                if let Some(mirror) = self.adj.get_mut(u) {
                    mirror.remove(&v);
                    if mirror.is_empty() {
                        self.adj.remove(u);
                    }
                }
            }
        }
        true
    }

    /// Whether the expression has no quadratic terms.
    pub fn is_linear(&self) -> bool {
        self.adj.is_empty()
    }

    /// Multiply every bias and the offset by `factor`.
    pub fn scale(&mut self, factor: f64) {
        for bias in self.linear.values_mut() {
            *bias *= factor;
        }
        for nbrs in self.adj.values_mut() {
            for bias in nbrs.values_mut() {
                *bias *= factor;
            }
        }
        self.offset *= factor;
    }

    /// Substitute `value` for `v`: the linear bias folds into the offset,
    /// quadratic biases fold into the neighbours' linear biases (a self-pair
    /// folds `bias * value^2` into the offset), and `v` is removed.
    /// Returns whether `v` was present.
    pub fn fix_variable(&mut self, v: usize, value: f64) -> bool {
        let Some(lin) = self.linear.remove(&v) else {
            return false;
        };
        self.offset += lin * value;
        if let Some(nbrs) = self.adj.remove(&v) {
            for (u, bias) in nbrs {
                if u == v {
                    self.offset += bias * value * value;
                } else {
                    *self.linear.entry(u).or_insert(0.0) += bias * value;
                    if let Some(mirror) = self.adj.get_mut(&u) {
                        mirror.remove(&v);
                        if mirror.is_empty() {
                            self.adj.remove(&u);
                        }
                    }
                }
            }
        }
        true
    }

    /// Replace every occurrence of `v` by the affine image
    /// `multiplier * v + offset`, keeping `v` as the carrier variable.
    ///
    /// For a spin variable re-expressed over a binary carrier this is
    /// `multiplier = 2`, `offset = -1`. Returns whether `v` was present.
    pub fn substitute_variable(&mut self, v: usize, multiplier: f64, offset: f64) -> bool {
        let Some(&lin) = self.linear.get(&v) else {
            return false;
        };

        // a*v -> a*m*v + a*o
        self.linear.insert(v, lin * multiplier);
        self.offset += lin * offset;

        let neighbours: Vec<(usize, f64)> = self
            .adj
            .get(&v)
            .map(|nbrs| nbrs.iter().map(|(&u, &b)| (u, b)).collect())
            .unwrap_or_default();
        for (u, bias) in neighbours {
            if u == v {
                // b*v^2 -> b*m^2*v^2 + 2*b*m*o*v + b*o^2
                self.set_adjacency(v, v, bias * multiplier * multiplier);
                self.add_linear(v, 2.0 * bias * multiplier * offset);
                self.offset += bias * offset * offset;
            } else {
                // b*v*u -> b*m*v*u + b*o*u
                self.set_adjacency(v, u, bias * multiplier);
                self.add_linear(u, bias * offset);
            }
        }
        true
    }

    /// Relabel every index greater than `removed` down by one. `removed`
    /// itself must no longer appear in the expression.
    pub fn shift_indices_above(&mut self, removed: usize) {
        debug_assert!(!self.contains(removed));
        let shift = |k: usize| if k > removed { k - 1 } else { k };
        self.linear = std::mem::take(&mut self.linear)
            .into_iter()
            .map(|(k, bias)| (shift(k), bias))
            .collect();
        self.adj = std::mem::take(&mut self.adj)
            .into_iter()
            .map(|(k, nbrs)| {
                let nbrs = nbrs.into_iter().map(|(u, bias)| (shift(u), bias)).collect();
                (shift(k), nbrs)
            })
            .collect();
    }

    /// Evaluate the polynomial at an assignment indexed by variable.
    pub fn energy(&self, sample: &[f64]) -> f64 {
        let mut total = self.offset;
        for (&v, &bias) in &self.linear {
            total += bias * sample[v];
        }
        for (u, v, bias) in self.iter_quadratic() {
            total += bias * sample[u] * sample[v];
        }
        total
    }

    // Symmetric insert; both endpoints must already have linear entries.
    fn set_adjacency(&mut self, u: usize, v: usize, bias: f64) {
        self.adj.entry(u).or_default().insert(v, bias);
        if u != v {
            self.adj.entry(v).or_default().insert(u, bias);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_linear_accessors() {
        let mut expr = Expression::new();
        expr.set_linear(0, 1.5);
        expr.add_linear(0, 0.5);
        expr.add_linear(3, -1.0);

        assert_eq!(expr.num_variables(), 2);
        assert_eq!(expr.linear(0), 2.0);
        assert_eq!(expr.linear(3), -1.0);
        assert_eq!(expr.linear(1), 0.0);
        assert_eq!(expr.variables().collect::<Vec<_>>(), vec![0, 3]);
    }

    #[test]
    fn test_quadratic_is_symmetric() {
        let mut expr = Expression::new();
        expr.set_quadratic(0, 1, 2.0);

        assert_eq!(expr.quadratic(0, 1), 2.0);
        assert_eq!(expr.quadratic(1, 0), 2.0);
        assert!(expr.has_interaction(1, 0));
        assert_eq!(expr.num_variables(), 2);
        assert_eq!(expr.degree(0), 1);
        assert!(!expr.is_linear());
    }

    #[test]
    fn test_zero_bias_is_stored() {
        let mut expr = Expression::new();
        expr.set_quadratic(0, 1, 0.0);
        assert!(expr.has_interaction(0, 1));
        assert_eq!(expr.iter_quadratic().count(), 1);
    }

    #[test]
    fn test_self_pair_counts_once() {
        let mut expr = Expression::new();
        expr.set_quadratic(0, 0, 3.0);
        expr.set_quadratic(0, 1, 1.0);

        assert_eq!(expr.num_interactions(), 2);
        assert_eq!(expr.degree(0), 2);
        let terms: Vec<_> = expr.iter_quadratic().collect();
        assert_eq!(terms, vec![(0, 0, 3.0), (0, 1, 1.0)]);
    }

    #[test]
    fn test_remove_interaction_keeps_variables() {
        let mut expr = Expression::new();
        expr.set_quadratic(0, 1, 2.0);
        assert!(expr.remove_interaction(0, 1));
        assert!(!expr.remove_interaction(0, 1));

        assert_eq!(expr.num_variables(), 2);
        assert!(expr.is_linear());
    }

    #[test]
    fn test_remove_variable() {
        let mut expr = Expression::new();
        expr.set_linear(0, 1.0);
        expr.set_quadratic(0, 1, 2.0);
        expr.set_quadratic(1, 2, 3.0);

        assert!(expr.remove_variable(1));
        assert_eq!(expr.num_variables(), 2);
        assert!(!expr.has_interaction(0, 1));
        assert!(!expr.has_interaction(1, 2));
        assert!(expr.is_linear());
    }

    #[test]
    fn test_fix_variable_folds_biases() {
        // 2*x0 + 3*x0*x1 + x1 + 5
        let mut expr = Expression::new();
        expr.set_linear(0, 2.0);
        expr.set_linear(1, 1.0);
        expr.set_quadratic(0, 1, 3.0);
        expr.set_offset(5.0);

        assert!(expr.fix_variable(0, 2.0));
        // offset 5 + 2*2 = 9, linear(1) = 1 + 3*2 = 7
        assert_relative_eq!(expr.offset(), 9.0);
        assert_relative_eq!(expr.linear(1), 7.0);
        assert!(!expr.contains(0));
        assert!(expr.is_linear());
    }

    #[test]
    fn test_fix_variable_self_pair() {
        // 3*x0^2, fix x0 = 2 -> offset 12
        let mut expr = Expression::new();
        expr.set_quadratic(0, 0, 3.0);
        assert!(expr.fix_variable(0, 2.0));
        assert_relative_eq!(expr.offset(), 12.0);
        assert_eq!(expr.num_variables(), 0);
    }

    #[test]
    fn test_substitute_spin_to_binary() {
        // E(s) = 2*s + 3*s*t with s = 2*x - 1:
        // 4*x - 2 + 6*x*t - 3*t
        let mut expr = Expression::new();
        expr.set_linear(0, 2.0);
        expr.set_quadratic(0, 1, 3.0);

        assert!(expr.substitute_variable(0, 2.0, -1.0));
        assert_relative_eq!(expr.linear(0), 4.0);
        assert_relative_eq!(expr.linear(1), -3.0);
        assert_relative_eq!(expr.quadratic(0, 1), 6.0);
        assert_relative_eq!(expr.offset(), -2.0);
    }

    #[test]
    fn test_substitute_self_pair() {
        // E(s) = s^2 with s = 2*x - 1: 4*x^2 - 4*x + 1
        let mut expr = Expression::new();
        expr.set_quadratic(0, 0, 1.0);

        assert!(expr.substitute_variable(0, 2.0, -1.0));
        assert_relative_eq!(expr.quadratic(0, 0), 4.0);
        assert_relative_eq!(expr.linear(0), -4.0);
        assert_relative_eq!(expr.offset(), 1.0);

        // spin values map onto binary values
        for (b, s) in [(0.0, -1.0), (1.0, 1.0)] {
            assert_relative_eq!(expr.energy(&[b]), s * s);
        }
    }

    #[test]
    fn test_shift_indices_above() {
        let mut expr = Expression::new();
        expr.set_linear(0, 1.0);
        expr.set_linear(2, 2.0);
        expr.set_quadratic(2, 4, 3.0);

        expr.shift_indices_above(1);
        assert_eq!(expr.linear(0), 1.0);
        assert_eq!(expr.linear(1), 2.0);
        assert_eq!(expr.quadratic(1, 3), 3.0);
        assert!(!expr.contains(2));
        assert!(!expr.contains(4));
    }

    #[test]
    fn test_scale() {
        let mut expr = Expression::new();
        expr.set_linear(0, 1.0);
        expr.set_quadratic(0, 1, 2.0);
        expr.set_offset(3.0);

        expr.scale(-1.0);
        assert_eq!(expr.linear(0), -1.0);
        assert_eq!(expr.quadratic(0, 1), -2.0);
        assert_eq!(expr.offset(), -3.0);
    }

    #[test]
    fn test_energy() {
        // 1 + 2*x0 + 3*x0*x1 + x1^2
        let mut expr = Expression::new();
        expr.set_offset(1.0);
        expr.set_linear(0, 2.0);
        expr.set_quadratic(0, 1, 3.0);
        expr.set_quadratic(1, 1, 1.0);

        assert_relative_eq!(expr.energy(&[2.0, 3.0]), 1.0 + 4.0 + 18.0 + 9.0);
    }
}
