//! Derivative storage produced by a backward pass.

use crate::error::{AdError, Result};
use crate::node::NodeId;
use crate::var::Var;
use num_traits::Float;
use std::collections::HashMap;

/// Total derivatives of one output with respect to the parameters it
/// depends on, keyed by parameter identity.
///
/// A map holds the result of exactly one backward pass: every parameter
/// reachable from the output has an entry, even when its derivative is
/// zero. Constants and intermediate nodes never have entries.
///
/// # Example
///
/// ```
/// use adgraph::{AdError, Var};
///
/// let x = Var::parameter(3.0_f64);
/// let y = Var::parameter(2.0_f64);
/// let f = &x * &x;
///
/// let grads = f.backward();
/// assert_eq!(grads.get(&x), Ok(6.0));
///
/// // `y` does not feed into `f`
/// assert!(!grads.contains(&y));
/// assert_eq!(grads.get(&y), Err(AdError::NotFound { id: y.id() }));
/// assert_eq!(grads.get_or_zero(&y), 0.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DerivativeMap<T> {
    entries: HashMap<NodeId, T>,
}

impl<T: Float> DerivativeMap<T> {
    /// Create an empty map.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Forget every entry, keeping the allocation for the next pass.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Whether the backward pass reached parameter `p`.
    pub fn contains(&self, p: &Var<T>) -> bool {
        self.entries.contains_key(&p.id())
    }

    /// The derivative with respect to `p`.
    ///
    /// Fails with [`AdError::NotFound`] when `p` was not reached, which
    /// includes constants and intermediate handles.
    pub fn get(&self, p: &Var<T>) -> Result<T> {
        self.get_by_id(p.id())
            .ok_or(AdError::NotFound { id: p.id() })
    }

    /// The derivative with respect to `p`, or zero when `p` was not
    /// reached.
    pub fn get_or_zero(&self, p: &Var<T>) -> T {
        self.get_by_id(p.id()).unwrap_or_else(T::zero)
    }

    /// Lookup by raw identity.
    pub fn get_by_id(&self, id: NodeId) -> Option<T> {
        self.entries.get(&id).copied()
    }

    /// Number of parameters reached.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no parameter was reached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(parameter id, derivative)` pairs in no particular
    /// order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, T)> + '_ {
        self.entries.iter().map(|(&id, &d)| (id, d))
    }

    /// Add `d` to the entry for `id`, creating it if absent.
    pub(crate) fn accumulate(&mut self, id: NodeId, d: T) {
        let entry = self.entries.entry(id).or_insert_with(T::zero);
        *entry = *entry + d;
    }
}

impl<T: Float> Default for DerivativeMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_map_is_empty() {
        let map: DerivativeMap<f64> = DerivativeMap::new();
        assert!(map.is_empty());
        assert_eq!(map.len(), 0);
        assert_eq!(map.iter().count(), 0);
    }

    #[test]
    fn accumulate_adds_instead_of_overwriting() {
        let x = Var::parameter(1.0_f64);
        let mut map = DerivativeMap::new();

        map.accumulate(x.id(), 2.0);
        map.accumulate(x.id(), 3.5);

        assert_eq!(map.get(&x), Ok(5.5));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn clear_removes_every_entry() {
        let x = Var::parameter(1.0_f64);
        let y = Var::parameter(1.0_f64);
        let mut map = DerivativeMap::new();
        map.accumulate(x.id(), 1.0);
        map.accumulate(y.id(), 0.0);

        map.clear();

        assert!(!map.contains(&x));
        assert!(!map.contains(&y));
        assert!(map.is_empty());
    }

    #[test]
    fn zero_entry_is_still_present() {
        let x = Var::parameter(1.0_f64);
        let mut map = DerivativeMap::new();
        map.accumulate(x.id(), 0.0);

        assert!(map.contains(&x));
        assert_eq!(map.get(&x), Ok(0.0));
    }

    #[test]
    fn missing_entry_is_not_found() {
        let x = Var::parameter(1.0_f64);
        let map = DerivativeMap::new();

        assert_eq!(map.get(&x), Err(AdError::NotFound { id: x.id() }));
        assert_eq!(map.get_or_zero(&x), 0.0);
        assert_eq!(map.get_by_id(x.id()), None);
    }
}
