//! The backward accumulator.
//!
//! One pass over the subgraph reachable from an output computes the
//! total derivative of that output with respect to every parameter it
//! depends on.
//!
//! Adjoints are propagated in reverse topological order: a node is
//! expanded only once every consumer has added its contribution, so a
//! shared subexpression is visited once no matter how many paths lead
//! to it. The result is the same sum over paths as a plain depth-first
//! walk, at a cost linear in the size of the reachable subgraph. Both
//! the ordering and the sweep use explicit stacks, so deep expressions
//! cannot exhaust the call stack.

use crate::derivative_map::DerivativeMap;
use crate::node::{Node, NodeId, Op};
use crate::var::Var;
use num_traits::Float;
use std::collections::{HashMap, HashSet};

/// Computes the derivatives of `output` with respect to every parameter
/// reachable from it.
///
/// # Example
///
/// ```
/// use adgraph::{backward, Var};
///
/// // f(x, y) = exp(x + y/x)
/// let x = Var::parameter(3.0_f64);
/// let y = Var::parameter(2.0_f64);
/// let f = (&x + &y / &x).exp();
///
/// let grads = backward(&f);
/// let fx = f.value();
/// assert!((grads.get_or_zero(&x) - (1.0 - 2.0 / 9.0) * fx).abs() < 1e-9);
/// assert!((grads.get_or_zero(&y) - fx / 3.0).abs() < 1e-9);
/// ```
pub fn backward<T: Float>(output: &Var<T>) -> DerivativeMap<T> {
    let mut map = DerivativeMap::new();
    backward_into(output, &mut map);
    map
}

/// Refills `map` with the derivatives of `output`.
///
/// The map is cleared first; entries from an earlier pass never leak
/// into this one.
pub fn backward_into<T: Float>(output: &Var<T>, map: &mut DerivativeMap<T>) {
    map.clear();

    let order = reverse_topological_order(output.node());
    let mut adjoints: HashMap<NodeId, T> = HashMap::with_capacity(order.len());
    adjoints.insert(output.id(), T::one());

    for node in &order {
        let adjoint = adjoints.remove(&node.id).unwrap_or_else(T::zero);
        if let Op::Parameter = node.op {
            map.accumulate(node.id, adjoint);
            continue;
        }
        for edge in node.operands() {
            let slot = adjoints.entry(edge.node.id).or_insert_with(T::zero);
            *slot = *slot + adjoint * edge.weight;
        }
    }

    tracing::debug!(
        output = %output.id(),
        nodes = order.len(),
        parameters = map.len(),
        "backward pass complete"
    );
}

/// Nodes reachable from `root`, every node before all of its operands.
fn reverse_topological_order<T>(root: &Node<T>) -> Vec<&Node<T>> {
    let mut visited = HashSet::new();
    let mut post_order = Vec::new();
    let mut stack = vec![(root, false)];

    while let Some((node, expanded)) = stack.pop() {
        if expanded {
            post_order.push(node);
            continue;
        }
        if !visited.insert(node.id) {
            continue;
        }
        stack.push((node, true));
        for edge in node.operands() {
            if !visited.contains(&edge.node.id) {
                stack.push((&*edge.node, false));
            }
        }
    }

    post_order.reverse();
    post_order
}
