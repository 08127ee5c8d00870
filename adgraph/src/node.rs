//! Graph nodes for reverse-mode differentiation.
//!
//! A node is immutable once built: its value and the local weights on
//! its operand edges are computed eagerly from the operand values and
//! never change. Nodes are shared through `Rc`, so a node lives exactly
//! as long as some handle or downstream node still refers to it. Since
//! a node can only point at nodes that already exist, the graph is
//! acyclic by construction.

use adgraph_core::{BinaryOp, UnaryOp};
use num_traits::Float;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

/// Stable identity of a graph node.
///
/// Identities come from a process-wide counter and are never reused,
/// so two nodes with equal values remain distinguishable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    fn fresh() -> Self {
        NodeId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a node is: a leaf, or the operation that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeKind<T> {
    /// A differentiation target.
    Parameter,
    /// A leaf that never receives a derivative.
    Constant,
    /// Result of a single-operand operation.
    Unary(UnaryOp<T>),
    /// Result of a two-operand operation.
    Binary(BinaryOp),
}

impl<T: fmt::Display> fmt::Display for NodeKind<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Parameter => f.write_str("parameter"),
            NodeKind::Constant => f.write_str("constant"),
            NodeKind::Unary(op) => op.fmt(f),
            NodeKind::Binary(op) => op.fmt(f),
        }
    }
}

/// An operand reference together with `∂(node)/∂(operand)`.
pub(crate) struct Edge<T> {
    pub(crate) node: Rc<Node<T>>,
    pub(crate) weight: T,
}

pub(crate) enum Op<T> {
    Parameter,
    Constant,
    Unary {
        op: UnaryOp<T>,
        arg: Edge<T>,
    },
    Binary {
        op: BinaryOp,
        lhs: Edge<T>,
        rhs: Edge<T>,
    },
}

pub(crate) struct Node<T> {
    pub(crate) id: NodeId,
    pub(crate) value: T,
    pub(crate) op: Op<T>,
}

impl<T> Node<T> {
    pub(crate) fn parameter(value: T) -> Self {
        Self::with_op(value, Op::Parameter)
    }

    pub(crate) fn constant(value: T) -> Self {
        Self::with_op(value, Op::Constant)
    }

    fn with_op(value: T, op: Op<T>) -> Self {
        Node {
            id: NodeId::fresh(),
            value,
            op,
        }
    }

    /// Operand edges, left to right.
    pub(crate) fn operands(&self) -> impl Iterator<Item = &Edge<T>> {
        let (first, second) = match &self.op {
            Op::Unary { arg, .. } => (Some(arg), None),
            Op::Binary { lhs, rhs, .. } => (Some(lhs), Some(rhs)),
            Op::Parameter | Op::Constant => (None, None),
        };
        first.into_iter().chain(second)
    }
}

impl<T: Copy> Node<T> {
    pub(crate) fn kind(&self) -> NodeKind<T> {
        match &self.op {
            Op::Parameter => NodeKind::Parameter,
            Op::Constant => NodeKind::Constant,
            Op::Unary { op, .. } => NodeKind::Unary(*op),
            Op::Binary { op, .. } => NodeKind::Binary(*op),
        }
    }
}

impl<T: Float> Node<T> {
    pub(crate) fn unary(op: UnaryOp<T>, arg: &Rc<Node<T>>) -> Self {
        let (value, weight) = op.eval(arg.value);
        Self::with_op(
            value,
            Op::Unary {
                op,
                arg: Edge {
                    node: Rc::clone(arg),
                    weight,
                },
            },
        )
    }

    pub(crate) fn binary(op: BinaryOp, lhs: &Rc<Node<T>>, rhs: &Rc<Node<T>>) -> Self {
        let (wl, wr) = op.partials(lhs.value, rhs.value);
        Self::with_op(
            op.apply(lhs.value, rhs.value),
            Op::Binary {
                op,
                lhs: Edge {
                    node: Rc::clone(lhs),
                    weight: wl,
                },
                rhs: Edge {
                    node: Rc::clone(rhs),
                    weight: wr,
                },
            },
        )
    }
}

// Long operation chains would otherwise be freed by nested `Drop` calls,
// one stack frame per link.
impl<T> Drop for Node<T> {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        detach_operands(&mut self.op, &mut pending);
        while let Some(node) = pending.pop() {
            if let Ok(mut node) = Rc::try_unwrap(node) {
                detach_operands(&mut node.op, &mut pending);
            }
        }
    }
}

fn detach_operands<T>(op: &mut Op<T>, pending: &mut Vec<Rc<Node<T>>>) {
    match std::mem::replace(op, Op::Constant) {
        Op::Unary { arg, .. } => pending.push(arg.node),
        Op::Binary { lhs, rhs, .. } => {
            pending.push(lhs.node);
            pending.push(rhs.node);
        }
        Op::Parameter | Op::Constant => {}
    }
}
