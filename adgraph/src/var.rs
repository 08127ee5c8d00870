use crate::backward;
use crate::derivative_map::DerivativeMap;
use crate::node::{Node, NodeId, NodeKind};
use adgraph_core::{BinaryOp, UnaryOp};
use num_traits::Float;
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use std::rc::Rc;

/// A differentiable value for reverse-mode automatic differentiation.
///
/// A `Var` is a cheap, clonable handle to an immutable node of the
/// computation graph. Arithmetic and math functions never change their
/// operands: they build a new node holding the result value and the
/// local derivatives, and return a handle to it.
///
/// Leaves are either parameters ([`Var::parameter`], also `From<T>`),
/// which receive derivatives, or constants ([`Var::constant`]), which
/// never do. Raw scalars mixed into expressions become constants.
///
/// # Examples
///
/// ```
/// use adgraph::Var;
///
/// // f(x) = (x+1)(x-1) = x² - 1
/// let x = Var::parameter(3.0_f64);
/// let f = (&x + 1.0) * (&x - 1.0);
///
/// let grads = f.backward();
/// assert_eq!(f.value(), 8.0);          // f(3) = 8
/// assert_eq!(grads.get(&x), Ok(6.0));  // f'(3) = 2x = 6
/// ```
///
/// Shared subexpressions contribute once per path:
///
/// ```
/// use adgraph::Var;
///
/// // f(x, y) = x + x·y
/// let x = Var::parameter(2.0);
/// let y = Var::parameter(5.0);
/// let f = &x + &x * &y;
///
/// let grads = f.backward();
/// assert_eq!(grads.get(&x), Ok(6.0));  // 1 + y
/// assert_eq!(grads.get(&y), Ok(2.0));  // x
/// ```
#[derive(Clone)]
pub struct Var<T> {
    node: Rc<Node<T>>,
}

impl<T: Float> Var<T> {
    /// Creates a parameter leaf: a value derivatives are taken with
    /// respect to.
    pub fn parameter(value: T) -> Self {
        Self::from_node(Node::parameter(value))
    }

    /// Creates a constant leaf. Constants are never present in a
    /// [`DerivativeMap`].
    ///
    /// ```
    /// use adgraph::Var;
    ///
    /// let x = Var::parameter(2.0);
    /// let k = Var::constant(3.0);
    /// let grads = (&x * &k).backward();
    ///
    /// assert_eq!(grads.get(&x), Ok(3.0));
    /// assert!(!grads.contains(&k));
    /// ```
    pub fn constant(value: T) -> Self {
        Self::from_node(Node::constant(value))
    }

    fn from_node(node: Node<T>) -> Self {
        Var {
            node: Rc::new(node),
        }
    }

    /// The value computed for this node.
    pub fn value(&self) -> T {
        self.node.value
    }

    /// The node's identity, as used for [`DerivativeMap`] keys.
    pub fn id(&self) -> NodeId {
        self.node.id
    }

    /// What produced this node.
    pub fn kind(&self) -> NodeKind<T> {
        self.node.kind()
    }

    /// Whether this handle is a parameter leaf.
    pub fn is_parameter(&self) -> bool {
        matches!(self.kind(), NodeKind::Parameter)
    }

    /// Whether this handle is a constant leaf.
    pub fn is_constant(&self) -> bool {
        matches!(self.kind(), NodeKind::Constant)
    }

    pub(crate) fn node(&self) -> &Node<T> {
        &self.node
    }

    /// Derivatives of this value with respect to every reachable
    /// parameter. See [`backward`](crate::backward()).
    pub fn backward(&self) -> DerivativeMap<T> {
        backward::backward(self)
    }

    /// Like [`Var::backward`], but refills an existing map. The map is
    /// cleared first, so nothing from a previous pass survives.
    pub fn backward_into(&self, map: &mut DerivativeMap<T>) {
        backward::backward_into(self, map)
    }

    /// Records a single-operand operation on this value.
    ///
    /// ```
    /// use adgraph::{UnaryOp, Var};
    ///
    /// let x = Var::parameter(2.0);
    /// let y = x.unary(UnaryOp::Powi(3));
    /// assert_eq!(y.value(), 8.0);
    /// assert_eq!(y.backward().get(&x), Ok(12.0));
    /// ```
    pub fn unary(&self, op: UnaryOp<T>) -> Self {
        Self::from_node(Node::unary(op, &self.node))
    }

    /// Records a two-operand operation with `self` on the left.
    pub fn binary(&self, op: BinaryOp, rhs: &Self) -> Self {
        Self::from_node(Node::binary(op, &self.node, &rhs.node))
    }

    /// Computes `sin(self)`.
    pub fn sin(&self) -> Self {
        self.unary(UnaryOp::Sin)
    }

    /// Computes `cos(self)`.
    pub fn cos(&self) -> Self {
        self.unary(UnaryOp::Cos)
    }

    /// Computes `tan(self)`.
    pub fn tan(&self) -> Self {
        self.unary(UnaryOp::Tan)
    }

    /// Computes `asin(self)`.
    pub fn asin(&self) -> Self {
        self.unary(UnaryOp::Asin)
    }

    /// Computes `acos(self)`.
    pub fn acos(&self) -> Self {
        self.unary(UnaryOp::Acos)
    }

    /// Computes `atan(self)`.
    pub fn atan(&self) -> Self {
        self.unary(UnaryOp::Atan)
    }

    /// Four-quadrant `atan(self / x)`; `self` is the ordinate.
    ///
    /// ```
    /// use adgraph::Var;
    ///
    /// let x = Var::parameter(3.0);
    /// let y = Var::parameter(1.0);
    /// let f = y.atan2(&x);
    ///
    /// let grads = f.backward();
    /// assert!((grads.get_or_zero(&x) + 0.1_f64).abs() < 1e-12);  // -y/(x²+y²)
    /// assert!((grads.get_or_zero(&y) - 0.3_f64).abs() < 1e-12);  //  x/(x²+y²)
    /// ```
    pub fn atan2(&self, x: &Self) -> Self {
        self.binary(BinaryOp::Atan2, x)
    }

    /// Computes `e^self`.
    pub fn exp(&self) -> Self {
        self.unary(UnaryOp::Exp)
    }

    /// Computes `ln(self)`.
    pub fn ln(&self) -> Self {
        self.unary(UnaryOp::Ln)
    }

    /// Computes `log₂(self)`.
    pub fn log2(&self) -> Self {
        self.unary(UnaryOp::Log2)
    }

    /// Computes `sqrt(self)`.
    pub fn sqrt(&self) -> Self {
        self.unary(UnaryOp::Sqrt)
    }

    /// Computes `|self|`. The local derivative is the sign, and zero at
    /// the origin.
    pub fn abs(&self) -> Self {
        self.unary(UnaryOp::Abs)
    }

    /// Computes `self²`.
    pub fn square(&self) -> Self {
        self.unary(UnaryOp::Square)
    }

    /// Computes the reciprocal `1/self`.
    pub fn recip(&self) -> Self {
        self.unary(UnaryOp::Recip)
    }

    /// Computes `self^e` for a constant real exponent.
    pub fn powf(&self, e: T) -> Self {
        self.unary(UnaryOp::Powf(e))
    }

    /// Computes `self^n` for an integer exponent.
    pub fn powi(&self, n: i32) -> Self {
        self.unary(UnaryOp::Powi(n))
    }
}

impl<T: Float> From<T> for Var<T> {
    fn from(value: T) -> Self {
        Var::parameter(value)
    }
}

impl<T: Float + fmt::Debug> fmt::Debug for Var<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Var")
            .field("id", &self.id())
            .field("value", &self.value())
            .field("kind", &self.kind())
            .finish()
    }
}

impl<T: Float + fmt::Display> fmt::Display for Var<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.value(), self.kind())
    }
}

impl<T: Float> PartialEq for Var<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value() == other.value()
    }
}

impl<T: Float> PartialEq<T> for Var<T> {
    fn eq(&self, other: &T) -> bool {
        self.value() == *other
    }
}

impl<T: Float> PartialOrd for Var<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.value().partial_cmp(&other.value())
    }
}

impl<T: Float> PartialOrd<T> for Var<T> {
    fn partial_cmp(&self, other: &T) -> Option<Ordering> {
        self.value().partial_cmp(other)
    }
}

impl<T: Float> Neg for Var<T> {
    type Output = Var<T>;
    fn neg(self) -> Self::Output {
        self.unary(UnaryOp::Neg)
    }
}

impl<T: Float> Neg for &Var<T> {
    type Output = Var<T>;
    fn neg(self) -> Self::Output {
        self.unary(UnaryOp::Neg)
    }
}

macro_rules! binary_ops {
    ($($tr:ident::$method:ident, $assign_tr:ident::$assign_method:ident => $op:expr;)*) => {$(
        impl<T: Float> $tr for Var<T> {
            type Output = Var<T>;
            fn $method(self, rhs: Var<T>) -> Self::Output {
                self.binary($op, &rhs)
            }
        }

        impl<T: Float> $tr<&Var<T>> for Var<T> {
            type Output = Var<T>;
            fn $method(self, rhs: &Var<T>) -> Self::Output {
                self.binary($op, rhs)
            }
        }

        impl<T: Float> $tr<Var<T>> for &Var<T> {
            type Output = Var<T>;
            fn $method(self, rhs: Var<T>) -> Self::Output {
                self.binary($op, &rhs)
            }
        }

        impl<T: Float> $tr<&Var<T>> for &Var<T> {
            type Output = Var<T>;
            fn $method(self, rhs: &Var<T>) -> Self::Output {
                self.binary($op, rhs)
            }
        }

        impl<T: Float> $tr<T> for Var<T> {
            type Output = Var<T>;
            fn $method(self, c: T) -> Self::Output {
                self.binary($op, &Var::constant(c))
            }
        }

        impl<T: Float> $tr<T> for &Var<T> {
            type Output = Var<T>;
            fn $method(self, c: T) -> Self::Output {
                self.binary($op, &Var::constant(c))
            }
        }

        impl<T: Float> $assign_tr for Var<T> {
            fn $assign_method(&mut self, rhs: Var<T>) {
                *self = self.binary($op, &rhs);
            }
        }

        impl<T: Float> $assign_tr<&Var<T>> for Var<T> {
            fn $assign_method(&mut self, rhs: &Var<T>) {
                *self = self.binary($op, rhs);
            }
        }

        impl<T: Float> $assign_tr<T> for Var<T> {
            fn $assign_method(&mut self, c: T) {
                *self = self.binary($op, &Var::constant(c));
            }
        }
    )*};
}

binary_ops! {
    Add::add, AddAssign::add_assign => BinaryOp::Add;
    Sub::sub, SubAssign::sub_assign => BinaryOp::Sub;
    Mul::mul, MulAssign::mul_assign => BinaryOp::Mul;
    Div::div, DivAssign::div_assign => BinaryOp::Div;
}

// Scalars on the left become constant leaves.
macro_rules! scalar_lhs_ops {
    (@op $t:ty, $tr:ident::$method:ident => $op:expr) => {
        impl $tr<Var<$t>> for $t {
            type Output = Var<$t>;
            fn $method(self, rhs: Var<$t>) -> Self::Output {
                Var::constant(self).binary($op, &rhs)
            }
        }

        impl $tr<&Var<$t>> for $t {
            type Output = Var<$t>;
            fn $method(self, rhs: &Var<$t>) -> Self::Output {
                Var::constant(self).binary($op, rhs)
            }
        }
    };
    ($($t:ty),*) => {$(
        scalar_lhs_ops!(@op $t, Add::add => BinaryOp::Add);
        scalar_lhs_ops!(@op $t, Sub::sub => BinaryOp::Sub);
        scalar_lhs_ops!(@op $t, Mul::mul => BinaryOp::Mul);
        scalar_lhs_ops!(@op $t, Div::div => BinaryOp::Div);
    )*};
}

scalar_lhs_ops!(f32, f64);
