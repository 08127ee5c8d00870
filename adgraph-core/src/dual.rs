//! Forward-mode automatic differentiation.
//!
//! [`Dual`] pairs a value with its tangent, `a + a′·ε` with `ε² = 0`.
//! Every operator and math function maps the tangent through the local
//! weight of the matching [operation](crate::ops):
//!
//! - `g(a + a′·ε) = g(a) + a′·g′(a)·ε` for one operand
//! - `h(a, b) + (a′·∂ₐh + b′·∂ᵦh)·ε` for two
//!
//! so the sum, product and quotient rules fall out of the weights
//! `(1, 1)`, `(b, a)` and `(1/b, -a/b²)`. An operand whose tangent is zero
//! adds nothing.
//!
//! One evaluation yields one directional derivative. For the gradient of
//! an `n`-input function, [`forward_gradient`] evaluates it `n` times.
//!
//! ```
//! use adgraph_core::Dual;
//!
//! // x² + 2x at x = 3
//! let x = Dual::variable(3.0_f64);
//! let f = x * x + 2.0 * x;
//!
//! assert_eq!((f.value, f.deriv), (15.0, 8.0));
//! ```

use crate::ops::{BinaryOp, UnaryOp};
use num_traits::{Float, One, Zero};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

/// A value together with its derivative along one input direction.
///
/// Equality and ordering look at `value` only: two duals with the same
/// value but different derivatives compare equal.
///
/// ```
/// use adgraph_core::Dual;
///
/// // (x - 1)(x + 4) at x = 2: value 6, slope 2x + 3 = 7
/// let x = Dual::variable(2.0_f64);
/// let f = (x - 1.0) * (x + 4.0);
///
/// assert_eq!(f.value, 6.0);
/// assert_eq!(f.deriv, 7.0);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Dual<T> {
    /// Value of the expression.
    pub value: T,
    /// Derivative of `value` along the seeded direction.
    pub deriv: T,
}

impl<T> Dual<T> {
    /// A dual with the given value and tangent.
    pub fn new(value: T, deriv: T) -> Self {
        Dual { value, deriv }
    }

    /// A value that does not vary along the seeded direction.
    ///
    /// ```
    /// use adgraph_core::Dual;
    ///
    /// let c = Dual::constant(-1.5_f32);
    /// assert_eq!((c.value, c.deriv), (-1.5, 0.0));
    /// ```
    pub fn constant(value: T) -> Self
    where
        T: Zero,
    {
        Dual::new(value, T::zero())
    }

    /// The input being differentiated: its tangent is seeded with 1.
    ///
    /// ```
    /// use adgraph_core::Dual;
    ///
    /// let x = Dual::variable(0.25_f64);
    /// assert_eq!((x.value, x.deriv), (0.25, 1.0));
    /// ```
    pub fn variable(value: T) -> Self
    where
        T: One,
    {
        Dual::new(value, T::one())
    }
}

impl<T: Float> Dual<T> {
    /// Applies a catalogue operation: `g(a + a′·ε) = g(a) + a′·g′(a)·ε`.
    ///
    /// # Example
    ///
    /// ```
    /// use adgraph_core::{Dual, UnaryOp};
    ///
    /// let x = Dual::variable(2.0);
    /// let y = x.unary(UnaryOp::Powi(3));
    /// assert_eq!(y.value, 8.0);
    /// assert_eq!(y.deriv, 12.0);
    /// ```
    pub fn unary(self, op: UnaryOp<T>) -> Self {
        let (value, weight) = op.eval(self.value);
        Dual {
            value,
            deriv: tangent(self.deriv, weight),
        }
    }

    /// Applies a two-operand catalogue operation:
    /// `deriv = a′·∂a + b′·∂b` with the weights from [`BinaryOp::partials`].
    ///
    /// An operand with a zero derivative contributes nothing, even when its
    /// weight is infinite or NaN.
    ///
    /// # Example
    ///
    /// ```
    /// use adgraph_core::{BinaryOp, Dual};
    ///
    /// // x / 1e-200 at x = 1: the divisor weight overflows but is unused
    /// let y = Dual::variable(1.0_f64).binary(BinaryOp::Div, Dual::constant(1e-200));
    /// assert!((y.deriv / 1e200 - 1.0).abs() < 1e-12);
    /// ```
    pub fn binary(self, op: BinaryOp, rhs: Self) -> Self {
        let (wa, wb) = op.partials(self.value, rhs.value);
        Dual {
            value: op.apply(self.value, rhs.value),
            deriv: tangent(self.deriv, wa) + tangent(rhs.deriv, wb),
        }
    }

    /// `1/f`, with tangent `-a′/a²`.
    ///
    /// ```
    /// use adgraph_core::Dual;
    ///
    /// let f = Dual::variable(-4.0_f64).recip();
    /// assert_eq!((f.value, f.deriv), (-0.25, -0.0625));
    /// ```
    pub fn recip(self) -> Self {
        self.unary(UnaryOp::Recip)
    }

    /// `eᶠ`, with tangent `a′·eᵃ`.
    pub fn exp(self) -> Self {
        self.unary(UnaryOp::Exp)
    }

    /// Natural logarithm, with tangent `a′/a`.
    ///
    /// ```
    /// use adgraph_core::Dual;
    ///
    /// // d/dx ln x at x = 2 is 1/2
    /// let f = Dual::variable(2.0_f64).ln();
    /// assert_eq!(f.deriv, 0.5);
    /// ```
    pub fn ln(self) -> Self {
        self.unary(UnaryOp::Ln)
    }

    /// Base-2 logarithm: `log₂(f) = log₂(a) + (a′/(a·ln 2))·ε`.
    pub fn log2(self) -> Self {
        self.unary(UnaryOp::Log2)
    }

    /// Sine, with tangent `a′·cos a`.
    pub fn sin(self) -> Self {
        self.unary(UnaryOp::Sin)
    }

    /// Cosine, with tangent `-a′·sin a`.
    pub fn cos(self) -> Self {
        self.unary(UnaryOp::Cos)
    }

    /// Tangent: `tan(f) = tan(a) + (a′/cos²a)·ε`.
    pub fn tan(self) -> Self {
        self.unary(UnaryOp::Tan)
    }

    /// Inverse sine, defined on `[-1, 1]`.
    pub fn asin(self) -> Self {
        self.unary(UnaryOp::Asin)
    }

    /// Inverse cosine, defined on `[-1, 1]`.
    pub fn acos(self) -> Self {
        self.unary(UnaryOp::Acos)
    }

    /// Inverse tangent.
    pub fn atan(self) -> Self {
        self.unary(UnaryOp::Atan)
    }

    /// Four-quadrant inverse tangent of `self / x`, with `self` as the
    /// ordinate.
    ///
    /// # Example
    ///
    /// ```
    /// use adgraph_core::Dual;
    ///
    /// // d/dy atan2(y, 3) at y=1 is 3/(3² + 1²) = 0.3
    /// let y = Dual::variable(1.0);
    /// let f = y.atan2(Dual::constant(3.0));
    ///
    /// assert!((f.deriv - 0.3_f64).abs() < 1e-12);
    /// ```
    pub fn atan2(self, x: Self) -> Self {
        self.binary(BinaryOp::Atan2, x)
    }

    /// Square root, with tangent `a′/(2√a)`. Negative inputs give NaN.
    ///
    /// ```
    /// use adgraph_core::Dual;
    ///
    /// let f = Dual::variable(9.0_f64).sqrt();
    /// assert_eq!(f.value, 3.0);
    /// assert_eq!(f.deriv, 1.0 / 6.0);
    /// ```
    pub fn sqrt(self) -> Self {
        self.unary(UnaryOp::Sqrt)
    }

    /// Absolute value. The derivative is `sign(a)·a′`, and zero at `a = 0`.
    pub fn abs(self) -> Self {
        self.unary(UnaryOp::Abs)
    }

    /// `f²`, with derivative `2a·a′`.
    pub fn square(self) -> Self {
        self.unary(UnaryOp::Square)
    }

    /// Raises to a real power `e`. The exponent carries no derivative.
    pub fn powf(self, e: T) -> Self {
        self.unary(UnaryOp::Powf(e))
    }

    /// Raises to an integer power `n`.
    pub fn powi(self, n: i32) -> Self {
        self.unary(UnaryOp::Powi(n))
    }
}

/// Evaluates `f` at `x` and returns `(f(x), f'(x))` in a single forward
/// pass.
///
/// # Example
///
/// ```
/// use adgraph_core::derivative;
///
/// let (fx, dfx) = derivative(|x| x * x * x, 2.0);
/// assert_eq!(fx, 8.0);
/// assert_eq!(dfx, 12.0);
/// ```
pub fn derivative<T, F>(f: F, x: T) -> (T, T)
where
    T: One,
    F: FnOnce(Dual<T>) -> Dual<T>,
{
    let out = f(Dual::variable(x));
    (out.value, out.deriv)
}

/// Computes the value and full gradient of `f` at `point` in forward
/// mode.
///
/// `f` is evaluated once per input, each time with exactly one input
/// seeded as a variable and the others held constant.
///
/// # Example
///
/// ```
/// use adgraph_core::forward_gradient;
///
/// // f(x, y) = x·y + y at (3, 2)
/// let (value, grad) = forward_gradient(|[x, y]| x * y + y, [3.0_f64, 2.0]);
///
/// assert_eq!(value, 8.0);
/// assert_eq!(grad, [2.0, 4.0]);
/// ```
pub fn forward_gradient<T, F, const N: usize>(f: F, point: [T; N]) -> (T, [T; N])
where
    T: Float,
    F: Fn([Dual<T>; N]) -> Dual<T>,
{
    let mut value = None;
    let grad = std::array::from_fn(|i| {
        let seeded = std::array::from_fn(|j| {
            if i == j {
                Dual::variable(point[j])
            } else {
                Dual::constant(point[j])
            }
        });
        let out = f(seeded);
        value.get_or_insert(out.value);
        out.deriv
    });
    let value = value.unwrap_or_else(|| f(point.map(Dual::constant)).value);
    (value, grad)
}

impl<T: Zero> From<T> for Dual<T> {
    fn from(value: T) -> Self {
        Dual::constant(value)
    }
}

impl<T: PartialEq> PartialEq for Dual<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T: PartialOrd> PartialOrd for Dual<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.value.partial_cmp(&other.value)
    }
}

impl<T: fmt::Display> fmt::Display for Dual<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} + {}ε", self.value, self.deriv)
    }
}

// Chain-rule term `d·w`; a zero tangent stays zero.
fn tangent<T: Float>(d: T, w: T) -> T {
    if d.is_zero() {
        T::zero()
    } else {
        d * w
    }
}

macro_rules! dual_ops {
    ($($tr:ident::$method:ident => $op:ident;)*) => {$(
        impl<T: Float> $tr for Dual<T> {
            type Output = Dual<T>;

            fn $method(self, rhs: Self) -> Self::Output {
                self.binary(BinaryOp::$op, rhs)
            }
        }

        // A scalar right-hand side behaves like `Dual::constant(c)`.
        impl<T: Float> $tr<T> for Dual<T> {
            type Output = Dual<T>;

            fn $method(self, c: T) -> Self::Output {
                self.binary(BinaryOp::$op, Dual::constant(c))
            }
        }
    )*};
}

dual_ops! {
    Add::add => Add;
    Sub::sub => Sub;
    Mul::mul => Mul;
    Div::div => Div;
}

impl<T: Float> Neg for Dual<T> {
    type Output = Dual<T>;

    fn neg(self) -> Self::Output {
        self.unary(UnaryOp::Neg)
    }
}

macro_rules! scalar_lhs_ops {
    (@op $t:ty, $tr:ident::$method:ident => $op:ident) => {
        impl $tr<Dual<$t>> for $t {
            type Output = Dual<$t>;

            fn $method(self, rhs: Dual<$t>) -> Self::Output {
                Dual::constant(self).binary(BinaryOp::$op, rhs)
            }
        }
    };
    ($($t:ty),*) => {$(
        scalar_lhs_ops!(@op $t, Add::add => Add);
        scalar_lhs_ops!(@op $t, Sub::sub => Sub);
        scalar_lhs_ops!(@op $t, Mul::mul => Mul);
        scalar_lhs_ops!(@op $t, Div::div => Div);
    )*};
}

scalar_lhs_ops!(f32, f64);

macro_rules! assign_ops {
    ($($tr:ident::$method:ident => $op:tt;)*) => {$(
        impl<T: Float> $tr for Dual<T> {
            fn $method(&mut self, rhs: Self) {
                *self = *self $op rhs;
            }
        }

        impl<T: Float> $tr<T> for Dual<T> {
            fn $method(&mut self, c: T) {
                *self = *self $op c;
            }
        }
    )*};
}

assign_ops! {
    AddAssign::add_assign => +;
    SubAssign::sub_assign => -;
    MulAssign::mul_assign => *;
    DivAssign::div_assign => /;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn seeds() {
        let c = Dual::constant(7.0_f64);
        let x = Dual::variable(7.0_f64);
        assert_eq!((c.value, c.deriv), (7.0, 0.0));
        assert_eq!((x.value, x.deriv), (7.0, 1.0));
    }

    #[test]
    fn from_scalar_is_constant() {
        let c: Dual<f64> = 4.0.into();
        assert_eq!(c.deriv, 0.0);
        let d: Dual<f32> = Dual::default();
        assert_eq!((d.value, d.deriv), (0.0, 0.0));
    }

    #[test]
    fn product_rule() {
        // x·(x - 5) at x = 4: slope 2x - 5 = 3
        let x = Dual::variable(4.0_f64);
        let y = x * (x - 5.0);
        assert_eq!((y.value, y.deriv), (-4.0, 3.0));
    }

    #[test]
    fn quotient_rule() {
        // (x - 1)/(x + 1) at x = 3: slope 2/(x + 1)² = 0.125
        let x = Dual::variable(3.0_f64);
        let y = (x - 1.0) / (x + 1.0);
        assert_eq!(y.value, 0.5);
        assert_relative_eq!(y.deriv, 0.125, epsilon = 1e-12);
    }

    #[test]
    fn tiny_divisor_keeps_finite_derivative() {
        let x = Dual::variable(1.0_f64);
        let b = 1e-200;
        let by_dual = x / Dual::constant(b);
        let by_scalar = x / b;
        assert!(by_dual.deriv.is_finite());
        assert_eq!(by_dual.deriv, by_scalar.deriv);
    }

    #[test]
    fn zero_tangent_ignores_nonfinite_weight() {
        // sqrt(c) for a negative constant: NaN value, but no dependence on x
        let c = Dual::<f64>::constant(-1.0).sqrt();
        assert!(c.value.is_nan());
        assert_eq!(c.deriv, 0.0);
    }

    #[test]
    fn scalar_on_the_left() {
        let x = Dual::variable(2.0_f64);

        let y = 10.0 - x;
        assert_eq!((y.value, y.deriv), (8.0, -1.0));

        // d/dx(1/x) at x=2 is -1/4
        let y = 1.0 / x;
        assert_eq!((y.value, y.deriv), (0.5, -0.25));

        let y = 3.0 * x + 1.0;
        assert_eq!((y.value, y.deriv), (7.0, 3.0));
    }

    #[test]
    fn scalar_on_the_right() {
        let x = Dual::variable(2.0_f32);
        let y = (x - 1.0) * 4.0 / 2.0;
        assert_eq!((y.value, y.deriv), (2.0, 2.0));
    }

    #[test]
    fn compound_assignment() {
        // f(x) = ((x + x) * x - 1) / 2 at x=3: 2x² - 1 over 2, f' = 2x
        let x = Dual::variable(3.0_f64);
        let mut f = x;
        f += x;
        f *= x;
        f -= 1.0;
        f /= 2.0;
        assert_eq!(f.value, 8.5);
        assert_eq!(f.deriv, 6.0);

        let mut g = Dual::variable(4.0_f64);
        g /= Dual::constant(2.0);
        g -= Dual::constant(1.0);
        assert_eq!((g.value, g.deriv), (1.0, 0.5));
    }

    #[test]
    fn comparisons_ignore_derivative() {
        let a = Dual::new(1.0, 5.0);
        let b = Dual::new(1.0, -3.0);
        let c = Dual::new(2.0, 0.0);

        assert_eq!(a, b);
        assert!(a < c);
        assert!(c >= b);
    }

    #[test]
    fn display_shows_both_parts() {
        assert_eq!(Dual::new(3.0, 1.0).to_string(), "3 + 1ε");
    }

    #[test]
    fn nested_chain_rule() {
        // cos(3x) at x = 0: slope -3·sin 0 = 0, value 1
        let f = (3.0 * Dual::variable(0.0_f64)).cos();
        assert_eq!((f.value, f.deriv), (1.0, -0.0));

        // ln(1 + x²) at x = 1: slope 2x/(1 + x²) = 1
        let x = Dual::variable(1.0_f64);
        let g = (1.0 + x.square()).ln();
        assert_relative_eq!(g.value, 2.0_f64.ln(), epsilon = 1e-15);
        assert_relative_eq!(g.deriv, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn zero_exponent_at_origin() {
        let x = Dual::variable(0.0_f64);
        assert_eq!((x.powi(0).value, x.powi(0).deriv), (1.0, 0.0));
        assert_eq!((x + x.powf(0.0)).deriv, 1.0);
    }

    #[test]
    fn powers() {
        let x = Dual::variable(2.0);
        let f = x.powi(3);
        assert_eq!((f.value, f.deriv), (8.0, 12.0));

        // d/dx x^0.5 at x=4 is 0.5 / 2 = 0.25
        let f = Dual::variable(4.0).powf(0.5);
        assert_relative_eq!(f.value, 2.0, epsilon = 1e-12);
        assert_relative_eq!(f.deriv, 0.25, epsilon = 1e-12);
    }

    #[test]
    fn abs_uses_sign() {
        assert_eq!(Dual::variable(-2.0).abs().deriv, -1.0);
        assert_eq!(Dual::variable(2.0).abs().deriv, 1.0);
        assert_eq!(Dual::variable(0.0).abs().deriv, 0.0);
    }

    #[test]
    fn inverse_trig() {
        // d/dx asin(x) at x=0.5 is 1/√0.75
        let x = Dual::variable(0.5_f64);
        assert_relative_eq!(x.asin().deriv, 1.0 / 0.75_f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(x.acos().deriv, -1.0 / 0.75_f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(x.atan().deriv, 0.8, epsilon = 1e-12);
    }

    #[test]
    fn atan2_both_directions() {
        // atan2(y, x) at (y, x) = (1, 3)
        let y = Dual::variable(1.0);
        let x = Dual::constant(3.0);
        assert_relative_eq!(y.atan2(x).deriv, 0.3, epsilon = 1e-12);

        let y = Dual::constant(1.0);
        let x = Dual::variable(3.0);
        assert_relative_eq!(y.atan2(x).deriv, -0.1, epsilon = 1e-12);
    }

    #[test]
    fn domain_errors_become_nan() {
        let f = Dual::variable(-1.0_f64).sqrt();
        assert!(f.value.is_nan());
        assert!(f.deriv.is_nan());
    }

    #[test]
    fn derivative_is_single_pass() {
        let (fx, dfx) = derivative(|x: Dual<f64>| x.ln() * x, 1.0);
        // d/dx(x ln x) = ln x + 1
        assert_eq!(fx, 0.0);
        assert_eq!(dfx, 1.0);
    }

    #[test]
    fn forward_gradient_seeds_one_input_at_a_time() {
        // f(x, y) = exp(x + y/x) at (3, 2)
        let (value, grad) = forward_gradient(|[x, y]| (x + y / x).exp(), [3.0_f64, 2.0]);

        let expected = (3.0_f64 + 2.0 / 3.0).exp();
        assert_relative_eq!(value, expected, epsilon = 1e-12);
        assert_relative_eq!(grad[0], (1.0 - 2.0 / 9.0) * expected, epsilon = 1e-9);
        assert_relative_eq!(grad[1], expected / 3.0, epsilon = 1e-9);
    }

    #[test]
    fn forward_gradient_of_nullary_function() {
        let (value, grad) = forward_gradient(|[]: [Dual<f64>; 0]| Dual::constant(7.0), []);
        assert_eq!(value, 7.0);
        assert!(grad.is_empty());
    }
}
