//! The catalogue of differentiable scalar operations.
//!
//! Every operation supported by the crate is listed here once, with
//! two formulas:
//!
//! - `apply`: the value of the operation at its operand(s)
//! - `partial` / `partials`: the **local weight**, i.e. the partial
//!   derivative of the result with respect to each operand, evaluated
//!   at the operand value(s)
//!
//! Forward mode ([`Dual`](crate::Dual)) multiplies incoming tangents
//! by these weights; reverse mode (`adgraph::Var`) stores them on
//! graph nodes and multiplies outgoing adjoints by them. Both modes
//! therefore share the same formulas and the same edge-case policy.
//!
//! | op        | value          | local weight(s)                   |
//! |-----------|----------------|-----------------------------------|
//! | `neg`     | `-x`           | `-1`                              |
//! | `sin`     | `sin x`        | `cos x`                           |
//! | `cos`     | `cos x`        | `-sin x`                          |
//! | `tan`     | `tan x`        | `1/cos²x`                         |
//! | `asin`    | `asin x`       | `1/√(1-x²)`                       |
//! | `acos`    | `acos x`       | `-1/√(1-x²)`                      |
//! | `atan`    | `atan x`       | `1/(1+x²)`                        |
//! | `exp`     | `eˣ`           | `eˣ`                              |
//! | `ln`      | `ln x`         | `1/x`                             |
//! | `log2`    | `log₂ x`       | `1/(x·ln 2)`                      |
//! | `sqrt`    | `√x`           | `1/(2√x)`                         |
//! | `abs`     | `\|x\|`        | `sign x` (`0` at `x = 0`)         |
//! | `square`  | `x²`           | `2x`                              |
//! | `recip`   | `1/x`          | `-1/x²`                           |
//! | `powf(e)` | `xᵉ`           | `e·xᵉ⁻¹` (`0` when `e = 0`)       |
//! | `powi(n)` | `xⁿ`           | `n·xⁿ⁻¹` (`0` when `n = 0`)       |
//! | `add`     | `a + b`        | `(1, 1)`                          |
//! | `sub`     | `a - b`        | `(1, -1)`                         |
//! | `mul`     | `a·b`          | `(b, a)`                          |
//! | `div`     | `a/b`          | `(1/b, -(a/b)/b)`                 |
//! | `atan2`   | `atan2(y, x)`  | `(x/(x²+y²), -y/(x²+y²))`         |
//!
//! Domain violations (`sqrt` of a negative, `ln` of zero, `asin`
//! outside `[-1, 1]`, ...) are not intercepted: values and weights
//! become NaN or infinite exactly as the underlying float type
//! dictates.

use num_traits::Float;
use std::fmt;

/// A single-operand operation.
///
/// The exponent of [`UnaryOp::Powf`] is a plain scalar, not a
/// differentiable quantity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnaryOp<T> {
    /// `-x`
    Neg,
    /// `sin x`
    Sin,
    /// `cos x`
    Cos,
    /// `tan x`
    Tan,
    /// `asin x`
    Asin,
    /// `acos x`
    Acos,
    /// `atan x`
    Atan,
    /// `eˣ`
    Exp,
    /// Natural logarithm.
    Ln,
    /// Base-2 logarithm.
    Log2,
    /// `√x`
    Sqrt,
    /// `|x|`
    Abs,
    /// `x²`
    Square,
    /// `1/x`
    Recip,
    /// `xᵉ` for a real exponent `e`.
    Powf(T),
    /// `xⁿ` for an integer exponent `n`.
    Powi(i32),
}

impl<T: Float> UnaryOp<T> {
    /// The value of the operation at `x`.
    ///
    /// # Example
    ///
    /// ```
    /// use adgraph_core::UnaryOp;
    ///
    /// assert_eq!(UnaryOp::Square.apply(3.0), 9.0);
    /// assert_eq!(UnaryOp::Powi(3).apply(2.0), 8.0);
    /// ```
    pub fn apply(self, x: T) -> T {
        match self {
            UnaryOp::Neg => -x,
            UnaryOp::Sin => x.sin(),
            UnaryOp::Cos => x.cos(),
            UnaryOp::Tan => x.tan(),
            UnaryOp::Asin => x.asin(),
            UnaryOp::Acos => x.acos(),
            UnaryOp::Atan => x.atan(),
            UnaryOp::Exp => x.exp(),
            UnaryOp::Ln => x.ln(),
            UnaryOp::Log2 => x.log2(),
            UnaryOp::Sqrt => x.sqrt(),
            UnaryOp::Abs => x.abs(),
            UnaryOp::Square => x * x,
            UnaryOp::Recip => x.recip(),
            UnaryOp::Powf(e) => x.powf(e),
            UnaryOp::Powi(n) => x.powi(n),
        }
    }

    /// The local weight `d(op x)/dx` evaluated at `x`.
    ///
    /// # Example
    ///
    /// ```
    /// use adgraph_core::UnaryOp;
    ///
    /// assert_eq!(UnaryOp::Square.partial(3.0), 6.0);
    /// assert_eq!(UnaryOp::Abs.partial(-2.0), -1.0);
    /// assert_eq!(UnaryOp::Abs.partial(0.0), 0.0);
    /// ```
    pub fn partial(self, x: T) -> T {
        let one = T::one();
        let two = one + one;
        match self {
            UnaryOp::Neg => -one,
            UnaryOp::Sin => x.cos(),
            UnaryOp::Cos => -x.sin(),
            UnaryOp::Tan => {
                let c = x.cos();
                (c * c).recip()
            }
            UnaryOp::Asin => (one - x * x).sqrt().recip(),
            UnaryOp::Acos => -(one - x * x).sqrt().recip(),
            UnaryOp::Atan => (one + x * x).recip(),
            UnaryOp::Exp => x.exp(),
            UnaryOp::Ln => x.recip(),
            UnaryOp::Log2 => (x * two.ln()).recip(),
            UnaryOp::Sqrt => (two * x.sqrt()).recip(),
            UnaryOp::Abs => {
                if x.is_zero() {
                    T::zero()
                } else {
                    x.signum()
                }
            }
            UnaryOp::Square => two * x,
            UnaryOp::Recip => -(x * x).recip(),
            // d/dx x⁰ is 0 everywhere, including at x = 0
            UnaryOp::Powf(e) if e.is_zero() => T::zero(),
            UnaryOp::Powi(0) => T::zero(),
            UnaryOp::Powf(e) => e * x.powf(e - one),
            UnaryOp::Powi(n) => match n.checked_sub(1) {
                Some(m) => cast::<T>(n) * x.powi(m),
                None => cast::<T>(n) * x.powf(cast::<T>(n) - one),
            },
        }
    }

    /// Value and local weight together.
    pub fn eval(self, x: T) -> (T, T) {
        (self.apply(x), self.partial(x))
    }
}

impl<T> UnaryOp<T> {
    /// Short lowercase name of the operation.
    pub fn name(&self) -> &'static str {
        match self {
            UnaryOp::Neg => "neg",
            UnaryOp::Sin => "sin",
            UnaryOp::Cos => "cos",
            UnaryOp::Tan => "tan",
            UnaryOp::Asin => "asin",
            UnaryOp::Acos => "acos",
            UnaryOp::Atan => "atan",
            UnaryOp::Exp => "exp",
            UnaryOp::Ln => "ln",
            UnaryOp::Log2 => "log2",
            UnaryOp::Sqrt => "sqrt",
            UnaryOp::Abs => "abs",
            UnaryOp::Square => "square",
            UnaryOp::Recip => "recip",
            UnaryOp::Powf(_) => "powf",
            UnaryOp::Powi(_) => "powi",
        }
    }
}

impl<T: fmt::Display> fmt::Display for UnaryOp<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Powf(e) => write!(f, "powf({e})"),
            UnaryOp::Powi(n) => write!(f, "powi({n})"),
            op => f.write_str(op.name()),
        }
    }
}

/// A two-operand operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// `a + b`
    Add,
    /// `a - b`
    Sub,
    /// `a · b`
    Mul,
    /// `a / b`
    Div,
    /// `atan2(a, b)`: the angle of the point `(b, a)`, i.e. `a` is the
    /// ordinate `y` and `b` the abscissa `x`.
    Atan2,
}

impl BinaryOp {
    /// The value of the operation at `(a, b)`.
    pub fn apply<T: Float>(self, a: T, b: T) -> T {
        match self {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => a / b,
            BinaryOp::Atan2 => a.atan2(b),
        }
    }

    /// The local weights `(∂/∂a, ∂/∂b)` evaluated at `(a, b)`.
    ///
    /// # Example
    ///
    /// ```
    /// use adgraph_core::BinaryOp;
    ///
    /// assert_eq!(BinaryOp::Mul.partials(3.0, 4.0), (4.0, 3.0));
    /// assert_eq!(BinaryOp::Div.partials(6.0, 2.0), (0.5, -1.5));
    /// ```
    pub fn partials<T: Float>(self, a: T, b: T) -> (T, T) {
        let one = T::one();
        match self {
            BinaryOp::Add => (one, one),
            BinaryOp::Sub => (one, -one),
            BinaryOp::Mul => (b, a),
            BinaryOp::Div => (b.recip(), -(a / b) / b),
            BinaryOp::Atan2 => {
                let denom = a * a + b * b;
                (b / denom, -a / denom)
            }
        }
    }

    /// Short lowercase name of the operation.
    pub fn name(&self) -> &'static str {
        match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
            BinaryOp::Div => "div",
            BinaryOp::Atan2 => "atan2",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// i32 -> float is total for every `Float` the crate targets.
fn cast<T: Float>(n: i32) -> T {
    T::from(n).unwrap_or_else(T::nan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn central_difference(f: impl Fn(f64) -> f64, x: f64) -> f64 {
        let h = 1e-6;
        (f(x + h) - f(x - h)) / (2.0 * h)
    }

    #[test]
    fn unary_partials_match_finite_differences() {
        let cases: [(UnaryOp<f64>, f64); 16] = [
            (UnaryOp::Neg, 1.3),
            (UnaryOp::Sin, 0.7),
            (UnaryOp::Cos, 0.7),
            (UnaryOp::Tan, 0.4),
            (UnaryOp::Asin, 0.5),
            (UnaryOp::Acos, 0.5),
            (UnaryOp::Atan, 3.0),
            (UnaryOp::Exp, 1.2),
            (UnaryOp::Ln, 3.0),
            (UnaryOp::Log2, 3.0),
            (UnaryOp::Sqrt, 3.0),
            (UnaryOp::Abs, -2.0),
            (UnaryOp::Square, -2.0),
            (UnaryOp::Recip, 2.0),
            (UnaryOp::Powf(2.3), 3.0),
            (UnaryOp::Powi(3), 1.5),
        ];
        for (op, x) in cases {
            let numeric = central_difference(|v| op.apply(v), x);
            assert_relative_eq!(op.partial(x), numeric, epsilon = 1e-6, max_relative = 1e-6);
        }
    }

    #[test]
    fn binary_partials_match_finite_differences() {
        let ops = [
            BinaryOp::Add,
            BinaryOp::Sub,
            BinaryOp::Mul,
            BinaryOp::Div,
            BinaryOp::Atan2,
        ];
        let (a, b) = (1.0, 3.0);
        for op in ops {
            let (da, db) = op.partials(a, b);
            assert_relative_eq!(
                da,
                central_difference(|v| op.apply(v, b), a),
                epsilon = 1e-6
            );
            assert_relative_eq!(
                db,
                central_difference(|v| op.apply(a, v), b),
                epsilon = 1e-6
            );
        }
    }

    #[test]
    fn atan2_orders_ordinate_first() {
        // atan2(y = 1, x = 3)
        let (dy, dx) = BinaryOp::Atan2.partials(1.0_f64, 3.0);
        assert_relative_eq!(BinaryOp::Atan2.apply(1.0_f64, 3.0), 0.32175055439664, epsilon = 1e-12);
        assert_relative_eq!(dy, 0.3, epsilon = 1e-12);
        assert_relative_eq!(dx, -0.1, epsilon = 1e-12);
    }

    #[test]
    fn abs_weight_is_sign_with_zero_at_origin() {
        assert_eq!(UnaryOp::Abs.partial(4.0_f64), 1.0);
        assert_eq!(UnaryOp::Abs.partial(-4.0_f64), -1.0);
        assert_eq!(UnaryOp::Abs.partial(0.0_f64), 0.0);
        assert_eq!(UnaryOp::Abs.partial(-0.0_f64), 0.0);
    }

    #[test]
    fn domain_violations_propagate_nan() {
        assert!(UnaryOp::Sqrt.apply(-1.0_f64).is_nan());
        assert!(UnaryOp::Asin.partial(2.0_f64).is_nan());
        assert!(UnaryOp::Ln.apply(-1.0_f64).is_nan());
        assert_eq!(UnaryOp::Ln.apply(0.0_f64), f64::NEG_INFINITY);
        assert_eq!(UnaryOp::Ln.partial(0.0_f64), f64::INFINITY);
    }

    #[test]
    fn zero_exponent_has_zero_weight() {
        assert_eq!(UnaryOp::Powi(0).apply(5.0_f64), 1.0);
        assert_eq!(UnaryOp::Powi(0).partial(5.0_f64), 0.0);
        // x⁰ is constant, so the weight stays finite at the origin
        assert_eq!(UnaryOp::Powi(0).partial(0.0_f64), 0.0);
        assert_eq!(UnaryOp::Powf(0.0).partial(0.0_f64), 0.0);
        assert_eq!(UnaryOp::Powf(0.0).partial(-3.0_f64), 0.0);
    }

    #[test]
    fn powi_weight_at_most_negative_exponent() {
        // n·xⁿ⁻¹ with n - 1 odd: (-1)^(i32::MIN - 1) = -1
        assert_eq!(UnaryOp::Powi(i32::MIN).partial(-1.0_f64), 2147483648.0);
    }

    #[test]
    fn div_weight_survives_tiny_divisor() {
        let (da, db) = BinaryOp::Div.partials(1e-300_f64, 1e-200);
        assert_relative_eq!(da, 1e200, max_relative = 1e-12);
        // b² alone would underflow to zero
        assert_relative_eq!(db, -1e100, max_relative = 1e-12);
    }

    #[test]
    fn display_names() {
        assert_eq!(UnaryOp::<f64>::Sin.to_string(), "sin");
        assert_eq!(UnaryOp::Powf(2.5_f64).to_string(), "powf(2.5)");
        assert_eq!(UnaryOp::<f64>::Powi(-2).to_string(), "powi(-2)");
        assert_eq!(BinaryOp::Atan2.to_string(), "atan2");
    }

    #[test]
    fn works_for_f32() {
        let (v, w) = UnaryOp::Exp.eval(0.0_f32);
        assert_eq!(v, 1.0);
        assert_eq!(w, 1.0);
        assert_relative_eq!(UnaryOp::Log2.partial(2.0_f32), 1.0 / (2.0 * 2.0_f32.ln()));
    }
}
