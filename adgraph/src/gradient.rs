//! Convenience entry points over [`backward`](crate::backward()).

use crate::derivative_map::DerivativeMap;
use crate::error::{AdError, Result};
use crate::var::Var;
use num_traits::Float;

/// Computes the value and derivative of a function using reverse-mode
/// AD.
///
/// The function `f` is evaluated at `x`, and both the value and
/// derivative are returned.
///
/// # Examples
///
/// ```
/// use adgraph::reverse_diff;
///
/// // f(x) = x² at x = 3
/// let (val, deriv) = reverse_diff(|x| &x * &x, 3.0);
/// assert_eq!(val, 9.0);    // f(3) = 9
/// assert_eq!(deriv, 6.0);  // f'(3) = 2x = 6
/// ```
///
/// Reuse the same function at different points:
///
/// ```
/// use adgraph::{reverse_diff, Var};
///
/// let f = |x: Var<f64>| &x * &x - x;
///
/// let (v1, d1) = reverse_diff(f, 2.0);
/// let (v2, d2) = reverse_diff(f, 5.0);
///
/// assert_eq!((v1, d1), (2.0, 3.0));   // f(2) = 2, f'(2) = 3
/// assert_eq!((v2, d2), (20.0, 9.0));  // f(5) = 20, f'(5) = 9
/// ```
pub fn reverse_diff<T, F>(f: F, x: T) -> (T, T)
where
    T: Float,
    F: FnOnce(Var<T>) -> Var<T>,
{
    let var = Var::parameter(x);
    let result = f(var.clone());
    let grads = result.backward();
    (result.value(), grads.get_or_zero(&var))
}

/// Computes the value and gradient of a multivariable function using
/// reverse-mode AD, with a single backward pass.
///
/// # Examples
///
/// ```
/// use adgraph::{reverse_gradient, Var};
///
/// // f(x, y) = x² + x*y at (3, 4)
/// let f = |[x, y]: [Var<f64>; 2]| &x * &x + &x * &y;
///
/// let (val, grad) = reverse_gradient(f, [3.0, 4.0]);
/// assert_eq!(val, 21.0);       // f(3, 4) = 9 + 12 = 21
/// assert_eq!(grad[0], 10.0);   // ∂f/∂x = 2x + y = 10
/// assert_eq!(grad[1], 3.0);    // ∂f/∂y = x = 3
/// ```
pub fn reverse_gradient<T, F, const N: usize>(f: F, point: [T; N]) -> (T, [T; N])
where
    T: Float,
    F: FnOnce([Var<T>; N]) -> Var<T>,
{
    let vars: [Var<T>; N] = point.map(Var::parameter);
    let result = f(vars.clone());
    let grads = result.backward();
    (
        result.value(),
        std::array::from_fn(|i| grads.get_or_zero(&vars[i])),
    )
}

/// Writes `∂f/∂p` for each `p` in `params` into `out`, using one
/// backward pass.
///
/// Parameters that `f` does not depend on get zero.
///
/// # Example
///
/// ```
/// use adgraph::{gradient, Var};
///
/// let x = Var::parameter(3.0_f64);
/// let y = Var::parameter(2.0_f64);
/// let unused = Var::parameter(9.0_f64);
/// let f = &x * &y;
///
/// let mut out = [0.0; 3];
/// gradient(&[x, y, unused], &f, &mut out)?;
/// assert_eq!(out, [2.0, 3.0, 0.0]);
/// # Ok::<(), adgraph::AdError>(())
/// ```
pub fn gradient<T: Float>(params: &[Var<T>], f: &Var<T>, out: &mut [T]) -> Result<()> {
    check_len(params.len(), out.len())?;
    let grads = f.backward();
    for (slot, p) in out.iter_mut().zip(params) {
        *slot = grads.get_or_zero(p);
    }
    Ok(())
}

/// Writes the Jacobian of `outputs` with respect to `params` into `out`,
/// row-major: row `i` holds the gradient of `outputs[i]`.
///
/// Runs one backward pass per output, reusing a single map.
///
/// # Example
///
/// ```
/// use adgraph::{jacobian, Var};
///
/// let x = Var::parameter(2.0_f64);
/// let y = Var::parameter(5.0_f64);
/// let outputs = [&x * &y, &x + &y, x.square()];
///
/// let mut out = [0.0; 6];
/// jacobian(&[x, y], &outputs, &mut out)?;
/// assert_eq!(out, [5.0, 2.0, 1.0, 1.0, 4.0, 0.0]);
/// # Ok::<(), adgraph::AdError>(())
/// ```
pub fn jacobian<T: Float>(params: &[Var<T>], outputs: &[Var<T>], out: &mut [T]) -> Result<()> {
    check_len(outputs.len() * params.len(), out.len())?;
    if params.is_empty() {
        return Ok(());
    }

    let mut grads = DerivativeMap::new();
    for (row, f) in out.chunks_mut(params.len()).zip(outputs) {
        f.backward_into(&mut grads);
        for (slot, p) in row.iter_mut().zip(params) {
            *slot = grads.get_or_zero(p);
        }
    }
    Ok(())
}

fn check_len(expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(AdError::DimensionMismatch { expected, actual })
    }
}
