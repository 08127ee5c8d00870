//! Automatic differentiation for Rust.
//!
//! This crate computes exact first derivatives of scalar functions built
//! from arithmetic and the usual transcendental functions:
//!
//! - **Forward mode**: dual numbers ([`Dual`]) carry a derivative along
//!   with every value
//! - **Reverse mode**: handles ([`Var`]) record an expression graph, and
//!   one [`backward()`] pass yields the derivative with respect to every
//!   parameter in a [`DerivativeMap`]
//!
//! Both modes share one operation catalogue ([`ops`]), so they agree on
//! every formula and on every edge case.
//!
//! # Single-variable differentiation
//!
//! ```
//! use adgraph::Dual;
//!
//! // Define a function
//! fn f(x: Dual<f64>) -> Dual<f64> {
//!     x * x + 2.0 * x
//! }
//!
//! // Compute f and f' at x=3
//! let y = f(Dual::variable(3.0));
//! assert_eq!(y.value, 15.0);   // f(3) = 15
//! assert_eq!(y.deriv, 8.0);    // f'(3) = 8
//! ```
//!
//! # Reverse-mode AD
//!
//! Build an expression from parameters, then run one backward pass:
//!
//! ```
//! use adgraph::Var;
//!
//! let x = Var::parameter(3.0_f64);
//! let y = Var::parameter(2.0_f64);
//! let f = (&x + &y / &x).exp();
//!
//! let grads = f.backward();
//! assert!((f.value() - 39.1213).abs() < 1e-4);
//! assert!((grads.get(&x)? - 30.4277).abs() < 1e-4);  // (1 - y/x²)·f
//! assert!((grads.get(&y)? - 13.0404).abs() < 1e-4);  // f/x
//! # Ok::<(), adgraph::AdError>(())
//! ```
//!
//! Use [`reverse_diff`] and [`reverse_gradient`] to evaluate a closure
//! at a point:
//!
//! ```
//! use adgraph::{reverse_gradient, Var};
//!
//! // f(x, y) = x² + x*y
//! let f = |[x, y]: [Var<f64>; 2]| x.square() + &x * &y;
//!
//! let (val, grad) = reverse_gradient(f, [3.0, 4.0]);
//! assert_eq!(val, 21.0);       // f(3, 4) = 21
//! assert_eq!(grad[0], 10.0);   // ∂f/∂x = 2x + y = 10
//! assert_eq!(grad[1], 3.0);    // ∂f/∂y = x = 3
//! ```
//!
//! # Lookups
//!
//! A [`DerivativeMap`] has an entry for every parameter the output
//! depends on. Asking for anything else (an unrelated parameter, a
//! constant, an intermediate result) is an [`AdError::NotFound`];
//! [`DerivativeMap::get_or_zero`] treats those as zero instead. The
//! [`gradient()`] and [`jacobian`] helpers use the zero policy.
//!
//! # Threading
//!
//! Graph nodes are shared through `Rc`, so a graph stays on the thread
//! that built it. A [`DerivativeMap`] holds only ids and values and can
//! be sent elsewhere.

mod backward;
mod derivative_map;
mod error;
pub mod gradcheck;
mod gradient;
mod node;
mod var;

pub use adgraph_core::{derivative, forward_gradient, ops, BinaryOp, Dual, UnaryOp};
pub use backward::{backward, backward_into};
pub use derivative_map::DerivativeMap;
pub use error::{AdError, Result};
pub use gradient::{gradient, jacobian, reverse_diff, reverse_gradient};
pub use node::{NodeId, NodeKind};
pub use var::Var;
