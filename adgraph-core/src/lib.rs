#![deny(missing_docs)]
//! # adgraph-core — scalar operations and forward-mode AD
//!
//! This crate holds the pieces of automatic differentiation that need
//! no graph and no shared state:
//!
//! - [`ops`]: the catalogue of differentiable scalar operations
//!   ([`UnaryOp`], [`BinaryOp`]), each with its value formula and its
//!   local derivative ("weight")
//! - [`Dual`]: the forward-mode number, a value paired with its
//!   derivative
//!
//! The reverse-mode engine lives in the `adgraph` crate, which builds
//! on the same catalogue so both modes agree on every formula.
//!
//! ## Quick start
//!
//! ```rust
//! use adgraph_core::{derivative, Dual};
//!
//! // f(x) = sin(x) · x² at x = 0 has f'(0) = 0
//! let (fx, dfx) = derivative(|x: Dual<f64>| x.sin() * x.square(), 0.0);
//! assert_eq!(fx, 0.0);
//! assert_eq!(dfx, 0.0);
//!
//! // f(x) = ln(x) + √x at x = 4
//! let (_, dfx) = derivative(|x: Dual<f64>| x.ln() + x.sqrt(), 4.0);
//! assert_eq!(dfx, 0.5);  // 1/4 + 1/(2·2)
//! ```
//!
//! Gradients of functions of several inputs take one forward pass per
//! input:
//!
//! ```rust
//! use adgraph_core::forward_gradient;
//!
//! // f(x, y) = x² + 2xy + y² at (3, 4)
//! let (value, grad) =
//!     forward_gradient(|[x, y]| x * x + 2.0 * x * y + y * y, [3.0_f64, 4.0]);
//! assert_eq!(value, 49.0);
//! assert_eq!(grad, [14.0, 14.0]);
//! ```

pub mod dual;
pub mod ops;

pub use dual::{derivative, forward_gradient, Dual};
pub use ops::{BinaryOp, UnaryOp};
