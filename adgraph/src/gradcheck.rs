//! Gradient checking against finite differences.
//!
//! Compares the reverse-mode gradient of a function with a central
//! difference approximation `f'(x) ≈ [f(x+h) - f(x-h)] / (2h)`, one
//! input at a time. Useful when adding a new operation to the
//! catalogue, or when debugging an expression that produces surprising
//! derivatives.
//!
//! # Example
//!
//! ```
//! use adgraph::gradcheck::{check_gradient, GradCheckConfig};
//!
//! let config = GradCheckConfig::default();
//! let report = check_gradient(|[x, y]| (&x * &y).sin() + x.exp(), [0.3, 1.2], &config)?;
//!
//! assert!(report.passed());
//! assert!(report.max_abs_error < 1e-6);
//! # Ok::<(), adgraph::AdError>(())
//! ```

use crate::error::{AdError, Result};
use crate::gradient::reverse_gradient;
use crate::var::Var;
use num_traits::Float;

/// Gradient checking configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradCheckConfig {
    /// Step size `h` for central differences (default: 1e-6)
    pub step: f64,

    /// Relative tolerance for gradient comparison (default: 1e-5)
    pub rtol: f64,

    /// Absolute tolerance for gradient comparison (default: 1e-8)
    pub atol: f64,
}

impl Default for GradCheckConfig {
    fn default() -> Self {
        Self {
            step: 1e-6,
            rtol: 1e-5,
            atol: 1e-8,
        }
    }
}

impl GradCheckConfig {
    /// Set the finite-difference step.
    pub fn with_step(mut self, step: f64) -> Self {
        self.step = step;
        self
    }

    /// Set the relative tolerance.
    pub fn with_rtol(mut self, rtol: f64) -> Self {
        self.rtol = rtol;
        self
    }

    /// Set the absolute tolerance.
    pub fn with_atol(mut self, atol: f64) -> Self {
        self.atol = atol;
        self
    }

    /// Validate the configuration.
    ///
    /// The step must be positive and finite; both tolerances must be
    /// finite and non-negative.
    pub fn validate(&self) -> Result<()> {
        if !(self.step > 0.0 && self.step.is_finite()) {
            return Err(AdError::InvalidConfig(format!(
                "step must be positive and finite, got {}",
                self.step
            )));
        }
        if !(self.rtol >= 0.0 && self.rtol.is_finite()) {
            return Err(AdError::InvalidConfig(format!(
                "rtol must be non-negative, got {}",
                self.rtol
            )));
        }
        if !(self.atol >= 0.0 && self.atol.is_finite()) {
            return Err(AdError::InvalidConfig(format!(
                "atol must be non-negative, got {}",
                self.atol
            )));
        }
        Ok(())
    }

    /// Whether `analytic` is close enough to `numeric`:
    /// `|analytic - numeric| <= atol + rtol * |numeric|`.
    fn accepts<T: Float>(&self, analytic: T, numeric: T) -> bool {
        let (Some(atol), Some(rtol)) = (T::from(self.atol), T::from(self.rtol)) else {
            return false;
        };
        (analytic - numeric).abs() <= atol + rtol * numeric.abs()
    }
}

/// Comparison of one gradient component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradCheckEntry<T> {
    /// Reverse-mode derivative.
    pub analytic: T,
    /// Central-difference estimate.
    pub numeric: T,
    /// `|analytic - numeric|`
    pub abs_error: T,
    /// `abs_error` relative to the larger magnitude of the two, or zero
    /// when both are zero.
    pub rel_error: T,
    /// Whether this component is within tolerance.
    pub passed: bool,
}

/// Result of gradient checking
#[derive(Debug, Clone, PartialEq)]
pub struct GradCheckReport<T> {
    /// `f` evaluated at the checked point.
    pub value: T,
    /// One entry per input, in input order.
    pub entries: Vec<GradCheckEntry<T>>,
    /// Maximum absolute difference between analytic and numeric
    /// derivatives.
    pub max_abs_error: T,
    /// Maximum relative difference.
    pub max_rel_error: T,
}

impl<T> GradCheckReport<T> {
    /// Whether every component is within tolerance.
    pub fn passed(&self) -> bool {
        self.entries.iter().all(|e| e.passed)
    }

    /// Number of components outside tolerance.
    pub fn num_failures(&self) -> usize {
        self.entries.iter().filter(|e| !e.passed).count()
    }
}

/// Checks the reverse-mode gradient of `f` at `point` against central
/// differences.
///
/// `f` is called once with parameter leaves for the analytic gradient,
/// then twice per input with constant leaves for the numeric estimate.
/// An invalid `config` is reported before `f` is called at all.
pub fn check_gradient<T, F, const N: usize>(
    f: F,
    point: [T; N],
    config: &GradCheckConfig,
) -> Result<GradCheckReport<T>>
where
    T: Float + std::fmt::Display,
    F: Fn([Var<T>; N]) -> Var<T>,
{
    config.validate()?;
    let h = T::from(config.step).ok_or_else(|| {
        AdError::InvalidConfig(format!("step {} is not representable", config.step))
    })?;

    let (value, grad) = reverse_gradient(&f, point);
    let eval = |p: [T; N]| f(p.map(Var::constant)).value();

    let mut entries = Vec::with_capacity(N);
    let mut max_abs_error = T::zero();
    let mut max_rel_error = T::zero();

    for (i, &analytic) in grad.iter().enumerate() {
        let mut plus = point;
        let mut minus = point;
        plus[i] = plus[i] + h;
        minus[i] = minus[i] - h;
        let numeric = (eval(plus) - eval(minus)) / (h + h);

        let abs_error = (analytic - numeric).abs();
        let scale = analytic.abs().max(numeric.abs());
        let rel_error = if scale > T::zero() {
            abs_error / scale
        } else {
            T::zero()
        };
        let passed = config.accepts(analytic, numeric);

        if passed {
            tracing::debug!(input = i, %analytic, %numeric, "gradient component agrees");
        } else {
            tracing::warn!(
                input = i,
                %analytic,
                %numeric,
                %abs_error,
                "gradient component outside tolerance"
            );
        }

        max_abs_error = max_abs_error.max(abs_error);
        max_rel_error = max_rel_error.max(rel_error);
        entries.push(GradCheckEntry {
            analytic,
            numeric,
            abs_error,
            rel_error,
            passed,
        });
    }

    Ok(GradCheckReport {
        value,
        entries,
        max_abs_error,
        max_rel_error,
    })
}
