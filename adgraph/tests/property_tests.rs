//! Property-based tests for reverse-mode gradients
//!
//! Uses proptest to check the backward pass against forward mode and
//! finite differences across random inputs

use adgraph::gradcheck::{check_gradient, GradCheckConfig};
use adgraph::{forward_gradient, reverse_gradient, Dual, Var};
use proptest::prelude::*;

fn smooth_reverse([x, y]: [Var<f64>; 2]) -> Var<f64> {
    (&x * &y).sin() + x.square() / (1.0 + y.square()) - (&x - &y).atan()
}

fn smooth_forward([x, y]: [Dual<f64>; 2]) -> Dual<f64> {
    (x * y).sin() + x.square() / (1.0 + y.square()) - (x - y).atan()
}

proptest! {
    /// Reverse and forward mode produce the same gradient
    #[test]
    fn modes_agree(x in -3.0..3.0_f64, y in -3.0..3.0_f64) {
        let (rv, rg) = reverse_gradient(smooth_reverse, [x, y]);
        let (fv, fg) = forward_gradient(smooth_forward, [x, y]);

        prop_assert!((rv - fv).abs() < 1e-12);
        for i in 0..2 {
            prop_assert!((rg[i] - fg[i]).abs() < 1e-9,
                "component {} differs: reverse {}, forward {}", i, rg[i], fg[i]);
        }
    }

    /// Reverse mode matches central differences
    #[test]
    fn gradient_matches_finite_differences(x in -3.0..3.0_f64, y in -3.0..3.0_f64) {
        let config = GradCheckConfig::default().with_rtol(1e-4).with_atol(1e-6);
        let report = check_gradient(smooth_reverse, [x, y], &config).unwrap();
        prop_assert!(report.passed(), "{:?}", report);
    }

    /// Linearity: ∇(a·f + b·g) = a·∇f + b·∇g
    #[test]
    fn gradient_is_linear(a in -5.0..5.0_f64, b in -5.0..5.0_f64, x in 0.1..2.0_f64) {
        let f = |v: &Var<f64>| v.exp();
        let g = |v: &Var<f64>| v.ln();

        let (_, [combined]) = reverse_gradient(|[v]| a * f(&v) + b * g(&v), [x]);
        let (_, [df]) = reverse_gradient(|[v]| f(&v), [x]);
        let (_, [dg]) = reverse_gradient(|[v]| g(&v), [x]);

        prop_assert!((combined - (a * df + b * dg)).abs() < 1e-9 * (1.0 + combined.abs()));
    }

    /// A parameter used k times in a sum gets derivative k
    #[test]
    fn repeated_use_accumulates(k in 1usize..50, x in -10.0..10.0_f64) {
        let p = Var::parameter(x);
        let mut f = Var::constant(0.0);
        for _ in 0..k {
            f += &p;
        }
        prop_assert_eq!(f.backward().get(&p), Ok(k as f64));
    }

    /// Replacing a parameter by an equal constant removes it from the map
    #[test]
    fn constants_never_appear(x in 0.5..4.0_f64, y in 0.5..4.0_f64) {
        let p = Var::parameter(x);
        let c = Var::constant(y);
        let f = (&p * &c).sqrt() + c.powf(1.5);
        let grads = f.backward();

        prop_assert!(grads.contains(&p));
        prop_assert!(!grads.contains(&c));
        prop_assert_eq!(grads.len(), 1);
    }
}
