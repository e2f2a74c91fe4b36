// ─────────────────────────────────────────────────────────────────────
// LENR Nano-SAV — Property-Based Tests (proptest) for lenr-math
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Property-based tests for lenr-math using proptest.
//!
//! Covers: LU determinant, traceless projection, Newton root finding,
//! Dormand-Prince accuracy and output-grid contract.

use lenr_math::linalg::{det, diag_matrix, trace, traceless};
use lenr_math::ode::{integrate_dopri5, AdaptiveConfig, OdeSystem};
use lenr_math::roots::{newton, NewtonConfig};
use ndarray::Array1;
use proptest::prelude::*;

struct Harmonic {
    omega: f64,
}

impl OdeSystem<2> for Harmonic {
    fn derivatives(&self, _t: f64, y: &[f64; 2], dydt: &mut [f64; 2]) {
        dydt[0] = y[1];
        dydt[1] = -self.omega * self.omega * y[0];
    }
}

/// y' = -λ y.
struct Decay {
    lambda: f64,
}

impl OdeSystem<1> for Decay {
    fn derivatives(&self, _t: f64, y: &[f64; 1], dydt: &mut [f64; 1]) {
        dydt[0] = -self.lambda * y[0];
    }
}

// ── Linear Algebra Properties ────────────────────────────────────────

proptest! {
    /// det of a diagonal matrix is the product of its diagonal.
    #[test]
    fn det_diagonal_product(values in prop::collection::vec(-3.0f64..3.0, 1..16)) {
        let m = diag_matrix(&values);
        let expected: f64 = values.iter().product();
        let d = det(&m).unwrap();
        prop_assert!((d - expected).abs() <= 1e-12 * expected.abs().max(1e-300),
            "det={}, product={}", d, expected);
    }

    /// The traceless projection has zero trace and keeps off-diagonals.
    #[test]
    fn traceless_has_zero_trace(values in prop::collection::vec(-10.0f64..10.0, 1..20)) {
        let m = diag_matrix(&values);
        let tl = traceless(&m).unwrap();
        let scale: f64 = values.iter().map(|v| v.abs()).sum::<f64>().max(1.0);
        prop_assert!(trace(&tl).unwrap().abs() < 1e-12 * scale);
        let n = values.len();
        for i in 0..n {
            for j in 0..n {
                if i != j {
                    prop_assert_eq!(tl[[i, j]], 0.0);
                }
            }
        }
    }

    /// Scaling a row scales the determinant.
    #[test]
    fn det_row_scaling(a in -5.0f64..5.0, b in -5.0f64..5.0, c in -5.0f64..5.0,
                       d in -5.0f64..5.0, s in -4.0f64..4.0) {
        let m = ndarray::array![[a, b], [c, d]];
        let scaled = ndarray::array![[s * a, s * b], [c, d]];
        let lhs = det(&scaled).unwrap();
        let rhs = s * det(&m).unwrap();
        prop_assert!((lhs - rhs).abs() < 1e-10 * (1.0 + rhs.abs()), "{} vs {}", lhs, rhs);
    }
}

// ── Root Finding Properties ──────────────────────────────────────────

proptest! {
    /// Newton finds the positive square root of any c > 0.
    #[test]
    fn newton_square_root(c in 0.01f64..1e4) {
        let cfg = NewtonConfig { lower_bound: Some(0.0), ..NewtonConfig::default() };
        let r = newton(|x| x * x - c, 1.0, &cfg).unwrap();
        prop_assert!((r.root - c.sqrt()).abs() < 1e-9 * c.sqrt().max(1.0),
            "root={}, sqrt={}", r.root, c.sqrt());
        prop_assert!(r.root >= 0.0);
    }

    /// Bounded iterates never enter the forbidden region.
    #[test]
    fn newton_bounded_screened_root(decay in 0.5f64..6.0, target in 1e-3f64..1.0) {
        let cfg = NewtonConfig { lower_bound: Some(0.0), ..NewtonConfig::default() };
        let f = |x: f64| {
            assert!(x >= 0.0, "iterate {x} left the domain");
            2.0 * (-decay * x.sqrt()).exp() - target
        };
        let r = newton(f, 1.0, &cfg).unwrap();
        let expected = ((2.0 / target).ln() / decay).powi(2);
        prop_assert!((r.root - expected).abs() < 1e-8 * expected.max(1.0),
            "root={}, expected={}", r.root, expected);
    }
}

// ── ODE Integration Properties ───────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Exponential decay matches the closed form at every output time.
    #[test]
    fn dopri5_decay_accuracy(lambda in 0.1f64..5.0, n in 2usize..200) {
        let t_eval = Array1::linspace(0.0, 5.0, n);
        let sol = integrate_dopri5(&Decay { lambda }, [1.0], &t_eval, &AdaptiveConfig::default())
            .unwrap();
        for (i, &t) in t_eval.iter().enumerate() {
            let exact = (-lambda * t).exp();
            prop_assert!((sol.y[[i, 0]] - exact).abs() < 1e-6,
                "t={}, got {}, exact {}", t, sol.y[[i, 0]], exact);
        }
    }

    /// Output rows equal the requested grid length and the first row is y0.
    #[test]
    fn dopri5_grid_contract(omega in 0.2f64..3.0, q0 in -2.0f64..2.0, n in 2usize..500) {
        let t_eval = Array1::linspace(0.0, 10.0, n);
        let sol = integrate_dopri5(&Harmonic { omega }, [q0, 0.0], &t_eval,
            &AdaptiveConfig::default()).unwrap();
        prop_assert_eq!(sol.y.nrows(), n);
        prop_assert_eq!(sol.y[[0, 0]], q0);
        prop_assert_eq!(sol.y[[0, 1]], 0.0);
        for i in 0..n {
            let exact = q0 * (omega * t_eval[i]).cos();
            prop_assert!((sol.y[[i, 0]] - exact).abs() < 1e-4 * (1.0 + q0.abs()));
        }
    }
}
