//! Adaptive explicit Runge-Kutta integration for small non-stiff systems.
//!
//! Dormand-Prince 5(4) with FSAL, PI-free step control and an RMS error
//! norm scaled by `atol + rtol·|y|`. Steps are truncated so that every
//! requested output time is hit exactly: the returned samples are genuine
//! solver states, not interpolants.

use lenr_types::error::{LenrError, LenrResult};
use ndarray::{Array1, Array2};

// Butcher tableau (Dormand & Prince 1980).
const C2: f64 = 1.0 / 5.0;
const C3: f64 = 3.0 / 10.0;
const C4: f64 = 4.0 / 5.0;
const C5: f64 = 8.0 / 9.0;

const A21: f64 = 1.0 / 5.0;
const A31: f64 = 3.0 / 40.0;
const A32: f64 = 9.0 / 40.0;
const A41: f64 = 44.0 / 45.0;
const A42: f64 = -56.0 / 15.0;
const A43: f64 = 32.0 / 9.0;
const A51: f64 = 19372.0 / 6561.0;
const A52: f64 = -25360.0 / 2187.0;
const A53: f64 = 64448.0 / 6561.0;
const A54: f64 = -212.0 / 729.0;
const A61: f64 = 9017.0 / 3168.0;
const A62: f64 = -355.0 / 33.0;
const A63: f64 = 46732.0 / 5247.0;
const A64: f64 = 49.0 / 176.0;
const A65: f64 = -5103.0 / 18656.0;
const A71: f64 = 35.0 / 384.0;
const A73: f64 = 500.0 / 1113.0;
const A74: f64 = 125.0 / 192.0;
const A75: f64 = -2187.0 / 6784.0;
const A76: f64 = 11.0 / 84.0;

// 5th-order minus embedded 4th-order weights.
const E1: f64 = 71.0 / 57600.0;
const E3: f64 = -71.0 / 16695.0;
const E4: f64 = 71.0 / 1920.0;
const E5: f64 = -17253.0 / 339200.0;
const E6: f64 = 22.0 / 525.0;
const E7: f64 = -1.0 / 40.0;

/// Step-size controller safety factor.
const SAFETY: f64 = 0.9;
/// Largest shrink per step.
const MIN_FACTOR: f64 = 0.2;
/// Largest growth per step.
const MAX_FACTOR: f64 = 10.0;

/// First-order system `dy/dt = f(t, y)` of fixed dimension `N`.
pub trait OdeSystem<const N: usize> {
    fn derivatives(&self, t: f64, y: &[f64; N], dydt: &mut [f64; N]);
}

/// Tolerances and limits of an adaptive integration.
#[derive(Debug, Clone, Copy)]
pub struct AdaptiveConfig {
    pub rtol: f64,
    pub atol: f64,
    /// Accepted plus rejected steps before giving up.
    pub max_steps: usize,
    /// Starting step; chosen automatically when `None`.
    pub initial_step: Option<f64>,
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        AdaptiveConfig {
            rtol: 1e-6,
            atol: 1.49012e-8,
            max_steps: 1_000_000,
            initial_step: None,
        }
    }
}

/// Work counters of one integration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntegrationStats {
    pub accepted: usize,
    pub rejected: usize,
    pub evaluations: usize,
}

/// Samples of the solution at the requested output times.
/// `y` is [n_times, N].
#[derive(Debug, Clone)]
pub struct OdeSolution {
    pub t: Array1<f64>,
    pub y: Array2<f64>,
    pub stats: IntegrationStats,
}

fn rms_norm<const N: usize>(v: &[f64; N], scale: &[f64; N]) -> f64 {
    let sum: f64 = v
        .iter()
        .zip(scale.iter())
        .map(|(x, s)| (x / s) * (x / s))
        .sum();
    (sum / N as f64).sqrt()
}

/// Hairer, Nørsett & Wanner starting-step heuristic (order 5).
fn initial_step<S: OdeSystem<N>, const N: usize>(
    system: &S,
    t0: f64,
    y0: &[f64; N],
    f0: &[f64; N],
    cfg: &AdaptiveConfig,
    stats: &mut IntegrationStats,
) -> f64 {
    let mut scale = [0.0; N];
    for i in 0..N {
        scale[i] = cfg.atol + cfg.rtol * y0[i].abs();
    }
    let d0 = rms_norm(y0, &scale);
    let d1 = rms_norm(f0, &scale);
    let h0 = if d0 < 1e-5 || d1 < 1e-5 {
        1e-6
    } else {
        0.01 * d0 / d1
    };

    let mut y1 = [0.0; N];
    for i in 0..N {
        y1[i] = y0[i] + h0 * f0[i];
    }
    let mut f1 = [0.0; N];
    system.derivatives(t0 + h0, &y1, &mut f1);
    stats.evaluations += 1;

    let mut df = [0.0; N];
    for i in 0..N {
        df[i] = f1[i] - f0[i];
    }
    let d2 = rms_norm(&df, &scale) / h0;

    let dmax = d1.max(d2);
    let h1 = if dmax <= 1e-15 {
        (h0 * 1e-3).max(1e-6)
    } else {
        (0.01 / dmax).powf(1.0 / 5.0)
    };
    (100.0 * h0).min(h1)
}

/// One Dormand-Prince step from `(t, y)` with `k1 = f(t, y)` already known.
/// Returns the 5th-order solution, its derivative (next step's `k1`), and the
/// scaled error norm.
fn dopri5_step<S: OdeSystem<N>, const N: usize>(
    system: &S,
    t: f64,
    y: &[f64; N],
    k1: &[f64; N],
    h: f64,
    cfg: &AdaptiveConfig,
) -> ([f64; N], [f64; N], f64) {
    let mut stage = [0.0; N];
    let mut k2 = [0.0; N];
    let mut k3 = [0.0; N];
    let mut k4 = [0.0; N];
    let mut k5 = [0.0; N];
    let mut k6 = [0.0; N];
    let mut k7 = [0.0; N];

    for i in 0..N {
        stage[i] = y[i] + h * A21 * k1[i];
    }
    system.derivatives(t + C2 * h, &stage, &mut k2);

    for i in 0..N {
        stage[i] = y[i] + h * (A31 * k1[i] + A32 * k2[i]);
    }
    system.derivatives(t + C3 * h, &stage, &mut k3);

    for i in 0..N {
        stage[i] = y[i] + h * (A41 * k1[i] + A42 * k2[i] + A43 * k3[i]);
    }
    system.derivatives(t + C4 * h, &stage, &mut k4);

    for i in 0..N {
        stage[i] = y[i] + h * (A51 * k1[i] + A52 * k2[i] + A53 * k3[i] + A54 * k4[i]);
    }
    system.derivatives(t + C5 * h, &stage, &mut k5);

    for i in 0..N {
        stage[i] = y[i]
            + h * (A61 * k1[i] + A62 * k2[i] + A63 * k3[i] + A64 * k4[i] + A65 * k5[i]);
    }
    system.derivatives(t + h, &stage, &mut k6);

    let mut y_new = [0.0; N];
    for i in 0..N {
        y_new[i] = y[i]
            + h * (A71 * k1[i] + A73 * k3[i] + A74 * k4[i] + A75 * k5[i] + A76 * k6[i]);
    }
    system.derivatives(t + h, &y_new, &mut k7);

    let mut err = [0.0; N];
    let mut scale = [0.0; N];
    for i in 0..N {
        err[i] = h
            * (E1 * k1[i] + E3 * k3[i] + E4 * k4[i] + E5 * k5[i] + E6 * k6[i] + E7 * k7[i]);
        scale[i] = cfg.atol + cfg.rtol * y[i].abs().max(y_new[i].abs());
    }
    let norm = rms_norm(&err, &scale);
    let norm = if norm.is_finite() && y_new.iter().all(|v| v.is_finite()) {
        norm
    } else {
        f64::INFINITY
    };

    (y_new, k7, norm)
}

fn validate_request(t_eval: &Array1<f64>, cfg: &AdaptiveConfig) -> LenrResult<()> {
    if t_eval.is_empty() {
        return Err(LenrError::NumericDomain(
            "output grid must contain at least one time".to_string(),
        ));
    }
    if t_eval.iter().any(|t| !t.is_finite()) {
        return Err(LenrError::NumericDomain(
            "output grid contains non-finite times".to_string(),
        ));
    }
    if t_eval.windows(2).into_iter().any(|w| w[1] <= w[0]) {
        return Err(LenrError::NumericDomain(
            "output grid must be strictly increasing".to_string(),
        ));
    }
    if !(cfg.rtol > 0.0 && cfg.atol > 0.0) {
        return Err(LenrError::NumericDomain(format!(
            "tolerances must be positive, got rtol={} atol={}",
            cfg.rtol, cfg.atol
        )));
    }
    Ok(())
}

/// Integrate `system` from `y0` at `t_eval[0]`, recording the state at every
/// time in `t_eval`.
///
/// Fails with `IntegrationFailure` when the step size underflows (finite-time
/// blow-up, loss of tolerance) and `StepBudgetExceeded` once
/// `cfg.max_steps` attempts have been spent.
pub fn integrate_dopri5<S: OdeSystem<N>, const N: usize>(
    system: &S,
    y0: [f64; N],
    t_eval: &Array1<f64>,
    cfg: &AdaptiveConfig,
) -> LenrResult<OdeSolution> {
    validate_request(t_eval, cfg)?;
    if y0.iter().any(|v| !v.is_finite()) {
        return Err(LenrError::NumericDomain(
            "initial state contains non-finite values".to_string(),
        ));
    }

    let n_out = t_eval.len();
    let mut out = Array2::zeros((n_out, N));
    let mut stats = IntegrationStats::default();

    let mut t = t_eval[0];
    let mut y = y0;
    for (j, v) in y.iter().enumerate() {
        out[[0, j]] = *v;
    }

    let mut k1 = [0.0; N];
    system.derivatives(t, &y, &mut k1);
    stats.evaluations += 1;

    let mut h = match cfg.initial_step {
        Some(h0) if h0.is_finite() && h0 > 0.0 => h0,
        _ => initial_step(system, t, &y, &k1, cfg, &mut stats),
    };

    for (idx, &t_target) in t_eval.iter().enumerate().skip(1) {
        while t < t_target {
            if stats.accepted + stats.rejected >= cfg.max_steps {
                return Err(LenrError::StepBudgetExceeded {
                    max_steps: cfg.max_steps,
                    tau: t,
                });
            }

            let remaining = t_target - t;
            let capped = h >= remaining;
            let h_try = if capped { remaining } else { h };

            let min_step = 16.0 * f64::EPSILON * t.abs().max(1.0);
            if h_try < min_step && !capped {
                return Err(LenrError::IntegrationFailure {
                    tau: t,
                    message: format!(
                        "step size {h_try:e} underflowed below {min_step:e} \
                         (rtol={}, atol={})",
                        cfg.rtol, cfg.atol
                    ),
                });
            }

            let (y_new, k7, err) = dopri5_step(system, t, &y, &k1, h_try, cfg);
            stats.evaluations += 6;

            let factor = if err == 0.0 {
                MAX_FACTOR
            } else {
                (SAFETY * err.powf(-1.0 / 5.0)).clamp(MIN_FACTOR, MAX_FACTOR)
            };

            if err <= 1.0 {
                stats.accepted += 1;
                t = if capped { t_target } else { t + h_try };
                y = y_new;
                k1 = k7;
                let proposed = h_try * factor;
                // A step shortened to land on an output time says nothing
                // about the natural step size.
                h = if capped { proposed.max(h) } else { proposed };
            } else {
                stats.rejected += 1;
                h = h_try * factor.min(1.0);
                if !h.is_finite() || h <= 0.0 || (capped && h_try <= min_step) {
                    return Err(LenrError::IntegrationFailure {
                        tau: t,
                        message: format!(
                            "error estimate {err:e} could not be reduced below tolerance"
                        ),
                    });
                }
            }
        }

        for (j, v) in y.iter().enumerate() {
            out[[idx, j]] = *v;
        }
    }

    log::debug!(
        "dopri5: {} accepted, {} rejected, {} evaluations over [{}, {}]",
        stats.accepted,
        stats.rejected,
        stats.evaluations,
        t_eval[0],
        t_eval[n_out - 1]
    );

    Ok(OdeSolution {
        t: t_eval.clone(),
        y: out,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// y'' = -ω² y as (q, p).
    struct Harmonic {
        omega: f64,
    }

    impl OdeSystem<2> for Harmonic {
        fn derivatives(&self, _t: f64, y: &[f64; 2], dydt: &mut [f64; 2]) {
            dydt[0] = y[1];
            dydt[1] = -self.omega * self.omega * y[0];
        }
    }

    /// y' = y², blows up at t = 1 from y(0) = 1.
    struct Blowup;

    impl OdeSystem<1> for Blowup {
        fn derivatives(&self, _t: f64, y: &[f64; 1], dydt: &mut [f64; 1]) {
            dydt[0] = y[0] * y[0];
        }
    }

    #[test]
    fn test_harmonic_matches_cosine() {
        let sys = Harmonic { omega: 1.0 };
        let t_eval = Array1::linspace(0.0, 20.0, 401);
        let sol = integrate_dopri5(&sys, [1.0, 0.0], &t_eval, &AdaptiveConfig::default()).unwrap();

        for (i, &t) in t_eval.iter().enumerate() {
            let err = (sol.y[[i, 0]] - t.cos()).abs();
            assert!(err < 1e-5, "t={t}: q={} cos={} err={err}", sol.y[[i, 0]], t.cos());
        }
    }

    #[test]
    fn test_output_grid_is_exact() {
        let sys = Harmonic { omega: 2.0 };
        let t_eval = Array1::linspace(0.0, 3.0, 7);
        let sol = integrate_dopri5(&sys, [0.0, 1.0], &t_eval, &AdaptiveConfig::default()).unwrap();
        assert_eq!(sol.t, t_eval);
        assert_eq!(sol.y.dim(), (7, 2));
        assert_eq!(sol.y[[0, 0]], 0.0);
        assert_eq!(sol.y[[0, 1]], 1.0);
        assert!(sol.stats.accepted >= 6);
    }

    #[test]
    fn test_tighter_tolerance_reduces_error() {
        let sys = Harmonic { omega: 1.0 };
        let t_eval = Array1::linspace(0.0, 50.0, 51);
        let loose = AdaptiveConfig {
            rtol: 1e-4,
            atol: 1e-6,
            ..AdaptiveConfig::default()
        };
        let tight = AdaptiveConfig {
            rtol: 1e-10,
            atol: 1e-12,
            ..AdaptiveConfig::default()
        };
        let a = integrate_dopri5(&sys, [1.0, 0.0], &t_eval, &loose).unwrap();
        let b = integrate_dopri5(&sys, [1.0, 0.0], &t_eval, &tight).unwrap();
        let exact = 50.0_f64.cos();
        let err_loose = (a.y[[50, 0]] - exact).abs();
        let err_tight = (b.y[[50, 0]] - exact).abs();
        assert!(err_tight < err_loose, "tight={err_tight} loose={err_loose}");
        assert!(err_tight < 1e-7, "tight={err_tight}");
    }

    #[test]
    fn test_blowup_reports_integration_failure() {
        let t_eval = Array1::linspace(0.0, 2.0, 21);
        let err = integrate_dopri5(&Blowup, [1.0], &t_eval, &AdaptiveConfig::default()).unwrap_err();
        match err {
            LenrError::IntegrationFailure { tau, .. } => {
                // The last accepted step can carry tau just past the pole
                // before the step size collapses.
                assert!(tau > 0.9 && tau < 1.0 + 1e-6, "failed at tau={tau}");
            }
            other => panic!("expected IntegrationFailure, got {other:?}"),
        }
    }

    #[test]
    fn test_step_budget_exceeded() {
        let sys = Harmonic { omega: 1.0 };
        let t_eval = Array1::linspace(0.0, 100.0, 11);
        let cfg = AdaptiveConfig {
            max_steps: 5,
            ..AdaptiveConfig::default()
        };
        let err = integrate_dopri5(&sys, [1.0, 0.0], &t_eval, &cfg).unwrap_err();
        assert!(matches!(err, LenrError::StepBudgetExceeded { max_steps: 5, .. }));
    }

    #[test]
    fn test_rejects_bad_grid() {
        let sys = Harmonic { omega: 1.0 };
        let cfg = AdaptiveConfig::default();
        let empty = Array1::<f64>::zeros(0);
        assert!(integrate_dopri5(&sys, [1.0, 0.0], &empty, &cfg).is_err());
        let decreasing = Array1::from(vec![0.0, 1.0, 0.5]);
        assert!(integrate_dopri5(&sys, [1.0, 0.0], &decreasing, &cfg).is_err());
        let single = Array1::from(vec![0.0]);
        let sol = integrate_dopri5(&sys, [1.0, 0.0], &single, &cfg).unwrap();
        assert_eq!(sol.y.dim(), (1, 2));
    }

    #[test]
    fn test_deterministic() {
        let sys = Harmonic { omega: 1.3 };
        let t_eval = Array1::linspace(0.0, 10.0, 101);
        let cfg = AdaptiveConfig::default();
        let a = integrate_dopri5(&sys, [0.4, -0.2], &t_eval, &cfg).unwrap();
        let b = integrate_dopri5(&sys, [0.4, -0.2], &t_eval, &cfg).unwrap();
        assert_eq!(a.y, b.y);
        assert_eq!(a.stats, b.stats);
    }
}
