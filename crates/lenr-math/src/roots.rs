//! Scalar root finding.
//!
//! Newton iteration with a forward-difference derivative, the scalar
//! counterpart of the numerical-Jacobian Newton used for force balance.
//! An optional lower bound projects iterates back into the admissible
//! domain instead of letting them wander where `f` is undefined.

use lenr_types::error::{LenrError, LenrResult};

/// Relative forward-difference step, sqrt(machine epsilon).
const FD_STEP: f64 = 1.490_116_119_384_765_6e-8;

#[derive(Debug, Clone, Copy)]
pub struct NewtonConfig {
    /// |f| accepted as converged.
    pub f_tol: f64,
    /// |f| still accepted when the step has stalled.
    pub stall_f_tol: f64,
    /// Step size, relative to max(|x|, 1), regarded as stalled.
    pub x_tol: f64,
    pub max_iterations: usize,
    /// Iterates never go below this value.
    pub lower_bound: Option<f64>,
}

impl Default for NewtonConfig {
    fn default() -> Self {
        NewtonConfig {
            f_tol: 1e-12,
            stall_f_tol: 1e-9,
            x_tol: 1e-14,
            max_iterations: 200,
            lower_bound: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootResult {
    pub root: f64,
    pub residual: f64,
    pub iterations: usize,
}

fn evaluate<F: Fn(f64) -> f64>(f: &F, x: f64) -> LenrResult<f64> {
    let fx = f(x);
    if fx.is_finite() {
        Ok(fx)
    } else {
        Err(LenrError::NumericDomain(format!(
            "function evaluated to {fx} at x={x}"
        )))
    }
}

/// Forward-difference derivative at `x`. Stepping upward keeps the probe
/// inside a lower-bounded domain.
pub fn forward_derivative<F: Fn(f64) -> f64>(f: &F, x: f64, fx: f64) -> LenrResult<f64> {
    let h = FD_STEP * x.abs().max(1.0);
    let fxh = evaluate(f, x + h)?;
    Ok((fxh - fx) / h)
}

/// Project a Newton proposal into the domain: a step that would cross the
/// bound moves halfway from `x` to the bound.
fn project(x: f64, proposal: f64, lower_bound: Option<f64>) -> f64 {
    match lower_bound {
        Some(lb) if proposal < lb => 0.5 * (x + lb),
        _ => proposal,
    }
}

/// Solve `f(x) = 0` starting from `x0`.
///
/// Returns `RootNotConverged` when the iteration budget runs out, the
/// derivative vanishes, or the step stalls with a residual above
/// `stall_f_tol`. `NumericDomain` is returned if `f` produces a non-finite
/// value along the way.
pub fn newton<F: Fn(f64) -> f64>(f: F, x0: f64, cfg: &NewtonConfig) -> LenrResult<RootResult> {
    if !x0.is_finite() {
        return Err(LenrError::NumericDomain(format!(
            "initial guess must be finite, got {x0}"
        )));
    }
    let mut x = match cfg.lower_bound {
        Some(lb) if x0 < lb => lb,
        _ => x0,
    };
    let mut fx = evaluate(&f, x)?;

    for iter in 0..cfg.max_iterations {
        if fx.abs() <= cfg.f_tol {
            return Ok(RootResult {
                root: x,
                residual: fx,
                iterations: iter,
            });
        }

        let dfdx = forward_derivative(&f, x, fx)?;
        if dfdx == 0.0 || !dfdx.is_finite() {
            return Err(LenrError::RootNotConverged {
                iterations: iter,
                x,
                residual: fx,
            });
        }

        let x_new = project(x, x - fx / dfdx, cfg.lower_bound);
        let step = (x_new - x).abs();
        x = x_new;
        fx = evaluate(&f, x)?;
        log::trace!("newton iter {iter}: x={x:.15e} f={fx:.3e}");

        if step <= cfg.x_tol * x.abs().max(1.0) {
            if fx.abs() <= cfg.stall_f_tol {
                return Ok(RootResult {
                    root: x,
                    residual: fx,
                    iterations: iter + 1,
                });
            }
            return Err(LenrError::RootNotConverged {
                iterations: iter + 1,
                x,
                residual: fx,
            });
        }
    }

    if fx.abs() <= cfg.f_tol {
        return Ok(RootResult {
            root: x,
            residual: fx,
            iterations: cfg.max_iterations,
        });
    }
    Err(LenrError::RootNotConverged {
        iterations: cfg.max_iterations,
        x,
        residual: fx,
    })
}

/// Reject a converged root that lies below `lower_bound` or is not finite.
pub fn ensure_in_domain(root: f64, lower_bound: f64) -> LenrResult<f64> {
    if root.is_finite() && root >= lower_bound {
        Ok(root)
    } else {
        Err(LenrError::RootOutsideDomain { root, lower_bound })
    }
}
