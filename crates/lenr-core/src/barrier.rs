// ─────────────────────────────────────────────────────────────────────
// LENR Nano-SAV — Barrier Elimination
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Barrier-elimination equation for the screened D-D Coulomb potential.
//!
//! With `α_eff = α · surface_factor · bundle_boost`:
//!
//!   V_scr(α) = (e²/4πε₀ / r_dd) · exp(−r_dd · √α_eff / λ_b)   [eV]
//!
//! The critical coefficient `α_min` solves `V_scr(α) = E_th`. Newton runs on
//! `ln V_scr − ln E_th`, which has the same root but no underflow once the
//! exponential drops below the resolution of `E_th`.

use lenr_math::roots::{ensure_in_domain, newton, NewtonConfig};
use lenr_types::config::BarrierConfig;
use lenr_types::constants::PhysicalConstants;
use lenr_types::error::{LenrError, LenrResult};
use serde::Serialize;

/// Physical lower bound of the screening coefficient (it sits under a sqrt).
pub const ALPHA_LOWER_BOUND: f64 = 0.0;

/// Fixed inputs of the barrier equation; alpha is the unknown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarrierEquationInputs {
    pub surface_factor: f64,
    pub bundle_boost: f64,
}

impl BarrierEquationInputs {
    pub fn new(surface_factor: f64, bundle_boost: f64) -> LenrResult<Self> {
        for (name, value) in [
            ("surface_factor", surface_factor),
            ("bundle_boost", bundle_boost),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(LenrError::NumericDomain(format!(
                    "{name} must be finite and positive, got {value}"
                )));
            }
        }
        Ok(BarrierEquationInputs {
            surface_factor,
            bundle_boost,
        })
    }

    pub fn effective_alpha(&self, alpha: f64) -> f64 {
        alpha * self.surface_factor * self.bundle_boost
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BarrierSolution {
    pub alpha_min: f64,
    pub residual_ev: f64,
    pub iterations: usize,
}

/// Screened Coulomb potential (eV) at `r_dd` for an effective coefficient.
pub fn screened_potential_ev(constants: &PhysicalConstants, eff_alpha: f64) -> LenrResult<f64> {
    if !eff_alpha.is_finite() || eff_alpha < 0.0 {
        return Err(LenrError::NumericDomain(format!(
            "effective screening coefficient must be finite and >= 0, got {eff_alpha}"
        )));
    }
    if constants.lambda_b <= 0.0 {
        return Err(LenrError::NumericDomain(format!(
            "screening length must be positive, got {}",
            constants.lambda_b
        )));
    }
    Ok(constants.bare_barrier_ev() * (-constants.r_dd * eff_alpha.sqrt() / constants.lambda_b).exp())
}

/// `V_scr(α) − E_th` in eV.
pub fn barrier_residual(
    constants: &PhysicalConstants,
    inputs: &BarrierEquationInputs,
    alpha: f64,
) -> LenrResult<f64> {
    Ok(screened_potential_ev(constants, inputs.effective_alpha(alpha))? - constants.e_th)
}

/// `ln V_scr(α) − ln E_th`, computed without forming the exponential.
pub fn log_barrier_residual(
    constants: &PhysicalConstants,
    inputs: &BarrierEquationInputs,
    alpha: f64,
) -> LenrResult<f64> {
    let eff_alpha = inputs.effective_alpha(alpha);
    // Same domain checks as the linear form
    screened_potential_ev(constants, eff_alpha)?;
    if constants.e_th <= 0.0 {
        return Err(LenrError::NumericDomain(format!(
            "thermal energy must be positive, got {}",
            constants.e_th
        )));
    }
    let ln_v0 = constants.bare_barrier_ev().ln();
    Ok(ln_v0 - constants.r_dd * eff_alpha.sqrt() / constants.lambda_b - constants.e_th.ln())
}

/// Closed-form root: `α = (ln(V₀/E_th)·λ_b/r_dd)² / (surface_factor·bundle_boost)`.
///
/// Only defined when the bare barrier exceeds the thermal energy.
pub fn analytic_alpha_min(
    constants: &PhysicalConstants,
    inputs: &BarrierEquationInputs,
) -> LenrResult<f64> {
    let ratio = constants.bare_barrier_ev() / constants.e_th;
    if !(ratio > 1.0) {
        return Err(LenrError::NumericDomain(format!(
            "bare barrier {:.4} eV does not exceed thermal energy {} eV",
            constants.bare_barrier_ev(),
            constants.e_th
        )));
    }
    let sqrt_eff = ratio.ln() * constants.lambda_b / constants.r_dd;
    Ok(sqrt_eff * sqrt_eff / (inputs.surface_factor * inputs.bundle_boost))
}

/// Guard applied to every solver output: alpha must be finite and >= 0.
pub fn validate_alpha(alpha: f64) -> LenrResult<f64> {
    ensure_in_domain(alpha, ALPHA_LOWER_BOUND)
}

/// Numerically solve the barrier-elimination equation for `α_min`.
pub fn solve_alpha_min(
    constants: &PhysicalConstants,
    inputs: &BarrierEquationInputs,
    cfg: &BarrierConfig,
) -> LenrResult<BarrierSolution> {
    constants.validate()?;
    cfg.validate()?;

    let newton_cfg = NewtonConfig {
        f_tol: cfg.f_tol,
        stall_f_tol: cfg.stall_f_tol,
        x_tol: cfg.x_tol,
        max_iterations: cfg.max_iterations,
        lower_bound: Some(ALPHA_LOWER_BOUND),
    };

    // The projection keeps iterates >= 0, so the residual is always defined;
    // NaN stands in for an unreachable domain error and is reported as such.
    let residual =
        |alpha: f64| log_barrier_residual(constants, inputs, alpha).unwrap_or(f64::NAN);
    let root = newton(residual, cfg.initial_guess, &newton_cfg)?;
    let alpha_min = validate_alpha(root.root)?;
    let residual_ev = barrier_residual(constants, inputs, alpha_min)?;

    log::info!(
        "barrier solve: alpha_min={alpha_min:.6} residual={residual_ev:.3e} eV after {} iterations",
        root.iterations
    );

    Ok(BarrierSolution {
        alpha_min,
        residual_ev,
        iterations: root.iterations,
    })
}
