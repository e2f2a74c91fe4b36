// ─────────────────────────────────────────────────────────────────────
// LENR Nano-SAV — Resonance Simulator
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Resonantly driven D-D pair in a surface-adsorbed vacancy.
//!
//! Two damped, linearly coupled oscillators in dimensionless time τ:
//!
//!   X1'' = −X1 − g·X1' − k·(X1 − X2)
//!   X2'' = −detune²·X2 − g·X2' − k·(X2 − X1) + A·sin(ω_d·τ)
//!
//! The closest approach of the pair, floored at 0.1 Å, shortens the
//! tunnelling distance; the rate enhancement follows the Thomas-Fermi law
//! `exp((r_dd − r_min) / λ_TF)` with `λ_TF = λ_b / √surface_factor`.

use lenr_math::ode::{integrate_dopri5, AdaptiveConfig, OdeSolution, OdeSystem};
use lenr_types::config::{IntegrationConfig, ResolvedResonance, ResonanceParameters};
use lenr_types::constants::PhysicalConstants;
use lenr_types::error::{LenrError, LenrResult};
use lenr_types::state::{OscillatorState, SimulationResult, Trajectory};
use ndarray::Array1;

/// Right-hand side of the coupled-oscillator ODE.
#[derive(Debug, Clone, Copy)]
pub struct CoupledOscillators {
    pub detune: f64,
    pub damping: f64,
    pub coupling: f64,
    pub drive_amplitude: f64,
    pub drive_frequency: f64,
}

impl From<&ResolvedResonance> for CoupledOscillators {
    fn from(p: &ResolvedResonance) -> Self {
        CoupledOscillators {
            detune: p.detune,
            damping: p.damping,
            coupling: p.coupling,
            drive_amplitude: p.drive_amplitude,
            drive_frequency: p.drive_frequency,
        }
    }
}

impl OdeSystem<4> for CoupledOscillators {
    fn derivatives(&self, tau: f64, y: &[f64; 4], dydt: &mut [f64; 4]) {
        let [x1, v1, x2, v2] = *y;
        let g = self.damping;
        let k = self.coupling;
        dydt[0] = v1;
        dydt[1] = -x1 - g * v1 - k * (x1 - x2);
        dydt[2] = v2;
        dydt[3] = -self.detune * self.detune * x2 - g * v2 - k * (x2 - x1)
            + self.drive_amplitude * (self.drive_frequency * tau).sin();
    }
}

/// A completed simulation: parameters, sampled trajectory and derived scalars.
#[derive(Debug, Clone)]
pub struct ResonanceRun {
    pub params: ResolvedResonance,
    pub trajectory: Trajectory,
    pub result: SimulationResult,
}

/// Thomas-Fermi screening length adjusted for the surface factor (m).
pub fn screening_length(constants: &PhysicalConstants, surface_factor: f64) -> LenrResult<f64> {
    if !surface_factor.is_finite() || surface_factor <= 0.0 {
        return Err(LenrError::NumericDomain(format!(
            "surface_factor must be finite and positive, got {surface_factor}"
        )));
    }
    let lambda_tf = constants.lambda_b / surface_factor.sqrt();
    if !lambda_tf.is_finite() || lambda_tf <= 0.0 {
        return Err(LenrError::NumericDomain(format!(
            "screening length evaluated to {lambda_tf}"
        )));
    }
    Ok(lambda_tf)
}

/// Lift a raw minimum separation to the physical floor.
pub fn enforce_separation_floor(constants: &PhysicalConstants, raw_min_m: f64) -> f64 {
    raw_min_m.max(constants.separation_floor)
}

/// `exp((r_dd − r_min) / λ_TF)`: non-decreasing as the separation shrinks.
pub fn rate_boost_from_separation(
    constants: &PhysicalConstants,
    surface_factor: f64,
    effective_min_m: f64,
) -> LenrResult<f64> {
    let lambda_tf = screening_length(constants, surface_factor)?;
    let delta_r = constants.r_dd - effective_min_m;
    Ok((delta_r / lambda_tf).exp())
}

/// Derive peak amplitude, closest approach and rate boost from a trajectory.
pub fn derive_result(
    constants: &PhysicalConstants,
    surface_factor: f64,
    trajectory: &Trajectory,
) -> LenrResult<SimulationResult> {
    if trajectory.is_empty() {
        return Err(LenrError::NumericDomain(
            "cannot derive observables from an empty trajectory".to_string(),
        ));
    }

    let x1 = trajectory.x1();
    let x2 = trajectory.x2();

    let peak = x1.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    let raw_min = x1
        .iter()
        .zip(x2.iter())
        .map(|(a, b)| (a - b).abs())
        .fold(f64::INFINITY, f64::min);

    if !peak.is_finite() || !raw_min.is_finite() {
        return Err(LenrError::NumericDomain(
            "trajectory contains non-finite samples".to_string(),
        ));
    }

    let peak_amplitude_m = peak * constants.x_0;
    let raw_min_separation_m = raw_min * constants.x_0;
    let effective_min_separation_m = enforce_separation_floor(constants, raw_min_separation_m);
    let screening_length_m = screening_length(constants, surface_factor)?;
    let rate_boost =
        rate_boost_from_separation(constants, surface_factor, effective_min_separation_m)?;

    Ok(SimulationResult {
        peak_amplitude_m,
        raw_min_separation_m,
        effective_min_separation_m,
        screening_length_m,
        rate_boost,
    })
}

/// Integrates the coupled-oscillator model on a fixed output grid.
#[derive(Debug, Clone)]
pub struct ResonanceSimulator {
    constants: PhysicalConstants,
    integration: IntegrationConfig,
    tau: Array1<f64>,
}

impl ResonanceSimulator {
    pub fn new(constants: PhysicalConstants, integration: IntegrationConfig) -> LenrResult<Self> {
        constants.validate()?;
        integration.validate()?;
        let tau = Array1::linspace(0.0, integration.t_end, integration.n_points);
        Ok(ResonanceSimulator {
            constants,
            integration,
            tau,
        })
    }

    pub fn constants(&self) -> &PhysicalConstants {
        &self.constants
    }

    pub fn time_grid(&self) -> &Array1<f64> {
        &self.tau
    }

    fn adaptive_config(&self) -> AdaptiveConfig {
        AdaptiveConfig {
            rtol: self.integration.rtol,
            atol: self.integration.atol,
            max_steps: self.integration.max_steps,
            initial_step: None,
        }
    }

    /// Integrate the trajectory for already-resolved parameters.
    pub fn integrate(&self, params: &ResolvedResonance) -> LenrResult<Trajectory> {
        let system = CoupledOscillators::from(params);
        let OdeSolution { t, y, stats } = integrate_dopri5(
            &system,
            OscillatorState::INITIAL.to_array(),
            &self.tau,
            &self.adaptive_config(),
        )?;
        log::debug!(
            "resonance detune={:.4}: {} steps ({} rejected)",
            params.detune,
            stats.accepted,
            stats.rejected
        );
        Ok(Trajectory { tau: t, states: y })
    }

    /// Resolve, integrate and derive the observables of one parameter set.
    pub fn run(&self, params: &ResonanceParameters) -> LenrResult<ResonanceRun> {
        let resolved = params.resolve()?;
        let trajectory = self.integrate(&resolved)?;
        let result = derive_result(&self.constants, resolved.surface_factor, &trajectory)?;
        Ok(ResonanceRun {
            params: resolved,
            trajectory,
            result,
        })
    }

    /// Numeric contract only: `(peak_amp Å, effective_min Å, rate_boost)`.
    pub fn simulate(&self, params: &ResonanceParameters) -> LenrResult<(f64, f64, f64)> {
        let r = self.run(params)?.result;
        Ok((
            r.peak_amplitude_angstrom(),
            r.effective_min_separation_angstrom(),
            r.rate_boost,
        ))
    }
}
