// ─────────────────────────────────────────────────────────────────────
// LENR Nano-SAV — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::constants::PhysicalConstants;
use crate::error::{LenrError, LenrResult};
use serde::{Deserialize, Serialize};

/// Top-level scenario configuration.
/// Every field is defaulted, so `{}` deserializes to the reference nano case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub constants: PhysicalConstants,
    /// Nano-enhancement of the screening (dimensionless).
    #[serde(default = "default_scenario_surface_factor")]
    pub surface_factor: f64,
    #[serde(default)]
    pub bundle: BundleConfig,
    #[serde(default)]
    pub oscillator: OscillatorConfig,
    #[serde(default)]
    pub integration: IntegrationConfig,
    #[serde(default)]
    pub barrier: BarrierConfig,
    #[serde(default)]
    pub sweep: SweepConfig,
    #[serde(default)]
    pub plot: PlotConfig,
}

fn default_scenario_surface_factor() -> f64 {
    10.0
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        ScenarioConfig {
            constants: PhysicalConstants::default(),
            surface_factor: default_scenario_surface_factor(),
            bundle: BundleConfig::default(),
            oscillator: OscillatorConfig::default(),
            integration: IntegrationConfig::default(),
            barrier: BarrierConfig::default(),
            sweep: SweepConfig::default(),
            plot: PlotConfig::default(),
        }
    }
}

impl ScenarioConfig {
    /// Load from a JSON file. Missing fields fall back to the reference scenario.
    pub fn from_file(path: &str) -> LenrResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> LenrResult<()> {
        self.constants.validate()?;
        if !self.surface_factor.is_finite() || self.surface_factor <= 0.0 {
            return Err(LenrError::ConfigError(format!(
                "surface_factor must be finite and positive, got {}",
                self.surface_factor
            )));
        }
        self.bundle.validate()?;
        self.integration.validate()?;
        self.barrier.validate()?;
        self.sweep.validate()?;
        Ok(())
    }

    /// Resonance parameters for one detuning value of this scenario.
    pub fn resonance_at(&self, detune: f64) -> ResonanceParameters {
        self.oscillator.parameters(self.surface_factor, detune)
    }
}

/// Synthetic fiber-bundle construction behind the topological boost.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BundleConfig {
    #[serde(default = "default_base_alpha")]
    pub base_alpha: f64,
    #[serde(default = "default_fiber_dim")]
    pub fiber_dim: usize,
    #[serde(default = "default_base_dim")]
    pub base_dim: usize,
}

fn default_base_alpha() -> f64 {
    1.5
}
fn default_fiber_dim() -> usize {
    14
}
fn default_base_dim() -> usize {
    4
}

impl Default for BundleConfig {
    fn default() -> Self {
        BundleConfig {
            base_alpha: default_base_alpha(),
            fiber_dim: default_fiber_dim(),
            base_dim: default_base_dim(),
        }
    }
}

impl BundleConfig {
    pub fn with_base_alpha(base_alpha: f64) -> Self {
        BundleConfig {
            base_alpha,
            ..BundleConfig::default()
        }
    }

    pub fn validate(&self) -> LenrResult<()> {
        if !self.base_alpha.is_finite() || self.base_alpha <= 0.0 {
            return Err(LenrError::NumericDomain(format!(
                "base_alpha must be finite and positive (it is inverted), got {}",
                self.base_alpha
            )));
        }
        if self.fiber_dim == 0 {
            return Err(LenrError::ConfigError("fiber_dim must be >= 1".to_string()));
        }
        if self.base_dim > self.fiber_dim {
            return Err(LenrError::ConfigError(format!(
                "base_dim ({}) exceeds fiber_dim ({})",
                self.base_dim, self.fiber_dim
            )));
        }
        Ok(())
    }
}

/// Oscillator coefficients shared by every run of a scenario.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OscillatorConfig {
    #[serde(default = "default_damping")]
    pub damping: f64,
    #[serde(default = "default_coupling")]
    pub coupling: f64,
    #[serde(default = "default_drive_amplitude")]
    pub drive_amplitude: f64,
    /// Absent means the midpoint between the two natural frequencies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drive_frequency: Option<f64>,
}

fn default_damping() -> f64 {
    0.01
}
fn default_coupling() -> f64 {
    0.1
}
fn default_drive_amplitude() -> f64 {
    0.1
}

impl Default for OscillatorConfig {
    fn default() -> Self {
        OscillatorConfig {
            damping: default_damping(),
            coupling: default_coupling(),
            drive_amplitude: default_drive_amplitude(),
            drive_frequency: None,
        }
    }
}

impl OscillatorConfig {
    pub fn parameters(&self, surface_factor: f64, detune: f64) -> ResonanceParameters {
        ResonanceParameters {
            surface_factor,
            detune,
            damping: self.damping,
            coupling: self.coupling,
            drive_amplitude: self.drive_amplitude,
            drive_frequency: self.drive_frequency,
        }
    }
}

/// Parameters of a single resonance simulation, as requested by a caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResonanceParameters {
    pub surface_factor: f64,
    pub detune: f64,
    pub damping: f64,
    pub coupling: f64,
    pub drive_amplitude: f64,
    pub drive_frequency: Option<f64>,
}

impl Default for ResonanceParameters {
    fn default() -> Self {
        OscillatorConfig::default().parameters(1.0, 1.05)
    }
}

impl ResonanceParameters {
    pub fn new(surface_factor: f64, detune: f64) -> Self {
        ResonanceParameters {
            surface_factor,
            detune,
            ..ResonanceParameters::default()
        }
    }

    /// Midpoint between the natural frequencies 1 and `detune`.
    pub fn midpoint_drive_frequency(detune: f64) -> f64 {
        (1.0 + detune) / 2.0
    }

    /// Fix the drive frequency and check every value before integration starts.
    pub fn resolve(&self) -> LenrResult<ResolvedResonance> {
        let drive_frequency = self
            .drive_frequency
            .unwrap_or_else(|| Self::midpoint_drive_frequency(self.detune));

        let fields = [
            ("surface_factor", self.surface_factor),
            ("detune", self.detune),
            ("damping", self.damping),
            ("coupling", self.coupling),
            ("drive_amplitude", self.drive_amplitude),
            ("drive_frequency", drive_frequency),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(LenrError::NumericDomain(format!(
                    "resonance parameter {name} must be finite, got {value}"
                )));
            }
        }
        if self.surface_factor <= 0.0 {
            return Err(LenrError::NumericDomain(format!(
                "surface_factor must be positive (it scales 1/sqrt), got {}",
                self.surface_factor
            )));
        }

        Ok(ResolvedResonance {
            surface_factor: self.surface_factor,
            detune: self.detune,
            damping: self.damping,
            coupling: self.coupling,
            drive_amplitude: self.drive_amplitude,
            drive_frequency,
        })
    }
}

/// Validated resonance parameters with a concrete drive frequency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedResonance {
    pub surface_factor: f64,
    pub detune: f64,
    pub damping: f64,
    pub coupling: f64,
    pub drive_amplitude: f64,
    pub drive_frequency: f64,
}

/// Time grid and tolerances of the resonance integration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IntegrationConfig {
    /// End of the dimensionless time window (start is 0).
    #[serde(default = "default_t_end")]
    pub t_end: f64,
    /// Number of evenly spaced output samples, endpoints included.
    #[serde(default = "default_n_points")]
    pub n_points: usize,
    #[serde(default = "default_rtol")]
    pub rtol: f64,
    #[serde(default = "default_atol")]
    pub atol: f64,
    /// Accepted plus rejected steps before the run is abandoned.
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
}

fn default_t_end() -> f64 {
    200.0
}
fn default_n_points() -> usize {
    20_000
}
fn default_rtol() -> f64 {
    1e-6
}
fn default_atol() -> f64 {
    1.49012e-8
}
fn default_max_steps() -> usize {
    2_000_000
}

impl Default for IntegrationConfig {
    fn default() -> Self {
        IntegrationConfig {
            t_end: default_t_end(),
            n_points: default_n_points(),
            rtol: default_rtol(),
            atol: default_atol(),
            max_steps: default_max_steps(),
        }
    }
}

impl IntegrationConfig {
    pub fn validate(&self) -> LenrResult<()> {
        if !self.t_end.is_finite() || self.t_end <= 0.0 {
            return Err(LenrError::ConfigError(format!(
                "t_end must be finite and positive, got {}",
                self.t_end
            )));
        }
        if self.n_points < 2 {
            return Err(LenrError::ConfigError(format!(
                "n_points must be >= 2, got {}",
                self.n_points
            )));
        }
        if !(self.rtol > 0.0 && self.atol > 0.0) {
            return Err(LenrError::ConfigError(format!(
                "tolerances must be positive, got rtol={} atol={}",
                self.rtol, self.atol
            )));
        }
        if self.max_steps == 0 {
            return Err(LenrError::ConfigError("max_steps must be >= 1".to_string()));
        }
        Ok(())
    }
}

/// Root-finder settings for the barrier-elimination equation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BarrierConfig {
    #[serde(default = "default_initial_guess")]
    pub initial_guess: f64,
    /// |ln V_scr − ln E_th| accepted as converged.
    #[serde(default = "default_f_tol")]
    pub f_tol: f64,
    /// Log-residual still accepted once the step has stalled.
    #[serde(default = "default_stall_f_tol")]
    pub stall_f_tol: f64,
    /// Relative step size regarded as stalled.
    #[serde(default = "default_x_tol")]
    pub x_tol: f64,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

fn default_initial_guess() -> f64 {
    1.0
}
fn default_f_tol() -> f64 {
    1e-12
}
fn default_stall_f_tol() -> f64 {
    1e-9
}
fn default_x_tol() -> f64 {
    1e-14
}
fn default_max_iterations() -> usize {
    200
}

impl Default for BarrierConfig {
    fn default() -> Self {
        BarrierConfig {
            initial_guess: default_initial_guess(),
            f_tol: default_f_tol(),
            stall_f_tol: default_stall_f_tol(),
            x_tol: default_x_tol(),
            max_iterations: default_max_iterations(),
        }
    }
}

impl BarrierConfig {
    pub fn validate(&self) -> LenrResult<()> {
        if !self.initial_guess.is_finite() || self.initial_guess < 0.0 {
            return Err(LenrError::ConfigError(format!(
                "initial_guess must be finite and non-negative, got {}",
                self.initial_guess
            )));
        }
        if !(self.f_tol > 0.0 && self.stall_f_tol >= self.f_tol && self.x_tol > 0.0) {
            return Err(LenrError::ConfigError(format!(
                "invalid tolerances: f_tol={} stall_f_tol={} x_tol={}",
                self.f_tol, self.stall_f_tol, self.x_tol
            )));
        }
        if self.max_iterations == 0 {
            return Err(LenrError::ConfigError(
                "max_iterations must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Evenly spaced detuning sweep, endpoints included.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SweepConfig {
    #[serde(default = "default_detune_min")]
    pub detune_min: f64,
    #[serde(default = "default_detune_max")]
    pub detune_max: f64,
    #[serde(default = "default_sweep_points")]
    pub n_points: usize,
}

fn default_detune_min() -> f64 {
    0.95
}
fn default_detune_max() -> f64 {
    1.05
}
fn default_sweep_points() -> usize {
    20
}

impl Default for SweepConfig {
    fn default() -> Self {
        SweepConfig {
            detune_min: default_detune_min(),
            detune_max: default_detune_max(),
            n_points: default_sweep_points(),
        }
    }
}

impl SweepConfig {
    pub fn validate(&self) -> LenrResult<()> {
        if !(self.detune_min.is_finite() && self.detune_max.is_finite())
            || self.detune_max < self.detune_min
        {
            return Err(LenrError::ConfigError(format!(
                "invalid detune range [{}, {}]",
                self.detune_min, self.detune_max
            )));
        }
        if self.n_points == 0 {
            return Err(LenrError::ConfigError(
                "sweep needs at least one point".to_string(),
            ));
        }
        Ok(())
    }
}

/// Example trajectory rendered after the sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlotConfig {
    #[serde(default = "default_plot_enabled")]
    pub enabled: bool,
    #[serde(default = "default_plot_detune")]
    pub detune: f64,
    #[serde(default = "default_plot_output")]
    pub output: String,
    #[serde(default = "default_plot_width")]
    pub width: u32,
    #[serde(default = "default_plot_height")]
    pub height: u32,
}

fn default_plot_enabled() -> bool {
    true
}
fn default_plot_detune() -> f64 {
    1.0
}
fn default_plot_output() -> String {
    "resonance_trajectory.png".to_string()
}
fn default_plot_width() -> u32 {
    1000
}
fn default_plot_height() -> u32 {
    600
}

impl Default for PlotConfig {
    fn default() -> Self {
        PlotConfig {
            enabled: default_plot_enabled(),
            detune: default_plot_detune(),
            output: default_plot_output(),
            width: default_plot_width(),
            height: default_plot_height(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_json_is_reference_scenario() {
        let cfg: ScenarioConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.surface_factor, 10.0);
        assert_eq!(cfg.bundle.base_alpha, 1.5);
        assert_eq!(cfg.bundle.fiber_dim, 14);
        assert_eq!(cfg.bundle.base_dim, 4);
        assert_eq!(cfg.integration.n_points, 20_000);
        assert_eq!(cfg.integration.t_end, 200.0);
        assert_eq!(cfg.sweep.n_points, 20);
        assert_eq!(cfg.plot.output, "resonance_trajectory.png");
        assert!(cfg.oscillator.drive_frequency.is_none());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_partial_override() {
        let json = r#"{ "surface_factor": 4.0, "sweep": { "n_points": 5 } }"#;
        let cfg: ScenarioConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.surface_factor, 4.0);
        assert_eq!(cfg.sweep.n_points, 5);
        assert_eq!(cfg.sweep.detune_min, 0.95);
        assert_eq!(cfg.constants, PhysicalConstants::default());
    }

    #[test]
    fn test_from_file_roundtrip() {
        let mut cfg = ScenarioConfig::default();
        cfg.bundle.base_alpha = 3.0;
        cfg.plot.enabled = false;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string_pretty(&cfg).unwrap().as_bytes())
            .unwrap();

        let loaded = ScenarioConfig::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(loaded.bundle.base_alpha, 3.0);
        assert!(!loaded.plot.enabled);
        assert_eq!(loaded.surface_factor, cfg.surface_factor);
    }

    #[test]
    fn test_from_file_preserves_last_bit() {
        let mut cfg = ScenarioConfig::default();
        cfg.surface_factor = 13.853560799951273;
        cfg.constants.lambda_b = 0.577_000_000_000_000_1e-10;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string(&cfg).unwrap().as_bytes())
            .unwrap();

        let loaded = ScenarioConfig::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(loaded.surface_factor.to_bits(), cfg.surface_factor.to_bits());
        assert_eq!(loaded.constants, cfg.constants);
    }

    #[test]
    fn test_from_file_missing_is_io_error() {
        let err = ScenarioConfig::from_file("/nonexistent/lenr_scenario.json").unwrap_err();
        assert!(matches!(err, LenrError::Io(_)));
    }

    #[test]
    fn test_invalid_bundle_rejected() {
        let json = r#"{ "bundle": { "base_dim": 20 } }"#;
        let cfg: ScenarioConfig = serde_json::from_str(json).unwrap();
        assert!(matches!(cfg.validate(), Err(LenrError::ConfigError(_))));

        let zero = BundleConfig::with_base_alpha(0.0);
        assert!(matches!(zero.validate(), Err(LenrError::NumericDomain(_))));
    }

    #[test]
    fn test_resolve_defaults_drive_to_midpoint() {
        let p = ResonanceParameters::new(10.0, 0.96);
        let r = p.resolve().unwrap();
        assert!((r.drive_frequency - 0.98).abs() < 1e-15);
        assert_eq!(r.damping, 0.01);
        assert_eq!(r.coupling, 0.1);
        assert_eq!(r.drive_amplitude, 0.1);
    }

    #[test]
    fn test_resolve_keeps_explicit_drive() {
        let p = ResonanceParameters {
            drive_frequency: Some(1.3),
            ..ResonanceParameters::new(1.0, 1.0)
        };
        assert_eq!(p.resolve().unwrap().drive_frequency, 1.3);
    }

    #[test]
    fn test_resolve_rejects_bad_values() {
        let nan = ResonanceParameters::new(1.0, f64::NAN);
        assert!(matches!(nan.resolve(), Err(LenrError::NumericDomain(_))));

        let negative_surface = ResonanceParameters::new(-1.0, 1.0);
        assert!(matches!(
            negative_surface.resolve(),
            Err(LenrError::NumericDomain(_))
        ));
    }
}
