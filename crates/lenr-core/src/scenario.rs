// ─────────────────────────────────────────────────────────────────────
// LENR Nano-SAV — Scenario
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! End-to-end nano scenario: bundle boost, barrier solve and detuning sweep.
//! The example trajectory used for the plot is a separate step, run once the
//! headline numbers are reported.

use crate::barrier::{solve_alpha_min, BarrierEquationInputs, BarrierSolution};
use crate::resonance::{ResonanceRun, ResonanceSimulator};
use crate::sweep::{run_detune_sweep, SweepReport};
use crate::topology::bundle_alpha_boost;
use lenr_types::config::ScenarioConfig;
use lenr_types::error::{LenrError, LenrResult};
use serde::Serialize;

pub const STAGE_BUNDLE_BOOST: &str = "bundle boost";
pub const STAGE_BARRIER_SOLVE: &str = "barrier solve";
pub const STAGE_DETUNING_SWEEP: &str = "detuning sweep";
pub const STAGE_EXAMPLE_TRAJECTORY: &str = "example trajectory";

#[derive(Debug, Clone)]
pub struct ScenarioReport {
    pub surface_factor: f64,
    pub bundle_boost: f64,
    pub barrier: BarrierSolution,
    pub sweep: SweepReport,
    pub max_rate_boost: f64,
}

impl ScenarioReport {
    pub fn alpha_min(&self) -> f64 {
        self.barrier.alpha_min
    }

    /// The three headline lines printed by the driver.
    pub fn summary_lines(&self) -> [String; 3] {
        [
            format!(
                "Nano-boosted alpha_min for barrier elimination: {:.2}",
                self.alpha_min()
            ),
            format!("Bundle boost factor: {:.2}", self.bundle_boost),
            format!(
                "Maximum resonance rate boost (nano): {:.1e}",
                self.max_rate_boost
            ),
        ]
    }

    pub fn summary(&self) -> ScenarioSummary<'_> {
        ScenarioSummary {
            surface_factor: self.surface_factor,
            alpha_min: self.alpha_min(),
            bundle_boost: self.bundle_boost,
            max_rate_boost: self.max_rate_boost,
            barrier: &self.barrier,
            sweep: &self.sweep,
        }
    }
}

/// Machine-readable view of a report, without the trajectory samples.
#[derive(Debug, Serialize)]
pub struct ScenarioSummary<'a> {
    pub surface_factor: f64,
    pub alpha_min: f64,
    pub bundle_boost: f64,
    pub max_rate_boost: f64,
    pub barrier: &'a BarrierSolution,
    pub sweep: &'a SweepReport,
}

/// Run the numeric stages of the scenario in order.
pub fn run_scenario(cfg: &ScenarioConfig) -> LenrResult<ScenarioReport> {
    cfg.validate()?;

    let bundle_boost =
        bundle_alpha_boost(&cfg.bundle).map_err(|e| e.in_stage(STAGE_BUNDLE_BOOST))?;

    let barrier = BarrierEquationInputs::new(cfg.surface_factor, bundle_boost)
        .and_then(|inputs| solve_alpha_min(&cfg.constants, &inputs, &cfg.barrier))
        .map_err(|e| e.in_stage(STAGE_BARRIER_SOLVE))?;

    let simulator = ResonanceSimulator::new(cfg.constants, cfg.integration)?;

    let sweep =
        run_detune_sweep(&simulator, cfg).map_err(|e| e.in_stage(STAGE_DETUNING_SWEEP))?;
    let max_rate_boost = sweep.max_rate_boost().ok_or_else(|| {
        LenrError::ConfigError("detuning sweep produced no points".to_string())
            .in_stage(STAGE_DETUNING_SWEEP)
    })?;

    log::info!(
        "scenario sf={}: alpha_min={:.4} bundle_boost={:.4} max_rate_boost={:.3e}",
        cfg.surface_factor,
        barrier.alpha_min,
        bundle_boost,
        max_rate_boost
    );

    Ok(ScenarioReport {
        surface_factor: cfg.surface_factor,
        bundle_boost,
        barrier,
        sweep,
        max_rate_boost,
    })
}

/// Integrate the run rendered as the example plot; `None` when plotting is
/// disabled.
pub fn run_example_trajectory(cfg: &ScenarioConfig) -> LenrResult<Option<ResonanceRun>> {
    if !cfg.plot.enabled {
        return Ok(None);
    }
    ResonanceSimulator::new(cfg.constants, cfg.integration)
        .and_then(|sim| sim.run(&cfg.resonance_at(cfg.plot.detune)))
        .map(Some)
        .map_err(|e| e.in_stage(STAGE_EXAMPLE_TRAJECTORY))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lenr_types::config::{BarrierConfig, IntegrationConfig, SweepConfig};
    use lenr_types::constants::PhysicalConstants;

    fn quick_config() -> ScenarioConfig {
        let mut cfg = ScenarioConfig::default();
        cfg.sweep = SweepConfig {
            n_points: 3,
            ..SweepConfig::default()
        };
        cfg
    }

    #[test]
    fn test_reference_scenario_summary() {
        let report = run_scenario(&ScenarioConfig::default()).unwrap();
        let [alpha, bundle, boost] = report.summary_lines();
        assert_eq!(alpha, "Nano-boosted alpha_min for barrier elimination: 0.11");
        assert_eq!(bundle, "Bundle boost factor: 1.00");
        assert_eq!(boost, "Maximum resonance rate boost (nano): 2.0e6");
        assert_eq!(report.sweep.len(), 20);
    }

    #[test]
    fn test_example_trajectory_at_plot_detune() {
        let example = run_example_trajectory(&ScenarioConfig::default())
            .unwrap()
            .unwrap();
        assert_eq!(example.params.detune, 1.0);
        assert_eq!(example.trajectory.len(), 20_000);
    }

    #[test]
    fn test_plot_disabled_skips_example() {
        let mut cfg = quick_config();
        cfg.plot.enabled = false;
        assert!(run_example_trajectory(&cfg).unwrap().is_none());
        assert_eq!(run_scenario(&cfg).unwrap().sweep.len(), 3);
    }

    #[test]
    fn test_example_failure_keeps_headline_numbers() {
        let mut cfg = quick_config();
        cfg.plot.detune = f64::NAN;
        let report = run_scenario(&cfg).unwrap();
        assert_eq!(
            report.summary_lines()[0],
            "Nano-boosted alpha_min for barrier elimination: 0.11"
        );

        let err = run_example_trajectory(&cfg).unwrap_err();
        assert!(
            matches!(err, LenrError::StageFailed { stage: STAGE_EXAMPLE_TRAJECTORY, .. }),
            "{err:?}"
        );
        assert!(matches!(err.root_cause(), LenrError::NumericDomain(_)));
    }

    #[test]
    fn test_summary_serializes() {
        let mut cfg = quick_config();
        cfg.plot.enabled = false;
        let report = run_scenario(&cfg).unwrap();
        let json = serde_json::to_value(report.summary()).unwrap();
        assert_eq!(json["bundle_boost"], 1.0);
        assert_eq!(json["sweep"]["points"].as_array().unwrap().len(), 3);
        assert!(json["alpha_min"].as_f64().unwrap() > 0.1);
    }

    #[test]
    fn test_barrier_failure_names_stage() {
        let mut cfg = quick_config();
        cfg.constants = PhysicalConstants {
            e_th: 10.0,
            ..PhysicalConstants::default()
        };
        let err = run_scenario(&cfg).unwrap_err();
        assert!(
            matches!(err, LenrError::StageFailed { stage: STAGE_BARRIER_SOLVE, .. }),
            "{err:?}"
        );
        assert!(matches!(
            err.root_cause(),
            LenrError::RootNotConverged { .. }
        ));
    }

    #[test]
    fn test_sweep_failure_names_stage_and_point() {
        let mut cfg = quick_config();
        cfg.integration = IntegrationConfig {
            max_steps: 10,
            ..IntegrationConfig::default()
        };
        let err = run_scenario(&cfg).unwrap_err();
        match &err {
            LenrError::StageFailed { stage, source } => {
                assert_eq!(*stage, STAGE_DETUNING_SWEEP);
                assert!(matches!(
                    **source,
                    LenrError::SweepPointFailed { detune, .. } if detune == 0.95
                ));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_config_rejected_up_front() {
        let mut cfg = quick_config();
        cfg.barrier = BarrierConfig {
            max_iterations: 0,
            ..BarrierConfig::default()
        };
        assert!(matches!(
            run_scenario(&cfg),
            Err(LenrError::ConfigError(_))
        ));
    }

    #[test]
    fn test_large_bundle_alpha_lowers_alpha_min() {
        let mut plain = quick_config();
        plain.plot.enabled = false;
        let mut boosted = plain.clone();
        boosted.bundle.base_alpha = 10.0;

        let a = run_scenario(&plain).unwrap();
        let b = run_scenario(&boosted).unwrap();
        assert!(b.bundle_boost > 3.6);
        assert!(b.alpha_min() < a.alpha_min());
        assert!((a.alpha_min() / b.alpha_min() - b.bundle_boost).abs() < 1e-6);
    }
}
