// ─────────────────────────────────────────────────────────────────────
// LENR Nano-SAV — Detuning Sweep
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Parameter scan over the detuning of the second oscillator.
//!
//! Points run in order; the first failure aborts the scan and names the
//! detuning value that caused it.

use crate::resonance::ResonanceSimulator;
use lenr_types::config::{ScenarioConfig, SweepConfig};
use lenr_types::error::{LenrError, LenrResult};
use lenr_types::state::SimulationResult;
use ndarray::Array1;
use serde::Serialize;

/// One evaluated detuning value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SweepPoint {
    pub detune: f64,
    pub result: SimulationResult,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SweepReport {
    pub points: Vec<SweepPoint>,
}

impl SweepReport {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Largest rate enhancement of the scan; `None` for an empty scan.
    pub fn max_rate_boost(&self) -> Option<f64> {
        self.points
            .iter()
            .map(|p| p.result.rate_boost)
            .reduce(f64::max)
    }

    /// Detuning at which D1 swings furthest.
    pub fn peak_amplitude_detune(&self) -> Option<f64> {
        self.points
            .iter()
            .reduce(|best, p| {
                if p.result.peak_amplitude_m > best.result.peak_amplitude_m {
                    p
                } else {
                    best
                }
            })
            .map(|p| p.detune)
    }
}

/// Evenly spaced detuning values, endpoints included.
pub fn detune_grid(cfg: &SweepConfig) -> LenrResult<Array1<f64>> {
    cfg.validate()?;
    if cfg.n_points == 1 {
        return Ok(Array1::from(vec![cfg.detune_min]));
    }
    Ok(Array1::linspace(cfg.detune_min, cfg.detune_max, cfg.n_points))
}

/// Simulate every detuning of the scenario's sweep.
pub fn run_detune_sweep(
    simulator: &ResonanceSimulator,
    scenario: &ScenarioConfig,
) -> LenrResult<SweepReport> {
    let grid = detune_grid(&scenario.sweep)?;
    let mut points = Vec::with_capacity(grid.len());

    for &detune in grid.iter() {
        let run = simulator
            .run(&scenario.resonance_at(detune))
            .map_err(|e| LenrError::SweepPointFailed {
                detune,
                source: Box::new(e),
            })?;
        log::debug!(
            "sweep detune={detune:.4}: peak={:.4} Å boost={:.3e}",
            run.result.peak_amplitude_angstrom(),
            run.result.rate_boost
        );
        points.push(SweepPoint {
            detune,
            result: run.result,
        });
    }

    Ok(SweepReport { points })
}
