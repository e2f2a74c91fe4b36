// ─────────────────────────────────────────────────────────────────────
// LENR Nano-SAV — State
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::constants::M_TO_ANGSTROM;
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// Dimensionless phase-space state of the two coupled deuterons.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OscillatorState {
    pub x1: f64,
    pub v1: f64,
    pub x2: f64,
    pub v2: f64,
}

impl OscillatorState {
    /// D1 displaced by one length unit, everything else at rest.
    pub const INITIAL: OscillatorState = OscillatorState {
        x1: 1.0,
        v1: 0.0,
        x2: 0.0,
        v2: 0.0,
    };

    pub fn to_array(self) -> [f64; 4] {
        [self.x1, self.v1, self.x2, self.v2]
    }

    pub fn from_array(y: [f64; 4]) -> Self {
        OscillatorState {
            x1: y[0],
            v1: y[1],
            x2: y[2],
            v2: y[3],
        }
    }

    /// Dimensionless separation |X1 - X2|.
    pub fn separation(&self) -> f64 {
        (self.x1 - self.x2).abs()
    }
}

/// Column layout of [`Trajectory::states`].
pub const COL_X1: usize = 0;
pub const COL_V1: usize = 1;
pub const COL_X2: usize = 2;
pub const COL_V2: usize = 3;

/// Sampled solution of the oscillator ODE.
/// `states` is [n_samples, 4] with columns (X1, V1, X2, V2).
#[derive(Debug, Clone)]
pub struct Trajectory {
    pub tau: Array1<f64>,
    pub states: Array2<f64>,
}

impl Trajectory {
    pub fn len(&self) -> usize {
        self.tau.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tau.is_empty()
    }

    pub fn x1(&self) -> ArrayView1<'_, f64> {
        self.states.column(COL_X1)
    }

    pub fn x2(&self) -> ArrayView1<'_, f64> {
        self.states.column(COL_X2)
    }

    pub fn state(&self, index: usize) -> Option<OscillatorState> {
        if index >= self.len() {
            return None;
        }
        let row = self.states.row(index);
        Some(OscillatorState {
            x1: row[COL_X1],
            v1: row[COL_V1],
            x2: row[COL_X2],
            v2: row[COL_V2],
        })
    }
}

/// Scalars derived from one completed resonance trajectory.
///
/// Lengths are stored in metres; the Å accessors give the reporting units.
/// `effective_min_separation_m` never drops below the physical floor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub peak_amplitude_m: f64,
    pub raw_min_separation_m: f64,
    pub effective_min_separation_m: f64,
    pub screening_length_m: f64,
    pub rate_boost: f64,
}

impl SimulationResult {
    pub fn peak_amplitude_angstrom(&self) -> f64 {
        self.peak_amplitude_m * M_TO_ANGSTROM
    }

    pub fn effective_min_separation_angstrom(&self) -> f64 {
        self.effective_min_separation_m * M_TO_ANGSTROM
    }

    /// True when the raw trajectory minimum was lifted to the floor.
    pub fn separation_clamped(&self) -> bool {
        self.raw_min_separation_m < self.effective_min_separation_m
    }
}
