// ─────────────────────────────────────────────────────────────────────
// LENR Nano-SAV — Constants
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use serde::{Deserialize, Serialize};

/// Fixed D-D separation inside a surface-adsorbed vacancy (m).
pub const R_DD_M: f64 = 2.75e-10;

/// Bulk Thomas-Fermi screening length (m).
pub const LAMBDA_BULK_M: f64 = 0.577e-10;

/// Thermal energy at 300 K (eV), 38.8 meV.
pub const E_THERMAL_EV: f64 = 0.0388;

/// Scaling length for the dimensionless oscillation amplitude (m).
pub const X0_M: f64 = 0.1e-10;

/// Approximate lattice vibration frequency (rad/s).
pub const OMEGA0_RAD_S: f64 = 1e14;

/// Coulomb coupling e²/(4πε₀) in eV·m (1.44 eV·nm).
pub const COULOMB_EV_M: f64 = 1.44e-9;

/// Smallest physical D-D separation (m), about 0.1 Å.
pub const SEPARATION_FLOOR_M: f64 = 0.1e-10;

/// Metres to Ångström.
pub const M_TO_ANGSTROM: f64 = 1e10;

/// Seconds to picoseconds.
pub const S_TO_PS: f64 = 1e12;

/// Read-only physical constant table handed to every component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicalConstants {
    pub r_dd: f64,
    pub lambda_b: f64,
    pub e_th: f64,
    pub x_0: f64,
    pub omega_0: f64,
    pub coulomb_ev_m: f64,
    pub separation_floor: f64,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        PhysicalConstants {
            r_dd: R_DD_M,
            lambda_b: LAMBDA_BULK_M,
            e_th: E_THERMAL_EV,
            x_0: X0_M,
            omega_0: OMEGA0_RAD_S,
            coulomb_ev_m: COULOMB_EV_M,
            separation_floor: SEPARATION_FLOOR_M,
        }
    }
}

impl PhysicalConstants {
    /// Unscreened Coulomb barrier at `r_dd` (eV).
    pub fn bare_barrier_ev(&self) -> f64 {
        self.coulomb_ev_m / self.r_dd
    }

    /// Reject tables that would poison downstream arithmetic.
    pub fn validate(&self) -> crate::error::LenrResult<()> {
        let fields = [
            ("r_dd", self.r_dd),
            ("lambda_b", self.lambda_b),
            ("e_th", self.e_th),
            ("x_0", self.x_0),
            ("omega_0", self.omega_0),
            ("coulomb_ev_m", self.coulomb_ev_m),
            ("separation_floor", self.separation_floor),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(crate::error::LenrError::NumericDomain(format!(
                    "physical constant {name} must be finite and positive, got {value}"
                )));
            }
        }
        Ok(())
    }
}
