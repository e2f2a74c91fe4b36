// ─────────────────────────────────────────────────────────────────────
// LENR Nano-SAV — Topological Boost
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Bundle-inspired topological boost (proxy).
//!
//! A diagonal fiber_dim × fiber_dim matrix carries `base_alpha` on the first
//! `base_dim` entries and `1/base_alpha` on the rest. Its traceless part has
//! determinant `det`; the boost is `|det|^(1/fiber_dim)`, floored at 1.

use lenr_math::linalg::{det, diag_matrix, traceless};
use lenr_types::config::BundleConfig;
use lenr_types::error::{LenrError, LenrResult};
use ndarray::Array2;

/// The boost never reduces the screening coefficient.
pub const MIN_BUNDLE_BOOST: f64 = 1.0;

/// Diagonal matrix standing in for the fiber-bundle geometry.
#[derive(Debug, Clone)]
pub struct BoostMatrix {
    matrix: Array2<f64>,
}

impl BoostMatrix {
    pub fn new(cfg: &BundleConfig) -> LenrResult<Self> {
        cfg.validate()?;
        let fiber_only = cfg.fiber_dim - cfg.base_dim;
        let mut values = Vec::with_capacity(cfg.fiber_dim);
        values.extend(std::iter::repeat(cfg.base_alpha).take(cfg.base_dim));
        values.extend(std::iter::repeat(1.0 / cfg.base_alpha).take(fiber_only));
        Ok(BoostMatrix {
            matrix: diag_matrix(&values),
        })
    }

    pub fn matrix(&self) -> &Array2<f64> {
        &self.matrix
    }

    pub fn dim(&self) -> usize {
        self.matrix.nrows()
    }

    /// Determinant of the trace-subtracted matrix.
    pub fn traceless_determinant(&self) -> LenrResult<f64> {
        let tl = traceless(&self.matrix)?;
        det(&tl)
    }

    /// `max(1, |det(M_tl)|^(1/n))`.
    pub fn boost(&self) -> LenrResult<f64> {
        let d = self.traceless_determinant()?;
        let root = d.abs().powf(1.0 / self.dim() as f64);
        enforce_boost_floor(root)
    }
}

/// Apply the boost floor; a non-finite raw value is an error, not a boost.
pub fn enforce_boost_floor(raw: f64) -> LenrResult<f64> {
    if !raw.is_finite() {
        return Err(LenrError::NumericDomain(format!(
            "bundle boost evaluated to {raw}"
        )));
    }
    Ok(raw.max(MIN_BUNDLE_BOOST))
}

/// Topological boost for the given bundle construction.
pub fn bundle_alpha_boost(cfg: &BundleConfig) -> LenrResult<f64> {
    let boost = BoostMatrix::new(cfg)?.boost()?;
    log::debug!(
        "bundle boost: base_alpha={} fiber_dim={} base_dim={} -> {boost}",
        cfg.base_alpha,
        cfg.fiber_dim,
        cfg.base_dim
    );
    Ok(boost)
}
