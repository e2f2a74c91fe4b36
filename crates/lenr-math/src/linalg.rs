//! Linear algebra utilities.
//!
//! Diagonal construction, trace, traceless projection and an LU determinant
//! for the small dense matrices of the bundle construction.

use lenr_types::error::{LenrError, LenrResult};
use ndarray::{Array1, Array2};

/// Square matrix with `values` on the diagonal.
pub fn diag_matrix(values: &[f64]) -> Array2<f64> {
    Array2::from_diag(&Array1::from(values.to_vec()))
}

fn ensure_square(a: &Array2<f64>) -> LenrResult<usize> {
    let (m, n) = a.dim();
    if m != n {
        return Err(LenrError::LinAlg(format!(
            "expected a square matrix, got {m}x{n}"
        )));
    }
    Ok(n)
}

/// Sum of the diagonal.
pub fn trace(a: &Array2<f64>) -> LenrResult<f64> {
    ensure_square(a)?;
    Ok(a.diag().sum())
}

/// `A - (tr A / n)·I`.
pub fn traceless(a: &Array2<f64>) -> LenrResult<Array2<f64>> {
    let n = ensure_square(a)?;
    if n == 0 {
        return Ok(a.clone());
    }
    let shift = trace(a)? / n as f64;
    let mut out = a.clone();
    for i in 0..n {
        out[[i, i]] -= shift;
    }
    Ok(out)
}

/// Determinant by LU decomposition with partial pivoting.
///
/// For a diagonal matrix no row is swapped and every multiplier is zero, so
/// the result is exactly the product of the diagonal. The empty matrix has
/// determinant 1.
pub fn det(a: &Array2<f64>) -> LenrResult<f64> {
    let n = ensure_square(a)?;
    if a.iter().any(|v| !v.is_finite()) {
        return Err(LenrError::LinAlg(
            "matrix contains non-finite entries".to_string(),
        ));
    }

    let mut lu = a.clone();
    let mut det = 1.0;

    for k in 0..n {
        // Pivot: largest magnitude in column k at or below the diagonal
        let mut pivot_row = k;
        let mut pivot_mag = lu[[k, k]].abs();
        for r in (k + 1)..n {
            let mag = lu[[r, k]].abs();
            if mag > pivot_mag {
                pivot_mag = mag;
                pivot_row = r;
            }
        }

        if pivot_mag == 0.0 {
            return Ok(0.0);
        }

        if pivot_row != k {
            for c in 0..n {
                lu.swap([k, c], [pivot_row, c]);
            }
            det = -det;
        }

        let pivot = lu[[k, k]];
        det *= pivot;

        for r in (k + 1)..n {
            let factor = lu[[r, k]] / pivot;
            if factor == 0.0 {
                continue;
            }
            for c in (k + 1)..n {
                lu[[r, c]] -= factor * lu[[k, c]];
            }
            lu[[r, k]] = 0.0;
        }
    }

    Ok(det)
}
