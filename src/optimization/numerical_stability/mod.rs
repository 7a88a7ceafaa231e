//! numerical_stability — shared tolerances and small matrix guards.
//!
//! Purpose
//! -------
//! Keep the handful of numeric thresholds used across estimation,
//! inference, and filtering in one place so that every module agrees on
//! what "numerically zero" or "too close to a unit root" means.
//!
//! Conventions
//! -----------
//! - Thresholds are absolute unless documented otherwise.
//! - Helpers operate in place on `ndarray` containers and never allocate.
use ndarray::Array2;

/// Margin kept below one when an AR(1) coefficient is treated as stationary.
pub const STATIONARITY_MARGIN: f64 = 1e-6;

/// Eigenvalues at or below this value are discarded by pseudo-inverses.
pub const EIGEN_EPS: f64 = 1e-10;

/// Generic "numerically zero" cutoff for denominators and variances.
pub const GENERAL_TOL: f64 = 1e-12;

/// Relative cutoff on the scaled Gram matrix spectrum below which a design
/// is treated as rank deficient.
pub const RANK_TOL: f64 = 1e-12;

/// Replace each off-diagonal pair by its average.
///
/// The diagonal is left untouched; the caller guarantees a square matrix.
pub fn symmetrize(mat: &mut Array2<f64>) {
    for i in 0..mat.nrows() {
        for j in 0..i {
            let avg = 0.5 * (mat[[i, j]] + mat[[j, i]]);
            mat[[i, j]] = avg;
            mat[[j, i]] = avg;
        }
    }
}

/// Largest absolute entry, or `NaN` if any entry is not finite.
pub fn max_abs(mat: &Array2<f64>) -> f64 {
    let mut largest = 0.0_f64;
    for &v in mat.iter() {
        if !v.is_finite() {
            return f64::NAN;
        }
        largest = largest.max(v.abs());
    }
    largest
}
