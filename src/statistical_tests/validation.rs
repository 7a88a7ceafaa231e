//! Input guards shared by the diagnostic tests.
use crate::statistical_tests::errors::{TestError, TestResult};

/// Require `data.len() >= needed` and every value finite.
pub fn validate_series(data: &[f64], needed: usize) -> TestResult<()> {
    if data.len() < needed {
        return Err(TestError::InsufficientData { needed, found: data.len() });
    }
    if let Some((index, &value)) = data.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(TestError::NonFiniteData { index, value });
    }
    Ok(())
}

/// Require `1 ≤ lag < n`.
pub fn validate_lag(lag: usize, n: usize) -> TestResult<()> {
    if lag == 0 || lag >= n {
        return Err(TestError::InvalidLag { lag, n });
    }
    Ok(())
}

/// Require a strictly positive, finite tuning constant.
pub fn validate_positive(name: &'static str, value: f64) -> TestResult<()> {
    if !(value.is_finite() && value > 0.0) {
        return Err(TestError::InvalidTuning { name, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // Each guard's accept path and every rejection branch.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Well-formed inputs pass all guards.
    //
    // Given
    // -----
    // - A finite length-3 series, lag 2, q = 3.
    //
    // Expect
    // ------
    // - `Ok(())` everywhere.
    fn valid_inputs_pass() {
        assert!(validate_series(&[0.1, -0.2, 0.3], 2).is_ok());
        assert!(validate_lag(2, 3).is_ok());
        assert!(validate_positive("q", 3.0).is_ok());
    }

    #[test]
    // Purpose
    // -------
    // Each rejection branch reports its own variant.
    //
    // Given
    // -----
    // - A too-short series, a NaN entry, lags 0 and n, q = 0.
    //
    // Expect
    // ------
    // - InsufficientData, NonFiniteData at index 1, InvalidLag twice,
    //   InvalidTuning.
    fn invalid_inputs_are_rejected() {
        assert_eq!(
            validate_series(&[1.0], 2),
            Err(TestError::InsufficientData { needed: 2, found: 1 })
        );
        assert!(matches!(
            validate_series(&[1.0, f64::NAN, 2.0], 2),
            Err(TestError::NonFiniteData { index: 1, .. })
        ));
        assert!(matches!(validate_lag(0, 5), Err(TestError::InvalidLag { .. })));
        assert!(matches!(validate_lag(5, 5), Err(TestError::InvalidLag { .. })));
        assert!(matches!(validate_positive("q", 0.0), Err(TestError::InvalidTuning { .. })));
    }
}
