//! Tail probabilities for the reference distributions used by the tests.
//!
//! Invalid parameters (zero degrees of freedom, non-finite statistics)
//! yield `NaN` instead of an error: a statistic that cannot be referred to
//! its distribution is reported, not fatal.
use statrs::distribution::{ChiSquared, ContinuousCDF, FisherSnedecor, Normal};

/// `P(χ²(df) > stat)`.
pub fn chi2_sf(stat: f64, df: f64) -> f64 {
    match ChiSquared::new(df) {
        Ok(dist) if stat.is_finite() => 1.0 - dist.cdf(stat),
        _ => f64::NAN,
    }
}

/// `P(F(df1, df2) > stat)`.
pub fn f_sf(stat: f64, df1: f64, df2: f64) -> f64 {
    match FisherSnedecor::new(df1, df2) {
        Ok(dist) if stat.is_finite() => 1.0 - dist.cdf(stat),
        _ => f64::NAN,
    }
}

/// Standard normal CDF.
pub fn std_normal_cdf(x: f64) -> f64 {
    match Normal::new(0.0, 1.0) {
        Ok(dist) => dist.cdf(x),
        Err(_) => f64::NAN,
    }
}
