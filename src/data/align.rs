//! align — upsample monthly inflation and inner-join every source by date.
//!
//! Key behaviors
//! -------------
//! - [`interpolate_daily`] fills every calendar day between consecutive
//!   observations by linear interpolation in day count. Days before the
//!   first or after the last observation are absent.
//! - [`align_sources`] turns prices into log returns and keeps only dates
//!   present in every series, so the panel has no missing cells.
//!
//! Invariants & assumptions
//! ------------------------
//! - The return on date `t` is `ln(P_t / P_{t−1})` over consecutive
//!   *price rows*, computed before the join. The first price date never
//!   appears in the panel.
use crate::{
    data::{
        errors::{DataError, DataResult},
        loader::RawSources,
        series::TimeSeries,
    },
    features::transform::log_returns,
};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The three macro covariates, in regressor order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Covariate {
    Kpi,
    ZeroCouponRate,
    UsdNokExchangeRate,
}

impl Covariate {
    pub const ALL: [Covariate; 3] =
        [Covariate::Kpi, Covariate::ZeroCouponRate, Covariate::UsdNokExchangeRate];

    pub fn name(&self) -> &'static str {
        match self {
            Covariate::Kpi => "kpi",
            Covariate::ZeroCouponRate => "zero_coupon_rate",
            Covariate::UsdNokExchangeRate => "usd_nok_exchange_rate",
        }
    }
}

impl fmt::Display for Covariate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Date-indexed table with one complete row per common date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedPanel {
    pub dates: Vec<NaiveDate>,
    pub log_return: Vec<f64>,
    pub zero_coupon_rate: Vec<f64>,
    pub usd_nok_exchange_rate: Vec<f64>,
    pub kpi: Vec<f64>,
}

impl AlignedPanel {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn covariate(&self, which: Covariate) -> &[f64] {
        match which {
            Covariate::Kpi => &self.kpi,
            Covariate::ZeroCouponRate => &self.zero_coupon_rate,
            Covariate::UsdNokExchangeRate => &self.usd_nok_exchange_rate,
        }
    }
}

/// Daily series by linear interpolation between observations.
///
/// # Errors
/// - Propagates [`TimeSeries::new`] failures (only reachable on a
///   malformed input series).
pub fn interpolate_daily(series: &TimeSeries) -> DataResult<TimeSeries> {
    let mut dates = Vec::new();
    let mut values = Vec::new();
    let obs: Vec<(NaiveDate, f64)> = series.iter().collect();
    for pair in obs.windows(2) {
        let ((d0, v0), (d1, v1)) = (pair[0], pair[1]);
        let span = (d1 - d0).num_days() as f64;
        let mut day = d0;
        while day < d1 {
            let frac = (day - d0).num_days() as f64 / span;
            dates.push(day);
            values.push(v0 + frac * (v1 - v0));
            day = match day.checked_add_days(Days::new(1)) {
                Some(next) => next,
                None => break,
            };
        }
    }
    if let Some(&(last_date, last_value)) = obs.last() {
        dates.push(last_date);
        values.push(last_value);
    }
    TimeSeries::new(series.name(), dates, values)
}

/// Build the aligned panel from raw sources.
///
/// # Errors
/// - `Alignment` when no date is shared by every source.
/// - Price problems surface as `Alignment` with the feature error text.
pub fn align_sources(raw: &RawSources) -> DataResult<AlignedPanel> {
    let returns = log_returns(&raw.prices)
        .map_err(|err| DataError::Alignment { detail: err.to_string() })?;
    let kpi_daily = interpolate_daily(&raw.kpi)?;
    let others = [&raw.zero_coupon_rate, &raw.usd_nok_exchange_rate, &kpi_daily];

    let mut panel = AlignedPanel {
        dates: Vec::new(),
        log_return: Vec::new(),
        zero_coupon_rate: Vec::new(),
        usd_nok_exchange_rate: Vec::new(),
        kpi: Vec::new(),
    };
    for (date, r) in returns.iter() {
        let row: Option<Vec<f64>> = others.iter().map(|s| s.get(date)).collect();
        if let Some(row) = row {
            panel.dates.push(date);
            panel.log_return.push(r);
            panel.zero_coupon_rate.push(row[0]);
            panel.usd_nok_exchange_rate.push(row[1]);
            panel.kpi.push(row[2]);
        }
    }

    if panel.is_empty() {
        return Err(DataError::Alignment {
            detail: format!(
                "no common dates between returns ({} .. {}), yields ({} .. {}), fx ({} .. {}) and kpi ({} .. {})",
                returns.first_date(),
                returns.last_date(),
                raw.zero_coupon_rate.first_date(),
                raw.zero_coupon_rate.last_date(),
                raw.usd_nok_exchange_rate.first_date(),
                raw.usd_nok_exchange_rate.last_date(),
                kpi_daily.first_date(),
                kpi_daily.last_date(),
            ),
        });
    }
    Ok(panel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Day-count interpolation without extrapolation.
    // - Panel dates equal the intersection of the sources.
    // - Empty intersections.
    // -------------------------------------------------------------------------

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn series(name: &str, obs: &[(NaiveDate, f64)]) -> TimeSeries {
        TimeSeries::from_unsorted(name, obs.to_vec()).unwrap()
    }

    #[test]
    // Purpose
    // -------
    // Monthly points are joined by straight lines in calendar days.
    //
    // Given
    // -----
    // - KPI 100 on 2020-01-01 and 131 on 2020-02-01 (31 days apart).
    //
    // Expect
    // ------
    // - 32 daily points, 101 on 2020-01-02, 115 on 2020-01-16, no points
    //   outside the observed range.
    fn interpolate_daily_is_linear_in_days() {
        // Arrange
        let kpi = series("kpi", &[(d(2020, 1, 1), 100.0), (d(2020, 2, 1), 131.0)]);

        // Act
        let daily = interpolate_daily(&kpi).unwrap();

        // Assert
        assert_eq!(daily.len(), 32);
        assert_relative_eq!(daily.get(d(2020, 1, 2)).unwrap(), 101.0, epsilon = 1e-12);
        assert_relative_eq!(daily.get(d(2020, 1, 16)).unwrap(), 115.0, epsilon = 1e-12);
        assert_eq!(daily.get(d(2019, 12, 31)), None);
        assert_eq!(daily.get(d(2020, 2, 2)), None);
    }

    #[test]
    // Purpose
    // -------
    // The panel keeps exactly the dates present everywhere and never the
    // first price date.
    //
    // Given
    // -----
    // - Prices on Jan 2, 3, 6, 7; yields missing Jan 6; FX on all days;
    //   KPI covering January.
    //
    // Expect
    // ------
    // - Panel dates [Jan 3, Jan 7]; the return on Jan 7 uses the Jan 6
    //   price.
    fn align_sources_is_an_inner_join() {
        // Arrange
        let days = [d(2020, 1, 2), d(2020, 1, 3), d(2020, 1, 6), d(2020, 1, 7)];
        let prices = series("prices", &[(days[0], 100.0), (days[1], 101.0), (days[2], 99.0), (days[3], 100.0)]);
        let yields = series("zcr", &[(days[0], 1.0), (days[1], 1.1), (days[3], 1.2)]);
        let fx = series("fx", &days.iter().map(|&x| (x, 9.0)).collect::<Vec<_>>());
        let kpi = series("kpi", &[(d(2020, 1, 1), 100.0), (d(2020, 2, 1), 101.0)]);
        let raw = RawSources {
            prices,
            zero_coupon_rate: yields,
            usd_nok_exchange_rate: fx,
            kpi,
            missing: vec![],
        };

        // Act
        let panel = align_sources(&raw).unwrap();

        // Assert
        assert_eq!(panel.dates, vec![d(2020, 1, 3), d(2020, 1, 7)]);
        assert_relative_eq!(panel.log_return[1], (100.0_f64 / 99.0).ln(), epsilon = 1e-12);
        assert_eq!(panel.zero_coupon_rate, vec![1.1, 1.2]);
    }

    #[test]
    // Purpose
    // -------
    // Disjoint sources produce a fatal alignment error.
    //
    // Given
    // -----
    // - Prices in 2020, KPI in 2010.
    //
    // Expect
    // ------
    // - `DataError::Alignment`.
    fn disjoint_sources_fail_alignment() {
        let days = [d(2020, 1, 2), d(2020, 1, 3)];
        let raw = RawSources {
            prices: series("prices", &[(days[0], 1.0), (days[1], 2.0)]),
            zero_coupon_rate: series("zcr", &[(days[1], 1.0)]),
            usd_nok_exchange_rate: series("fx", &[(days[1], 1.0)]),
            kpi: series("kpi", &[(d(2010, 1, 1), 1.0), (d(2010, 2, 1), 2.0)]),
            missing: vec![],
        };
        assert!(matches!(align_sources(&raw), Err(DataError::Alignment { .. })));
    }
}
