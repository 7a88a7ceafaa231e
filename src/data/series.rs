//! series — a named, strictly date-ordered series of finite values.
use crate::data::errors::{DataError, DataResult};
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    name: String,
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl TimeSeries {
    /// Build from already-ordered observations.
    ///
    /// # Errors
    /// - `EmptySeries`, `LengthMismatch`, `UnsortedDates` (also covers
    ///   equal neighbours), `NonFiniteValue`.
    pub fn new(name: impl Into<String>, dates: Vec<NaiveDate>, values: Vec<f64>) -> DataResult<Self> {
        let name = name.into();
        if dates.len() != values.len() {
            return Err(DataError::LengthMismatch {
                series: name,
                dates: dates.len(),
                values: values.len(),
            });
        }
        if dates.is_empty() {
            return Err(DataError::EmptySeries { series: name });
        }
        if let Some(i) = dates.windows(2).position(|w| w[0] >= w[1]) {
            return Err(DataError::UnsortedDates { series: name, index: i + 1 });
        }
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(DataError::NonFiniteValue { series: name, index, value: values[index] });
        }
        Ok(Self { name, dates, values })
    }

    /// Sort `(date, value)` pairs by date, then validate.
    ///
    /// # Errors
    /// - `DuplicateDate` if two observations share a date.
    /// - Anything [`TimeSeries::new`] reports.
    pub fn from_unsorted(name: impl Into<String>, mut obs: Vec<(NaiveDate, f64)>) -> DataResult<Self> {
        let name = name.into();
        obs.sort_by_key(|(d, _)| *d);
        if let Some(w) = obs.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(DataError::DuplicateDate { series: name, date: w[0].0 });
        }
        let (dates, values) = obs.into_iter().unzip();
        Self::new(name, dates, values)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn first_date(&self) -> NaiveDate {
        self.dates[0]
    }

    pub fn last_date(&self) -> NaiveDate {
        self.dates[self.dates.len() - 1]
    }

    /// Value on `date`, if observed.
    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.dates.binary_search(&date).ok().map(|i| self.values[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates.iter().copied().zip(self.values.iter().copied())
    }
}
