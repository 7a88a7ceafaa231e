//! ARIMA order `(p, d, q)` and the candidate grid.
use crate::arimax::errors::{ArimaxError, ArimaxResult};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ArimaOrder {
    pub p: usize,
    pub d: usize,
    pub q: usize,
}

impl ArimaOrder {
    /// # Errors
    /// `InvalidOrder` for `d ≠ 0`.
    pub fn new(p: usize, d: usize, q: usize) -> ArimaxResult<Self> {
        if d != 0 {
            return Err(ArimaxError::InvalidOrder { p, d, q });
        }
        Ok(Self { p, d, q })
    }

    /// Every `(p, 0, q)` with `p ≤ max_p`, `q ≤ max_q`, p-major.
    pub fn grid(max_p: usize, max_q: usize) -> Vec<ArimaOrder> {
        (0..=max_p).flat_map(|p| (0..=max_q).map(move |q| ArimaOrder { p, d: 0, q })).collect()
    }

    /// Kalman state dimension `max(p, q + 1)`.
    pub fn state_dim(&self) -> usize {
        self.p.max(self.q + 1)
    }
}

impl fmt::Display for ArimaOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.p, self.d, self.q)
    }
}
