//! Landed/attempted counts and the ratios printed next to them.

use crate::error::{ScrapeError, ScrapeResult};
use serde::Serialize;
use std::iter::Sum;
use std::ops::Add;

/// Maximum distance between a printed ratio and the one derived from its count
pub const RATIO_TOLERANCE: f64 = 0.1;

// Absorbs float error in differences such as 0.4 - 0.3
const EPSILON: f64 = 1e-9;

/// Round to two decimals
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A `landed of attempted` pair
///
/// `landed <= attempted` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Count {
    landed: u32,
    attempted: u32,
}

impl Count {
    pub const ZERO: Count = Count {
        landed: 0,
        attempted: 0,
    };

    pub fn new(landed: u32, attempted: u32) -> ScrapeResult<Self> {
        if landed > attempted {
            return Err(ScrapeError::consistency(format!(
                "landed ({}) exceeds attempted ({})",
                landed, attempted
            )));
        }
        Ok(Self { landed, attempted })
    }

    pub fn landed(&self) -> u32 {
        self.landed
    }

    pub fn attempted(&self) -> u32 {
        self.attempted
    }

    /// `landed / attempted` rounded to two decimals, or `None` when nothing was attempted
    pub fn ratio(&self) -> Option<f64> {
        (self.attempted > 0).then(|| round2(self.landed as f64 / self.attempted as f64))
    }

    /// Check a printed ratio against this count
    ///
    /// With zero attempts no ratio may be printed; otherwise the printed ratio
    /// must be present and within [`RATIO_TOLERANCE`] of the derived one.
    pub fn check_ratio(&self, field: &str, printed: Option<Ratio>) -> ScrapeResult<()> {
        match (self.ratio(), printed) {
            (None, None) => Ok(()),
            (None, Some(ratio)) => Err(ScrapeError::consistency(format!(
                "{}: ratio {} printed for zero attempts",
                field,
                ratio.value()
            ))),
            (Some(_), None) => Err(ScrapeError::consistency(format!(
                "{}: ratio missing for {} of {}",
                field, self.landed, self.attempted
            ))),
            (Some(derived), Some(ratio)) => {
                if (derived - ratio.value()).abs() <= RATIO_TOLERANCE + EPSILON {
                    Ok(())
                } else {
                    Err(ScrapeError::consistency(format!(
                        "{}: printed ratio {} does not match {} of {} ({})",
                        field,
                        ratio.value(),
                        self.landed,
                        self.attempted,
                        derived
                    )))
                }
            }
        }
    }
}

impl Add for Count {
    type Output = Count;

    fn add(self, other: Count) -> Count {
        // landed <= attempted is preserved by componentwise addition
        Count {
            landed: self.landed.saturating_add(other.landed),
            attempted: self.attempted.saturating_add(other.attempted),
        }
    }
}

impl Sum for Count {
    fn sum<I: Iterator<Item = Count>>(iter: I) -> Count {
        iter.fold(Count::ZERO, Add::add)
    }
}

impl std::fmt::Display for Count {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} of {}", self.landed, self.attempted)
    }
}

/// A value in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Ratio(f64);

impl Ratio {
    /// `percent / 100`, rejecting values above 100
    pub fn from_percent(percent: u32) -> Option<Self> {
        (percent <= 100).then(|| Self(percent as f64 / 100.0))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}
