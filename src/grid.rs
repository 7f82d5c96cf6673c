use crate::error::Error;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Multiplier applied to the noise covariance assumed by the filter.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NoiseFactor {
    value: f64,
}

impl NoiseFactor {
    /// Create a new `NoiseFactor` from `value`.
    ///
    /// Panics if `value` is not positive and finite.
    pub fn new(value: f64) -> Self {
        assert!(value.is_finite() && value > 0.0);
        Self { value }
    }

    pub fn into_inner(self) -> f64 {
        self.value
    }
}

impl TryFrom<f64> for NoiseFactor {
    type Error = Error;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !(value.is_finite() && value > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "noise factor {value} is not a positive finite number"
            )));
        }

        Ok(Self { value })
    }
}

/// The ordered noise factors visited by every variant of a sweep.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "Vec<f64>", into = "Vec<f64>")
)]
pub struct NoiseGrid {
    factors: Vec<NoiseFactor>,
}

impl NoiseGrid {
    /// Creates a grid of `len` factors `start, start * ratio, start * ratio^2, ...`.
    pub fn geometric(start: f64, ratio: f64, len: usize) -> Result<Self, Error> {
        let len = i32::try_from(len)
            .map_err(|_| Error::InvalidConfig(format!("noise grid of {len} factors is too long")))?;
        let factors: Vec<f64> = (0..len).map(|i| start * ratio.powi(i)).collect();
        Self::try_from(factors)
    }

    pub fn factors(&self) -> &[NoiseFactor] {
        &self.factors
    }

    pub fn len(&self) -> usize {
        self.factors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }
}

impl Default for NoiseGrid {
    /// Four orders of magnitude either side of the nominal noise: 1/64 up to 64.
    fn default() -> Self {
        Self {
            factors: (0..7)
                .map(|i| NoiseFactor::new(4f64.powi(i - 3)))
                .collect(),
        }
    }
}

impl TryFrom<Vec<f64>> for NoiseGrid {
    type Error = Error;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        if values.is_empty() {
            return Err(Error::InvalidConfig("noise grid is empty".into()));
        }

        let factors = values
            .into_iter()
            .map(NoiseFactor::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { factors })
    }
}

impl From<NoiseGrid> for Vec<f64> {
    fn from(grid: NoiseGrid) -> Self {
        grid.factors.into_iter().map(NoiseFactor::into_inner).collect()
    }
}

/// Everything a sweep needs to know besides the variant being swept.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SweepConfig {
    pub grid: NoiseGrid,

    /// Trials per noise factor. Trial `i` runs with seed `i`.
    pub repeats: u32,
}

impl SweepConfig {
    pub fn new(grid: NoiseGrid, repeats: u32) -> Result<Self, Error> {
        let config = Self { grid, repeats };
        config.validate()?;
        Ok(config)
    }

    /// Checks invariants that deserialization cannot enforce on its own.
    pub fn validate(&self) -> Result<(), Error> {
        if self.repeats == 0 {
            return Err(Error::InvalidConfig("repeats must be at least 1".into()));
        }

        Ok(())
    }

    pub fn seeds(&self) -> Range<u64> {
        0..u64::from(self.repeats)
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            grid: NoiseGrid::default(),
            repeats: 10,
        }
    }
}
