use crate::error::TrialFailure;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The pair of metrics reported by one run of the localization filter.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Metrics {
    position_error: f64,
    anees: f64,
}

impl Metrics {
    /// Create a new `Metrics` pair.
    ///
    /// Panics if either value is negative or not finite.
    pub fn new(position_error: f64, anees: f64) -> Self {
        assert!(position_error.is_finite() && position_error >= 0.0);
        assert!(anees.is_finite() && anees >= 0.0);
        Self {
            position_error,
            anees,
        }
    }

    /// Mean Euclidean distance between the estimated and true position.
    pub fn position_error(&self) -> f64 {
        self.position_error
    }

    /// Average normalized estimation error squared.
    ///
    /// Near 1.0 when the filter's covariance matches its actual error.
    pub fn anees(&self) -> f64 {
        self.anees
    }

    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::PositionError => self.position_error,
            Metric::Anees => self.anees,
        }
    }
}

/// Selects one half of a `Metrics` pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Metric {
    PositionError,
    Anees,
}

impl Metric {
    pub fn label(&self) -> &'static str {
        match self {
            Metric::PositionError => "Mean Position Error",
            Metric::Anees => "ANEES",
        }
    }
}

/// The result of one trial: either both metrics or the reason there are none.
pub type TrialOutcome = Result<Metrics, TrialFailure>;
