use crate::{
    error::Error,
    grid::NoiseFactor,
    metrics::{Metrics, TrialOutcome},
};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Averages both metrics over the successful outcomes.
///
/// Failed outcomes are excluded from the mean and from the count alike.
/// Returns [`Error::AggregationUndefined`] when nothing succeeded.
pub fn mean(outcomes: &[TrialOutcome]) -> Result<Metrics, Error> {
    // Running means stay within the range of their inputs.
    let (count, position_error, anees) = outcomes
        .iter()
        .filter_map(|outcome| outcome.as_ref().ok())
        .fold((0usize, 0.0, 0.0), |(n, e, a), metrics| {
            let k = (n + 1) as f64;
            (
                n + 1,
                e + (metrics.position_error() - e) / k,
                a + (metrics.anees() - a) / k,
            )
        });

    if count == 0 {
        return Err(Error::AggregationUndefined {
            attempts: outcomes.len(),
        });
    }

    Ok(Metrics::new(position_error, anees))
}

/// The aggregated result of every trial run at one noise factor.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConfigurationAggregate {
    factor: NoiseFactor,
    attempts: usize,
    successes: usize,

    /// `None` when no trial succeeded.
    mean: Option<Metrics>,
}

impl ConfigurationAggregate {
    pub fn from_outcomes(factor: NoiseFactor, outcomes: &[TrialOutcome]) -> Self {
        Self {
            factor,
            attempts: outcomes.len(),
            successes: outcomes.iter().filter(|outcome| outcome.is_ok()).count(),
            mean: mean(outcomes).ok(),
        }
    }

    pub fn factor(&self) -> NoiseFactor {
        self.factor
    }

    pub fn attempts(&self) -> usize {
        self.attempts
    }

    pub fn successes(&self) -> usize {
        self.successes
    }

    pub fn mean(&self) -> Option<Metrics> {
        self.mean
    }

    pub fn is_undefined(&self) -> bool {
        self.mean.is_none()
    }
}
