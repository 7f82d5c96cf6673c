use crate::{
    aggregate::ConfigurationAggregate,
    grid::{NoiseFactor, SweepConfig},
    metrics::{Metric, TrialOutcome},
    simulator::{Simulator, TrialParams},
};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// How the noise injected into the simulated data follows the sweep.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataNoise {
    /// Data noise stays at its nominal level; only the filter's assumption moves.
    Fixed,

    /// Data noise scales with the filter's assumption.
    Scaled,
}

/// One mode of a sweep.
#[derive(Clone, Debug, PartialEq)]
pub struct Variant {
    name: String,
    data_noise: DataNoise,
    num_particles: Option<u32>,
}

impl Variant {
    pub fn new(name: impl Into<String>, data_noise: DataNoise) -> Self {
        Self {
            name: name.into(),
            data_noise,
            num_particles: None,
        }
    }

    /// Data and filter noise both scale with r.
    pub fn data_and_filter(name: impl Into<String>) -> Self {
        Self::new(name, DataNoise::Scaled)
    }

    /// Only the filter's assumed noise scales with r.
    pub fn filter_only(name: impl Into<String>) -> Self {
        Self::new(name, DataNoise::Fixed)
    }

    pub fn with_particles(mut self, num_particles: u32) -> Self {
        self.num_particles = Some(num_particles);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn num_particles(&self) -> Option<u32> {
        self.num_particles
    }

    /// Returns the parameters for the trial with `seed` at noise factor `factor`.
    pub fn trial_params(&self, factor: NoiseFactor, seed: u64) -> TrialParams {
        let r = factor.into_inner();
        let data_factor = match self.data_noise {
            DataNoise::Fixed => 1.0,
            DataNoise::Scaled => r,
        };

        TrialParams {
            data_factor,
            filter_factor: r,
            seed,
            num_particles: self.num_particles,
        }
    }
}

/// The aggregates of one variant, index-aligned with the sweep's noise grid.
#[derive(Clone, Debug, PartialEq)]
pub struct Series {
    name: String,
    points: Vec<ConfigurationAggregate>,
}

impl Series {
    pub fn new(name: impl Into<String>, points: Vec<ConfigurationAggregate>) -> Self {
        Self {
            name: name.into(),
            points,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn points(&self) -> &[ConfigurationAggregate] {
        &self.points
    }

    pub fn factors(&self) -> Vec<f64> {
        self.points
            .iter()
            .map(|point| point.factor().into_inner())
            .collect()
    }

    /// The mean of `metric` at each noise factor, `None` where it is undefined.
    pub fn values(&self, metric: Metric) -> Vec<Option<f64>> {
        self.points
            .iter()
            .map(|point| point.mean().map(|mean| mean.get(metric)))
            .collect()
    }
}

/// One sweep per particle count, ordered by particle count.
pub type ParticleStudy = BTreeMap<u32, Series>;

/// Drives a simulator over every noise factor and seed of a configuration.
///
/// Trials run one after another on the calling thread.
pub struct Sweep<S> {
    config: SweepConfig,
    simulator: S,
}

impl<S: Simulator> Sweep<S> {
    pub fn new(config: SweepConfig, simulator: S) -> Self {
        Self { config, simulator }
    }

    /// Sweeps `variant` over the whole grid.
    pub fn run(&mut self, variant: &Variant) -> Series {
        let factors = self.config.grid.factors().to_vec();
        let points = factors
            .into_iter()
            .map(|factor| self.run_configuration(variant, factor))
            .collect();

        Series::new(variant.name(), points)
    }

    /// Sweeps `variant` once per entry of `particle_counts`.
    ///
    /// Each series is named after its particle count.
    pub fn run_particle_study(
        &mut self,
        variant: &Variant,
        particle_counts: &[u32],
    ) -> ParticleStudy {
        particle_counts
            .iter()
            .map(|&count| {
                let variant = variant
                    .clone()
                    .with_particles(count)
                    .with_name(format!("{count} particles"));
                (count, self.run(&variant))
            })
            .collect()
    }

    fn run_configuration(
        &mut self,
        variant: &Variant,
        factor: NoiseFactor,
    ) -> ConfigurationAggregate {
        info!(
            variant = variant.name(),
            noise_factor = factor.into_inner(),
            particles = variant.num_particles(),
            "running trials"
        );

        let outcomes: Vec<TrialOutcome> = self
            .config
            .seeds()
            .map(|seed| {
                let params = variant.trial_params(factor, seed);
                debug!(?params, "dispatching trial");

                let outcome = self.simulator.run(&params);
                if let Err(failure) = &outcome {
                    warn!(
                        seed,
                        raw = failure.raw_output().unwrap_or_default(),
                        "dropping failed trial: {failure}"
                    );
                }
                outcome
            })
            .collect();

        let aggregate = ConfigurationAggregate::from_outcomes(factor, &outcomes);
        if aggregate.is_undefined() {
            warn!(
                variant = variant.name(),
                noise_factor = factor.into_inner(),
                attempts = aggregate.attempts(),
                "every trial failed, mean is undefined"
            );
        }

        aggregate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_data_noise_stays_nominal() {
        let params = Variant::filter_only("c").trial_params(NoiseFactor::new(16.0), 7);

        assert_eq!(params.data_factor, 1.0);
        assert_eq!(params.filter_factor, 16.0);
        assert_eq!(params.seed, 7);
        assert_eq!(params.num_particles, None);
    }

    #[test]
    fn scaled_data_noise_follows_factor() {
        let params = Variant::data_and_filter("b")
            .with_particles(100)
            .trial_params(NoiseFactor::new(0.25), 0);

        assert_eq!(params.data_factor, 0.25);
        assert_eq!(params.filter_factor, 0.25);
        assert_eq!(params.num_particles, Some(100));
    }
}
