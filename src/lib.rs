//! Noise Mismatch Sweeps for Localization Filters
//!
//! Runs an external localization filter over a grid of noise scaling factors,
//! averages its mean position error and ANEES over seeded repeats, and plots
//! how each sweep variant degrades as the assumed noise drifts from the truth.

#[allow(missing_docs)]
pub mod error;

pub mod aggregate;
pub mod grid;
pub mod metrics;
pub mod parse;
pub mod report;
pub mod simulator;
pub mod sweep;

pub mod prelude {
    pub use crate::{
        aggregate::{ConfigurationAggregate, mean},
        error::{Error, TrialFailure},
        grid::{NoiseFactor, NoiseGrid, SweepConfig},
        metrics::{Metric, Metrics, TrialOutcome},
        parse::parse,
        report::{Canvas, Figure, Panel, PlotCanvas, Report},
        simulator::{FilterKind, ProcessSimulator, Simulator, TrialParams},
        sweep::{DataNoise, ParticleStudy, Series, Sweep, Variant},
    };
}
