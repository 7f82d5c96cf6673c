use crate::{error::TrialFailure, metrics::TrialOutcome, parse::parse};
use std::{ffi::OsString, fmt, process::Command};
use tracing::debug;

/// Parameters for a single run of the localization filter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrialParams {
    /// Scales the noise injected into the simulated data.
    pub data_factor: f64,

    /// Scales the noise the filter assumes.
    pub filter_factor: f64,
    pub seed: u64,

    /// Only meaningful for particle filters.
    pub num_particles: Option<u32>,
}

/// Runs one trial of a localization filter.
pub trait Simulator {
    fn run(&mut self, params: &TrialParams) -> TrialOutcome;
}

impl<S: Simulator + ?Sized> Simulator for &mut S {
    fn run(&mut self, params: &TrialParams) -> TrialOutcome {
        (**self).run(params)
    }
}

/// Which filter the external program should run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterKind {
    Ekf,
    Pf,
}

impl FilterKind {
    pub fn identifier(&self) -> &'static str {
        match self {
            FilterKind::Ekf => "ekf",
            FilterKind::Pf => "pf",
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier())
    }
}

/// Runs trials by spawning the external localization program.
///
/// Each call to [`Simulator::run`] spawns exactly one process and blocks
/// until it exits. There is no timeout, so a program that never exits stalls
/// the caller.
#[derive(Clone, Debug)]
pub struct ProcessSimulator {
    program: OsString,
    leading_args: Vec<OsString>,
    filter: FilterKind,
}

impl ProcessSimulator {
    pub fn new(program: impl Into<OsString>, filter: FilterKind) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
            filter,
        }
    }

    /// Invokes `python localization.py <filter>` from the working directory.
    pub fn python(filter: FilterKind) -> Self {
        Self::new("python", filter).arg("localization.py")
    }

    /// Appends an argument placed before the filter identifier.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.leading_args.push(arg.into());
        self
    }

    /// Builds the command line for one trial.
    pub fn command(&self, params: &TrialParams) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.leading_args)
            .arg(self.filter.identifier())
            .arg("--data-factor")
            .arg(params.data_factor.to_string())
            .arg("--filter-factor")
            .arg(params.filter_factor.to_string())
            .arg("--seed")
            .arg(params.seed.to_string());

        if let Some(num_particles) = params.num_particles {
            command
                .arg("--num-particles")
                .arg(num_particles.to_string());
        }

        command
    }

    /// Runs the program to completion and returns its standard output.
    ///
    /// A non-zero exit status is not an error here; whatever the program
    /// printed is returned and left for the parser to judge.
    pub fn run_trial(&self, params: &TrialParams) -> Result<String, TrialFailure> {
        let output = self
            .command(params)
            .output()
            .map_err(|err| TrialFailure::Invocation {
                reason: format!("{}: {err}", self.program.to_string_lossy()),
            })?;

        if !output.status.success() {
            debug!(
                status = %output.status,
                stderr = %String::from_utf8_lossy(&output.stderr),
                "simulator exited unsuccessfully"
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Simulator for ProcessSimulator {
    fn run(&mut self, params: &TrialParams) -> TrialOutcome {
        parse(&self.run_trial(params)?)
    }
}
