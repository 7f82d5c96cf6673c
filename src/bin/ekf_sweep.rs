use clap::Parser;
use mismatch::prelude::*;
use std::{
    error::Error,
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};
use tracing::info;

/// Sweeps the EKF over noise scaling factors with and without scaled data noise.
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// JSON sweep configuration. Defaults to 1/64..64 with 10 repeats.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory figures and summaries are written to.
    #[arg(long, default_value = "results")]
    results_dir: PathBuf,

    /// Interpreter used to run the localization script.
    #[arg(long, default_value = "python")]
    program: String,

    /// Localization script passed to the interpreter.
    #[arg(long, default_value = "localization.py")]
    script: PathBuf,
}

fn main() -> Result<(), Box<dyn Error>> {
    // Register an event subscriber that prints events to STDOUT.
    let subscriber = tracing_subscriber::FmtSubscriber::new();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => read_config(path)?,
        None => SweepConfig::default(),
    };

    let simulator = ProcessSimulator::new(&args.program, FilterKind::Ekf).arg(&args.script);
    let mut sweep = Sweep::new(config, simulator);

    info!("vary both data and filter noise");
    let both = sweep.run(&Variant::data_and_filter("Data & filter noise vary"));

    info!("fix data noise, vary only filter noise");
    let filter_only = sweep.run(&Variant::filter_only("Filter noise only"));

    let report = Report::create(&args.results_dir)?;
    let figure = Figure::comparison("ekf_experiment_results.png", &[&both, &filter_only])?;
    report.persist(&figure, &PlotCanvas::default())?;
    report.persist_summary("ekf_experiment_results.csv", &[&both, &filter_only])?;

    Ok(())
}

fn read_config(path: &Path) -> Result<SweepConfig, Box<dyn Error>> {
    let mut serialized = String::new();
    File::open(path)?.read_to_string(&mut serialized)?;

    let config: SweepConfig = serde_json::from_str(&serialized)?;
    config.validate()?;
    Ok(config)
}
