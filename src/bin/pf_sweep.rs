use clap::Parser;
use mismatch::prelude::*;
use std::{
    error::Error,
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};
use tracing::info;

/// Each panel of the combined figure is also saved on its own under these names.
const PANEL_FILE_NAMES: [&str; 3] = [
    "mean_position_error.png",
    "anees.png",
    "effect_of_particle_count.png",
];

/// Sweeps the particle filter over noise scaling factors and particle counts.
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

    /// Particles used by the data and filter noise comparison.
    #[arg(long, default_value_t = 100)]
    num_particles: u32,

    /// Particle counts compared with data noise held fixed.
    #[arg(long, value_delimiter = ',', default_values_t = [20, 50, 500])]
    particle_counts: Vec<u32>,
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

    let simulator = ProcessSimulator::new(&args.program, FilterKind::Pf).arg(&args.script);
    let mut sweep = Sweep::new(config, simulator);

    info!("vary both data and filter noise");
    let both = Variant::data_and_filter("Data + filter noise").with_particles(args.num_particles);
    let both = sweep.run(&both);

    info!("fix data noise, vary only filter noise");
    let filter_only = Variant::filter_only("Filter noise only").with_particles(args.num_particles);
    let filter_only = sweep.run(&filter_only);

    info!(counts = ?args.particle_counts, "vary filter noise across particle counts");
    let study =
        sweep.run_particle_study(&Variant::filter_only("particles"), &args.particle_counts);

    let report = Report::create(&args.results_dir)?;
    let figure = Figure::comparison("pf_experiment_results.png", &[&both, &filter_only])?
        .with_particle_panel(&study)?;
    report.persist(&figure, &PlotCanvas::default())?;
    for panel in figure.split(&PANEL_FILE_NAMES)? {
        report.persist(&panel, &PlotCanvas::default())?;
    }

    let mut series = vec![&both, &filter_only];
    series.extend(study.values());
    report.persist_summary("pf_experiment_results.csv", &series)?;

    Ok(())
}

fn read_config(path: &Path) -> Result<SweepConfig, Box<dyn Error>> {
    let mut serialized = String::new();
    File::open(path)?.read_to_string(&mut serialized)?;

    let config: SweepConfig = serde_json::from_str(&serialized)?;
    config.validate()?;
    Ok(config)
}
