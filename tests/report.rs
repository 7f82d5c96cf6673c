use chrono::{DateTime, Utc};
use mismatch::{prelude::*, report::write_summary};
use std::{
    cell::RefCell,
    fs,
    path::{Path, PathBuf},
};

/// Remembers what it was asked to draw and leaves an empty file behind.
#[derive(Default)]
struct RecordingCanvas {
    drawn: RefCell<Vec<(Figure, PathBuf)>>,
}

impl Canvas for RecordingCanvas {
    fn draw(&self, figure: &Figure, path: &Path) -> Result<(), Error> {
        fs::write(path, b"")?;
        self.drawn
            .borrow_mut()
            .push((figure.clone(), path.to_path_buf()));
        Ok(())
    }
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("mismatch-{}-{name}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    dir
}

fn swept(name: &str, variant: Variant) -> Series {
    let grid = NoiseGrid::try_from(vec![0.5, 2.0]).unwrap();
    let config = SweepConfig::new(grid, 2).unwrap();
    Sweep::new(config, Simulated).run(&variant.with_name(name))
}

/// Position error is seed + 1, ANEES is the filter factor.
/// With data noise fixed, seed 0 fails and every trial above r = 1 fails.
struct Simulated;

impl Simulator for Simulated {
    fn run(&mut self, params: &TrialParams) -> TrialOutcome {
        let fixed = params.data_factor == 1.0;
        if fixed && (params.seed == 0 || params.filter_factor > 1.0) {
            return Err(TrialFailure::Invocation {
                reason: "stub".into(),
            });
        }

        Ok(Metrics::new(params.seed as f64 + 1.0, params.filter_factor))
    }
}

fn generated_at() -> DateTime<Utc> {
    "2025-06-13T16:26:47+00:00"
        .parse::<DateTime<Utc>>()
        .expect("valid datetime string")
}

#[test]
fn summary_lists_every_aggregate() {
    let b = swept("b", Variant::data_and_filter(""));
    let c = swept("c", Variant::filter_only(""));

    let mut bytes = Vec::new();
    write_summary(&mut bytes, &[&b, &c], generated_at()).unwrap();
    let csv = String::from_utf8(bytes).unwrap();

    insta::assert_snapshot!(csv.trim_end(), @r"
    # generated_at=2025-06-13T16:26:47+00:00
    series,noise_factor,attempts,successes,mean_position_error,mean_anees
    b,0.5,2,2,1.5,0.5
    b,2,2,2,1.5,2
    c,0.5,2,1,2,0.5
    c,2,2,0,,
    ");
}

#[test]
fn report_creates_directory_and_persists_at_fixed_name() {
    let dir = scratch_dir("persist").join("results");
    let report = Report::create(&dir).unwrap();
    assert!(dir.is_dir());

    let b = swept("b", Variant::data_and_filter(""));
    let c = swept("c", Variant::filter_only(""));
    let figure = Figure::comparison("ekf_experiment_results.png", &[&b, &c]).unwrap();

    let canvas = RecordingCanvas::default();
    let path = report.persist(&figure, &canvas).unwrap();
    // Persisting again overwrites the same file.
    report.persist(&figure, &canvas).unwrap();

    assert_eq!(path, dir.join("ekf_experiment_results.png"));
    assert!(path.is_file());

    let drawn = canvas.drawn.borrow();
    assert_eq!(drawn.len(), 2);
    assert_eq!(drawn[0].0, figure);

    let summary = report.persist_summary("ekf_experiment_results.csv", &[&b, &c]).unwrap();
    let contents = fs::read_to_string(summary).unwrap();
    assert!(contents.starts_with("# generated_at="));
    assert_eq!(contents.lines().count(), 6);

    fs::remove_dir_all(dir.parent().unwrap()).unwrap();
}

#[test]
fn undefined_points_are_flagged_not_zeroed() {
    let c = swept("c", Variant::filter_only(""));
    let figure = Figure::comparison("out.png", &[&c]).unwrap();

    for panel in figure.panels() {
        assert_eq!(panel.undefined_factors(), vec![2.0]);
        assert_eq!(panel.curves()[0].values[1], None);
    }
}

#[test]
fn figures_only_compare_series_on_the_same_grid() {
    let b = swept("b", Variant::data_and_filter(""));
    let config = SweepConfig::new(NoiseGrid::try_from(vec![0.5]).unwrap(), 1).unwrap();
    let short = Sweep::new(config, Simulated).run(&Variant::data_and_filter("short"));

    let err = Figure::comparison("out.png", &[&b, &short]).unwrap_err();
    assert!(matches!(err, Error::MismatchedGrid { .. }));
}

#[test]
fn particle_figure_has_three_panels() {
    let b = swept("b", Variant::data_and_filter(""));
    let c = swept("c", Variant::filter_only(""));

    let grid = NoiseGrid::try_from(vec![0.5, 2.0]).unwrap();
    let study = Sweep::new(SweepConfig::new(grid, 1).unwrap(), Simulated)
        .run_particle_study(&Variant::data_and_filter("d"), &[20, 50]);

    let figure = Figure::comparison("pf_experiment_results.png", &[&b, &c])
        .unwrap()
        .with_particle_panel(&study)
        .unwrap();

    let metrics: Vec<Metric> = figure.panels().iter().map(Panel::metric).collect();
    assert_eq!(
        metrics,
        vec![Metric::PositionError, Metric::Anees, Metric::PositionError]
    );
    assert_eq!(figure.panels()[2].curves().len(), 2);
}

#[test]
fn particle_figure_splits_into_one_file_per_panel() {
    let dir = scratch_dir("split").join("results");
    let report = Report::create(&dir).unwrap();

    let b = swept("b", Variant::data_and_filter(""));
    let grid = NoiseGrid::try_from(vec![0.5, 2.0]).unwrap();
    let study = Sweep::new(SweepConfig::new(grid, 1).unwrap(), Simulated)
        .run_particle_study(&Variant::data_and_filter("d"), &[20, 50]);
    let figure = Figure::comparison("pf_experiment_results.png", &[&b])
        .unwrap()
        .with_particle_panel(&study)
        .unwrap();

    let names = ["mean_position_error.png", "anees.png", "effect_of_particle_count.png"];
    let canvas = RecordingCanvas::default();
    for (panel, name) in figure.split(&names).unwrap().iter().zip(names) {
        assert_eq!(panel.panels().len(), 1);
        assert_eq!(report.persist(panel, &canvas).unwrap(), dir.join(name));
    }

    let drawn = canvas.drawn.borrow();
    assert_eq!(drawn[1].0.panels()[0], figure.panels()[1]);
    assert_eq!(drawn[2].0.panels()[0].curves().len(), 2);
    assert!(names.iter().all(|name| dir.join(name).is_file()));

    assert!(matches!(
        figure.split(&names[..2]),
        Err(Error::PanelCount { panels: 3, file_names: 2 })
    ));

    fs::remove_dir_all(dir.parent().unwrap()).unwrap();
}
