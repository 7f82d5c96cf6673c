//! Turns swept series into comparison figures and summary tables.
//!
//! A [`Figure`] is plain data describing what to draw. Drawing happens behind
//! the [`Canvas`] trait, so figures can be assembled and inspected without
//! touching the file system.

use crate::{
    error::Error,
    metrics::Metric,
    sweep::{ParticleStudy, Series},
};
use chrono::{DateTime, Utc};
use plotters::{coord::Shift, prelude::*};
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};
use tracing::info;

pub const NOISE_FACTOR_LABEL: &str = "r (noise scaling factor)";

/// One named line on a panel.
#[derive(Clone, Debug, PartialEq)]
pub struct Curve {
    pub label: String,

    /// Index-aligned with the panel's noise factors.
    pub values: Vec<Option<f64>>,
}

/// A single plot of one metric against the noise factor.
#[derive(Clone, Debug, PartialEq)]
pub struct Panel {
    title: String,
    metric: Metric,
    factors: Vec<f64>,
    curves: Vec<Curve>,
}

impl Panel {
    pub fn new(title: impl Into<String>, metric: Metric) -> Self {
        Self {
            title: title.into(),
            metric,
            factors: Vec::new(),
            curves: Vec::new(),
        }
    }

    /// Overlays `metric` from `series` on this panel.
    ///
    /// The first series fixes the panel's noise factors. Later series must
    /// have been swept over the same factors in the same order.
    pub fn append_series(
        &mut self,
        label: impl Into<String>,
        series: &Series,
    ) -> Result<(), Error> {
        let factors = series.factors();
        if self.curves.is_empty() {
            self.factors = factors;
        } else if self.factors != factors {
            return Err(Error::MismatchedGrid {
                series: series.name().to_owned(),
                panel: self.title.clone(),
            });
        }

        self.curves.push(Curve {
            label: label.into(),
            values: series.values(self.metric),
        });
        Ok(())
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn factors(&self) -> &[f64] {
        &self.factors
    }

    pub fn curves(&self) -> &[Curve] {
        &self.curves
    }

    /// Noise factors at which some curve has no value.
    pub fn undefined_factors(&self) -> Vec<f64> {
        self.factors
            .iter()
            .enumerate()
            .filter(|(i, _)| self.curves.iter().any(|curve| curve.values[*i].is_none()))
            .map(|(_, factor)| *factor)
            .collect()
    }
}

/// An ordered row of panels saved to a single image.
#[derive(Clone, Debug, PartialEq)]
pub struct Figure {
    file_name: String,
    panels: Vec<Panel>,
}

impl Figure {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            panels: Vec::new(),
        }
    }

    pub fn with_panel(mut self, panel: Panel) -> Self {
        self.panels.push(panel);
        self
    }

    /// Compares `series` side by side: position error on the left, ANEES on the right.
    pub fn comparison(file_name: impl Into<String>, series: &[&Series]) -> Result<Self, Error> {
        let mut position_error =
            Panel::new("Mean Position Error vs. Noise Scaling", Metric::PositionError);
        let mut anees = Panel::new("ANEES vs. Noise Scaling", Metric::Anees);
        for s in series {
            position_error.append_series(s.name(), s)?;
            anees.append_series(s.name(), s)?;
        }

        Ok(Self::new(file_name)
            .with_panel(position_error)
            .with_panel(anees))
    }

    /// Adds a panel with one position error curve per particle count.
    pub fn with_particle_panel(self, study: &ParticleStudy) -> Result<Self, Error> {
        let mut panel = Panel::new("Effect of Particle Count", Metric::PositionError);
        for (count, series) in study {
            panel.append_series(format!("{count} particles"), series)?;
        }

        Ok(self.with_panel(panel))
    }

    /// Splits off each panel as its own figure, saved under the matching entry of `file_names`.
    pub fn split(&self, file_names: &[&str]) -> Result<Vec<Figure>, Error> {
        if file_names.len() != self.panels.len() {
            return Err(Error::PanelCount {
                panels: self.panels.len(),
                file_names: file_names.len(),
            });
        }

        Ok(file_names
            .iter()
            .zip(&self.panels)
            .map(|(file_name, panel)| Figure::new(*file_name).with_panel(panel.clone()))
            .collect())
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }
}

/// Something a figure can be drawn onto.
pub trait Canvas {
    fn draw(&self, figure: &Figure, path: &Path) -> Result<(), Error>;
}

/// Draws figures as PNG images.
#[derive(Clone, Copy, Debug)]
pub struct PlotCanvas {
    /// Pixel size of a single panel.
    pub panel_size: (u32, u32),
}

impl Default for PlotCanvas {
    fn default() -> Self {
        Self {
            panel_size: (600, 500),
        }
    }
}

impl Canvas for PlotCanvas {
    fn draw(&self, figure: &Figure, path: &Path) -> Result<(), Error> {
        draw_figure(figure, path, self.panel_size).map_err(|err| Error::Render(err.to_string()))
    }
}

fn draw_figure(
    figure: &Figure,
    path: &Path,
    panel_size: (u32, u32),
) -> Result<(), Box<dyn std::error::Error>> {
    let columns = figure.panels().len().max(1);
    let size = (panel_size.0 * columns as u32, panel_size.1);
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let areas = root.split_evenly((1, columns));
    for (area, panel) in areas.iter().zip(figure.panels()) {
        draw_panel(area, panel)?;
    }

    root.present()?;
    Ok(())
}

fn draw_panel(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    panel: &Panel,
) -> Result<(), Box<dyn std::error::Error>> {
    let (x_lo, x_hi) = panel
        .factors()
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| {
            (lo.min(*x), hi.max(*x))
        });
    let (x_lo, x_hi) = if x_lo.is_finite() {
        (x_lo / 2., x_hi * 2.)
    } else {
        (0.1, 10.)
    };

    let y_max = panel
        .curves()
        .iter()
        .flat_map(|curve| curve.values.iter().flatten())
        .fold(0.0f64, |max, y| max.max(*y));
    let y_hi = if y_max > 0.0 { y_max * 1.1 } else { 1.0 };

    let mut chart = ChartBuilder::on(area)
        .caption(panel.title(), ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d((x_lo..x_hi).log_scale(), 0.0..y_hi)?;

    chart
        .configure_mesh()
        .x_desc(NOISE_FACTOR_LABEL)
        .y_desc(panel.metric().label())
        .draw()?;

    for (i, curve) in panel.curves().iter().enumerate() {
        let color = Palette99::pick(i).to_rgba();

        // Undefined points split a curve instead of being drawn as zero.
        let mut segments: Vec<Vec<(f64, f64)>> = vec![Vec::new()];
        for (x, y) in panel.factors().iter().zip(&curve.values) {
            match y {
                Some(y) => {
                    if let Some(segment) = segments.last_mut() {
                        segment.push((*x, *y));
                    }
                }
                None => segments.push(Vec::new()),
            }
        }

        let points: Vec<(f64, f64)> = segments.iter().flatten().copied().collect();
        for segment in segments.into_iter().filter(|s| s.len() > 1) {
            chart.draw_series(LineSeries::new(segment, color.stroke_width(2)))?;
        }

        chart
            .draw_series(points.into_iter().map(|p| Circle::new(p, 3, color.filled())))?
            .label(curve.label.as_str())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });
    }

    let undefined = panel.undefined_factors();
    if !undefined.is_empty() {
        chart
            .draw_series(
                undefined
                    .into_iter()
                    .map(|x| Cross::new((x, 0.0), 6, RED.stroke_width(2))),
            )?
            .label("no successful trials")
            .legend(|(x, y)| Cross::new((x + 10, y), 6, RED.stroke_width(2)));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    Ok(())
}

/// Writes the aggregates of every series as CSV.
///
/// Undefined means are written as empty fields.
pub fn write_summary<W: Write>(
    mut writer: W,
    series: &[&Series],
    generated_at: DateTime<Utc>,
) -> std::io::Result<()> {
    writeln!(writer, "# generated_at={}", generated_at.to_rfc3339())?;
    writeln!(
        writer,
        "series,noise_factor,attempts,successes,mean_position_error,mean_anees"
    )?;

    for s in series {
        for point in s.points() {
            let (position_error, anees) = match point.mean() {
                Some(mean) => (mean.position_error().to_string(), mean.anees().to_string()),
                None => (String::new(), String::new()),
            };

            writeln!(
                writer,
                "{},{},{},{},{},{}",
                s.name(),
                point.factor().into_inner(),
                point.attempts(),
                point.successes(),
                position_error,
                anees,
            )?;
        }
    }

    writer.flush()
}

/// A directory that figures and summaries are persisted to.
#[derive(Clone, Debug)]
pub struct Report {
    dir: PathBuf,
}

impl Report {
    /// Uses `dir` as the output directory, creating it if missing.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self, Error> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Draws `figure` onto `canvas` at its fixed file name, replacing any previous file.
    pub fn persist<C: Canvas>(&self, figure: &Figure, canvas: &C) -> Result<PathBuf, Error> {
        let path = self.dir.join(figure.file_name());
        canvas.draw(figure, &path)?;
        info!(path = %path.display(), "saved figure");
        Ok(path)
    }

    /// Writes the aggregates of `series` to `file_name` as CSV.
    pub fn persist_summary(&self, file_name: &str, series: &[&Series]) -> Result<PathBuf, Error> {
        let path = self.dir.join(file_name);
        // Each write! on the raw file makes a system call.
        write_summary(BufWriter::new(File::create(&path)?), series, Utc::now())?;
        info!(path = %path.display(), "saved summary");
        Ok(path)
    }
}
