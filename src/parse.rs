//! Extracts trial metrics from the free-text output of the localization filter.
//!
//! The filter is expected to print a report containing two lines:
//!
//! ```text
//! Mean position error: 0.4213
//! ANEES: 1.0374
//! ```
//!
//! Output before the report is ignored. The ANEES line must come last.

use crate::{
    error::TrialFailure,
    metrics::{Metrics, TrialOutcome},
};

pub const POSITION_ERROR_MARKER: &str = "Mean position error:";
pub const ANEES_MARKER: &str = "ANEES:";

/// Parses the metrics out of `raw`.
///
/// The position error is the rest of the line after the first
/// `Mean position error:`. ANEES is everything after the first `ANEES:` up to
/// the end of the output. Fails if a marker is missing or a value is not a
/// finite, non-negative number. Never panics.
pub fn parse(raw: &str) -> TrialOutcome {
    let position_error = after_marker(raw, POSITION_ERROR_MARKER)?
        .lines()
        .next()
        .unwrap_or_default();
    let position_error = to_metric(raw, POSITION_ERROR_MARKER, position_error)?;

    let anees = after_marker(raw, ANEES_MARKER)?;
    let anees = to_metric(raw, ANEES_MARKER, anees)?;

    Ok(Metrics::new(position_error, anees))
}

fn after_marker<'a>(raw: &'a str, marker: &'static str) -> Result<&'a str, TrialFailure> {
    raw.split_once(marker)
        .map(|(_, rest)| rest)
        .ok_or_else(|| TrialFailure::MissingMarker {
            marker,
            raw: raw.to_owned(),
        })
}

fn to_metric(raw: &str, marker: &'static str, value: &str) -> Result<f64, TrialFailure> {
    let value = value.trim();
    match value.parse::<f64>() {
        Ok(x) if x.is_finite() && x >= 0.0 => Ok(x),
        _ => Err(TrialFailure::InvalidValue {
            marker,
            value: value.to_owned(),
            raw: raw.to_owned(),
        }),
    }
}
