use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid sweep configuration: {0}")]
    InvalidConfig(String),

    #[error("no successful trials out of {attempts} to aggregate")]
    AggregationUndefined { attempts: usize },

    #[error("series `{series}` was swept over a different noise grid than panel `{panel}`")]
    MismatchedGrid { series: String, panel: String },

    #[error("cannot split a figure of {panels} panels into {file_names} files")]
    PanelCount { panels: usize, file_names: usize },

    #[error("failed to render figure: {0}")]
    Render(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Why a single trial produced no metrics.
///
/// Every variant that saw simulator output keeps it in `raw` so the caller
/// can surface it when logging.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum TrialFailure {
    #[error("failed to invoke simulator: {reason}")]
    Invocation { reason: String },

    #[error("simulator output has no `{marker}` marker")]
    MissingMarker { marker: &'static str, raw: String },

    #[error("`{value}` after `{marker}` is not a valid metric")]
    InvalidValue {
        marker: &'static str,
        value: String,
        raw: String,
    },
}

impl TrialFailure {
    /// Returns the simulator output that caused the failure, if any was captured.
    pub fn raw_output(&self) -> Option<&str> {
        match self {
            TrialFailure::Invocation { .. } => None,
            TrialFailure::MissingMarker { raw, .. } | TrialFailure::InvalidValue { raw, .. } => {
                Some(raw)
            }
        }
    }
}
