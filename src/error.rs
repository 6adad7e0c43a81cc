use std::path::PathBuf;
use thiserror::Error;

/// Failures of the dashboard pipeline.
///
/// `Parse` is row level: loaders and the scraper log it and drop the row,
/// it never leaves the library. The others are surfaced to the user.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("could not access {path}: {reason}")]
    FileAccess { path: PathBuf, reason: String },

    #[error("could not fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("no inflation rows found in the page at {url}")]
    EmptyResult { url: String },

    #[error("could not parse {field} from {value:?}")]
    Parse { field: &'static str, value: String },

    #[error("could not render the chart to {path}: {reason}")]
    Render { path: PathBuf, reason: String },

    #[error("could not export the data: {0}")]
    Export(String),
}

impl DashboardError {
    pub fn file_access<P: Into<PathBuf>, E: std::fmt::Display>(path: P, e: E) -> Self {
        DashboardError::FileAccess {
            path: path.into(),
            reason: e.to_string(),
        }
    }

    pub fn render<P: Into<PathBuf>, E: std::fmt::Display>(path: P, e: E) -> Self {
        DashboardError::Render {
            path: path.into(),
            reason: e.to_string(),
        }
    }

    pub fn parse(field: &'static str, value: &str) -> Self {
        DashboardError::Parse {
            field,
            value: value.to_owned(),
        }
    }
}

impl From<csv::Error> for DashboardError {
    fn from(e: csv::Error) -> Self {
        DashboardError::Export(e.to_string())
    }
}
