use std::path::PathBuf;

use thiserror::Error;

/// Every failure the dashboard core can report.
///
/// `Config`, `DataLoad` and `ModelLoad` abort startup. `UnknownCategory` and
/// `ModelInput` are recoverable and are shown to the user without ending
/// the session.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DashboardError {
    #[error("failed to load dataset {}: {reason}", path.display())]
    DataLoad { path: PathBuf, reason: String },

    #[error("failed to load model {}: {reason}", path.display())]
    ModelLoad { path: PathBuf, reason: String },

    #[error("unknown category: {0}")]
    UnknownCategory(String),

    #[error("invalid model input: {0}")]
    ModelInput(String),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, DashboardError>;

impl DashboardError {
    /// Process exit status when this error ends startup: 2 for bad
    /// configuration, 1 for an input that failed to load. `None` for errors
    /// the session recovers from.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            DashboardError::Config(_) => Some(2),
            DashboardError::DataLoad { .. } | DashboardError::ModelLoad { .. } => Some(1),
            DashboardError::UnknownCategory(_) | DashboardError::ModelInput(_) => None,
        }
    }
}
