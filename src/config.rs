use std::path::PathBuf;

pub const DEFAULT_DATA_PATH: &str = "prepared.csv";
pub const DEFAULT_MODEL_PATH: &str = "retention_model.json";

/// Column-name prefix marking a one-hot category indicator.
pub const CATEGORY_PREFIX: &str = "Category_";

/// Selector value meaning "no category filter".
pub const ALL_CATEGORIES: &str = "All";

/// Spend tier boundaries on `Purchase_Value`, each range half-open `[lo, hi)`.
pub mod segment_bounds {
    pub const LOW_MIN: f64 = 0.0;
    pub const MEDIUM_MIN: f64 = 80.0;
    pub const HIGH_MIN: f64 = 150.0;
    pub const HIGH_MAX: f64 = 300.0;
}

/// Where the dashboard's two inputs live. Built from the command line by
/// [`crate::cli::Args`].
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Customer dataset
    pub data_path: PathBuf,
    /// Serialized classifier
    pub model_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
        }
    }
}
