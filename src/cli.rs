//! Command-line interface definitions and argument parsing

use std::path::PathBuf;

use clap::Parser;

use crate::config::{Config, DEFAULT_DATA_PATH, DEFAULT_MODEL_PATH};
use crate::error::{DashboardError, Result};

/// Client retention dashboard: return rates by category, engagement and
/// spend, plus per-customer return prediction
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Customer dataset (.csv, .json, .parquet or .pq)
    #[arg(env = "RETENTION_DATA_PATH", default_value = DEFAULT_DATA_PATH)]
    pub data_path: PathBuf,

    /// Trained return classifier (JSON artifact)
    #[arg(env = "RETENTION_MODEL_PATH", default_value = DEFAULT_MODEL_PATH)]
    pub model_path: PathBuf,
}

impl Args {
    /// Validate the paths and hand them to the library.
    pub fn into_config(self) -> Result<Config> {
        for (what, path) in [("dataset", &self.data_path), ("model", &self.model_path)] {
            if path.as_os_str().is_empty() {
                return Err(DashboardError::Config(format!("{what} path must not be empty")));
            }
        }
        Ok(Config {
            data_path: self.data_path,
            model_path: self.model_path,
        })
    }
}
