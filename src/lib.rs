//! Client retention dashboard core.
//!
//! Loads a prepared customer table and a pre-trained return classifier once,
//! then answers the dashboard's questions: headline KPIs, return rates by
//! category, email engagement and spend segment, a category filter, and a
//! per-customer return probability.

pub mod analytics;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod predict;

use config::Config;
use error::Result;

pub use analytics::{DashboardSummary, Rate, Segment};
pub use classifier::{ReturnClassifier, TrainedModel};
pub use data::filter::{CategoryFilter, apply_filter, filtered_return_rate};
pub use data::loader::load_dataset;
pub use data::model::{CategorySet, CustomerRecord, CustomerTable, CustomerView, EmailEngagement};
pub use error::DashboardError;
pub use predict::{Lookup, lookup_customer};

/// The immutable inputs every dashboard operation reads.
#[derive(Debug, Clone)]
pub struct DashboardContext {
    pub table: CustomerTable,
    pub model: TrainedModel,
}

impl DashboardContext {
    /// Load both inputs. Either failure is fatal to startup.
    pub fn load(config: &Config) -> Result<Self> {
        let table = load_dataset(&config.data_path)?;
        let model = TrainedModel::load(&config.model_path)?;

        let expected = classifier::FeatureVector::schema(table.categories());
        if model.feature_names() != expected.as_slice() {
            log::warn!(
                "Model features {:?} differ from table schema {:?}; lookups will fail",
                model.feature_names(),
                expected
            );
        }
        Ok(Self { table, model })
    }
}
