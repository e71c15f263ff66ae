//! Customer lookup: find a row by `Customer_ID` and score it.

use crate::classifier::{FeatureVector, ReturnClassifier};
use crate::data::model::CustomerTable;
use crate::error::Result;

/// Outcome of a lookup. `NotFound` is a normal answer, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    NotFound,
    Found {
        /// Index of the scored row in the table.
        row: usize,
        /// Probability of a return visit, in `[0, 1]`.
        probability: f64,
    },
}

impl Lookup {
    pub fn probability(&self) -> Option<f64> {
        match self {
            Lookup::Found { probability, .. } => Some(*probability),
            Lookup::NotFound => None,
        }
    }
}

/// Predict the return probability for `customer_id`.
///
/// Surrounding whitespace is ignored and an empty ID is `NotFound`. When the
/// ID occurs on several rows, the first row in load order is scored; the
/// others are not consulted.
pub fn lookup_customer(
    table: &CustomerTable,
    classifier: &dyn ReturnClassifier,
    customer_id: &str,
) -> Result<Lookup> {
    let id = customer_id.trim();
    if id.is_empty() {
        return Ok(Lookup::NotFound);
    }

    let Some(row) = table.records().iter().position(|r| r.customer_id == id) else {
        log::debug!("Customer {id} not found");
        return Ok(Lookup::NotFound);
    };

    let features = FeatureVector::from_record(&table.records()[row], table.categories())?;
    let probability = classifier.predict_probability(&features)?;
    log::debug!(
        "Customer {id} (row {row}) scored {probability:.3} by {} model",
        classifier.name()
    );
    Ok(Lookup::Found { row, probability })
}
