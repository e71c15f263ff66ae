use std::fmt;

use crate::data::model::{CategorySet, CustomerRecord};
use crate::data::schema::{
    AVG_SPENT, DISCOUNT_USED, EMAIL_ENGAGEMENT, FREQUENCY, PURCHASE_DAY_OF_WEEK, PURCHASE_MONTH,
    PURCHASE_VALUE, RECENCY_DAYS, TOTAL_SPENT,
};
use crate::error::{DashboardError, Result};

/// Leading model inputs, in the order the classifier was trained on.
/// Category indicators follow in [`CategorySet`] order.
pub const BASE_FEATURES: [&str; 9] = [
    PURCHASE_VALUE,
    EMAIL_ENGAGEMENT,
    DISCOUNT_USED,
    FREQUENCY,
    TOTAL_SPENT,
    AVG_SPENT,
    RECENCY_DAYS,
    PURCHASE_MONTH,
    PURCHASE_DAY_OF_WEEK,
];

/// One model input. Engagement stays categorical until the model encodes it.
#[derive(Debug, Clone, PartialEq)]
pub enum Feature {
    Number(f64),
    Level(String),
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feature::Number(v) => write!(f, "{v}"),
            Feature::Level(s) => write!(f, "{s}"),
        }
    }
}

/// Named, ordered model inputs for one customer row.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    names: Vec<String>,
    values: Vec<Feature>,
}

impl FeatureVector {
    /// Feature names for a table with the given categories.
    pub fn schema(categories: &CategorySet) -> Vec<String> {
        BASE_FEATURES
            .iter()
            .map(|s| s.to_string())
            .chain(categories.columns().iter().cloned())
            .collect()
    }

    /// Assemble the inputs for `record`. A null in any feature column is a
    /// [`DashboardError::ModelInput`].
    pub fn from_record(record: &CustomerRecord, categories: &CategorySet) -> Result<Self> {
        fn present<T>(value: Option<T>, column: &str, id: &str) -> Result<T> {
            value.ok_or_else(|| {
                DashboardError::ModelInput(format!("customer {id}: '{column}' is missing"))
            })
        }
        let id = record.customer_id.as_str();
        let flag = |b: bool| if b { 1.0 } else { 0.0 };

        let mut values = vec![
            Feature::Number(record.purchase_value),
            Feature::Level(record.email_engagement.as_str().to_string()),
            Feature::Number(flag(present(record.discount_used, DISCOUNT_USED, id)?)),
            Feature::Number(present(record.frequency, FREQUENCY, id)?),
            Feature::Number(present(record.total_spent, TOTAL_SPENT, id)?),
            Feature::Number(present(record.avg_spent, AVG_SPENT, id)?),
            Feature::Number(present(record.recency_days, RECENCY_DAYS, id)? as f64),
            Feature::Number(present(record.purchase_month, PURCHASE_MONTH, id)? as f64),
            Feature::Number(present(record.purchase_day_of_week, PURCHASE_DAY_OF_WEEK, id)? as f64),
        ];
        values.extend((0..categories.len()).map(|i| Feature::Number(flag(record.in_category(i)))));

        Ok(Self {
            names: Self::schema(categories),
            values,
        })
    }

    /// Build directly from parts; lengths must match.
    pub fn new(names: Vec<String>, values: Vec<Feature>) -> Result<Self> {
        if names.len() != values.len() {
            return Err(DashboardError::ModelInput(format!(
                "{} feature names for {} values",
                names.len(),
                values.len()
            )));
        }
        Ok(Self { names, values })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &[Feature] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Feature)> + '_ {
        self.names.iter().map(String::as_str).zip(self.values.iter())
    }
}
