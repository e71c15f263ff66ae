//! On-disk classifier format.
//!
//! A model is a JSON document:
//!
//! ```json
//! {
//!   "feature_names": ["Purchase_Value", "Email_Engagement", ...],
//!   "engagement_encoding": { "Clicked": 2.0, "Opened": 1.0, "None": 0.0 },
//!   "estimator": { "type": "logistic", "intercept": -1.2, "coefficients": [...] }
//! }
//! ```
//!
//! `estimator` may instead be a boosted tree ensemble
//! (`"type": "gradient_boosting"`), summed in log-odds space.

use std::collections::BTreeMap;

use anyhow::{Result, bail, ensure};
use serde::{Deserialize, Serialize};

/// A decision tree node (internal or leaf).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    /// Feature index to compare (internal nodes)
    #[serde(default)]
    pub feature_index: usize,
    /// Go left when `feature <= threshold`
    #[serde(default)]
    pub threshold: f64,
    #[serde(default)]
    pub left: usize,
    #[serde(default)]
    pub right: usize,
    /// Leaf value in log-odds (None for internal nodes)
    #[serde(default)]
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tree {
    /// Root first; children always sit after their parent.
    pub nodes: Vec<Node>,
}

impl Tree {
    fn eval(&self, features: &[f64]) -> f64 {
        let mut idx = 0usize;
        // `validate` guarantees children come after parents and indices are
        // in bounds, so this walk terminates.
        while let Some(node) = self.nodes.get(idx) {
            if let Some(value) = node.value {
                return value;
            }
            let x = features.get(node.feature_index).copied().unwrap_or(f64::NAN);
            // NaN goes right, like a failed `<=`.
            idx = if x <= node.threshold { node.left } else { node.right };
        }
        0.0
    }

    fn validate(&self, n_features: usize, tree_no: usize) -> Result<()> {
        ensure!(!self.nodes.is_empty(), "tree {tree_no} has no nodes");
        for (i, node) in self.nodes.iter().enumerate() {
            if let Some(value) = node.value {
                ensure!(value.is_finite(), "tree {tree_no} node {i}: leaf value is not finite");
                continue;
            }
            ensure!(
                node.feature_index < n_features,
                "tree {tree_no} node {i}: feature index {} out of range ({n_features} features)",
                node.feature_index
            );
            for child in [node.left, node.right] {
                ensure!(
                    child > i && child < self.nodes.len(),
                    "tree {tree_no} node {i}: child {child} must follow its parent and exist"
                );
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Estimator {
    Logistic {
        intercept: f64,
        coefficients: Vec<f64>,
    },
    GradientBoosting {
        #[serde(default)]
        init_score: f64,
        learning_rate: f64,
        trees: Vec<Tree>,
    },
}

impl Estimator {
    pub fn kind(&self) -> &'static str {
        match self {
            Estimator::Logistic { .. } => "logistic",
            Estimator::GradientBoosting { .. } => "gradient_boosting",
        }
    }

    /// Raw score in log-odds for an encoded feature vector.
    pub fn decision_function(&self, features: &[f64]) -> f64 {
        match self {
            Estimator::Logistic {
                intercept,
                coefficients,
            } => {
                intercept
                    + coefficients
                        .iter()
                        .zip(features)
                        .map(|(w, x)| w * x)
                        .sum::<f64>()
            }
            Estimator::GradientBoosting {
                init_score,
                learning_rate,
                trees,
            } => init_score + learning_rate * trees.iter().map(|t| t.eval(features)).sum::<f64>(),
        }
    }
}

pub fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// The deserialized model file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelArtifact {
    pub feature_names: Vec<String>,
    /// Numeric code per `Email_Engagement` level, as fitted by the encoder
    /// used during training.
    pub engagement_encoding: BTreeMap<String, f64>,
    pub estimator: Estimator,
}

impl ModelArtifact {
    /// Structural checks that `serde` cannot express.
    pub fn validate(&self) -> Result<()> {
        let n = self.feature_names.len();
        ensure!(n > 0, "model declares no features");
        for (i, name) in self.feature_names.iter().enumerate() {
            if self.feature_names[..i].contains(name) {
                bail!("duplicate feature name '{name}'");
            }
        }
        ensure!(
            self.engagement_encoding.values().all(|v| v.is_finite()),
            "engagement encoding contains a non-finite code"
        );

        match &self.estimator {
            Estimator::Logistic {
                intercept,
                coefficients,
            } => {
                ensure!(
                    coefficients.len() == n,
                    "{} coefficients for {n} features",
                    coefficients.len()
                );
                ensure!(
                    intercept.is_finite() && coefficients.iter().all(|c| c.is_finite()),
                    "logistic weights must be finite"
                );
            }
            Estimator::GradientBoosting {
                init_score,
                learning_rate,
                trees,
            } => {
                ensure!(
                    init_score.is_finite() && learning_rate.is_finite() && *learning_rate > 0.0,
                    "invalid boosting parameters"
                );
                for (t, tree) in trees.iter().enumerate() {
                    tree.validate(n, t)?;
                }
            }
        }
        Ok(())
    }
}
