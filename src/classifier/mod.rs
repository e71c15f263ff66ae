//! The pre-trained return classifier.

pub mod artifact;
pub mod features;

use std::path::Path;

use anyhow::Context;

use crate::error::{DashboardError, Result};

pub use artifact::{Estimator, ModelArtifact};
pub use features::{BASE_FEATURES, Feature, FeatureVector};

/// Anything that can score a customer's feature vector.
pub trait ReturnClassifier {
    /// Probability in `[0, 1]` that the customer returns.
    fn predict_probability(&self, features: &FeatureVector) -> Result<f64>;

    /// Short description for logs and the status bar.
    fn name(&self) -> &str;
}

/// A classifier loaded from a [`ModelArtifact`] file. Read-only after load.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainedModel {
    artifact: ModelArtifact,
}

impl TrainedModel {
    pub fn load(path: &Path) -> Result<Self> {
        let read = || -> anyhow::Result<ModelArtifact> {
            let text = std::fs::read_to_string(path).context("reading model file")?;
            let artifact: ModelArtifact =
                serde_json::from_str(&text).context("parsing model JSON")?;
            artifact.validate().context("validating model")?;
            Ok(artifact)
        };
        let artifact = read().map_err(|e| DashboardError::ModelLoad {
            path: path.to_path_buf(),
            reason: format!("{e:#}"),
        })?;

        log::info!(
            "Loaded {} model with {} features from {}",
            artifact.estimator.kind(),
            artifact.feature_names.len(),
            path.display()
        );
        Ok(Self { artifact })
    }

    /// Wrap an in-memory artifact, applying the same checks as [`load`](Self::load).
    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self> {
        artifact.validate().map_err(|e| DashboardError::ModelLoad {
            path: Default::default(),
            reason: format!("{e:#}"),
        })?;
        Ok(Self { artifact })
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }

    pub fn feature_names(&self) -> &[String] {
        &self.artifact.feature_names
    }

    /// Turn named inputs into the numeric vector the estimator expects.
    fn encode(&self, features: &FeatureVector) -> Result<Vec<f64>> {
        let expected = &self.artifact.feature_names;
        if features.len() != expected.len() {
            return Err(DashboardError::ModelInput(format!(
                "model expects {} features, got {}",
                expected.len(),
                features.len()
            )));
        }
        if let Some((want, got)) = expected
            .iter()
            .zip(features.names())
            .find(|(want, got)| want != got)
        {
            return Err(DashboardError::ModelInput(format!(
                "feature order mismatch: model expects '{want}' where input has '{got}'"
            )));
        }

        features
            .iter()
            .map(|(name, value)| match value {
                Feature::Number(v) if v.is_finite() => Ok(*v),
                Feature::Number(v) => Err(DashboardError::ModelInput(format!(
                    "'{name}' is not a finite number ({v})"
                ))),
                Feature::Level(level) => self
                    .artifact
                    .engagement_encoding
                    .get(level)
                    .copied()
                    .ok_or_else(|| {
                        DashboardError::ModelInput(format!(
                            "'{name}' level '{level}' was not seen during training"
                        ))
                    }),
            })
            .collect()
    }
}

impl ReturnClassifier for TrainedModel {
    fn predict_probability(&self, features: &FeatureVector) -> Result<f64> {
        let encoded = self.encode(features)?;
        let z = self.artifact.estimator.decision_function(&encoded);
        let p = artifact::sigmoid(z);
        if p.is_nan() {
            return Err(DashboardError::ModelInput("model produced no score".to_string()));
        }
        Ok(p.clamp(0.0, 1.0))
    }

    fn name(&self) -> &str {
        self.artifact.estimator.kind()
    }
}
