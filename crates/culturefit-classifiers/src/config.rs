use serde::{Deserialize, Serialize};

use crate::models::tree::{MaxFeatures, TreeParams};

/// Hyper-parameters of a random forest.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ForestConfig {
    pub n_estimators: usize,
    pub random_state: u64,
    /// Draw each tree's sample with replacement.
    pub bootstrap: bool,
    /// `auto` considers every feature for regression and sqrt(n) for
    /// classification.
    pub max_features: MaxFeatures,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl ForestConfig {
    pub fn with_n_estimators(mut self, n_estimators: usize) -> Self {
        self.n_estimators = n_estimators;
        self
    }

    pub fn tree_params(&self) -> TreeParams {
        TreeParams {
            max_features: self.max_features,
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
        }
    }
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 200,
            random_state: 42,
            bootstrap: true,
            max_features: MaxFeatures::Auto,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

/// Split and model settings for one training run.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TrainingOptions {
    /// Fraction of rows held out for evaluation.
    pub test_size: f64,
    /// Seed for the train/test shuffles.
    pub random_state: u64,
    pub regressor: ForestConfig,
    pub classifier: ForestConfig,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self {
            test_size: 0.2,
            random_state: 42,
            regressor: ForestConfig::default(),
            classifier: ForestConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_training_setup() {
        let opts = TrainingOptions::default();
        assert_eq!(opts.test_size, 0.2);
        assert_eq!(opts.random_state, 42);
        assert_eq!(opts.regressor.n_estimators, 200);
        assert_eq!(opts.classifier.n_estimators, 200);
        assert_eq!(opts.classifier.max_features, MaxFeatures::Auto);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let opts: TrainingOptions =
            serde_json::from_str(r#"{"test_size": 0.25, "classifier": {"n_estimators": 10}}"#).unwrap();
        assert_eq!(opts.test_size, 0.25);
        assert_eq!(opts.classifier.n_estimators, 10);
        assert_eq!(opts.classifier.random_state, 42);
        assert_eq!(opts.classifier.max_features, MaxFeatures::Auto);
        assert_eq!(opts.regressor.n_estimators, 200);
    }
}
