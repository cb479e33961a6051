//! Bagged random forests over `DecisionTree`.
//!
//! Per-tree seeds are drawn from the forest seed before any tree is grown,
//! so the fitted forest does not depend on how rayon schedules the work.

use std::collections::BTreeSet;

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::ForestConfig;
use crate::error::{CultureFitError, Result};
use crate::models::tree::{DecisionTree, Targets};
use crate::models::Estimator;

fn grow_forest(config: &ForestConfig, x: &Array2<f64>, targets: Targets<'_>) -> Vec<DecisionTree> {
    let n_samples = x.nrows();
    let params = config.tree_params();

    let mut master = StdRng::seed_from_u64(config.random_state);
    let seeds: Vec<u64> = (0..config.n_estimators).map(|_| master.gen()).collect();

    seeds
        .into_par_iter()
        .map(|seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            let sample: Vec<usize> = if config.bootstrap {
                (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
            } else {
                (0..n_samples).collect()
            };
            DecisionTree::fit(x, targets, sample, &params, &mut rng)
        })
        .collect()
}

fn check_training_shape(x: &Array2<f64>, n_targets: usize) -> Result<()> {
    if x.nrows() == 0 {
        return Err(CultureFitError::EmptyDataset);
    }
    if x.nrows() != n_targets {
        return Err(CultureFitError::LengthMismatch {
            rows: x.nrows(),
            targets: n_targets,
        });
    }
    Ok(())
}

fn check_predict_shape(x: &Array2<f64>, n_features: usize, n_trees: usize) -> Result<()> {
    if n_trees == 0 {
        return Err(CultureFitError::NotFitted);
    }
    if x.ncols() != n_features {
        return Err(CultureFitError::FeatureMismatch {
            expected: n_features,
            got: x.ncols(),
        });
    }
    Ok(())
}

/// Random forest regressor; predicts the mean of its trees.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    config: ForestConfig,
    n_features: usize,
    trees: Vec<DecisionTree>,
}

impl RandomForestRegressor {
    pub fn new(config: ForestConfig) -> Self {
        RandomForestRegressor {
            config,
            n_features: 0,
            trees: Vec::new(),
        }
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Estimator for RandomForestRegressor {
    type Target = f64;

    fn fit(&mut self, x: &Array2<f64>, y: &[f64]) -> Result<()> {
        check_training_shape(x, y.len())?;
        self.n_features = x.ncols();
        self.trees = grow_forest(&self.config, x, Targets::Continuous(y));
        log::debug!(
            "Fitted regressor: {} trees on {} x {}",
            self.trees.len(),
            x.nrows(),
            x.ncols()
        );
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Vec<f64>> {
        check_predict_shape(x, self.n_features, self.trees.len())?;
        let n_trees = self.trees.len() as f64;
        Ok(x.outer_iter()
            .map(|row| {
                self.trees
                    .iter()
                    .map(|tree| tree.predict_row(row)[0])
                    .sum::<f64>()
                    / n_trees
            })
            .collect())
    }

    fn name(&self) -> &str {
        "random_forest_regressor"
    }
}

/// Random forest classifier; predicts the class with the highest mean leaf
/// probability. Classes are the sorted distinct training labels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RandomForestClassifier {
    config: ForestConfig,
    n_features: usize,
    classes: Vec<String>,
    trees: Vec<DecisionTree>,
}

impl RandomForestClassifier {
    pub fn new(config: ForestConfig) -> Self {
        RandomForestClassifier {
            config,
            n_features: 0,
            classes: Vec::new(),
            trees: Vec::new(),
        }
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Labels in column order of `predict_proba`.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Mean class probabilities, one row per sample.
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        check_predict_shape(x, self.n_features, self.trees.len())?;
        let n_classes = self.classes.len();
        let n_trees = self.trees.len() as f64;

        let mut proba = Array2::<f64>::zeros((x.nrows(), n_classes));
        for (i, row) in x.outer_iter().enumerate() {
            for tree in &self.trees {
                for (c, p) in tree.predict_row(row).iter().enumerate() {
                    proba[[i, c]] += p;
                }
            }
        }
        proba.mapv_inplace(|p| p / n_trees);
        Ok(proba)
    }
}

impl Estimator for RandomForestClassifier {
    type Target = String;

    fn fit(&mut self, x: &Array2<f64>, y: &[String]) -> Result<()> {
        check_training_shape(x, y.len())?;

        let classes: BTreeSet<&str> = y.iter().map(String::as_str).collect();
        self.classes = classes.into_iter().map(str::to_string).collect();
        let labels = y
            .iter()
            .map(|label| {
                self.classes
                    .binary_search(label)
                    .map_err(|_| CultureFitError::UnknownLabel {
                        column: self.name().to_string(),
                        label: label.clone(),
                    })
            })
            .collect::<Result<Vec<usize>>>()?;

        self.n_features = x.ncols();
        self.trees = grow_forest(
            &self.config,
            x,
            Targets::Classes {
                labels: &labels,
                n_classes: self.classes.len(),
            },
        );
        log::debug!(
            "Fitted classifier: {} trees, {} classes on {} x {}",
            self.trees.len(),
            self.classes.len(),
            x.nrows(),
            x.ncols()
        );
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Vec<String>> {
        let proba = self.predict_proba(x)?;
        Ok(proba
            .outer_iter()
            .map(|row| {
                // First maximum wins, so ties go to the earlier class.
                let mut best = 0;
                for (c, &p) in row.iter().enumerate() {
                    if p > row[best] {
                        best = c;
                    }
                }
                self.classes[best].clone()
            })
            .collect())
    }

    fn name(&self) -> &str {
        "random_forest_classifier"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn small_config() -> ForestConfig {
        ForestConfig::default().with_n_estimators(25)
    }

    #[test]
    fn regressor_tracks_linear_signal() {
        let x = Array2::from_shape_fn((40, 1), |(i, _)| i as f64);
        let y: Vec<f64> = (0..40).map(|i| 2.0 * i as f64).collect();

        let mut model = RandomForestRegressor::new(small_config());
        model.fit(&x, &y).unwrap();
        assert_eq!(model.n_trees(), 25);

        let pred = model.predict(&array![[5.0], [35.0]]).unwrap();
        assert!((pred[0] - 10.0).abs() < 6.0, "pred[0] = {}", pred[0]);
        assert!((pred[1] - 70.0).abs() < 6.0, "pred[1] = {}", pred[1]);
    }

    #[test]
    fn regressor_predictions_stay_within_target_range() {
        let x = Array2::from_shape_fn((30, 2), |(i, j)| (i * (j + 1)) as f64);
        let y: Vec<f64> = (0..30).map(|i| 20.0 + i as f64).collect();
        let mut model = RandomForestRegressor::new(small_config());
        model.fit(&x, &y).unwrap();

        let far = array![[-1000.0, -1000.0], [1000.0, 1000.0]];
        for p in model.predict(&far).unwrap() {
            assert!((20.0..=49.0).contains(&p), "prediction {} escaped target range", p);
        }
    }

    #[test]
    fn classifier_labels_come_from_training_set() {
        let x = array![[0.0], [0.1], [0.2], [0.8], [0.9], [1.0]];
        let y: Vec<String> = ["b", "b", "b", "a", "a", "a"].iter().map(|s| s.to_string()).collect();

        let mut model = RandomForestClassifier::new(small_config());
        model.fit(&x, &y).unwrap();
        assert_eq!(model.classes(), &["a".to_string(), "b".to_string()]);

        let pred = model.predict(&array![[0.05], [0.95]]).unwrap();
        assert_eq!(pred, vec!["b".to_string(), "a".to_string()]);

        let proba = model.predict_proba(&array![[0.05]]).unwrap();
        let total: f64 = proba.row(0).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn same_seed_gives_identical_forests() {
        let x = Array2::from_shape_fn((50, 3), |(i, j)| ((i * 7 + j * 3) % 11) as f64);
        let y: Vec<f64> = (0..50).map(|i| (i % 13) as f64).collect();

        let mut a = RandomForestRegressor::new(small_config());
        let mut b = RandomForestRegressor::new(small_config());
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.predict(&x).unwrap(), b.predict(&x).unwrap());
    }

    #[test]
    fn unfitted_and_mismatched_inputs_error() {
        let model = RandomForestRegressor::new(small_config());
        assert!(matches!(
            model.predict(&array![[1.0]]),
            Err(CultureFitError::NotFitted)
        ));

        let mut model = RandomForestRegressor::new(small_config());
        model.fit(&array![[1.0, 2.0], [3.0, 4.0]], &[1.0, 2.0]).unwrap();
        assert!(matches!(
            model.predict(&array![[1.0]]),
            Err(CultureFitError::FeatureMismatch { expected: 2, got: 1 })
        ));
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let mut model = RandomForestClassifier::new(small_config());
        let err = model.fit(&array![[1.0], [2.0]], &["a".to_string()]).unwrap_err();
        assert!(matches!(err, CultureFitError::LengthMismatch { rows: 2, targets: 1 }));
    }
}
