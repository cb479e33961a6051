//! Preprocessor + model units trained and persisted together.
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{CultureFitError, Result};
use crate::models::{Estimator, RandomForestClassifier, RandomForestRegressor};
use crate::preprocessing::Preprocessor;
use crate::schema::FeatureRecord;

/// A fitted column transform paired with the model trained on its output.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pipeline<M> {
    preprocessor: Preprocessor,
    model: M,
}

pub type CultureFitPipeline = Pipeline<RandomForestRegressor>;
pub type LabelPipeline = Pipeline<RandomForestClassifier>;

impl<M: Estimator> Pipeline<M> {
    /// Fit the preprocessor and then the model on the same rows.
    pub fn fit(records: &[&FeatureRecord], targets: &[M::Target], mut model: M) -> Result<Self> {
        let preprocessor = Preprocessor::fit(records)?;
        let x = preprocessor.transform(records);
        model.fit(&x, targets)?;
        Ok(Pipeline {
            preprocessor,
            model,
        })
    }

    pub fn predict(&self, records: &[&FeatureRecord]) -> Result<Vec<M::Target>> {
        let x = self.preprocessor.transform(records);
        self.model.predict(&x)
    }

    /// Predict a single record.
    pub fn predict_one(&self, record: &FeatureRecord) -> Result<M::Target> {
        self.predict(&[record])?
            .into_iter()
            .next()
            .ok_or(CultureFitError::NotFitted)
    }
}

impl<M: Serialize> Pipeline<M> {
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| CultureFitError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::to_writer(BufWriter::new(file), self).map_err(|source| CultureFitError::Serde {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl<M: DeserializeOwned> Pipeline<M> {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| CultureFitError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|source| CultureFitError::Serde {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ForestConfig;

    fn record(openness: f64, pace: &str) -> FeatureRecord {
        FeatureRecord {
            openness,
            conscientiousness: 0.5,
            extraversion: 0.5,
            agreeableness: 0.5,
            neuroticism: 0.5,
            pref_work_pace: pace.to_string(),
            pref_communication: "Neutral".to_string(),
            pref_work_setting: "Hybrid".to_string(),
            value_innovation: 5,
            value_teamwork: 5,
            value_leadership: 5,
            value_ethics: 5,
        }
    }

    #[test]
    fn pipeline_round_trips_through_disk() {
        let rows: Vec<FeatureRecord> = (0..20)
            .map(|i| record(i as f64 / 20.0, if i % 2 == 0 { "Fast" } else { "Slow" }))
            .collect();
        let refs: Vec<&FeatureRecord> = rows.iter().collect();
        let y: Vec<f64> = (0..20).map(|i| i as f64 * 5.0).collect();

        let pipeline = Pipeline::fit(
            &refs,
            &y,
            RandomForestRegressor::new(ForestConfig::default().with_n_estimators(10)),
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reg.json");
        pipeline.save(&path).unwrap();
        let loaded = CultureFitPipeline::load(&path).unwrap();

        assert_eq!(loaded, pipeline);
        let probe = record(0.33, "Balanced");
        assert_eq!(loaded.predict_one(&probe).unwrap(), pipeline.predict_one(&probe).unwrap());
    }

    #[test]
    fn loading_missing_artifact_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = LabelPipeline::load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, CultureFitError::Io { .. }));
    }
}
