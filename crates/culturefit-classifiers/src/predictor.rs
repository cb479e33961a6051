//! The three fitted pipelines and the inference seam around them.
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CultureFitError, PredictError, Result};
use crate::pipeline::{CultureFitPipeline, LabelPipeline};
use crate::schema::{ConflictRisk, FeatureRecord};

pub const CULTURE_FIT_MODEL_FILE: &str = "culture_fit_reg.json";
pub const CONFLICT_RISK_MODEL_FILE: &str = "conflict_risk_clf.json";
pub const TEAM_FIT_MODEL_FILE: &str = "team_fit_clf.json";

/// Combined answer for one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub culture_fit_score: f64,
    pub conflict_risk: ConflictRisk,
    pub recommended_team: String,
}

/// Anything that can answer a `/predict_all` request.
pub trait CulturePredictor: Send + Sync {
    fn predict_all(&self, record: &FeatureRecord) -> std::result::Result<PredictionResult, PredictError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelBundle {
    pub culture_fit: CultureFitPipeline,
    pub conflict_risk: LabelPipeline,
    pub team_fit: LabelPipeline,
}

impl ModelBundle {
    /// Load all three artifacts from `models_dir`. Any missing or unreadable
    /// file fails the whole load.
    pub fn load<P: AsRef<Path>>(models_dir: P) -> Result<Self> {
        let dir = models_dir.as_ref();
        let bundle = ModelBundle {
            culture_fit: CultureFitPipeline::load(dir.join(CULTURE_FIT_MODEL_FILE))?,
            conflict_risk: LabelPipeline::load(dir.join(CONFLICT_RISK_MODEL_FILE))?,
            team_fit: LabelPipeline::load(dir.join(TEAM_FIT_MODEL_FILE))?,
        };
        log::info!("Loaded models from {}", dir.display());
        Ok(bundle)
    }

    /// Write all three artifacts into `models_dir`, creating it if needed.
    pub fn save<P: AsRef<Path>>(&self, models_dir: P) -> Result<()> {
        let dir = models_dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|source| CultureFitError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        self.culture_fit.save(dir.join(CULTURE_FIT_MODEL_FILE))?;
        self.conflict_risk.save(dir.join(CONFLICT_RISK_MODEL_FILE))?;
        self.team_fit.save(dir.join(TEAM_FIT_MODEL_FILE))?;
        log::info!("Saved models to {}", dir.display());
        Ok(())
    }
}

fn prediction_error(model: &str, err: impl std::fmt::Display) -> PredictError {
    PredictError::Prediction(format!("{} model: {}", model, err))
}

impl CulturePredictor for ModelBundle {
    fn predict_all(&self, record: &FeatureRecord) -> std::result::Result<PredictionResult, PredictError> {
        record.validate()?;

        let culture_fit_score = self
            .culture_fit
            .predict_one(record)
            .map_err(|e| prediction_error("culture fit", e))?;
        if !culture_fit_score.is_finite() {
            return Err(prediction_error("culture fit", "non-finite score"));
        }

        let conflict_risk = self
            .conflict_risk
            .predict_one(record)
            .map_err(|e| prediction_error("conflict risk", e))?
            .parse::<ConflictRisk>()
            .map_err(|e| prediction_error("conflict risk", e))?;

        let recommended_team = self
            .team_fit
            .predict_one(record)
            .map_err(|e| prediction_error("team fit", e))?;

        Ok(PredictionResult {
            culture_fit_score,
            conflict_risk,
            recommended_team,
        })
    }
}
