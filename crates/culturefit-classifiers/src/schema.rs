//! Candidate feature schema shared by training and inference.
//!
//! The twelve input columns and three target columns are fixed here. The
//! column-order constants are the only place the order is defined; the
//! preprocessor, the CSV loader and the batch writer all read from them.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CultureFitError, PredictError};

/// Continuous and integer columns, in the order they are passed through.
pub const NUMERIC_FEATURES: [&str; 9] = [
    "Openness",
    "Conscientiousness",
    "Extraversion",
    "Agreeableness",
    "Neuroticism",
    "Value_Innovation",
    "Value_Teamwork",
    "Value_Leadership",
    "Value_Ethics",
];

/// Categorical columns, in the order they are one-hot expanded.
pub const CATEGORICAL_FEATURES: [&str; 3] =
    ["Pref_Work_Pace", "Pref_Communication", "Pref_Work_Setting"];

/// All feature columns in dataset order.
pub const FEATURE_COLUMNS: [&str; 12] = [
    "Openness",
    "Conscientiousness",
    "Extraversion",
    "Agreeableness",
    "Neuroticism",
    "Pref_Work_Pace",
    "Pref_Communication",
    "Pref_Work_Setting",
    "Value_Innovation",
    "Value_Teamwork",
    "Value_Leadership",
    "Value_Ethics",
];

pub const TARGET_CULTURE_FIT: &str = "CultureFitScore";
pub const TARGET_CONFLICT_RISK: &str = "ConflictRisk";
pub const TARGET_TEAM: &str = "RecommendedTeam";

/// Allowed range of the `Value_*` scores.
pub const VALUE_SCORE_RANGE: std::ops::RangeInclusive<i64> = 1..=10;

pub const TARGET_COLUMNS: [&str; 3] = [TARGET_CULTURE_FIT, TARGET_CONFLICT_RISK, TARGET_TEAM];

/// One candidate's traits, preferences and value scores.
///
/// Field names on the wire match the dataset column names exactly. Every
/// field is required; serde rejects a body with any of them missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    #[serde(rename = "Openness")]
    pub openness: f64,
    #[serde(rename = "Conscientiousness")]
    pub conscientiousness: f64,
    #[serde(rename = "Extraversion")]
    pub extraversion: f64,
    #[serde(rename = "Agreeableness")]
    pub agreeableness: f64,
    #[serde(rename = "Neuroticism")]
    pub neuroticism: f64,
    #[serde(rename = "Pref_Work_Pace")]
    pub pref_work_pace: String,
    #[serde(rename = "Pref_Communication")]
    pub pref_communication: String,
    #[serde(rename = "Pref_Work_Setting")]
    pub pref_work_setting: String,
    #[serde(rename = "Value_Innovation")]
    pub value_innovation: i64,
    #[serde(rename = "Value_Teamwork")]
    pub value_teamwork: i64,
    #[serde(rename = "Value_Leadership")]
    pub value_leadership: i64,
    #[serde(rename = "Value_Ethics")]
    pub value_ethics: i64,
}

impl FeatureRecord {
    /// Numeric columns in `NUMERIC_FEATURES` order.
    pub fn numeric_values(&self) -> [f64; 9] {
        [
            self.openness,
            self.conscientiousness,
            self.extraversion,
            self.agreeableness,
            self.neuroticism,
            self.value_innovation as f64,
            self.value_teamwork as f64,
            self.value_leadership as f64,
            self.value_ethics as f64,
        ]
    }

    /// Categorical columns in `CATEGORICAL_FEATURES` order.
    pub fn categorical_values(&self) -> [&str; 3] {
        [
            self.pref_work_pace.as_str(),
            self.pref_communication.as_str(),
            self.pref_work_setting.as_str(),
        ]
    }

    /// Check the invariants serde cannot express: trait scores must be
    /// finite and value scores must lie in `VALUE_SCORE_RANGE`.
    pub fn validate(&self) -> Result<(), PredictError> {
        let traits = [
            ("Openness", self.openness),
            ("Conscientiousness", self.conscientiousness),
            ("Extraversion", self.extraversion),
            ("Agreeableness", self.agreeableness),
            ("Neuroticism", self.neuroticism),
        ];
        for (name, value) in traits {
            if !value.is_finite() {
                return Err(PredictError::Validation(format!(
                    "{} must be a finite number, got {}",
                    name, value
                )));
            }
        }

        let values = [
            ("Value_Innovation", self.value_innovation),
            ("Value_Teamwork", self.value_teamwork),
            ("Value_Leadership", self.value_leadership),
            ("Value_Ethics", self.value_ethics),
        ];
        for (name, value) in values {
            if !VALUE_SCORE_RANGE.contains(&value) {
                return Err(PredictError::Validation(format!(
                    "{} must be between {} and {}, got {}",
                    name,
                    VALUE_SCORE_RANGE.start(),
                    VALUE_SCORE_RANGE.end(),
                    value
                )));
            }
        }
        Ok(())
    }

    /// Cell values in `FEATURE_COLUMNS` order, for writing CSV output.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.openness.to_string(),
            self.conscientiousness.to_string(),
            self.extraversion.to_string(),
            self.agreeableness.to_string(),
            self.neuroticism.to_string(),
            self.pref_work_pace.clone(),
            self.pref_communication.clone(),
            self.pref_work_setting.clone(),
            self.value_innovation.to_string(),
            self.value_teamwork.to_string(),
            self.value_leadership.to_string(),
            self.value_ethics.to_string(),
        ]
    }
}

/// Ordinal conflict risk label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConflictRisk {
    Low,
    Medium,
    High,
}

impl ConflictRisk {
    pub const ALL: [ConflictRisk; 3] = [ConflictRisk::Low, ConflictRisk::Medium, ConflictRisk::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictRisk::Low => "Low",
            ConflictRisk::Medium => "Medium",
            ConflictRisk::High => "High",
        }
    }
}

impl fmt::Display for ConflictRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConflictRisk {
    type Err = CultureFitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Low" => Ok(ConflictRisk::Low),
            "Medium" => Ok(ConflictRisk::Medium),
            "High" => Ok(ConflictRisk::High),
            other => Err(CultureFitError::UnknownLabel {
                column: TARGET_CONFLICT_RISK.to_string(),
                label: other.to_string(),
            }),
        }
    }
}

/// A labelled dataset row: features plus the three training targets.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingRecord {
    pub features: FeatureRecord,
    pub culture_fit_score: f64,
    pub conflict_risk: ConflictRisk,
    pub recommended_team: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_columns_cover_numeric_and_categorical() {
        for name in NUMERIC_FEATURES.iter().chain(CATEGORICAL_FEATURES.iter()) {
            assert!(FEATURE_COLUMNS.contains(name), "{} missing", name);
        }
        assert_eq!(NUMERIC_FEATURES.len() + CATEGORICAL_FEATURES.len(), FEATURE_COLUMNS.len());
    }

    #[test]
    fn conflict_risk_parses_known_labels_only() {
        assert_eq!("Low".parse::<ConflictRisk>().unwrap(), ConflictRisk::Low);
        assert_eq!(" High ".parse::<ConflictRisk>().unwrap(), ConflictRisk::High);
        assert!("Severe".parse::<ConflictRisk>().is_err());
    }

    fn valid_record() -> FeatureRecord {
        FeatureRecord {
            openness: 0.7,
            conscientiousness: 0.75,
            extraversion: 0.6,
            agreeableness: 0.7,
            neuroticism: 0.35,
            pref_work_pace: "Balanced".to_string(),
            pref_communication: "Neutral".to_string(),
            pref_work_setting: "Hybrid".to_string(),
            value_innovation: 8,
            value_teamwork: 9,
            value_leadership: 7,
            value_ethics: 9,
        }
    }

    #[test]
    fn value_scores_outside_one_to_ten_are_rejected() {
        assert!(valid_record().validate().is_ok());

        let mut record = valid_record();
        record.value_innovation = 1;
        record.value_ethics = 10;
        assert!(record.validate().is_ok());

        record.value_ethics = 1000;
        match record.validate() {
            Err(PredictError::Validation(msg)) => assert!(msg.contains("Value_Ethics")),
            other => panic!("expected Validation, got {:?}", other),
        }

        let mut record = valid_record();
        record.value_teamwork = -3;
        assert!(matches!(record.validate(), Err(PredictError::Validation(_))));
    }

    #[test]
    fn non_finite_trait_is_rejected() {
        let mut record = valid_record();
        record.neuroticism = f64::NAN;
        assert!(matches!(record.validate(), Err(PredictError::Validation(_))));
    }

    #[test]
    fn missing_field_is_rejected_by_serde() {
        let json = r#"{
            "Openness": 0.7, "Conscientiousness": 0.75, "Extraversion": 0.6,
            "Agreeableness": 0.7, "Neuroticism": 0.35,
            "Pref_Work_Pace": "Balanced", "Pref_Communication": "Neutral",
            "Pref_Work_Setting": "Hybrid",
            "Value_Innovation": 8, "Value_Teamwork": 9, "Value_Leadership": 7
        }"#;
        let err = serde_json::from_str::<FeatureRecord>(json).unwrap_err();
        assert!(err.to_string().contains("Value_Ethics"));
    }
}
