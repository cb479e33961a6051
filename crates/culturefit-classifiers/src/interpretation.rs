//! Human-readable reading of a `PredictionResult`.
use std::fmt;

use serde::Serialize;

use crate::predictor::PredictionResult;
use crate::schema::ConflictRisk;

/// Band of the 0-100 fit gauge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScoreBand {
    Low,
    Moderate,
    High,
}

impl ScoreBand {
    /// Scores outside 0-100 are clamped before banding.
    pub fn of(score: f64) -> Self {
        let score = score.clamp(0.0, 100.0);
        if score < 40.0 {
            ScoreBand::Low
        } else if score < 70.0 {
            ScoreBand::Moderate
        } else {
            ScoreBand::High
        }
    }
}

impl fmt::Display for ScoreBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScoreBand::Low => "Low",
            ScoreBand::Moderate => "Moderate",
            ScoreBand::High => "High",
        })
    }
}

pub fn fit_insight(score: f64) -> &'static str {
    if score >= 75.0 {
        "Strong cultural alignment; highly compatible with organizational values."
    } else if score >= 55.0 {
        "Moderate fit; onboarding and mentoring will accelerate integration."
    } else {
        "Low cultural match; may require structured guidance."
    }
}

pub fn conflict_insight(risk: ConflictRisk) -> &'static str {
    match risk {
        ConflictRisk::High => "High conflict potential; role restructuring or coaching advised.",
        ConflictRisk::Medium => "Moderate conflict risk; suited for stable, process-driven teams.",
        ConflictRisk::Low => "Low conflict risk; smooth interpersonal compatibility expected.",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Interpretation {
    pub score_band: ScoreBand,
    pub insights: Vec<String>,
}

impl Interpretation {
    pub fn of(result: &PredictionResult) -> Self {
        Interpretation {
            score_band: ScoreBand::of(result.culture_fit_score),
            insights: vec![
                fit_insight(result.culture_fit_score).to_string(),
                conflict_insight(result.conflict_risk).to_string(),
            ],
        }
    }
}

impl fmt::Display for Interpretation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Score band: {}", self.score_band)?;
        for insight in &self.insights {
            writeln!(f, "  - {}", insight)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_edges() {
        assert_eq!(ScoreBand::of(39.99), ScoreBand::Low);
        assert_eq!(ScoreBand::of(40.0), ScoreBand::Moderate);
        assert_eq!(ScoreBand::of(69.99), ScoreBand::Moderate);
        assert_eq!(ScoreBand::of(70.0), ScoreBand::High);
        assert_eq!(ScoreBand::of(-5.0), ScoreBand::Low);
        assert_eq!(ScoreBand::of(130.0), ScoreBand::High);
    }

    #[test]
    fn fit_insight_thresholds() {
        assert!(fit_insight(75.0).starts_with("Strong"));
        assert!(fit_insight(74.9).starts_with("Moderate"));
        assert!(fit_insight(55.0).starts_with("Moderate"));
        assert!(fit_insight(54.9).starts_with("Low"));
    }

    #[test]
    fn interpretation_combines_both_insights() {
        let result = PredictionResult {
            culture_fit_score: 80.0,
            conflict_risk: ConflictRisk::High,
            recommended_team: "R&D".to_string(),
        };
        let reading = Interpretation::of(&result);
        assert_eq!(reading.score_band, ScoreBand::High);
        assert_eq!(reading.insights.len(), 2);
        assert!(reading.insights[1].starts_with("High conflict"));
        assert!(reading.to_string().contains("Score band: High"));
    }
}
