#![allow(dead_code)]

use std::path::{Path, PathBuf};

pub const HEADER: &str = "Openness,Conscientiousness,Extraversion,Agreeableness,Neuroticism,\
Pref_Work_Pace,Pref_Communication,Pref_Work_Setting,\
Value_Innovation,Value_Teamwork,Value_Leadership,Value_Ethics,\
CultureFitScore,ConflictRisk,RecommendedTeam";

const PACES: [&str; 3] = ["Fast", "Balanced", "Slow"];
const COMMUNICATION: [&str; 3] = ["Direct", "Neutral", "Diplomatic"];
const SETTINGS: [&str; 3] = ["Remote", "Hybrid", "Onsite"];
const TEAMS: [&str; 3] = ["Engineering", "Sales", "Research"];

/// Small labelled dataset; every class has several members.
pub fn write_training_csv(dir: &Path, n: usize) -> PathBuf {
    let mut body = String::from(HEADER);
    body.push('\n');
    for i in 0..n {
        let agreeableness = 0.2 + ((i * 29) % 75) as f64 / 100.0;
        let neuroticism = 0.2 + ((i * 41) % 75) as f64 / 100.0;
        let risk = ["Low", "Medium", "High"][i % 3];
        let team = TEAMS[(i / 2) % 3];
        let score = 40.0 + 40.0 * agreeableness - 10.0 * neuroticism;
        body.push_str(&format!(
            "{:.2},0.6,{:.2},{:.2},{:.2},{},{},{},{},{},{},{},{:.1},{},{}\n",
            0.2 + ((i * 37) % 75) as f64 / 100.0,
            0.2 + ((i * 19) % 75) as f64 / 100.0,
            agreeableness,
            neuroticism,
            PACES[i % 3],
            COMMUNICATION[(i / 3) % 3],
            SETTINGS[(i / 9) % 3],
            1 + (i * 7) % 10,
            1 + (i * 3) % 10,
            1 + i % 10,
            1 + (i * 13) % 10,
            score,
            risk,
            team
        ));
    }
    let path = dir.join("train.csv");
    std::fs::write(&path, body).unwrap();
    path
}

pub const SCENARIO_JSON: &str = r#"{
    "Openness": 0.7,
    "Conscientiousness": 0.75,
    "Extraversion": 0.6,
    "Agreeableness": 0.7,
    "Neuroticism": 0.35,
    "Pref_Work_Pace": "Balanced",
    "Pref_Communication": "Neutral",
    "Pref_Work_Setting": "Hybrid",
    "Value_Innovation": 8,
    "Value_Teamwork": 9,
    "Value_Leadership": 7,
    "Value_Ethics": 9
}"#;
