//! Dataset loading and train/test partitioning.
//!
//! The training CSV must carry the twelve feature columns and the three
//! target columns; extra columns are ignored. Every cell of a required
//! column must parse, otherwise loading fails as a whole.
use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::{CultureFitError, Result};
use crate::schema::{
    ConflictRisk, FeatureRecord, TrainingRecord, FEATURE_COLUMNS, TARGET_COLUMNS,
    TARGET_CONFLICT_RISK, TARGET_CULTURE_FIT, TARGET_TEAM,
};

/// Tab for `.tsv` files (any case), comma otherwise.
pub fn delimiter_for(path: &Path) -> u8 {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
        _ => b',',
    }
}

#[derive(Debug, Clone)]
pub struct Dataset {
    pub records: Vec<TrainingRecord>,
}

impl Dataset {
    /// Load a training dataset from a CSV (or `.tsv`) file.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let reader = ReaderBuilder::new()
            .delimiter(delimiter_for(path))
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|source| CultureFitError::Dataset {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_csv_reader(reader, path)
    }

    /// Load a comma-separated dataset from any reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        Self::from_csv_reader(reader, Path::new("<reader>"))
    }

    fn from_csv_reader<R: Read>(mut reader: csv::Reader<R>, path: &Path) -> Result<Self> {
        let headers = reader
            .headers()
            .map_err(|source| CultureFitError::Dataset {
                path: path.to_path_buf(),
                source,
            })?
            .clone();
        let columns = ColumnIndex::resolve(&headers, FEATURE_COLUMNS.iter().chain(TARGET_COLUMNS.iter()))?;

        let mut records = Vec::new();
        for (i, row) in reader.records().enumerate() {
            let row = row.map_err(|source| CultureFitError::Dataset {
                path: path.to_path_buf(),
                source,
            })?;
            let cells = RowCells {
                row: &row,
                line: i + 1,
                columns: &columns,
            };
            records.push(TrainingRecord {
                features: cells.feature_record()?,
                culture_fit_score: cells.float(TARGET_CULTURE_FIT)?,
                conflict_risk: cells
                    .text(TARGET_CONFLICT_RISK)?
                    .parse::<ConflictRisk>()
                    .map_err(|_| cells.invalid(TARGET_CONFLICT_RISK))?,
                recommended_team: cells.text(TARGET_TEAM)?.to_string(),
            });
        }

        if records.is_empty() {
            return Err(CultureFitError::EmptyDataset);
        }
        Ok(Dataset { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn features(&self, indices: &[usize]) -> Vec<&FeatureRecord> {
        indices.iter().map(|&i| &self.records[i].features).collect()
    }

    pub fn culture_fit_scores(&self, indices: &[usize]) -> Vec<f64> {
        indices
            .iter()
            .map(|&i| self.records[i].culture_fit_score)
            .collect()
    }

    pub fn conflict_risks(&self, indices: &[usize]) -> Vec<String> {
        indices
            .iter()
            .map(|&i| self.records[i].conflict_risk.to_string())
            .collect()
    }

    pub fn teams(&self, indices: &[usize]) -> Vec<String> {
        indices
            .iter()
            .map(|&i| self.records[i].recommended_team.clone())
            .collect()
    }

    pub fn log_input_data_summary(&self) {
        let mut risk_counts: BTreeMap<ConflictRisk, usize> = BTreeMap::new();
        let mut team_counts: BTreeMap<&str, usize> = BTreeMap::new();
        for r in &self.records {
            *risk_counts.entry(r.conflict_risk).or_default() += 1;
            *team_counts.entry(r.recommended_team.as_str()).or_default() += 1;
        }

        println!("----- Input Data Summary -----");
        println!("Info: {} candidate rows, {} feature columns", self.len(), FEATURE_COLUMNS.len());
        for (risk, count) in &risk_counts {
            println!("Info: ConflictRisk {:<8} {}", risk.as_str(), count);
        }
        println!("Info: {} distinct teams", team_counts.len());
        println!("-------------------------------");
    }
}

/// Positions of the required columns in the header row.
struct ColumnIndex {
    positions: BTreeMap<&'static str, usize>,
}

impl ColumnIndex {
    fn resolve<'a, I>(headers: &StringRecord, required: I) -> Result<Self>
    where
        I: Iterator<Item = &'a &'static str>,
    {
        let mut positions = BTreeMap::new();
        let mut missing = Vec::new();
        for &name in required {
            match headers.iter().position(|h| h == name) {
                Some(pos) => {
                    positions.insert(name, pos);
                }
                None => missing.push(name.to_string()),
            }
        }
        if !missing.is_empty() {
            return Err(CultureFitError::MissingColumns(missing));
        }
        Ok(ColumnIndex { positions })
    }
}

/// Typed access to the cells of one data row.
struct RowCells<'a> {
    row: &'a StringRecord,
    line: usize,
    columns: &'a ColumnIndex,
}

impl<'a> RowCells<'a> {
    fn raw(&self, column: &str) -> &'a str {
        self.columns
            .positions
            .get(column)
            .and_then(|&pos| self.row.get(pos))
            .unwrap_or("")
    }

    fn invalid(&self, column: &str) -> CultureFitError {
        CultureFitError::InvalidCell {
            row: self.line,
            column: column.to_string(),
            value: self.raw(column).to_string(),
        }
    }

    fn text(&self, column: &str) -> Result<&'a str> {
        let value = self.raw(column);
        if value.is_empty() {
            return Err(self.invalid(column));
        }
        Ok(value)
    }

    fn float(&self, column: &str) -> Result<f64> {
        self.text(column)?
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| self.invalid(column))
    }

    /// Integers written as `8` or `8.0` are both accepted.
    fn integer(&self, column: &str) -> Result<i64> {
        let value = self.text(column)?;
        if let Ok(v) = value.parse::<i64>() {
            return Ok(v);
        }
        match value.parse::<f64>() {
            Ok(v) if v.is_finite() && v.fract() == 0.0 => Ok(v as i64),
            _ => Err(self.invalid(column)),
        }
    }

    fn feature_record(&self) -> Result<FeatureRecord> {
        Ok(FeatureRecord {
            openness: self.float("Openness")?,
            conscientiousness: self.float("Conscientiousness")?,
            extraversion: self.float("Extraversion")?,
            agreeableness: self.float("Agreeableness")?,
            neuroticism: self.float("Neuroticism")?,
            pref_work_pace: self.text("Pref_Work_Pace")?.to_string(),
            pref_communication: self.text("Pref_Communication")?.to_string(),
            pref_work_setting: self.text("Pref_Work_Setting")?.to_string(),
            value_innovation: self.integer("Value_Innovation")?,
            value_teamwork: self.integer("Value_Teamwork")?,
            value_leadership: self.integer("Value_Leadership")?,
            value_ethics: self.integer("Value_Ethics")?,
        })
    }
}

/// Load feature-only rows (no targets), e.g. for batch inference.
pub fn read_feature_records<P: AsRef<Path>>(path: P) -> Result<Vec<FeatureRecord>> {
    let path = path.as_ref();
    let to_err = |source| CultureFitError::Dataset {
        path: PathBuf::from(path),
        source,
    };
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter_for(path))
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(to_err)?;
    let headers = reader.headers().map_err(to_err)?.clone();
    let columns = ColumnIndex::resolve(&headers, FEATURE_COLUMNS.iter())?;

    let mut records = Vec::new();
    for (i, row) in reader.records().enumerate() {
        let row = row.map_err(to_err)?;
        let cells = RowCells {
            row: &row,
            line: i + 1,
            columns: &columns,
        };
        records.push(cells.feature_record()?);
    }
    Ok(records)
}

/// Row indices of a train/test partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

fn split_sizes(n_samples: usize, test_size: f64) -> Result<(usize, usize)> {
    let invalid = CultureFitError::InvalidSplit {
        n_samples,
        test_size,
    };
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(invalid);
    }
    let n_test = (test_size * n_samples as f64).ceil() as usize;
    if n_test == 0 || n_test >= n_samples {
        return Err(invalid);
    }
    Ok((n_samples - n_test, n_test))
}

/// Shuffled train/test split with `ceil(test_size * n)` test rows.
pub fn train_test_split(n_samples: usize, test_size: f64, seed: u64) -> Result<Split> {
    let (n_train, _) = split_sizes(n_samples, test_size)?;
    let mut rng = StdRng::seed_from_u64(seed);
    let mut indices: Vec<usize> = (0..n_samples).collect();
    indices.shuffle(&mut rng);
    let test = indices.split_off(n_train);
    Ok(Split {
        train: indices,
        test,
    })
}

/// Train/test split that preserves each label's share in both partitions.
///
/// Test rows are allocated per class proportionally, with the leftover rows
/// going to the classes with the largest fractional share (ties to the
/// earlier label). Every class needs at least two members.
pub fn stratified_train_test_split<S: AsRef<str>>(labels: &[S], test_size: f64, seed: u64) -> Result<Split> {
    let n_samples = labels.len();
    let (n_train, n_test) = split_sizes(n_samples, test_size)?;

    let mut by_class: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (i, label) in labels.iter().enumerate() {
        by_class.entry(label.as_ref()).or_default().push(i);
    }
    for (label, members) in &by_class {
        if members.len() < 2 {
            return Err(CultureFitError::StratifyTooFewMembers {
                label: label.to_string(),
                count: members.len(),
            });
        }
    }
    if by_class.len() > n_test || by_class.len() > n_train {
        return Err(CultureFitError::InvalidSplit {
            n_samples,
            test_size,
        });
    }

    // Largest-remainder allocation of the test rows.
    let mut alloc: Vec<usize> = Vec::with_capacity(by_class.len());
    let mut remainders: Vec<(f64, usize)> = Vec::with_capacity(by_class.len());
    for (k, members) in by_class.values().enumerate() {
        let exact = n_test as f64 * members.len() as f64 / n_samples as f64;
        alloc.push(exact.floor() as usize);
        remainders.push((exact - exact.floor(), k));
    }
    remainders.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));
    let sizes: Vec<usize> = by_class.values().map(Vec::len).collect();
    let mut left = n_test - alloc.iter().sum::<usize>();
    while left > 0 {
        let before = left;
        for &(_, k) in &remainders {
            if left == 0 {
                break;
            }
            if alloc[k] < sizes[k] - 1 {
                alloc[k] += 1;
                left -= 1;
            }
        }
        if left == before {
            break;
        }
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(n_train);
    let mut test = Vec::with_capacity(n_test);
    for (k, members) in by_class.values().enumerate() {
        let mut members = members.clone();
        members.shuffle(&mut rng);
        test.extend_from_slice(&members[..alloc[k]]);
        train.extend_from_slice(&members[alloc[k]..]);
    }
    train.shuffle(&mut rng);
    test.shuffle(&mut rng);

    Ok(Split { train, test })
}
