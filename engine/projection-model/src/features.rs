//! Record to feature-vector mapping

use crate::dataset::Matrix;
use crate::label::SyntheticLabeler;
use roster_normalizer::{FantasyPosition, NormalizedPlayerRecord};
use roster_sources::RawNumber;

pub const DEFAULT_AGE: f64 = 25.0;
pub const DEFAULT_YEARS_EXP: f64 = 0.0;
pub const DEFAULT_WEIGHT: f64 = 200.0;
pub const DEFAULT_DEPTH: f64 = 2.0;
const WEIGHT_SCALE: f64 = 250.0;

/// Column order of every feature vector and of the trained models' inputs
pub const FEATURE_NAMES: [&str; 16] = [
    "age",
    "years_exp",
    "weight_norm",
    "depth_chart_order",
    "age_exp_ratio",
    "pos_rb",
    "pos_wr",
    "pos_qb",
    "pos_te",
    "pos_k",
    "pos_def",
    "is_rookie",
    "is_veteran",
    "prime_age",
    "is_starter",
    "is_backup",
];

pub const FEATURE_COUNT: usize = FEATURE_NAMES.len();

pub type FeatureVector = [f64; FEATURE_COUNT];

/// Numeric attributes after coercion and default substitution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerAttributes {
    pub position: FantasyPosition,
    pub age: f64,
    pub years_exp: f64,
    pub weight: f64,
    pub depth: f64,
}

impl PlayerAttributes {
    /// Coerce a record's raw scalars; anything missing or unparsable takes its default
    pub fn from_record(record: &NormalizedPlayerRecord) -> Self {
        let coerce = |value: &Option<RawNumber>, default: f64| value.as_ref().and_then(RawNumber::as_f64).unwrap_or(default);
        Self {
            position: record.position,
            age: coerce(&record.age, DEFAULT_AGE),
            years_exp: coerce(&record.years_exp, DEFAULT_YEARS_EXP),
            weight: coerce(&record.weight, DEFAULT_WEIGHT),
            depth: coerce(&record.depth_chart_order, DEFAULT_DEPTH),
        }
    }

    pub fn features(&self) -> FeatureVector {
        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        let position = self.position;
        let mut vector = [
            self.age,
            self.years_exp,
            self.weight / WEIGHT_SCALE,
            self.depth,
            self.age / (self.years_exp + 1.0),
            flag(position == FantasyPosition::RB),
            flag(position == FantasyPosition::WR),
            flag(position == FantasyPosition::QB),
            flag(position == FantasyPosition::TE),
            flag(position == FantasyPosition::K),
            flag(position.is_defense()),
            flag(self.years_exp == 0.0),
            flag(self.years_exp >= 5.0),
            flag((24.0..=29.0).contains(&self.age)),
            flag(self.depth == 1.0),
            flag(self.depth == 2.0),
        ];
        // age_exp_ratio blows up for years_exp == -1
        for value in vector.iter_mut() {
            if !value.is_finite() {
                *value = 0.0;
            }
        }
        vector
    }
}

/// Feature matrix and synthetic labels for a batch, in input order
pub fn featurize(records: &[NormalizedPlayerRecord], label_seed: u64) -> (Matrix, Vec<f64>) {
    let mut labeler = SyntheticLabeler::new(label_seed);
    let mut rows = Vec::with_capacity(records.len());
    let mut labels = Vec::with_capacity(records.len());
    for record in records {
        let attributes = PlayerAttributes::from_record(record);
        rows.push(attributes.features());
        labels.push(labeler.label(&attributes));
    }
    (Matrix::from_rows(&rows), labels)
}

/// Feature matrix alone, for projection
pub fn feature_matrix(records: &[NormalizedPlayerRecord]) -> Matrix {
    let rows: Vec<FeatureVector> = records.iter().map(|r| PlayerAttributes::from_record(r).features()).collect();
    Matrix::from_rows(&rows)
}
