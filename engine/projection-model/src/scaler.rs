use crate::dataset::Matrix;
use crate::error::{ModelError, Result};
use serde::{Deserialize, Serialize};

/// Per-column standardization to zero mean and unit variance.
///
/// Constant columns keep a scale of 1 so they transform to 0 instead of NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    pub fn fit(x: &Matrix) -> Result<Self> {
        if x.n_rows() == 0 {
            return Err(ModelError::InsufficientData { rows: 0, required: 1 });
        }
        let n = x.n_rows() as f64;
        let mut mean = vec![0.0; x.n_cols()];
        for row in x.rows() {
            for (m, v) in mean.iter_mut().zip(row) {
                *m += v / n;
            }
        }
        let mut variance = vec![0.0; x.n_cols()];
        for row in x.rows() {
            for ((var, v), m) in variance.iter_mut().zip(row).zip(&mean) {
                *var += (v - m).powi(2) / n;
            }
        }
        let scale = variance.into_iter().map(|v| if v > f64::EPSILON { v.sqrt() } else { 1.0 }).collect();
        Ok(Self { mean, scale })
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    pub fn transform_row(&self, row: &[f64]) -> Result<Vec<f64>> {
        if row.len() != self.mean.len() {
            return Err(ModelError::ShapeMismatch { expected: self.mean.len(), found: row.len() });
        }
        Ok(row.iter().zip(&self.mean).zip(&self.scale).map(|((v, m), s)| (v - m) / s).collect())
    }

    pub fn transform(&self, x: &Matrix) -> Result<Matrix> {
        if x.n_cols() != self.mean.len() {
            return Err(ModelError::ShapeMismatch { expected: self.mean.len(), found: x.n_cols() });
        }
        Ok(x.map_rows(|row| row.iter().zip(&self.mean).zip(&self.scale).map(|((v, m), s)| (v - m) / s).collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standardizes_columns() {
        let x = Matrix::from_rows(&[[1.0, 5.0], [3.0, 5.0]]);
        let scaler = StandardScaler::fit(&x).unwrap();
        let scaled = scaler.transform(&x).unwrap();
        assert_eq!(scaled.row(0), &[-1.0, 0.0]);
        assert_eq!(scaled.row(1), &[1.0, 0.0]);
    }

    #[test]
    fn test_width_is_checked() {
        let scaler = StandardScaler::fit(&Matrix::from_rows(&[[1.0, 2.0, 3.0]])).unwrap();
        assert!(matches!(scaler.transform_row(&[1.0]), Err(ModelError::ShapeMismatch { expected: 3, found: 1 })));
    }
}
