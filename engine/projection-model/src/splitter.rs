use crate::error::{ModelError, Result};
use std::ops::Range;

/// One train/validation split over row indices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub train: Range<usize>,
    pub test: Range<usize>,
}

/// Expanding-window k-fold split for ordered data.
///
/// With `test_size = n / (k + 1)`, fold `i` trains on the prefix
/// `[0, n - (k - i) * test_size)` and validates on the `test_size` rows right
/// after it. Validation rows always come after every training row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSeriesSplit {
    pub n_splits: usize,
}

impl Default for TimeSeriesSplit {
    fn default() -> Self {
        Self { n_splits: 3 }
    }
}

impl TimeSeriesSplit {
    pub fn new(n_splits: usize) -> Self {
        Self { n_splits }
    }

    pub fn min_rows(&self) -> usize {
        self.n_splits + 1
    }

    pub fn split(&self, n_rows: usize) -> Result<Vec<Fold>> {
        if self.n_splits == 0 {
            return Err(ModelError::hyperparameter("n_splits must be positive"));
        }
        if n_rows < self.min_rows() {
            return Err(ModelError::InsufficientData { rows: n_rows, required: self.min_rows() });
        }

        let k = self.n_splits;
        let test_size = n_rows / (k + 1);
        Ok((0..k)
            .map(|i| {
                let train_end = n_rows - (k - i) * test_size;
                Fold { train: 0..train_end, test: train_end..train_end + test_size }
            })
            .collect())
    }
}
