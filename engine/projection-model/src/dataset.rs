use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Dense row-major matrix of model inputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    n_rows: usize,
    n_cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    pub fn from_rows<const N: usize>(rows: &[[f64; N]]) -> Self {
        let data = rows.iter().flat_map(|row| row.iter().copied()).collect();
        Self { n_rows: rows.len(), n_cols: N, data }
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.n_cols..(i + 1) * self.n_cols]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        // chunks_exact panics on a zero chunk size
        self.data.chunks_exact(self.n_cols.max(1)).take(self.n_rows)
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.n_cols + col]
    }

    /// Contiguous block of rows
    pub fn slice_rows(&self, range: Range<usize>) -> Matrix {
        let data = self.data[range.start * self.n_cols..range.end * self.n_cols].to_vec();
        Matrix { n_rows: range.len(), n_cols: self.n_cols, data }
    }

    pub fn map_rows(&self, f: impl Fn(&[f64]) -> Vec<f64>) -> Matrix {
        let mut data = Vec::with_capacity(self.data.len());
        for row in self.rows() {
            data.extend(f(row));
        }
        Matrix { n_rows: self.n_rows, n_cols: self.n_cols, data }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_access_and_slicing() {
        let m = Matrix::from_rows(&[[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]);
        assert_eq!(m.n_rows(), 3);
        assert_eq!(m.row(1), &[3.0, 4.0]);
        assert_eq!(m.get(2, 1), 6.0);

        let tail = m.slice_rows(1..3);
        assert_eq!(tail.rows().collect::<Vec<_>>(), vec![&[3.0, 4.0][..], &[5.0, 6.0][..]]);
    }
}
