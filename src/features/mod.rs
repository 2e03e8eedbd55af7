// Feature extraction: frequency-ranked term vectors and topic vectors.
//
// Both strategies produce a `FeatureVectorSet`, so the similarity engine and
// the exporters never need to know which one ran.

pub mod frequency;
pub mod traits;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// A dense document × feature matrix with labels on both axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVectorSet {
    /// Document ids, one per row
    pub row_labels: Vec<String>,
    /// Feature names (ranked terms or topic names), one per column
    pub column_labels: Vec<String>,
    /// Row-major values; every row has `column_labels.len()` entries
    pub rows: Vec<Vec<f64>>,
}

impl FeatureVectorSet {
    /// Assemble a feature set, checking that the shape is consistent.
    pub fn new(
        row_labels: Vec<String>,
        column_labels: Vec<String>,
        rows: Vec<Vec<f64>>,
    ) -> Result<Self> {
        if row_labels.len() != rows.len() {
            return Err(EngineError::invalid(format!(
                "{} row labels for {} rows",
                row_labels.len(),
                rows.len()
            )));
        }
        if let Some((i, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != column_labels.len())
        {
            return Err(EngineError::invalid(format!(
                "row {i} has {} values, expected {}",
                row.len(),
                column_labels.len()
            )));
        }
        Ok(Self {
            row_labels,
            column_labels,
            rows,
        })
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_columns(&self) -> usize {
        self.column_labels.len()
    }

    pub fn row(&self, index: usize) -> Option<&[f64]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// Values of a single column, looked up by label. `None` for an unknown
    /// label or when some row is too short to have that column.
    pub fn column(&self, label: &str) -> Option<Vec<f64>> {
        let j = self.column_labels.iter().position(|c| c == label)?;
        self.rows.iter().map(|row| row.get(j).copied()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_checked() {
        let ok = FeatureVectorSet::new(
            vec!["d1".into(), "d2".into()],
            vec!["a".into()],
            vec![vec![1.0], vec![2.0]],
        )
        .unwrap();
        assert_eq!(ok.n_rows(), 2);
        assert_eq!(ok.column("a"), Some(vec![1.0, 2.0]));
        assert_eq!(ok.column("b"), None);

        let ragged = FeatureVectorSet::new(
            vec!["d1".into(), "d2".into()],
            vec!["a".into()],
            vec![vec![1.0], vec![2.0, 3.0]],
        );
        assert!(ragged.is_err());
    }

    #[test]
    fn test_column_of_ragged_literal() {
        // Public fields let a caller skip the shape check in `new`
        let ragged = FeatureVectorSet {
            row_labels: vec!["d1".into(), "d2".into()],
            column_labels: vec!["a".into(), "b".into()],
            rows: vec![vec![1.0, 2.0], vec![3.0]],
        };
        assert_eq!(ragged.column("a"), Some(vec![1.0, 3.0]));
        assert_eq!(ragged.column("b"), None);
    }
}
