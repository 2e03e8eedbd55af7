// Pairwise cosine similarity over a feature vector set.
//
// Works on any FeatureVectorSet, so frequency vectors and topic vectors are
// compared the same way. All-zero rows compare as 0.0 with everything
// (including themselves) instead of producing NaN.

use serde::{Deserialize, Serialize};

use crate::features::FeatureVectorSet;

/// Square similarity matrix with the same labels on both axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityMatrix {
    pub labels: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl SimilarityMatrix {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.values.get(i).and_then(|row| row.get(j)).copied()
    }

    /// Similarity between two documents looked up by id.
    pub fn between(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.labels.iter().position(|l| l == a)?;
        let j = self.labels.iter().position(|l| l == b)?;
        self.get(i, j)
    }

    /// The `n` documents most similar to document `i`, excluding itself.
    ///
    /// Ties keep document order.
    pub fn most_similar(&self, i: usize, n: usize) -> Vec<(String, f64)> {
        let Some(row) = self.values.get(i) else {
            return Vec::new();
        };
        let mut others: Vec<(usize, f64)> = row
            .iter()
            .copied()
            .enumerate()
            .filter(|&(j, _)| j != i)
            .collect();
        others.sort_by(|a, b| b.1.total_cmp(&a.1));
        others
            .into_iter()
            .take(n)
            .map(|(j, s)| (self.labels[j].clone(), s))
            .collect()
    }
}

/// Cosine similarity between two vectors, clamped to `[0, 1]`.
///
/// Returns 0.0 for mismatched lengths or when either vector is all zeros.
pub fn cosine(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let mag_a = magnitude(a);
    let mag_b = magnitude(b);

    if mag_a == 0.0 || mag_b == 0.0 {
        0.0
    } else {
        (dot / (mag_a * mag_b)).clamp(0.0, 1.0)
    }
}

fn magnitude(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// Cosine similarity between every pair of rows.
pub fn pairwise_cosine(vectors: &FeatureVectorSet) -> SimilarityMatrix {
    let n = vectors.n_rows();
    let nonzero: Vec<bool> = vectors
        .rows
        .iter()
        .map(|row| row.iter().any(|&x| x != 0.0))
        .collect();

    let mut values = vec![vec![0.0; n]; n];
    for i in 0..n {
        if !nonzero[i] {
            continue;
        }
        values[i][i] = 1.0;
        for j in (i + 1)..n {
            if !nonzero[j] {
                continue;
            }
            let a = &vectors.rows[i];
            let b = &vectors.rows[j];
            // Identical rows are exactly 1 regardless of rounding in the norms
            let sim = if a == b { 1.0 } else { cosine(a, b) };
            values[i][j] = sim;
            values[j][i] = sim;
        }
    }

    SimilarityMatrix {
        labels: vectors.row_labels.clone(),
        values,
    }
}
