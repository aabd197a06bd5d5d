//! Sequence-alignment distance
//!
//! Dynamic-programming alignment cost between two feature-vector sequences.
//! The alignment absorbs local time shift and speed variation and accepts
//! sequences of unequal length, which a pointwise comparison of equal-length
//! vectors cannot.

use serde::{Deserialize, Serialize};

/// Pointwise distance between two feature vectors
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DistanceMetric {
    /// Euclidean distance (L2)
    Euclidean,
    /// Manhattan distance (L1)
    Manhattan,
}

impl Default for DistanceMetric {
    fn default() -> Self {
        Self::Euclidean
    }
}

/// Compute the distance between two feature vectors using the given metric
pub fn distance(a: &[f64], b: &[f64], metric: DistanceMetric) -> f64 {
    match metric {
        DistanceMetric::Euclidean => a
            .iter()
            .zip(b.iter())
            .map(|(ai, bi)| {
                let d = ai - bi;
                d * d
            })
            .sum::<f64>()
            .sqrt(),
        DistanceMetric::Manhattan => a.iter().zip(b.iter()).map(|(ai, bi)| (ai - bi).abs()).sum(),
    }
}

/// Alignment cost between two sequences of feature vectors.
///
/// Builds the cost matrix over (step in `a`, step in `b`): each cell is the
/// pointwise distance of the two frames plus the minimum of the diagonal,
/// horizontal, and vertical predecessor cells. The top-left cell is the
/// pointwise distance alone; first-row and first-column cells accumulate from
/// their sole predecessor. The total cost is the bottom-right cell.
///
/// Runs in O(len(a) * len(b)) time with rolling single-row storage. An empty
/// sequence on either side yields `f64::INFINITY`.
pub fn alignment_cost(a: &[Vec<f64>], b: &[Vec<f64>], metric: DistanceMetric) -> f64 {
    if a.is_empty() || b.is_empty() {
        return f64::INFINITY;
    }

    let cols = b.len();
    let mut prev = Vec::with_capacity(cols);
    prev.push(distance(&a[0], &b[0], metric));
    for j in 1..cols {
        let d = distance(&a[0], &b[j], metric);
        prev.push(prev[j - 1] + d);
    }

    let mut curr = vec![0.0; cols];
    for frame in a.iter().skip(1) {
        curr[0] = prev[0] + distance(frame, &b[0], metric);
        for j in 1..cols {
            let best = prev[j - 1].min(prev[j]).min(curr[j - 1]);
            curr[j] = distance(frame, &b[j], metric) + best;
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[cols - 1]
}
