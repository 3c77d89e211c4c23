//! Step sequence comparison
//!
//! Runs are reduced to one scalar feature per step (the number of units
//! present) and compared with Levenshtein edit distance.

use crate::experiment::{Experiment, Step};

/// Levenshtein edit distance between two sequences.
///
/// Standard (n+1)×(m+1) table: row and column 0 hold their index, each cell
/// is the minimum of delete (+1), insert (+1) and substitute (+0 if equal,
/// +1 otherwise).
#[must_use]
pub fn edit_distance<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    let (n, m) = (a.len(), b.len());
    let width = m + 1;
    let mut dp = vec![0usize; (n + 1) * width];

    for i in 0..=n {
        dp[i * width] = i;
    }
    for j in 0..=m {
        dp[j] = j;
    }

    for i in 1..=n {
        for j in 1..=m {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            dp[i * width + j] = (dp[(i - 1) * width + j] + 1)
                .min(dp[i * width + j - 1] + 1)
                .min(dp[(i - 1) * width + j - 1] + cost);
        }
    }

    dp[n * width + m]
}

/// Edit-distance similarity: `1 - distance / max(len(a), len(b))`.
///
/// Two empty sequences are identical and score 1.0.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn sequence_similarity<T: PartialEq>(a: &[T], b: &[T]) -> f64 {
    let max_len = a.len().max(b.len());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - edit_distance(a, b) as f64 / max_len as f64
}

/// Unit count at every step, in step order.
#[must_use]
pub fn unit_count_sequence(experiment: &Experiment) -> Vec<usize> {
    experiment.steps().iter().map(Step::unit_count).collect()
}
