//! Trajectory similarity metrics
//!
//! Three independent comparators over two unit trajectories:
//!
//! - **DTW similarity**: dynamic time warping cost, normalized into a signed
//!   score where 1.0 means identical paths
//! - **Path overlap**: cross-trajectory position pairs within a distance
//!   threshold, relative to the longer trajectory
//! - **Average distance deviation**: mean index-aligned distance over the
//!   shorter length
//!
//! DTW and overlap are O(n·m) in time. DTW also keeps an (n+1)×(m+1) table,
//! so very long trajectories are expensive. Callers that need bounded
//! latency should limit trajectory length upstream.

use serde::{Deserialize, Serialize};

use super::Trajectory;
use crate::experiment::Position;
use crate::{AnalysisConfig, Error, Result};

/// Metric triple computed for one unit present in both experiments.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitMetrics {
    /// DTW similarity, see [`dtw_similarity`]
    pub dtw_similarity: f64,
    /// Path overlap ratio, see [`path_overlap`]
    pub path_overlap: f64,
    /// Average distance deviation, see [`average_distance_deviation`]
    pub average_distance: f64,
}

impl UnitMetrics {
    /// Compute all three metrics for a pair of trajectories.
    ///
    /// # Errors
    ///
    /// Returns error if either trajectory is empty or their positions differ
    /// in dimension
    pub fn compute(a: &Trajectory, b: &Trajectory, config: &AnalysisConfig) -> Result<Self> {
        Ok(Self {
            dtw_similarity: dtw_similarity(a, b)?,
            path_overlap: path_overlap(a, b, config.overlap_threshold)?,
            average_distance: average_distance_deviation(a, b)?,
        })
    }
}

fn positions(trajectory: &Trajectory) -> Result<Vec<&Position>> {
    if trajectory.is_empty() {
        return Err(Error::EmptyTrajectory {
            unit: trajectory.unit().to_string(),
        });
    }
    Ok(trajectory.positions().collect())
}

/// Dynamic time warping similarity.
///
/// Fills the cumulative cost table
/// `cost(i, j) = d(a[i-1], b[j-1]) + min(cost(i-1, j), cost(i, j-1), cost(i-1, j-1))`
/// with row 0 and column 0 at +inf except `cost(0, 0) = 0`, then returns
/// `1 - cost(n, m) / (normalizer * max(n, m))`.
///
/// The normalizer is the largest distance from the coordinate origin of any
/// position in either trajectory, not the extent of the paths. Scores stay
/// comparable across units sharing a map frame, but they are not clamped and
/// go negative when the misalignment is large next to that normalizer. When
/// every position sits at the origin the paths are identical and the score
/// is 1.0.
///
/// Distances are accumulated with `hypot`, so coordinates far beyond any map
/// scale still give a finite score. Only inputs whose differences or path
/// costs exceed `f64::MAX` saturate to infinity, and the score is then NaN.
///
/// # Errors
///
/// Returns [`Error::EmptyTrajectory`] if either trajectory is empty, or
/// [`Error::Shape`] if their positions differ in dimension
#[allow(clippy::cast_precision_loss)]
pub fn dtw_similarity(a: &Trajectory, b: &Trajectory) -> Result<f64> {
    let path1 = positions(a)?;
    let path2 = positions(b)?;
    let (n, m) = (path1.len(), path2.len());
    let width = m + 1;

    let mut cost = vec![f64::INFINITY; (n + 1) * width];
    cost[0] = 0.0;

    for i in 1..=n {
        for j in 1..=m {
            let d = path1[i - 1].distance(path2[j - 1])?;
            let best = cost[(i - 1) * width + j]
                .min(cost[i * width + j - 1])
                .min(cost[(i - 1) * width + j - 1]);
            cost[i * width + j] = d + best;
        }
    }

    let normalizer = path1
        .iter()
        .chain(&path2)
        .map(|p| p.norm())
        .fold(0.0_f64, f64::max);
    if normalizer == 0.0 {
        return Ok(1.0);
    }

    Ok(1.0 - cost[n * width + m] / (normalizer * n.max(m) as f64))
}

/// Path overlap ratio.
///
/// Counts every `(p, q)` with `p` from `a`, `q` from `b` and
/// `distance(p, q) < threshold`, divided by `max(len(a), len(b))`.
/// Counting is many-to-many, so the ratio can exceed 1 when points cluster.
///
/// # Errors
///
/// Returns [`Error::EmptyTrajectory`] if either trajectory is empty, or
/// [`Error::Shape`] if their positions differ in dimension
#[allow(clippy::cast_precision_loss)]
pub fn path_overlap(a: &Trajectory, b: &Trajectory, threshold: f64) -> Result<f64> {
    let path1 = positions(a)?;
    let path2 = positions(b)?;

    let mut overlap_count = 0usize;
    for p in &path1 {
        for q in &path2 {
            if p.distance(q)? < threshold {
                overlap_count += 1;
            }
        }
    }

    Ok(overlap_count as f64 / path1.len().max(path2.len()) as f64)
}

/// Average distance deviation.
///
/// Truncates both trajectories to the shorter length and averages the
/// distance between positions at the same index. Alignment is lockstep,
/// not warped.
///
/// # Errors
///
/// Returns [`Error::EmptyTrajectory`] if either trajectory is empty, or
/// [`Error::Shape`] if their positions differ in dimension
#[allow(clippy::cast_precision_loss)]
pub fn average_distance_deviation(a: &Trajectory, b: &Trajectory) -> Result<f64> {
    let path1 = positions(a)?;
    let path2 = positions(b)?;
    let len = path1.len().min(path2.len());

    let mut total = 0.0;
    for (p, q) in path1.iter().zip(&path2) {
        total += p.distance(q)?;
    }

    Ok(total / len as f64)
}
