//! Trajectory-similarity analysis
//!
//! ```text
//! Experiment ──> trajectory ──> metrics (DTW, overlap, deviation) ──┐
//!     │                                                              │
//!     ├────────> key_nodes (death, low health) ──> match rate ───────┼──> PairwiseResult
//!     │                                                              │
//!     └────────> sequence (unit count per step) ──> edit distance ───┘
//! ```
//!
//! [`analyze`] runs the whole pipeline over a collection of experiments;
//! the building blocks are public for single comparisons.

mod key_nodes;
mod metrics;
mod pairwise;
mod sequence;
mod summary;
mod trajectory;

pub use key_nodes::{detect_key_nodes, key_node_match_rate, KeyNode, KeyNodeKind};
pub use metrics::{average_distance_deviation, dtw_similarity, path_overlap, UnitMetrics};
pub use pairwise::{
    analyze, analyze_groups, compare_experiments, compare_profiles, AnalysisReport,
    ExperimentProfile, PairFailure, PairwiseResult,
};
pub use sequence::{edit_distance, sequence_similarity, unit_count_sequence};
pub use summary::{average_metrics, ExperimentSummary, PairwiseSummary};
pub use trajectory::{extract_trajectories, Trajectory, TrajectoryMap, TrajectoryPoint};
