//! # Trajsim: Trajectory-Similarity Analysis for Simulation Runs
//!
//! **Version**: 0.1.0
//!
//! Trajsim quantifies how similar two logged multi-agent simulation runs of
//! the same scenario are. Runs are compared on three axes:
//!
//! - **Movement**: per-unit trajectories compared with dynamic time warping,
//!   path overlap and lockstep distance deviation
//! - **Events**: unit deaths and critical-health moments matched by step
//! - **Pacing**: the unit count at each step compared by edit distance
//!
//! ## Design Principles
//!
//! - Records are validated once at ingestion; metric code trusts its inputs
//! - Thresholds live in [`AnalysisConfig`] and are injected into comparators
//! - Analysis is a pure batch function; pairs are independent and may run
//!   in parallel, but results always come back in canonical order
//! - Failures are isolated: one bad experiment or pair never aborts a batch
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use trajsim::experiment::load_experiments;
//! use trajsim::{analyze, AnalysisConfig};
//!
//! let loaded = load_experiments("output/processed_experiments.json")?;
//! let report = analyze(&loaded.experiments, &AnalysisConfig::default())?;
//!
//! for row in report.summaries() {
//!     println!(
//!         "{} vs {}: dtw={:.3} key_nodes={:.3}",
//!         row.experiment1, row.experiment2, row.average_dtw_similarity, row.key_node_match_rate
//!     );
//! }
//! # Ok::<(), trajsim::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod analysis;
pub mod config;
pub mod error;
pub mod experiment;

pub use analysis::{analyze, AnalysisReport, PairwiseResult, PairwiseSummary};
pub use config::AnalysisConfig;
pub use error::{Error, Result};
