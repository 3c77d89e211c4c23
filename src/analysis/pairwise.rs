//! Pairwise analysis
//!
//! Groups experiments by scenario and compares every unordered pair inside a
//! group. Each pair reads only its two experiments and writes only its own
//! result, so pairs run on the rayon pool when the `rayon` feature is on and
//! `AnalysisConfig::parallel` is set. Results always come back in canonical
//! order: scenario group order, then `i`, then `j` with `i < j`.
//!
//! A failing pair is recorded as a [`PairFailure`] and does not affect the
//! others.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
#[cfg(feature = "rayon")]
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::{
    detect_key_nodes, extract_trajectories, key_node_match_rate, sequence_similarity,
    unit_count_sequence, KeyNode, PairwiseSummary, TrajectoryMap, UnitMetrics,
};
use crate::experiment::{group_by_scenario, Experiment, ScenarioGroup};
use crate::{AnalysisConfig, Error, Result};

/// Per-experiment analysis inputs, computed once and shared by every pair
/// the experiment takes part in.
#[derive(Debug)]
pub struct ExperimentProfile<'a> {
    experiment: &'a Experiment,
    trajectories: TrajectoryMap,
    key_nodes: Vec<KeyNode>,
    unit_counts: Vec<usize>,
}

impl<'a> ExperimentProfile<'a> {
    /// Extract trajectories, key nodes and the unit count sequence.
    #[must_use]
    pub fn build(experiment: &'a Experiment, config: &AnalysisConfig) -> Self {
        Self {
            experiment,
            trajectories: extract_trajectories(experiment),
            key_nodes: detect_key_nodes(experiment, config),
            unit_counts: unit_count_sequence(experiment),
        }
    }

    /// Get the profiled experiment.
    #[must_use]
    pub const fn experiment(&self) -> &'a Experiment {
        self.experiment
    }
}

/// Similarity between two experiments of the same scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairwiseResult {
    /// Scenario label
    pub scenario: String,
    /// First experiment id
    pub experiment1: String,
    /// Second experiment id
    pub experiment2: String,
    /// Model type of the first experiment
    pub model_type_1: String,
    /// Model type of the second experiment
    pub model_type_2: String,
    /// Image input flag of the first experiment
    pub image_input_1: bool,
    /// Image input flag of the second experiment
    pub image_input_2: bool,
    /// Prefab-function flag of the first experiment
    pub prefab_enabled_1: bool,
    /// Prefab-function flag of the second experiment
    pub prefab_enabled_2: bool,
    /// Metric triple for every unit present in both experiments
    pub trajectory_similarity: BTreeMap<String, UnitMetrics>,
    /// Shared `(step, type)` key node fraction
    pub key_node_match_rate: f64,
    /// Edit-distance similarity of the unit count sequences
    pub sequence_similarity: f64,
}

/// A pair whose comparison failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairFailure {
    /// Scenario label
    pub scenario: String,
    /// First experiment id
    pub experiment1: String,
    /// Second experiment id
    pub experiment2: String,
    /// Error message
    pub error: String,
}

/// Outcome of a pairwise analysis run.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// When the analysis finished
    pub generated_at: DateTime<Utc>,
    /// Configuration the analysis ran with
    pub config: AnalysisConfig,
    /// Results in canonical `(scenario, i, j)` order
    pub results: Vec<PairwiseResult>,
    /// Failed pairs in canonical order
    pub failures: Vec<PairFailure>,
}

impl AnalysisReport {
    /// One summary row per successful pair.
    #[must_use]
    pub fn summaries(&self) -> Vec<PairwiseSummary> {
        self.results.iter().map(PairwiseSummary::from).collect()
    }
}

/// Compare two profiled experiments.
///
/// # Errors
///
/// Returns [`Error::Shape`] if the two runs log positions of different
/// dimensionality, whether or not they share a unit
pub fn compare_profiles(
    scenario: &str,
    a: &ExperimentProfile<'_>,
    b: &ExperimentProfile<'_>,
    config: &AnalysisConfig,
) -> Result<PairwiseResult> {
    let (e1, e2) = (a.experiment, b.experiment);
    if let (Some(expected), Some(found)) = (e1.position_dim(), e2.position_dim()) {
        if expected != found {
            return Err(Error::Shape { expected, found });
        }
    }

    let mut trajectory_similarity = BTreeMap::new();
    for (unit, traj1) in &a.trajectories {
        if let Some(traj2) = b.trajectories.get(unit) {
            trajectory_similarity.insert(unit.clone(), UnitMetrics::compute(traj1, traj2, config)?);
        }
    }

    Ok(PairwiseResult {
        scenario: scenario.to_string(),
        experiment1: e1.id().to_string(),
        experiment2: e2.id().to_string(),
        model_type_1: e1.model_type().to_string(),
        model_type_2: e2.model_type().to_string(),
        image_input_1: e1.image_input(),
        image_input_2: e2.image_input(),
        prefab_enabled_1: e1.prefab_enabled(),
        prefab_enabled_2: e2.prefab_enabled(),
        trajectory_similarity,
        key_node_match_rate: key_node_match_rate(&a.key_nodes, &b.key_nodes),
        sequence_similarity: sequence_similarity(&a.unit_counts, &b.unit_counts),
    })
}

/// Compare two experiments directly. The result is labelled with the first
/// experiment's scenario.
///
/// # Errors
///
/// Returns error if the configuration is invalid or a common unit's
/// trajectories cannot be compared
pub fn compare_experiments(
    a: &Experiment,
    b: &Experiment,
    config: &AnalysisConfig,
) -> Result<PairwiseResult> {
    config.validate()?;
    let profile1 = ExperimentProfile::build(a, config);
    let profile2 = ExperimentProfile::build(b, config);
    compare_profiles(a.scenario(), &profile1, &profile2, config)
}

/// Analyze every same-scenario pair in a collection of experiments.
///
/// # Errors
///
/// Returns error only if the configuration is invalid. Per-pair failures
/// are collected in [`AnalysisReport::failures`].
///
/// # Example
///
/// ```rust
/// use trajsim::experiment::{Experiment, Step, UnitState};
/// use trajsim::{analyze, AnalysisConfig};
///
/// let run = |id: &str| {
///     Experiment::builder(id, "MMM")
///         .step(Step::new(0, "t0").with_unit(UnitState::new("U1", 10.0, 10.0, [0.0, 0.0])))
///         .step(Step::new(1, "t1").with_unit(UnitState::new("U1", 10.0, 10.0, [1.0, 0.0])))
///         .build()
/// };
/// let experiments = vec![run("a")?, run("b")?];
///
/// let report = analyze(&experiments, &AnalysisConfig::default())?;
/// assert_eq!(report.results.len(), 1);
/// assert_eq!(report.results[0].trajectory_similarity["U1"].dtw_similarity, 1.0);
/// # Ok::<(), trajsim::Error>(())
/// ```
pub fn analyze(experiments: &[Experiment], config: &AnalysisConfig) -> Result<AnalysisReport> {
    analyze_groups(&group_by_scenario(experiments), config)
}

#[derive(Debug, Clone, Copy)]
struct PairTask {
    group: usize,
    i: usize,
    j: usize,
}

/// Analyze every pair inside pre-built scenario groups.
///
/// # Errors
///
/// Returns error only if the configuration is invalid
pub fn analyze_groups(
    groups: &[ScenarioGroup<'_>],
    config: &AnalysisConfig,
) -> Result<AnalysisReport> {
    config.validate()?;

    let members: Vec<&Experiment> = groups
        .iter()
        .flat_map(|g| g.experiments.iter().copied())
        .collect();
    let flat_profiles = map_tasks(&members, config.parallel, |experiment| {
        ExperimentProfile::build(*experiment, config)
    });

    let mut profiles: Vec<&[ExperimentProfile<'_>]> = Vec::with_capacity(groups.len());
    let mut tasks = Vec::new();
    let mut offset = 0;
    for (g, group) in groups.iter().enumerate() {
        let n = group.experiments.len();
        profiles.push(&flat_profiles[offset..offset + n]);
        offset += n;

        info!(
            scenario = group.scenario,
            experiments = n,
            pairs = group.pair_count(),
            "analyzing scenario"
        );
        for i in 0..n {
            for j in (i + 1)..n {
                tasks.push(PairTask { group: g, i, j });
            }
        }
    }

    let outcomes = map_tasks(&tasks, config.parallel, |task| {
        let group = &profiles[task.group];
        compare_profiles(groups[task.group].scenario, &group[task.i], &group[task.j], config)
    });

    let mut results = Vec::new();
    let mut failures = Vec::new();
    for (task, outcome) in tasks.iter().zip(outcomes) {
        let scenario = groups[task.group].scenario;
        let e1 = profiles[task.group][task.i].experiment().id();
        let e2 = profiles[task.group][task.j].experiment().id();
        match outcome {
            Ok(result) => {
                debug!(
                    scenario,
                    experiment1 = e1,
                    experiment2 = e2,
                    common_units = result.trajectory_similarity.len(),
                    key_node_match_rate = result.key_node_match_rate,
                    sequence_similarity = result.sequence_similarity,
                    "pair analyzed"
                );
                results.push(result);
            }
            Err(error) => {
                warn!(scenario, experiment1 = e1, experiment2 = e2, error = %error, "pair failed");
                failures.push(PairFailure {
                    scenario: scenario.to_string(),
                    experiment1: e1.to_string(),
                    experiment2: e2.to_string(),
                    error: error.to_string(),
                });
            }
        }
    }

    info!(
        scenarios = groups.len(),
        pairs = results.len(),
        failed = failures.len(),
        "pairwise analysis complete"
    );

    Ok(AnalysisReport {
        generated_at: Utc::now(),
        config: *config,
        results,
        failures,
    })
}

/// Order-preserving map, on the rayon pool when `parallel` is set.
#[cfg(feature = "rayon")]
fn map_tasks<T, R, F>(items: &[T], parallel: bool, f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    if parallel {
        items.par_iter().map(f).collect()
    } else {
        items.iter().map(f).collect()
    }
}

#[cfg(not(feature = "rayon"))]
fn map_tasks<T, R, F>(items: &[T], _parallel: bool, f: F) -> Vec<R>
where
    F: Fn(&T) -> R,
{
    items.iter().map(f).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiment::{Step, UnitState};

    fn run(id: &str, scenario: &str, xs: &[f64]) -> Experiment {
        Experiment::builder(id, scenario)
            .steps(xs.iter().zip(0u64..).map(|(&x, step)| {
                Step::new(step, "t").with_unit(UnitState::new("U1", 10.0, 10.0, [x, 0.0]))
            }))
            .build()
            .unwrap()
    }

    #[test]
    fn test_pair_order_is_canonical() {
        let experiments = vec![
            run("e1", "A", &[0.0, 1.0]),
            run("e2", "A", &[0.0, 2.0]),
            run("e4", "B", &[0.0]),
            run("e3", "A", &[0.0, 3.0]),
        ];

        for parallel in [true, false] {
            let config = AnalysisConfig::default().with_parallel(parallel);
            let report = analyze(&experiments, &config).unwrap();
            let pairs: Vec<(&str, &str)> = report
                .results
                .iter()
                .map(|r| (r.experiment1.as_str(), r.experiment2.as_str()))
                .collect();
            assert_eq!(pairs, vec![("e1", "e2"), ("e1", "e3"), ("e2", "e3")]);
            assert!(report.failures.is_empty());
        }
    }

    #[test]
    fn test_only_common_units_compared() {
        let a = Experiment::builder("a", "MMM")
            .step(
                Step::new(0, "t0")
                    .with_unit(UnitState::new("U1", 1.0, 1.0, [0.0, 0.0]))
                    .with_unit(UnitState::new("U2", 1.0, 1.0, [0.0, 0.0])),
            )
            .build()
            .unwrap();
        let b = Experiment::builder("b", "MMM")
            .step(
                Step::new(0, "t0")
                    .with_unit(UnitState::new("U2", 1.0, 1.0, [0.0, 0.0]))
                    .with_unit(UnitState::new("U3", 1.0, 1.0, [0.0, 0.0])),
            )
            .build()
            .unwrap();

        let result = compare_experiments(&a, &b, &AnalysisConfig::default()).unwrap();
        let units: Vec<&String> = result.trajectory_similarity.keys().collect();
        assert_eq!(units, vec!["U2"]);
    }

    #[test]
    fn test_dimension_mismatch_is_isolated() {
        let flat = run("flat", "A", &[0.0, 1.0]);
        let other = run("other", "A", &[0.0, 1.0]);
        let volumetric = Experiment::builder("volumetric", "A")
            .step(Step::new(0, "t").with_unit(UnitState::new("U1", 10.0, 10.0, [0.0, 0.0, 0.0])))
            .build()
            .unwrap();
        let experiments = vec![flat, volumetric, other];

        let report = analyze(&experiments, &AnalysisConfig::default()).unwrap();
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].experiment1, "flat");
        assert_eq!(report.results[0].experiment2, "other");
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[0].experiment2, "volumetric");
        assert!(report.failures[0].error.contains("Shape mismatch"));
    }

    #[test]
    fn test_dimension_mismatch_without_common_units() {
        let flat = run("flat", "A", &[0.0, 1.0]);
        let volumetric = Experiment::builder("volumetric", "A")
            .step(Step::new(0, "t").with_unit(UnitState::new("U9", 10.0, 10.0, [0.0, 0.0, 0.0])))
            .build()
            .unwrap();

        let err = compare_experiments(&flat, &volumetric, &AnalysisConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            Error::Shape {
                expected: 2,
                found: 3
            }
        ));

        // a run with no units has no dimension to disagree with
        let empty = Experiment::builder("empty", "A").build().unwrap();
        assert!(compare_experiments(&volumetric, &empty, &AnalysisConfig::default()).is_ok());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = AnalysisConfig::default().with_overlap_threshold(0.0);
        assert!(analyze(&[], &config).is_err());
    }
}
