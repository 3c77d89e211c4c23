//! Result aggregation
//!
//! Reduces pairwise results and experiments to flat rows for a reporting
//! sink. Pure reductions, no I/O.

use std::collections::BTreeMap;

use rustc_hash::FxHashSet;
use serde::Serialize;

use super::{PairwiseResult, UnitMetrics};
use crate::experiment::Experiment;

/// Per-unit metric map averaged into one triple.
///
/// An empty map (no common units) averages to all zeros.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn average_metrics(metrics: &BTreeMap<String, UnitMetrics>) -> UnitMetrics {
    if metrics.is_empty() {
        return UnitMetrics {
            dtw_similarity: 0.0,
            path_overlap: 0.0,
            average_distance: 0.0,
        };
    }

    let n = metrics.len() as f64;
    let (dtw, overlap, distance) = metrics.values().fold((0.0, 0.0, 0.0), |acc, m| {
        (
            acc.0 + m.dtw_similarity,
            acc.1 + m.path_overlap,
            acc.2 + m.average_distance,
        )
    });

    UnitMetrics {
        dtw_similarity: dtw / n,
        path_overlap: overlap / n,
        average_distance: distance / n,
    }
}

/// One tabular row per analyzed pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairwiseSummary {
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
    /// Mean DTW similarity over common units
    pub average_dtw_similarity: f64,
    /// Mean path overlap over common units
    pub average_path_overlap: f64,
    /// Mean average distance deviation over common units
    pub average_distance_deviation: f64,
    /// Key node match rate
    pub key_node_match_rate: f64,
    /// Unit count sequence similarity
    pub sequence_similarity: f64,
}

impl From<&PairwiseResult> for PairwiseSummary {
    fn from(result: &PairwiseResult) -> Self {
        let averages = average_metrics(&result.trajectory_similarity);
        Self {
            scenario: result.scenario.clone(),
            experiment1: result.experiment1.clone(),
            experiment2: result.experiment2.clone(),
            model_type_1: result.model_type_1.clone(),
            model_type_2: result.model_type_2.clone(),
            image_input_1: result.image_input_1,
            image_input_2: result.image_input_2,
            prefab_enabled_1: result.prefab_enabled_1,
            prefab_enabled_2: result.prefab_enabled_2,
            average_dtw_similarity: averages.dtw_similarity,
            average_path_overlap: averages.path_overlap,
            average_distance_deviation: averages.average_distance,
            key_node_match_rate: result.key_node_match_rate,
            sequence_similarity: result.sequence_similarity,
        }
    }
}

/// One tabular row per loaded experiment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExperimentSummary {
    /// Experiment id
    pub directory: String,
    /// Model type label
    pub model_type: String,
    /// Image input flag
    pub image_input: bool,
    /// Prefab-function flag
    pub prefab_enabled: bool,
    /// Scenario label
    pub scene: String,
    /// Reported total step count
    pub total_steps: u64,
    /// Number of distinct units observed
    pub unit_count: usize,
}

impl From<&Experiment> for ExperimentSummary {
    fn from(experiment: &Experiment) -> Self {
        Self {
            directory: experiment.id().to_string(),
            model_type: experiment.model_type().to_string(),
            image_input: experiment.image_input(),
            prefab_enabled: experiment.prefab_enabled(),
            scene: experiment.scenario().to_string(),
            total_steps: experiment.total_steps(),
            unit_count: distinct_unit_count(experiment),
        }
    }
}

fn distinct_unit_count(experiment: &Experiment) -> usize {
    experiment
        .steps()
        .iter()
        .flat_map(|step| step.units())
        .map(|unit| unit.unit_name())
        .collect::<FxHashSet<_>>()
        .len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiment::{Step, UnitState};

    fn metrics(dtw: f64, overlap: f64, distance: f64) -> UnitMetrics {
        UnitMetrics {
            dtw_similarity: dtw,
            path_overlap: overlap,
            average_distance: distance,
        }
    }

    #[test]
    fn test_average_of_empty_map_is_zero() {
        let averages = average_metrics(&BTreeMap::new());
        assert!(averages.dtw_similarity.abs() < f64::EPSILON);
        assert!(averages.path_overlap.abs() < f64::EPSILON);
        assert!(averages.average_distance.abs() < f64::EPSILON);
    }

    #[test]
    fn test_average_metrics() {
        let mut map = BTreeMap::new();
        map.insert("U1".to_string(), metrics(1.0, 2.0, 0.0));
        map.insert("U2".to_string(), metrics(0.5, 1.0, 4.0));

        let averages = average_metrics(&map);
        assert!((averages.dtw_similarity - 0.75).abs() < 1e-12);
        assert!((averages.path_overlap - 1.5).abs() < 1e-12);
        assert!((averages.average_distance - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_experiment_summary() {
        let experiment = Experiment::builder("run_1", "MMM2")
            .prefab_enabled(true)
            .total_steps(12)
            .step(
                Step::new(0, "t0")
                    .with_unit(UnitState::new("A", 1.0, 1.0, [0.0, 0.0]))
                    .with_unit(UnitState::new("B", 1.0, 1.0, [0.0, 0.0])),
            )
            .step(Step::new(1, "t1").with_unit(UnitState::new("C", 1.0, 1.0, [0.0, 0.0])))
            .build()
            .unwrap();

        let summary = ExperimentSummary::from(&experiment);
        assert_eq!(summary.scene, "MMM2");
        assert_eq!(summary.total_steps, 12);
        assert_eq!(summary.unit_count, 3);
        assert!(summary.prefab_enabled);
    }

    #[test]
    fn test_experiment_summary_counts_each_unit_once() {
        let experiment = Experiment::builder("run_2", "MMM")
            .steps((0..4).map(|step| {
                Step::new(step, "t")
                    .with_unit(UnitState::new("Marine_1", 45.0, 45.0, [0.0, 0.0]))
                    .with_unit(UnitState::new("Medivac_1", 150.0, 150.0, [1.0, 0.0]))
            }))
            .build()
            .unwrap();

        assert_eq!(ExperimentSummary::from(&experiment).unit_count, 2);
    }
}
