//! Experiment Store - loaded experiments grouped by scenario
//!
//! Similarity is only meaningful between runs of the same scenario, so the
//! store keeps experiments in load order and hands out scenario groups in
//! order of first appearance.

use std::collections::HashMap;

use super::Experiment;

/// Experiments sharing one scenario label, in insertion order.
#[derive(Debug, Clone)]
pub struct ScenarioGroup<'a> {
    /// Scenario label
    pub scenario: &'a str,
    /// Member experiments
    pub experiments: Vec<&'a Experiment>,
}

impl ScenarioGroup<'_> {
    /// Number of unordered experiment pairs in the group.
    #[must_use]
    pub fn pair_count(&self) -> usize {
        let n = self.experiments.len();
        n * n.saturating_sub(1) / 2
    }
}

/// Group experiments by scenario label.
///
/// Groups appear in order of each label's first occurrence, and members keep
/// their relative input order.
#[must_use]
pub fn group_by_scenario<'a, I>(experiments: I) -> Vec<ScenarioGroup<'a>>
where
    I: IntoIterator<Item = &'a Experiment>,
{
    let mut groups: Vec<ScenarioGroup<'a>> = Vec::new();
    let mut index: HashMap<&'a str, usize> = HashMap::new();

    for experiment in experiments {
        let scenario = experiment.scenario();
        let slot = *index.entry(scenario).or_insert_with(|| {
            groups.push(ScenarioGroup {
                scenario,
                experiments: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].experiments.push(experiment);
    }

    groups
}

/// In-memory store of validated experiments.
#[derive(Debug, Default)]
pub struct ExperimentStore {
    experiments: Vec<Experiment>,
}

impl ExperimentStore {
    /// Create a new empty experiment store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.experiments.is_empty()
    }

    /// Get the number of experiments in the store.
    #[must_use]
    pub fn experiment_count(&self) -> usize {
        self.experiments.len()
    }

    /// All experiments in insertion order.
    #[must_use]
    pub fn experiments(&self) -> &[Experiment] {
        &self.experiments
    }

    /// Experiments grouped by scenario.
    #[must_use]
    pub fn scenario_groups(&self) -> Vec<ScenarioGroup<'_>> {
        group_by_scenario(&self.experiments)
    }
}

impl FromIterator<Experiment> for ExperimentStore {
    fn from_iter<T: IntoIterator<Item = Experiment>>(iter: T) -> Self {
        Self {
            experiments: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn experiment(id: &str, scenario: &str) -> Experiment {
        Experiment::builder(id, scenario).build().unwrap()
    }

    #[test]
    fn test_store_default() {
        let store = ExperimentStore::new();
        assert!(store.is_empty());
        assert_eq!(store.experiment_count(), 0);
        assert!(store.scenario_groups().is_empty());
    }

    #[test]
    fn test_store_collects_in_order() {
        let store: ExperimentStore = vec![experiment("exp-1", "MMM"), experiment("exp-2", "MMM")]
            .into_iter()
            .collect();

        assert!(!store.is_empty());
        assert_eq!(store.experiment_count(), 2);
        let ids: Vec<&str> = store.experiments().iter().map(|e| e.id()).collect();
        assert_eq!(ids, vec!["exp-1", "exp-2"]);
    }

    #[test]
    fn test_groups_keep_first_appearance_order() {
        let store: ExperimentStore = vec![
            experiment("e1", "B"),
            experiment("e2", "A"),
            experiment("e3", "B"),
            experiment("e4", "A"),
            experiment("e5", "C"),
        ]
        .into_iter()
        .collect();

        let groups = store.scenario_groups();
        let labels: Vec<&str> = groups.iter().map(|g| g.scenario).collect();
        assert_eq!(labels, vec!["B", "A", "C"]);

        let b_ids: Vec<&str> = groups[0].experiments.iter().map(|e| e.id()).collect();
        assert_eq!(b_ids, vec!["e1", "e3"]);
        assert_eq!(groups[0].pair_count(), 1);
        assert_eq!(groups[2].pair_count(), 0);
    }
}
