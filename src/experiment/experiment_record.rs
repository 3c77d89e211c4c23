//! Experiment Record - one logged simulation run

use std::collections::HashSet;

use serde::Serialize;

use super::{Step, StepSummary};
use crate::{Error, Result};

/// Model type assumed when a record does not name one.
pub const DEFAULT_MODEL_TYPE: &str = "VLM";

/// Experiment represents one logged simulation run.
///
/// Experiments are immutable once built. [`ExperimentBuilder::build`] is the
/// only way to obtain one, and it enforces the record invariants:
///
/// - step indices strictly increase
/// - every position has 2 or 3 components, the same count across the run
/// - numeric unit fields are finite and `max_health > 0`
/// - unit names are non-empty and unique within a step
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Experiment {
    #[serde(rename = "directory")]
    id: String,
    #[serde(rename = "scene")]
    scenario: String,
    model_type: String,
    image_input: bool,
    prefab_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<String>,
    total_steps: u64,
    steps: Vec<Step>,
    #[serde(skip)]
    position_dim: Option<usize>,
}

impl Experiment {
    /// Create a builder with the required identifier and scenario label.
    #[must_use]
    pub fn builder(id: impl Into<String>, scenario: impl Into<String>) -> ExperimentBuilder {
        ExperimentBuilder::new(id, scenario)
    }

    /// Get the experiment identifier (the log directory name).
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the scenario label.
    #[must_use]
    pub fn scenario(&self) -> &str {
        &self.scenario
    }

    /// Get the model type label.
    #[must_use]
    pub fn model_type(&self) -> &str {
        &self.model_type
    }

    /// Whether image input was enabled for this run.
    #[must_use]
    pub const fn image_input(&self) -> bool {
        self.image_input
    }

    /// Whether prefab-function mode was enabled for this run.
    #[must_use]
    pub const fn prefab_enabled(&self) -> bool {
        self.prefab_enabled
    }

    /// Run start marker as logged (e.g. `20260213_160916`), if any.
    #[must_use]
    pub fn timestamp(&self) -> Option<&str> {
        self.timestamp.as_deref()
    }

    /// Total step count reported by the run.
    #[must_use]
    pub const fn total_steps(&self) -> u64 {
        self.total_steps
    }

    /// Get the steps in index order.
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Dimensionality shared by every position, `None` if no unit was ever seen.
    #[must_use]
    pub const fn position_dim(&self) -> Option<usize> {
        self.position_dim
    }

    /// Per-step sequence records.
    #[must_use]
    pub fn step_summaries(&self) -> Vec<StepSummary> {
        self.steps.iter().map(Step::summary).collect()
    }
}

/// Builder for `Experiment`.
#[derive(Debug)]
pub struct ExperimentBuilder {
    id: String,
    scenario: String,
    model_type: String,
    image_input: bool,
    prefab_enabled: bool,
    timestamp: Option<String>,
    total_steps: Option<u64>,
    steps: Vec<Step>,
}

impl ExperimentBuilder {
    /// Create a new builder with required fields.
    #[must_use]
    pub fn new(id: impl Into<String>, scenario: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            scenario: scenario.into(),
            model_type: DEFAULT_MODEL_TYPE.to_string(),
            image_input: false,
            prefab_enabled: false,
            timestamp: None,
            total_steps: None,
            steps: Vec::new(),
        }
    }

    /// Set the model type label.
    #[must_use]
    pub fn model_type(mut self, model_type: impl Into<String>) -> Self {
        self.model_type = model_type.into();
        self
    }

    /// Set the image input flag.
    #[must_use]
    pub const fn image_input(mut self, enabled: bool) -> Self {
        self.image_input = enabled;
        self
    }

    /// Set the prefab-function flag.
    #[must_use]
    pub const fn prefab_enabled(mut self, enabled: bool) -> Self {
        self.prefab_enabled = enabled;
        self
    }

    /// Set the run start marker.
    #[must_use]
    pub fn timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    /// Set the reported total step count. Defaults to the number of steps.
    #[must_use]
    pub const fn total_steps(mut self, total_steps: u64) -> Self {
        self.total_steps = Some(total_steps);
        self
    }

    /// Append a step.
    #[must_use]
    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Append several steps.
    #[must_use]
    pub fn steps(mut self, steps: impl IntoIterator<Item = Step>) -> Self {
        self.steps.extend(steps);
        self
    }

    /// Validate and build the `Experiment`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Data`] if any record invariant is violated
    pub fn build(self) -> Result<Experiment> {
        if self.id.is_empty() {
            return Err(Error::data("<unknown>", "experiment id must not be empty"));
        }

        let mut position_dim: Option<usize> = None;
        let mut previous: Option<u64> = None;
        for step in &self.steps {
            if let Some(prev) = previous {
                if step.index() <= prev {
                    return Err(Error::data(
                        &self.id,
                        format!(
                            "step indices must strictly increase: {} follows {prev}",
                            step.index()
                        ),
                    ));
                }
            }
            previous = Some(step.index());

            let mut seen = HashSet::with_capacity(step.unit_count());
            for unit in step.units() {
                unit.validate()
                    .map_err(|msg| Error::data(&self.id, format!("step {}: {msg}", step.index())))?;

                if !seen.insert(unit.unit_name()) {
                    return Err(Error::data(
                        &self.id,
                        format!(
                            "step {}: unit '{}' reported twice",
                            step.index(),
                            unit.unit_name()
                        ),
                    ));
                }

                let dim = unit.position().dim();
                if !(2..=3).contains(&dim) {
                    return Err(Error::data(
                        &self.id,
                        format!(
                            "step {}: unit '{}' has a {dim}-dimensional position, expected 2 or 3",
                            step.index(),
                            unit.unit_name()
                        ),
                    ));
                }
                match position_dim {
                    None => position_dim = Some(dim),
                    Some(expected) if expected != dim => {
                        return Err(Error::data(
                            &self.id,
                            format!(
                                "step {}: unit '{}' has a {dim}-dimensional position, \
                                 experiment uses {expected}",
                                step.index(),
                                unit.unit_name()
                            ),
                        ));
                    }
                    Some(_) => {}
                }
            }
        }

        let total_steps = self.total_steps.unwrap_or(self.steps.len() as u64);

        Ok(Experiment {
            id: self.id,
            scenario: self.scenario,
            model_type: self.model_type,
            image_input: self.image_input,
            prefab_enabled: self.prefab_enabled,
            timestamp: self.timestamp,
            total_steps,
            steps: self.steps,
            position_dim,
        })
    }
}
