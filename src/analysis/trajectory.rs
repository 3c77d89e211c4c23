//! Trajectory extraction
//!
//! Turns an experiment's step list into one ordered state sequence per unit.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::experiment::{Experiment, Position, Timestamp};

/// A unit's state at one step of its trajectory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrajectoryPoint {
    /// Step index the state was observed at
    pub step: u64,
    /// Timestamp of that step
    pub timestamp: Timestamp,
    /// Current health
    pub health: f64,
    /// Maximum health
    pub max_health: f64,
    /// Current shield
    pub shield: f64,
    /// Maximum shield
    pub max_shield: f64,
    /// Energy
    pub energy: f64,
    /// Position
    pub position: Position,
}

/// Ordered history of one unit over the steps it appeared in.
///
/// Steps are a subsequence of the experiment's steps, in the same order.
/// Gaps are allowed when a unit drops out of the log and comes back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trajectory {
    unit: String,
    points: Vec<TrajectoryPoint>,
}

impl Trajectory {
    /// Create an empty trajectory for a unit.
    #[must_use]
    pub fn new(unit: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            points: Vec::new(),
        }
    }

    /// Build a trajectory from bare positions at consecutive steps `0..n`.
    ///
    /// Useful for comparing paths that do not come from a logged experiment.
    #[must_use]
    pub fn from_positions<P>(unit: impl Into<String>, positions: impl IntoIterator<Item = P>) -> Self
    where
        P: Into<Position>,
    {
        let points = positions
            .into_iter()
            .zip(0u64..)
            .map(|(position, step)| TrajectoryPoint {
                step,
                timestamp: Timestamp::default(),
                health: 0.0,
                max_health: 0.0,
                shield: 0.0,
                max_shield: 0.0,
                energy: 0.0,
                position: position.into(),
            })
            .collect();
        Self {
            unit: unit.into(),
            points,
        }
    }

    /// Get the unit name.
    #[must_use]
    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Get the recorded states in step order.
    #[must_use]
    pub fn points(&self) -> &[TrajectoryPoint] {
        &self.points
    }

    /// Number of recorded states.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Positions in step order.
    pub fn positions(&self) -> impl ExactSizeIterator<Item = &Position> + '_ {
        self.points.iter().map(|p| &p.position)
    }

    fn push(&mut self, point: TrajectoryPoint) {
        self.points.push(point);
    }
}

/// Unit name to trajectory, ordered by unit name.
pub type TrajectoryMap = BTreeMap<String, Trajectory>;

/// Extract the trajectory of every unit that appears in the experiment.
///
/// A unit appears at most once per step, so no deduplication is needed.
/// Units never observed get no entry.
#[must_use]
pub fn extract_trajectories(experiment: &Experiment) -> TrajectoryMap {
    let mut trajectories = TrajectoryMap::new();

    for step in experiment.steps() {
        for unit in step.units() {
            trajectories
                .entry(unit.unit_name().to_string())
                .or_insert_with(|| Trajectory::new(unit.unit_name()))
                .push(TrajectoryPoint {
                    step: step.index(),
                    timestamp: step.timestamp().clone(),
                    health: unit.health(),
                    max_health: unit.max_health(),
                    shield: unit.shield(),
                    max_shield: unit.max_shield(),
                    energy: unit.energy(),
                    position: unit.position().clone(),
                });
        }
    }

    trajectories
}
