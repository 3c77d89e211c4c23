//! Key node detection
//!
//! A key node is a salient event at a specific step: units disappearing from
//! the log (`unit_death`) or a unit under the critical health ratio
//! (`low_health`). Two runs are compared by how many `(step, type)` keys
//! they share.

use std::fmt;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::experiment::Experiment;
use crate::AnalysisConfig;

/// Kind of salient event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyNodeKind {
    /// One or more units present at the previous step are gone
    UnitDeath,
    /// A unit's health ratio is below the configured threshold
    LowHealth,
}

impl fmt::Display for KeyNodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnitDeath => f.write_str("unit_death"),
            Self::LowHealth => f.write_str("low_health"),
        }
    }
}

/// A detected salient event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyNode {
    /// Step index the event was detected at
    pub step: u64,
    /// Event kind
    #[serde(rename = "type")]
    pub kind: KeyNodeKind,
    /// Human-readable detail (unit names, health ratio)
    pub details: String,
}

impl KeyNode {
    /// Match key: unit-level detail is deliberately not part of it.
    #[must_use]
    pub const fn key(&self) -> (u64, KeyNodeKind) {
        (self.step, self.kind)
    }
}

/// Scan an experiment for key nodes.
///
/// For each step, the death rule runs first (against the previous step),
/// then every unit under `config.low_health_ratio` emits its own node. A unit
/// that stays under the threshold emits a node at every such step.
#[must_use]
pub fn detect_key_nodes(experiment: &Experiment, config: &AnalysisConfig) -> Vec<KeyNode> {
    let mut key_nodes = Vec::new();
    let steps = experiment.steps();

    for (i, step) in steps.iter().enumerate() {
        if i > 0 {
            let current: FxHashSet<&str> = step.units().iter().map(|u| u.unit_name()).collect();
            let dead: Vec<&str> = steps[i - 1]
                .units()
                .iter()
                .map(|u| u.unit_name())
                .filter(|name| !current.contains(name))
                .collect();

            if !dead.is_empty() {
                key_nodes.push(KeyNode {
                    step: step.index(),
                    kind: KeyNodeKind::UnitDeath,
                    details: format!("Units died: {}", dead.join(", ")),
                });
            }
        }

        for unit in step.units() {
            let ratio = unit.health_ratio();
            if ratio < config.low_health_ratio {
                key_nodes.push(KeyNode {
                    step: step.index(),
                    kind: KeyNodeKind::LowHealth,
                    details: format!("Unit {} has low health: {ratio:.2}", unit.unit_name()),
                });
            }
        }
    }

    key_nodes
}

/// Fraction of shared `(step, type)` keys between two key node lists.
///
/// `|keys(a) ∩ keys(b)| / max(|keys(a)|, |keys(b)|)`, where duplicates
/// collapse into one key. Two empty lists give 0.0.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn key_node_match_rate(a: &[KeyNode], b: &[KeyNode]) -> f64 {
    let keys1: FxHashSet<(u64, KeyNodeKind)> = a.iter().map(KeyNode::key).collect();
    let keys2: FxHashSet<(u64, KeyNodeKind)> = b.iter().map(KeyNode::key).collect();

    let max_nodes = keys1.len().max(keys2.len());
    if max_nodes == 0 {
        return 0.0;
    }

    let matched = keys1.intersection(&keys2).count();
    matched as f64 / max_nodes as f64
}
