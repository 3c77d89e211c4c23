//! Unit State - one unit's observed state at a single step

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Position of a unit on the map.
///
/// A 2- or 3-component coordinate vector. The dimension is checked when an
/// [`Experiment`](super::Experiment) is built, and every position inside one
/// experiment shares it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Position(Vec<f64>);

impl Position {
    /// Create a position from its coordinates.
    #[must_use]
    pub fn new(coords: impl Into<Vec<f64>>) -> Self {
        Self(coords.into())
    }

    /// Number of coordinate components.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.0.len()
    }

    /// Coordinate components.
    #[must_use]
    pub fn coords(&self) -> &[f64] {
        &self.0
    }

    /// Euclidean distance from the coordinate origin.
    ///
    /// Accumulated with `hypot`, so large finite coordinates do not overflow
    /// through their squares.
    #[must_use]
    pub fn norm(&self) -> f64 {
        self.0.iter().fold(0.0_f64, |acc, c| acc.hypot(*c))
    }

    /// Euclidean distance to another position.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Shape`] if the two positions differ in dimension
    pub fn distance(&self, other: &Self) -> Result<f64> {
        if self.dim() != other.dim() {
            return Err(Error::Shape {
                expected: self.dim(),
                found: other.dim(),
            });
        }
        Ok(self
            .0
            .iter()
            .zip(&other.0)
            .fold(0.0_f64, |acc, (a, b)| acc.hypot(a - b)))
    }
}

impl From<[f64; 2]> for Position {
    fn from(coords: [f64; 2]) -> Self {
        Self(coords.to_vec())
    }
}

impl From<[f64; 3]> for Position {
    fn from(coords: [f64; 3]) -> Self {
        Self(coords.to_vec())
    }
}

impl From<Vec<f64>> for Position {
    fn from(coords: Vec<f64>) -> Self {
        Self(coords)
    }
}

/// Observed state of one unit at one step.
///
/// `shield`, `max_shield` and `energy` default to 0 when absent from the
/// input record; `health`, `max_health` and `position` are required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitState {
    unit_name: String,
    health: f64,
    max_health: f64,
    #[serde(default)]
    shield: f64,
    #[serde(default)]
    max_shield: f64,
    #[serde(default)]
    energy: f64,
    position: Position,
}

impl UnitState {
    /// Create a unit state with zero shield and energy.
    #[must_use]
    pub fn new(
        unit_name: impl Into<String>,
        health: f64,
        max_health: f64,
        position: impl Into<Position>,
    ) -> Self {
        Self {
            unit_name: unit_name.into(),
            health,
            max_health,
            shield: 0.0,
            max_shield: 0.0,
            energy: 0.0,
            position: position.into(),
        }
    }

    /// Set current and maximum shield.
    #[must_use]
    pub fn with_shield(mut self, shield: f64, max_shield: f64) -> Self {
        self.shield = shield;
        self.max_shield = max_shield;
        self
    }

    /// Set energy.
    #[must_use]
    pub fn with_energy(mut self, energy: f64) -> Self {
        self.energy = energy;
        self
    }

    /// Get the unit name.
    #[must_use]
    pub fn unit_name(&self) -> &str {
        &self.unit_name
    }

    /// Get the current health.
    #[must_use]
    pub const fn health(&self) -> f64 {
        self.health
    }

    /// Get the maximum health.
    #[must_use]
    pub const fn max_health(&self) -> f64 {
        self.max_health
    }

    /// Get the current shield.
    #[must_use]
    pub const fn shield(&self) -> f64 {
        self.shield
    }

    /// Get the maximum shield.
    #[must_use]
    pub const fn max_shield(&self) -> f64 {
        self.max_shield
    }

    /// Get the energy.
    #[must_use]
    pub const fn energy(&self) -> f64 {
        self.energy
    }

    /// Get the position.
    #[must_use]
    pub const fn position(&self) -> &Position {
        &self.position
    }

    /// Fraction of maximum health remaining.
    #[must_use]
    pub fn health_ratio(&self) -> f64 {
        self.health / self.max_health
    }

    /// Check the numeric fields. Position dimension is checked by the
    /// experiment, which knows the expected value.
    pub(crate) fn validate(&self) -> std::result::Result<(), String> {
        if self.unit_name.is_empty() {
            return Err("unit_name must not be empty".to_string());
        }
        let fields = [
            ("health", self.health),
            ("max_health", self.max_health),
            ("shield", self.shield),
            ("max_shield", self.max_shield),
            ("energy", self.energy),
        ];
        if let Some((name, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(format!(
                "unit '{}' has non-finite {name}: {value}",
                self.unit_name
            ));
        }
        if self.max_health <= 0.0 {
            return Err(format!(
                "unit '{}' has non-positive max_health: {}",
                self.unit_name, self.max_health
            ));
        }
        if self.position.coords().iter().any(|c| !c.is_finite()) {
            return Err(format!(
                "unit '{}' has a non-finite position component",
                self.unit_name
            ));
        }
        Ok(())
    }
}
