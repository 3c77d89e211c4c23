//! Step - one logged simulation step

use std::fmt;

use serde::{Deserialize, Serialize};

use super::UnitState;

/// Wall-clock marker attached to a step.
///
/// Logs carry either a formatted string or a numeric epoch value; both are
/// kept verbatim since the analysis only orders steps by index. Integral
/// epochs decode as [`Timestamp::Integer`] so nanosecond values stay exact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    /// Integral timestamp (e.g. nanoseconds since epoch)
    Integer(i64),
    /// Fractional timestamp (e.g. seconds since epoch)
    Numeric(f64),
    /// Formatted timestamp string
    Text(String),
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::Numeric(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

impl From<&str> for Timestamp {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Timestamp {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<i64> for Timestamp {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for Timestamp {
    fn from(value: f64) -> Self {
        Self::Numeric(value)
    }
}

/// One logged step of a simulation run.
///
/// `unit_info` keeps the order in which units were reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    step: u64,
    #[serde(default)]
    timestamp: Timestamp,
    #[serde(default)]
    text_observation: String,
    unit_info: Vec<UnitState>,
}

impl Step {
    /// Create an empty step.
    #[must_use]
    pub fn new(step: u64, timestamp: impl Into<Timestamp>) -> Self {
        Self {
            step,
            timestamp: timestamp.into(),
            text_observation: String::new(),
            unit_info: Vec::new(),
        }
    }

    /// Set the text observation.
    #[must_use]
    pub fn with_observation(mut self, text: impl Into<String>) -> Self {
        self.text_observation = text.into();
        self
    }

    /// Append a unit state.
    #[must_use]
    pub fn with_unit(mut self, unit: UnitState) -> Self {
        self.unit_info.push(unit);
        self
    }

    /// Get the step index.
    #[must_use]
    pub const fn index(&self) -> u64 {
        self.step
    }

    /// Get the timestamp.
    #[must_use]
    pub const fn timestamp(&self) -> &Timestamp {
        &self.timestamp
    }

    /// Get the text observation.
    #[must_use]
    pub fn text_observation(&self) -> &str {
        &self.text_observation
    }

    /// Get the unit states in reported order.
    #[must_use]
    pub fn units(&self) -> &[UnitState] {
        &self.unit_info
    }

    /// Number of units present at this step.
    #[must_use]
    pub fn unit_count(&self) -> usize {
        self.unit_info.len()
    }

    /// Condensed view of this step.
    #[must_use]
    pub fn summary(&self) -> StepSummary {
        StepSummary {
            step: self.step,
            timestamp: self.timestamp.clone(),
            text_observation: self.text_observation.clone(),
            unit_count: self.unit_count(),
        }
    }
}

/// Per-step sequence record: what happened at a step, without unit detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSummary {
    /// Step index
    pub step: u64,
    /// Step timestamp
    pub timestamp: Timestamp,
    /// Text observation logged at the step
    pub text_observation: String,
    /// Number of units present
    pub unit_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_accepts_string_or_number() {
        let text: Timestamp = serde_json::from_str(r#""2026-02-13 16:09:16""#).unwrap();
        assert_eq!(text, Timestamp::Text("2026-02-13 16:09:16".to_string()));

        let numeric: Timestamp = serde_json::from_str("1739434156.5").unwrap();
        assert_eq!(numeric, Timestamp::Numeric(1_739_434_156.5));
        assert_eq!(numeric.to_string(), "1739434156.5");
    }

    #[test]
    fn test_integer_timestamp_is_exact() {
        let nanos: Timestamp = serde_json::from_str("1739434156123456789").unwrap();
        assert_eq!(nanos, Timestamp::Integer(1_739_434_156_123_456_789));
        assert_eq!(nanos.to_string(), "1739434156123456789");
        assert_eq!(serde_json::to_string(&nanos).unwrap(), "1739434156123456789");

        // beyond i64 falls back to a float
        let huge: Timestamp = serde_json::from_str("18446744073709551615").unwrap();
        assert!(matches!(huge, Timestamp::Numeric(_)));
    }

    #[test]
    fn test_step_summary_counts_units() {
        let step = Step::new(3, "t3")
            .with_observation("enemy spotted")
            .with_unit(UnitState::new("Marine_1", 45.0, 45.0, [0.0, 0.0]))
            .with_unit(UnitState::new("Marine_2", 45.0, 45.0, [1.0, 0.0]));

        let summary = step.summary();
        assert_eq!(summary.step, 3);
        assert_eq!(summary.unit_count, 2);
        assert_eq!(summary.text_observation, "enemy spotted");
    }

    #[test]
    fn test_step_deserialize_defaults() {
        let json = r#"{"step": 0, "unit_info": []}"#;
        let step: Step = serde_json::from_str(json).unwrap();
        assert_eq!(step.index(), 0);
        assert_eq!(step.text_observation(), "");
        assert_eq!(step.unit_count(), 0);
    }
}
