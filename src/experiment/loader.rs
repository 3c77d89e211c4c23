//! Experiment ingestion
//!
//! Reads the normalized experiment records produced by the log collection
//! step: a JSON array with one object per run. Each element is decoded and
//! validated on its own, so one malformed run is reported and skipped while
//! the rest of the batch still loads.
//!
//! ## Record layout
//!
//! ```text
//! {
//!   "directory": "run_20260213_160916_MMM",
//!   "scene": "MMM",
//!   "model_type": "VLM",          (optional)
//!   "image_input": true,          (optional, default false)
//!   "prefab_enabled": true,       (optional, default false)
//!   "total_steps": 40,            (optional, default steps.len())
//!   "steps": [ { "step": 0, "timestamp": ..., "text_observation": ...,
//!                "unit_info": [ { "unit_name": ..., "health": ...,
//!                                 "max_health": ..., "position": [x, y] } ] } ]
//! }
//! ```
//!
//! Unrecognized fields are ignored.

use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use super::{Experiment, Step, DEFAULT_MODEL_TYPE};
use crate::{Error, Result};

#[derive(Debug, Deserialize)]
struct ExperimentFile {
    directory: String,
    scene: String,
    #[serde(default = "default_model_type")]
    model_type: String,
    #[serde(default)]
    image_input: bool,
    #[serde(default)]
    prefab_enabled: bool,
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default)]
    total_steps: Option<u64>,
    steps: Vec<Step>,
}

fn default_model_type() -> String {
    DEFAULT_MODEL_TYPE.to_string()
}

impl TryFrom<ExperimentFile> for Experiment {
    type Error = Error;

    fn try_from(file: ExperimentFile) -> Result<Self> {
        let mut builder = Self::builder(file.directory, file.scene)
            .model_type(file.model_type)
            .image_input(file.image_input)
            .prefab_enabled(file.prefab_enabled)
            .steps(file.steps);
        if let Some(timestamp) = file.timestamp {
            builder = builder.timestamp(timestamp);
        }
        if let Some(total) = file.total_steps {
            builder = builder.total_steps(total);
        }
        builder.build()
    }
}

/// An experiment that could not be loaded.
#[derive(Debug)]
pub struct LoadFailure {
    /// Position of the record in the input array
    pub index: usize,
    /// Experiment identifier, `<unknown>` if the record had none
    pub experiment: String,
    /// Why the record was rejected
    pub error: Error,
}

/// Outcome of loading a batch of experiment records.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Successfully validated experiments, in input order
    pub experiments: Vec<Experiment>,
    /// Rejected records, in input order
    pub failures: Vec<LoadFailure>,
}

impl LoadReport {
    /// True if every record loaded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Parse a single experiment record.
///
/// # Errors
///
/// Returns [`Error::Data`] if the record is malformed or violates an
/// experiment invariant
pub fn parse_experiment(value: serde_json::Value) -> Result<Experiment> {
    let id = value
        .get("directory")
        .and_then(serde_json::Value::as_str)
        .unwrap_or("<unknown>")
        .to_string();
    let file: ExperimentFile =
        serde_json::from_value(value).map_err(|e| Error::data(&id, e.to_string()))?;
    Experiment::try_from(file)
}

/// Load a batch of experiment records from a JSON string.
///
/// # Errors
///
/// Returns error only if the input is not a JSON array. Failures of
/// individual records are collected in [`LoadReport::failures`].
pub fn load_experiments_from_str(json: &str) -> Result<LoadReport> {
    let values: Vec<serde_json::Value> = serde_json::from_str(json)?;
    let mut report = LoadReport::default();

    for (index, value) in values.into_iter().enumerate() {
        match parse_experiment(value) {
            Ok(experiment) => report.experiments.push(experiment),
            Err(error) => {
                let experiment = match &error {
                    Error::Data { experiment, .. } => experiment.clone(),
                    _ => "<unknown>".to_string(),
                };
                warn!(index, experiment = %experiment, error = %error, "skipping experiment");
                report.failures.push(LoadFailure {
                    index,
                    experiment,
                    error,
                });
            }
        }
    }

    info!(
        loaded = report.experiments.len(),
        rejected = report.failures.len(),
        "experiments loaded"
    );
    Ok(report)
}

/// Load a batch of experiment records from a JSON file.
///
/// # Errors
///
/// Returns error if the file cannot be read or is not a JSON array
pub fn load_experiments<P: AsRef<Path>>(path: P) -> Result<LoadReport> {
    let json = std::fs::read_to_string(path.as_ref())?;
    load_experiments_from_str(&json)
}
