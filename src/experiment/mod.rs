//! Experiment records
//!
//! Read-only inputs to the analysis: logged runs, their steps and the unit
//! states observed at each step. Records are validated once, when an
//! [`Experiment`] is built, so the metric code never re-checks fields.
//!
//! ## Schema Overview
//!
//! ```text
//! Experiment (1) ──< Step (N) [strictly increasing index]
//!                       │
//!                       └──< UnitState (N) [reported order]
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use trajsim::experiment::{Experiment, Step, UnitState};
//!
//! let experiment = Experiment::builder("run-001", "MMM")
//!     .prefab_enabled(true)
//!     .step(Step::new(0, "t0").with_unit(UnitState::new("Marine_1", 45.0, 45.0, [0.0, 0.0])))
//!     .step(Step::new(1, "t1").with_unit(UnitState::new("Marine_1", 30.0, 45.0, [1.0, 0.0])))
//!     .build()?;
//!
//! assert_eq!(experiment.steps().len(), 2);
//! # Ok::<(), trajsim::Error>(())
//! ```

mod experiment_record;
pub mod loader;
mod step;
mod store;
mod unit_state;

pub use experiment_record::{Experiment, ExperimentBuilder, DEFAULT_MODEL_TYPE};
pub use loader::{load_experiments, load_experiments_from_str, LoadFailure, LoadReport};
pub use step::{Step, StepSummary, Timestamp};
pub use store::{group_by_scenario, ExperimentStore, ScenarioGroup};
pub use unit_state::{Position, UnitState};
