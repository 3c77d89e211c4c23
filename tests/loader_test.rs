//! Ingestion tests: record decoding, validation and failure isolation

use std::io::Write;

use trajsim::experiment::{load_experiments, load_experiments_from_str, Timestamp};
use trajsim::{analyze, AnalysisConfig, Error};

const BATCH: &str = r#"[
  {
    "directory": "VLMAgent_20260213_160916_MMM",
    "model_type": "VLM",
    "image_input": true,
    "prefab_enabled": true,
    "scene": "MMM",
    "timestamp": "20260213_160916",
    "total_steps": 3,
    "steps": [
      {"step": 0, "timestamp": "2026-02-13 16:09:16", "text_observation": "start",
       "unit_info": [
         {"unit_name": "Marine_1", "health": 45, "max_health": 45, "position": [10.0, 20.0]},
         {"unit_name": "Medivac_1", "health": 150, "max_health": 150, "energy": 50,
          "position": [12.0, 18.0]}
       ]},
      {"step": 1, "timestamp": "2026-02-13 16:09:20", "text_observation": "engage",
       "unit_info": [
         {"unit_name": "Marine_1", "health": 10, "max_health": 45, "position": [11.0, 21.0]}
       ]}
    ]
  },
  {
    "directory": "VLMAgent_20260213_172642_MMM",
    "scene": "MMM",
    "steps": [
      {"step": 0, "timestamp": 1739434156,
       "unit_info": [
         {"unit_name": "Marine_1", "health": 45, "max_health": 45, "position": [10.0, 20.0]}
       ]},
      {"step": 0, "timestamp": 1739434160, "unit_info": []}
    ]
  },
  {
    "directory": "VLMAgent_20260213_201016_MMM",
    "scene": "MMM",
    "prefab_enabled": false,
    "steps": [
      {"step": 0, "timestamp": 1739434156.25,
       "unit_info": [
         {"unit_name": "Marine_1", "health": 45, "max_health": 45, "position": [10.0, 20.0]}
       ]}
    ]
  },
  {
    "scene": "MMM",
    "steps": []
  }
]"#;

#[test]
fn test_malformed_records_are_isolated() {
    let report = load_experiments_from_str(BATCH).unwrap();

    assert_eq!(report.experiments.len(), 2);
    assert_eq!(report.failures.len(), 2);
    assert!(!report.is_clean());

    let ids: Vec<&str> = report.experiments.iter().map(|e| e.id()).collect();
    assert_eq!(
        ids,
        vec!["VLMAgent_20260213_160916_MMM", "VLMAgent_20260213_201016_MMM"]
    );

    assert_eq!(report.failures[0].index, 1);
    assert_eq!(report.failures[0].experiment, "VLMAgent_20260213_172642_MMM");
    assert!(matches!(report.failures[0].error, Error::Data { .. }));
    assert!(report.failures[0]
        .error
        .to_string()
        .contains("strictly increase"));

    assert_eq!(report.failures[1].index, 3);
    assert_eq!(report.failures[1].experiment, "<unknown>");
}

#[test]
fn test_fields_decoded() {
    let report = load_experiments_from_str(BATCH).unwrap();
    let first = &report.experiments[0];

    assert_eq!(first.scenario(), "MMM");
    assert!(first.image_input());
    assert!(first.prefab_enabled());
    assert_eq!(first.total_steps(), 3);
    assert_eq!(first.position_dim(), Some(2));

    let step0 = &first.steps()[0];
    assert_eq!(step0.text_observation(), "start");
    assert_eq!(
        step0.timestamp(),
        &Timestamp::Text("2026-02-13 16:09:16".to_string())
    );
    let medivac = &step0.units()[1];
    assert!((medivac.energy() - 50.0).abs() < f64::EPSILON);
    assert!(medivac.shield().abs() < f64::EPSILON);

    let second = &report.experiments[1];
    assert_eq!(second.model_type(), "VLM");
    assert_eq!(second.total_steps(), 1);
    assert_eq!(second.steps()[0].timestamp(), &Timestamp::Numeric(1_739_434_156.25));
}

#[test]
fn test_run_timestamps_preserved() {
    let report = load_experiments_from_str(BATCH).unwrap();
    let first = &report.experiments[0];
    assert_eq!(first.timestamp(), Some("20260213_160916"));
    assert_eq!(report.experiments[1].timestamp(), None);

    let value = serde_json::to_value(first).unwrap();
    assert_eq!(value["timestamp"], "20260213_160916");

    let json = r#"[{"directory": "a", "scene": "S", "steps": [
        {"step": 0, "timestamp": 1739434156123456789, "unit_info": []}
    ]}]"#;
    let report = load_experiments_from_str(json).unwrap();
    let step = &report.experiments[0].steps()[0];
    assert_eq!(step.timestamp(), &Timestamp::Integer(1_739_434_156_123_456_789));
    assert_eq!(step.timestamp().to_string(), "1739434156123456789");
}

#[test]
fn test_loaded_batch_analyzes() {
    let report = load_experiments_from_str(BATCH).unwrap();
    let analysis = analyze(&report.experiments, &AnalysisConfig::default()).unwrap();

    assert_eq!(analysis.results.len(), 1);
    let result = &analysis.results[0];
    assert_eq!(result.experiment1, "VLMAgent_20260213_160916_MMM");
    assert_eq!(result.experiment2, "VLMAgent_20260213_201016_MMM");
    assert!(result.prefab_enabled_1);
    assert!(!result.prefab_enabled_2);

    let marine = result.trajectory_similarity["Marine_1"];
    // identical first position, second point of run 1 ignored by lockstep truncation
    assert!(marine.average_distance.abs() < f64::EPSILON);
    // run 1 has a low_health node at step 1 and a death at step 1, run 2 has none
    assert!(result.key_node_match_rate.abs() < f64::EPSILON);
    // unit counts [2, 1] vs [1]
    assert!((result.sequence_similarity - 0.5).abs() < f64::EPSILON);
}

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(BATCH.as_bytes()).unwrap();

    let report = load_experiments(file.path()).unwrap();
    assert_eq!(report.experiments.len(), 2);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_experiments(dir.path().join("missing.json"));
    assert!(matches!(result, Err(Error::Io(_))));
}

#[test]
fn test_three_dimensional_positions() {
    let json = r#"[
      {"directory": "a", "scene": "S", "steps": [
        {"step": 0, "unit_info": [{"unit_name": "U1", "health": 1, "max_health": 1, "position": [1, 2, 3]}]}
      ]},
      {"directory": "b", "scene": "S", "steps": [
        {"step": 0, "unit_info": [{"unit_name": "U1", "health": 1, "max_health": 1, "position": [1, 2]}]}
      ]}
    ]"#;
    let report = load_experiments_from_str(json).unwrap();
    assert!(report.is_clean());
    assert_eq!(report.experiments[0].position_dim(), Some(3));

    // 3D vs 2D comparison fails for the pair, not for the batch
    let analysis = analyze(&report.experiments, &AnalysisConfig::default()).unwrap();
    assert!(analysis.results.is_empty());
    assert_eq!(analysis.failures.len(), 1);
}
