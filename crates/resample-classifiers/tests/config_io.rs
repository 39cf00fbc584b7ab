use resample_classifiers::config::{ModelType, SimulationConfig};
use resample_classifiers::data_handling::Dataset;
use resample_classifiers::io::{parse_passenger_records, read_passenger_dataset, InputConfig};
use resample_classifiers::threshold::ThresholdGrid;

#[test]
fn simulation_config_json_round_trip() {
    let cfg = SimulationConfig {
        n_trials: 250,
        test_fraction: 0.25,
        seed: Some(17),
        ..SimulationConfig::default()
    };
    let json = serde_json::to_string_pretty(&cfg).unwrap();
    let back: SimulationConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(cfg, back);
}

#[test]
fn partial_json_falls_back_to_defaults() {
    let cfg: SimulationConfig = serde_json::from_str(r#"{ "n_trials": 50, "seed": 3 }"#).unwrap();
    assert_eq!(cfg.n_trials, 50);
    assert_eq!(cfg.seed, Some(3));
    assert!((cfg.test_fraction - 0.2).abs() < 1e-12);
    assert_eq!(cfg.scan_grid, ThresholdGrid::new(0.0, 1.0, 101));
    assert_eq!(cfg.fine_grid, ThresholdGrid::new(0.4, 0.6, 101));
    assert_eq!(cfg.model.model_type, ModelType::default());
}

#[test]
fn model_hyperparameters_from_json() {
    let cfg: SimulationConfig = serde_json::from_str(
        r#"{ "model": { "LogisticRegression": { "c": 0.5, "max_iter": 200, "tol": 1e-6 } } }"#,
    )
    .unwrap();
    assert_eq!(
        cfg.model.model_type,
        ModelType::LogisticRegression {
            c: 0.5,
            max_iter: 200,
            tol: 1e-6
        }
    );
}

#[test]
fn semicolon_delimited_table_with_custom_marker() {
    let table = "class;age;sex;survived\n3;22;male;0\n1;38;female;1\n2;4;male;1\n";
    let input = InputConfig {
        delimiter: ';',
        male_marker: "male".to_string(),
    };
    let records = parse_passenger_records(table.as_bytes(), &input).unwrap();
    let dataset = Dataset::from_records(&records).unwrap();

    assert_eq!(dataset.n_rows(), 3);
    assert_eq!(dataset.n_positive(), 2);
    assert_eq!(dataset.x.column(4).to_vec(), vec![1.0, 0.0, 1.0]);
}

#[test]
fn malformed_row_reports_its_line() {
    let table = "pclass,age,gender,survived\n1,30,F,1\n2,abc,M,0\n";
    let err = parse_passenger_records(table.as_bytes(), &InputConfig::default()).unwrap_err();
    assert!(format!("{:#}", err).contains("line 3"));
}

#[test]
fn missing_file_is_an_error() {
    let err = read_passenger_dataset("does/not/exist.csv", &InputConfig::default()).unwrap_err();
    assert!(format!("{:#}", err).contains("does/not/exist.csv"));
}

#[test]
fn reads_dataset_from_disk() {
    let path = std::env::temp_dir().join(format!("passengers_{}.csv", std::process::id()));
    std::fs::write(&path, "pclass,age,gender,survived\n1,29,F,1\n3,40,M,0\n").unwrap();
    let dataset = read_passenger_dataset(&path, &InputConfig::default()).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(dataset.feature_names, vec!["C1", "C3", "age", "gender"]);
    assert_eq!(dataset.y.to_vec(), vec![true, false]);
}
