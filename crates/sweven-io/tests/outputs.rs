//! Writers against a scratch directory: files appear where the pipelines expect them.

use std::fs;

use sweven_data::{TableReader, make_tabular};
use sweven_io::{RegressionPlot, ResultWriter, RunConfig, TrainingMetrics, write_table_csv};
use tempfile::TempDir;

#[test]
fn training_bundle_has_expected_keys() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("models").join("example_model");
    let writer = ResultWriter::new(&out).unwrap();

    let metrics_path = writer
        .write_metrics(&TrainingMetrics {
            cv_scores: vec![0.5, 0.55, 0.6, 0.45, 0.5],
            mean_cv_score: 0.52,
            std_cv_score: 0.05,
            test_accuracy: 0.49,
        })
        .unwrap();
    let config_path = writer
        .write_config(&RunConfig {
            timestamp: "2024-05-01T12:00:00+00:00".into(),
            data_path: "data/processed/processed_data.csv".into(),
            n_estimators: 100,
            max_depth: Some(10),
            train_samples: 800,
            test_samples: 200,
            seed: 42,
        })
        .unwrap();

    assert_eq!(metrics_path, out.join("metrics.json"));
    let metrics: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&metrics_path).unwrap()).unwrap();
    for key in ["cv_scores", "mean_cv_score", "std_cv_score", "test_accuracy"] {
        assert!(metrics.get(key).is_some(), "metrics.json missing {key}");
    }
    assert_eq!(metrics["cv_scores"].as_array().unwrap().len(), 5);

    let config: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&config_path).unwrap()).unwrap();
    let keys: Vec<&str> = config.as_object().unwrap().keys().map(String::as_str).collect();
    for key in [
        "timestamp",
        "data_path",
        "n_estimators",
        "max_depth",
        "train_samples",
        "test_samples",
        "seed",
    ] {
        assert!(keys.contains(&key), "config.json missing {key}");
    }
    assert_eq!(config["max_depth"], 10);
}

#[test]
fn csv_reads_back_through_table_reader() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data").join("processed").join("processed_data.csv");
    let table = make_tabular(25, 42).unwrap();

    write_table_csv(&path, &table).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().next(), Some("feature1,feature2,feature3,target"));
    assert_eq!(text.lines().count(), 26);

    let back = TableReader::new(&path).read().unwrap();
    assert_eq!(back.columns(), table.columns());
    assert_eq!(back.n_rows(), 25);
    assert_eq!(back.rows(), table.rows());
}

#[test]
fn png_decodes_with_requested_size() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("experiments").join("regression.png");
    let x: Vec<f64> = (0..20).map(f64::from).collect();
    let actual: Vec<f64> = x.iter().map(|v| 2.5 * v + 1.5 + (v % 3.0) - 1.0).collect();
    let predicted: Vec<f64> = x.iter().map(|v| 2.5 * v + 1.5).collect();

    RegressionPlot::new(640, 480)
        .unwrap()
        .save(&path, &x, &actual, &predicted)
        .unwrap();

    let decoded = image::open(&path).unwrap().to_rgb8();
    assert_eq!(decoded.dimensions(), (640, 480));
}
