//! Integration test: CLI commands over files on disk

use mlinterpret::cli::{cmd_importance, cmd_info, cmd_pdp, load_config, ImportanceArgs, PdpArgs};
use mlinterpret::explainability::{IceResult, ImportanceResult, PdpResult};
use mlinterpret::prelude::*;
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

struct Fixture {
    dir: TempDir,
    data: PathBuf,
    model: PathBuf,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();

    let data = dir.path().join("houses.csv");
    let mut file = std::fs::File::create(&data).unwrap();
    writeln!(file, "rooms,age,noise,price").unwrap();
    for i in 0..30 {
        let rooms = (i % 6 + 1) as f64;
        let age = (i * 3 % 40) as f64;
        let noise = (i * 7 % 5) as f64;
        let price = 50.0 * rooms - 0.5 * age;
        writeln!(file, "{},{},{},{}", rooms, age, noise, price).unwrap();
    }

    let model = dir.path().join("model.json");
    std::fs::write(
        &model,
        r#"{"type": "linear", "intercept": 0.0, "coefficients": {"rooms": 50.0, "age": -0.5}}"#,
    )
    .unwrap();

    Fixture { dir, data, model }
}

fn pdp_args(fx: &Fixture, ice: bool, output: &str) -> PdpArgs {
    PdpArgs {
        data: fx.data.clone(),
        model: fx.model.clone(),
        features: vec!["rooms".to_string(), "age".to_string()],
        grid_size: Some(6),
        ice,
        threads: None,
        output: Some(fx.dir.path().join(output)),
    }
}

#[test]
fn test_pdp_command_writes_results() {
    let fx = fixture();
    let args = pdp_args(&fx, false, "pdp.json");
    cmd_pdp(&args, &ExplainConfig::default()).unwrap();

    let json = std::fs::read_to_string(args.output.unwrap()).unwrap();
    let results: Vec<PdpResult> = serde_json::from_str(&json).unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].feature, "rooms");
    assert_eq!(results[0].grid_values, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    // linear model: each step in rooms adds 50
    let preds = &results[0].average_predictions;
    for pair in preds.windows(2) {
        assert!((pair[1] - pair[0] - 50.0).abs() < 1e-9);
    }
}

#[test]
fn test_pdp_command_ice_output() {
    let fx = fixture();
    let args = pdp_args(&fx, true, "ice.json");
    cmd_pdp(&args, &ExplainConfig::default()).unwrap();

    let json = std::fs::read_to_string(args.output.unwrap()).unwrap();
    let curves: Vec<IceResult> = serde_json::from_str(&json).unwrap();

    assert_eq!(curves.len(), 2);
    assert_eq!(curves[0].individual_predictions.len(), 30);
    assert!(curves[0].centered_predictions.is_some());
}

#[test]
fn test_importance_command_writes_ranking() {
    let fx = fixture();
    let output = fx.dir.path().join("importance.json");
    let args = ImportanceArgs {
        data: fx.data.clone(),
        model: fx.model.clone(),
        target: "price".to_string(),
        features: Vec::new(),
        metric: Some(Metric::Rmse),
        mode: None,
        repeats: Some(3),
        sample_fraction: None,
        seed: Some(42),
        top: Some(2),
        threads: Some(2),
        output: Some(output.clone()),
    };
    cmd_importance(&args, &ExplainConfig::default()).unwrap();

    let json = std::fs::read_to_string(output).unwrap();
    let result: ImportanceResult = serde_json::from_str(&json).unwrap();

    assert_eq!(result.seed, 42);
    assert_eq!(result.len(), 3);
    assert_eq!(result.importances[0].feature, "rooms");
    assert_eq!(result.get("noise").unwrap().importance, 0.0);
}

#[test]
fn test_config_file_and_missing_model_columns() {
    let fx = fixture();

    let config_path = fx.dir.path().join("config.json");
    std::fs::write(&config_path, r#"{"importance": {"n_repeats": 2, "mode": "ratio"}}"#).unwrap();
    let config = load_config(Some(config_path.as_path())).unwrap();
    assert_eq!(config.importance.n_repeats, 2);
    assert_eq!(config.importance.mode, ComparisonMode::Ratio);

    let bad_model = fx.dir.path().join("bad.json");
    std::fs::write(
        &bad_model,
        r#"{"type": "linear", "coefficients": {"bedrooms": 1.0}}"#,
    )
    .unwrap();
    let args = PdpArgs {
        model: bad_model,
        ..pdp_args(&fx, false, "unused.json")
    };
    assert!(cmd_pdp(&args, &config).is_err());
}

#[test]
fn test_info_command() {
    let fx = fixture();
    assert!(cmd_info(&fx.data).is_ok());
    assert!(cmd_info(&fx.dir.path().join("missing.csv")).is_err());
}
