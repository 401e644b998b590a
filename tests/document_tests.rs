use scopelog::{Artifact, LoggerConfig, Mapping, Naming, OpaqueRef, Scope, TelemetryError, Value};
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn read_document(path: &Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_end_to_end_document() {
    let dir = TempDir::new().unwrap();
    let root = Scope::root(LoggerConfig::new(dir.path())).unwrap();
    root.add_entry("x", 0).unwrap();

    let child = root.child("C").unwrap();
    child.add_entry("y", 1).unwrap();
    child.close().unwrap();

    let path = root.document_path();
    assert_eq!(path, dir.path().join("telemetry.json"));
    root.close().unwrap();

    let document = read_document(&path);
    assert_eq!(
        document,
        json!({
            "x": 0,
            "C": { "entries": { "y": 1 }, "artifacts": [] }
        })
    );
}

#[test]
fn test_document_keeps_insertion_order() {
    let dir = TempDir::new().unwrap();
    let root = Scope::root(LoggerConfig::new(dir.path())).unwrap();
    root.add_entry("zeta", 1).unwrap();
    root.add_entry("alpha", 2).unwrap();

    let child = root.child("middle").unwrap();
    child.add_entry("second", 2).unwrap();
    child.add_entry("first", 1).unwrap();
    child.close().unwrap();

    // 1. Overwriting keeps the original slot
    root.add_entry("zeta", 3).unwrap();

    let path = root.document_path();
    root.close().unwrap();

    // 2. Order is only visible in the raw text
    let text = fs::read_to_string(&path).unwrap();
    let at = |key: &str| text.find(&format!("\"{key}\"")).unwrap();
    assert!(at("zeta") < at("alpha"), "Top-level keys out of order:\n{text}");
    assert!(at("alpha") < at("middle"));
    assert!(at("entries") < at("artifacts"));
    assert!(at("second") < at("first"), "Nested keys out of order:\n{text}");
    assert_eq!(read_document(&path)["zeta"], json!(3));
}

#[test]
fn test_document_written_on_drop() {
    let dir = TempDir::new().unwrap();
    let path = {
        let root = Scope::root(LoggerConfig::new(dir.path()).with_document_name("run")).unwrap();
        root.add_entry("done", true).unwrap();
        root.document_path()
    };

    assert_eq!(path, dir.path().join("run.json"));
    assert_eq!(read_document(&path), json!({ "done": true }));
}

#[test]
fn test_output_dir_is_created_lazily() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("nested").join("logs");

    let root = Scope::root(LoggerConfig::new(&out)).unwrap();
    let child = root.child("branch").unwrap();
    assert!(!out.exists(), "Nothing is written before the first save");

    child.close().unwrap();
    root.close().unwrap();
    assert!(out.join("telemetry.json").exists());
    assert!(!out.join("branch").exists(), "A scope without artifacts creates no directory");
}

#[test]
fn test_clear_dir_removes_previous_run() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("logs");
    fs::create_dir_all(&out).unwrap();
    fs::write(out.join("stale.txt"), "old").unwrap();

    let root = Scope::root(LoggerConfig::new(&out).with_clear_dir(true)).unwrap();
    assert!(!out.join("stale.txt").exists());
    root.close().unwrap();

    let names: Vec<_> = fs::read_dir(&out).unwrap().map(|e| e.unwrap().file_name()).collect();
    assert_eq!(names, vec!["telemetry.json"]);
}

#[test]
fn test_unrepresentable_values_become_placeholders() {
    let dir = TempDir::new().unwrap();
    let root = Scope::root(LoggerConfig::new(dir.path())).unwrap();

    root.add_entry("model", OpaqueRef::new("Network")).unwrap();
    root.add_entry("weights", OpaqueRef::new("Tensor").with_artifact("weights.bin")).unwrap();
    root.add_entry("nan", f64::NAN).unwrap();
    root.add_entry("inf", f64::INFINITY).unwrap();
    root.add_entry("missing", Option::<i32>::None).unwrap();

    let path = root.document_path();
    root.close().unwrap();

    let document = read_document(&path);
    assert_eq!(document["model"], json!("<opaque Network>"));
    assert_eq!(document["weights"], json!("artifact:weights.bin"));
    assert_eq!(document["nan"], json!("NaN"));
    assert_eq!(document["inf"], json!("inf"));
    assert_eq!(document["missing"], serde_json::Value::Null);
}

#[test]
fn test_long_sequences_are_summarised() {
    let dir = TempDir::new().unwrap();
    let config = LoggerConfig::new(dir.path()).with_inline_sequence_limit(3);
    let root = Scope::root(config).unwrap();

    root.add_entry("small", vec![1, 2]).unwrap();
    root.add_entry("large", vec![0.5; 20]).unwrap();

    let path = root.document_path();
    root.close().unwrap();

    let document = read_document(&path);
    assert_eq!(document["small"], json!([1, 2]));
    assert_eq!(document["large"], json!("len:20"));
}

#[test]
fn test_root_artifacts_are_indexed() {
    let dir = TempDir::new().unwrap();
    let root = Scope::root(LoggerConfig::new(dir.path())).unwrap();
    let settings = Value::mapping([("foo", Value::from("bar"))]);

    root.save_artifact("settings", &Artifact::json(&settings), Naming::Plain).unwrap();

    let child = root.child("stage").unwrap();
    child.save_artifact("settings", &Artifact::json(&settings), Naming::Plain).unwrap();
    child.close().unwrap();

    let path = root.document_path();
    root.close().unwrap();

    let document = read_document(&path);
    assert_eq!(
        document["artifacts"],
        json!([{ "logicalName": "settings", "relativeFilePath": "settings.json" }])
    );
    assert_eq!(
        document["stage"]["artifacts"][0]["relativeFilePath"],
        json!(Path::new("stage").join("settings.json").to_string_lossy())
    );
}

#[test]
fn test_timing_entries() {
    let dir = TempDir::new().unwrap();
    let root = Scope::root(LoggerConfig::new(dir.path()).with_timing(true)).unwrap();

    let child = root.child("timed").unwrap();
    child
        .log_call("noop", Mapping::new(), |_| Ok::<_, TelemetryError>(()))
        .unwrap();
    let call = child.entries()["noop_1"].clone();
    assert!(call.get("dt").and_then(Value::as_f64).is_some());
    child.close().unwrap();

    let entries = root.entries();
    let timed = entries["timed"].get("entries").unwrap();
    assert!(timed.get("start").and_then(Value::as_str).is_some());
    assert!(timed.get("end").and_then(Value::as_str).is_some());
    assert!(timed.get("dt").and_then(Value::as_f64).unwrap() >= 0.0);

    let path = root.document_path();
    root.close().unwrap();
    let document = read_document(&path);
    assert!(document["dt"].is_number());
}

#[test]
fn test_document_write_failure() {
    let dir = TempDir::new().unwrap();
    // A directory squats on the document path
    fs::create_dir_all(dir.path().join("telemetry.json")).unwrap();

    let root = Scope::root(LoggerConfig::new(dir.path())).unwrap();
    root.add_entry("x", 1).unwrap();
    let err = root.dispose().unwrap_err();
    assert!(matches!(err, TelemetryError::Serialization { .. }), "Got {err:?}");
    assert!(root.is_disposed());
}

#[test]
fn test_unusable_output_dir() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("file");
    fs::write(&blocker, "not a directory").unwrap();

    // Opening succeeds: the path is only checked on first write
    let root = Scope::root(LoggerConfig::new(blocker.join("logs"))).unwrap();
    let settings = Value::from("x");
    let err = root
        .save_artifact("settings", &Artifact::json(&settings), Naming::Plain)
        .unwrap_err();
    assert!(matches!(err, TelemetryError::Config { .. }), "Got {err:?}");
    assert!(root.artifacts().is_empty());

    let err = root.close().unwrap_err();
    assert!(matches!(err, TelemetryError::Config { .. }), "Got {err:?}");
}

#[test]
fn test_config_from_json() {
    let config: LoggerConfig =
        serde_json::from_str(r#"{ "output_dir": "out", "record_timing": true }"#).unwrap();

    assert_eq!(config.output_dir, Path::new("out"));
    assert!(config.record_timing);
    assert!(!config.clear_dir);
    assert_eq!(config.document_name, "telemetry");
    assert_eq!(config.document_path(), Path::new("out").join("telemetry.json"));
}
