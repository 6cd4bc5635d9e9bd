//! End-to-end persistence and export tests.
//!
//! Exercises the key-value codec through real files, the multi-section
//! dump, and the ordered-mapping export surface that external YAML/JSON
//! encoders consume.

use serde_json::{json, Value};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use strata_config::{keyval, ConfigError, PartitionStore};
use tempfile::TempDir;

fn filled_store() -> PartitionStore {
    let mut store = PartitionStore::new();
    store.add_categories(&["current_settings", "default_settings", "description"]);
    store
        .set_values("log", &[json!(true), json!(false), json!("Enable/disable logging")])
        .expect("set_values failed");
    store
        .set_values("log_level", &[json!(5), json!(1), json!("Logging verbosity")])
        .expect("set_values failed");
    store
        .set_values("log_file", &[json!("my.log")])
        .expect("set_values failed");
    store
}

#[test]
fn keyval_export_writes_expected_text() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("current_settings.conf");

    let store = filled_store();
    let partition = store.partition("current_settings").expect("partition missing");
    keyval::dump_keyval(&path, &partition).expect("dump failed");

    let text = fs::read_to_string(&path).expect("Failed to read file");
    assert_eq!(text, "log=true\nlog_level=5\nlog_file='my.log'\n");
}

#[test]
fn keyval_import_populates_a_new_partition() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("current_settings.conf");
    fs::write(&path, "log=true\nlog_level=5\nlog_file='my.log'\n").expect("Failed to write file");

    let mut store = PartitionStore::new();
    store.add_category("default_settings");
    let handles = store
        .load(&[("current_settings".to_string(), path)])
        .expect("load failed");

    assert_eq!(store.categories(), ["default_settings", "current_settings"]);
    assert_eq!(handles.len(), 1);
    assert_eq!(handles[0].get("log").expect("log missing"), json!(true));
    assert_eq!(handles[0].get("log_level").expect("log_level missing"), json!(5));
    assert_eq!(handles[0].get("log_file").expect("log_file missing"), json!("my.log"));
}

#[test]
fn load_keeps_file_sequence_order() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let current = temp_dir.path().join("current_settings.conf");
    let default = temp_dir.path().join("default_settings.conf");
    fs::write(&current, "log=true\nlog_level=5\nlog_file='my.log'\n").expect("Failed to write file");
    fs::write(&default, "log=false\nlog_level=1\n").expect("Failed to write file");

    let mut store = PartitionStore::new();
    store
        .load(&[
            ("current_settings".to_string(), current),
            ("default_settings".to_string(), default),
        ])
        .expect("load failed");

    assert_eq!(store.categories(), ["current_settings", "default_settings"]);
    assert_eq!(
        store.get_values("log_level"),
        vec![json!(5), json!(1)]
    );
}

#[test]
fn load_surfaces_format_errors_and_keeps_earlier_partitions() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let good = temp_dir.path().join("good.conf");
    let bad = temp_dir.path().join("bad.conf");
    fs::write(&good, "log=true\n").expect("Failed to write file");
    fs::write(&bad, "log=import os\n").expect("Failed to write file");

    let mut store = PartitionStore::new();
    let err = store
        .load(&[
            ("good".to_string(), good),
            ("bad".to_string(), bad),
        ])
        .expect_err("load should fail");

    assert!(matches!(err, ConfigError::Format { .. }));
    // not transactional: the first partition is already in
    assert_eq!(store.categories(), ["good"]);
}

#[test]
fn load_missing_file_is_io_error() {
    let mut store = PartitionStore::new();
    let err = store
        .load(&[("missing".to_string(), PathBuf::from("/nonexistent/missing.conf"))])
        .expect_err("load should fail");
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn dump_writes_every_partition() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let store = filled_store();

    let mut file_names = HashMap::new();
    for category in store.categories() {
        file_names.insert(
            category.clone(),
            temp_dir.path().join(format!("{category}.conf")),
        );
    }

    let written = store.dump(&file_names).expect("dump failed");
    assert_eq!(written.len(), 3);
    for (_, path) in &written {
        let metadata = fs::metadata(path).expect("dumped file missing");
        assert!(metadata.len() > 0);
    }
}

#[test]
fn dump_then_load_round_trips_the_store() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let store = filled_store();

    let mut file_names = HashMap::new();
    for category in store.categories() {
        file_names.insert(
            category.clone(),
            temp_dir.path().join(format!("{category}.conf")),
        );
    }
    let written = store.dump(&file_names).expect("dump failed");

    let mut restored = PartitionStore::new();
    restored.load(&written).expect("load failed");

    assert_eq!(restored.categories(), store.categories());
    assert_eq!(restored.to_ordered_mapping(), store.to_ordered_mapping());
}

#[test]
fn dump_into_one_writes_sections_in_store_order() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("all.conf");

    filled_store().dump_into_one(&path).expect("dump failed");

    let text = fs::read_to_string(&path).expect("Failed to read file");
    assert_eq!(
        text,
        "\n[current_settings]\nlog=true\nlog_level=5\nlog_file='my.log'\n\
         \n[default_settings]\nlog=false\nlog_level=1\n\
         \n[description]\nlog='Enable/disable logging'\nlog_level='Logging verbosity'\n"
    );
}

#[test]
fn json_export_matches_store_order() {
    let store = filled_store();
    let text = serde_json::to_string(&store.to_ordered_mapping()).expect("serialize failed");
    assert_eq!(
        text,
        r#"{"current_settings":{"log":true,"log_level":5,"log_file":"my.log"},"default_settings":{"log":false,"log_level":1},"description":{"log":"Enable/disable logging","log_level":"Logging verbosity"}}"#
    );
}

#[test]
fn yaml_export_round_trips_through_an_external_encoder() {
    let store = filled_store();
    let mapping = store.to_ordered_mapping();

    let yaml = serde_yaml::to_string(&mapping).expect("yaml serialize failed");
    let restored: Value = serde_yaml::from_str(&yaml).expect("yaml parse failed");
    assert_eq!(restored, mapping);
}

#[test]
fn codec_round_trip_preserves_order_and_values() {
    let mut partition = strata_config::Partition::new();
    partition.insert("enabled".to_string(), json!(false));
    partition.insert("retries".to_string(), json!(3));
    partition.insert("ratio".to_string(), json!(0.25));
    partition.insert("label".to_string(), json!("run #1"));
    partition.insert("comment".to_string(), Value::Null);

    let text = keyval::encode(&partition);
    let decoded = keyval::decode(&text).expect("decode failed");
    assert_eq!(decoded, partition);
    assert_eq!(keyval::encode(&decoded), text);
}
