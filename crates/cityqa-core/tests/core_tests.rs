use std::path::PathBuf;

use cityqa_core::config::{expand_path, Config};
use cityqa_core::types::{content_id, Document, Metadata};
use serde_json::Value;

#[test]
fn content_id_is_deterministic() {
    let a = content_id("Revere Beach is a public beach.");
    let b = content_id("Revere Beach is a public beach.");
    let c = content_id("Revere Beach is a private beach.");

    assert_eq!(a, b, "same content hashes to same id");
    assert_ne!(a, c, "different content hashes to different id");
    assert_eq!(a.len(), 64, "blake3 hex id");
    assert!(a.chars().all(|ch| ch.is_ascii_hexdigit()));
}

#[test]
fn document_new_enriches_metadata() {
    let mut meta = Metadata::new();
    meta.insert("source".to_string(), Value::from("attractions"));

    let doc = Document::new("café on the beach".to_string(), meta, vec![0.0; 4]);

    assert_eq!(doc.id, content_id("café on the beach"));
    assert_eq!(
        doc.metadata.get("source").and_then(Value::as_str),
        Some("attractions"),
        "caller metadata is preserved"
    );
    // char_count counts characters, not bytes
    assert_eq!(
        doc.metadata.get("char_count").and_then(Value::as_u64),
        Some(17)
    );
    let added_at = doc
        .metadata
        .get("added_at")
        .and_then(Value::as_str)
        .expect("added_at present");
    chrono::DateTime::parse_from_rfc3339(added_at).expect("added_at is RFC 3339");
}

#[test]
fn document_ids_are_content_addressed() {
    let d1 = Document::new("same text".to_string(), Metadata::new(), vec![1.0]);
    let d2 = Document::new("same text".to_string(), Metadata::new(), vec![2.0]);
    assert_eq!(d1.id, d2.id, "id depends only on content");
}

#[test]
fn expand_path_resolves_env_vars() {
    std::env::set_var("CITYQA_CORE_TEST_BASE", "/tmp/cityqa-test");
    let p = expand_path("${CITYQA_CORE_TEST_BASE}/db");
    assert_eq!(p, PathBuf::from("/tmp/cityqa-test/db"));

    let abs = expand_path("/var/lib/cityqa");
    assert_eq!(abs, PathBuf::from("/var/lib/cityqa"));
}

#[test]
fn config_env_override_and_missing_key() {
    std::env::set_var("APP_SMOKE", "on");
    let config = Config::load().expect("load");

    let smoke: String = config.get("smoke").expect("env-provided key");
    assert_eq!(smoke, "on");

    assert!(
        config.get::<String>("no.such.key").is_err(),
        "missing keys surface as errors"
    );
}
