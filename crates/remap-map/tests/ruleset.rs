use remap_map::{
    MappingRuleStore, Provenance, ProposedMapping, RULE_SET_VERSION, RuleSetDocument,
    RuleSetError, SourceCheck, SourceFingerprint, load_rule_set, save_rule_set,
};

fn sample_store() -> MappingRuleStore {
    let mut store = MappingRuleStore::new();
    store.apply_ai_batch(&[
        ProposedMapping::new("HR", "Human Resources", 0.9),
        ProposedMapping::new("FIN", "Finance", 0.4),
    ]);
    store.upsert_manual("ENG", "Engineering");
    store.delete("FIN");
    store
}

#[test]
fn rule_set_survives_a_save_and_load() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("rules").join("dept.json");
    let store = sample_store();

    let document = RuleSetDocument::from_store("Dept", &store, None);
    save_rule_set(&path, &document).expect("save rule set");
    assert!(!path.with_extension("json.tmp").exists());

    let loaded = load_rule_set(&path).expect("load rule set");
    assert_eq!(loaded.version, RULE_SET_VERSION);
    assert_eq!(loaded.column, "Dept");

    let restored = loaded.to_store();
    assert_eq!(restored.rules(), store.rules());
    assert!(restored.is_suppressed("FIN"));
    assert_eq!(restored.get("ENG").map(|r| r.provenance), Some(Provenance::Manual));
}

#[test]
fn source_fingerprint_detects_changes() {
    let dir = tempfile::tempdir().expect("temp dir");
    let source = dir.path().join("staff.csv");
    std::fs::write(&source, "Dept\nHR\n").expect("write source");

    let fingerprint = SourceFingerprint::compute(&source).expect("fingerprint");
    assert_eq!(fingerprint.sha256.len(), 64);
    let document = RuleSetDocument::from_store("Dept", &sample_store(), Some(fingerprint));
    assert_eq!(document.check_source(&source).expect("check"), SourceCheck::Matches);

    std::fs::write(&source, "Dept\nENG\n").expect("rewrite source");
    assert_eq!(document.check_source(&source).expect("check"), SourceCheck::Changed);

    let unrecorded = RuleSetDocument::from_store("Dept", &sample_store(), None);
    assert_eq!(
        unrecorded.check_source(&source).expect("check"),
        SourceCheck::Unrecorded
    );
}

#[test]
fn newer_versions_are_rejected() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("future.json");
    std::fs::write(
        &path,
        r#"{"version": 99, "saved_at": "2030-01-01T00:00:00+00:00", "column": "Dept"}"#,
    )
    .expect("write document");

    let err = load_rule_set(&path).expect_err("version too new");
    assert!(matches!(err, RuleSetError::UnsupportedVersion { found: 99, .. }));
}

#[test]
fn invalid_json_is_reported_with_its_path() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ not json").expect("write document");

    match load_rule_set(&path).expect_err("invalid json") {
        RuleSetError::Deserialization { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn failed_save_removes_the_temp_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("dept.json");
    std::fs::create_dir(&path).expect("directory in the way");
    std::fs::write(path.join("keep.txt"), "occupied").expect("fill directory");

    let document = RuleSetDocument::from_store("Dept", &sample_store(), None);
    let err = save_rule_set(&path, &document).expect_err("rename onto a directory");
    assert!(matches!(err, RuleSetError::AtomicWriteFailed { .. }));
    assert!(!path.with_extension("json.tmp").exists());
    assert!(path.join("keep.txt").exists());
}
