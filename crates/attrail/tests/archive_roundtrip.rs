//! Offline classification must match online classification: saving a
//! fetched record set and re-loading it from disk yields the same derived
//! fields as classifying the in-memory sequence directly.

use attestation_models::{load_archive, save_archive, AttestationRecord, GitCommitInfo};
use transition_engine::classify;

fn record(name: &str, branch: &str, created_at: i64, flag: bool) -> AttestationRecord {
    let mut annotations = std::collections::BTreeMap::new();
    annotations.insert("NAR_ID".to_string(), format!("NAR-{created_at}"));
    annotations.insert("REPOSITORY".to_string(), "acme/backend".to_string());

    AttestationRecord {
        created_at,
        is_compliant: Some(flag),
        attestation_name: name.to_string(),
        annotations,
        git_commit_info: GitCommitInfo {
            branch: Some(branch.to_string()),
            extra: Default::default(),
        },
        extra: Default::default(),
    }
}

#[test]
fn classifying_a_reloaded_archive_matches_direct_classification() {
    let records = vec![
        record("unit-tests", "main", 100, false),
        record("unit-tests", "release", 150, true),
        record("unit-tests", "main", 200, true),
        record("coverage-gate", "main", 250, true),
        record("unit-tests", "main", 300, true),
    ];

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("feed.json");
    save_archive(&path, &records).unwrap();
    let reloaded = load_archive(&path).unwrap();

    assert_eq!(reloaded, records);

    let direct = classify(&records).unwrap();
    let offline = classify(&reloaded).unwrap();

    assert_eq!(direct.len(), offline.len());
    for (a, b) in direct.iter().zip(offline.iter()) {
        assert_eq!(a.date, b.date);
        assert_eq!(a.time, b.time);
        assert_eq!(a.nar_id, b.nar_id);
        assert_eq!(a.repository, b.repository);
        assert_eq!(a.branch, b.branch);
        assert_eq!(a.prev_is_compliant, b.prev_is_compliant);
        assert_eq!(a.event, b.event);
    }
}

#[test]
fn reloaded_archive_classifies_the_two_record_example() {
    let records = vec![
        record("svc", "main", 100, false),
        record("svc", "main", 200, true),
    ];

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("feed.json");
    save_archive(&path, &records).unwrap();

    let classified = classify(&load_archive(&path).unwrap()).unwrap();
    assert_eq!(classified[0].event.as_str(), "became-non-compliant");
    assert_eq!(classified[1].event.as_str(), "became-compliant");
}
