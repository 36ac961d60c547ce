//! Integration tests for the result log store

use resultlog::{LogStore, RECORD_FIELDS, RespondentId, ResponseRecord, Scores};
use tempfile::TempDir;

fn record(id: &RespondentId, image_file: &str) -> ResponseRecord {
    ResponseRecord::new(
        "2024-05-01 12:00:00",
        id,
        image_file,
        "nara",
        "detail",
        &Scores::from_values([3, 3, 4, 5]).unwrap(),
    )
}

#[test]
fn test_respondents_are_independent() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let store = LogStore::open(temp.path().join("results")).unwrap();
    let yamada = RespondentId::new("yamada").unwrap();
    let suzuki = RespondentId::new("鈴木").unwrap();

    store.append(&yamada, &record(&yamada, "nara_detail_001.png")).unwrap();

    assert_eq!(store.load_done_set(&yamada).len(), 1);
    assert!(store.load_done_set(&suzuki).is_empty());
}

#[test]
fn test_done_set_grows_by_one_per_append() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let store = LogStore::open(temp.path()).unwrap();
    let id = RespondentId::new("yamada").unwrap();

    for (i, name) in ["a.png", "b.png", "c.png"].iter().enumerate() {
        store.append(&id, &record(&id, name)).unwrap();
        let done = store.load_done_set(&id);
        assert_eq!(done.len(), i + 1);
        assert!(done.contains(name));
    }

    let raw = String::from_utf8(store.read_raw(&id.log_file_name()).unwrap()).unwrap();
    assert_eq!(raw.matches(&RECORD_FIELDS.join(",")).count(), 1);
}

#[test]
fn test_same_name_shares_one_log() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let store = LogStore::open(temp.path()).unwrap();
    let first = RespondentId::new("sato").unwrap();
    let second = RespondentId::new(" sato ").unwrap();

    store.append(&first, &record(&first, "a.png")).unwrap();

    assert!(store.load_done_set(&second).contains("a.png"));
    assert_eq!(store.list_logs().unwrap().len(), 1);
}
