use super::*;

fn record(id: &str, status: DocumentStatus) -> DocumentRecord {
    DocumentRecord {
        id: DocumentId(id.to_string()),
        filename: format!("{id}.pdf"),
        file_size: 1024,
        file_type: ".pdf".to_string(),
        upload_date: "2025-03-01T12:00:00Z".parse().expect("timestamp"),
        status,
        chunk_count: 4,
        total_tokens: 900,
    }
}

#[test]
fn add_keeps_newest_first() {
    let mut registry = DocumentRegistry::new();
    registry
        .add(record("first", DocumentStatus::Ready))
        .expect("add first");
    registry
        .add(record("second", DocumentStatus::Ready))
        .expect("add second");

    let ids: Vec<_> = registry.list().iter().map(|r| r.id.0.as_str()).collect();
    assert_eq!(ids, vec!["second", "first"]);
}

#[test]
fn add_rejects_duplicate_id() {
    let mut registry = DocumentRegistry::new();
    registry
        .add(record("doc", DocumentStatus::Processing))
        .expect("add");

    let err = registry
        .add(record("doc", DocumentStatus::Ready))
        .expect_err("duplicate must fail");
    assert!(matches!(err, RegistryError::DuplicateId(_)));
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.list()[0].status, DocumentStatus::Processing);
}

#[test]
fn remove_missing_id_is_not_found() {
    let mut registry = DocumentRegistry::new();
    registry
        .add(record("kept", DocumentStatus::Ready))
        .expect("add");

    let err = registry
        .remove(&DocumentId("ghost".to_string()))
        .expect_err("must fail");
    assert!(matches!(err, RegistryError::NotFound(_)));
    assert_eq!(registry.len(), 1);
}

#[test]
fn count_by_status_counts_only_matching() {
    let mut registry = DocumentRegistry::new();
    registry
        .add(record("a", DocumentStatus::Ready))
        .expect("add a");
    registry
        .add(record("b", DocumentStatus::Processing))
        .expect("add b");
    registry
        .add(record("c", DocumentStatus::Error))
        .expect("add c");
    registry
        .add(record("d", DocumentStatus::Ready))
        .expect("add d");

    assert_eq!(registry.count_by_status(DocumentStatus::Ready), 2);
    assert_eq!(registry.count_by_status(DocumentStatus::Processing), 1);
    assert_eq!(registry.count_by_status(DocumentStatus::Error), 1);
}

#[test]
fn reset_preserves_order_and_drops_duplicates() {
    let mut registry = DocumentRegistry::new();
    registry
        .add(record("stale", DocumentStatus::Ready))
        .expect("add");

    let kept = registry.reset(vec![
        record("newest", DocumentStatus::Ready),
        record("older", DocumentStatus::Processing),
        record("newest", DocumentStatus::Error),
    ]);

    assert_eq!(kept, 2);
    let ids: Vec<_> = registry.list().iter().map(|r| r.id.0.as_str()).collect();
    assert_eq!(ids, vec!["newest", "older"]);
    assert_eq!(registry.list()[0].status, DocumentStatus::Ready);
}

#[test]
fn update_applies_forward_transition() {
    let mut registry = DocumentRegistry::new();
    registry
        .add(record("doc", DocumentStatus::Processing))
        .expect("add");

    let mut ready = record("doc", DocumentStatus::Ready);
    ready.chunk_count = 12;
    let changed = registry.update(ready).expect("update");

    assert!(changed);
    assert_eq!(registry.list()[0].status, DocumentStatus::Ready);
    assert_eq!(registry.list()[0].chunk_count, 12);
}

#[test]
fn update_refuses_status_regression() {
    let mut registry = DocumentRegistry::new();
    registry
        .add(record("doc", DocumentStatus::Ready))
        .expect("add");

    let changed = registry
        .update(record("doc", DocumentStatus::Processing))
        .expect("update");

    assert!(!changed);
    assert_eq!(registry.list()[0].status, DocumentStatus::Ready);
}

#[test]
fn update_unknown_id_is_not_found() {
    let mut registry = DocumentRegistry::new();
    let err = registry
        .update(record("ghost", DocumentStatus::Ready))
        .expect_err("must fail");
    assert!(matches!(err, RegistryError::NotFound(_)));
}
