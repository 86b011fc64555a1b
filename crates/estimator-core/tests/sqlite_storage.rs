use estimator_core::storage::{
    EstimateStatus, LineItemValues, NewEstimate, NewLineItem, ProjectFields, SqliteStorage,
    StorageEngine,
};
use estimator_core::EstimatorError;
use uuid::Uuid;

#[test]
fn test_create_then_open_round_trip() {
    let dir = tempfile::tempdir().expect("tempdir should succeed");
    let path = dir.path().join("nested").join("estimator.db");
    let actor = Uuid::new_v4();

    let (project_id, estimate_id) = {
        let mut storage = SqliteStorage::create(&path).expect("create should succeed");
        assert_eq!(storage.format_version().expect("format version"), "0.2");

        let project_id = storage
            .insert_project(
                &ProjectFields {
                    name: "Garage Addition".to_string(),
                    ..Default::default()
                },
                &actor,
            )
            .expect("insert project should succeed");
        let estimate_id = storage
            .insert_estimate(&NewEstimate {
                project_id,
                name: "Base bid".to_string(),
                status: EstimateStatus::Draft,
                notes: Some("first pass".to_string()),
                created_by: actor,
            })
            .expect("insert estimate should succeed");
        storage
            .insert_line_items(&[NewLineItem {
                estimate_id,
                values: LineItemValues::new("Foundation", 18000.0),
                sort_order: 0,
            }])
            .expect("insert items should succeed");
        (project_id, estimate_id)
    };

    let storage = SqliteStorage::open(&path).expect("open should succeed");
    let estimate = storage
        .get_estimate(&estimate_id)
        .expect("get should succeed")
        .expect("estimate should exist");
    assert_eq!(estimate.project_id, project_id);
    assert_eq!(estimate.version, 1);
    assert_eq!(estimate.notes.as_deref(), Some("first pass"));
    assert_eq!(
        storage
            .list_line_items(&estimate_id)
            .expect("list should succeed")
            .len(),
        1
    );
    storage.check_integrity().expect("integrity should pass");
}

#[test]
fn test_create_existing_file_fails() {
    let dir = tempfile::tempdir().expect("tempdir should succeed");
    let path = dir.path().join("estimator.db");
    SqliteStorage::create(&path).expect("first create should succeed");

    let result = SqliteStorage::create(&path);
    assert!(matches!(result, Err(EstimatorError::Persistence(_))));
}

#[test]
fn test_open_missing_file_fails() {
    let dir = tempfile::tempdir().expect("tempdir should succeed");
    let result = SqliteStorage::open(&dir.path().join("missing.db"));
    assert!(matches!(result, Err(EstimatorError::NotFound(_))));
}

#[test]
fn test_open_foreign_file_fails() {
    let dir = tempfile::tempdir().expect("tempdir should succeed");
    let path = dir.path().join("other.db");
    std::fs::write(&path, b"").expect("write should succeed");

    let result = SqliteStorage::open(&path);
    assert!(matches!(result, Err(EstimatorError::Persistence(_))));
}
