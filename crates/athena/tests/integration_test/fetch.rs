//! Tests for fetching staged results and cleaning them up.

use skiff_athena::fetch::fetch_result;
use skiff_athena::ExecutionState::{Cancelled, Failed, Queued, Running, Succeeded};
use skiff_athena::*;

use crate::mock::MockAthena;

const BUCKET: &str = "results-bucket";
const KEY: &str = "staging/q-7.csv";

fn succeeded_with_result() -> std::sync::Arc<MockAthena> {
    let mock = MockAthena::new();
    mock.script("q-7", &[Succeeded]);
    mock.put_object(BUCKET, KEY, b"a,b\n1,2\n");
    mock.put_object(BUCKET, "staging/q-7.csv.metadata", b"\x00meta");
    mock
}

#[tokio::test]
async fn test_fetch_parses_and_removes_staged_objects() {
    let mock = succeeded_with_result();

    let table = fetch_result(mock.as_ref(), mock.as_ref(), "q-7", false)
        .await
        .unwrap();

    assert_eq!(table.columns, vec!["a", "b"]);
    assert_eq!(table.rows, vec![vec![Some("1".to_string()), Some("2".to_string())]]);
    assert_eq!(
        mock.deleted(),
        vec![
            (BUCKET.to_string(), KEY.to_string()),
            (BUCKET.to_string(), "staging/q-7.csv.metadata".to_string()),
        ]
    );
    assert!(!mock.has_object(BUCKET, KEY));
}

#[tokio::test]
async fn test_fetch_keeps_staged_objects_when_asked() {
    let mock = succeeded_with_result();

    let table = fetch_result(mock.as_ref(), mock.as_ref(), "q-7", true)
        .await
        .unwrap();

    assert_eq!(table.row_count(), 1);
    assert!(mock.deleted().is_empty());
    assert!(mock.has_object(BUCKET, KEY));
}

#[tokio::test]
async fn test_cleanup_failure_still_returns_table() {
    let mock = succeeded_with_result();
    mock.fail_deletes();

    let table = fetch_result(mock.as_ref(), mock.as_ref(), "q-7", false)
        .await
        .unwrap();

    assert_eq!(table.get_value(0, "b"), Some("2"));
    // Both deletes were attempted even though the first one failed.
    let deletes = mock.calls().iter().filter(|c| **c == "delete_object").count();
    assert_eq!(deletes, 2);
}

#[tokio::test]
async fn test_fetch_rejects_unfinished_executions() {
    for state in [Queued, Running] {
        let mock = MockAthena::new();
        mock.script("q-1", &[state]);

        let err = fetch_result(mock.as_ref(), mock.as_ref(), "q-1", false)
            .await
            .unwrap_err();

        match err {
            AthenaError::StillRunning {
                execution_id,
                state: reported,
            } => {
                assert_eq!(execution_id, "q-1");
                assert_eq!(reported, state.to_string());
            }
            other => panic!("expected StillRunning, got {other:?}"),
        }
        assert!(!mock.calls().contains(&"get_object"));
    }
}

#[tokio::test]
async fn test_fetch_failed_execution_carries_reason() {
    let mock = MockAthena::new();
    mock.script("q-1", &[Failed]);
    mock.set_failure_reason("q-1", "SYNTAX_ERROR: line 1:8: Column 'x' cannot be resolved");

    let err = fetch_result(mock.as_ref(), mock.as_ref(), "q-1", false)
        .await
        .unwrap_err();

    match err {
        AthenaError::ExecutionFailed { reason, .. } => assert!(reason.contains("SYNTAX_ERROR")),
        other => panic!("expected ExecutionFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_fetch_cancelled_execution_is_unknown_status() {
    let mock = MockAthena::new();
    mock.script("q-1", &[Cancelled]);

    let err = fetch_result(mock.as_ref(), mock.as_ref(), "q-1", false)
        .await
        .unwrap_err();

    match err {
        AthenaError::UnknownStatus {
            execution_id,
            status,
        } => {
            assert_eq!(execution_id, "q-1");
            assert_eq!(status, "CANCELLED");
        }
        other => panic!("expected UnknownStatus, got {other:?}"),
    }
    assert!(!mock.calls().contains(&"get_object"));
}

#[tokio::test]
async fn test_missing_object_propagates() {
    let mock = MockAthena::new();
    mock.script("q-9", &[Succeeded]);

    let err = fetch_result(mock.as_ref(), mock.as_ref(), "q-9", false)
        .await
        .unwrap_err();

    assert!(matches!(err, AthenaError::AwsSdk(ref msg) if msg.contains("NoSuchKey")));
    assert!(mock.deleted().is_empty());
}
