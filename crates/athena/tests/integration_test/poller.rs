//! Tests for the status poller: retry budget and backoff timing.

use std::time::Duration;

use skiff_athena::poller::{await_terminal, check_once};
use skiff_athena::*;
use tokio::time::Instant;

use crate::mock::MockAthena;

use skiff_athena::ExecutionState::{Cancelled, Failed, Queued, Running, Succeeded};

/// The paused clock only moves when every task sleeps; allow the timer
/// wheel's millisecond rounding per sleep.
fn assert_elapsed(start: Instant, expected: Duration) {
    let elapsed = start.elapsed();
    assert!(
        elapsed >= expected && elapsed < expected + Duration::from_millis(10),
        "expected ~{expected:?}, got {elapsed:?}"
    );
}

#[tokio::test(start_paused = true)]
async fn test_succeeds_on_third_check() {
    let mock = MockAthena::new();
    mock.script("q-1", &[Queued, Running, Succeeded]);

    let start = Instant::now();
    let state = await_terminal(mock.as_ref(), "q-1", &PollPolicy::default())
        .await
        .unwrap();

    assert_eq!(state, Succeeded);
    assert_eq!(mock.status_checks(), 3);
    // Slept 300ms after the first check and 600ms after the second.
    assert_elapsed(start, Duration::from_millis(900));
}

#[tokio::test(start_paused = true)]
async fn test_failed_returns_immediately() {
    let mock = MockAthena::new();
    mock.script("q-1", &[Failed]);

    let start = Instant::now();
    let state = await_terminal(mock.as_ref(), "q-1", &PollPolicy::default())
        .await
        .unwrap();

    assert_eq!(state, Failed);
    assert_eq!(mock.status_checks(), 1);
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_keeps_polling_until_timeout() {
    let mock = MockAthena::new();
    mock.script("q-1", &[Cancelled]);

    let err = await_terminal(mock.as_ref(), "q-1", &PollPolicy::default())
        .await
        .unwrap_err();

    assert!(matches!(err, AthenaError::Timeout { attempts: 10, .. }));
    assert_eq!(mock.status_checks(), 10);
}

#[tokio::test]
async fn test_check_once_cancelled_is_pending() {
    let mock = MockAthena::new();
    mock.script("q-1", &[Cancelled]);

    assert_eq!(
        check_once(mock.as_ref(), "q-1").await.unwrap(),
        PollOutcome::Pending(Cancelled)
    );
}

#[tokio::test(start_paused = true)]
async fn test_times_out_after_ten_attempts() {
    let mock = MockAthena::new();
    mock.script("q-1", &[Running]);

    let start = Instant::now();
    let err = await_terminal(mock.as_ref(), "q-1", &PollPolicy::default())
        .await
        .unwrap_err();

    match err {
        AthenaError::Timeout {
            execution_id,
            attempts,
        } => {
            assert_eq!(execution_id, "q-1");
            assert_eq!(attempts, 10);
        }
        other => panic!("expected Timeout, got {other:?}"),
    }
    assert_eq!(mock.status_checks(), 10);

    // Nine sleeps: 300 + 600 + ... + 38400 + 60000 (capped).
    let expected: Duration = (0..9).map(backoff_delay).sum();
    assert_eq!(expected, Duration::from_millis(136_500));
    assert_elapsed(start, expected);
}

#[tokio::test]
async fn test_check_once_tags_outcome() {
    let mock = MockAthena::new();
    mock.script("q-1", &[Queued, Succeeded]);

    assert_eq!(
        check_once(mock.as_ref(), "q-1").await.unwrap(),
        PollOutcome::Pending(Queued)
    );
    assert_eq!(
        check_once(mock.as_ref(), "q-1").await.unwrap(),
        PollOutcome::Terminal(Succeeded)
    );
}

#[tokio::test]
async fn test_status_call_errors_are_not_retried() {
    let mock = MockAthena::new();

    let err = await_terminal(mock.as_ref(), "missing", &PollPolicy::default())
        .await
        .unwrap_err();

    assert!(matches!(err, AthenaError::AwsSdk(_)));
    assert_eq!(mock.status_checks(), 1);
}
