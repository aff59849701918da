//! Tests for AthenaConfig: environment loading and profiles.

use std::env;
use std::sync::Mutex;

use skiff_athena::*;

// Env-based tests must run serially to avoid interfering with each other.
static ENV_LOCK: Mutex<()> = Mutex::new(());

// Helper: clear all ATHENA_* and profile env vars used by the config.
fn clear_athena_env() {
    let keys = [
        "SKIFF_PROFILE",
        "ATHENA_REGION",
        "ATHENA_DATABASE",
        "ATHENA_WORKGROUP",
        "ATHENA_OUTPUT_LOCATION",
        "ATHENA_CATALOG",
        "ATHENA_RESULTS_PREFIX",
        "ATHENA_KEEP_STAGED",
        "AWS_REGION",
        "TEST_ATHENA_DATABASE",
        "TEST_ATHENA_REGION",
        "TEST_ATHENA_OUTPUT_LOCATION",
        "TEST_ATHENA_KEEP_STAGED",
    ];
    for k in keys {
        env::remove_var(k);
    }
}

#[test]
fn test_config_from_env() {
    let _lock = ENV_LOCK.lock().unwrap();
    clear_athena_env();

    env::set_var("ATHENA_REGION", "us-west-2");
    env::set_var("ATHENA_DATABASE", "analytics");
    env::set_var("ATHENA_WORKGROUP", "custom");
    env::set_var("ATHENA_OUTPUT_LOCATION", "s3://my-bucket/results/");
    env::set_var("ATHENA_CATALOG", "lake");
    env::set_var("ATHENA_RESULTS_PREFIX", "team-results");

    let cfg = AthenaConfig::from_env();

    assert_eq!(cfg.region.as_deref(), Some("us-west-2"));
    assert_eq!(cfg.database, "analytics");
    assert_eq!(cfg.workgroup.as_deref(), Some("custom"));
    assert_eq!(cfg.output_location.as_deref(), Some("s3://my-bucket/results/"));
    assert_eq!(cfg.catalog, "lake");
    assert_eq!(cfg.results_prefix, "team-results");
    assert!(!cfg.keep_staged);

    clear_athena_env();
}

#[test]
fn test_config_profile() {
    let _lock = ENV_LOCK.lock().unwrap();
    clear_athena_env();

    // Set base config
    env::set_var("ATHENA_DATABASE", "base_db");
    env::set_var("ATHENA_KEEP_STAGED", "false");

    // Set profiled config
    env::set_var("SKIFF_PROFILE", "test");
    env::set_var("TEST_ATHENA_DATABASE", "test_db");
    env::set_var("TEST_ATHENA_KEEP_STAGED", "true");
    env::set_var("TEST_ATHENA_REGION", "eu-west-1");
    env::set_var("TEST_ATHENA_OUTPUT_LOCATION", "s3://test-bucket/");

    let cfg = AthenaConfig::from_env();

    // Should use profiled values
    assert!(cfg.keep_staged);
    assert_eq!(cfg.database, "test_db");
    assert_eq!(cfg.region.as_deref(), Some("eu-west-1"));
    assert_eq!(cfg.output_location.as_deref(), Some("s3://test-bucket/"));

    clear_athena_env();
}

/// This test requires valid AWS credentials and network access.
///
/// Run with: `cargo test test_real_athena_query -- --ignored`
///
/// Set environment variables before running:
/// - `ATHENA_DATABASE=<your-database>`
/// - `ATHENA_REGION=<region>` (or `AWS_REGION`)
/// - AWS credentials must be configured (via env vars or ~/.aws/credentials)
#[test]
#[ignore]
fn test_real_athena_query() {
    // This test is async, so we need a runtime
    let rt = tokio::runtime::Runtime::new().unwrap();

    rt.block_on(async {
        let config = AthenaConfig::from_env();

        let client = AthenaClient::connect(config)
            .await
            .expect("Failed to create AthenaClient - check region and database");

        let (result, execution_id) = client
            .execute("SELECT 1 as test_column", ExecuteOptions::default())
            .await
            .expect("Query execution failed");

        assert_eq!(result.column_count(), 1);
        assert_eq!(result.row_count(), 1);
        assert_eq!(result.get_value(0, "test_column"), Some("1"));
        assert_eq!(
            client.status(&execution_id).await.unwrap(),
            ExecutionState::Succeeded
        );

        println!("Real Athena query {execution_id} succeeded!");
        println!("{}", result);
    });
}
