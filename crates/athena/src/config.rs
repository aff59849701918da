use std::env;

use serde::{Deserialize, Serialize};

use crate::location::DEFAULT_RESULTS_PREFIX;

/// Athena data catalog backed by Glue.
pub const DEFAULT_CATALOG: &str = "AwsDataCatalog";

/// Database queried when none is configured.
pub const DEFAULT_DATABASE: &str = "default";

// ── Env helpers ──────────────────────────────────────────────────

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries `{PROFILE}_{KEY}` first, falls back to `{KEY}`.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_bool(profile: &str, key: &str, default: bool) -> bool {
    match profiled_env_opt(profile, key) {
        Some(v) => matches!(v.as_str(), "true" | "1"),
        None => default,
    }
}

// ── AthenaConfig ─────────────────────────────────────────────────

/// Connection settings for [`crate::AthenaClient`].
///
/// Reads from environment variables with optional profile prefix.
/// When `SKIFF_PROFILE=PROD`, checks `PROD_ATHENA_DATABASE` before `ATHENA_DATABASE`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AthenaConfig {
    /// AWS region. `None` defers to the AWS default chain.
    pub region: Option<String>,
    /// Database queries run against; must exist in the catalog.
    pub database: String,
    /// Athena workgroup, `None` for the account default.
    pub workgroup: Option<String>,
    /// S3 location for query results. `None` uses the console default bucket.
    pub output_location: Option<String>,
    /// Data catalog holding `database`.
    pub catalog: String,
    /// Bucket name prefix for the default output location.
    pub results_prefix: String,
    /// Keep staged result files after fetching.
    pub keep_staged: bool,
}

impl Default for AthenaConfig {
    fn default() -> Self {
        Self {
            region: None,
            database: DEFAULT_DATABASE.to_string(),
            workgroup: None,
            output_location: None,
            catalog: DEFAULT_CATALOG.to_string(),
            results_prefix: DEFAULT_RESULTS_PREFIX.to_string(),
            keep_staged: false,
        }
    }
}

impl AthenaConfig {
    /// Config for `database` with every other setting at its default.
    pub fn for_database(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            ..Self::default()
        }
    }

    /// Build config from environment variables.
    ///
    /// Reads `SKIFF_PROFILE` to determine profile prefix.
    /// For each key, tries `{PROFILE}_ATHENA_*` first, then `ATHENA_*`.
    /// `ATHENA_REGION` falls back to `AWS_REGION`.
    pub fn from_env() -> Self {
        let profile = env_opt("SKIFF_PROFILE")
            .map(|s| s.to_uppercase())
            .unwrap_or_default();
        Self::from_env_profiled(&profile)
    }

    /// Build config for a specific named profile.
    pub fn from_env_profiled(profile: &str) -> Self {
        let region = profiled_env_opt(profile, "ATHENA_REGION")
            .or_else(|| profiled_env_opt(profile, "AWS_REGION"));

        Self {
            region,
            database: profiled_env_or(profile, "ATHENA_DATABASE", DEFAULT_DATABASE),
            workgroup: profiled_env_opt(profile, "ATHENA_WORKGROUP"),
            output_location: profiled_env_opt(profile, "ATHENA_OUTPUT_LOCATION"),
            catalog: profiled_env_or(profile, "ATHENA_CATALOG", DEFAULT_CATALOG),
            results_prefix: profiled_env_or(profile, "ATHENA_RESULTS_PREFIX", DEFAULT_RESULTS_PREFIX),
            keep_staged: profiled_env_bool(profile, "ATHENA_KEEP_STAGED", false),
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────
