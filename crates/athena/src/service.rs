//! Remote collaborators behind the client.
//!
//! Each trait is a thin seam over one AWS service. Responses are decoded into
//! the typed structures below once, at the boundary, so the rest of the crate
//! never touches SDK shapes. [`crate::aws`] holds the SDK-backed
//! implementations; tests substitute in-memory ones.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::AthenaError;

// ── Typed responses ──────────────────────────────────────────────

/// Lifecycle state of a query execution as reported by Athena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionState {
    Queued,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl ExecutionState {
    /// Decode an Athena state string. Returns `None` for values this crate
    /// does not know about.
    pub fn from_athena(state: &str) -> Option<Self> {
        match state {
            "QUEUED" => Some(Self::Queued),
            "RUNNING" => Some(Self::Running),
            "SUCCEEDED" => Some(Self::Succeeded),
            "FAILED" => Some(Self::Failed),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "QUEUED",
            Self::Running => "RUNNING",
            Self::Succeeded => "SUCCEEDED",
            Self::Failed => "FAILED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// SUCCEEDED and FAILED end a status poll. Every other state, CANCELLED
    /// included, is checked again until the attempt budget runs out.
    pub fn stops_polling(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

impl fmt::Display for ExecutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status snapshot of one query execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionDetails {
    /// Athena query execution ID.
    pub execution_id: String,
    pub state: ExecutionState,
    /// Full S3 URI of the staged CSV (`s3://bucket/prefix/<id>.csv`).
    pub output_location: Option<String>,
    /// Athena's state-change reason, populated for failed executions.
    pub failure_reason: Option<String>,
}

/// Most execution IDs Athena describes in one batch call.
pub const BATCH_LOOKUP_LIMIT: usize = 50;

/// Result of describing several executions at once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionBatch {
    pub executions: Vec<ExecutionDetails>,
    /// IDs the service did not return or whose state could not be decoded.
    pub unresolved: Vec<String>,
}

/// One page of a paginated catalog listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogPage {
    pub entries: Vec<String>,
    /// Continuation token; `None` on the last page.
    pub next_token: Option<String>,
}

// ── Traits ───────────────────────────────────────────────────────

/// Query execution service (Athena).
#[async_trait]
pub trait QueryService: Send + Sync {
    /// Start executing `sql` in `database`, writing results under
    /// `output_location`. Returns the execution ID.
    async fn start_execution(
        &self,
        sql: &str,
        database: &str,
        output_location: &str,
        workgroup: Option<&str>,
    ) -> Result<String, AthenaError>;

    async fn get_execution(&self, execution_id: &str) -> Result<ExecutionDetails, AthenaError>;

    /// Describe up to [`BATCH_LOOKUP_LIMIT`] executions in one call.
    async fn get_executions(&self, execution_ids: &[String]) -> Result<ExecutionBatch, AthenaError>;

    async fn stop_execution(&self, execution_id: &str) -> Result<(), AthenaError>;

    /// IDs of all executions the service still knows about.
    async fn list_execution_ids(&self, workgroup: Option<&str>) -> Result<Vec<String>, AthenaError>;
}

/// Object storage holding staged results (S3).
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes, AthenaError>;

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), AthenaError>;
}

/// Metadata catalog listing databases, tables and columns.
#[async_trait]
pub trait CatalogService: Send + Sync {
    async fn list_databases(&self, next_token: Option<&str>) -> Result<CatalogPage, AthenaError>;

    async fn list_tables(
        &self,
        database: &str,
        next_token: Option<&str>,
    ) -> Result<CatalogPage, AthenaError>;

    async fn table_columns(&self, database: &str, table: &str) -> Result<Vec<String>, AthenaError>;
}

/// Caller identity (STS).
#[async_trait]
pub trait IdentityService: Send + Sync {
    async fn caller_account_id(&self) -> Result<String, AthenaError>;
}

// ── Services ─────────────────────────────────────────────────────

/// Initialised service handles, created once and owned by the client.
#[derive(Clone)]
pub struct Services {
    /// Region every handle is bound to.
    pub region: String,
    pub queries: Arc<dyn QueryService>,
    pub objects: Arc<dyn ObjectStore>,
    pub catalog: Arc<dyn CatalogService>,
    pub identity: Arc<dyn IdentityService>,
}

impl fmt::Debug for Services {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Services")
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}
