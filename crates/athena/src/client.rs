//! AWS Athena query execution client.
//!
//! Provides [`AthenaClient`], which runs SQL against one Athena database in
//! either of two modes:
//! - synchronous: [`AthenaClient::execute`] submits, polls with capped
//!   exponential backoff and returns the parsed [`ResultTable`];
//! - asynchronous: [`AthenaClient::execute_async`] returns the execution ID,
//!   and [`AthenaClient::status`], [`AthenaClient::fetch`] and
//!   [`AthenaClient::cancel`] act on it later.

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::aws::load_services;
use crate::catalog;
use crate::config::AthenaConfig;
use crate::error::AthenaError;
use crate::fetch::fetch_result;
use crate::location::ResultLocation;
use crate::poller::{await_terminal, PollPolicy};
use crate::result::ResultTable;
use crate::service::{ExecutionState, Services, BATCH_LOOKUP_LIMIT};
use crate::submit::submit;

/// Returned by [`AthenaClient::failure_reason`] for executions that did not fail.
pub const NOT_FAILED: &str = "Query has not failed.";

/// Per-query options for [`AthenaClient::execute`] and
/// [`AthenaClient::execute_async`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecuteOptions {
    /// Where Athena stages the result. `None` uses the client's configured
    /// location, or the console default bucket when that is unset too.
    pub output_location: Option<String>,
    /// Keep the staged CSV after fetching. Always true when an explicit
    /// output location is given.
    pub keep_staged: bool,
}

impl ExecuteOptions {
    pub fn output_location(mut self, location: impl Into<String>) -> Self {
        self.output_location = Some(location.into());
        self
    }

    pub fn keep_staged(mut self, keep: bool) -> Self {
        self.keep_staged = keep;
        self
    }
}

/// Client for executing queries against one AWS Athena database.
///
/// Holds service handles created once at construction; it carries no other
/// state between calls, so any number of executions may be in flight.
#[derive(Debug)]
pub struct AthenaClient {
    config: AthenaConfig,
    services: Services,
    policy: PollPolicy,
}

impl AthenaClient {
    /// Create a new [`AthenaClient`] from the given configuration.
    ///
    /// Fails with [`AthenaError::NoRegionFound`] when no region is configured
    /// or discoverable, and with [`AthenaError::DatabaseNotFound`] when
    /// `config.database` is not in the region's catalog.
    pub async fn connect(config: AthenaConfig) -> Result<Self, AthenaError> {
        let services = load_services(&config).await?;
        Self::with_services(config, services).await
    }

    /// Build a client over already initialised service handles.
    ///
    /// The database is verified against the catalog before the client is
    /// returned.
    pub async fn with_services(
        config: AthenaConfig,
        services: Services,
    ) -> Result<Self, AthenaError> {
        let databases = catalog::list_databases(services.catalog.as_ref()).await?;
        if !databases.iter().any(|db| db == &config.database) {
            return Err(AthenaError::DatabaseNotFound {
                database: config.database.clone(),
                region: services.region.clone(),
            });
        }

        info!(
            region = %services.region,
            database = %config.database,
            "AthenaClient initialised"
        );

        Ok(Self {
            config,
            services,
            policy: PollPolicy::default(),
        })
    }

    /// Replace the polling policy used by [`Self::execute`].
    pub fn with_poll_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn database(&self) -> &str {
        &self.config.database
    }

    pub fn region(&self) -> &str {
        &self.services.region
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    // ── Execution ────────────────────────────────────────────────────

    /// Execute a SQL query and return the parsed result with its execution ID.
    ///
    /// This performs the full lifecycle:
    /// 1. Start query execution
    /// 2. Poll until a terminal state (with exponential backoff)
    /// 3. Fetch and parse the staged CSV, removing it unless kept
    pub async fn execute(
        &self,
        sql: &str,
        options: ExecuteOptions,
    ) -> Result<(ResultTable, String), AthenaError> {
        let (location, keep_staged) = self.resolve_output(&options).await?;
        let execution_id = self.submit_to(sql, &location).await?;

        match await_terminal(self.services.queries.as_ref(), &execution_id, &self.policy).await? {
            ExecutionState::Succeeded => {}
            ExecutionState::Failed => {
                let reason = self.failure_reason(&execution_id).await?;
                error!(execution_id = %execution_id, reason = %reason, "Query failed");
                return Err(AthenaError::ExecutionFailed {
                    execution_id,
                    reason,
                });
            }
            other => {
                return Err(AthenaError::UnknownStatus {
                    execution_id,
                    status: other.to_string(),
                });
            }
        }

        let table = self.fetch(&execution_id, keep_staged).await?;
        Ok((table, execution_id))
    }

    /// Submit a SQL query and return its execution ID without waiting.
    pub async fn execute_async(
        &self,
        sql: &str,
        options: ExecuteOptions,
    ) -> Result<String, AthenaError> {
        let (location, _) = self.resolve_output(&options).await?;
        self.submit_to(sql, &location).await
    }

    /// Current state of an execution. One remote call, no retry.
    pub async fn status(&self, execution_id: &str) -> Result<ExecutionState, AthenaError> {
        let details = self.services.queries.get_execution(execution_id).await?;
        Ok(details.state)
    }

    /// Athena's reason for a failed execution, or [`NOT_FAILED`].
    pub async fn failure_reason(&self, execution_id: &str) -> Result<String, AthenaError> {
        let details = self.services.queries.get_execution(execution_id).await?;
        if details.state != ExecutionState::Failed {
            return Ok(NOT_FAILED.to_string());
        }
        Ok(details
            .failure_reason
            .unwrap_or_else(|| "unknown".to_string()))
    }

    /// Fetch the result of a finished execution. See [`fetch_result`].
    pub async fn fetch(
        &self,
        execution_id: &str,
        keep_staged: bool,
    ) -> Result<ResultTable, AthenaError> {
        fetch_result(
            self.services.queries.as_ref(),
            self.services.objects.as_ref(),
            execution_id,
            keep_staged,
        )
        .await
    }

    /// Request cancellation of an execution.
    pub async fn cancel(&self, execution_id: &str) -> Result<(), AthenaError> {
        info!(execution_id = %execution_id, "Cancelling query");
        self.services.queries.stop_execution(execution_id).await?;
        info!(execution_id = %execution_id, "Query cancellation requested");
        Ok(())
    }

    /// IDs of all executions currently RUNNING.
    ///
    /// States are looked up [`BATCH_LOOKUP_LIMIT`] IDs per call. IDs the
    /// service could not describe are logged and left out.
    pub async fn list_running(&self) -> Result<Vec<String>, AthenaError> {
        let ids = self
            .services
            .queries
            .list_execution_ids(self.config.workgroup.as_deref())
            .await?;

        let mut running = Vec::new();
        for chunk in ids.chunks(BATCH_LOOKUP_LIMIT) {
            let batch = self.services.queries.get_executions(chunk).await?;
            for id in &batch.unresolved {
                warn!(execution_id = %id, "Skipping execution whose state could not be read");
            }
            running.extend(
                batch
                    .executions
                    .into_iter()
                    .filter(|details| details.state == ExecutionState::Running)
                    .map(|details| details.execution_id),
            );
        }

        debug!(known = ids.len(), running = running.len(), "Listed running queries");
        Ok(running)
    }

    /// Cancel every running execution. Returns the IDs that were cancelled;
    /// a failed stop call is logged and the rest are still attempted.
    pub async fn stop_all_running(&self) -> Result<Vec<String>, AthenaError> {
        let mut stopped = Vec::new();
        for id in self.list_running().await? {
            match self.cancel(&id).await {
                Ok(()) => stopped.push(id),
                Err(e) => warn!(execution_id = %id, error = %e, "Failed to cancel query"),
            }
        }
        Ok(stopped)
    }

    // ── Catalog ──────────────────────────────────────────────────────

    /// Tables in the client's database, in catalog order.
    pub async fn list_tables(&self) -> Result<Vec<String>, AthenaError> {
        catalog::list_tables(self.services.catalog.as_ref(), &self.config.database).await
    }

    /// Columns of `table` in the client's database.
    pub async fn list_columns(&self, table: &str) -> Result<Vec<String>, AthenaError> {
        catalog::list_columns(self.services.catalog.as_ref(), &self.config.database, table).await
    }

    /// The console's default result location for today (UTC).
    pub async fn default_location(&self) -> Result<ResultLocation, AthenaError> {
        let account_id = self.services.identity.caller_account_id().await?;
        Ok(ResultLocation::default_for(
            &self.config.results_prefix,
            &account_id,
            &self.services.region,
            Utc::now().date_naive(),
        ))
    }

    // ── Private helpers ──────────────────────────────────────────────

    /// Pick the output location for a query and whether its staged result
    /// survives the fetch. Caller-chosen locations are never cleaned up.
    async fn resolve_output(&self, options: &ExecuteOptions) -> Result<(String, bool), AthenaError> {
        if let Some(location) = &options.output_location {
            return Ok((location.clone(), true));
        }
        if let Some(location) = &self.config.output_location {
            return Ok((location.clone(), true));
        }
        let location = self.default_location().await?;
        Ok((
            location.to_string(),
            options.keep_staged || self.config.keep_staged,
        ))
    }

    async fn submit_to(&self, sql: &str, location: &str) -> Result<String, AthenaError> {
        submit(
            self.services.queries.as_ref(),
            &self.config.database,
            sql,
            location,
            self.config.workgroup.as_deref(),
        )
        .await
    }
}
