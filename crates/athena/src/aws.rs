//! AWS SDK implementations of the service traits.
//!
//! Every SDK response is decoded into the typed structures from
//! [`crate::service`] here; SDK errors are stringified into
//! [`AthenaError::AwsSdk`].

use std::sync::Arc;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_athena::config::Region;
use aws_sdk_athena::error::DisplayErrorContext;
use aws_sdk_athena::types::{
    QueryExecution, QueryExecutionContext, QueryExecutionState, ResultConfiguration,
};
use bytes::Bytes;
use tracing::{debug, info};

use crate::config::AthenaConfig;
use crate::error::AthenaError;
use crate::service::{
    CatalogPage, CatalogService, ExecutionBatch, ExecutionDetails, ExecutionState,
    IdentityService, ObjectStore, QueryService, Services,
};

fn sdk_error<E: std::error::Error>(err: E) -> AthenaError {
    AthenaError::AwsSdk(DisplayErrorContext(err).to_string())
}

/// Placeholder status for a response with no state at all.
const MISSING_STATE: &str = "<missing>";

/// Decode one SDK execution. A missing or unrecognised state is
/// [`AthenaError::UnknownStatus`].
fn decode_execution(
    execution_id: &str,
    qe: &QueryExecution,
) -> Result<ExecutionDetails, AthenaError> {
    let status = qe.status();
    let raw_state = status
        .and_then(|s| s.state())
        .map(QueryExecutionState::as_str);
    let state = raw_state
        .and_then(ExecutionState::from_athena)
        .ok_or_else(|| AthenaError::UnknownStatus {
            execution_id: execution_id.to_string(),
            status: raw_state.unwrap_or(MISSING_STATE).to_string(),
        })?;

    Ok(ExecutionDetails {
        execution_id: execution_id.to_string(),
        state,
        output_location: qe
            .result_configuration()
            .and_then(|rc| rc.output_location())
            .map(str::to_string),
        failure_reason: status
            .and_then(|s| s.state_change_reason())
            .map(str::to_string),
    })
}

/// Resolve the region and build one SDK client per service.
///
/// The region comes from `config.region` when set, otherwise from the AWS
/// default chain (`AWS_REGION`, shared profile, instance metadata). Fails with
/// [`AthenaError::NoRegionFound`] when neither yields one.
pub async fn load_services(config: &AthenaConfig) -> Result<Services, AthenaError> {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = config.region.as_deref() {
        loader = loader.region(Region::new(region.to_string()));
    }
    let sdk_config = loader.load().await;

    let region = sdk_config
        .region()
        .map(|r| r.to_string())
        .ok_or(AthenaError::NoRegionFound)?;

    let athena = aws_sdk_athena::Client::new(&sdk_config);
    let s3 = aws_sdk_s3::Client::new(&sdk_config);
    let sts = aws_sdk_sts::Client::new(&sdk_config);

    info!(region = %region, catalog = %config.catalog, "AWS clients initialised");

    Ok(Services {
        region,
        queries: Arc::new(AthenaQueryService { client: athena.clone() }),
        objects: Arc::new(S3ObjectStore { client: s3 }),
        catalog: Arc::new(AthenaCatalog {
            client: athena,
            catalog: config.catalog.clone(),
        }),
        identity: Arc::new(StsIdentity { client: sts }),
    })
}

// ── Athena query execution ───────────────────────────────────────

/// [`QueryService`] over the Athena query execution APIs.
pub struct AthenaQueryService {
    client: aws_sdk_athena::Client,
}

#[async_trait]
impl QueryService for AthenaQueryService {
    async fn start_execution(
        &self,
        sql: &str,
        database: &str,
        output_location: &str,
        workgroup: Option<&str>,
    ) -> Result<String, AthenaError> {
        let resp = self
            .client
            .start_query_execution()
            .query_string(sql)
            .query_execution_context(QueryExecutionContext::builder().database(database).build())
            .result_configuration(
                ResultConfiguration::builder()
                    .output_location(output_location)
                    .build(),
            )
            .set_work_group(workgroup.map(str::to_string))
            .send()
            .await
            .map_err(sdk_error)?;

        resp.query_execution_id()
            .map(str::to_string)
            .ok_or_else(|| AthenaError::AwsSdk("No query execution ID returned".into()))
    }

    async fn get_execution(&self, execution_id: &str) -> Result<ExecutionDetails, AthenaError> {
        let resp = self
            .client
            .get_query_execution()
            .query_execution_id(execution_id)
            .send()
            .await
            .map_err(sdk_error)?;

        let qe = resp
            .query_execution()
            .ok_or_else(|| AthenaError::AwsSdk("No query execution in response".into()))?;
        decode_execution(execution_id, qe)
    }

    async fn get_executions(&self, execution_ids: &[String]) -> Result<ExecutionBatch, AthenaError> {
        if execution_ids.is_empty() {
            return Ok(ExecutionBatch::default());
        }

        let resp = self
            .client
            .batch_get_query_execution()
            .set_query_execution_ids(Some(execution_ids.to_vec()))
            .send()
            .await
            .map_err(sdk_error)?;

        let mut batch = ExecutionBatch::default();
        for qe in resp.query_executions() {
            let Some(id) = qe.query_execution_id() else {
                continue;
            };
            match decode_execution(id, qe) {
                Ok(details) => batch.executions.push(details),
                Err(e) => {
                    debug!(execution_id = %id, error = %e, "Undecodable execution in batch");
                    batch.unresolved.push(id.to_string());
                }
            }
        }
        for unprocessed in resp.unprocessed_query_execution_ids() {
            if let Some(id) = unprocessed.query_execution_id() {
                debug!(
                    execution_id = %id,
                    code = unprocessed.error_code().unwrap_or_default(),
                    "Execution not processed in batch"
                );
                batch.unresolved.push(id.to_string());
            }
        }
        Ok(batch)
    }

    async fn stop_execution(&self, execution_id: &str) -> Result<(), AthenaError> {
        self.client
            .stop_query_execution()
            .query_execution_id(execution_id)
            .send()
            .await
            .map_err(sdk_error)?;
        Ok(())
    }

    async fn list_execution_ids(&self, workgroup: Option<&str>) -> Result<Vec<String>, AthenaError> {
        let mut ids = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let resp = self
                .client
                .list_query_executions()
                .set_work_group(workgroup.map(str::to_string))
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(sdk_error)?;

            ids.extend(resp.query_execution_ids().iter().cloned());

            match resp.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => break,
            }
        }

        debug!(count = ids.len(), "Listed query executions");
        Ok(ids)
    }
}

// ── S3 ───────────────────────────────────────────────────────────

/// [`ObjectStore`] over S3.
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes, AthenaError> {
        let resp = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(sdk_error)?;

        let body = resp.body.collect().await.map_err(sdk_error)?;
        Ok(body.into_bytes())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), AthenaError> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(sdk_error)?;
        Ok(())
    }
}

// ── Athena data catalog ──────────────────────────────────────────

/// [`CatalogService`] over Athena's data catalog APIs.
pub struct AthenaCatalog {
    client: aws_sdk_athena::Client,
    /// Data catalog name, `AwsDataCatalog` for the Glue-backed default.
    catalog: String,
}

#[async_trait]
impl CatalogService for AthenaCatalog {
    async fn list_databases(&self, next_token: Option<&str>) -> Result<CatalogPage, AthenaError> {
        let resp = self
            .client
            .list_databases()
            .catalog_name(&self.catalog)
            .set_next_token(next_token.map(str::to_string))
            .send()
            .await
            .map_err(sdk_error)?;

        Ok(CatalogPage {
            entries: resp
                .database_list()
                .iter()
                .map(|db| db.name().to_string())
                .collect(),
            next_token: resp.next_token().map(str::to_string),
        })
    }

    async fn list_tables(
        &self,
        database: &str,
        next_token: Option<&str>,
    ) -> Result<CatalogPage, AthenaError> {
        let resp = self
            .client
            .list_table_metadata()
            .catalog_name(&self.catalog)
            .database_name(database)
            .set_next_token(next_token.map(str::to_string))
            .send()
            .await
            .map_err(sdk_error)?;

        Ok(CatalogPage {
            entries: resp
                .table_metadata_list()
                .iter()
                .map(|t| t.name().to_string())
                .collect(),
            next_token: resp.next_token().map(str::to_string),
        })
    }

    async fn table_columns(&self, database: &str, table: &str) -> Result<Vec<String>, AthenaError> {
        let resp = self
            .client
            .get_table_metadata()
            .catalog_name(&self.catalog)
            .database_name(database)
            .table_name(table)
            .send()
            .await
            .map_err(sdk_error)?;

        Ok(resp
            .table_metadata()
            .map(|t| t.columns().iter().map(|c| c.name().to_string()).collect())
            .unwrap_or_default())
    }
}

// ── STS ──────────────────────────────────────────────────────────

/// [`IdentityService`] over STS `GetCallerIdentity`.
pub struct StsIdentity {
    client: aws_sdk_sts::Client,
}

#[async_trait]
impl IdentityService for StsIdentity {
    async fn caller_account_id(&self) -> Result<String, AthenaError> {
        let resp = self
            .client
            .get_caller_identity()
            .send()
            .await
            .map_err(sdk_error)?;

        resp.account()
            .map(str::to_string)
            .ok_or_else(|| AthenaError::AwsSdk("No account in caller identity".into()))
    }
}
