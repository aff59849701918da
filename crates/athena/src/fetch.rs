use tracing::{debug, info, warn};

use crate::error::AthenaError;
use crate::location::{metadata_key, ResultLocation};
use crate::result::ResultTable;
use crate::service::{ExecutionState, ObjectStore, QueryService};

/// Download and decode the staged result of a finished execution.
///
/// The object is read from the output location Athena recorded for the
/// execution. Unless `keep_staged` is set, the CSV and its `.metadata`
/// sidecar are deleted afterwards; a failed delete is logged and does not
/// affect the returned table.
pub async fn fetch_result(
    queries: &dyn QueryService,
    objects: &dyn ObjectStore,
    execution_id: &str,
    keep_staged: bool,
) -> Result<ResultTable, AthenaError> {
    let details = queries.get_execution(execution_id).await?;

    match details.state {
        ExecutionState::Succeeded => {}
        ExecutionState::Queued | ExecutionState::Running => {
            return Err(AthenaError::StillRunning {
                execution_id: execution_id.to_string(),
                state: details.state.to_string(),
            });
        }
        ExecutionState::Failed => {
            return Err(AthenaError::ExecutionFailed {
                execution_id: execution_id.to_string(),
                reason: details.failure_reason.unwrap_or_else(|| "unknown".to_string()),
            });
        }
        ExecutionState::Cancelled => {
            return Err(AthenaError::UnknownStatus {
                execution_id: execution_id.to_string(),
                status: details.state.to_string(),
            });
        }
    }

    let output = details
        .output_location
        .ok_or_else(|| AthenaError::MissingResultLocation {
            execution_id: execution_id.to_string(),
        })?;
    let staged = ResultLocation::split_recorded(&output)?;

    let body = objects.get_object(&staged.bucket, &staged.path).await?;
    let table = ResultTable::from_csv(&body)?;

    debug!(
        execution_id = %execution_id,
        columns = table.column_count(),
        rows = table.row_count(),
        "Parsed staged result"
    );

    if !keep_staged {
        for key in [staged.path.clone(), metadata_key(&staged.path)] {
            if let Err(e) = objects.delete_object(&staged.bucket, &key).await {
                warn!(
                    execution_id = %execution_id,
                    bucket = %staged.bucket,
                    key = %key,
                    error = %e,
                    "Failed to remove staged result object"
                );
            }
        }
        info!(execution_id = %execution_id, location = %output, "Staged result cleanup done");
    }

    Ok(table)
}
