use tracing::info;

use crate::error::AthenaError;
use crate::location::ResultLocation;
use crate::service::QueryService;

/// Start `sql` in `database` and return its execution ID.
///
/// `location` is validated before anything is sent, so a malformed location
/// never reaches Athena. Remote failures are returned as-is.
pub async fn submit(
    queries: &dyn QueryService,
    database: &str,
    sql: &str,
    location: &str,
    workgroup: Option<&str>,
) -> Result<String, AthenaError> {
    let location = ResultLocation::parse(location)?;
    let output = location.to_string();

    info!(database = %database, output = %output, "Starting Athena query");
    let execution_id = queries
        .start_execution(sql, database, &output, workgroup)
        .await?;
    info!(execution_id = %execution_id, "Query execution started");

    Ok(execution_id)
}
