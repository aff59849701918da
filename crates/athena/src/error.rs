use thiserror::Error;

/// Errors that can occur during Athena operations.
#[derive(Debug, Error)]
pub enum AthenaError {
    /// No region was configured and none could be resolved from the environment.
    #[error("No default AWS region configuration found. Must specify a region.")]
    NoRegionFound,

    /// The configured database is not present in the region's data catalog.
    #[error("Database {database} not found in region {region}")]
    DatabaseNotFound { database: String, region: String },

    /// A result location did not match the accepted S3 path grammar.
    #[error("Invalid result location {location:?}: must follow format {expected}")]
    InvalidLocation { location: String, expected: String },

    /// The execution never reached a terminal state within the retry budget.
    #[error("Query {execution_id} did not finish after {attempts} status checks")]
    Timeout { execution_id: String, attempts: u32 },

    /// The execution failed on the Athena side.
    #[error("Query {execution_id} failed: {reason}")]
    ExecutionFailed { execution_id: String, reason: String },

    /// Results were requested for an execution that has not finished.
    #[error("Query {execution_id} is still {state}")]
    StillRunning { execution_id: String, state: String },

    /// Athena reported a state this crate does not recognise, or one the
    /// operation cannot act on (a CANCELLED execution has no result).
    #[error("Query {execution_id} is in an unknown status: {status}")]
    UnknownStatus { execution_id: String, status: String },

    /// A succeeded execution carried no output location.
    #[error("Query {execution_id} has no recorded result location")]
    MissingResultLocation { execution_id: String },

    /// An AWS SDK error (stringified).
    #[error("AWS SDK error: {0}")]
    AwsSdk(String),

    /// Failed to parse a staged result object.
    #[error("Parse error: {0}")]
    Parse(String),
}
