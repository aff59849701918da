//! S3 result locations.
//!
//! Athena stages every result set as `<location>/<execution-id>.csv` plus a
//! `.metadata` sidecar. [`ResultLocation`] is the validated bucket + prefix
//! pair a query is submitted with.

use std::fmt;
use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::AthenaError;

/// Grammar accepted for caller-supplied result locations.
pub const LOCATION_GRAMMAR: &str = r"^s3://[a-zA-Z0-9._/-]*$";

/// Bucket name prefix the Athena console uses for its own query results.
pub const DEFAULT_RESULTS_PREFIX: &str = "aws-athena-query-results";

const SCHEME: &str = "s3://";

static LOCATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(LOCATION_GRAMMAR).expect("location grammar is a valid regex"));

/// Bucket + key prefix where Athena writes query output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultLocation {
    /// S3 bucket name.
    pub bucket: String,
    /// Key prefix inside the bucket, without a leading `/`.
    pub path: String,
}

impl ResultLocation {
    /// Validate and split a caller-supplied location such as
    /// `s3://my-bucket/athena/results`.
    ///
    /// No network access; fails with [`AthenaError::InvalidLocation`] when the
    /// string does not match [`LOCATION_GRAMMAR`] or names no bucket.
    pub fn parse(location: &str) -> Result<Self, AthenaError> {
        if !LOCATION_RE.is_match(location) {
            return Err(invalid(location));
        }
        Self::split_recorded(location)
    }

    /// Split a location Athena itself recorded (for example an execution's
    /// output location). Only the scheme and a non-empty bucket are checked.
    pub fn split_recorded(uri: &str) -> Result<Self, AthenaError> {
        let rest = uri.strip_prefix(SCHEME).ok_or_else(|| invalid(uri))?;
        let (bucket, path) = rest.split_once('/').unwrap_or((rest, ""));
        if bucket.is_empty() {
            return Err(invalid(uri));
        }

        Ok(Self {
            bucket: bucket.to_string(),
            path: path.trim_start_matches('/').to_string(),
        })
    }

    /// The location the Athena console would use for an unsaved query on
    /// `date`: `s3://aws-athena-query-results-<account>-<region>/Unsaved/<yyyy>/<mm>/<dd>`.
    pub fn default_for(results_prefix: &str, account_id: &str, region: &str, date: NaiveDate) -> Self {
        Self {
            bucket: format!("{results_prefix}-{account_id}-{region}"),
            path: format!(
                "Unsaved/{:04}/{:02}/{:02}",
                date.year(),
                date.month(),
                date.day()
            ),
        }
    }
}

/// Key of the sidecar object Athena writes next to every result file.
pub fn metadata_key(result_key: &str) -> String {
    format!("{result_key}.metadata")
}

impl fmt::Display for ResultLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SCHEME}{}/{}", self.bucket, self.path)
    }
}

fn invalid(location: &str) -> AthenaError {
    AthenaError::InvalidLocation {
        location: location.to_string(),
        expected: LOCATION_GRAMMAR.to_string(),
    }
}
