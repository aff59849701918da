//! Bounded polling of an execution's state.
//!
//! Each status check yields a [`PollOutcome`]; [`await_terminal`] loops over
//! checks with capped exponential backoff until SUCCEEDED or FAILED, or until
//! the attempt budget runs out.

use std::time::Duration;

use tracing::{debug, warn};

use crate::error::AthenaError;
use crate::service::{ExecutionState, QueryService};

/// Delay after the first unsuccessful status check.
pub const INITIAL_DELAY_MS: u64 = 300;
/// Upper bound for any single delay.
pub const MAX_DELAY_MS: u64 = 60_000;
/// Status checks performed before giving up.
pub const MAX_ATTEMPTS: u32 = 10;

/// Result of a single status check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// SUCCEEDED or FAILED.
    Terminal(ExecutionState),
    /// Any other state; checked again.
    Pending(ExecutionState),
}

/// Retry budget and backoff schedule for [`await_terminal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            initial_delay: Duration::from_millis(INITIAL_DELAY_MS),
            max_delay: Duration::from_millis(MAX_DELAY_MS),
        }
    }
}

impl PollPolicy {
    /// Delay to wait after check number `attempt` (counted from 0):
    /// `min(initial * 2^attempt, max)`.
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.initial_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |d| d.min(self.max_delay))
    }
}

/// `min(300 * 2^attempt, 60000)` milliseconds, attempt counted from 0.
pub fn backoff_delay(attempt: u32) -> Duration {
    PollPolicy::default().delay(attempt)
}

/// Perform one status check.
pub async fn check_once(
    queries: &dyn QueryService,
    execution_id: &str,
) -> Result<PollOutcome, AthenaError> {
    let details = queries.get_execution(execution_id).await?;
    Ok(if details.state.stops_polling() {
        PollOutcome::Terminal(details.state)
    } else {
        PollOutcome::Pending(details.state)
    })
}

/// Poll until the execution is SUCCEEDED or FAILED.
///
/// Sleeps `policy.delay(n)` after the n-th pending check; no sleep follows the
/// last attempt. Fails with [`AthenaError::Timeout`] once `max_attempts`
/// checks have all come back pending. Errors from the status call itself are
/// returned immediately.
pub async fn await_terminal(
    queries: &dyn QueryService,
    execution_id: &str,
    policy: &PollPolicy,
) -> Result<ExecutionState, AthenaError> {
    for attempt in 0..policy.max_attempts {
        match check_once(queries, execution_id).await? {
            PollOutcome::Terminal(state) => {
                debug!(execution_id = %execution_id, attempt, state = %state, "Query reached terminal state");
                return Ok(state);
            }
            PollOutcome::Pending(state) => {
                debug!(execution_id = %execution_id, attempt, state = %state, "Polling query status");
            }
        }

        if attempt + 1 < policy.max_attempts {
            tokio::time::sleep(policy.delay(attempt)).await;
        }
    }

    warn!(
        execution_id = %execution_id,
        attempts = policy.max_attempts,
        "Query did not finish within the retry budget"
    );
    Err(AthenaError::Timeout {
        execution_id: execution_id.to_string(),
        attempts: policy.max_attempts,
    })
}
