//! Retry policy for transient endpoint failures.
//!
//! The attempt lifecycle is an explicit state machine with pure transitions,
//! so the policy (what retries, how long to wait, when to give up) is
//! testable without touching the network layer that drives it.

use crate::error::RemoteError;
use std::time::Duration;

/// Determine whether a remote error is worth retrying.
///
/// Retryable errors: 503 (the endpoint's workers are all busy or cold),
/// timeouts, connection failures. Everything else — other HTTP statuses,
/// reported job failures, malformed or caption-less replies — is permanent.
pub fn is_retryable(error: &RemoteError) -> bool {
    match error {
        RemoteError::Http { status, .. } => *status == 503,
        RemoteError::Timeout { .. } | RemoteError::Network(_) => true,
        _ => false,
    }
}

/// Backoff before retrying `attempt` (1-based, the attempt that just failed).
///
/// 503s back off linearly (`base_delay * attempt`) to give a saturated
/// endpoint progressively more room; timeouts and connection errors wait a
/// fixed `base_delay`.
pub fn backoff_duration(error: &RemoteError, attempt: u32, base_delay_ms: u64) -> Duration {
    let millis = match error {
        RemoteError::Http { status: 503, .. } => base_delay_ms.saturating_mul(attempt as u64),
        _ => base_delay_ms,
    };
    Duration::from_millis(millis)
}

/// Retry policy parameters.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts per image, including the first
    pub max_attempts: u32,
    /// Base backoff delay
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(2000),
        }
    }
}

/// Lifecycle of one image's captioning attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptState {
    /// No attempt made yet
    Pending,
    /// Attempt `attempt` (1-based) is in flight
    Attempting { attempt: u32 },
    /// Attempt `attempt` failed transiently; retry after `delay`
    RetryScheduled { attempt: u32, delay: Duration },
    /// A caption was obtained
    Succeeded,
    /// No further attempts will be made
    FailedPermanently { reason: String },
}

impl RetryPolicy {
    /// Move a non-terminal, non-inflight state into the next attempt.
    ///
    /// `Pending` starts attempt 1; `RetryScheduled` starts the following
    /// attempt (the caller is expected to have slept for `delay` first).
    /// Terminal and in-flight states pass through unchanged.
    pub fn begin(&self, state: AttemptState) -> AttemptState {
        match state {
            AttemptState::Pending => AttemptState::Attempting { attempt: 1 },
            AttemptState::RetryScheduled { attempt, .. } => AttemptState::Attempting {
                attempt: attempt + 1,
            },
            other => other,
        }
    }

    /// Resolve an in-flight attempt with its outcome.
    ///
    /// Pure: the decision depends only on the state, the outcome, and the
    /// policy parameters. Resolving a non-`Attempting` state passes it
    /// through unchanged.
    pub fn resolve(
        &self,
        state: AttemptState,
        outcome: Result<(), &RemoteError>,
    ) -> AttemptState {
        let AttemptState::Attempting { attempt } = state else {
            return state;
        };
        match outcome {
            Ok(()) => AttemptState::Succeeded,
            Err(error) if is_retryable(error) && attempt < self.max_attempts => {
                AttemptState::RetryScheduled {
                    attempt,
                    delay: backoff_duration(error, attempt, self.base_delay.as_millis() as u64),
                }
            }
            Err(error) if is_retryable(error) => AttemptState::FailedPermanently {
                reason: format!("{error} (retries exhausted after {attempt} attempts)"),
            },
            Err(error) => AttemptState::FailedPermanently {
                reason: error.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http(status: u16) -> RemoteError {
        RemoteError::Http {
            status,
            body: "body".to_string(),
        }
    }

    #[test]
    fn test_503_is_retryable() {
        assert!(is_retryable(&http(503)));
    }

    #[test]
    fn test_timeout_is_retryable() {
        assert!(is_retryable(&RemoteError::Timeout { timeout_ms: 120_000 }));
    }

    #[test]
    fn test_network_error_is_retryable() {
        assert!(is_retryable(&RemoteError::Network(
            "connection refused".to_string()
        )));
    }

    #[test]
    fn test_other_http_statuses_not_retryable() {
        assert!(!is_retryable(&http(400)));
        assert!(!is_retryable(&http(401)));
        assert!(!is_retryable(&http(500)));
        assert!(!is_retryable(&http(502)));
    }

    #[test]
    fn test_api_and_malformed_not_retryable() {
        assert!(!is_retryable(&RemoteError::Api("CUDA OOM".to_string())));
        assert!(!is_retryable(&RemoteError::MissingCaption));
        assert!(!is_retryable(&RemoteError::MalformedResponse(
            "not json".to_string()
        )));
    }

    #[test]
    fn test_backoff_linear_for_503() {
        assert_eq!(
            backoff_duration(&http(503), 1, 2000),
            Duration::from_millis(2000)
        );
        assert_eq!(
            backoff_duration(&http(503), 2, 2000),
            Duration::from_millis(4000)
        );
    }

    #[test]
    fn test_backoff_fixed_for_timeout() {
        let timeout = RemoteError::Timeout { timeout_ms: 1000 };
        assert_eq!(
            backoff_duration(&timeout, 1, 2000),
            Duration::from_millis(2000)
        );
        assert_eq!(
            backoff_duration(&timeout, 2, 2000),
            Duration::from_millis(2000)
        );
    }

    #[test]
    fn test_pending_begins_first_attempt() {
        let policy = RetryPolicy::default();
        assert_eq!(
            policy.begin(AttemptState::Pending),
            AttemptState::Attempting { attempt: 1 }
        );
    }

    #[test]
    fn test_retry_scheduled_begins_next_attempt() {
        let policy = RetryPolicy::default();
        let state = AttemptState::RetryScheduled {
            attempt: 1,
            delay: Duration::from_millis(10),
        };
        assert_eq!(
            policy.begin(state),
            AttemptState::Attempting { attempt: 2 }
        );
    }

    #[test]
    fn test_success_resolves_to_succeeded() {
        let policy = RetryPolicy::default();
        let state = policy.resolve(AttemptState::Attempting { attempt: 1 }, Ok(()));
        assert_eq!(state, AttemptState::Succeeded);
    }

    #[test]
    fn test_transient_failure_schedules_retry_with_linear_delay() {
        let policy = RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
        };
        let state = policy.resolve(AttemptState::Attempting { attempt: 2 }, Err(&http(503)));
        assert_eq!(
            state,
            AttemptState::RetryScheduled {
                attempt: 2,
                delay: Duration::from_millis(200),
            }
        );
    }

    #[test]
    fn test_transient_failure_on_last_attempt_exhausts() {
        let policy = RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
        };
        let state = policy.resolve(AttemptState::Attempting { attempt: 3 }, Err(&http(503)));
        match state {
            AttemptState::FailedPermanently { reason } => {
                assert!(reason.contains("retries exhausted after 3 attempts"), "{reason}");
            }
            other => panic!("expected permanent failure, got {other:?}"),
        }
    }

    #[test]
    fn test_permanent_failure_short_circuits() {
        let policy = RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
        };
        let state = policy.resolve(AttemptState::Attempting { attempt: 1 }, Err(&http(400)));
        match state {
            AttemptState::FailedPermanently { reason } => {
                assert!(reason.contains("HTTP 400"), "{reason}");
                assert!(!reason.contains("retries"), "{reason}");
            }
            other => panic!("expected permanent failure, got {other:?}"),
        }
    }

    #[test]
    fn test_full_machine_walk_for_always_503() {
        // Pending -> A1 -> scheduled -> A2 -> scheduled -> A3 -> exhausted
        let policy = RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
        };
        let mut state = AttemptState::Pending;
        let mut attempts = 0u32;
        loop {
            state = policy.begin(state);
            if let AttemptState::Attempting { .. } = state {
                attempts += 1;
                state = policy.resolve(state, Err(&http(503)));
            }
            match state {
                AttemptState::RetryScheduled { .. } => continue,
                AttemptState::FailedPermanently { .. } => break,
                ref other => panic!("unexpected state {other:?}"),
            }
        }
        assert_eq!(attempts, 3);
    }

    #[test]
    fn test_resolve_passes_through_terminal_states() {
        let policy = RetryPolicy::default();
        assert_eq!(
            policy.resolve(AttemptState::Succeeded, Err(&http(503))),
            AttemptState::Succeeded
        );
        assert_eq!(policy.begin(AttemptState::Succeeded), AttemptState::Succeeded);
    }
}
