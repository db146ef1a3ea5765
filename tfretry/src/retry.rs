//! State-change waiting for eventually consistent remote resources
//!
//! Remote APIs that only expose point-in-time status reads are driven to a
//! desired condition by polling. A [`StateChangeConf`] describes which state
//! labels mean "keep polling" (pending) and which mean "done" (target). The
//! caller supplies a refresh function performing exactly one status check.
//!
//! Outcomes of a single check:
//! - state in target: stop, success
//! - state in pending: sleep and poll again until the timeout elapses
//! - any other state, or an unclassifiable backend value: stop, fatal
//! - refresh error: stop and return it unchanged, unless the configured
//!   transient-error filter accepts it, in which case it counts as pending
//!
//! The waiter holds no state between calls. One configuration may back any
//! number of concurrent waits.

use crate::context::Context;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Maximum time to wait for a target state
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Spacing between two status checks
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Delay before the first status check
pub const DEFAULT_DELAY: Duration = Duration::from_secs(3);

/// Result of one status check
#[derive(Debug, Clone, PartialEq)]
pub enum Refresh<T, S> {
    /// The backend value mapped onto a known label
    Classified { value: T, state: S },
    /// The backend returned something the label set cannot express
    Unclassified { detail: String },
}

impl<T, S> Refresh<T, S> {
    pub fn state(value: T, state: S) -> Self {
        Refresh::Classified { value, state }
    }

    pub fn unclassified(detail: impl Into<String>) -> Self {
        Refresh::Unclassified {
            detail: detail.into(),
        }
    }
}

/// Successful end of a wait
#[derive(Debug, Clone)]
pub struct StateChange<T, S> {
    /// Payload returned by the final status check
    pub value: T,
    /// Target state that was reached
    pub state: S,
    /// Number of status checks performed
    pub attempts: u32,
    pub elapsed: Duration,
}

#[derive(Debug, thiserror::Error)]
pub enum WaitError<E> {
    #[error("timeout after {timeout:?} waiting for {resource_id} to {condition} (last state: {last_state})")]
    Timeout {
        resource_id: String,
        condition: String,
        last_state: String,
        timeout: Duration,
    },

    #[error("unexpected state '{state}' while waiting for {resource_id} to {condition}, wanted target state: {expected}")]
    UnexpectedState {
        resource_id: String,
        condition: String,
        state: String,
        expected: String,
    },

    #[error("cancelled while waiting for {resource_id} to {condition}")]
    Cancelled {
        resource_id: String,
        condition: String,
    },

    #[error("invalid wait configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Refresh(E),
}

impl<E> WaitError<E> {
    pub fn is_timeout(&self) -> bool {
        matches!(self, WaitError::Timeout { .. })
    }

    pub fn is_unexpected_state(&self) -> bool {
        matches!(self, WaitError::UnexpectedState { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, WaitError::Cancelled { .. })
    }

    /// The refresh error that aborted the wait, if any
    pub fn refresh_error(&self) -> Option<&E> {
        match self {
            WaitError::Refresh(err) => Some(err),
            _ => None,
        }
    }
}

type ErrorFilter<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;

/// Polling configuration for one wait
pub struct StateChangeConf<S, E> {
    pending: Vec<S>,
    target: Vec<S>,
    timeout: Duration,
    poll_interval: Duration,
    delay: Duration,
    transient: Option<ErrorFilter<E>>,
    masked_state: Option<S>,
}

impl<S: Clone, E> Clone for StateChangeConf<S, E> {
    fn clone(&self) -> Self {
        Self {
            pending: self.pending.clone(),
            target: self.target.clone(),
            timeout: self.timeout,
            poll_interval: self.poll_interval,
            delay: self.delay,
            transient: self.transient.clone(),
            masked_state: self.masked_state.clone(),
        }
    }
}

impl<S: fmt::Debug, E> fmt::Debug for StateChangeConf<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateChangeConf")
            .field("pending", &self.pending)
            .field("target", &self.target)
            .field("timeout", &self.timeout)
            .field("poll_interval", &self.poll_interval)
            .field("delay", &self.delay)
            .field("masks_errors", &self.transient.is_some())
            .finish()
    }
}

impl<S, E> StateChangeConf<S, E>
where
    S: PartialEq + fmt::Display,
{
    pub fn new(
        pending: impl IntoIterator<Item = S>,
        target: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            pending: pending.into_iter().collect(),
            target: target.into_iter().collect(),
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            delay: DEFAULT_DELAY,
            transient: None,
            masked_state: None,
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Treat refresh errors accepted by `filter` as "still pending"
    pub fn mask_errors(mut self, filter: impl Fn(&E) -> bool + Send + Sync + 'static) -> Self {
        self.transient = Some(Arc::new(filter));
        self
    }

    /// Like [`mask_errors`](Self::mask_errors), reporting masked polls as `state`
    /// so a later timeout names the pending label the error stood in for
    pub fn mask_errors_as(
        mut self,
        state: S,
        filter: impl Fn(&E) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.masked_state = Some(state);
        self.mask_errors(filter)
    }

    pub fn pending(&self) -> &[S] {
        &self.pending
    }

    pub fn target(&self) -> &[S] {
        &self.target
    }

    fn validate(&self, resource_id: &str) -> Result<(), String> {
        if resource_id.trim().is_empty() {
            return Err("resource id must not be empty".to_string());
        }
        if self.target.is_empty() {
            return Err("at least one target state is required".to_string());
        }
        if let Some(state) = self.masked_state.as_ref().filter(|s| !self.pending.contains(s)) {
            return Err(format!("masked state '{}' is not a pending state", state));
        }
        if let Some(state) = self.pending.iter().find(|s| self.target.contains(s)) {
            return Err(format!("state '{}' is both pending and target", state));
        }
        if self.timeout <= self.poll_interval {
            return Err(format!(
                "timeout ({:?}) must be greater than poll interval ({:?})",
                self.timeout, self.poll_interval
            ));
        }
        Ok(())
    }

    fn expected(&self) -> String {
        self.target
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Poll `refresh` until the resource reaches a target state.
    ///
    /// `condition` names what is awaited ("become ready") and ends up in
    /// every error so the caller can report which wait failed.
    pub async fn wait_for_state<T, F, Fut>(
        &self,
        ctx: &Context,
        resource_id: &str,
        condition: &str,
        mut refresh: F,
    ) -> Result<StateChange<T, S>, WaitError<E>>
    where
        E: fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Refresh<T, S>, E>>,
    {
        self.validate(resource_id).map_err(WaitError::InvalidConfig)?;

        let cancelled = || WaitError::Cancelled {
            resource_id: resource_id.to_string(),
            condition: condition.to_string(),
        };

        let started = Instant::now();
        let deadline = started + self.timeout;
        let mut next_wait = self.delay;
        let mut attempts = 0u32;
        let mut last_state = String::from("none");

        tracing::debug!(
            resource_id,
            pending = %self.pending.iter().map(|s| s.to_string()).collect::<Vec<_>>().join(", "),
            target = %self.expected(),
            "Waiting for {} to {}",
            resource_id,
            condition
        );

        loop {
            let nap = next_wait.min(deadline.saturating_duration_since(Instant::now()));
            if !nap.is_zero() {
                tokio::select! {
                    _ = ctx.cancelled() => return Err(cancelled()),
                    _ = tokio::time::sleep(nap) => {}
                }
            }
            if ctx.is_cancelled() {
                return Err(cancelled());
            }
            next_wait = self.poll_interval;
            attempts += 1;

            let outcome = tokio::select! {
                _ = ctx.cancelled() => return Err(cancelled()),
                outcome = refresh() => outcome,
            };

            match outcome {
                Ok(Refresh::Classified { value, state }) => {
                    if self.target.contains(&state) {
                        tracing::debug!(
                            resource_id,
                            state = %state,
                            attempts,
                            "{} reached target state",
                            resource_id
                        );
                        return Ok(StateChange {
                            value,
                            state,
                            attempts,
                            elapsed: started.elapsed(),
                        });
                    }
                    if !self.pending.contains(&state) {
                        return Err(WaitError::UnexpectedState {
                            resource_id: resource_id.to_string(),
                            condition: condition.to_string(),
                            state: state.to_string(),
                            expected: self.expected(),
                        });
                    }
                    tracing::trace!(resource_id, state = %state, attempts, "still pending");
                    last_state = state.to_string();
                }
                Ok(Refresh::Unclassified { detail }) => {
                    return Err(WaitError::UnexpectedState {
                        resource_id: resource_id.to_string(),
                        condition: condition.to_string(),
                        state: detail,
                        expected: self.expected(),
                    });
                }
                Err(err) if self.transient.as_ref().is_some_and(|masks| masks(&err)) => {
                    tracing::warn!(
                        resource_id,
                        attempts,
                        "Transient error while refreshing state, treating as pending: {}",
                        err
                    );
                    if let Some(state) = &self.masked_state {
                        last_state = state.to_string();
                    }
                }
                Err(err) => return Err(WaitError::Refresh(err)),
            }

            if Instant::now() >= deadline {
                return Err(WaitError::Timeout {
                    resource_id: resource_id.to_string(),
                    condition: condition.to_string(),
                    last_state,
                    timeout: self.timeout,
                });
            }
        }
    }
}
