//! Status accessors and state waits for Xelon resources
//!
//! Every resource kind maps its backend representation onto a small closed
//! set of labels. A status accessor performs exactly one `GET` and
//! classifies the result; the `wait_*` functions drive an accessor through
//! [`tfretry::StateChangeConf`] with the provider's [`WaitSettings`].
//!
//! Some waits run right after a create call, when the Xelon backend is known
//! to answer 500/503 for objects that are still being provisioned. Those
//! waits mask such errors as their pending label; everything else surfaces.
//!
//! [`WaitSettings`]: crate::config::WaitSettings

pub mod device;
pub mod firewall;
pub mod iso;
pub mod load_balancer;
pub mod persistent_storage;
pub mod template;

pub use device::{
    wait_device_powered_off, wait_device_powered_on, wait_device_ready, DevicePowerState,
    DeviceState,
};
pub use firewall::{wait_firewall_ready, FirewallState};
pub use iso::{wait_iso_active, IsoState};
pub use load_balancer::{wait_load_balancer_ready, LoadBalancerState};
pub use persistent_storage::{
    wait_persistent_storage_formatted, wait_persistent_storage_ready, StorageFormatState,
    StorageReadyState,
};
pub use template::{wait_template_ready, TemplateState};

use crate::api::ApiError;
use std::fmt;
use std::future::Future;
use tfretry::{Context, Refresh, StateChangeConf, WaitError};

/// A wait for one resource failed
#[derive(Debug, thiserror::Error)]
#[error("failed to wait for {kind} ({id}) to {condition}: {source}")]
pub struct StatusWaitError {
    pub kind: &'static str,
    pub id: String,
    pub condition: &'static str,
    pub source: WaitError<ApiError>,
}

impl StatusWaitError {
    pub fn is_timeout(&self) -> bool {
        self.source.is_timeout()
    }

    pub fn api_error(&self) -> Option<&ApiError> {
        self.source.refresh_error()
    }
}

/// Backend integer code outside the known table
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} state code {code}")]
pub struct UnknownStateCode {
    pub kind: &'static str,
    pub code: i64,
}

/// Classify with a fallible mapping, turning mapping failures into an unclassified refresh
pub(crate) fn classify<T, S, E: fmt::Display>(
    value: T,
    label: impl FnOnce(&T) -> Result<S, E>,
) -> Refresh<T, S> {
    match label(&value) {
        Ok(state) => Refresh::state(value, state),
        Err(e) => Refresh::unclassified(e.to_string()),
    }
}

pub(crate) async fn run_wait<T, S, F, Fut>(
    ctx: &Context,
    conf: StateChangeConf<S, ApiError>,
    kind: &'static str,
    id: &str,
    condition: &'static str,
    refresh: F,
) -> Result<T, StatusWaitError>
where
    S: PartialEq + fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Refresh<T, S>, ApiError>>,
{
    tracing::info!(kind, id, "Waiting for {} ({}) to {}", kind, id, condition);

    match conf.wait_for_state(ctx, id, condition, refresh).await {
        Ok(change) => {
            tracing::info!(
                kind,
                id,
                attempts = change.attempts,
                elapsed = ?change.elapsed,
                "{} ({}) is {}",
                kind,
                id,
                change.state
            );
            Ok(change.value)
        }
        Err(source) => Err(StatusWaitError {
            kind,
            id: id.to_string(),
            condition,
            source,
        }),
    }
}
