use super::{classify, run_wait, StatusWaitError, UnknownStateCode};
use crate::api::firewalls::Firewall;
use crate::api::{ApiError, Client};
use crate::provider_data::XelonProviderData;
use std::fmt;
use tfretry::{Context, Refresh};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirewallState {
    Provisioning,
    Ready,
}

impl TryFrom<i64> for FirewallState {
    type Error = UnknownStateCode;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            0 | 2 => Ok(Self::Provisioning),
            1 => Ok(Self::Ready),
            code => Err(UnknownStateCode {
                kind: "firewall",
                code,
            }),
        }
    }
}

impl fmt::Display for FirewallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Provisioning => "provisioning",
            Self::Ready => "ready",
        })
    }
}

pub async fn firewall_state(
    client: &Client,
    firewall_id: &str,
) -> Result<Refresh<Firewall, FirewallState>, ApiError> {
    let firewall = client.firewalls().get(firewall_id).await?;
    Ok(classify(firewall, |fw| FirewallState::try_from(fw.state)))
}

pub async fn wait_firewall_ready(
    ctx: &Context,
    data: &XelonProviderData,
    firewall_id: &str,
) -> Result<Firewall, StatusWaitError> {
    let conf = data
        .wait
        .conf([FirewallState::Provisioning], [FirewallState::Ready])
        .mask_errors_as(FirewallState::Provisioning, ApiError::is_transient_provisioning);

    run_wait(ctx, conf, "firewall", firewall_id, "become ready", || {
        firewall_state(&data.client, firewall_id)
    })
    .await
}
