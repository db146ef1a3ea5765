use super::{classify, run_wait, StatusWaitError, UnknownStateCode};
use crate::api::load_balancers::LoadBalancer;
use crate::api::{ApiError, Client};
use crate::provider_data::XelonProviderData;
use std::fmt;
use tfretry::{Context, Refresh};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadBalancerState {
    Provisioning,
    Ready,
}

impl TryFrom<i64> for LoadBalancerState {
    type Error = UnknownStateCode;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            0 | 2 => Ok(Self::Provisioning),
            1 => Ok(Self::Ready),
            code => Err(UnknownStateCode {
                kind: "load balancer",
                code,
            }),
        }
    }
}

impl fmt::Display for LoadBalancerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Provisioning => "provisioning",
            Self::Ready => "ready",
        })
    }
}

pub async fn load_balancer_state(
    client: &Client,
    load_balancer_id: &str,
) -> Result<Refresh<LoadBalancer, LoadBalancerState>, ApiError> {
    let load_balancer = client.load_balancers().get(load_balancer_id).await?;
    Ok(classify(load_balancer, |lb| {
        LoadBalancerState::try_from(lb.state)
    }))
}

pub async fn wait_load_balancer_ready(
    ctx: &Context,
    data: &XelonProviderData,
    load_balancer_id: &str,
) -> Result<LoadBalancer, StatusWaitError> {
    let conf = data
        .wait
        .conf([LoadBalancerState::Provisioning], [LoadBalancerState::Ready])
        .mask_errors_as(
            LoadBalancerState::Provisioning,
            ApiError::is_transient_provisioning,
        );

    run_wait(
        ctx,
        conf,
        "load balancer",
        load_balancer_id,
        "become ready",
        || load_balancer_state(&data.client, load_balancer_id),
    )
    .await
}
