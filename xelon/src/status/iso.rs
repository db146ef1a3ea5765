use super::{run_wait, StatusWaitError};
use crate::api::isos::Iso;
use crate::api::{ApiError, Client};
use crate::provider_data::XelonProviderData;
use std::fmt;
use tfretry::{Context, Refresh};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsoState {
    Active,
    Inactive,
}

impl fmt::Display for IsoState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        })
    }
}

pub async fn iso_state(client: &Client, iso_id: &str) -> Result<Refresh<Iso, IsoState>, ApiError> {
    let iso = client.isos().get(iso_id).await?;
    let state = if iso.active {
        IsoState::Active
    } else {
        IsoState::Inactive
    };
    Ok(Refresh::state(iso, state))
}

/// The image is downloaded asynchronously after create
pub async fn wait_iso_active(
    ctx: &Context,
    data: &XelonProviderData,
    iso_id: &str,
) -> Result<Iso, StatusWaitError> {
    let conf = data
        .wait
        .conf([IsoState::Inactive], [IsoState::Active])
        .mask_errors_as(IsoState::Inactive, ApiError::is_transient_provisioning);

    run_wait(ctx, conf, "ISO", iso_id, "become active", || {
        iso_state(&data.client, iso_id)
    })
    .await
}
