//! Persistent storage goes through two phases after create: the volume is
//! formatted first, then gets its backing uuid once it is fully provisioned.

use super::{run_wait, StatusWaitError};
use crate::api::persistent_storages::PersistentStorage;
use crate::api::{ApiError, Client};
use crate::provider_data::XelonProviderData;
use std::fmt;
use tfretry::{Context, Refresh};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageFormatState {
    Formatted,
    Unformatted,
}

impl fmt::Display for StorageFormatState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Formatted => "formatted",
            Self::Unformatted => "unformatted",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageReadyState {
    Provisioning,
    Ready,
}

impl fmt::Display for StorageReadyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Provisioning => "provisioning",
            Self::Ready => "ready",
        })
    }
}

pub async fn storage_format_state(
    client: &Client,
    storage_id: &str,
) -> Result<Refresh<PersistentStorage, StorageFormatState>, ApiError> {
    let storage = client.persistent_storages().get(storage_id).await?;
    let state = if storage.formatted {
        StorageFormatState::Formatted
    } else {
        StorageFormatState::Unformatted
    };
    Ok(Refresh::state(storage, state))
}

pub async fn storage_ready_state(
    client: &Client,
    storage_id: &str,
) -> Result<Refresh<PersistentStorage, StorageReadyState>, ApiError> {
    let storage = client.persistent_storages().get(storage_id).await?;
    let state = if storage.uuid.is_empty() {
        StorageReadyState::Provisioning
    } else {
        StorageReadyState::Ready
    };
    Ok(Refresh::state(storage, state))
}

pub async fn wait_persistent_storage_formatted(
    ctx: &Context,
    data: &XelonProviderData,
    storage_id: &str,
) -> Result<PersistentStorage, StatusWaitError> {
    let conf = data
        .wait
        .conf([StorageFormatState::Unformatted], [StorageFormatState::Formatted])
        .mask_errors_as(
            StorageFormatState::Unformatted,
            ApiError::is_transient_provisioning,
        );

    run_wait(
        ctx,
        conf,
        "persistent storage",
        storage_id,
        "become formatted",
        || storage_format_state(&data.client, storage_id),
    )
    .await
}

pub async fn wait_persistent_storage_ready(
    ctx: &Context,
    data: &XelonProviderData,
    storage_id: &str,
) -> Result<PersistentStorage, StatusWaitError> {
    let conf = data
        .wait
        .conf([StorageReadyState::Provisioning], [StorageReadyState::Ready])
        .mask_errors_as(
            StorageReadyState::Provisioning,
            ApiError::is_transient_provisioning,
        );

    run_wait(
        ctx,
        conf,
        "persistent storage",
        storage_id,
        "become ready",
        || storage_ready_state(&data.client, storage_id),
    )
    .await
}
