//! Persistent storage API implementation

use crate::api::common::{deserialize_null_string, Reference};
use crate::api::{ApiError, Client};
use serde::{Deserialize, Serialize};

/// Storage type the API expects for persistent (detachable) volumes
pub const PERSISTENT_STORAGE_TYPE: i64 = 2;

pub struct PersistentStoragesApi<'a> {
    client: &'a Client,
}

impl<'a> PersistentStoragesApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET persistent-storages/{id}
    pub async fn get(&self, storage_id: &str) -> Result<PersistentStorage, ApiError> {
        self.client
            .get(&format!("persistent-storages/{}", storage_id))
            .await
    }

    /// POST persistent-storages
    pub async fn create(
        &self,
        request: &PersistentStorageCreateRequest,
    ) -> Result<PersistentStorage, ApiError> {
        self.client.post("persistent-storages", request).await
    }

    /// POST persistent-storages/{id}/attach
    pub async fn attach_to_device(
        &self,
        storage_id: &str,
        device_id: &str,
    ) -> Result<(), ApiError> {
        let request = PersistentStorageDeviceRequest {
            device_id: device_id.to_string(),
        };
        self.client
            .post::<serde_json::Value, _>(
                &format!("persistent-storages/{}/attach", storage_id),
                &request,
            )
            .await
            .map(|_| ())
    }

    /// POST persistent-storages/{id}/detach
    pub async fn detach_from_device(
        &self,
        storage_id: &str,
        device_id: &str,
    ) -> Result<(), ApiError> {
        let request = PersistentStorageDeviceRequest {
            device_id: device_id.to_string(),
        };
        self.client
            .post::<serde_json::Value, _>(
                &format!("persistent-storages/{}/detach", storage_id),
                &request,
            )
            .await
            .map(|_| ())
    }

    /// POST persistent-storages/{id}/extend
    pub async fn extend(&self, storage_id: &str, size: u64) -> Result<(), ApiError> {
        self.client
            .post::<serde_json::Value, _>(
                &format!("persistent-storages/{}/extend", storage_id),
                &PersistentStorageExtendRequest { size },
            )
            .await
            .map(|_| ())
    }

    /// DELETE persistent-storages/{id}
    pub async fn delete(&self, storage_id: &str) -> Result<(), ApiError> {
        self.client
            .delete(&format!("persistent-storages/{}", storage_id))
            .await
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistentStorage {
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_null_string")]
    pub name: String,
    /// Empty until the backing volume exists
    #[serde(default, deserialize_with = "deserialize_null_string")]
    pub uuid: String,
    #[serde(default)]
    pub formatted: bool,
    /// Size in GB
    #[serde(default)]
    pub capacity: u64,
    #[serde(default)]
    pub attached_devices: Vec<Reference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud: Option<Reference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant: Option<Reference>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistentStorageCreateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    pub name: String,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(rename = "type")]
    pub type_: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct PersistentStorageDeviceRequest {
    device_id: String,
}

#[derive(Debug, Clone, Serialize)]
struct PersistentStorageExtendRequest {
    size: u64,
}
