//! Device (virtual machine) API implementation

use crate::api::common::{deserialize_null_string, deserialize_state_code, Reference};
use crate::api::{ApiError, Client};
use serde::{Deserialize, Serialize};

/// Device API providing virtual machine operations
pub struct DevicesApi<'a> {
    client: &'a Client,
}

impl<'a> DevicesApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET devices/{id}
    pub async fn get(&self, device_id: &str) -> Result<Device, ApiError> {
        self.client.get(&format!("devices/{}", device_id)).await
    }

    /// POST devices
    pub async fn create(&self, request: &DeviceCreateRequest) -> Result<Device, ApiError> {
        self.client.post("devices", request).await
    }

    /// PATCH devices/{id}
    pub async fn update(
        &self,
        device_id: &str,
        request: &DeviceUpdateRequest,
    ) -> Result<Device, ApiError> {
        self.client
            .patch(&format!("devices/{}", device_id), request)
            .await
    }

    /// POST devices/{id}/start
    pub async fn start(&self, device_id: &str) -> Result<(), ApiError> {
        self.client
            .post_empty::<serde_json::Value>(&format!("devices/{}/start", device_id))
            .await
            .map(|_| ())
    }

    /// POST devices/{id}/stop
    pub async fn stop(&self, device_id: &str) -> Result<(), ApiError> {
        self.client
            .post_empty::<serde_json::Value>(&format!("devices/{}/stop", device_id))
            .await
            .map(|_| ())
    }

    /// PUT devices/{id}/hardware
    pub async fn update_hardware(
        &self,
        device_id: &str,
        request: &DeviceUpdateHardwareRequest,
    ) -> Result<(), ApiError> {
        self.client
            .put::<serde_json::Value, _>(&format!("devices/{}/hardware", device_id), request)
            .await
            .map(|_| ())
    }

    /// PUT devices/{id}/disk
    pub async fn update_disk(
        &self,
        device_id: &str,
        request: &DeviceUpdateDiskRequest,
    ) -> Result<(), ApiError> {
        self.client
            .put::<serde_json::Value, _>(&format!("devices/{}/disk", device_id), request)
            .await
            .map(|_| ())
    }

    /// DELETE devices/{id}
    pub async fn delete(&self, device_id: &str) -> Result<(), ApiError> {
        self.client.delete(&format!("devices/{}", device_id)).await
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_null_string")]
    pub display_name: String,
    #[serde(default, deserialize_with = "deserialize_null_string")]
    pub host_name: String,
    #[serde(default)]
    pub cpu_cores: u32,
    /// Memory in GB
    #[serde(default)]
    pub ram: u32,
    #[serde(default)]
    pub powered_on: bool,
    /// 0 provisioning, 1 ready, 2 ready for basic use
    #[serde(deserialize_with = "deserialize_state_code")]
    pub state: i64,
    #[serde(default)]
    pub monitoring_enabled: bool,
    #[serde(default)]
    pub storages: Vec<DeviceStorage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<Reference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant: Option<Reference>,
}

impl Device {
    /// Storage attached at a SCSI unit; 0 is the main disk, 1 the swap disk
    pub fn storage_at_unit(&self, unit: u32) -> Option<&DeviceStorage> {
        self.storages.iter().find(|s| s.unit_number == unit)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceStorage {
    pub id: String,
    pub unit_number: u32,
    /// Size in GB
    pub size: u64,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceCreateNetwork {
    pub network_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    pub connect_on_power_on: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceCreateRequest {
    pub cpu_cores: u32,
    pub disk_size: u64,
    pub display_name: String,
    pub host_name: String,
    pub networks: Vec<DeviceCreateNetwork>,
    pub password: String,
    pub password_confirmation: String,
    pub ram: u32,
    pub swap_disk_size: u64,
    pub template_id: String,
    pub tenant_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceUpdateRequest {
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceUpdateHardwareRequest {
    pub cpu_cores: u32,
    pub ram: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceUpdateDiskRequest {
    pub disk_id: String,
    pub size: u64,
}

#[cfg(test)]
#[path = "./devices_test.rs"]
mod devices_test;
