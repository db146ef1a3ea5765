//! ISO image API implementation

use crate::api::common::{deserialize_null_string, Reference};
use crate::api::{ApiError, Client};
use serde::{Deserialize, Serialize};

pub struct IsosApi<'a> {
    client: &'a Client,
}

impl<'a> IsosApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET isos/{id}
    pub async fn get(&self, iso_id: &str) -> Result<Iso, ApiError> {
        self.client.get(&format!("isos/{}", iso_id)).await
    }

    /// POST isos
    pub async fn create(&self, request: &IsoCreateRequest) -> Result<Iso, ApiError> {
        self.client.post("isos", request).await
    }

    /// PUT isos/{id}
    pub async fn update(&self, iso_id: &str, request: &IsoUpdateRequest) -> Result<Iso, ApiError> {
        self.client.put(&format!("isos/{}", iso_id), request).await
    }

    /// DELETE isos/{id}
    pub async fn delete(&self, iso_id: &str) -> Result<(), ApiError> {
        self.client.delete(&format!("isos/{}", iso_id)).await
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Iso {
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_null_string")]
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_null_string")]
    pub description: String,
    #[serde(default, deserialize_with = "deserialize_null_string")]
    pub url: String,
    /// Set once the image has been downloaded into the datastore
    #[serde(default)]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud: Option<Reference>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IsoCreateRequest {
    pub category_id: i64,
    pub cloud_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IsoUpdateRequest {
    pub category_id: i64,
    pub description: String,
    pub name: String,
}
