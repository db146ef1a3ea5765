//! Load balancer API implementation

use crate::api::common::{deserialize_null_string, deserialize_state_code, Reference};
use crate::api::{ApiError, Client};
use serde::{Deserialize, Serialize};

pub struct LoadBalancersApi<'a> {
    client: &'a Client,
}

impl<'a> LoadBalancersApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET load-balancers/{id}
    pub async fn get(&self, load_balancer_id: &str) -> Result<LoadBalancer, ApiError> {
        self.client
            .get(&format!("load-balancers/{}", load_balancer_id))
            .await
    }

    /// POST load-balancers
    pub async fn create(
        &self,
        request: &LoadBalancerCreateRequest,
    ) -> Result<LoadBalancer, ApiError> {
        self.client.post("load-balancers", request).await
    }

    /// PUT load-balancers/{id}
    pub async fn update(
        &self,
        load_balancer_id: &str,
        request: &LoadBalancerUpdateRequest,
    ) -> Result<LoadBalancer, ApiError> {
        self.client
            .put(&format!("load-balancers/{}", load_balancer_id), request)
            .await
    }

    /// PUT load-balancers/{id}/devices
    pub async fn update_assigned_devices(
        &self,
        load_balancer_id: &str,
        request: &LoadBalancerUpdateAssignedDevicesRequest,
    ) -> Result<(), ApiError> {
        self.client
            .put::<serde_json::Value, _>(
                &format!("load-balancers/{}/devices", load_balancer_id),
                request,
            )
            .await
            .map(|_| ())
    }

    /// DELETE load-balancers/{id}
    pub async fn delete(&self, load_balancer_id: &str) -> Result<(), ApiError> {
        self.client
            .delete(&format!("load-balancers/{}", load_balancer_id))
            .await
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancer {
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_null_string")]
    pub name: String,
    #[serde(deserialize_with = "deserialize_state_code")]
    pub state: i64,
    #[serde(default, deserialize_with = "deserialize_null_string")]
    pub health_status: String,
    #[serde(rename = "type", default, deserialize_with = "deserialize_null_string")]
    pub type_: String,
    #[serde(default, deserialize_with = "deserialize_null_string")]
    pub external_ip_address: String,
    #[serde(default, deserialize_with = "deserialize_null_string")]
    pub internal_ip_address: String,
    #[serde(default)]
    pub assigned_devices: Vec<Reference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud: Option<Reference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant: Option<Reference>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancerCreateRequest {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub assigned_device_ids: Vec<String>,
    pub cloud_id: String,
    pub internal_network_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_ip_address: Option<String>,
    pub name: String,
    pub tenant_id: String,
    #[serde(rename = "type")]
    pub type_: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoadBalancerUpdateRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancerUpdateAssignedDevicesRequest {
    pub device_ids: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_helpers::create_test_client;
    use mockito::{Matcher, Server};

    #[tokio::test]
    async fn test_get_load_balancer() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/load-balancers/lb-1")
            .with_status(200)
            .with_body(
                r#"{"data": {
                "id": "lb-1",
                "name": "front",
                "state": "1",
                "type": "layer4",
                "assignedDevices": [{"id": "dev-1"}, {"id": "dev-2"}]
            }}"#,
            )
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let lb = client.load_balancers().get("lb-1").await.unwrap();

        assert_eq!(lb.state, 1);
        assert_eq!(lb.type_, "layer4");
        assert_eq!(lb.assigned_devices.len(), 2);
        assert!(lb.tenant.is_none());
    }

    #[tokio::test]
    async fn test_update_assigned_devices() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("PUT", "/load-balancers/lb-1/devices")
            .match_body(Matcher::JsonString(
                r#"{"deviceIds": ["dev-1", "dev-3"]}"#.to_string(),
            ))
            .with_status(200)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        client
            .load_balancers()
            .update_assigned_devices(
                "lb-1",
                &LoadBalancerUpdateAssignedDevicesRequest {
                    device_ids: vec!["dev-1".into(), "dev-3".into()],
                },
            )
            .await
            .unwrap();

        m.assert_async().await;
    }
}
