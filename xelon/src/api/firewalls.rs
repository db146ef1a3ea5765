//! Firewall API implementation

use crate::api::common::{deserialize_null_string, deserialize_state_code, Reference};
use crate::api::{ApiError, Client};
use serde::{Deserialize, Serialize};

pub struct FirewallsApi<'a> {
    client: &'a Client,
}

impl<'a> FirewallsApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET firewalls/{id}
    pub async fn get(&self, firewall_id: &str) -> Result<Firewall, ApiError> {
        self.client.get(&format!("firewalls/{}", firewall_id)).await
    }

    /// POST firewalls
    pub async fn create(&self, request: &FirewallCreateRequest) -> Result<Firewall, ApiError> {
        self.client.post("firewalls", request).await
    }

    /// PUT firewalls/{id}
    pub async fn update(
        &self,
        firewall_id: &str,
        request: &FirewallUpdateRequest,
    ) -> Result<Firewall, ApiError> {
        self.client
            .put(&format!("firewalls/{}", firewall_id), request)
            .await
    }

    /// DELETE firewalls/{id}
    pub async fn delete(&self, firewall_id: &str) -> Result<(), ApiError> {
        self.client
            .delete(&format!("firewalls/{}", firewall_id))
            .await
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Firewall {
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_null_string")]
    pub name: String,
    /// 0 and 2 while provisioning, 1 once ready
    #[serde(deserialize_with = "deserialize_state_code")]
    pub state: i64,
    #[serde(default, deserialize_with = "deserialize_null_string")]
    pub health_status: String,
    #[serde(default, deserialize_with = "deserialize_null_string")]
    pub external_ip_address: String,
    #[serde(default, deserialize_with = "deserialize_null_string")]
    pub internal_ip_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud: Option<Reference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant: Option<Reference>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FirewallCreateRequest {
    pub cloud_id: String,
    pub internal_network_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_ip_address: Option<String>,
    pub name: String,
    pub tenant_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FirewallUpdateRequest {
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_helpers::create_test_client;
    use mockito::{Matcher, Server};

    #[tokio::test]
    async fn test_get_firewall() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/firewalls/fw-1")
            .with_status(200)
            .with_body(
                r#"{
                "id": "fw-1",
                "name": "edge",
                "state": 2,
                "externalIpAddress": "203.0.113.10",
                "internalIpAddress": "10.0.0.1",
                "cloud": {"id": "cloud-1"},
                "tenant": {"id": "tenant-1", "name": "acme"}
            }"#,
            )
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let firewall = client.firewalls().get("fw-1").await.unwrap();

        assert_eq!(firewall.name, "edge");
        assert_eq!(firewall.state, 2);
        assert_eq!(firewall.external_ip_address, "203.0.113.10");
        assert_eq!(firewall.health_status, "");
        assert_eq!(firewall.cloud.unwrap().id, "cloud-1");
    }

    #[tokio::test]
    async fn test_create_firewall_omits_unset_ip() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/firewalls")
            .match_body(Matcher::JsonString(
                r#"{"cloudId": "cloud-1", "internalNetworkId": "net-1", "name": "edge", "tenantId": "tenant-1"}"#
                    .to_string(),
            ))
            .with_status(201)
            .with_body(r#"{"id": "fw-1", "name": "edge", "state": 0}"#)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let request = FirewallCreateRequest {
            cloud_id: "cloud-1".into(),
            internal_network_id: "net-1".into(),
            internal_ip_address: None,
            name: "edge".into(),
            tenant_id: "tenant-1".into(),
        };
        let firewall = client.firewalls().create(&request).await.unwrap();

        assert_eq!(firewall.id, "fw-1");
        m.assert_async().await;
    }
}
