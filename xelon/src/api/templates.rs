//! Template API implementation

use crate::api::common::{deserialize_null_string, deserialize_state_code, Reference};
use crate::api::{ApiError, Client};
use serde::{Deserialize, Serialize};

pub struct TemplatesApi<'a> {
    client: &'a Client,
}

impl<'a> TemplatesApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET templates/{id}
    pub async fn get(&self, template_id: &str) -> Result<Template, ApiError> {
        self.client.get(&format!("templates/{}", template_id)).await
    }

    /// POST templates, converting a stopped device into a template
    pub async fn create(&self, request: &TemplateCreateRequest) -> Result<Template, ApiError> {
        self.client.post("templates", request).await
    }

    /// PUT templates/{id}
    pub async fn update(
        &self,
        template_id: &str,
        request: &TemplateUpdateRequest,
    ) -> Result<Template, ApiError> {
        self.client
            .put(&format!("templates/{}", template_id), request)
            .await
    }

    /// DELETE templates/{id}
    pub async fn delete(&self, template_id: &str) -> Result<(), ApiError> {
        self.client
            .delete(&format!("templates/{}", template_id))
            .await
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_null_string")]
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_null_string")]
    pub description: String,
    #[serde(default, deserialize_with = "deserialize_null_string")]
    pub category: String,
    #[serde(rename = "type", default, deserialize_with = "deserialize_null_string")]
    pub type_: String,
    #[serde(default, deserialize_with = "deserialize_null_string")]
    pub cloud_id: String,
    /// 0 while the template is being created, 1 once ready
    #[serde(deserialize_with = "deserialize_state_code")]
    pub status: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant: Option<Reference>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateCreateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub device_id: String,
    pub name: String,
    pub send_email: bool,
    pub tenant_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TemplateUpdateRequest {
    pub description: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_helpers::create_test_client;
    use mockito::Server;

    #[tokio::test]
    async fn test_get_template() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/templates/tpl-1")
            .with_status(200)
            .with_body(
                r#"{"id": "tpl-1", "name": "base", "category": "linux", "type": "custom", "cloudId": "cloud-1", "status": 0}"#,
            )
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let template = client.templates().get("tpl-1").await.unwrap();

        assert_eq!(template.status, 0);
        assert_eq!(template.type_, "custom");
        assert_eq!(template.cloud_id, "cloud-1");
        assert_eq!(template.description, "");
    }

    #[tokio::test]
    async fn test_get_template_server_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/templates/tpl-2")
            .with_status(500)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let err = client.templates().get("tpl-2").await.unwrap_err();
        assert_eq!(err.status(), Some(500));
    }
}
