use crate::api::load_balancers::{
    LoadBalancer, LoadBalancerCreateRequest, LoadBalancerUpdateAssignedDevicesRequest,
    LoadBalancerUpdateRequest,
};
use crate::provider_data::XelonProviderData;
use crate::resources::{fail, missing_id, non_empty};
use crate::status::wait_load_balancer_ready;
use async_trait::async_trait;
use tfretry::resource::{
    CreateResourceRequest, CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ReadResourceRequest, ReadResourceResponse, UpdateResourceRequest, UpdateResourceResponse,
};
use tfretry::{Context, Diagnostic, Resource};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadBalancerModel {
    pub id: String,
    pub cloud_id: String,
    pub device_ids: Vec<String>,
    pub external_ip_address: String,
    pub internal_ip_address: String,
    pub name: String,
    pub network_id: String,
    pub tenant_id: String,
    /// layer4 or layer7
    pub type_: String,
}

impl LoadBalancerModel {
    fn apply(&mut self, load_balancer: &LoadBalancer) {
        self.id = load_balancer.id.clone();
        self.name = load_balancer.name.clone();
        self.external_ip_address = load_balancer.external_ip_address.clone();
        self.internal_ip_address = load_balancer.internal_ip_address.clone();
        if let Some(cloud) = &load_balancer.cloud {
            self.cloud_id = cloud.id.clone();
        }
        if let Some(tenant) = &load_balancer.tenant {
            self.tenant_id = tenant.id.clone();
        }
    }
}

pub struct LoadBalancerResource {
    data: XelonProviderData,
}

impl LoadBalancerResource {
    pub fn new(data: XelonProviderData) -> Self {
        Self { data }
    }

    async fn update_load_balancer(
        &self,
        prior: &LoadBalancerModel,
        mut plan: LoadBalancerModel,
    ) -> Result<LoadBalancerModel, Diagnostic> {
        let load_balancers = self.data.client.load_balancers();
        let load_balancer_id = prior.id.as_str();
        plan.id = prior.id.clone();

        if plan.name != prior.name {
            let request = LoadBalancerUpdateRequest {
                name: plan.name.clone(),
            };
            tracing::debug!(load_balancer_id, payload = ?request, "Updating load balancer");
            load_balancers
                .update(load_balancer_id, &request)
                .await
                .map_err(fail("Unable to update load balancer"))?;
        }

        let mut planned_devices = plan.device_ids.clone();
        let mut prior_devices = prior.device_ids.clone();
        planned_devices.sort();
        prior_devices.sort();
        if planned_devices != prior_devices {
            let request = LoadBalancerUpdateAssignedDevicesRequest {
                device_ids: plan.device_ids.clone(),
            };
            tracing::debug!(load_balancer_id, payload = ?request, "Updating load balancer assigned devices");
            load_balancers
                .update_assigned_devices(load_balancer_id, &request)
                .await
                .map_err(fail("Unable to update load balancer"))?;
        }

        let load_balancer = load_balancers
            .get(load_balancer_id)
            .await
            .map_err(fail("Unable to get load balancer"))?;
        plan.apply(&load_balancer);
        Ok(plan)
    }
}

#[async_trait]
impl Resource for LoadBalancerResource {
    type Model = LoadBalancerModel;

    fn type_name(&self) -> &str {
        "xelon_load_balancer"
    }

    async fn create(
        &self,
        ctx: Context,
        request: CreateResourceRequest<LoadBalancerModel>,
    ) -> CreateResourceResponse<LoadBalancerModel> {
        let mut plan = request.planned_state;
        let create_request = LoadBalancerCreateRequest {
            assigned_device_ids: plan.device_ids.clone(),
            cloud_id: plan.cloud_id.clone(),
            internal_network_id: plan.network_id.clone(),
            internal_ip_address: non_empty(&plan.internal_ip_address),
            name: plan.name.clone(),
            tenant_id: plan.tenant_id.clone(),
            type_: plan.type_.clone(),
        };

        tracing::debug!(payload = ?create_request, "Creating load balancer");
        let created = match self
            .data
            .client
            .load_balancers()
            .create(&create_request)
            .await
        {
            Ok(load_balancer) => load_balancer,
            Err(e) => {
                return CreateResourceResponse::error(fail("Unable to create load balancer")(e))
            }
        };
        plan.id = created.id.clone();

        match wait_load_balancer_ready(&ctx, &self.data, &created.id).await {
            Ok(load_balancer) => {
                plan.apply(&load_balancer);
                CreateResourceResponse::ok(plan)
            }
            Err(e) => CreateResourceResponse::partial(
                plan,
                fail("Unable to wait for load balancer to be ready")(e),
            ),
        }
    }

    async fn read(
        &self,
        _ctx: Context,
        request: ReadResourceRequest<LoadBalancerModel>,
    ) -> ReadResourceResponse<LoadBalancerModel> {
        let mut state = request.current_state;
        if state.id.is_empty() {
            return ReadResourceResponse::error(state, missing_id("load balancer"));
        }

        match self.data.client.load_balancers().get(&state.id).await {
            Ok(load_balancer) => {
                state.apply(&load_balancer);
                ReadResourceResponse::ok(Some(state))
            }
            Err(e) if e.is_not_found() => ReadResourceResponse::ok(None),
            Err(e) => ReadResourceResponse::error(state, fail("Unable to get load balancer")(e)),
        }
    }

    async fn update(
        &self,
        _ctx: Context,
        request: UpdateResourceRequest<LoadBalancerModel>,
    ) -> UpdateResourceResponse<LoadBalancerModel> {
        let prior = request.prior_state;
        if prior.id.is_empty() {
            return UpdateResourceResponse::error(prior, missing_id("load balancer"));
        }

        match self
            .update_load_balancer(&prior, request.planned_state)
            .await
        {
            Ok(state) => UpdateResourceResponse::ok(state),
            Err(diag) => UpdateResourceResponse::error(prior, diag),
        }
    }

    async fn delete(
        &self,
        _ctx: Context,
        request: DeleteResourceRequest<LoadBalancerModel>,
    ) -> DeleteResourceResponse {
        let load_balancer_id = request.prior_state.id;

        match self
            .data
            .client
            .load_balancers()
            .delete(&load_balancer_id)
            .await
        {
            Ok(()) => DeleteResourceResponse::ok(),
            Err(e) if e.is_not_found() => DeleteResourceResponse::ok(),
            Err(e) => DeleteResourceResponse::error(fail("Unable to delete load balancer")(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_helpers::create_test_client;
    use crate::config::WaitSettings;
    use mockito::{Matcher, Server};

    #[tokio::test]
    async fn reordered_devices_are_not_an_update() {
        let mut server = Server::new_async().await;
        let assign = server
            .mock("PUT", "/load-balancers/lb-1/devices")
            .expect(0)
            .create_async()
            .await;
        let _get = server
            .mock("GET", "/load-balancers/lb-1")
            .with_status(200)
            .with_body(r#"{"id": "lb-1", "name": "front", "state": 1}"#)
            .create_async()
            .await;

        let prior = LoadBalancerModel {
            id: "lb-1".into(),
            name: "front".into(),
            device_ids: vec!["dev-1".into(), "dev-2".into()],
            ..Default::default()
        };
        let plan = LoadBalancerModel {
            device_ids: vec!["dev-2".into(), "dev-1".into()],
            ..prior.clone()
        };

        let data = XelonProviderData::new(create_test_client(&server.url()), WaitSettings::default());
        let response = LoadBalancerResource::new(data)
            .update(
                Context::new(),
                UpdateResourceRequest {
                    prior_state: prior,
                    planned_state: plan,
                },
            )
            .await;

        assert!(response.diagnostics.is_empty());
        assign.assert_async().await;
    }

    #[tokio::test]
    async fn changed_devices_are_reassigned() {
        let mut server = Server::new_async().await;
        let assign = server
            .mock("PUT", "/load-balancers/lb-1/devices")
            .match_body(Matcher::JsonString(r#"{"deviceIds": ["dev-3"]}"#.to_string()))
            .with_status(200)
            .expect(1)
            .create_async()
            .await;
        let _get = server
            .mock("GET", "/load-balancers/lb-1")
            .with_status(200)
            .with_body(r#"{"id": "lb-1", "name": "front", "state": 1}"#)
            .create_async()
            .await;

        let prior = LoadBalancerModel {
            id: "lb-1".into(),
            name: "front".into(),
            device_ids: vec!["dev-1".into()],
            ..Default::default()
        };
        let plan = LoadBalancerModel {
            device_ids: vec!["dev-3".into()],
            ..prior.clone()
        };

        let data = XelonProviderData::new(create_test_client(&server.url()), WaitSettings::default());
        let response = LoadBalancerResource::new(data)
            .update(
                Context::new(),
                UpdateResourceRequest {
                    prior_state: prior,
                    planned_state: plan,
                },
            )
            .await;

        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        assert_eq!(response.new_state.unwrap().device_ids, vec!["dev-3"]);
        assign.assert_async().await;
    }

    #[tokio::test]
    async fn update_without_id_makes_no_calls() {
        let mut server = Server::new_async().await;
        let rename = server
            .mock("PUT", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let prior = LoadBalancerModel {
            name: "front".into(),
            ..Default::default()
        };
        let plan = LoadBalancerModel {
            name: "front-2".into(),
            ..Default::default()
        };

        let data = XelonProviderData::new(create_test_client(&server.url()), WaitSettings::default());
        let response = LoadBalancerResource::new(data)
            .update(
                Context::new(),
                UpdateResourceRequest {
                    prior_state: prior.clone(),
                    planned_state: plan,
                },
            )
            .await;

        assert_eq!(response.new_state, Some(prior));
        assert_eq!(response.diagnostics[0].summary, "Missing load balancer id");
        rename.assert_async().await;
    }
}
