use crate::api::firewalls::{Firewall, FirewallCreateRequest, FirewallUpdateRequest};
use crate::provider_data::XelonProviderData;
use crate::resources::{fail, missing_id, non_empty};
use crate::status::wait_firewall_ready;
use async_trait::async_trait;
use tfretry::resource::{
    CreateResourceRequest, CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ReadResourceRequest, ReadResourceResponse, UpdateResourceRequest, UpdateResourceResponse,
};
use tfretry::{Context, Diagnostic, Resource};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FirewallModel {
    pub id: String,
    pub cloud_id: String,
    pub external_ip_address: String,
    pub internal_ip_address: String,
    pub name: String,
    pub network_id: String,
    pub tenant_id: String,
}

impl FirewallModel {
    fn apply(&mut self, firewall: &Firewall) {
        self.id = firewall.id.clone();
        self.name = firewall.name.clone();
        self.external_ip_address = firewall.external_ip_address.clone();
        self.internal_ip_address = firewall.internal_ip_address.clone();
        if let Some(cloud) = &firewall.cloud {
            self.cloud_id = cloud.id.clone();
        }
        if let Some(tenant) = &firewall.tenant {
            self.tenant_id = tenant.id.clone();
        }
    }
}

pub struct FirewallResource {
    data: XelonProviderData,
}

impl FirewallResource {
    pub fn new(data: XelonProviderData) -> Self {
        Self { data }
    }

    async fn rename(&self, firewall_id: &str, name: &str) -> Result<Firewall, Diagnostic> {
        let request = FirewallUpdateRequest {
            name: name.to_string(),
        };
        tracing::debug!(firewall_id, payload = ?request, "Updating firewall");
        self.data
            .client
            .firewalls()
            .update(firewall_id, &request)
            .await
            .map_err(fail("Unable to update firewall"))?;

        self.data
            .client
            .firewalls()
            .get(firewall_id)
            .await
            .map_err(fail("Unable to get firewall"))
    }
}

#[async_trait]
impl Resource for FirewallResource {
    type Model = FirewallModel;

    fn type_name(&self) -> &str {
        "xelon_firewall"
    }

    async fn create(
        &self,
        ctx: Context,
        request: CreateResourceRequest<FirewallModel>,
    ) -> CreateResourceResponse<FirewallModel> {
        let mut plan = request.planned_state;
        let create_request = FirewallCreateRequest {
            cloud_id: plan.cloud_id.clone(),
            internal_network_id: plan.network_id.clone(),
            internal_ip_address: non_empty(&plan.internal_ip_address),
            name: plan.name.clone(),
            tenant_id: plan.tenant_id.clone(),
        };

        tracing::debug!(payload = ?create_request, "Creating firewall");
        let created = match self.data.client.firewalls().create(&create_request).await {
            Ok(firewall) => firewall,
            Err(e) => return CreateResourceResponse::error(fail("Unable to create firewall")(e)),
        };
        plan.id = created.id.clone();

        match wait_firewall_ready(&ctx, &self.data, &created.id).await {
            Ok(firewall) => {
                plan.apply(&firewall);
                CreateResourceResponse::ok(plan)
            }
            Err(e) => CreateResourceResponse::partial(
                plan,
                fail("Unable to wait for firewall to be ready")(e),
            ),
        }
    }

    async fn read(
        &self,
        _ctx: Context,
        request: ReadResourceRequest<FirewallModel>,
    ) -> ReadResourceResponse<FirewallModel> {
        let mut state = request.current_state;
        if state.id.is_empty() {
            return ReadResourceResponse::error(state, missing_id("firewall"));
        }

        match self.data.client.firewalls().get(&state.id).await {
            Ok(firewall) => {
                state.apply(&firewall);
                ReadResourceResponse::ok(Some(state))
            }
            Err(e) if e.is_not_found() => {
                tracing::warn!(firewall_id = %state.id, "Firewall not found, removing from state");
                ReadResourceResponse::ok(None)
            }
            Err(e) => ReadResourceResponse::error(state, fail("Unable to get firewall")(e)),
        }
    }

    async fn update(
        &self,
        _ctx: Context,
        request: UpdateResourceRequest<FirewallModel>,
    ) -> UpdateResourceResponse<FirewallModel> {
        let prior = request.prior_state;
        if prior.id.is_empty() {
            return UpdateResourceResponse::error(prior, missing_id("firewall"));
        }

        let mut plan = request.planned_state;
        plan.id = prior.id.clone();

        if plan.name == prior.name {
            return UpdateResourceResponse::ok(plan);
        }

        match self.rename(&prior.id, &plan.name).await {
            Ok(firewall) => {
                plan.apply(&firewall);
                UpdateResourceResponse::ok(plan)
            }
            Err(diag) => UpdateResourceResponse::error(prior, diag),
        }
    }

    async fn delete(
        &self,
        _ctx: Context,
        request: DeleteResourceRequest<FirewallModel>,
    ) -> DeleteResourceResponse {
        let firewall_id = request.prior_state.id;
        tracing::debug!(firewall_id = %firewall_id, "Deleting firewall");

        match self.data.client.firewalls().delete(&firewall_id).await {
            Ok(()) => DeleteResourceResponse::ok(),
            Err(e) if e.is_not_found() => DeleteResourceResponse::ok(),
            Err(e) => DeleteResourceResponse::error(fail("Unable to delete firewall")(e)),
        }
    }
}
