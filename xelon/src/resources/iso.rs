use crate::api::isos::{Iso, IsoCreateRequest, IsoUpdateRequest};
use crate::provider_data::XelonProviderData;
use crate::resources::{fail, missing_id, non_empty};
use crate::status::wait_iso_active;
use async_trait::async_trait;
use tfretry::resource::{
    CreateResourceRequest, CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ReadResourceRequest, ReadResourceResponse, UpdateResourceRequest, UpdateResourceResponse,
};
use tfretry::{Context, Resource};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IsoModel {
    pub id: String,
    pub active: bool,
    pub category_id: i64,
    pub cloud_id: String,
    pub description: String,
    pub name: String,
    pub tenant_id: String,
    pub url: String,
}

impl IsoModel {
    fn apply(&mut self, iso: &Iso) {
        self.id = iso.id.clone();
        self.active = iso.active;
        self.description = iso.description.clone();
        self.name = iso.name.clone();
        if let Some(cloud) = &iso.cloud {
            self.cloud_id = cloud.id.clone();
        }
    }
}

pub struct IsoResource {
    data: XelonProviderData,
}

impl IsoResource {
    pub fn new(data: XelonProviderData) -> Self {
        Self { data }
    }
}

#[async_trait]
impl Resource for IsoResource {
    type Model = IsoModel;

    fn type_name(&self) -> &str {
        "xelon_iso"
    }

    async fn create(
        &self,
        ctx: Context,
        request: CreateResourceRequest<IsoModel>,
    ) -> CreateResourceResponse<IsoModel> {
        let mut plan = request.planned_state;
        let create_request = IsoCreateRequest {
            category_id: plan.category_id,
            cloud_id: plan.cloud_id.clone(),
            description: non_empty(&plan.description),
            name: plan.name.clone(),
            tenant_id: non_empty(&plan.tenant_id),
            url: plan.url.clone(),
        };

        tracing::debug!(payload = ?create_request, "Creating ISO");
        let created = match self.data.client.isos().create(&create_request).await {
            Ok(iso) => iso,
            Err(e) => return CreateResourceResponse::error(fail("Unable to create ISO")(e)),
        };
        plan.id = created.id.clone();

        match wait_iso_active(&ctx, &self.data, &created.id).await {
            Ok(iso) => {
                plan.apply(&iso);
                CreateResourceResponse::ok(plan)
            }
            Err(e) => {
                CreateResourceResponse::partial(plan, fail("Unable to wait for ISO to be active")(e))
            }
        }
    }

    async fn read(
        &self,
        _ctx: Context,
        request: ReadResourceRequest<IsoModel>,
    ) -> ReadResourceResponse<IsoModel> {
        let mut state = request.current_state;
        if state.id.is_empty() {
            return ReadResourceResponse::error(state, missing_id("ISO"));
        }

        match self.data.client.isos().get(&state.id).await {
            Ok(iso) => {
                state.apply(&iso);
                ReadResourceResponse::ok(Some(state))
            }
            Err(e) if e.is_not_found() => ReadResourceResponse::ok(None),
            Err(e) => ReadResourceResponse::error(state, fail("Unable to get ISO")(e)),
        }
    }

    async fn update(
        &self,
        _ctx: Context,
        request: UpdateResourceRequest<IsoModel>,
    ) -> UpdateResourceResponse<IsoModel> {
        let prior = request.prior_state;
        if prior.id.is_empty() {
            return UpdateResourceResponse::error(prior, missing_id("ISO"));
        }

        let mut plan = request.planned_state;
        plan.id = prior.id.clone();

        let update_request = IsoUpdateRequest {
            category_id: plan.category_id,
            description: plan.description.clone(),
            name: plan.name.clone(),
        };
        tracing::debug!(iso_id = %prior.id, payload = ?update_request, "Updating ISO");

        match self.data.client.isos().update(&prior.id, &update_request).await {
            Ok(iso) => {
                plan.apply(&iso);
                UpdateResourceResponse::ok(plan)
            }
            Err(e) => UpdateResourceResponse::error(prior, fail("Unable to update ISO")(e)),
        }
    }

    async fn delete(
        &self,
        _ctx: Context,
        request: DeleteResourceRequest<IsoModel>,
    ) -> DeleteResourceResponse {
        match self.data.client.isos().delete(&request.prior_state.id).await {
            Ok(()) => DeleteResourceResponse::ok(),
            Err(e) if e.is_not_found() => {
                tracing::info!(iso_id = %request.prior_state.id, "ISO already deleted");
                DeleteResourceResponse::ok()
            }
            Err(e) => DeleteResourceResponse::error(fail("Unable to delete ISO")(e)),
        }
    }
}
