use crate::api::templates::{Template, TemplateCreateRequest, TemplateUpdateRequest};
use crate::provider_data::XelonProviderData;
use crate::resources::{fail, missing_id, non_empty};
use crate::status::wait_template_ready;
use async_trait::async_trait;
use tfretry::resource::{
    CreateResourceRequest, CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ReadResourceRequest, ReadResourceResponse, UpdateResourceRequest, UpdateResourceResponse,
};
use tfretry::{Context, Resource};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateModel {
    pub id: String,
    pub category: String,
    pub cloud_id: String,
    pub description: String,
    /// Source device the template is cut from
    pub device_id: String,
    pub name: String,
    pub tenant_id: String,
    pub type_: String,
}

impl TemplateModel {
    fn apply(&mut self, template: &Template) {
        self.id = template.id.clone();
        self.category = template.category.clone();
        self.cloud_id = template.cloud_id.clone();
        self.description = template.description.clone();
        self.name = template.name.clone();
        self.type_ = template.type_.clone();
    }
}

pub struct TemplateResource {
    data: XelonProviderData,
}

impl TemplateResource {
    pub fn new(data: XelonProviderData) -> Self {
        Self { data }
    }
}

#[async_trait]
impl Resource for TemplateResource {
    type Model = TemplateModel;

    fn type_name(&self) -> &str {
        "xelon_template"
    }

    async fn create(
        &self,
        ctx: Context,
        request: CreateResourceRequest<TemplateModel>,
    ) -> CreateResourceResponse<TemplateModel> {
        let mut plan = request.planned_state;
        let create_request = TemplateCreateRequest {
            description: non_empty(&plan.description),
            device_id: plan.device_id.clone(),
            name: plan.name.clone(),
            send_email: false,
            tenant_id: plan.tenant_id.clone(),
        };

        tracing::debug!(payload = ?create_request, "Creating template");
        let created = match self.data.client.templates().create(&create_request).await {
            Ok(template) => template,
            Err(e) => return CreateResourceResponse::error(fail("Unable to create template")(e)),
        };
        plan.id = created.id.clone();

        match wait_template_ready(&ctx, &self.data, &created.id).await {
            Ok(template) => {
                plan.apply(&template);
                CreateResourceResponse::ok(plan)
            }
            Err(e) => CreateResourceResponse::partial(
                plan,
                fail("Unable to wait for template to be ready")(e),
            ),
        }
    }

    async fn read(
        &self,
        _ctx: Context,
        request: ReadResourceRequest<TemplateModel>,
    ) -> ReadResourceResponse<TemplateModel> {
        let mut state = request.current_state;
        if state.id.is_empty() {
            return ReadResourceResponse::error(state, missing_id("template"));
        }

        match self.data.client.templates().get(&state.id).await {
            Ok(template) => {
                state.apply(&template);
                ReadResourceResponse::ok(Some(state))
            }
            Err(e) if e.is_not_found() => ReadResourceResponse::ok(None),
            Err(e) => ReadResourceResponse::error(state, fail("Unable to get template")(e)),
        }
    }

    async fn update(
        &self,
        _ctx: Context,
        request: UpdateResourceRequest<TemplateModel>,
    ) -> UpdateResourceResponse<TemplateModel> {
        let prior = request.prior_state;
        if prior.id.is_empty() {
            return UpdateResourceResponse::error(prior, missing_id("template"));
        }

        let mut plan = request.planned_state;
        plan.id = prior.id.clone();

        let update_request = TemplateUpdateRequest {
            description: plan.description.clone(),
            name: plan.name.clone(),
        };
        tracing::debug!(template_id = %prior.id, payload = ?update_request, "Updating template");

        match self
            .data
            .client
            .templates()
            .update(&prior.id, &update_request)
            .await
        {
            Ok(template) => {
                plan.apply(&template);
                UpdateResourceResponse::ok(plan)
            }
            Err(e) => UpdateResourceResponse::error(prior, fail("Unable to update template")(e)),
        }
    }

    async fn delete(
        &self,
        _ctx: Context,
        request: DeleteResourceRequest<TemplateModel>,
    ) -> DeleteResourceResponse {
        match self
            .data
            .client
            .templates()
            .delete(&request.prior_state.id)
            .await
        {
            Ok(()) => DeleteResourceResponse::ok(),
            Err(e) if e.is_not_found() => DeleteResourceResponse::ok(),
            Err(e) => DeleteResourceResponse::error(fail("Unable to delete template")(e)),
        }
    }
}
