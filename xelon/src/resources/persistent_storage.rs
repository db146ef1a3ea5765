//! xelon_persistent_storage: detachable volumes that can be moved between devices

use crate::api::persistent_storages::{
    PersistentStorage, PersistentStorageCreateRequest, PERSISTENT_STORAGE_TYPE,
};
use crate::provider_data::XelonProviderData;
use crate::resources::{fail, missing_id, non_empty};
use crate::status::{wait_persistent_storage_formatted, wait_persistent_storage_ready};
use async_trait::async_trait;
use tfretry::resource::{
    CreateResourceRequest, CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ReadResourceRequest, ReadResourceResponse, UpdateResourceRequest, UpdateResourceResponse,
};
use tfretry::{AttributePath, Context, Diagnostic, Resource};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersistentStorageModel {
    pub id: String,
    pub cloud_id: String,
    /// Empty when detached; the API allows one device at a time
    pub device_id: String,
    pub name: String,
    /// GB
    pub size: u64,
    pub tenant_id: String,
    pub uuid: String,
}

impl PersistentStorageModel {
    fn apply(&mut self, storage: &PersistentStorage) {
        self.id = storage.id.clone();
        self.name = storage.name.clone();
        self.size = storage.capacity;
        self.uuid = storage.uuid.clone();
        self.device_id = storage
            .attached_devices
            .first()
            .map(|device| device.id.clone())
            .unwrap_or_default();
        if let Some(cloud) = &storage.cloud {
            self.cloud_id = cloud.id.clone();
        }
        if let Some(tenant) = &storage.tenant {
            self.tenant_id = tenant.id.clone();
        }
    }
}

pub struct PersistentStorageResource {
    data: XelonProviderData,
}

impl PersistentStorageResource {
    pub fn new(data: XelonProviderData) -> Self {
        Self { data }
    }

    async fn await_created(
        &self,
        ctx: &Context,
        storage_id: &str,
    ) -> Result<PersistentStorage, Diagnostic> {
        wait_persistent_storage_formatted(ctx, &self.data, storage_id)
            .await
            .map_err(fail("Unable to wait for persistent storage to be formatted"))?;
        wait_persistent_storage_ready(ctx, &self.data, storage_id)
            .await
            .map_err(fail("Unable to wait for persistent storage to be ready"))
    }

    /// Applies `plan` step by step; `current` follows every step that succeeded
    /// so a failure part way leaves it matching the remote volume
    async fn update_storage(
        &self,
        current: &mut PersistentStorageModel,
        mut plan: PersistentStorageModel,
    ) -> Result<PersistentStorageModel, Diagnostic> {
        let storages = self.data.client.persistent_storages();
        let prior = current.clone();
        let storage_id = prior.id.as_str();
        plan.id = prior.id.clone();

        if plan.size < prior.size {
            return Err(Diagnostic::error(
                "Unable to extend persistent storage size",
                format!(
                    "The storage size cannot be decreased from {} GB to {} GB",
                    prior.size, plan.size
                ),
            )
            .with_attribute(AttributePath::new("size")));
        }

        if plan.device_id != prior.device_id {
            if !prior.device_id.is_empty() {
                tracing::debug!(storage_id, device_id = %prior.device_id, "Detaching persistent storage from device");
                storages
                    .detach_from_device(storage_id, &prior.device_id)
                    .await
                    .map_err(fail("Unable to detach persistent storage"))?;
                current.device_id.clear();
            }
            if !plan.device_id.is_empty() {
                tracing::debug!(storage_id, device_id = %plan.device_id, "Attaching persistent storage to device");
                storages
                    .attach_to_device(storage_id, &plan.device_id)
                    .await
                    .map_err(fail("Unable to attach persistent storage"))?;
                current.device_id = plan.device_id.clone();
            }
        }

        if plan.size > prior.size {
            tracing::debug!(storage_id, old_size = prior.size, new_size = plan.size, "Extending persistent storage");
            storages
                .extend(storage_id, plan.size)
                .await
                .map_err(fail("Unable to extend persistent storage size"))?;
        }

        let storage = storages
            .get(storage_id)
            .await
            .map_err(fail("Unable to get persistent storage"))?;
        plan.apply(&storage);
        Ok(plan)
    }
}

#[async_trait]
impl Resource for PersistentStorageResource {
    type Model = PersistentStorageModel;

    fn type_name(&self) -> &str {
        "xelon_persistent_storage"
    }

    async fn create(
        &self,
        ctx: Context,
        request: CreateResourceRequest<PersistentStorageModel>,
    ) -> CreateResourceResponse<PersistentStorageModel> {
        let mut plan = request.planned_state;
        let create_request = PersistentStorageCreateRequest {
            cloud_id: non_empty(&plan.cloud_id),
            device_id: non_empty(&plan.device_id),
            name: plan.name.clone(),
            size: plan.size,
            tenant_id: non_empty(&plan.tenant_id),
            type_: PERSISTENT_STORAGE_TYPE,
        };

        tracing::debug!(payload = ?create_request, "Creating persistent storage");
        let created = match self
            .data
            .client
            .persistent_storages()
            .create(&create_request)
            .await
        {
            Ok(storage) => storage,
            Err(e) => {
                return CreateResourceResponse::error(fail(
                    "Unable to create persistent storage",
                )(e))
            }
        };
        plan.id = created.id.clone();

        match self.await_created(&ctx, &created.id).await {
            Ok(storage) => {
                plan.apply(&storage);
                CreateResourceResponse::ok(plan)
            }
            Err(diag) => CreateResourceResponse::partial(plan, diag),
        }
    }

    async fn read(
        &self,
        _ctx: Context,
        request: ReadResourceRequest<PersistentStorageModel>,
    ) -> ReadResourceResponse<PersistentStorageModel> {
        let mut state = request.current_state;
        if state.id.is_empty() {
            return ReadResourceResponse::error(state, missing_id("persistent storage"));
        }

        match self.data.client.persistent_storages().get(&state.id).await {
            Ok(storage) => {
                state.apply(&storage);
                ReadResourceResponse::ok(Some(state))
            }
            Err(e) if e.is_not_found() => ReadResourceResponse::ok(None),
            Err(e) => {
                ReadResourceResponse::error(state, fail("Unable to get persistent storage")(e))
            }
        }
    }

    async fn update(
        &self,
        _ctx: Context,
        request: UpdateResourceRequest<PersistentStorageModel>,
    ) -> UpdateResourceResponse<PersistentStorageModel> {
        let mut current = request.prior_state;
        if current.id.is_empty() {
            return UpdateResourceResponse::error(current, missing_id("persistent storage"));
        }

        match self.update_storage(&mut current, request.planned_state).await {
            Ok(state) => UpdateResourceResponse::ok(state),
            Err(diag) => UpdateResourceResponse::error(current, diag),
        }
    }

    async fn delete(
        &self,
        _ctx: Context,
        request: DeleteResourceRequest<PersistentStorageModel>,
    ) -> DeleteResourceResponse {
        let storage_id = request.prior_state.id;

        match self
            .data
            .client
            .persistent_storages()
            .delete(&storage_id)
            .await
        {
            Ok(()) => DeleteResourceResponse::ok(),
            Err(e) if e.is_not_found() => DeleteResourceResponse::ok(),
            Err(e) => {
                DeleteResourceResponse::error(fail("Unable to delete persistent storage")(e))
            }
        }
    }
}
