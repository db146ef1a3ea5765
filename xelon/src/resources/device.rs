//! xelon_device: virtual machines provisioned from a template
//!
//! Create, hardware changes and delete are followed by power/state waits,
//! because the API acknowledges those calls long before the device settles.

use crate::api::devices::{
    Device, DeviceCreateNetwork, DeviceCreateRequest, DeviceUpdateDiskRequest,
    DeviceUpdateHardwareRequest, DeviceUpdateRequest,
};
use crate::provider_data::XelonProviderData;
use crate::resources::{fail, missing_id, non_empty};
use crate::status::{wait_device_powered_off, wait_device_powered_on, wait_device_ready};
use async_trait::async_trait;
use tfretry::resource::{
    CreateResourceRequest, CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ReadResourceRequest, ReadResourceResponse, UpdateResourceRequest, UpdateResourceResponse,
};
use tfretry::{AttributePath, Context, Diagnostic, Resource};

const MAIN_DISK_UNIT: u32 = 0;
const SWAP_DISK_UNIT: u32 = 1;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceModel {
    pub id: String,
    pub cpu_core_count: u32,
    /// GB
    pub disk_size: u64,
    pub display_name: String,
    pub enable_monitoring: bool,
    pub hostname: String,
    /// GB
    pub memory: u32,
    pub networks: Vec<DeviceNetworkModel>,
    pub password: String,
    /// GB
    pub swap_disk_size: u64,
    pub template_id: String,
    pub tenant_id: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceNetworkModel {
    pub id: String,
    pub connected: bool,
    pub ip_address: String,
    pub ip_address_id: String,
}

impl DeviceModel {
    fn create_request(&self) -> DeviceCreateRequest {
        let networks = self
            .networks
            .iter()
            .map(|network| DeviceCreateNetwork {
                network_id: network.id.clone(),
                // a reserved address id takes precedence over a literal address
                ip_address: non_empty(&network.ip_address_id)
                    .or_else(|| non_empty(&network.ip_address)),
                connect_on_power_on: network.connected,
            })
            .collect();

        DeviceCreateRequest {
            cpu_cores: self.cpu_core_count,
            disk_size: self.disk_size,
            display_name: self.display_name.clone(),
            host_name: self.hostname.clone(),
            networks,
            password: self.password.clone(),
            password_confirmation: self.password.clone(),
            ram: self.memory,
            swap_disk_size: self.swap_disk_size,
            template_id: self.template_id.clone(),
            tenant_id: self.tenant_id.clone(),
        }
    }

    fn apply(&mut self, device: &Device) {
        self.id = device.id.clone();
        self.cpu_core_count = device.cpu_cores;
        self.display_name = device.display_name.clone();
        self.enable_monitoring = device.monitoring_enabled;
        self.hostname = device.host_name.clone();
        self.memory = device.ram;
        if let Some(main) = device.storage_at_unit(MAIN_DISK_UNIT) {
            self.disk_size = main.size;
        }
        if let Some(swap) = device.storage_at_unit(SWAP_DISK_UNIT) {
            self.swap_disk_size = swap.size;
        }
        if let Some(tenant) = &device.tenant {
            self.tenant_id = tenant.id.clone();
        }
    }
}

pub struct DeviceResource {
    data: XelonProviderData,
}

impl DeviceResource {
    pub fn new(data: XelonProviderData) -> Self {
        Self { data }
    }

    async fn await_created(&self, ctx: &Context, device_id: &str) -> Result<Device, Diagnostic> {
        wait_device_powered_on(ctx, &self.data, device_id)
            .await
            .map_err(fail("Unable to wait for device to be powered on"))?;
        wait_device_ready(ctx, &self.data, device_id)
            .await
            .map_err(fail("Unable to wait for device to be ready"))?;

        tracing::debug!(device_id, "Getting device with enriched data");
        self.data
            .client
            .devices()
            .get(device_id)
            .await
            .map_err(fail("Unable to get device"))
    }

    async fn update_device(
        &self,
        ctx: &Context,
        prior: &DeviceModel,
        mut plan: DeviceModel,
    ) -> Result<DeviceModel, Diagnostic> {
        let device_id = prior.id.as_str();
        let devices = self.data.client.devices();
        plan.id = prior.id.clone();

        if plan.display_name != prior.display_name {
            let request = DeviceUpdateRequest {
                display_name: plan.display_name.clone(),
            };
            tracing::debug!(device_id, payload = ?request, "Updating device name");
            devices
                .update(device_id, &request)
                .await
                .map_err(fail("Unable to update device name"))?;
        }

        if plan.cpu_core_count != prior.cpu_core_count || plan.memory != prior.memory {
            let device = devices
                .get(device_id)
                .await
                .map_err(fail("Unable to get device"))?;

            // hardware can only change while the device is off
            let was_powered_on = device.powered_on;
            if was_powered_on {
                tracing::info!(device_id, "Stopping device for hardware update");
                devices
                    .stop(device_id)
                    .await
                    .map_err(fail("Unable to stop device"))?;
                wait_device_powered_off(ctx, &self.data, device_id)
                    .await
                    .map_err(fail("Unable to wait for device to be powered off"))?;
            }

            let request = DeviceUpdateHardwareRequest {
                cpu_cores: plan.cpu_core_count,
                ram: plan.memory,
            };
            tracing::debug!(device_id, payload = ?request, "Updating device hardware");
            devices
                .update_hardware(device_id, &request)
                .await
                .map_err(fail("Unable to update device hardware"))?;

            if was_powered_on {
                tracing::info!(device_id, "Starting device after hardware update");
                devices
                    .start(device_id)
                    .await
                    .map_err(fail("Unable to start device"))?;
                wait_device_powered_on(ctx, &self.data, device_id)
                    .await
                    .map_err(fail("Unable to wait for device to be powered on"))?;
            }
        }

        if plan.disk_size != prior.disk_size || plan.swap_disk_size != prior.swap_disk_size {
            let device = devices
                .get(device_id)
                .await
                .map_err(fail("Unable to get device"))?;

            if plan.disk_size != prior.disk_size {
                self.resize_disk(&device, MAIN_DISK_UNIT, plan.disk_size, "disk_size")
                    .await?;
            }
            if plan.swap_disk_size != prior.swap_disk_size {
                self.resize_disk(&device, SWAP_DISK_UNIT, plan.swap_disk_size, "swap_disk_size")
                    .await?;
            }
        }

        let device = devices
            .get(device_id)
            .await
            .map_err(fail("Unable to get device"))?;
        plan.apply(&device);
        Ok(plan)
    }

    async fn resize_disk(
        &self,
        device: &Device,
        unit: u32,
        size: u64,
        attribute: &str,
    ) -> Result<(), Diagnostic> {
        let Some(disk) = device.storage_at_unit(unit) else {
            tracing::warn!(device_id = %device.id, unit, "Device has no disk at unit, skipping resize");
            return Ok(());
        };

        if size < disk.size {
            return Err(Diagnostic::error(
                "Cannot downsize disk",
                format!(
                    "Disk at unit {} is {} GB and cannot shrink to {} GB; only growing disks is supported",
                    unit, disk.size, size
                ),
            )
            .with_attribute(AttributePath::new(attribute)));
        }

        let request = DeviceUpdateDiskRequest {
            disk_id: disk.id.clone(),
            size,
        };
        tracing::debug!(device_id = %device.id, old_size = disk.size, payload = ?request, "Resizing device disk");
        self.data
            .client
            .devices()
            .update_disk(&device.id, &request)
            .await
            .map_err(fail("Unable to update device disk"))
    }
}

#[async_trait]
impl Resource for DeviceResource {
    type Model = DeviceModel;

    fn type_name(&self) -> &str {
        "xelon_device"
    }

    async fn create(
        &self,
        ctx: Context,
        request: CreateResourceRequest<DeviceModel>,
    ) -> CreateResourceResponse<DeviceModel> {
        let mut plan = request.planned_state;
        let create_request = plan.create_request();

        tracing::debug!(display_name = %plan.display_name, template_id = %plan.template_id, "Creating device");
        let created = match self.data.client.devices().create(&create_request).await {
            Ok(device) => device,
            Err(e) => return CreateResourceResponse::error(fail("Unable to create device")(e)),
        };
        tracing::info!(device_id = %created.id, "Created device");
        plan.id = created.id.clone();

        match self.await_created(&ctx, &created.id).await {
            Ok(device) => {
                plan.apply(&device);
                CreateResourceResponse::ok(plan)
            }
            Err(diag) => CreateResourceResponse::partial(plan, diag),
        }
    }

    async fn read(
        &self,
        _ctx: Context,
        request: ReadResourceRequest<DeviceModel>,
    ) -> ReadResourceResponse<DeviceModel> {
        let mut state = request.current_state;
        if state.id.is_empty() {
            return ReadResourceResponse::error(state, missing_id("device"));
        }

        match self.data.client.devices().get(&state.id).await {
            Ok(device) => {
                state.apply(&device);
                ReadResourceResponse::ok(Some(state))
            }
            Err(e) if e.is_not_found() => {
                tracing::warn!(device_id = %state.id, "Device not found, removing from state");
                ReadResourceResponse::ok(None)
            }
            Err(e) => ReadResourceResponse::error(state, fail("Unable to get device")(e)),
        }
    }

    async fn update(
        &self,
        ctx: Context,
        request: UpdateResourceRequest<DeviceModel>,
    ) -> UpdateResourceResponse<DeviceModel> {
        let prior = request.prior_state;
        if prior.id.is_empty() {
            return UpdateResourceResponse::error(prior, missing_id("device"));
        }

        match self
            .update_device(&ctx, &prior, request.planned_state)
            .await
        {
            Ok(state) => UpdateResourceResponse::ok(state),
            Err(diag) => UpdateResourceResponse::error(prior, diag),
        }
    }

    async fn delete(
        &self,
        ctx: Context,
        request: DeleteResourceRequest<DeviceModel>,
    ) -> DeleteResourceResponse {
        let device_id = request.prior_state.id;
        let devices = self.data.client.devices();

        let device = match devices.get(&device_id).await {
            Ok(device) => device,
            Err(e) if e.is_not_found() => {
                tracing::info!(device_id = %device_id, "Device already deleted");
                return DeleteResourceResponse::ok();
            }
            Err(e) => return DeleteResourceResponse::error(fail("Unable to get device")(e)),
        };

        if device.powered_on {
            tracing::info!(device_id = %device_id, "Stopping device before deletion");
            if let Err(e) = devices.stop(&device_id).await {
                return DeleteResourceResponse::error(fail("Unable to stop device")(e));
            }
            if let Err(e) = wait_device_powered_off(&ctx, &self.data, &device_id).await {
                return DeleteResourceResponse::error(fail(
                    "Unable to wait for device to be powered off",
                )(e));
            }
        }

        match devices.delete(&device_id).await {
            Ok(()) => {
                tracing::info!(device_id = %device_id, "Deleted device");
                DeleteResourceResponse::ok()
            }
            Err(e) if e.is_not_found() => DeleteResourceResponse::ok(),
            Err(e) => DeleteResourceResponse::error(fail("Unable to delete device")(e)),
        }
    }
}

#[cfg(test)]
#[path = "./device_test.rs"]
mod device_test;
