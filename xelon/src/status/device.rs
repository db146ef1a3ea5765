//! Device power and provisioning state

use super::{classify, run_wait, StatusWaitError, UnknownStateCode};
use crate::api::devices::Device;
use crate::api::{ApiError, Client};
use crate::provider_data::XelonProviderData;
use std::fmt;
use tfretry::{Context, Refresh};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DevicePowerState {
    PoweredOn,
    PoweredOff,
}

impl DevicePowerState {
    pub fn of(device: &Device) -> Self {
        if device.powered_on {
            Self::PoweredOn
        } else {
            Self::PoweredOff
        }
    }
}

impl fmt::Display for DevicePowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PoweredOn => "poweredOn",
            Self::PoweredOff => "poweredOff",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    Provisioning,
    Ready,
    ReadyForBasicUse,
}

impl TryFrom<i64> for DeviceState {
    type Error = UnknownStateCode;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Provisioning),
            1 => Ok(Self::Ready),
            2 => Ok(Self::ReadyForBasicUse),
            code => Err(UnknownStateCode {
                kind: "device",
                code,
            }),
        }
    }
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Provisioning => "provisioning",
            Self::Ready => "ready",
            Self::ReadyForBasicUse => "readyForBasicUse",
        })
    }
}

pub async fn device_power_state(
    client: &Client,
    device_id: &str,
) -> Result<Refresh<Device, DevicePowerState>, ApiError> {
    let device = client.devices().get(device_id).await?;
    let state = DevicePowerState::of(&device);
    Ok(Refresh::state(device, state))
}

pub async fn device_state(
    client: &Client,
    device_id: &str,
) -> Result<Refresh<Device, DeviceState>, ApiError> {
    let device = client.devices().get(device_id).await?;
    Ok(classify(device, |d| DeviceState::try_from(d.state)))
}

/// Freshly created and restarted devices answer 500/503 until they boot,
/// so those count as still powered off here.
pub async fn wait_device_powered_on(
    ctx: &Context,
    data: &XelonProviderData,
    device_id: &str,
) -> Result<Device, StatusWaitError> {
    let conf = data
        .wait
        .conf([DevicePowerState::PoweredOff], [DevicePowerState::PoweredOn])
        .mask_errors_as(DevicePowerState::PoweredOff, ApiError::is_transient_provisioning);

    run_wait(ctx, conf, "device", device_id, "become powered on", || {
        device_power_state(&data.client, device_id)
    })
    .await
}

pub async fn wait_device_powered_off(
    ctx: &Context,
    data: &XelonProviderData,
    device_id: &str,
) -> Result<Device, StatusWaitError> {
    let conf = data
        .wait
        .conf([DevicePowerState::PoweredOn], [DevicePowerState::PoweredOff]);

    run_wait(ctx, conf, "device", device_id, "become powered off", || {
        device_power_state(&data.client, device_id)
    })
    .await
}

/// `readyForBasicUse` is still pending; only a fully ready device ends the wait
pub async fn wait_device_ready(
    ctx: &Context,
    data: &XelonProviderData,
    device_id: &str,
) -> Result<Device, StatusWaitError> {
    let conf = data.wait.conf(
        [DeviceState::Provisioning, DeviceState::ReadyForBasicUse],
        [DeviceState::Ready],
    );

    run_wait(ctx, conf, "device", device_id, "become ready", || {
        device_state(&data.client, device_id)
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_helpers::create_test_client;
    use crate::config::WaitSettings;
    use mockito::Server;
    use std::time::Duration;

    fn fast_data(url: &str) -> XelonProviderData {
        XelonProviderData::new(
            create_test_client(url),
            WaitSettings {
                timeout: Duration::from_millis(500),
                poll_interval: Duration::from_millis(10),
                delay: Duration::ZERO,
            },
        )
    }

    #[test]
    fn state_codes() {
        assert_eq!(DeviceState::try_from(0), Ok(DeviceState::Provisioning));
        assert_eq!(DeviceState::try_from(1), Ok(DeviceState::Ready));
        assert_eq!(DeviceState::try_from(2), Ok(DeviceState::ReadyForBasicUse));
        assert_eq!(
            DeviceState::try_from(7).unwrap_err().to_string(),
            "unknown device state code 7"
        );
        assert_eq!(DeviceState::ReadyForBasicUse.to_string(), "readyForBasicUse");
        assert_eq!(DevicePowerState::PoweredOff.to_string(), "poweredOff");
    }

    #[tokio::test]
    async fn powered_on_wait_masks_provisioning_errors() {
        let mut server = Server::new_async().await;
        let failing = server
            .mock("GET", "/devices/dev-1")
            .with_status(500)
            .expect(1)
            .create_async()
            .await;
        let _on = server
            .mock("GET", "/devices/dev-1")
            .with_status(200)
            .with_body(r#"{"id": "dev-1", "state": 0, "poweredOn": true}"#)
            .create_async()
            .await;

        let data = fast_data(&server.url());
        let device = wait_device_powered_on(&Context::new(), &data, "dev-1")
            .await
            .unwrap();

        assert!(device.powered_on);
        failing.assert_async().await;
    }

    #[tokio::test]
    async fn powered_off_wait_surfaces_server_errors() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/devices/dev-1")
            .with_status(500)
            .create_async()
            .await;

        let data = fast_data(&server.url());
        let err = wait_device_powered_off(&Context::new(), &data, "dev-1")
            .await
            .unwrap_err();

        assert_eq!(err.api_error().and_then(ApiError::status), Some(500));
        assert!(err
            .to_string()
            .starts_with("failed to wait for device (dev-1) to become powered off"));
    }

    #[tokio::test]
    async fn ready_wait_rejects_unknown_codes() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/devices/dev-1")
            .with_status(200)
            .with_body(r#"{"id": "dev-1", "state": 5}"#)
            .create_async()
            .await;

        let data = fast_data(&server.url());
        let err = wait_device_ready(&Context::new(), &data, "dev-1")
            .await
            .unwrap_err();

        assert!(err.source.is_unexpected_state());
        assert!(err.to_string().contains("unknown device state code 5"));
    }

    #[tokio::test]
    async fn ready_wait_does_not_mask_server_errors() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/devices/dev-1")
            .with_status(503)
            .expect(1)
            .create_async()
            .await;

        let data = fast_data(&server.url());
        let err = wait_device_ready(&Context::new(), &data, "dev-1")
            .await
            .unwrap_err();

        assert_eq!(err.api_error().and_then(ApiError::status), Some(503));
        m.assert_async().await;
    }
}
