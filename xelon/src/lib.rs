//! Terraform provider for Xelon HQ
//!
//! Resources create remote objects through the HQ API and then block on
//! `status` waits until the object reaches a usable state.

pub mod api;
pub mod config;
pub mod provider_data;
pub mod resources;
pub mod status;

use api::{Client, ClientOptions};
use config::ProviderConfig;
use provider_data::XelonProviderData;
use resources::{
    DeviceResource, FirewallResource, IsoResource, LoadBalancerResource,
    PersistentStorageResource, TemplateResource,
};
use tfretry::{Diagnostics, TfretryError};

pub struct XelonProvider {
    data: Option<XelonProviderData>,
}

impl Default for XelonProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl XelonProvider {
    pub fn new() -> Self {
        Self { data: None }
    }

    pub fn configure(&mut self, config: ProviderConfig) -> Diagnostics {
        let mut diags = Diagnostics::new();

        let resolved = match config.resolve() {
            Ok(resolved) => resolved,
            Err(problems) => {
                for problem in problems {
                    diags.add_error(problem, None::<String>);
                }
                return diags;
            }
        };

        let options = ClientOptions {
            client_id: resolved.client_id,
            insecure: resolved.insecure,
            ..Default::default()
        };

        match Client::with_options(&resolved.base_url, &resolved.token, options) {
            Ok(client) => {
                tracing::info!(
                    base_url = %client.base_url(),
                    wait_timeout = ?resolved.wait.timeout,
                    "Configured Xelon provider"
                );
                self.data = Some(XelonProviderData::new(client, resolved.wait));
            }
            Err(e) => {
                diags.add_error(
                    format!("Failed to create API client: {}", e),
                    None::<String>,
                );
            }
        }

        diags
    }

    pub fn provider_data(&self) -> tfretry::Result<&XelonProviderData> {
        self.data.as_ref().ok_or(TfretryError::ProviderNotConfigured)
    }

    pub fn resource_type_names(&self) -> Vec<&'static str> {
        vec![
            "xelon_device",
            "xelon_firewall",
            "xelon_iso",
            "xelon_load_balancer",
            "xelon_persistent_storage",
            "xelon_template",
        ]
    }

    pub fn devices(&self) -> tfretry::Result<DeviceResource> {
        Ok(DeviceResource::new(self.provider_data()?.clone()))
    }

    pub fn firewalls(&self) -> tfretry::Result<FirewallResource> {
        Ok(FirewallResource::new(self.provider_data()?.clone()))
    }

    pub fn isos(&self) -> tfretry::Result<IsoResource> {
        Ok(IsoResource::new(self.provider_data()?.clone()))
    }

    pub fn load_balancers(&self) -> tfretry::Result<LoadBalancerResource> {
        Ok(LoadBalancerResource::new(self.provider_data()?.clone()))
    }

    pub fn persistent_storages(&self) -> tfretry::Result<PersistentStorageResource> {
        Ok(PersistentStorageResource::new(self.provider_data()?.clone()))
    }

    pub fn templates(&self) -> tfretry::Result<TemplateResource> {
        Ok(TemplateResource::new(self.provider_data()?.clone()))
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use config::{ENV_BASE_URL, ENV_INSECURE, ENV_TOKEN, ENV_WAIT_TIMEOUT};
    use serial_test::serial;
    use std::time::Duration;
    use tfretry::Resource;

    fn clear_env() {
        for name in [ENV_BASE_URL, ENV_TOKEN, ENV_INSECURE, ENV_WAIT_TIMEOUT] {
            std::env::remove_var(name);
        }
    }

    #[test]
    #[serial]
    fn provider_configures_successfully_with_env_vars() {
        clear_env();
        std::env::set_var(ENV_BASE_URL, "https://localhost:8443/api/service");
        std::env::set_var(ENV_TOKEN, "secret");
        std::env::set_var(ENV_INSECURE, "true");
        std::env::set_var(ENV_WAIT_TIMEOUT, "60");

        let mut provider = XelonProvider::new();
        let diags = provider.configure(ProviderConfig::default());

        assert!(diags.errors.is_empty(), "{:?}", diags.errors);
        let data = provider.provider_data().unwrap();
        assert_eq!(
            data.client.base_url().as_str(),
            "https://localhost:8443/api/service/"
        );
        assert_eq!(data.wait.timeout, Duration::from_secs(60));

        clear_env();
    }

    #[test]
    #[serial]
    fn provider_configure_requires_token() {
        clear_env();

        let mut provider = XelonProvider::new();
        let diags = provider.configure(ProviderConfig::default());

        assert!(diags.has_errors());
        assert!(diags.errors[0].summary.contains("token must be set"));
        assert!(provider.provider_data().is_err());
    }

    #[test]
    #[serial]
    fn provider_reports_invalid_base_url() {
        clear_env();

        let mut provider = XelonProvider::new();
        let diags = provider.configure(ProviderConfig {
            base_url: Some("not a url".into()),
            token: Some("secret".into()),
            ..Default::default()
        });

        assert!(diags.has_errors());
        assert!(diags.errors[0]
            .summary
            .starts_with("Failed to create API client"));
    }

    #[test]
    #[serial]
    fn provider_creates_resources_after_configuration() {
        clear_env();

        let mut provider = XelonProvider::new();
        let diags = provider.configure(ProviderConfig {
            token: Some("secret".into()),
            ..Default::default()
        });
        assert!(!diags.has_errors());

        assert_eq!(provider.devices().unwrap().type_name(), "xelon_device");
        assert_eq!(provider.firewalls().unwrap().type_name(), "xelon_firewall");
        assert_eq!(provider.isos().unwrap().type_name(), "xelon_iso");
        assert_eq!(
            provider.load_balancers().unwrap().type_name(),
            "xelon_load_balancer"
        );
        assert_eq!(
            provider.persistent_storages().unwrap().type_name(),
            "xelon_persistent_storage"
        );
        assert_eq!(provider.templates().unwrap().type_name(), "xelon_template");
    }

    #[test]
    fn provider_fails_to_create_resources_before_configuration() {
        let provider = XelonProvider::new();

        let resource = provider.devices();
        assert!(matches!(resource, Err(TfretryError::ProviderNotConfigured)));
    }

    #[test]
    fn resource_type_names_are_prefixed() {
        let provider = XelonProvider::new();
        let names = provider.resource_type_names();

        assert_eq!(names.len(), 6);
        assert!(names.iter().all(|name| name.starts_with("xelon_")));
    }
}
