//! Resource implementations

pub mod device;
pub mod firewall;
pub mod iso;
pub mod load_balancer;
pub mod persistent_storage;
pub mod template;

pub use device::{DeviceModel, DeviceNetworkModel, DeviceResource};
pub use firewall::{FirewallModel, FirewallResource};
pub use iso::{IsoModel, IsoResource};
pub use load_balancer::{LoadBalancerModel, LoadBalancerResource};
pub use persistent_storage::{PersistentStorageModel, PersistentStorageResource};
pub use template::{TemplateModel, TemplateResource};

use tfretry::{AttributePath, Diagnostic};

/// Error mapper producing a diagnostic that names the failed operation
pub(crate) fn fail<E: std::fmt::Display>(summary: &'static str) -> impl FnOnce(E) -> Diagnostic {
    move |err| Diagnostic::error(summary, err.to_string())
}

pub(crate) fn missing_id(kind: &str) -> Diagnostic {
    Diagnostic::error(
        format!("Missing {} id", kind),
        format!("The {} has no id in state; it may not have been created", kind),
    )
    .with_attribute(AttributePath::new("id"))
}

/// Empty optional attributes are omitted from request bodies
pub(crate) fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
