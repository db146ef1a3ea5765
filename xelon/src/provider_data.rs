//! Provider data structure passed to resources

use crate::api::Client;
use crate::config::WaitSettings;
use std::sync::Arc;

#[derive(Clone)]
pub struct XelonProviderData {
    pub client: Arc<Client>,
    pub wait: WaitSettings,
}

impl XelonProviderData {
    pub fn new(client: Client, wait: WaitSettings) -> Self {
        Self {
            client: Arc::new(client),
            wait,
        }
    }
}
