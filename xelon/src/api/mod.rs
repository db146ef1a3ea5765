//! Xelon HQ REST API client

pub mod client;
pub mod common;
pub mod error;
pub mod pool;

pub mod devices;
pub mod firewalls;
pub mod isos;
pub mod load_balancers;
pub mod persistent_storages;
pub mod templates;

#[cfg(test)]
pub mod test_helpers;

pub use client::{Client, ClientOptions, RetryConfig};
pub use common::Reference;
pub use error::ApiError;
