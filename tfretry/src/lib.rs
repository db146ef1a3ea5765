//! tfretry - Terraform provider support for Rust
//!
//! Request context, diagnostics, a typed resource lifecycle trait and the
//! state-change waiter resources use after mutating calls.

// Core modules
pub mod context;
pub mod error;
pub mod types;

// Provider API modules
pub mod resource;

// Helper modules
pub mod retry;

// Re-exports for convenience
pub use context::Context;
pub use error::{Result, TfretryError};
pub use resource::Resource;
pub use retry::{Refresh, StateChange, StateChangeConf, WaitError};
pub use types::{AttributePath, Diagnostic, DiagnosticSeverity, Diagnostics};
