//! Resource trait and related types
//!
//! This module defines the Resource trait lifecycle handlers implement. Each
//! resource works on its own typed model; translating that model to and from
//! the host's wire representation happens outside this crate.

use crate::context::Context;
use crate::types::Diagnostic;
use async_trait::async_trait;

/// Base trait for resources - implement CRUD operations
#[async_trait]
pub trait Resource: Send + Sync {
    /// Typed attribute model shared by plan and state
    type Model: Clone + Send + Sync;

    /// Type name should be constant (e.g., "xelon_device")
    fn type_name(&self) -> &str;

    /// Called to create a new resource
    /// MUST populate all computed attributes in response.new_state
    async fn create(
        &self,
        ctx: Context,
        request: CreateResourceRequest<Self::Model>,
    ) -> CreateResourceResponse<Self::Model>;

    /// Called to read current state - used for refresh and after create/update
    /// MUST return None if the remote object no longer exists
    async fn read(
        &self,
        ctx: Context,
        request: ReadResourceRequest<Self::Model>,
    ) -> ReadResourceResponse<Self::Model>;

    /// Called to update an existing resource
    /// MUST apply all changes from planned_state to the resource
    async fn update(
        &self,
        ctx: Context,
        request: UpdateResourceRequest<Self::Model>,
    ) -> UpdateResourceResponse<Self::Model>;

    /// Called to delete a resource
    /// A resource that is already gone counts as deleted
    async fn delete(
        &self,
        ctx: Context,
        request: DeleteResourceRequest<Self::Model>,
    ) -> DeleteResourceResponse;
}

pub struct CreateResourceRequest<M> {
    pub planned_state: M,
}

pub struct CreateResourceResponse<M> {
    pub new_state: Option<M>,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct ReadResourceRequest<M> {
    pub current_state: M,
}

pub struct ReadResourceResponse<M> {
    pub new_state: Option<M>,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct UpdateResourceRequest<M> {
    pub prior_state: M,
    pub planned_state: M,
}

pub struct UpdateResourceResponse<M> {
    pub new_state: Option<M>,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct DeleteResourceRequest<M> {
    pub prior_state: M,
}

pub struct DeleteResourceResponse {
    pub diagnostics: Vec<Diagnostic>,
}

impl<M> CreateResourceResponse<M> {
    pub fn ok(new_state: M) -> Self {
        Self {
            new_state: Some(new_state),
            diagnostics: vec![],
        }
    }

    pub fn error(diagnostic: Diagnostic) -> Self {
        Self {
            new_state: None,
            diagnostics: vec![diagnostic],
        }
    }

    /// The remote object exists but a later step failed; record it so it is not orphaned
    pub fn partial(new_state: M, diagnostic: Diagnostic) -> Self {
        Self {
            new_state: Some(new_state),
            diagnostics: vec![diagnostic],
        }
    }
}

impl<M> ReadResourceResponse<M> {
    pub fn ok(new_state: Option<M>) -> Self {
        Self {
            new_state,
            diagnostics: vec![],
        }
    }

    pub fn error(current_state: M, diagnostic: Diagnostic) -> Self {
        Self {
            new_state: Some(current_state),
            diagnostics: vec![diagnostic],
        }
    }
}

impl<M> UpdateResourceResponse<M> {
    pub fn ok(new_state: M) -> Self {
        Self {
            new_state: Some(new_state),
            diagnostics: vec![],
        }
    }

    /// Failed update; the prior state is kept so nothing is lost from the host's view
    pub fn error(prior_state: M, diagnostic: Diagnostic) -> Self {
        Self {
            new_state: Some(prior_state),
            diagnostics: vec![diagnostic],
        }
    }
}

impl DeleteResourceResponse {
    pub fn ok() -> Self {
        Self {
            diagnostics: vec![],
        }
    }

    pub fn error(diagnostic: Diagnostic) -> Self {
        Self {
            diagnostics: vec![diagnostic],
        }
    }
}
