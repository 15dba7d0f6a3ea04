//! Confirmation handler trait and stock handlers

use std::sync::Arc;

use async_trait::async_trait;

use super::request::{ConfirmationOutcome, ConfirmationRequest};

/// Caller-supplied confirmation channel
///
/// Implement this to prompt a user, consult a policy, or forward the request
/// to a parent process.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConfirmationHandler: Send + Sync {
    /// Decide whether the call described by `request` may run
    async fn confirm(&self, request: ConfirmationRequest) -> ConfirmationOutcome;
}

/// Shared confirmation handler type
pub type SharedConfirmationHandler = Arc<dyn ConfirmationHandler>;

/// Approves every call once (for non-interactive use)
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoApproveHandler;

#[async_trait]
impl ConfirmationHandler for AutoApproveHandler {
    async fn confirm(&self, _request: ConfirmationRequest) -> ConfirmationOutcome {
        ConfirmationOutcome::AllowOnce
    }
}

/// Denies every call (for restricted environments)
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoDenyHandler;

#[async_trait]
impl ConfirmationHandler for AutoDenyHandler {
    async fn confirm(&self, _request: ConfirmationRequest) -> ConfirmationOutcome {
        ConfirmationOutcome::Deny
    }
}

/// Adapts a synchronous closure into a handler
pub struct CallbackHandler<F> {
    callback: F,
}

impl<F> CallbackHandler<F>
where
    F: Fn(&ConfirmationRequest) -> ConfirmationOutcome + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

#[async_trait]
impl<F> ConfirmationHandler for CallbackHandler<F>
where
    F: Fn(&ConfirmationRequest) -> ConfirmationOutcome + Send + Sync,
{
    async fn confirm(&self, request: ConfirmationRequest) -> ConfirmationOutcome {
        (self.callback)(&request)
    }
}
