//! Confirmation gate

use std::sync::Arc;

use super::handler::SharedConfirmationHandler;
use super::request::{ConfirmationOutcome, ConfirmationRequest};
use super::store::ApprovalStore;

/// Result of passing a call through the gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// A persisted rule exempted the call
    AutoApproved { rule_id: String },
    /// The handler allowed the call; `remembered` is set for allow-and-remember
    Approved { remembered: bool },
    /// The call must not run
    Denied { reason: String },
}

impl GateDecision {
    /// Check if the call may run
    pub fn is_allowed(&self) -> bool {
        !matches!(self, GateDecision::Denied { .. })
    }
}

/// Policy layer deciding whether a tool call may proceed
///
/// Without a handler, any call that is not covered by a rule is denied.
#[derive(Clone)]
pub struct ConfirmationGate {
    store: Arc<ApprovalStore>,
    handler: Option<SharedConfirmationHandler>,
}

impl ConfirmationGate {
    /// Create a gate with no handler
    pub fn new(store: Arc<ApprovalStore>) -> Self {
        Self {
            store,
            handler: None,
        }
    }

    /// Set the confirmation handler
    pub fn with_handler(mut self, handler: SharedConfirmationHandler) -> Self {
        self.handler = Some(handler);
        self
    }

    /// The underlying rule store
    pub fn store(&self) -> &Arc<ApprovalStore> {
        &self.store
    }

    /// Decide whether the call described by `request` may run
    pub async fn check(&self, request: ConfirmationRequest) -> GateDecision {
        match self.store.find_match(&request).await {
            Ok(Some(rule)) => {
                tracing::debug!(
                    tool = %request.tool_name,
                    rule_id = %rule.id,
                    rule_type = %rule.rule_type,
                    "Call approved by persisted rule"
                );
                if let Err(e) = self.store.touch(&rule.id).await {
                    tracing::warn!(rule_id = %rule.id, error = %e, "Failed to update rule lastUsed");
                }
                return GateDecision::AutoApproved { rule_id: rule.id };
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load approval rules, asking for confirmation");
            }
        }

        let Some(handler) = &self.handler else {
            tracing::info!(tool = %request.tool_name, "No confirmation handler configured, denying call");
            return GateDecision::Denied {
                reason: format!(
                    "Tool '{}' requires confirmation but no confirmation handler is available",
                    request.tool_name
                ),
            };
        };

        let tool_name = request.tool_name.clone();
        let suggested = request.details.suggested_rule.clone();
        let outcome = handler.confirm(request).await;
        tracing::debug!(tool = %tool_name, outcome = ?outcome, "Confirmation outcome");

        match outcome {
            ConfirmationOutcome::Deny => GateDecision::Denied {
                reason: format!("User denied execution of '{}'", tool_name),
            },
            ConfirmationOutcome::AllowOnce => GateDecision::Approved { remembered: false },
            ConfirmationOutcome::AllowAndRemember => {
                if let Err(e) = self.store.add_rule(&suggested).await {
                    tracing::warn!(
                        tool = %tool_name,
                        error = %e,
                        "Failed to persist approval rule, allowing once"
                    );
                    return GateDecision::Approved { remembered: false };
                }
                GateDecision::Approved { remembered: true }
            }
        }
    }
}
