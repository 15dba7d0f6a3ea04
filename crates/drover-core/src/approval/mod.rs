//! Approval rules and the confirmation gate
//!
//! Every tool call that asks for confirmation passes through the
//! [`ConfirmationGate`]. The gate first looks for a persisted
//! [`ApprovalRule`] that exempts the call, and only then asks the
//! caller-supplied [`ConfirmationHandler`].
//!
//! Rules are stored as one list under a single storage key. All writes go
//! through [`ApprovalStore`], which serializes them so parallel confirmations
//! in the same turn cannot lose each other's updates.

mod gate;
mod handler;
mod matcher;
mod request;
mod rule;
mod store;


pub use gate::{ConfirmationGate, GateDecision};
pub use handler::{
    AutoApproveHandler, AutoDenyHandler, CallbackHandler, ConfirmationHandler,
    SharedConfirmationHandler,
};
pub use matcher::{command_matches, WILDCARD_SUFFIX};
pub use request::{ConfirmationDetails, ConfirmationOutcome, ConfirmationRequest};
pub use rule::{ApprovalRule, ApprovalRuleType, RuleSpec};
pub use store::ApprovalStore;

#[cfg(test)]
pub use handler::MockConfirmationHandler;
