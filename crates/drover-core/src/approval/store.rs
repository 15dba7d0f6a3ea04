//! Persisted approval rules

use chrono::Utc;
use tokio::sync::Mutex;

use super::matcher::command_matches;
use super::request::ConfirmationRequest;
use super::rule::{ApprovalRule, ApprovalRuleType, RuleSpec};
use crate::config::DEFAULT_APPROVAL_RULES_KEY;
use crate::error::DroverResult;
use crate::storage::{SharedStorage, StorageExt};

/// Read-modify-write access to the rule list kept under one storage key
///
/// Writers are serialized by an internal single-writer lock. Reads do not
/// take the lock.
pub struct ApprovalStore {
    storage: SharedStorage,
    key: String,
    write_lock: Mutex<()>,
}

impl ApprovalStore {
    /// Create a store over `storage` using the default key
    pub fn new(storage: SharedStorage) -> Self {
        Self::with_key(storage, DEFAULT_APPROVAL_RULES_KEY)
    }

    /// Create a store over `storage` using a custom key
    pub fn with_key(storage: SharedStorage, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Storage key holding the rule list
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load every persisted rule; a missing key means no rules
    pub async fn load_rules(&self) -> DroverResult<Vec<ApprovalRule>> {
        Ok(self
            .storage
            .get::<Vec<ApprovalRule>>(&self.key)
            .await?
            .unwrap_or_default())
    }

    /// Replace the whole rule list
    pub async fn save_rules(&self, rules: &[ApprovalRule]) -> DroverResult<()> {
        let _guard = self.write_lock.lock().await;
        self.persist(rules).await
    }

    /// Persist a rule for `spec` unless one with the same `(type, value)`
    /// already exists. Returns the new rule, or `None` for a duplicate.
    pub async fn add_rule(&self, spec: &RuleSpec) -> DroverResult<Option<ApprovalRule>> {
        let _guard = self.write_lock.lock().await;
        let mut rules = self.load_rules().await?;

        if rules.iter().any(|rule| rule.same_identity(spec)) {
            tracing::debug!(rule_type = %spec.rule_type, value = %spec.value, "Approval rule already exists");
            return Ok(None);
        }

        let rule = ApprovalRule::from_spec(spec);
        rules.push(rule.clone());
        self.persist(&rules).await?;
        tracing::debug!(id = %rule.id, rule_type = %rule.rule_type, value = %rule.value, "Added approval rule");
        Ok(Some(rule))
    }

    /// Remove a rule by id. Returns whether a rule was removed.
    pub async fn remove_rule(&self, id: &str) -> DroverResult<bool> {
        let _guard = self.write_lock.lock().await;
        let mut rules = self.load_rules().await?;
        let before = rules.len();
        rules.retain(|rule| rule.id != id);

        if rules.len() == before {
            return Ok(false);
        }

        self.persist(&rules).await?;
        tracing::debug!(id = id, "Removed approval rule");
        Ok(true)
    }

    /// Remove every rule
    pub async fn clear_all(&self) -> DroverResult<()> {
        let _guard = self.write_lock.lock().await;
        self.persist(&[]).await?;
        tracing::debug!("Cleared all approval rules");
        Ok(())
    }

    /// All rules, oldest first
    pub async fn list_rules(&self) -> DroverResult<Vec<ApprovalRule>> {
        let mut rules = self.load_rules().await?;
        rules.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(rules)
    }

    /// Update the `lastUsed` timestamp of a rule
    pub async fn touch(&self, id: &str) -> DroverResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut rules = self.load_rules().await?;
        let Some(rule) = rules.iter_mut().find(|rule| rule.id == id) else {
            return Ok(());
        };
        rule.last_used = Some(Utc::now());
        self.persist(&rules).await
    }

    /// First rule exempting `request`, consulting rule types in
    /// [`ApprovalRuleType::MATCH_ORDER`]
    pub async fn find_match(&self, request: &ConfirmationRequest) -> DroverResult<Option<ApprovalRule>> {
        let rules = self.load_rules().await?;

        for rule_type in ApprovalRuleType::MATCH_ORDER {
            let found = rules
                .iter()
                .filter(|rule| rule.rule_type == rule_type)
                .find(|rule| rule_covers(rule, request));
            if let Some(rule) = found {
                return Ok(Some(rule.clone()));
            }
        }

        Ok(None)
    }

    async fn persist(&self, rules: &[ApprovalRule]) -> DroverResult<()> {
        self.storage.set(&self.key, &rules).await
    }
}

fn rule_covers(rule: &ApprovalRule, request: &ConfirmationRequest) -> bool {
    match rule.rule_type {
        ApprovalRuleType::ToolName => rule.value == request.tool_name,
        ApprovalRuleType::ToolKind => rule.value == request.tool_kind.as_str(),
        ApprovalRuleType::CommandPattern => request
            .details
            .command
            .as_deref()
            .is_some_and(|command| command_matches(&rule.value, command)),
        ApprovalRuleType::McpServer => request
            .details
            .mcp_server
            .as_deref()
            .is_some_and(|server| server == rule.value),
    }
}
