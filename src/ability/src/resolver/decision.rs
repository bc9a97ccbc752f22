//! Ability decisions

use serde::Serialize;

use super::action::{Action, ResourceKind};
use super::rules::RuleId;

/// Outcome of one ability check
///
/// A deny never says whether a rule was registered: both "no rule" and
/// "rule evaluated false" produce `allowed == false` with `rule == None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Decision {
    /// Whether the action is permitted
    pub allowed: bool,

    pub action: Action,

    pub resource_kind: ResourceKind,

    /// Rule that granted the action
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<RuleId>,
}

impl Decision {
    /// Allow decision
    pub fn allow(rule: RuleId, action: Action, resource_kind: ResourceKind) -> Self {
        Self {
            allowed: true,
            action,
            resource_kind,
            rule: Some(rule),
        }
    }

    /// Deny decision
    pub fn deny(action: Action, resource_kind: ResourceKind) -> Self {
        Self {
            allowed: false,
            action,
            resource_kind,
            rule: None,
        }
    }
}
