//! Ability configuration

use serde::{Deserialize, Serialize};

/// Ability resolution configuration
///
/// Controls diagnostics and how the service treats unknown users. The rule
/// set itself is fixed and not configurable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbilityConfig {
    /// Emit a debug event for every decision
    pub log_decisions: bool,

    /// Evaluate unknown user ids as the guest actor instead of failing
    pub guest_on_missing_actor: bool,
}

impl Default for AbilityConfig {
    fn default() -> Self {
        Self {
            log_decisions: true,
            guest_on_missing_actor: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: AbilityConfig =
            serde_json::from_str(r#"{ "guest_on_missing_actor": false }"#).unwrap();

        assert!(config.log_decisions);
        assert!(!config.guest_on_missing_actor);
    }
}
