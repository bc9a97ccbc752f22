//! ACL payload and the vocabulary used to query it

use crate::error::{AbilityError, Result};
use crate::types::OrganizationId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Resource family gated by an organization ACL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AclCategory {
    Dashboards,
    Widgets,
    Kpis,
}

impl AclCategory {
    pub const ALL: [AclCategory; 3] = [Self::Dashboards, Self::Widgets, Self::Kpis];

    /// Key of the category inside `acl.related`
    pub fn key(&self) -> &'static str {
        match self {
            Self::Dashboards => "dashboards",
            Self::Widgets => "widgets",
            Self::Kpis => "kpis",
        }
    }
}

impl fmt::Display for AclCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Capability flag within an ACL category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Create,
    Update,
    Destroy,
}

impl Capability {
    pub const ALL: [Capability; 3] = [Self::Create, Self::Update, Self::Destroy];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Destroy => "destroy",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Capability {
    type Err = AbilityError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.key() == s)
            .ok_or_else(|| AbilityError::InvalidInput(format!("unknown capability '{}'", s)))
    }
}

/// Organization ACL as delivered by the platform API
///
/// The payload is kept as raw JSON (`{"related": {"dashboards": {"create": true}}}`)
/// so partial or malformed documents deserialize cleanly; every lookup
/// degrades to `false` instead of failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Acl(Value);

impl Default for Acl {
    fn default() -> Self {
        Self(Value::Object(Map::new()))
    }
}

impl Acl {
    /// Create an empty ACL (denies everything)
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an arbitrary JSON payload
    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Set `related.<category>.<capability>` to true
    pub fn grant(self, category: AclCategory, capability: Capability) -> Self {
        self.with_flag(category, capability, true)
    }

    /// Grant every capability of a category
    pub fn grant_all(self, category: AclCategory) -> Self {
        Capability::ALL
            .into_iter()
            .fold(self, |acl, capability| acl.grant(category, capability))
    }

    /// Set `related.<category>.<capability>`, creating intermediate levels
    ///
    /// Levels that are present but not JSON objects are replaced.
    pub fn with_flag(mut self, category: AclCategory, capability: Capability, allowed: bool) -> Self {
        let mut root = into_object(Some(std::mem::take(&mut self.0)));
        let mut related = into_object(root.remove("related"));
        let mut flags = into_object(related.remove(category.key()));

        flags.insert(capability.key().to_string(), Value::Bool(allowed));
        related.insert(category.key().to_string(), Value::Object(flags));
        root.insert("related".to_string(), Value::Object(related));

        self.0 = Value::Object(root);
        self
    }

    /// Read `related.<category>.<capability>`
    ///
    /// Only a JSON `true` grants. Absent levels, `null`, and non-boolean
    /// values all read as `false`.
    pub fn capability(&self, category: AclCategory, capability: Capability) -> bool {
        self.0
            .get("related")
            .and_then(|related| related.get(category.key()))
            .and_then(|flags| flags.get(capability.key()))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

fn into_object(value: Option<Value>) -> Map<String, Value> {
    match value {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

/// Resource whose permissions follow the ACLs of the organizations it belongs to
pub trait GovernedResource {
    /// ACL category consulted for this resource type
    const CATEGORY: AclCategory;

    /// Organizations the resource belongs to (may contain duplicates)
    fn organization_ids(&self) -> &[OrganizationId];
}
