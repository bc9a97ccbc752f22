//! Domain objects evaluated by the ability resolver
//!
//! Everything here arrives already loaded. The resolver only reads these
//! values; it never fetches or mutates them.

use crate::acl::{Acl, AclCategory, GovernedResource};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

/// Unique user identifier
pub type UserId = String;

/// Unique organization identifier
pub type OrganizationId = String;

/// Unique team identifier
pub type TeamId = String;

/// Unique app instance identifier
pub type AppInstanceId = String;

/// Platform-wide administrative role, independent of any organization
///
/// Parsed case-insensitively; unrecognised values are [`AdminRole::None`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AdminRole {
    /// Regular user
    #[default]
    None,
    /// Platform staff
    Staff,
    /// Administrator of a sub-tenant
    SubTenantAdmin,
    /// Platform administrator
    Admin,
}

impl AdminRole {
    /// Parse an admin role, ignoring ASCII case
    ///
    /// Surrounding whitespace is not stripped: `" staff "` is no role.
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("admin") {
            Self::Admin
        } else if value.eq_ignore_ascii_case("staff") {
            Self::Staff
        } else if value.eq_ignore_ascii_case("sub_tenant_admin") {
            Self::SubTenantAdmin
        } else {
            Self::None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "",
            Self::Staff => "staff",
            Self::SubTenantAdmin => "sub_tenant_admin",
            Self::Admin => "admin",
        }
    }

    /// Admin or staff: may manage app instances of any organization
    pub fn is_platform_operator(&self) -> bool {
        matches!(self, Self::Admin | Self::Staff)
    }
}

impl From<String> for AdminRole {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<&str> for AdminRole {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<AdminRole> for String {
    fn from(role: AdminRole) -> Self {
        role.as_str().to_string()
    }
}

/// Role held by a user inside one organization
///
/// Ordered by privilege: `Member < Admin < SuperAdmin`. Parsing is exact:
/// only `"Super Admin"` and `"Admin"` are privileged, every other present
/// value (including the empty string) is a plain membership.
///
/// Serialization is lossy for unprivileged roles: a stored `"Viewer"` is
/// written back as `"Member"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrgRole {
    Member,
    Admin,
    SuperAdmin,
}

impl OrgRole {
    pub fn parse(value: &str) -> Self {
        match value {
            "Super Admin" => Self::SuperAdmin,
            "Admin" => Self::Admin,
            _ => Self::Member,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Member => "Member",
            Self::Admin => "Admin",
            Self::SuperAdmin => "Super Admin",
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Member => 0,
            Self::Admin => 1,
            Self::SuperAdmin => 2,
        }
    }

    /// True when this role grants at least the privileges of `minimum`
    pub fn at_least(&self, minimum: OrgRole) -> bool {
        *self >= minimum
    }
}

impl PartialOrd for OrgRole {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrgRole {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl fmt::Display for OrgRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for OrgRole {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<&str> for OrgRole {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<OrgRole> for String {
    fn from(role: OrgRole) -> Self {
        role.as_str().to_string()
    }
}

/// Team of users, optionally restricted to a set of app instances
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,

    /// App instances visible to the team's members
    #[serde(default)]
    pub app_instance_ids: Vec<AppInstanceId>,
}

impl Team {
    pub fn new(id: impl Into<TeamId>) -> Self {
        Self {
            id: id.into(),
            app_instance_ids: Vec::new(),
        }
    }

    /// Grant the team access to an app instance
    pub fn with_app_instance(mut self, id: impl Into<AppInstanceId>) -> Self {
        self.app_instance_ids.push(id.into());
        self
    }
}

/// User whose abilities are evaluated
///
/// Anonymous visitors are represented by [`Actor::guest`], never by an
/// absent value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// `None` for the guest actor
    #[serde(default)]
    pub id: Option<UserId>,

    #[serde(default)]
    pub admin_role: AdminRole,

    /// Organization id -> role held in that organization
    #[serde(default)]
    pub organization_roles: HashMap<OrganizationId, OrgRole>,

    #[serde(default)]
    pub teams: Vec<Team>,
}

impl Actor {
    /// Create an actor with no roles and no teams
    pub fn new(id: impl Into<UserId>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Zero-privilege actor used when no user is signed in
    pub fn guest() -> Self {
        Self::default()
    }

    pub fn is_guest(&self) -> bool {
        self.id.is_none()
    }

    pub fn with_admin_role(mut self, role: impl Into<AdminRole>) -> Self {
        self.admin_role = role.into();
        self
    }

    /// Assign a role in an organization
    pub fn with_role(mut self, organization_id: impl Into<OrganizationId>, role: impl Into<OrgRole>) -> Self {
        self.organization_roles.insert(organization_id.into(), role.into());
        self
    }

    pub fn with_team(mut self, team: Team) -> Self {
        self.teams.push(team);
        self
    }
}

/// Session-scoped data threaded through every check
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    /// Set while a support user is impersonating the actor
    #[serde(default)]
    pub impersonator_id: Option<UserId>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn impersonated_by(impersonator_id: impl Into<UserId>) -> Self {
        Self {
            impersonator_id: Some(impersonator_id.into()),
        }
    }
}

/// Organization (tenant) with its access control list
///
/// Carries no member list: roles are read from [`Actor::organization_roles`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: OrganizationId,

    #[serde(default)]
    pub name: String,

    #[serde(default = "default_active")]
    pub active: bool,

    /// ACL in effect for the session the organization was loaded for
    #[serde(default)]
    pub acl: Acl,

    /// Stored ACL per impersonating support user, applied by [`Organization::scoped_for`]
    #[serde(default)]
    pub impersonator_acls: HashMap<UserId, Acl>,
}

fn default_active() -> bool {
    true
}

impl Organization {
    pub fn new(id: impl Into<OrganizationId>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            active: true,
            acl: Acl::default(),
            impersonator_acls: HashMap::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn with_acl(mut self, acl: Acl) -> Self {
        self.acl = acl;
        self
    }

    /// ACL used while `impersonator_id` is impersonating a member
    pub fn with_impersonator_acl(mut self, impersonator_id: impl Into<UserId>, acl: Acl) -> Self {
        self.impersonator_acls.insert(impersonator_id.into(), acl);
        self
    }

    /// ACL visible under the given impersonation scope
    ///
    /// Without impersonation this is the organization's own ACL. While
    /// impersonating, only the impersonator's ACL applies; an impersonator
    /// with no entry sees nothing.
    pub fn acl_for(&self, impersonator_id: Option<&UserId>) -> Option<&Acl> {
        match impersonator_id {
            None => Some(&self.acl),
            Some(id) => self.impersonator_acls.get(id),
        }
    }

    /// Copy of this organization as loaded for an impersonation scope
    ///
    /// The scoped ACL is placed in `acl`. `None` when the impersonator has
    /// no entry, so the organization is not loaded at all.
    pub fn scoped_for(&self, impersonator_id: Option<&UserId>) -> Option<Self> {
        let acl = self.acl_for(impersonator_id)?.clone();
        Some(Self {
            id: self.id.clone(),
            name: self.name.clone(),
            active: self.active,
            acl,
            impersonator_acls: HashMap::new(),
        })
    }
}

/// App instance provisioned for exactly one organization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppInstance {
    pub id: AppInstanceId,

    /// Owning organization
    pub owner_id: OrganizationId,
}

impl AppInstance {
    pub fn new(id: impl Into<AppInstanceId>, owner_id: impl Into<OrganizationId>) -> Self {
        Self {
            id: id.into(),
            owner_id: owner_id.into(),
        }
    }
}

macro_rules! impac_resource {
    ($(#[$doc:meta])* $name:ident, $category:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        pub struct $name {
            pub id: String,

            /// Organizations the resource reports on
            #[serde(default)]
            pub organization_ids: Vec<OrganizationId>,
        }

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self {
                    id: id.into(),
                    organization_ids: Vec::new(),
                }
            }

            pub fn with_organization(mut self, organization_id: impl Into<OrganizationId>) -> Self {
                self.organization_ids.push(organization_id.into());
                self
            }
        }

        impl GovernedResource for $name {
            const CATEGORY: AclCategory = $category;

            fn organization_ids(&self) -> &[OrganizationId] {
                &self.organization_ids
            }
        }
    };
}

impac_resource!(
    /// Impac! dashboard
    Dashboard,
    AclCategory::Dashboards
);

impac_resource!(
    /// Widget placed on an Impac! dashboard
    Widget,
    AclCategory::Widgets
);

impac_resource!(
    /// Impac! key performance indicator
    Kpi,
    AclCategory::Kpis
);
