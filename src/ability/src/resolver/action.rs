//! Actions and the resources they apply to

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::acl::{AclCategory, Capability};
use crate::error::{AbilityError, Result};
use crate::types::{Actor, AppInstance, Dashboard, Kpi, Organization, Widget};

/// Action an actor attempts on a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Create,
    Read,
    Update,
    Destroy,
    ManageBilling,
    Upload,
    Purchase,
    InviteMember,
    Administrate,
    ManageAppInstances,
    ManageTeams,
    SyncApps,
    CheckAppsSync,
    Access,
    CreateImpacDashboards,
    UpdateImpacDashboards,
    DestroyImpacDashboards,
    CreateImpacWidgets,
    UpdateImpacWidgets,
    DestroyImpacWidgets,
    CreateImpacKpis,
    UpdateImpacKpis,
    DestroyImpacKpis,
    AssignAdminRole,
}

impl Action {
    pub const ALL: [Action; 24] = [
        Self::Create,
        Self::Read,
        Self::Update,
        Self::Destroy,
        Self::ManageBilling,
        Self::Upload,
        Self::Purchase,
        Self::InviteMember,
        Self::Administrate,
        Self::ManageAppInstances,
        Self::ManageTeams,
        Self::SyncApps,
        Self::CheckAppsSync,
        Self::Access,
        Self::CreateImpacDashboards,
        Self::UpdateImpacDashboards,
        Self::DestroyImpacDashboards,
        Self::CreateImpacWidgets,
        Self::UpdateImpacWidgets,
        Self::DestroyImpacWidgets,
        Self::CreateImpacKpis,
        Self::UpdateImpacKpis,
        Self::DestroyImpacKpis,
        Self::AssignAdminRole,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Destroy => "destroy",
            Self::ManageBilling => "manage_billing",
            Self::Upload => "upload",
            Self::Purchase => "purchase",
            Self::InviteMember => "invite_member",
            Self::Administrate => "administrate",
            Self::ManageAppInstances => "manage_app_instances",
            Self::ManageTeams => "manage_teams",
            Self::SyncApps => "sync_apps",
            Self::CheckAppsSync => "check_apps_sync",
            Self::Access => "access",
            Self::CreateImpacDashboards => "create_impac_dashboards",
            Self::UpdateImpacDashboards => "update_impac_dashboards",
            Self::DestroyImpacDashboards => "destroy_impac_dashboards",
            Self::CreateImpacWidgets => "create_impac_widgets",
            Self::UpdateImpacWidgets => "update_impac_widgets",
            Self::DestroyImpacWidgets => "destroy_impac_widgets",
            Self::CreateImpacKpis => "create_impac_kpis",
            Self::UpdateImpacKpis => "update_impac_kpis",
            Self::DestroyImpacKpis => "destroy_impac_kpis",
            Self::AssignAdminRole => "assign_admin_role",
        }
    }

    /// Impac! action gating `capability` on `category`
    pub fn impac(category: AclCategory, capability: Capability) -> Self {
        match (category, capability) {
            (AclCategory::Dashboards, Capability::Create) => Self::CreateImpacDashboards,
            (AclCategory::Dashboards, Capability::Update) => Self::UpdateImpacDashboards,
            (AclCategory::Dashboards, Capability::Destroy) => Self::DestroyImpacDashboards,
            (AclCategory::Widgets, Capability::Create) => Self::CreateImpacWidgets,
            (AclCategory::Widgets, Capability::Update) => Self::UpdateImpacWidgets,
            (AclCategory::Widgets, Capability::Destroy) => Self::DestroyImpacWidgets,
            (AclCategory::Kpis, Capability::Create) => Self::CreateImpacKpis,
            (AclCategory::Kpis, Capability::Update) => Self::UpdateImpacKpis,
            (AclCategory::Kpis, Capability::Destroy) => Self::DestroyImpacKpis,
        }
    }

    /// Inverse of [`Action::impac`]
    pub fn impac_parts(&self) -> Option<(AclCategory, Capability)> {
        let parts = match self {
            Self::CreateImpacDashboards => (AclCategory::Dashboards, Capability::Create),
            Self::UpdateImpacDashboards => (AclCategory::Dashboards, Capability::Update),
            Self::DestroyImpacDashboards => (AclCategory::Dashboards, Capability::Destroy),
            Self::CreateImpacWidgets => (AclCategory::Widgets, Capability::Create),
            Self::UpdateImpacWidgets => (AclCategory::Widgets, Capability::Update),
            Self::DestroyImpacWidgets => (AclCategory::Widgets, Capability::Destroy),
            Self::CreateImpacKpis => (AclCategory::Kpis, Capability::Create),
            Self::UpdateImpacKpis => (AclCategory::Kpis, Capability::Update),
            Self::DestroyImpacKpis => (AclCategory::Kpis, Capability::Destroy),
            _ => return None,
        };
        Some(parts)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = AbilityError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| AbilityError::UnknownAction(s.to_string()))
    }
}

/// Resource type a rule is registered for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Organization,
    AppInstance,
    Dashboard,
    Widget,
    Kpi,
    User,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 6] = [
        Self::Organization,
        Self::AppInstance,
        Self::Dashboard,
        Self::Widget,
        Self::Kpi,
        Self::User,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Organization => "organization",
            Self::AppInstance => "app_instance",
            Self::Dashboard => "dashboard",
            Self::Widget => "widget",
            Self::Kpi => "kpi",
            Self::User => "user",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = AbilityError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| AbilityError::UnknownResourceKind(s.to_string()))
    }
}

/// Borrowed resource an action is checked against
#[derive(Debug, Clone, Copy)]
pub enum Resource<'a> {
    Organization(&'a Organization),
    AppInstance(&'a AppInstance),
    Dashboard(&'a Dashboard),
    Widget(&'a Widget),
    Kpi(&'a Kpi),
    /// Platform user managed from the admin panel
    User(&'a Actor),
}

impl Resource<'_> {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Organization(_) => ResourceKind::Organization,
            Self::AppInstance(_) => ResourceKind::AppInstance,
            Self::Dashboard(_) => ResourceKind::Dashboard,
            Self::Widget(_) => ResourceKind::Widget,
            Self::Kpi(_) => ResourceKind::Kpi,
            Self::User(_) => ResourceKind::User,
        }
    }

    /// Identifier of the underlying resource, if it has one
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Organization(org) => Some(org.id.as_str()),
            Self::AppInstance(instance) => Some(instance.id.as_str()),
            Self::Dashboard(dashboard) => Some(dashboard.id.as_str()),
            Self::Widget(widget) => Some(widget.id.as_str()),
            Self::Kpi(kpi) => Some(kpi.id.as_str()),
            Self::User(user) => user.id.as_deref(),
        }
    }
}

macro_rules! impl_from_resource {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl<'a> From<&'a $ty> for Resource<'a> {
                fn from(value: &'a $ty) -> Self {
                    Resource::$variant(value)
                }
            }
        )*
    };
}

impl_from_resource! {
    Organization => Organization,
    AppInstance => AppInstance,
    Dashboard => Dashboard,
    Widget => Widget,
    Kpi => Kpi,
    User => Actor,
}
