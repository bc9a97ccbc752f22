//! The closed ability rule table
//!
//! Each rule is an (action, resource kind, predicate) triple. Rules sharing
//! an action and resource kind are OR-combined; an action with no rule for a
//! resource kind is denied.

use tracing::trace;

use super::action::{Action, Resource, ResourceKind};
use crate::acl::{all_grant, Capability, VisibleOrganizations};
use crate::membership::{has_role_at_least, is_member, owned_app_instances, role_of, teams_of};
use crate::types::{Actor, AdminRole, AppInstance, OrgRole};

/// Stable rule identifier reported in decisions
pub type RuleId = &'static str;

/// Condition a rule checks against the actor and resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    /// Granted to every actor
    Always,
    /// Actor holds any role in the organization
    Member,
    /// Actor's organization role is at least the given role
    RoleAtLeast(OrgRole),
    /// Owner-organization role combined with team restrictions
    AppInstanceAccess,
    /// Every organization of an Impac! resource grants the capability
    ImpacAcl(Capability),
    /// Actor's platform admin role is one of the listed roles
    AdminRoleIn(&'static [AdminRole]),
}

/// Ability rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub id: RuleId,
    pub action: Action,
    pub kind: ResourceKind,
    pub predicate: Predicate,
}

impl Rule {
    const fn new(id: RuleId, action: Action, kind: ResourceKind, predicate: Predicate) -> Self {
        Self {
            id,
            action,
            kind,
            predicate,
        }
    }

    pub fn applies_to(&self, action: Action, kind: ResourceKind) -> bool {
        self.action == action && self.kind == kind
    }

    /// Evaluate the predicate; a resource of the wrong shape never passes
    pub fn evaluate(&self, actor: &Actor, visible: &VisibleOrganizations<'_>, resource: &Resource<'_>) -> bool {
        let granted = match (self.predicate, resource) {
            (Predicate::Always, _) => true,
            (Predicate::Member, Resource::Organization(org)) => is_member(actor, &org.id),
            (Predicate::RoleAtLeast(minimum), Resource::Organization(org)) => {
                has_role_at_least(actor, &org.id, minimum)
            }
            (Predicate::AppInstanceAccess, Resource::AppInstance(instance)) => {
                can_access_app_instance(actor, instance)
            }
            (Predicate::ImpacAcl(capability), Resource::Dashboard(dashboard)) => {
                all_grant(*dashboard, visible, capability)
            }
            (Predicate::ImpacAcl(capability), Resource::Widget(widget)) => {
                all_grant(*widget, visible, capability)
            }
            (Predicate::ImpacAcl(capability), Resource::Kpi(kpi)) => all_grant(*kpi, visible, capability),
            (Predicate::AdminRoleIn(roles), _) => roles.contains(&actor.admin_role),
            _ => false,
        };

        trace!(rule = self.id, granted, "rule evaluated");
        granted
    }
}

/// Admins see every app instance of their organization; members without
/// teams are unrestricted; team members only see their teams' instances.
fn can_access_app_instance(actor: &Actor, instance: &AppInstance) -> bool {
    let Some(role) = role_of(actor, &instance.owner_id) else {
        return false;
    };

    if role.at_least(OrgRole::Admin) {
        return true;
    }

    let teams = teams_of(actor);
    teams.is_empty() || owned_app_instances(teams).contains(instance.id.as_str())
}

const ORGANIZATION_RULES: &[Rule] = &[
    // Self-service organization creation
    Rule::new("organization.create", Action::Create, ResourceKind::Organization, Predicate::Always),
    Rule::new("organization.read", Action::Read, ResourceKind::Organization, Predicate::Member),
    Rule::new(
        "organization.update",
        Action::Update,
        ResourceKind::Organization,
        Predicate::RoleAtLeast(OrgRole::SuperAdmin),
    ),
    Rule::new(
        "organization.destroy",
        Action::Destroy,
        ResourceKind::Organization,
        Predicate::RoleAtLeast(OrgRole::SuperAdmin),
    ),
    Rule::new(
        "organization.manage_billing",
        Action::ManageBilling,
        ResourceKind::Organization,
        Predicate::RoleAtLeast(OrgRole::SuperAdmin),
    ),
    Rule::new(
        "organization.upload",
        Action::Upload,
        ResourceKind::Organization,
        Predicate::RoleAtLeast(OrgRole::Admin),
    ),
    Rule::new(
        "organization.purchase",
        Action::Purchase,
        ResourceKind::Organization,
        Predicate::RoleAtLeast(OrgRole::Admin),
    ),
    Rule::new(
        "organization.invite_member",
        Action::InviteMember,
        ResourceKind::Organization,
        Predicate::RoleAtLeast(OrgRole::Admin),
    ),
    Rule::new(
        "organization.administrate",
        Action::Administrate,
        ResourceKind::Organization,
        Predicate::RoleAtLeast(OrgRole::Admin),
    ),
    Rule::new(
        "organization.manage_app_instances",
        Action::ManageAppInstances,
        ResourceKind::Organization,
        Predicate::RoleAtLeast(OrgRole::Admin),
    ),
    Rule::new(
        "organization.manage_teams",
        Action::ManageTeams,
        ResourceKind::Organization,
        Predicate::RoleAtLeast(OrgRole::Admin),
    ),
    // Provisional: any member may sync until a stricter role set is agreed
    Rule::new("organization.sync_apps", Action::SyncApps, ResourceKind::Organization, Predicate::Member),
    Rule::new(
        "organization.check_apps_sync",
        Action::CheckAppsSync,
        ResourceKind::Organization,
        Predicate::Member,
    ),
];

const APP_INSTANCE_RULES: &[Rule] = &[Rule::new(
    "app_instance.access",
    Action::Access,
    ResourceKind::AppInstance,
    Predicate::AppInstanceAccess,
)];

macro_rules! impac_rules {
    ($($id:literal => $action:ident, $kind:ident, $capability:ident;)*) => {
        &[$(Rule::new($id, Action::$action, ResourceKind::$kind, Predicate::ImpacAcl(Capability::$capability)),)*]
    };
}

const IMPAC_RULES: &[Rule] = impac_rules! {
    "impac.dashboards.create" => CreateImpacDashboards, Dashboard, Create;
    "impac.dashboards.update" => UpdateImpacDashboards, Dashboard, Update;
    "impac.dashboards.destroy" => DestroyImpacDashboards, Dashboard, Destroy;
    "impac.widgets.create" => CreateImpacWidgets, Widget, Create;
    "impac.widgets.update" => UpdateImpacWidgets, Widget, Update;
    "impac.widgets.destroy" => DestroyImpacWidgets, Widget, Destroy;
    "impac.kpis.create" => CreateImpacKpis, Kpi, Create;
    "impac.kpis.update" => UpdateImpacKpis, Kpi, Update;
    "impac.kpis.destroy" => DestroyImpacKpis, Kpi, Destroy;
};

const USER_ADMINISTRATION_RULES: &[Rule] = &[
    Rule::new(
        "user.update",
        Action::Update,
        ResourceKind::User,
        Predicate::AdminRoleIn(&[AdminRole::Admin, AdminRole::SubTenantAdmin]),
    ),
    Rule::new(
        "user.assign_admin_role",
        Action::AssignAdminRole,
        ResourceKind::User,
        Predicate::AdminRoleIn(&[AdminRole::Admin]),
    ),
];

/// Platform staff may manage app instances of any organization
static PLATFORM_OPERATOR_OVERRIDE: Rule = Rule::new(
    "admin.manage_app_instances",
    Action::ManageAppInstances,
    ResourceKind::Organization,
    Predicate::Always,
);

/// Rules registered for one actor
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<&'static Rule>,
}

impl RuleSet {
    /// Rules that apply to `actor`
    ///
    /// The platform operator override is registered only for actors whose
    /// admin role is admin or staff.
    pub fn for_actor(actor: &Actor) -> Self {
        let mut rules: Vec<&'static Rule> = ORGANIZATION_RULES
            .iter()
            .chain(APP_INSTANCE_RULES)
            .chain(IMPAC_RULES)
            .chain(USER_ADMINISTRATION_RULES)
            .collect();

        if actor.admin_role.is_platform_operator() {
            rules.push(&PLATFORM_OPERATOR_OVERRIDE);
        }

        Self { rules }
    }

    /// Rules registered for an action on a resource kind, in registration order
    pub fn matching(&self, action: Action, kind: ResourceKind) -> impl Iterator<Item = &'static Rule> + '_ {
        self.rules
            .iter()
            .copied()
            .filter(move |rule| rule.applies_to(action, kind))
    }

    pub fn is_registered(&self, action: Action, kind: ResourceKind) -> bool {
        self.matching(action, kind).next().is_some()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
