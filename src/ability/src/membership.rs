//! Role and team membership lookups
//!
//! Pure reads over an already-loaded [`Actor`]. These answer the questions
//! the ability rules ask: which role does the actor hold in an organization,
//! and which app instances do the actor's teams open up.

use std::collections::BTreeSet;

use crate::types::{Actor, AppInstanceId, OrgRole, Team};

/// Role the actor holds in an organization, `None` when not a member
pub fn role_of(actor: &Actor, organization_id: &str) -> Option<OrgRole> {
    actor.organization_roles.get(organization_id).copied()
}

/// True when the actor holds any role in the organization
pub fn is_member(actor: &Actor, organization_id: &str) -> bool {
    role_of(actor, organization_id).is_some()
}

/// True when the actor's role in the organization is at least `minimum`
pub fn has_role_at_least(actor: &Actor, organization_id: &str, minimum: OrgRole) -> bool {
    role_of(actor, organization_id).is_some_and(|role| role.at_least(minimum))
}

pub fn teams_of(actor: &Actor) -> &[Team] {
    &actor.teams
}

/// App instances opened up by a set of teams, de-duplicated
pub fn owned_app_instances<'a, I>(teams: I) -> BTreeSet<&'a str>
where
    I: IntoIterator<Item = &'a Team>,
{
    teams
        .into_iter()
        .flat_map(|team| team.app_instance_ids.iter().map(AppInstanceId::as_str))
        .collect()
}
