//! Resource -> organization resolution and ACL aggregation

use std::collections::{BTreeMap, BTreeSet};

use super::types::{Acl, AclCategory, Capability, GovernedResource};
use crate::types::{Organization, OrganizationId};

/// Organization visible in the current session, paired with the ACL that applies to it
#[derive(Debug, Clone, Copy)]
pub struct VisibleOrganization<'a> {
    pub organization: &'a Organization,
    pub acl: &'a Acl,
}

impl VisibleOrganization<'_> {
    /// Check one ACL flag of this organization
    pub fn allows(&self, category: AclCategory, capability: Capability) -> bool {
        acl_allows(self.acl, category, capability)
    }
}

/// Active organizations gating Impac! checks in one session
///
/// Organizations arrive already scoped to the session's impersonator (see
/// [`Organization::scoped_for`]), so each one contributes its `acl`. Built
/// once per ability and reused for every Impac! check. Building it again
/// from the same inputs yields the same set.
#[derive(Debug, Clone, Default)]
pub struct VisibleOrganizations<'a> {
    entries: BTreeMap<&'a str, VisibleOrganization<'a>>,
}

impl<'a> VisibleOrganizations<'a> {
    /// Keep the active organizations
    ///
    /// Callers pass only the organizations the actor belongs to.
    pub fn collect<I>(organizations: I) -> Self
    where
        I: IntoIterator<Item = &'a Organization>,
    {
        let entries = organizations
            .into_iter()
            .filter(|organization| organization.active)
            .map(|organization| {
                let acl = &organization.acl;
                (organization.id.as_str(), VisibleOrganization { organization, acl })
            })
            .collect();

        Self { entries }
    }

    pub fn get(&self, id: &str) -> Option<&VisibleOrganization<'a>> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Read `related.<category>.<capability>` from an ACL, defaulting to `false`
pub fn acl_allows(acl: &Acl, category: AclCategory, capability: Capability) -> bool {
    acl.capability(category, capability)
}

/// Visible organizations a resource belongs to, de-duplicated
pub fn organizations_of<'v, 'a, R>(resource: &R, visible: &'v VisibleOrganizations<'a>) -> Vec<&'v VisibleOrganization<'a>>
where
    R: GovernedResource + ?Sized,
{
    distinct_ids(resource)
        .into_iter()
        .filter_map(|id| visible.get(id))
        .collect()
}

/// True when every organization the resource belongs to grants `capability`
///
/// A resource with no organizations is denied. An owning organization
/// outside the visible set contributes no ACL and therefore denies.
pub fn all_grant<R>(resource: &R, visible: &VisibleOrganizations<'_>, capability: Capability) -> bool
where
    R: GovernedResource + ?Sized,
{
    let ids = distinct_ids(resource);
    if ids.is_empty() {
        return false;
    }

    ids.into_iter().all(|id| {
        visible
            .get(id)
            .is_some_and(|organization| organization.allows(R::CATEGORY, capability))
    })
}

fn distinct_ids<R>(resource: &R) -> BTreeSet<&str>
where
    R: GovernedResource + ?Sized,
{
    resource
        .organization_ids()
        .iter()
        .map(OrganizationId::as_str)
        .collect()
}
