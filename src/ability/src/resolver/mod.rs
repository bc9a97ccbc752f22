//! Ability resolver
//!
//! Decides whether an actor may perform an action on a resource.
//!
//! # Architecture
//!
//! ```text
//! (actor, context, organizations) → Ability::new → VisibleOrganizations + RuleSet
//!                                                         ↓
//! (action, resource) → RuleSet::matching → Rule::evaluate → Decision
//! ```
//!
//! An ability is built for one actor and one session, answers any number
//! of checks, and is then dropped. It holds no interior state, so checks
//! against separate abilities can run on separate threads without locking.

pub mod action;
pub mod decision;
pub mod rules;

pub use action::{Action, Resource, ResourceKind};
pub use decision::Decision;
pub use rules::{Predicate, Rule, RuleId, RuleSet};

use tracing::debug;

use crate::acl::VisibleOrganizations;
use crate::config::AbilityConfig;
use crate::error::Result;
use crate::membership::is_member;
use crate::types::{Actor, Organization, SessionContext};

/// Abilities of one actor within one session
#[derive(Debug, Clone)]
pub struct Ability<'a> {
    actor: &'a Actor,
    context: &'a SessionContext,
    visible: VisibleOrganizations<'a>,
    rules: RuleSet,
    config: AbilityConfig,
}

impl<'a> Ability<'a> {
    /// Build the abilities of `actor` with the default configuration
    ///
    /// `organizations` are the loaded organizations the actor may belong to,
    /// with ACLs already scoped to `context` (as an [`OrganizationDirectory`]
    /// returns them). Only active organizations the actor holds a role in
    /// gate Impac! checks.
    ///
    /// [`OrganizationDirectory`]: crate::directory::OrganizationDirectory
    pub fn new(actor: &'a Actor, context: &'a SessionContext, organizations: &'a [Organization]) -> Self {
        Self::with_config(actor, context, organizations, AbilityConfig::default())
    }

    pub fn with_config(
        actor: &'a Actor,
        context: &'a SessionContext,
        organizations: &'a [Organization],
        config: AbilityConfig,
    ) -> Self {
        let visible = VisibleOrganizations::collect(
            organizations
                .iter()
                .filter(|organization| is_member(actor, &organization.id)),
        );

        Self {
            actor,
            context,
            visible,
            rules: RuleSet::for_actor(actor),
            config,
        }
    }

    /// Whether `action` is permitted on `resource`
    pub fn can<'r>(&self, action: Action, resource: impl Into<Resource<'r>>) -> bool {
        self.check(action, resource).allowed
    }

    /// Negation of [`Ability::can`]
    pub fn cannot<'r>(&self, action: Action, resource: impl Into<Resource<'r>>) -> bool {
        !self.can(action, resource)
    }

    /// Check an action given by name
    ///
    /// Fails with [`AbilityError::UnknownAction`](crate::AbilityError::UnknownAction)
    /// when the name matches no action at all.
    pub fn can_named<'r>(&self, action: &str, resource: impl Into<Resource<'r>>) -> Result<bool> {
        let action = action.parse::<Action>()?;
        Ok(self.can(action, resource))
    }

    /// Evaluate `action` on `resource` and report the granting rule
    pub fn check<'r>(&self, action: Action, resource: impl Into<Resource<'r>>) -> Decision {
        let resource = resource.into();
        let kind = resource.kind();

        let granted = self
            .rules
            .matching(action, kind)
            .find(|rule| rule.evaluate(self.actor, &self.visible, &resource));

        let decision = match granted {
            Some(rule) => Decision::allow(rule.id, action, kind),
            None => Decision::deny(action, kind),
        };

        if self.config.log_decisions {
            debug!(
                actor = self.actor.id.as_deref().unwrap_or("guest"),
                impersonator = self.context.impersonator_id.as_deref(),
                action = %action,
                resource_kind = %kind,
                resource_id = resource.id(),
                rule = decision.rule,
                allowed = decision.allowed,
                "ability check"
            );
        }

        decision
    }

    pub fn actor(&self) -> &'a Actor {
        self.actor
    }

    pub fn context(&self) -> &'a SessionContext {
        self.context
    }

    /// Organizations gating Impac! checks in this session
    pub fn visible_organizations(&self) -> &VisibleOrganizations<'a> {
        &self.visible
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }
}

/// One-shot check: build an ability and evaluate a single action
pub fn can<'r>(
    actor: &Actor,
    context: &SessionContext,
    organizations: &[Organization],
    action: Action,
    resource: impl Into<Resource<'r>>,
) -> bool {
    Ability::new(actor, context, organizations).can(action, resource)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acl::{Acl, AclCategory, Capability};
    use crate::types::{AppInstance, Dashboard};

    #[test]
    fn test_guest_is_denied_everything_but_creation() {
        let guest = Actor::guest();
        let context = SessionContext::new();
        let org = Organization::new("org-1");
        let ability = Ability::new(&guest, &context, std::slice::from_ref(&org));

        assert!(ability.can(Action::Create, &org));
        for action in Action::ALL.into_iter().filter(|a| *a != Action::Create) {
            assert!(ability.cannot(action, &org), "guest allowed {}", action);
        }
        assert!(ability.cannot(Action::Access, &AppInstance::new("app-1", "org-1")));
    }

    #[test]
    fn test_check_reports_granting_rule() {
        let actor = Actor::new("usr-1").with_role("org-1", "Admin");
        let context = SessionContext::new();
        let org = Organization::new("org-1");
        let ability = Ability::new(&actor, &context, std::slice::from_ref(&org));

        let decision = ability.check(Action::InviteMember, &org);
        assert!(decision.allowed);
        assert_eq!(decision.rule, Some("organization.invite_member"));

        let decision = ability.check(Action::Destroy, &org);
        assert!(!decision.allowed);
        assert_eq!(decision.rule, None);
    }

    #[test]
    fn test_unregistered_pair_is_indistinguishable_from_deny() {
        let actor = Actor::new("usr-1").with_role("org-1", "Super Admin");
        let context = SessionContext::new();
        let org = Organization::new("org-1");
        let ability = Ability::new(&actor, &context, std::slice::from_ref(&org));

        let unregistered = ability.check(Action::Access, &org);
        let evaluated_false = ability.check(Action::Access, &AppInstance::new("app-1", "org-2"));

        assert_eq!(unregistered.allowed, evaluated_false.allowed);
        assert_eq!(unregistered.rule, evaluated_false.rule);
    }

    #[test]
    fn test_can_named() {
        let actor = Actor::new("usr-1").with_role("org-1", "Admin");
        let context = SessionContext::new();
        let org = Organization::new("org-1");
        let ability = Ability::new(&actor, &context, std::slice::from_ref(&org));

        assert!(ability.can_named("upload", &org).unwrap());
        assert!(!ability.can_named("manage_billing", &org).unwrap());
        assert!(ability.can_named("teleport", &org).is_err());
    }

    #[test]
    fn test_visible_set_requires_membership() {
        let actor = Actor::new("usr-1").with_role("org-1", "Member");
        let context = SessionContext::new();
        let orgs = vec![
            Organization::new("org-1").with_acl(Acl::new().grant_all(AclCategory::Dashboards)),
            Organization::new("org-2").with_acl(Acl::new().grant_all(AclCategory::Dashboards)),
        ];
        let ability = Ability::new(&actor, &context, &orgs);

        assert_eq!(ability.visible_organizations().ids().collect::<Vec<_>>(), vec!["org-1"]);
        assert!(ability.can(
            Action::impac(AclCategory::Dashboards, Capability::Create),
            &Dashboard::new("d1").with_organization("org-1")
        ));
        assert!(!ability.can(
            Action::CreateImpacDashboards,
            &Dashboard::new("d2").with_organization("org-2")
        ));
    }

    #[test]
    fn test_one_shot_can() {
        let actor = Actor::new("usr-1").with_role("org-1", "Super Admin");
        let org = Organization::new("org-1");

        assert!(can(&actor, &SessionContext::new(), &[], Action::ManageBilling, &org));
    }
}
