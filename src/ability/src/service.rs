//! Ability service
//!
//! Loads an actor and the organizations it belongs to through the
//! directories, then hands out abilities bound to that snapshot.

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::AbilityConfig;
use crate::directory::{ActorDirectory, OrganizationDirectory};
use crate::error::{AbilityError, Result};
use crate::resolver::Ability;
use crate::types::{Actor, Organization, OrganizationId, SessionContext};

/// Loaded actor, session and organizations
///
/// Owns the snapshot an [`Ability`] borrows from. Build one per request.
#[derive(Debug, Clone)]
pub struct AbilityScope {
    actor: Actor,
    context: SessionContext,
    organizations: Vec<Organization>,
    config: AbilityConfig,
}

impl AbilityScope {
    pub fn new(actor: Actor, context: SessionContext, organizations: Vec<Organization>, config: AbilityConfig) -> Self {
        Self {
            actor,
            context,
            organizations,
            config,
        }
    }

    pub fn ability(&self) -> Ability<'_> {
        Ability::with_config(&self.actor, &self.context, &self.organizations, self.config.clone())
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn organizations(&self) -> &[Organization] {
        &self.organizations
    }
}

/// Builds ability scopes from the actor and organization directories
pub struct AbilityService {
    actors: Arc<dyn ActorDirectory>,
    organizations: Arc<dyn OrganizationDirectory>,
    config: AbilityConfig,
}

impl AbilityService {
    pub fn new(actors: Arc<dyn ActorDirectory>, organizations: Arc<dyn OrganizationDirectory>) -> Self {
        Self::with_config(actors, organizations, AbilityConfig::default())
    }

    pub fn with_config(
        actors: Arc<dyn ActorDirectory>,
        organizations: Arc<dyn OrganizationDirectory>,
        config: AbilityConfig,
    ) -> Self {
        Self {
            actors,
            organizations,
            config,
        }
    }

    pub fn config(&self) -> &AbilityConfig {
        &self.config
    }

    /// Load the scope for a signed-in user
    ///
    /// Unknown users become the guest actor unless
    /// `guest_on_missing_actor` is disabled.
    pub async fn load(&self, user_id: &str, context: SessionContext) -> Result<AbilityScope> {
        let actor = match self.actors.find_actor(user_id).await {
            Ok(Some(actor)) => actor,
            Ok(None) if self.config.guest_on_missing_actor => {
                info!(user_id, "unknown user, evaluating as guest");
                Actor::guest()
            }
            Ok(None) => return Err(AbilityError::ActorNotFound(user_id.to_string())),
            Err(e) => {
                warn!(user_id, error = %e, "actor lookup failed");
                return Err(e);
            }
        };

        self.scope_for(actor, context).await
    }

    /// Load the scope for an anonymous visitor
    pub async fn load_guest(&self, context: SessionContext) -> Result<AbilityScope> {
        self.scope_for(Actor::guest(), context).await
    }

    /// Load the organizations of an already-loaded actor
    pub async fn scope_for(&self, actor: Actor, context: SessionContext) -> Result<AbilityScope> {
        let mut ids: Vec<OrganizationId> = actor.organization_roles.keys().cloned().collect();
        ids.sort();

        let organizations = if ids.is_empty() {
            Vec::new()
        } else {
            self.organizations
                .organizations_with_acl(&ids, context.impersonator_id.as_ref())
                .await
                .map_err(|e| {
                    warn!(error = %e, "organization lookup failed");
                    e
                })?
        };

        info!(
            actor = actor.id.as_deref().unwrap_or("guest"),
            impersonator = context.impersonator_id.as_deref(),
            organizations = organizations.len(),
            "ability scope loaded"
        );

        Ok(AbilityScope::new(actor, context, organizations, self.config.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{InMemoryActorDirectory, InMemoryOrganizationDirectory};
    use crate::resolver::Action;

    #[tokio::test]
    async fn test_missing_actor_becomes_guest() {
        let service = AbilityService::new(
            Arc::new(InMemoryActorDirectory::new()),
            Arc::new(InMemoryOrganizationDirectory::new()),
        );

        let scope = service.load("nobody", SessionContext::new()).await.unwrap();
        assert!(scope.actor().is_guest());
        assert!(scope.organizations().is_empty());

        let org = Organization::new("org-1");
        assert!(scope.ability().can(Action::Create, &org));
        assert!(scope.ability().cannot(Action::Read, &org));
    }

    #[tokio::test]
    async fn test_missing_actor_rejected_when_guests_disabled() {
        let config = AbilityConfig {
            guest_on_missing_actor: false,
            ..AbilityConfig::default()
        };
        let service = AbilityService::with_config(
            Arc::new(InMemoryActorDirectory::new()),
            Arc::new(InMemoryOrganizationDirectory::new()),
            config,
        );

        let result = service.load("nobody", SessionContext::new()).await;
        assert!(matches!(result, Err(AbilityError::ActorNotFound(id)) if id == "nobody"));
    }
}
