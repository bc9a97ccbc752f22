//! Actor and organization loading
//!
//! Persistence lives outside this crate. These traits are the narrow
//! interfaces the service uses to obtain fully-populated actors and
//! organizations; the in-memory implementations back tests and embedded use.

use crate::error::Result;
use crate::types::{Actor, Organization, OrganizationId, UserId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Source of actors
#[async_trait]
pub trait ActorDirectory: Send + Sync {
    /// Load an actor with roles, admin role and teams populated
    async fn find_actor(&self, id: &str) -> Result<Option<Actor>>;
}

/// Source of organizations with their ACLs
#[async_trait]
pub trait OrganizationDirectory: Send + Sync {
    /// Load organizations by id, with ACLs computed for the impersonation scope
    ///
    /// Each returned organization's `acl` is the one in effect for
    /// `impersonator_id`; the resolver reads nothing else. Unknown ids are
    /// skipped, as are organizations that expose no ACL to the impersonator.
    async fn organizations_with_acl(
        &self,
        ids: &[OrganizationId],
        impersonator_id: Option<&UserId>,
    ) -> Result<Vec<Organization>>;
}

/// In-memory actor directory
#[derive(Debug, Clone, Default)]
pub struct InMemoryActorDirectory {
    actors: Arc<RwLock<HashMap<UserId, Actor>>>,
}

impl InMemoryActorDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an actor; guests (no id) are ignored
    pub async fn put(&self, actor: Actor) {
        if let Some(id) = actor.id.clone() {
            let mut actors = self.actors.write().await;
            actors.insert(id, actor);
        }
    }

    pub async fn remove(&self, id: &str) -> Option<Actor> {
        let mut actors = self.actors.write().await;
        actors.remove(id)
    }

    /// Load actors from a JSON array
    pub async fn load_json(&self, json: &str) -> Result<usize> {
        let loaded: Vec<Actor> = serde_json::from_str(json)?;
        let count = loaded.len();
        for actor in loaded {
            self.put(actor).await;
        }
        Ok(count)
    }
}

#[async_trait]
impl ActorDirectory for InMemoryActorDirectory {
    async fn find_actor(&self, id: &str) -> Result<Option<Actor>> {
        let actors = self.actors.read().await;
        Ok(actors.get(id).cloned())
    }
}

/// In-memory organization directory
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrganizationDirectory {
    organizations: Arc<RwLock<HashMap<OrganizationId, Organization>>>,
}

impl InMemoryOrganizationDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put(&self, organization: Organization) {
        let mut organizations = self.organizations.write().await;
        organizations.insert(organization.id.clone(), organization);
    }

    pub async fn remove(&self, id: &str) -> Option<Organization> {
        let mut organizations = self.organizations.write().await;
        organizations.remove(id)
    }

    /// Load organizations from a JSON array
    pub async fn load_json(&self, json: &str) -> Result<usize> {
        let loaded: Vec<Organization> = serde_json::from_str(json)?;
        let count = loaded.len();
        for organization in loaded {
            self.put(organization).await;
        }
        Ok(count)
    }
}

#[async_trait]
impl OrganizationDirectory for InMemoryOrganizationDirectory {
    async fn organizations_with_acl(
        &self,
        ids: &[OrganizationId],
        impersonator_id: Option<&UserId>,
    ) -> Result<Vec<Organization>> {
        let organizations = self.organizations.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| organizations.get(id))
            .filter_map(|organization| organization.scoped_for(impersonator_id))
            .collect())
    }
}
