//! Ability service integration tests
//!
//! Loads actors and organizations through the directories and checks the
//! resulting abilities end to end.

use async_trait::async_trait;
use mnoe_ability::{
    AbilityConfig, AbilityError, AbilityService, Acl, AclCategory, Action, Actor, ActorDirectory,
    AppInstance, Capability, Dashboard, InMemoryActorDirectory, InMemoryOrganizationDirectory,
    Organization, OrganizationDirectory, OrganizationId, Result, SessionContext, UserId, Widget,
};
use std::sync::{Arc, Mutex};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

const ACTORS: &str = r#"[
    {
        "id": "usr-alice",
        "admin_role": "",
        "organization_roles": { "org-acme": "Super Admin", "org-globex": "Member" },
        "teams": []
    },
    {
        "id": "usr-bob",
        "organization_roles": { "org-acme": "Member" },
        "teams": [{ "id": "team-sales", "app_instance_ids": ["app-crm"] }]
    },
    {
        "id": "usr-carol",
        "admin_role": "Staff"
    }
]"#;

const ORGANIZATIONS: &str = r#"[
    {
        "id": "org-acme",
        "name": "Acme",
        "acl": { "related": { "dashboards": { "create": true, "update": true, "destroy": true } } },
        "impersonator_acls": {
            "usr-support": { "related": { "dashboards": { "update": true } } }
        }
    },
    {
        "id": "org-globex",
        "name": "Globex",
        "acl": { "related": { "dashboards": { "create": true }, "widgets": { "create": true } } }
    },
    {
        "id": "org-initech",
        "name": "Initech",
        "active": false,
        "acl": { "related": { "dashboards": { "create": true } } }
    }
]"#;

async fn service_with(config: AbilityConfig) -> AbilityService {
    let actors = InMemoryActorDirectory::new();
    actors.load_json(ACTORS).await.unwrap();

    let organizations = InMemoryOrganizationDirectory::new();
    organizations.load_json(ORGANIZATIONS).await.unwrap();

    AbilityService::with_config(Arc::new(actors), Arc::new(organizations), config)
}

#[tokio::test]
async fn test_super_admin_end_to_end() {
    let service = service_with(AbilityConfig::default()).await;
    let scope = service.load("usr-alice", SessionContext::new()).await.unwrap();
    let ability = scope.ability();

    assert_eq!(scope.organizations().len(), 2);

    let acme = &scope.organizations()[0];
    assert_eq!(acme.id, "org-acme");
    assert!(ability.can(Action::ManageBilling, acme));

    let shared = Dashboard::new("dash-1")
        .with_organization("org-acme")
        .with_organization("org-globex");
    assert!(ability.can(Action::CreateImpacDashboards, &shared));
    // Globex does not grant dashboard updates
    assert!(ability.cannot(Action::UpdateImpacDashboards, &shared));

    let widget = Widget::new("w-1").with_organization("org-globex");
    assert!(ability.can(Action::CreateImpacWidgets, &widget));
}

#[tokio::test]
async fn test_team_restricted_member() {
    let service = service_with(AbilityConfig::default()).await;
    let scope = service.load("usr-bob", SessionContext::new()).await.unwrap();
    let ability = scope.ability();

    assert!(ability.can(Action::Access, &AppInstance::new("app-crm", "org-acme")));
    assert!(ability.cannot(Action::Access, &AppInstance::new("app-erp", "org-acme")));
    assert!(ability.cannot(Action::Upload, &scope.organizations()[0]));
}

#[tokio::test]
async fn test_staff_override_through_service() {
    let service = service_with(AbilityConfig::default()).await;
    let scope = service.load("usr-carol", SessionContext::new()).await.unwrap();

    assert!(scope.organizations().is_empty());
    assert!(scope
        .ability()
        .can(Action::ManageAppInstances, &Organization::new("org-acme")));
}

#[tokio::test]
async fn test_impersonated_session_narrows_acl() {
    let service = service_with(AbilityConfig::default()).await;
    let scope = service
        .load("usr-alice", SessionContext::impersonated_by("usr-support"))
        .await
        .unwrap();
    let ability = scope.ability();

    // Globex exposes no ACL to the impersonator
    assert_eq!(ability.visible_organizations().ids().collect::<Vec<_>>(), vec!["org-acme"]);

    let acme_only = Dashboard::new("d").with_organization("org-acme");
    assert!(ability.can(Action::UpdateImpacDashboards, &acme_only));
    assert!(ability.cannot(Action::CreateImpacDashboards, &acme_only));

    let shared = Dashboard::new("d2")
        .with_organization("org-acme")
        .with_organization("org-globex");
    assert!(ability.cannot(Action::UpdateImpacDashboards, &shared));
}

#[tokio::test]
async fn test_unknown_user() {
    let service = service_with(AbilityConfig::default()).await;
    let scope = service.load("usr-mallory", SessionContext::new()).await.unwrap();
    assert!(scope.actor().is_guest());

    let strict = service_with(AbilityConfig {
        guest_on_missing_actor: false,
        ..AbilityConfig::default()
    })
    .await;
    let result = strict.load("usr-mallory", SessionContext::new()).await;
    assert!(matches!(result, Err(AbilityError::ActorNotFound(_))));
}

#[tokio::test]
async fn test_guest_scope() {
    let service = service_with(AbilityConfig::default()).await;
    let scope = service.load_guest(SessionContext::new()).await.unwrap();
    let org = Organization::new("org-new");

    assert!(scope.ability().can(Action::Create, &org));
    assert!(scope.ability().cannot(Action::Read, &org));
}

struct FailingDirectory;

#[async_trait]
impl ActorDirectory for FailingDirectory {
    async fn find_actor(&self, _id: &str) -> Result<Option<mnoe_ability::Actor>> {
        Err(AbilityError::Directory("connection refused".to_string()))
    }
}

#[async_trait]
impl OrganizationDirectory for FailingDirectory {
    async fn organizations_with_acl(
        &self,
        _ids: &[OrganizationId],
        _impersonator_id: Option<&UserId>,
    ) -> Result<Vec<Organization>> {
        Err(AbilityError::Directory("connection refused".to_string()))
    }
}

#[tokio::test]
async fn test_directory_errors_propagate() {
    let service = AbilityService::new(Arc::new(FailingDirectory), Arc::new(FailingDirectory));
    let result = service.load("usr-alice", SessionContext::new()).await;
    assert!(matches!(result, Err(AbilityError::Directory(_))));

    let actors = InMemoryActorDirectory::new();
    actors.load_json(ACTORS).await.unwrap();
    let service = AbilityService::new(Arc::new(actors), Arc::new(FailingDirectory));
    let result = service.load("usr-alice", SessionContext::new()).await;
    assert!(matches!(result, Err(AbilityError::Directory(_))));

    // Actors without organizations never hit the organization directory
    let scope = service.load("usr-carol", SessionContext::new()).await.unwrap();
    assert!(scope.organizations().is_empty());
}

/// Organization loader that computes the impersonator's ACL itself and
/// returns it in `acl`, without any per-impersonator side table
struct ComputedAclDirectory;

#[async_trait]
impl OrganizationDirectory for ComputedAclDirectory {
    async fn organizations_with_acl(
        &self,
        ids: &[OrganizationId],
        impersonator_id: Option<&UserId>,
    ) -> Result<Vec<Organization>> {
        let acl = match impersonator_id {
            Some(_) => Acl::new().grant(AclCategory::Dashboards, Capability::Update),
            None => Acl::new().grant_all(AclCategory::Dashboards),
        };
        Ok(ids
            .iter()
            .map(|id| Organization::new(id.clone()).with_acl(acl.clone()))
            .collect())
    }
}

#[tokio::test]
async fn test_impersonation_with_loader_computed_acl() {
    let actors = InMemoryActorDirectory::new();
    actors.put(Actor::new("usr-1").with_role("O1", "Super Admin")).await;
    let service = AbilityService::new(Arc::new(actors), Arc::new(ComputedAclDirectory));
    let dashboard = Dashboard::new("d").with_organization("O1");

    let scope = service
        .load("usr-1", SessionContext::impersonated_by("support-1"))
        .await
        .unwrap();
    let ability = scope.ability();

    assert_eq!(ability.visible_organizations().len(), 1);
    assert!(ability.can(Action::UpdateImpacDashboards, &dashboard));
    assert!(ability.cannot(Action::DestroyImpacDashboards, &dashboard));

    let scope = service.load("usr-1", SessionContext::new()).await.unwrap();
    assert!(scope.ability().can(Action::DestroyImpacDashboards, &dashboard));
}

/// Collects the message of every event it sees
#[derive(Clone, Default)]
struct CapturedMessages(Arc<Mutex<Vec<String>>>);

impl CapturedMessages {
    fn count(&self, message: &str) -> usize {
        self.0.lock().unwrap().iter().filter(|m| m.as_str() == message).count()
    }
}

struct MessageVisitor<'a>(&'a mut String);

impl tracing::field::Visit for MessageVisitor<'_> {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.0 = format!("{:?}", value);
        }
    }
}

impl<S: tracing::Subscriber> Layer<S> for CapturedMessages {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut message = String::new();
        event.record(&mut MessageVisitor(&mut message));
        self.0.lock().unwrap().push(message);
    }
}

async fn decision_events(log_decisions: bool) -> usize {
    let service = service_with(AbilityConfig {
        log_decisions,
        ..AbilityConfig::default()
    })
    .await;
    let scope = service.load("usr-alice", SessionContext::new()).await.unwrap();

    let captured = CapturedMessages::default();
    let subscriber = tracing_subscriber::registry().with(captured.clone());
    let allowed = tracing::subscriber::with_default(subscriber, || {
        scope.ability().check(Action::Destroy, &Organization::new("org-none")).allowed
    });
    assert!(!allowed);

    captured.count("ability check")
}

#[tokio::test]
async fn test_decision_logging_can_be_disabled() {
    assert_eq!(decision_events(false).await, 0);
    assert_eq!(decision_events(true).await, 1);
}
