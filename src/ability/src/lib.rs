//! # MnoE Ability Engine
//!
//! Decides what a user may do with organizations, app instances and Impac!
//! resources.
//!
//! ## Features
//!
//! - **Closed rule table** of (action, resource kind, predicate) triples
//! - **Organization roles** with an explicit privilege ordering
//! - **Team restrictions** on app instance access
//! - **Unanimous ACL consent** for resources shared across organizations
//! - **Impersonation scoping** threaded explicitly through every check
//! - **Default deny** for unknown rules and malformed ACL payloads
//!
//! ## Example
//!
//! ```rust
//! use mnoe_ability::{Ability, Action, Actor, Organization, SessionContext};
//!
//! let actor = Actor::new("usr-1").with_role("org-1", "Admin");
//! let context = SessionContext::new();
//! let orgs = vec![Organization::new("org-1")];
//!
//! let ability = Ability::new(&actor, &context, &orgs);
//!
//! assert!(ability.can(Action::Purchase, &orgs[0]));
//! assert!(ability.cannot(Action::ManageBilling, &orgs[0]));
//! ```

pub mod acl;
pub mod config;
pub mod directory;
pub mod error;
pub mod membership;
pub mod resolver;
pub mod service;
pub mod types;

// Re-export commonly used types
pub use acl::{Acl, AclCategory, Capability, GovernedResource};
pub use config::AbilityConfig;
pub use directory::{ActorDirectory, InMemoryActorDirectory, InMemoryOrganizationDirectory, OrganizationDirectory};
pub use error::{AbilityError, Result};
pub use resolver::{can, Ability, Action, Decision, Resource, ResourceKind};
pub use service::{AbilityScope, AbilityService};
pub use types::{
    Actor, AdminRole, AppInstance, AppInstanceId, Dashboard, Kpi, OrgRole, Organization,
    OrganizationId, SessionContext, Team, TeamId, UserId, Widget,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
