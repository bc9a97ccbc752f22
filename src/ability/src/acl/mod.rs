//! Organization ACL traversal
//!
//! Impac! resources (dashboards, widgets, kpis) are governed by the ACL of
//! every organization they report on. This module reads those ACLs and
//! resolves a resource to the organizations visible in the current session.
//!
//! # Features
//!
//! - **Default deny**: missing or malformed ACL levels read as `false`
//! - **Impersonation scoping**: organizations are loaded with the ACL computed
//!   for the impersonating support user
//! - **Unanimous consent**: multi-organization resources need every owner
//!
//! # Example
//!
//! ```rust
//! use mnoe_ability::acl::{Acl, AclCategory, Capability, VisibleOrganizations, all_grant};
//! use mnoe_ability::{Dashboard, Organization};
//!
//! let orgs = vec![
//!     Organization::new("org-1").with_acl(Acl::new().grant(AclCategory::Dashboards, Capability::Create)),
//! ];
//! let visible = VisibleOrganizations::collect(&orgs);
//! let dashboard = Dashboard::new("dash-1").with_organization("org-1");
//!
//! assert!(all_grant(&dashboard, &visible, Capability::Create));
//! assert!(!all_grant(&dashboard, &visible, Capability::Destroy));
//! ```

mod types;
mod traversal;


pub use types::{Acl, AclCategory, Capability, GovernedResource};
pub use traversal::{acl_allows, all_grant, organizations_of, VisibleOrganization, VisibleOrganizations};
