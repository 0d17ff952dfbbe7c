//! Server dependencies for actions (using traits for testability)
//!
//! This module provides the central dependency container handed to every domain action.
//! All external services use trait abstractions so tests can swap in the in-memory versions.

use std::sync::Arc;

use crate::domains::auth::JwtService;
use crate::domains::tag::TagConflictPolicy;
use crate::kernel::{BaseContentStore, BaseObjectStorage};

/// Server dependencies accessible to actions
#[derive(Clone)]
pub struct ServerDeps {
    pub store: Arc<dyn BaseContentStore>,
    pub storage: Arc<dyn BaseObjectStorage>,
    /// JWT service for token verification (and minting in the admin CLI)
    pub jwt_service: Arc<JwtService>,
    /// How tag resolution reacts to a concurrent insert of the same slug
    pub tag_conflict_policy: TagConflictPolicy,
    /// Lowercased emails that are topped up with the admin role on every sight
    pub admin_emails: Vec<String>,
}

impl ServerDeps {
    pub fn new(
        store: Arc<dyn BaseContentStore>,
        storage: Arc<dyn BaseObjectStorage>,
        jwt_service: Arc<JwtService>,
        tag_conflict_policy: TagConflictPolicy,
        admin_emails: Vec<String>,
    ) -> Self {
        Self {
            store,
            storage,
            jwt_service,
            tag_conflict_policy,
            admin_emails,
        }
    }

    /// Same dependencies with a different tag conflict policy
    pub fn with_tag_conflict_policy(mut self, policy: TagConflictPolicy) -> Self {
        self.tag_conflict_policy = policy;
        self
    }

    pub fn is_admin_email(&self, email: &str) -> bool {
        let email = email.trim().to_lowercase();
        self.admin_emails.iter().any(|admin| *admin == email)
    }
}
