use std::sync::Arc;

use crate::common::Viewer;
use crate::kernel::ServerDeps;

/// GraphQL request context
///
/// Shared dependencies plus the per-request viewer. Resolvers pass both
/// explicitly to domain actions.
#[derive(Clone)]
pub struct GraphQLContext {
    pub deps: Arc<ServerDeps>,
    pub viewer: Viewer,
}

impl juniper::Context for GraphQLContext {}

impl GraphQLContext {
    pub fn new(deps: Arc<ServerDeps>, viewer: Viewer) -> Self {
        Self { deps, viewer }
    }

    /// Context for an unauthenticated request
    pub fn anonymous(deps: Arc<ServerDeps>) -> Self {
        Self::new(deps, Viewer::anonymous())
    }

    pub fn deps(&self) -> &ServerDeps {
        &self.deps
    }
}
