use super::{AuthError, Capability};
use crate::common::entity_ids::ProfileId;
use crate::common::viewer::Viewer;

/// Entry point for authorization checks
///
/// Usage:
/// ```ignore
/// let author_id = Actor::new(viewer)
///     .can(Capability::DeletePost)
///     .owned_by(post.author_id)
///     .check()?;
/// ```
pub struct Actor<'a> {
    viewer: &'a Viewer,
}

impl<'a> Actor<'a> {
    pub fn new(viewer: &'a Viewer) -> Self {
        Self { viewer }
    }

    /// Specify what capability the actor needs
    pub fn can(self, capability: Capability) -> CapabilityBuilder<'a> {
        CapabilityBuilder {
            viewer: self.viewer,
            capability,
            owner: None,
        }
    }
}

/// Builder after specifying capability
pub struct CapabilityBuilder<'a> {
    viewer: &'a Viewer,
    capability: Capability,
    owner: Option<ProfileId>,
}

impl CapabilityBuilder<'_> {
    /// The owner of the row the capability is exercised on
    pub fn owned_by(mut self, owner: ProfileId) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Perform the check, returning the acting identity on success
    pub fn check(self) -> Result<ProfileId, AuthError> {
        let actor_id = self
            .viewer
            .identity
            .ok_or(AuthError::AuthenticationRequired)?;

        if self.viewer.is_admin() {
            return Ok(actor_id);
        }

        if self.capability.requires_admin() {
            return Err(AuthError::AdminRequired);
        }

        if self.capability.granted_to_owner() {
            return match self.owner {
                Some(owner) if owner == actor_id => Ok(actor_id),
                _ => Err(AuthError::PermissionDenied(format!(
                    "only the author or an administrator may {}",
                    self.capability.describe()
                ))),
            };
        }

        Ok(actor_id)
    }
}
