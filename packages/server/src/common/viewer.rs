//! Request-scoped identity context.

use super::entity_ids::ProfileId;
use super::auth::AuthError;
use crate::domains::profiles::Role;

/// Who is making the request.
///
/// Built once per request from the verified bearer token and the role table,
/// then passed explicitly to every action that needs it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Viewer {
    /// The authenticated identity, if any.
    pub identity: Option<ProfileId>,
    /// Roles held by the identity. Empty for anonymous viewers.
    pub roles: Vec<Role>,
}

impl Viewer {
    /// Create a viewer for an authenticated identity.
    pub fn authenticated(identity: ProfileId, roles: Vec<Role>) -> Self {
        Self {
            identity: Some(identity),
            roles,
        }
    }

    /// Create a viewer for an unauthenticated request.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.identity.is_some() && self.roles.contains(&role)
    }

    /// Returns false for unauthenticated viewers regardless of roles.
    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }

    /// True when the viewer is the given identity.
    pub fn is(&self, identity: ProfileId) -> bool {
        self.identity == Some(identity)
    }

    pub fn require_auth(&self) -> Result<ProfileId, AuthError> {
        self.identity.ok_or(AuthError::AuthenticationRequired)
    }

    pub fn require_admin(&self) -> Result<ProfileId, AuthError> {
        let identity = self.require_auth()?;
        if !self.is_admin() {
            return Err(AuthError::AdminRequired);
        }
        Ok(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_viewer_holds_nothing() {
        let viewer = Viewer::anonymous();
        assert!(!viewer.is_authenticated());
        assert!(!viewer.is_admin());
        assert_eq!(viewer.require_auth(), Err(AuthError::AuthenticationRequired));
    }

    #[test]
    fn roles_without_identity_grant_nothing() {
        let viewer = Viewer {
            identity: None,
            roles: vec![Role::Admin],
        };
        assert!(!viewer.is_admin());
    }

    #[test]
    fn require_admin_distinguishes_missing_role() {
        let id = ProfileId::new();
        let user = Viewer::authenticated(id, vec![Role::User]);
        assert_eq!(user.require_admin(), Err(AuthError::AdminRequired));

        let admin = Viewer::authenticated(id, vec![Role::User, Role::Admin]);
        assert_eq!(admin.require_admin(), Ok(id));
        assert!(admin.is(id));
    }
}
