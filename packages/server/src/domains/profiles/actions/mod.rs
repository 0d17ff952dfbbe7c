//! Profile actions - entry points called from GraphQL resolvers and the
//! request context middleware.
//!
//! Every action takes the per-request `Viewer` explicitly and runs its
//! capability check before touching the store.

use std::collections::HashMap;

use tracing::info;

use crate::common::{Actor, AppError, AppResult, Capability, ProfileId, Viewer};
use crate::domains::profiles::models::{NewProfile, Profile, Role, UserRole, UserWithRoles};
use crate::kernel::ServerDeps;

/// Longest accepted display name, in characters
pub const MAX_DISPLAY_NAME_CHARS: usize = 80;

/// Build the viewer for a verified identity.
///
/// Creates the profile on first sight, then tops up missing roles on every
/// sight: `user` always, `admin` for configured admin emails. Grants are
/// idempotent, so a grant that failed on an earlier request lands on the next.
pub async fn ensure_viewer(
    identity: ProfileId,
    email: &str,
    name: Option<&str>,
    deps: &ServerDeps,
) -> AppResult<Viewer> {
    let new_profile = NewProfile::from_claims(identity, email, name);
    let (profile, created) = deps.store.insert_profile_if_absent(&new_profile).await?;
    if created {
        info!(profile_id = %profile.id, "Created profile on first sight");
    }

    let mut roles = deps.store.roles_for(profile.id).await?;

    let mut required = vec![Role::User];
    if deps.is_admin_email(&profile.email) {
        required.push(Role::Admin);
    }

    for role in required {
        if roles.contains(&role) {
            continue;
        }
        deps.store.grant_role(profile.id, role).await?;
        info!(profile_id = %profile.id, %role, "Granted default role");
        roles.push(role);
    }

    roles.sort();
    Ok(Viewer::authenticated(profile.id, roles))
}

/// The viewer's own profile and roles; `None` for anonymous viewers
pub async fn me(viewer: &Viewer, deps: &ServerDeps) -> AppResult<Option<UserWithRoles>> {
    let Some(identity) = viewer.identity else {
        return Ok(None);
    };

    Ok(deps
        .store
        .find_profile(identity)
        .await?
        .map(|profile| UserWithRoles {
            profile,
            roles: viewer.roles.clone(),
        }))
}

pub async fn update_profile(
    viewer: &Viewer,
    display_name: &str,
    deps: &ServerDeps,
) -> AppResult<Profile> {
    let identity = viewer.require_auth()?;

    let display_name = display_name.trim();
    if display_name.is_empty() {
        return Err(AppError::validation("display name is required"));
    }
    if display_name.chars().count() > MAX_DISPLAY_NAME_CHARS {
        return Err(AppError::validation(format!(
            "display name must be at most {} characters",
            MAX_DISPLAY_NAME_CHARS
        )));
    }

    let profile = deps.store.update_profile(identity, display_name).await?;
    info!(profile_id = %identity, "Updated profile");
    Ok(profile)
}

/// All users with their roles (admin only)
pub async fn list_users(viewer: &Viewer, deps: &ServerDeps) -> AppResult<Vec<UserWithRoles>> {
    Actor::new(viewer).can(Capability::ManageUsers).check()?;

    let (profiles, assignments) = tokio::try_join!(
        deps.store.list_profiles(),
        deps.store.list_role_assignments()
    )?;

    Ok(attach_roles(profiles, assignments))
}

/// Delete a user and, by cascade, their roles and posts (admin only).
/// Administrators cannot delete themselves.
pub async fn delete_user(viewer: &Viewer, id: ProfileId, deps: &ServerDeps) -> AppResult<()> {
    let actor_id = Actor::new(viewer).can(Capability::ManageUsers).check()?;

    if actor_id == id {
        return Err(AppError::validation("you cannot delete your own account"));
    }

    if !deps.store.delete_profile(id).await? {
        return Err(AppError::NotFound(format!("user {}", id)));
    }

    info!(profile_id = %id, deleted_by = %actor_id, "Deleted user");
    Ok(())
}

pub async fn grant_role(
    viewer: &Viewer,
    id: ProfileId,
    role: Role,
    deps: &ServerDeps,
) -> AppResult<UserWithRoles> {
    let actor_id = Actor::new(viewer).can(Capability::ManageUsers).check()?;

    let profile = deps
        .store
        .find_profile(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {}", id)))?;

    deps.store.grant_role(id, role).await?;
    info!(profile_id = %id, %role, granted_by = %actor_id, "Granted role");

    let roles = deps.store.roles_for(id).await?;
    Ok(UserWithRoles { profile, roles })
}

/// Revoke a role. Administrators cannot revoke their own admin role.
pub async fn revoke_role(
    viewer: &Viewer,
    id: ProfileId,
    role: Role,
    deps: &ServerDeps,
) -> AppResult<UserWithRoles> {
    let actor_id = Actor::new(viewer).can(Capability::ManageUsers).check()?;

    if actor_id == id && role == Role::Admin {
        return Err(AppError::validation("you cannot revoke your own admin role"));
    }

    let profile = deps
        .store
        .find_profile(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {}", id)))?;

    if deps.store.revoke_role(id, role).await? {
        info!(profile_id = %id, %role, revoked_by = %actor_id, "Revoked role");
    }

    let roles = deps.store.roles_for(id).await?;
    Ok(UserWithRoles { profile, roles })
}

/// Group role rows by profile, keeping profile order
pub fn attach_roles(profiles: Vec<Profile>, assignments: Vec<UserRole>) -> Vec<UserWithRoles> {
    let mut by_profile: HashMap<ProfileId, Vec<Role>> = HashMap::new();
    for assignment in assignments {
        if let Some(role) = assignment.role() {
            by_profile.entry(assignment.profile_id).or_default().push(role);
        }
    }

    profiles
        .into_iter()
        .map(|profile| {
            let mut roles = by_profile.remove(&profile.id).unwrap_or_default();
            roles.sort();
            UserWithRoles { profile, roles }
        })
        .collect()
}
