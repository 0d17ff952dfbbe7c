use chrono::{DateTime, Utc};
use juniper::{GraphQLEnum, GraphQLObject};
use uuid::Uuid;

use crate::domains::profiles::models::{Profile, Role, UserWithRoles};

#[derive(Debug, Clone, Copy, PartialEq, Eq, GraphQLEnum)]
#[graphql(name = "Role")]
pub enum RoleData {
    Admin,
    User,
}

impl From<Role> for RoleData {
    fn from(role: Role) -> Self {
        match role {
            Role::Admin => RoleData::Admin,
            Role::User => RoleData::User,
        }
    }
}

impl From<RoleData> for Role {
    fn from(role: RoleData) -> Self {
        match role {
            RoleData::Admin => Role::Admin,
            RoleData::User => Role::User,
        }
    }
}

/// Profile GraphQL data type
#[derive(Debug, Clone, GraphQLObject)]
#[graphql(name = "Profile", description = "A registered author or reader")]
pub struct ProfileData {
    pub id: Uuid,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

impl From<Profile> for ProfileData {
    fn from(profile: Profile) -> Self {
        Self {
            id: profile.id.into_uuid(),
            display_name: profile.display_name,
            created_at: profile.created_at,
        }
    }
}

/// The viewer's own profile, including private fields
#[derive(Debug, Clone, GraphQLObject)]
#[graphql(name = "Me")]
pub struct MeData {
    pub id: Uuid,
    pub display_name: String,
    pub email: String,
    pub roles: Vec<RoleData>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl From<UserWithRoles> for MeData {
    fn from(user: UserWithRoles) -> Self {
        let is_admin = user.is_admin();
        Self {
            id: user.profile.id.into_uuid(),
            display_name: user.profile.display_name,
            email: user.profile.email,
            roles: user.roles.into_iter().map(RoleData::from).collect(),
            is_admin,
            created_at: user.profile.created_at,
        }
    }
}

/// Admin view of a user
#[derive(Debug, Clone, GraphQLObject)]
#[graphql(name = "AdminUser")]
pub struct AdminUserData {
    pub id: Uuid,
    pub display_name: String,
    pub email: String,
    pub roles: Vec<RoleData>,
    pub created_at: DateTime<Utc>,
}

impl From<UserWithRoles> for AdminUserData {
    fn from(user: UserWithRoles) -> Self {
        Self {
            id: user.profile.id.into_uuid(),
            display_name: user.profile.display_name,
            email: user.profile.email,
            roles: user.roles.into_iter().map(RoleData::from).collect(),
            created_at: user.profile.created_at,
        }
    }
}
