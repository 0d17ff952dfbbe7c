//! Profiles domain - one profile per authenticated identity, plus role assignments.

pub mod actions;
pub mod data;
pub mod models;

pub use data::{AdminUserData, MeData, ProfileData, RoleData};
pub use models::{NewProfile, Profile, Role, UserRole, UserWithRoles};
