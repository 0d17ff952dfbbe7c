pub mod profile;
pub mod role;

pub use profile::{NewProfile, Profile, UserWithRoles};
pub use role::{Role, UserRole};
