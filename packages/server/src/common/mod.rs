// Common types and utilities shared across the application

pub mod auth;
pub mod entity_ids;
pub mod error;
pub mod id;
pub mod utils;
pub mod viewer;

pub use auth::{Actor, AuthError, Capability};
pub use entity_ids::{PostId, ProfileId, TagId};
pub use error::{AppError, AppResult, ErrorClass};
pub use id::Id;
pub use viewer::Viewer;
