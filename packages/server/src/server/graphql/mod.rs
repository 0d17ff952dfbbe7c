// GraphQL schema and context
pub mod context;
pub mod error;
pub mod schema;

pub use context::*;
pub use error::to_field_error;
pub use schema::*;
