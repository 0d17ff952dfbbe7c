// Business domains
pub mod auth;
pub mod posts;
pub mod profiles;
pub mod tag;
