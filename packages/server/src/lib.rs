// Newsroom - API Core
//
// Backend for a small news site: readers browse published articles, authors
// publish posts with tags and a featured image, administrators moderate.
// Persistence and object storage sit behind the kernel traits; the GraphQL
// server is the authorization boundary.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
