//! Post actions - entry-point functions for post operations
//!
//! These are called directly from GraphQL resolvers. Actions are
//! self-contained: they take the viewer and raw input, run validation and
//! capability checks, and return final models.

pub mod admin;
pub mod create_post;
pub mod manage;
pub mod queries;
pub mod validation;

pub use admin::{dashboard, list_all_posts, AdminDashboard};
pub use create_post::{create_post, CreatePostRequest, CreatedPost};
pub use manage::{delete_post, update_post, UpdatePostRequest};
pub use queries::{
    author_for_post, find_post_by_slug, list_my_posts, list_posts_for_tag, list_published_posts,
    tags_for_post,
};
pub use validation::ImageUpload;
