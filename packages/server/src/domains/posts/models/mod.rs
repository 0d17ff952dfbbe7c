pub mod post;

pub use post::{CreatePost, Post, PostChanges, PostFilter};
