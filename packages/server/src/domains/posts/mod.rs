//! Posts domain - articles, their creation workflow and read paths.

pub mod actions;
pub mod data;
pub mod machines;
pub mod models;

pub use data::PostData;
pub use machines::{CreatePostMachine, CreatePostStage, CreatePostState};
pub use models::{CreatePost, Post, PostChanges, PostFilter};
