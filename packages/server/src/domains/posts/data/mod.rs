pub mod post;
pub mod types;

pub use post::PostData;
pub use types::{AdminDashboardData, CreatePostInput, ImageUploadInput, UpdatePostInput};
