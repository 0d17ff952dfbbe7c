pub mod tag;

pub use tag::{PostTag, Tag};
