// Kernel - infrastructure seams shared by every domain
//
// Domains talk to persistence and object storage only through the traits
// defined here; ServerDeps carries the concrete implementations.

pub mod deps;
pub mod object_storage;
pub mod store;
pub mod test_dependencies;
pub mod traits;

pub use deps::ServerDeps;
pub use object_storage::{BucketStorage, LocalObjectStorage};
pub use store::PostgresContentStore;
pub use test_dependencies::{
    InMemoryContentStore, MockObjectStorage, RecordedUpload, TestDependencies, TEST_JWT_SECRET,
};
pub use traits::*;
