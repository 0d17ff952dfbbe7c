/// Authorization for newsroom actions
///
/// Every mutating or privileged action runs a check through the fluent API
/// before touching the store:
///
/// ```rust
/// use newsroom_core::common::{Actor, Capability, ProfileId, Viewer};
///
/// let author = ProfileId::new();
/// let viewer = Viewer::authenticated(author, vec![]);
///
/// let actor_id = Actor::new(&viewer)
///     .can(Capability::EditPost)
///     .owned_by(author)
///     .check()
///     .unwrap();
/// assert_eq!(actor_id, author);
/// ```
///
/// Client-side role checks are affordances only; these checks are the
/// boundary.

mod builder;
mod capability;
mod errors;

pub use builder::{Actor, CapabilityBuilder};
pub use capability::Capability;
pub use errors::AuthError;
