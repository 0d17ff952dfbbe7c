/// Capabilities checked before any privileged read or write.
///
/// Creating posts needs only an identity. Post edits, deletes and draft reads
/// are open to the post's author; administrators hold every capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Author new posts
    CreatePosts,

    /// Edit an existing post
    EditPost,

    /// Delete an existing post
    DeletePost,

    /// Read a post that is not published
    ViewUnpublished,

    /// List every post, drafts included
    ModeratePosts,

    /// Delete tags from the shared vocabulary
    ManageTags,

    /// List, delete and change roles of users
    ManageUsers,
}

impl Capability {
    /// Whether only administrators hold this capability
    pub fn requires_admin(&self) -> bool {
        matches!(
            self,
            Capability::ModeratePosts | Capability::ManageTags | Capability::ManageUsers
        )
    }

    /// Whether the owner of the target row holds this capability
    pub fn granted_to_owner(&self) -> bool {
        matches!(
            self,
            Capability::EditPost | Capability::DeletePost | Capability::ViewUnpublished
        )
    }

    pub(crate) fn describe(&self) -> &'static str {
        match self {
            Capability::CreatePosts => "create posts",
            Capability::EditPost => "edit this post",
            Capability::DeletePost => "delete this post",
            Capability::ViewUnpublished => "view this post",
            Capability::ModeratePosts => "moderate posts",
            Capability::ManageTags => "manage tags",
            Capability::ManageUsers => "manage users",
        }
    }
}
