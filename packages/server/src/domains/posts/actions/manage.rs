//! Post edits and deletes. Author or administrator only.

use tracing::info;

use super::validation::{validate_content, validate_excerpt, validate_tags, validate_title};
use crate::common::{Actor, AppError, AppResult, Capability, PostId, Viewer};
use crate::domains::posts::models::{Post, PostChanges};
use crate::domains::tag::actions::link_tags;
use crate::kernel::ServerDeps;

/// Fields to change. `None` leaves a field alone.
#[derive(Debug, Clone, Default)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    /// An empty string clears the excerpt
    pub excerpt: Option<String>,
    pub published: Option<bool>,
    /// Replaces the tag set when present; an empty string removes all tags
    pub tags: Option<String>,
}

async fn load(id: PostId, deps: &ServerDeps) -> AppResult<Post> {
    deps.store
        .find_post_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("post {}", id)))
}

/// Edit a post. The slug stays as it was created, even when the title changes.
pub async fn update_post(
    viewer: &Viewer,
    id: PostId,
    request: UpdatePostRequest,
    deps: &ServerDeps,
) -> AppResult<Post> {
    let existing = load(id, deps).await?;
    let actor_id = Actor::new(viewer)
        .can(Capability::EditPost)
        .owned_by(existing.author_id)
        .check()?;

    let changes = PostChanges {
        title: request
            .title
            .as_deref()
            .map(validate_title)
            .transpose()?
            .map(|(title, _)| title),
        content: request.content.as_deref().map(validate_content).transpose()?,
        excerpt: request
            .excerpt
            .as_deref()
            .map(|e| validate_excerpt(Some(e)))
            .transpose()?,
        published: request.published,
    };
    let tag_names = request.tags.as_deref().map(|t| validate_tags(Some(t))).transpose()?;

    let post = if changes.is_empty() {
        existing
    } else {
        deps.store.update_post(id, &changes).await?
    };

    if let Some(names) = tag_names {
        deps.store.unlink_post_tags(id).await?;
        link_tags(deps.store.as_ref(), id, &names, deps.tag_conflict_policy).await?;
    }

    info!(post_id = %id, updated_by = %actor_id, "Updated post");
    Ok(post)
}

/// Delete a post; its tag links cascade. The featured image is left in storage.
pub async fn delete_post(viewer: &Viewer, id: PostId, deps: &ServerDeps) -> AppResult<()> {
    let existing = load(id, deps).await?;
    let actor_id = Actor::new(viewer)
        .can(Capability::DeletePost)
        .owned_by(existing.author_id)
        .check()?;

    if !deps.store.delete_post(id).await? {
        return Err(AppError::NotFound(format!("post {}", id)));
    }

    info!(post_id = %id, deleted_by = %actor_id, "Deleted post");
    Ok(())
}
