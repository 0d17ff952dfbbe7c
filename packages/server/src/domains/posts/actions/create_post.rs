//! Post creation: optional image upload, post insert, then tag
//! resolution and linking, driven through `CreatePostMachine`.

use tracing::{debug, info};

use super::validation::{
    validate_content, validate_excerpt, validate_image, validate_tags, validate_title,
    ImageUpload,
};
use crate::common::{Actor, AppError, AppResult, Capability, Viewer};
use crate::domains::posts::machines::{CreatePostEvent, CreatePostMachine};
use crate::domains::posts::models::{CreatePost, Post};
use crate::domains::tag::actions::resolve_tag;
use crate::domains::tag::models::Tag;
use crate::kernel::ServerDeps;

/// Raw authoring input
#[derive(Debug, Clone, Default)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    pub excerpt: Option<String>,
    /// Comma-separated tag names
    pub tags: Option<String>,
    /// Defaults to published
    pub published: Option<bool>,
    pub image: Option<ImageUpload>,
}

/// Post as created, with the tags that were linked to it
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedPost {
    pub post: Post,
    pub tags: Vec<Tag>,
}

/// Create a post for the viewer.
///
/// Input is validated before any network call. Steps then run strictly in
/// order and the first failure is returned; earlier steps are not undone.
/// A title whose slug is already taken fails with `Conflict`.
pub async fn create_post(
    viewer: &Viewer,
    request: CreatePostRequest,
    deps: &ServerDeps,
) -> AppResult<CreatedPost> {
    let author_id = Actor::new(viewer).can(Capability::CreatePosts).check()?;

    let (title, slug) = validate_title(&request.title)?;
    let content = validate_content(&request.content)?;
    let excerpt = validate_excerpt(request.excerpt.as_deref())?;
    let tag_names = validate_tags(request.tags.as_deref())?;
    let image = request.image.as_ref().map(validate_image).transpose()?;

    info!(author_id = %author_id, slug = %slug, tags = tag_names.len(), has_image = image.is_some(), "Creating post");

    let mut machine = CreatePostMachine::new();

    // 1. Featured image
    match image {
        Some(image) => {
            machine.apply(CreatePostEvent::ImageUploadStarted)?;
            let path = image.object_path(author_id);
            if let Err(e) = deps
                .storage
                .upload(&path, image.bytes, &image.content_type)
                .await
            {
                return Err(machine.fail(e));
            }
            let url = deps.storage.public_url(&path);
            debug!(path = %path, "Uploaded featured image");
            machine.apply(CreatePostEvent::ImageUploaded { url })?;
        }
        None => machine.apply(CreatePostEvent::ImageSkipped)?,
    }

    // 2. Post row
    let insert = CreatePost::builder()
        .title(title)
        .slug(slug.clone())
        .content(content)
        .excerpt(excerpt)
        .image_url(machine.image_url().map(String::from))
        .author_id(author_id)
        .published(request.published.unwrap_or(true))
        .build();

    let post = match deps.store.insert_post(&insert).await {
        Ok(post) => post,
        Err(e) if e.is_conflict() => {
            return Err(machine.fail(AppError::Conflict(format!(
                "a post with slug '{}' already exists",
                slug
            ))))
        }
        Err(e) => return Err(machine.fail(e)),
    };
    let post_id = post.id;
    machine.apply(CreatePostEvent::PostInserted {
        post,
        tag_count: tag_names.len(),
    })?;

    // 3. Tags, one at a time in input order
    for name in &tag_names {
        let tag = match resolve_tag(deps.store.as_ref(), name, deps.tag_conflict_policy).await {
            Ok(tag) => tag,
            Err(e) => return Err(machine.fail(e)),
        };
        if let Err(e) = deps.store.link_post_tag(post_id, tag.id).await {
            return Err(machine.fail(e));
        }
        machine.apply(CreatePostEvent::TagLinked { tag })?;
    }

    machine.apply(CreatePostEvent::Completed)?;
    let (post, tags) = machine.into_outcome()?;

    info!(post_id = %post.id, slug = %post.slug, tags = tags.len(), "Created post");
    Ok(CreatedPost { post, tags })
}
