use chrono::{DateTime, Utc};
use juniper::FieldResult;
use uuid::Uuid;

use crate::common::utils::generate_summary;
use crate::domains::posts::actions;
use crate::domains::posts::models::Post;
use crate::domains::profiles::ProfileData;
use crate::domains::tag::TagData;
use crate::server::graphql::{to_field_error, GraphQLContext};

/// Teaser length when a post has no excerpt
pub const SUMMARY_CHARS: usize = 160;

/// Post GraphQL type. Author and tags resolve lazily through the store.
#[derive(Debug, Clone)]
pub struct PostData {
    post: Post,
}

impl From<Post> for PostData {
    fn from(post: Post) -> Self {
        Self { post }
    }
}

#[juniper::graphql_object(context = GraphQLContext, name = "Post")]
impl PostData {
    fn id(&self) -> Uuid {
        self.post.id.into_uuid()
    }

    fn title(&self) -> &str {
        &self.post.title
    }

    fn slug(&self) -> &str {
        &self.post.slug
    }

    fn content(&self) -> &str {
        &self.post.content
    }

    fn excerpt(&self) -> Option<&str> {
        self.post.excerpt.as_deref()
    }

    /// The excerpt, or the opening of the content when there is none
    fn summary(&self) -> String {
        match &self.post.excerpt {
            Some(excerpt) => excerpt.clone(),
            None => generate_summary(&self.post.content, SUMMARY_CHARS),
        }
    }

    fn image_url(&self) -> Option<&str> {
        self.post.image_url.as_deref()
    }

    fn published(&self) -> bool {
        self.post.published
    }

    fn author_id(&self) -> Uuid {
        self.post.author_id.into_uuid()
    }

    async fn author(&self, ctx: &GraphQLContext) -> FieldResult<Option<ProfileData>> {
        let author = actions::author_for_post(&self.post, &ctx.deps)
            .await
            .map_err(to_field_error)?;
        Ok(author.map(ProfileData::from))
    }

    async fn tags(&self, ctx: &GraphQLContext) -> FieldResult<Vec<TagData>> {
        let tags = actions::tags_for_post(self.post.id, &ctx.deps)
            .await
            .map_err(to_field_error)?;
        Ok(tags.into_iter().map(TagData::from).collect())
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.post.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.post.updated_at
    }
}
