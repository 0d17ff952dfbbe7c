use chrono::{DateTime, Utc};
use juniper::GraphQLObject;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domains::tag::models::Tag;

/// Tag GraphQL data type
#[derive(Debug, Clone, Serialize, Deserialize, GraphQLObject)]
#[graphql(name = "Tag", description = "A topic shared across posts")]
pub struct TagData {
    /// Unique identifier
    pub id: Uuid,

    /// Display name, in the casing it was first entered with
    pub name: String,

    /// URL-safe key (e.g., 'local-news')
    pub slug: String,

    /// When the tag was created
    pub created_at: DateTime<Utc>,
}

impl From<Tag> for TagData {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id.into_uuid(),
            name: tag.name,
            slug: tag.slug,
            created_at: tag.created_at,
        }
    }
}
