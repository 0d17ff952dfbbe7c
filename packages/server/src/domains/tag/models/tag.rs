use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{PostId, TagId};

/// Shared tag vocabulary entry. Name and slug are each globally unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    pub id: TagId,
    pub name: String, // first-seen casing, e.g. 'Local News'
    pub slug: String, // 'local-news'
    pub created_at: DateTime<Utc>,
}

/// Link row between a post and a tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::FromRow)]
pub struct PostTag {
    pub post_id: PostId,
    pub tag_id: TagId,
}

// =============================================================================
// Tag Queries
// =============================================================================

impl Tag {
    /// Find all tags ordered by name
    pub async fn find_all(pool: &PgPool) -> sqlx::Result<Vec<Self>> {
        sqlx::query_as::<_, Tag>("SELECT * FROM tags ORDER BY name")
            .fetch_all(pool)
            .await
    }

    /// Exact slug lookup
    pub async fn find_by_slug(slug: &str, pool: &PgPool) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, Tag>("SELECT * FROM tags WHERE slug = $1")
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// Plain insert. A concurrent insert of the same name or slug surfaces as a
    /// unique violation (`tags_name_key` / `tags_slug_key`); callers decide.
    pub async fn create(name: &str, slug: &str, pool: &PgPool) -> sqlx::Result<Self> {
        sqlx::query_as::<_, Tag>(
            r#"
            INSERT INTO tags (id, name, slug)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(TagId::new())
        .bind(name)
        .bind(slug)
        .fetch_one(pool)
        .await
    }

    /// Delete a tag; its post links cascade
    pub async fn delete(id: TagId, pool: &PgPool) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM tags WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Tags linked to a post, ordered by name
    pub async fn find_for_post(post_id: PostId, pool: &PgPool) -> sqlx::Result<Vec<Self>> {
        sqlx::query_as::<_, Tag>(
            r#"
            SELECT t.*
            FROM tags t
            INNER JOIN post_tags pt ON pt.tag_id = t.id
            WHERE pt.post_id = $1
            ORDER BY t.name
            "#,
        )
        .bind(post_id)
        .fetch_all(pool)
        .await
    }
}

impl PostTag {
    /// Link a post to a tag. Linking an existing pair is a no-op.
    pub async fn create(post_id: PostId, tag_id: TagId, pool: &PgPool) -> sqlx::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO post_tags (post_id, tag_id)
            VALUES ($1, $2)
            ON CONFLICT (post_id, tag_id) DO NOTHING
            "#,
        )
        .bind(post_id)
        .bind(tag_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Remove every link for a post
    pub async fn delete_all_for_post(post_id: PostId, pool: &PgPool) -> sqlx::Result<u64> {
        let result = sqlx::query("DELETE FROM post_tags WHERE post_id = $1")
            .bind(post_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
