use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use typed_builder::TypedBuilder;

use crate::common::{PostId, ProfileId, TagId};

/// Article row. The slug is derived from the title at creation and never changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub image_url: Option<String>,
    pub author_id: ProfileId,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Values for a post insert
#[derive(Debug, Clone, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct CreatePost {
    #[builder(default = PostId::new())]
    pub id: PostId,
    pub title: String,
    pub slug: String,
    pub content: String,
    #[builder(default)]
    pub excerpt: Option<String>,
    #[builder(default)]
    pub image_url: Option<String>,
    pub author_id: ProfileId,
    #[builder(default = true)]
    pub published: bool,
}

/// Partial update. `None` leaves a column untouched; `excerpt: Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<Option<String>>,
    pub published: Option<bool>,
}

impl PostChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.excerpt.is_none()
            && self.published.is_none()
    }

    /// Apply to an in-memory row (used by stores without SQL)
    pub fn apply(&self, post: &mut Post) {
        if let Some(title) = &self.title {
            post.title = title.clone();
        }
        if let Some(content) = &self.content {
            post.content = content.clone();
        }
        if let Some(excerpt) = &self.excerpt {
            post.excerpt = excerpt.clone();
        }
        if let Some(published) = self.published {
            post.published = published;
        }
    }
}

/// Which posts a listing returns. Results are always newest first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostFilter {
    pub published: Option<bool>,
    pub author_id: Option<ProfileId>,
}

impl PostFilter {
    /// Everything, drafts included
    pub fn all() -> Self {
        Self::default()
    }

    pub fn published() -> Self {
        Self {
            published: Some(true),
            author_id: None,
        }
    }

    pub fn by_author(author_id: ProfileId) -> Self {
        Self {
            published: None,
            author_id: Some(author_id),
        }
    }

    pub fn matches(&self, post: &Post) -> bool {
        self.published.map_or(true, |p| post.published == p)
            && self.author_id.map_or(true, |a| post.author_id == a)
    }
}

// =============================================================================
// Post Queries
// =============================================================================

impl Post {
    pub async fn find_by_id(id: PostId, pool: &PgPool) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_slug(slug: &str, pool: &PgPool) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE slug = $1")
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_filtered(filter: &PostFilter, pool: &PgPool) -> sqlx::Result<Vec<Self>> {
        sqlx::query_as::<_, Post>(
            r#"
            SELECT * FROM posts
            WHERE ($1::bool IS NULL OR published = $1)
              AND ($2::uuid IS NULL OR author_id = $2)
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(filter.published)
        .bind(filter.author_id)
        .fetch_all(pool)
        .await
    }

    /// Posts linked to a tag, newest first
    pub async fn find_for_tag(
        tag_id: TagId,
        filter: &PostFilter,
        pool: &PgPool,
    ) -> sqlx::Result<Vec<Self>> {
        sqlx::query_as::<_, Post>(
            r#"
            SELECT p.*
            FROM posts p
            INNER JOIN post_tags pt ON pt.post_id = p.id
            WHERE pt.tag_id = $1
              AND ($2::bool IS NULL OR p.published = $2)
              AND ($3::uuid IS NULL OR p.author_id = $3)
            ORDER BY p.created_at DESC, p.id DESC
            "#,
        )
        .bind(tag_id)
        .bind(filter.published)
        .bind(filter.author_id)
        .fetch_all(pool)
        .await
    }

    /// Insert a post. A taken slug surfaces as a unique violation on `posts_slug_key`.
    pub async fn create(input: &CreatePost, pool: &PgPool) -> sqlx::Result<Self> {
        sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (id, title, slug, content, excerpt, image_url, author_id, published)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(input.id)
        .bind(&input.title)
        .bind(&input.slug)
        .bind(&input.content)
        .bind(&input.excerpt)
        .bind(&input.image_url)
        .bind(input.author_id)
        .bind(input.published)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        id: PostId,
        changes: &PostChanges,
        pool: &PgPool,
    ) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts
            SET title = COALESCE($2, title),
                content = COALESCE($3, content),
                excerpt = CASE WHEN $4 THEN $5 ELSE excerpt END,
                published = COALESCE($6, published),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&changes.title)
        .bind(&changes.content)
        .bind(changes.excerpt.is_some())
        .bind(changes.excerpt.clone().flatten())
        .bind(changes.published)
        .fetch_optional(pool)
        .await
    }

    /// Delete a post; its tag links cascade
    pub async fn delete(id: PostId, pool: &PgPool) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
