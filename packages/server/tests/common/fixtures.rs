//! Test fixtures for creating test data.
//!
//! Postgres tests share one database, so every fixture takes a unique suffix.

use anyhow::Result;
use newsroom_core::common::{PostId, ProfileId, Viewer};
use newsroom_core::domains::posts::models::{CreatePost, Post};
use newsroom_core::domains::profiles::{NewProfile, Role};
use newsroom_core::kernel::BaseContentStore;
use uuid::Uuid;

/// Short random suffix for names, slugs and emails
pub fn unique(prefix: &str) -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("{}-{}", prefix, &id[..8])
}

/// Insert a profile with the `user` role and return a viewer for it
pub async fn create_author(store: &dyn BaseContentStore) -> Result<Viewer> {
    let id = ProfileId::new();
    let email = format!("{}@news.example", unique("author"));
    store
        .insert_profile_if_absent(&NewProfile::from_claims(id, &email, None))
        .await?;
    store.grant_role(id, Role::User).await?;
    Ok(Viewer::authenticated(id, vec![Role::User]))
}

/// Insert a profile holding `admin` and return a viewer for it
pub async fn create_admin(store: &dyn BaseContentStore) -> Result<Viewer> {
    let viewer = create_author(store).await?;
    let id = viewer.require_auth()?;
    store.grant_role(id, Role::Admin).await?;
    Ok(Viewer::authenticated(id, vec![Role::Admin, Role::User]))
}

/// Insert a post row directly, bypassing validation and tags
pub async fn insert_post(
    store: &dyn BaseContentStore,
    author_id: ProfileId,
    slug: &str,
    published: bool,
) -> Result<Post> {
    let input = CreatePost::builder()
        .title(slug.replace('-', " "))
        .slug(slug)
        .content("Body text for a fixture post.")
        .author_id(author_id)
        .published(published)
        .build();
    Ok(store.insert_post(&input).await?)
}

pub fn ids(posts: &[Post]) -> Vec<PostId> {
    posts.iter().map(|p| p.id).collect()
}
