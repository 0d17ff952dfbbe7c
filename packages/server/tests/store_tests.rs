//! PostgresContentStore tests against a real database.
//!
//! Constraint names and cascades here are what the in-memory store mirrors.

mod common;

use crate::common::{create_admin, create_author, ids, insert_post, unique, TestHarness};
use newsroom_core::common::{AppError, ProfileId};
use newsroom_core::domains::posts::actions::{create_post, CreatePostRequest};
use newsroom_core::domains::posts::models::{PostChanges, PostFilter};
use newsroom_core::domains::profiles::{NewProfile, Role};
use newsroom_core::domains::tag::TagConflictPolicy;
use newsroom_core::kernel::BaseContentStore;
use test_context::test_context;

// ============================================================================
// Posts
// ============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn duplicate_post_slug_is_a_conflict(ctx: &mut TestHarness) {
    let store = ctx.store();
    let author = create_author(&store).await.unwrap();
    let author_id = author.require_auth().unwrap();
    let slug = unique("dup-slug");

    insert_post(&store, author_id, &slug, true).await.unwrap();
    let err = insert_post(&store, author_id, &slug, true)
        .await
        .unwrap_err()
        .downcast::<AppError>()
        .unwrap();

    assert_eq!(err, AppError::Conflict("posts_slug_key already taken".into()));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn filters_by_author_and_published(ctx: &mut TestHarness) {
    let store = ctx.store();
    let author = create_author(&store).await.unwrap();
    let author_id = author.require_auth().unwrap();

    let older = insert_post(&store, author_id, &unique("older"), true).await.unwrap();
    let draft = insert_post(&store, author_id, &unique("draft"), false).await.unwrap();
    let newer = insert_post(&store, author_id, &unique("newer"), true).await.unwrap();

    let all = store.list_posts(&PostFilter::by_author(author_id)).await.unwrap();
    assert_eq!(ids(&all), vec![newer.id, draft.id, older.id]);

    let filter = PostFilter {
        published: Some(true),
        author_id: Some(author_id),
    };
    let published = store.list_posts(&filter).await.unwrap();
    assert_eq!(ids(&published), vec![newer.id, older.id]);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn update_changes_fields_and_clears_excerpt(ctx: &mut TestHarness) {
    let store = ctx.store();
    let author = create_author(&store).await.unwrap();
    let post = insert_post(&store, author.require_auth().unwrap(), &unique("edit"), true)
        .await
        .unwrap();

    let updated = store
        .update_post(
            post.id,
            &PostChanges {
                title: Some("Corrected headline".into()),
                excerpt: Some(Some("Short teaser".into())),
                published: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.title, "Corrected headline");
    assert_eq!(updated.excerpt.as_deref(), Some("Short teaser"));
    assert!(!updated.published);
    assert_eq!(updated.slug, post.slug);

    let cleared = store
        .update_post(
            post.id,
            &PostChanges {
                excerpt: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(cleared.excerpt, None);
    assert_eq!(cleared.title, "Corrected headline");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn updating_a_missing_post_is_not_found(ctx: &mut TestHarness) {
    let store = ctx.store();
    let result = store
        .update_post(
            newsroom_core::common::PostId::new(),
            &PostChanges {
                title: Some("Ghost".into()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

// ============================================================================
// Tags and links
// ============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn duplicate_tag_slug_is_a_conflict(ctx: &mut TestHarness) {
    let store = ctx.store();
    let slug = unique("tag");

    let tag = store.insert_tag(&slug, &slug).await.unwrap();
    let err = store
        .insert_tag(&slug.to_uppercase(), &slug)
        .await
        .unwrap_err();

    assert!(err.is_conflict());
    assert!(!err.is_retryable());
    assert_eq!(store.find_tag_by_slug(&slug).await.unwrap(), Some(tag));
    assert_eq!(store.find_tag_by_slug(&slug.to_uppercase()).await.unwrap(), None);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn links_are_idempotent_and_cascade(ctx: &mut TestHarness) {
    let store = ctx.store();
    let author = create_author(&store).await.unwrap();
    let author_id = author.require_auth().unwrap();
    let post = insert_post(&store, author_id, &unique("linked"), true).await.unwrap();
    let draft = insert_post(&store, author_id, &unique("linked-draft"), false).await.unwrap();
    let slug = unique("topic");
    let tag = store.insert_tag(&slug, &slug).await.unwrap();

    store.link_post_tag(post.id, tag.id).await.unwrap();
    store.link_post_tag(post.id, tag.id).await.unwrap();
    store.link_post_tag(draft.id, tag.id).await.unwrap();

    assert_eq!(store.tags_for_post(post.id).await.unwrap(), vec![tag.clone()]);

    let public = store
        .list_posts_for_tag(tag.id, &PostFilter::published())
        .await
        .unwrap();
    assert_eq!(ids(&public), vec![post.id]);

    assert!(store.delete_post(post.id).await.unwrap());
    let remaining = store
        .list_posts_for_tag(tag.id, &PostFilter::all())
        .await
        .unwrap();
    assert_eq!(ids(&remaining), vec![draft.id]);

    assert!(store.delete_tag(tag.id).await.unwrap());
    assert!(store.tags_for_post(draft.id).await.unwrap().is_empty());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn linking_a_missing_tag_is_rejected(ctx: &mut TestHarness) {
    let store = ctx.store();
    let author = create_author(&store).await.unwrap();
    let post = insert_post(&store, author.require_auth().unwrap(), &unique("orphan"), true)
        .await
        .unwrap();

    let err = store
        .link_post_tag(post.id, newsroom_core::common::TagId::new())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Backend(_)));
}

// ============================================================================
// Profiles and roles
// ============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn profile_insert_is_idempotent(ctx: &mut TestHarness) {
    let store = ctx.store();
    let id = ProfileId::new();
    let email = format!("{}@news.example", unique("reader"));
    let profile = NewProfile::from_claims(id, &email, Some("Reader"));

    let (first, created) = store.insert_profile_if_absent(&profile).await.unwrap();
    assert!(created);
    let (second, created_again) = store.insert_profile_if_absent(&profile).await.unwrap();
    assert!(!created_again);
    assert_eq!(first, second);

    // Emails are unique regardless of case
    let other = NewProfile::from_claims(ProfileId::new(), &email.to_uppercase(), None);
    let err = store.insert_profile_if_absent(&other).await.unwrap_err();
    assert!(err.is_conflict());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn roles_grant_and_revoke(ctx: &mut TestHarness) {
    let store = ctx.store();
    let admin = create_admin(&store).await.unwrap();
    let id = admin.require_auth().unwrap();

    store.grant_role(id, Role::Admin).await.unwrap();
    assert_eq!(store.roles_for(id).await.unwrap(), vec![Role::Admin, Role::User]);

    assert!(store.revoke_role(id, Role::Admin).await.unwrap());
    assert!(!store.revoke_role(id, Role::Admin).await.unwrap());
    assert_eq!(store.roles_for(id).await.unwrap(), vec![Role::User]);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn deleting_a_profile_removes_posts_and_roles(ctx: &mut TestHarness) {
    let store = ctx.store();
    let author = create_author(&store).await.unwrap();
    let id = author.require_auth().unwrap();
    let post = insert_post(&store, id, &unique("gone"), true).await.unwrap();

    assert!(store.delete_profile(id).await.unwrap());

    assert_eq!(store.find_post_by_id(post.id).await.unwrap(), None);
    assert!(store.roles_for(id).await.unwrap().is_empty());
    assert!(!store.delete_profile(id).await.unwrap());
}

// ============================================================================
// End to end over Postgres
// ============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn concurrent_posts_share_one_new_tag(ctx: &mut TestHarness) {
    let deps = ctx.deps(TagConflictPolicy::RetryOnConflict);
    let alice = create_author(deps.store.as_ref()).await.unwrap();
    let bob = create_author(deps.store.as_ref()).await.unwrap();
    let tag_name = unique("Storm Desk");

    let request = |title: String| CreatePostRequest {
        title,
        content: "Live coverage from the coast.".to_string(),
        tags: Some(tag_name.clone()),
        ..Default::default()
    };

    let (first, second) = tokio::join!(
        create_post(&alice, request(unique("Coast A")), &deps),
        create_post(&bob, request(unique("Coast B")), &deps),
    );
    let (first, second) = (first.unwrap(), second.unwrap());

    assert_eq!(first.tags.len(), 1);
    assert_eq!(first.tags[0].id, second.tags[0].id);

    let tagged = deps
        .store
        .list_posts_for_tag(first.tags[0].id, &PostFilter::all())
        .await
        .unwrap();
    assert_eq!(tagged.len(), 2);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn created_post_is_readable_by_slug(ctx: &mut TestHarness) {
    let deps = ctx.deps(TagConflictPolicy::default());
    let author = create_author(deps.store.as_ref()).await.unwrap();
    let title = unique("Belfast Storm Warning");

    let created = create_post(
        &author,
        CreatePostRequest {
            title: title.clone(),
            content: "Met Office issues amber warning.".into(),
            tags: Some(format!("{}, {}", unique("Weather"), unique("Local"))),
            published: Some(false),
            ..Default::default()
        },
        &deps,
    )
    .await
    .unwrap();

    assert_eq!(created.post.slug, newsroom_core::common::utils::slug_text(&title));
    assert!(!created.post.published);
    assert_eq!(created.tags.len(), 2);

    let found = deps.store.find_post_by_slug(&created.post.slug).await.unwrap();
    assert_eq!(found.map(|p| p.id), Some(created.post.id));
}
