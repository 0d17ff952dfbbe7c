//! Two posts introducing the same new tag at the same time.
//!
//! The in-memory store yields between the tag lookup and the insert, so both
//! creations miss the lookup and race on the insert. Exactly one insert wins.

use newsroom_core::common::{ProfileId, Viewer};
use newsroom_core::domains::posts::actions::{create_post, CreatePostRequest};
use newsroom_core::domains::profiles::Role;
use newsroom_core::domains::tag::TagConflictPolicy;
use newsroom_core::kernel::TestDependencies;

fn author() -> Viewer {
    Viewer::authenticated(ProfileId::new(), vec![Role::User])
}

fn request(title: &str, tags: &str) -> CreatePostRequest {
    CreatePostRequest {
        title: title.to_string(),
        content: "Reports are coming in from across the region.".to_string(),
        tags: Some(tags.to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn retry_on_conflict_links_both_posts_to_one_tag() {
    let test = TestDependencies::new().with_tag_conflict_policy(TagConflictPolicy::RetryOnConflict);
    let deps = test.deps();
    let (alice, bob) = (author(), author());

    let (first, second) = tokio::join!(
        create_post(&alice, request("Flooding in Newry", "Breaking News"), &deps),
        create_post(&bob, request("Flooding in Armagh", "breaking news"), &deps),
    );

    let first = first.unwrap();
    let second = second.unwrap();

    assert_eq!(test.store.tag_count(), 1);
    assert_eq!(first.tags.len(), 1);
    assert_eq!(second.tags.len(), 1);
    assert_eq!(first.tags[0].id, second.tags[0].id);
    assert_eq!(test.store.links_for(first.post.id), vec![first.tags[0].id]);
    assert_eq!(test.store.links_for(second.post.id), vec![first.tags[0].id]);
    // Both lost the lookup, so both attempted an insert
    assert_eq!(test.store.tag_insert_attempts(), 2);
}

#[tokio::test]
async fn fail_fast_surfaces_the_conflict_to_one_caller() {
    let test = TestDependencies::new().with_tag_conflict_policy(TagConflictPolicy::FailFast);
    let deps = test.deps();
    let (alice, bob) = (author(), author());

    let (first, second) = tokio::join!(
        create_post(&alice, request("Snow in Omagh", "Winter Weather"), &deps),
        create_post(&bob, request("Snow in Enniskillen", "Winter Weather"), &deps),
    );

    let outcomes = [first, second];
    let failures: Vec<_> = outcomes.iter().filter_map(|r| r.as_ref().err()).collect();
    let successes: Vec<_> = outcomes.iter().filter_map(|r| r.as_ref().ok()).collect();

    assert_eq!(failures.len(), 1);
    assert!(failures[0].is_conflict());
    assert!(!failures[0].is_retryable());
    assert_eq!(successes.len(), 1);
    assert_eq!(successes[0].tags.len(), 1);
    assert_eq!(test.store.tag_count(), 1);

    // The losing post row stays, unlinked
    assert_eq!(test.store.post_count(), 2);
    let loser = ["snow-in-omagh", "snow-in-enniskillen"]
        .into_iter()
        .filter_map(|slug| test.store.post_by_slug(slug))
        .find(|p| p.id != successes[0].post.id)
        .unwrap();
    assert!(test.store.links_for(loser.id).is_empty());
}

#[tokio::test]
async fn sequential_creations_never_conflict() {
    let test = TestDependencies::new().with_tag_conflict_policy(TagConflictPolicy::FailFast);
    let deps = test.deps();
    let writer = author();

    create_post(&writer, request("Morning Briefing", "Briefing"), &deps)
        .await
        .unwrap();
    create_post(&writer, request("Evening Briefing", "briefing"), &deps)
        .await
        .unwrap();

    assert_eq!(test.store.tag_count(), 1);
    assert_eq!(test.store.tag_insert_attempts(), 1);
}
