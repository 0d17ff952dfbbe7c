//! Read paths. Absence is `Ok(None)` or an empty list, never an error.

use crate::common::{Actor, AppResult, Capability, PostId, Viewer};
use crate::domains::posts::models::{Post, PostFilter};
use crate::domains::profiles::models::Profile;
use crate::domains::tag::models::Tag;
use crate::kernel::ServerDeps;

/// Published posts, newest first
pub async fn list_published_posts(deps: &ServerDeps) -> AppResult<Vec<Post>> {
    deps.store.list_posts(&PostFilter::published()).await
}

/// A post by slug as the viewer may see it.
///
/// Published posts are visible to everyone. Unpublished posts are visible to
/// their author and administrators; anyone else gets `None`, exactly as if
/// the slug did not exist.
pub async fn find_post_by_slug(
    viewer: &Viewer,
    slug: &str,
    deps: &ServerDeps,
) -> AppResult<Option<Post>> {
    let Some(post) = deps.store.find_post_by_slug(slug).await? else {
        return Ok(None);
    };

    if post.published {
        return Ok(Some(post));
    }

    let visible = Actor::new(viewer)
        .can(Capability::ViewUnpublished)
        .owned_by(post.author_id)
        .check()
        .is_ok();

    Ok(visible.then_some(post))
}

/// Published posts carrying the tag with this slug, newest first.
/// Unknown slugs yield an empty list.
pub async fn list_posts_for_tag(slug: &str, deps: &ServerDeps) -> AppResult<Vec<Post>> {
    let Some(tag) = deps.store.find_tag_by_slug(slug).await? else {
        return Ok(Vec::new());
    };

    deps.store
        .list_posts_for_tag(tag.id, &PostFilter::published())
        .await
}

/// The viewer's own posts, drafts included
pub async fn list_my_posts(viewer: &Viewer, deps: &ServerDeps) -> AppResult<Vec<Post>> {
    let identity = viewer.require_auth()?;
    deps.store.list_posts(&PostFilter::by_author(identity)).await
}

pub async fn tags_for_post(post_id: PostId, deps: &ServerDeps) -> AppResult<Vec<Tag>> {
    deps.store.tags_for_post(post_id).await
}

pub async fn author_for_post(post: &Post, deps: &ServerDeps) -> AppResult<Option<Profile>> {
    deps.store.find_profile(post.author_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{AppError, AuthError, ProfileId};
    use crate::domains::posts::actions::{create_post, CreatePostRequest};
    use crate::domains::profiles::Role;
    use crate::kernel::test_dependencies::TestDependencies;

    async fn publish(
        test: &TestDependencies,
        viewer: &Viewer,
        title: &str,
        tags: Option<&str>,
        published: bool,
    ) -> Post {
        create_post(
            viewer,
            CreatePostRequest {
                title: title.into(),
                content: "Body".into(),
                tags: tags.map(String::from),
                published: Some(published),
                ..Default::default()
            },
            &test.deps(),
        )
        .await
        .unwrap()
        .post
    }

    #[tokio::test]
    async fn test_published_listing_is_newest_first_and_skips_drafts() {
        let test = TestDependencies::new();
        let author = Viewer::authenticated(ProfileId::new(), vec![Role::User]);

        publish(&test, &author, "Oldest", None, true).await;
        publish(&test, &author, "Draft", None, false).await;
        publish(&test, &author, "Newest", None, true).await;

        let slugs: Vec<String> = list_published_posts(&test.deps())
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.slug)
            .collect();
        assert_eq!(slugs, vec!["newest", "oldest"]);
    }

    #[tokio::test]
    async fn test_unpublished_post_visibility() {
        let test = TestDependencies::new();
        let deps = test.deps();
        let author = Viewer::authenticated(ProfileId::new(), vec![Role::User]);
        let stranger = Viewer::authenticated(ProfileId::new(), vec![Role::User]);
        let admin = Viewer::authenticated(ProfileId::new(), vec![Role::Admin]);

        publish(&test, &author, "Embargoed Story", None, false).await;

        let slug = "embargoed-story";
        assert!(find_post_by_slug(&Viewer::anonymous(), slug, &deps)
            .await
            .unwrap()
            .is_none());
        assert!(find_post_by_slug(&stranger, slug, &deps).await.unwrap().is_none());
        assert!(find_post_by_slug(&author, slug, &deps).await.unwrap().is_some());
        assert!(find_post_by_slug(&admin, slug, &deps).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_unknown_slug_is_none_not_error() {
        let test = TestDependencies::new();
        assert!(find_post_by_slug(&Viewer::anonymous(), "nope", &test.deps())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_backend_failure_is_distinct_from_not_found() {
        let test = TestDependencies::new();
        test.store.fail_reads_with(AppError::Transport("pool timed out".into()));

        let err = find_post_by_slug(&Viewer::anonymous(), "anything", &test.deps())
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_tag_listing() {
        let test = TestDependencies::new();
        let deps = test.deps();
        let author = Viewer::authenticated(ProfileId::new(), vec![Role::User]);

        publish(&test, &author, "Gale Warning", Some("Weather"), true).await;
        publish(&test, &author, "Draft Forecast", Some("Weather"), false).await;
        publish(&test, &author, "Council Vote", Some("Politics"), true).await;

        let weather = list_posts_for_tag("weather", &deps).await.unwrap();
        assert_eq!(weather.len(), 1);
        assert_eq!(weather[0].slug, "gale-warning");

        assert!(list_posts_for_tag("no-such-tag", &deps).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_tag_with_zero_posts_is_empty() {
        let test = TestDependencies::new();
        let deps = test.deps();
        let author = Viewer::authenticated(ProfileId::new(), vec![Role::User]);

        publish(&test, &author, "Only Draft", Some("Arts"), false).await;
        assert!(list_posts_for_tag("arts", &deps).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_my_posts_include_drafts_and_need_identity() {
        let test = TestDependencies::new();
        let deps = test.deps();
        let author = Viewer::authenticated(ProfileId::new(), vec![Role::User]);
        let other = Viewer::authenticated(ProfileId::new(), vec![Role::User]);

        publish(&test, &author, "Mine", None, true).await;
        publish(&test, &author, "My Draft", None, false).await;
        publish(&test, &other, "Theirs", None, true).await;

        assert_eq!(list_my_posts(&author, &deps).await.unwrap().len(), 2);

        let err = list_my_posts(&Viewer::anonymous(), &deps).await.unwrap_err();
        assert_eq!(err, AppError::Auth(AuthError::AuthenticationRequired));
    }
}
