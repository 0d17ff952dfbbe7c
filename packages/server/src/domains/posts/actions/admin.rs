//! Moderation views for administrators.

use crate::common::{Actor, AppResult, Capability, Viewer};
use crate::domains::posts::models::{Post, PostFilter};
use crate::domains::profiles::actions::attach_roles;
use crate::domains::profiles::models::UserWithRoles;
use crate::kernel::ServerDeps;

/// Every post including drafts, newest first
pub async fn list_all_posts(viewer: &Viewer, deps: &ServerDeps) -> AppResult<Vec<Post>> {
    Actor::new(viewer).can(Capability::ModeratePosts).check()?;
    deps.store.list_posts(&PostFilter::all()).await
}

#[derive(Debug, Clone)]
pub struct AdminDashboard {
    pub posts: Vec<Post>,
    pub users: Vec<UserWithRoles>,
}

impl AdminDashboard {
    pub fn published_count(&self) -> usize {
        self.posts.iter().filter(|p| p.published).count()
    }

    pub fn draft_count(&self) -> usize {
        self.posts.len() - self.published_count()
    }

    pub fn admin_count(&self) -> usize {
        self.users.iter().filter(|u| u.is_admin()).count()
    }
}

/// Posts and users fetched concurrently; either failure fails the whole view
pub async fn dashboard(viewer: &Viewer, deps: &ServerDeps) -> AppResult<AdminDashboard> {
    Actor::new(viewer).can(Capability::ModeratePosts).check()?;
    Actor::new(viewer).can(Capability::ManageUsers).check()?;

    let all_posts = PostFilter::all();
    let (posts, profiles, assignments) = tokio::try_join!(
        deps.store.list_posts(&all_posts),
        deps.store.list_profiles(),
        deps.store.list_role_assignments(),
    )?;

    Ok(AdminDashboard {
        posts,
        users: attach_roles(profiles, assignments),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{AppError, AuthError, ProfileId};
    use crate::domains::posts::actions::{create_post, CreatePostRequest};
    use crate::domains::profiles::actions::ensure_viewer;
    use crate::domains::profiles::Role;
    use crate::kernel::test_dependencies::TestDependencies;

    #[tokio::test]
    async fn test_dashboard_combines_posts_and_users() {
        let test = TestDependencies::new().with_admin_emails(vec!["chief@news.example"]);
        let deps = test.deps();
        let admin = ensure_viewer(ProfileId::new(), "chief@news.example", None, &deps)
            .await
            .unwrap();
        let author = ensure_viewer(ProfileId::new(), "ana@news.example", None, &deps)
            .await
            .unwrap();

        for (title, published) in [("Live", true), ("Draft", false)] {
            create_post(
                &author,
                CreatePostRequest {
                    title: title.into(),
                    content: "Body".into(),
                    published: Some(published),
                    ..Default::default()
                },
                &deps,
            )
            .await
            .unwrap();
        }

        let view = dashboard(&admin, &deps).await.unwrap();
        assert_eq!(view.posts.len(), 2);
        assert_eq!(view.published_count(), 1);
        assert_eq!(view.draft_count(), 1);
        assert_eq!(view.users.len(), 2);
        assert_eq!(view.admin_count(), 1);

        assert_eq!(list_all_posts(&admin, &deps).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_dashboard_is_admin_only() {
        let test = TestDependencies::new();
        let deps = test.deps();
        let user = ensure_viewer(ProfileId::new(), "ana@news.example", None, &deps)
            .await
            .unwrap();

        let err = dashboard(&user, &deps).await.unwrap_err();
        assert_eq!(err, AppError::Auth(AuthError::AdminRequired));
        let err = list_all_posts(&user, &deps).await.unwrap_err();
        assert_eq!(err, AppError::Auth(AuthError::AdminRequired));
    }

    #[tokio::test]
    async fn test_dashboard_surfaces_backend_failure() {
        let test = TestDependencies::new();
        let deps = test.deps();
        let admin = Viewer::authenticated(ProfileId::new(), vec![Role::Admin]);
        test.store.fail_reads_with(AppError::Transport("pool timed out".into()));

        let err = dashboard(&admin, &deps).await.unwrap_err();
        assert!(err.is_retryable());
    }
}
