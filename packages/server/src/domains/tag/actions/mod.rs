//! Tag actions - vocabulary reads, admin deletes and find-or-create resolution.

pub mod resolve;

pub use resolve::{link_tags, parse_tag_names, resolve_tag};

use tracing::info;

use crate::common::{Actor, AppError, AppResult, Capability, TagId, Viewer};
use crate::domains::tag::models::Tag;
use crate::kernel::ServerDeps;

pub async fn list_tags(deps: &ServerDeps) -> AppResult<Vec<Tag>> {
    deps.store.list_tags().await
}

/// Exact slug lookup; unknown slugs are `None`
pub async fn find_tag_by_slug(slug: &str, deps: &ServerDeps) -> AppResult<Option<Tag>> {
    deps.store.find_tag_by_slug(slug).await
}

/// Remove a tag from the vocabulary (admin only). Post links cascade.
pub async fn delete_tag(viewer: &Viewer, id: TagId, deps: &ServerDeps) -> AppResult<()> {
    let actor_id = Actor::new(viewer).can(Capability::ManageTags).check()?;

    if !deps.store.delete_tag(id).await? {
        return Err(AppError::NotFound(format!("tag {}", id)));
    }

    info!(tag_id = %id, deleted_by = %actor_id, "Deleted tag");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{AuthError, ProfileId};
    use crate::domains::profiles::Role;
    use crate::domains::tag::TagConflictPolicy;
    use crate::kernel::test_dependencies::TestDependencies;

    #[tokio::test]
    async fn test_only_admins_delete_tags() {
        let test = TestDependencies::new();
        let deps = test.deps();
        let tag = resolve_tag(deps.store.as_ref(), "Weather", TagConflictPolicy::default())
            .await
            .unwrap();

        let user = Viewer::authenticated(ProfileId::new(), vec![Role::User]);
        let err = delete_tag(&user, tag.id, &deps).await.unwrap_err();
        assert_eq!(err, AppError::Auth(AuthError::AdminRequired));

        let admin = Viewer::authenticated(ProfileId::new(), vec![Role::Admin]);
        delete_tag(&admin, tag.id, &deps).await.unwrap();
        assert!(find_tag_by_slug("weather", &deps).await.unwrap().is_none());

        let err = delete_tag(&admin, tag.id, &deps).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_tags_is_sorted_by_name() {
        let test = TestDependencies::new();
        let deps = test.deps();
        for name in ["Weather", "Arts", "Politics"] {
            resolve_tag(deps.store.as_ref(), name, TagConflictPolicy::default())
                .await
                .unwrap();
        }

        let names: Vec<String> = list_tags(&deps).await.unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["Arts", "Politics", "Weather"]);
    }
}
