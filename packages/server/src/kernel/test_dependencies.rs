// TestDependencies - in-memory implementations for testing
//
// Provides an in-memory content store and a recording object storage that can be
// injected into ServerDeps for action and GraphQL tests without Postgres.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex};

use super::{BaseContentStore, BaseObjectStorage, ServerDeps};
use crate::common::utils::slug_text;
use crate::common::{AppError, AppResult, PostId, ProfileId, TagId};
use crate::domains::auth::JwtService;
use crate::domains::posts::models::{CreatePost, Post, PostChanges, PostFilter};
use crate::domains::profiles::models::{NewProfile, Profile, Role, UserRole};
use crate::domains::tag::models::{PostTag, Tag};
use crate::domains::tag::TagConflictPolicy;

/// Secret used for tokens minted in tests
pub const TEST_JWT_SECRET: &str = "newsroom-test-secret";

// =============================================================================
// In-memory Content Store
// =============================================================================

#[derive(Default)]
struct Tables {
    posts: Vec<Post>,
    tags: Vec<Tag>,
    post_tags: Vec<PostTag>,
    profiles: Vec<Profile>,
    user_roles: Vec<UserRole>,
    clock: Option<DateTime<Utc>>,
}

impl Tables {
    /// Strictly increasing timestamps so "newest first" is deterministic
    fn tick(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let next = match self.clock {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.clock = Some(next);
        next
    }

    fn sorted(mut posts: Vec<Post>) -> Vec<Post> {
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        posts
    }
}

#[derive(Default)]
struct Faults {
    read_error: Option<AppError>,
    tag_insert_error: Option<AppError>,
    tag_insert_attempts: usize,
    racing_tag: Option<String>,
    link_failure: Option<(usize, AppError)>,
    role_grant_failure: Option<(Role, AppError)>,
}

/// Content store with the same unique and cascade rules as the Postgres schema.
///
/// Author and role foreign keys to `profiles` are not enforced so action tests
/// can use bare viewers; post/tag foreign keys on links are.
///
/// `find_tag_by_slug` yields to the runtime after reading, so two creations
/// joined on one task both miss the lookup before either inserts.
#[derive(Default)]
pub struct InMemoryContentStore {
    tables: Mutex<Tables>,
    faults: Mutex<Faults>,
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    // -- fault injection ---------------------------------------------------

    /// Every read fails with `error` from now on
    pub fn fail_reads_with(&self, error: AppError) {
        self.faults.lock().unwrap().read_error = Some(error);
    }

    /// Every tag insert fails with `error` from now on
    pub fn fail_tag_inserts_with(&self, error: AppError) {
        self.faults.lock().unwrap().tag_insert_error = Some(error);
    }

    /// Before the next tag insert lands, another writer inserts `name`
    pub fn race_next_tag_insert(&self, name: &str) {
        self.faults.lock().unwrap().racing_tag = Some(name.to_string());
    }

    /// Allow `successes` more links, then fail every link with `error`
    pub fn fail_link_after(&self, successes: usize, error: AppError) {
        self.faults.lock().unwrap().link_failure = Some((successes, error));
    }

    /// The next grant of `role` fails with `error`; later grants succeed
    pub fn fail_next_role_grant_with(&self, role: Role, error: AppError) {
        self.faults.lock().unwrap().role_grant_failure = Some((role, error));
    }

    // -- inspection --------------------------------------------------------

    pub fn post_count(&self) -> usize {
        self.tables.lock().unwrap().posts.len()
    }

    pub fn tag_count(&self) -> usize {
        self.tables.lock().unwrap().tags.len()
    }

    pub fn profile_count(&self) -> usize {
        self.tables.lock().unwrap().profiles.len()
    }

    pub fn tag_insert_attempts(&self) -> usize {
        self.faults.lock().unwrap().tag_insert_attempts
    }

    pub fn post_by_slug(&self, slug: &str) -> Option<Post> {
        let tables = self.tables.lock().unwrap();
        tables.posts.iter().find(|p| p.slug == slug).cloned()
    }

    pub fn profile(&self, id: ProfileId) -> Option<Profile> {
        let tables = self.tables.lock().unwrap();
        tables.profiles.iter().find(|p| p.id == id).cloned()
    }

    /// Tag ids linked to a post, in link order
    pub fn links_for(&self, post_id: PostId) -> Vec<TagId> {
        let tables = self.tables.lock().unwrap();
        tables
            .post_tags
            .iter()
            .filter(|l| l.post_id == post_id)
            .map(|l| l.tag_id)
            .collect()
    }

    // -- internals ---------------------------------------------------------

    fn check_read(&self) -> AppResult<()> {
        match &self.faults.lock().unwrap().read_error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn insert_tag_row(tables: &mut Tables, name: &str, slug: &str) -> AppResult<Tag> {
        if tables.tags.iter().any(|t| t.slug == slug) {
            return Err(AppError::Conflict("tags_slug_key already taken".into()));
        }
        if tables.tags.iter().any(|t| t.name == name) {
            return Err(AppError::Conflict("tags_name_key already taken".into()));
        }

        let tag = Tag {
            id: TagId::new(),
            name: name.to_string(),
            slug: slug.to_string(),
            created_at: tables.tick(),
        };
        tables.tags.push(tag.clone());
        Ok(tag)
    }
}

#[async_trait]
impl BaseContentStore for InMemoryContentStore {
    async fn list_posts(&self, filter: &PostFilter) -> AppResult<Vec<Post>> {
        self.check_read()?;
        let tables = self.tables.lock().unwrap();
        let posts = tables.posts.iter().filter(|p| filter.matches(p)).cloned().collect();
        Ok(Tables::sorted(posts))
    }

    async fn find_post_by_id(&self, id: PostId) -> AppResult<Option<Post>> {
        self.check_read()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn find_post_by_slug(&self, slug: &str) -> AppResult<Option<Post>> {
        self.check_read()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables.posts.iter().find(|p| p.slug == slug).cloned())
    }

    async fn insert_post(&self, input: &CreatePost) -> AppResult<Post> {
        let mut tables = self.tables.lock().unwrap();
        if tables.posts.iter().any(|p| p.slug == input.slug) {
            return Err(AppError::Conflict("posts_slug_key already taken".into()));
        }
        if tables.posts.iter().any(|p| p.id == input.id) {
            return Err(AppError::Conflict("posts_pkey already taken".into()));
        }

        let now = tables.tick();
        let post = Post {
            id: input.id,
            title: input.title.clone(),
            slug: input.slug.clone(),
            content: input.content.clone(),
            excerpt: input.excerpt.clone(),
            image_url: input.image_url.clone(),
            author_id: input.author_id,
            published: input.published,
            created_at: now,
            updated_at: now,
        };
        tables.posts.push(post.clone());
        Ok(post)
    }

    async fn update_post(&self, id: PostId, changes: &PostChanges) -> AppResult<Post> {
        let mut tables = self.tables.lock().unwrap();
        let now = tables.tick();
        let post = tables
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::NotFound(format!("post {}", id)))?;

        changes.apply(post);
        post.updated_at = now;
        Ok(post.clone())
    }

    async fn delete_post(&self, id: PostId) -> AppResult<bool> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.posts.len();
        tables.posts.retain(|p| p.id != id);
        tables.post_tags.retain(|l| l.post_id != id);
        Ok(tables.posts.len() < before)
    }

    async fn list_posts_for_tag(
        &self,
        tag_id: TagId,
        filter: &PostFilter,
    ) -> AppResult<Vec<Post>> {
        self.check_read()?;
        let tables = self.tables.lock().unwrap();
        let posts = tables
            .posts
            .iter()
            .filter(|p| filter.matches(p))
            .filter(|p| {
                tables
                    .post_tags
                    .iter()
                    .any(|l| l.post_id == p.id && l.tag_id == tag_id)
            })
            .cloned()
            .collect();
        Ok(Tables::sorted(posts))
    }

    async fn list_tags(&self) -> AppResult<Vec<Tag>> {
        self.check_read()?;
        let mut tags = self.tables.lock().unwrap().tags.clone();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn find_tag_by_slug(&self, slug: &str) -> AppResult<Option<Tag>> {
        self.check_read()?;
        let found = {
            let tables = self.tables.lock().unwrap();
            tables.tags.iter().find(|t| t.slug == slug).cloned()
        };
        // Let a concurrent writer run between this lookup and our insert
        tokio::task::yield_now().await;
        Ok(found)
    }

    async fn insert_tag(&self, name: &str, slug: &str) -> AppResult<Tag> {
        let (racing, injected) = {
            let mut faults = self.faults.lock().unwrap();
            faults.tag_insert_attempts += 1;
            (faults.racing_tag.take(), faults.tag_insert_error.clone())
        };

        let mut tables = self.tables.lock().unwrap();
        if let Some(racing) = racing {
            Self::insert_tag_row(&mut tables, &racing, &slug_text(&racing))?;
        }
        if let Some(error) = injected {
            return Err(error);
        }
        Self::insert_tag_row(&mut tables, name, slug)
    }

    async fn delete_tag(&self, id: TagId) -> AppResult<bool> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.tags.len();
        tables.tags.retain(|t| t.id != id);
        tables.post_tags.retain(|l| l.tag_id != id);
        Ok(tables.tags.len() < before)
    }

    async fn tags_for_post(&self, post_id: PostId) -> AppResult<Vec<Tag>> {
        self.check_read()?;
        let tables = self.tables.lock().unwrap();
        let mut tags: Vec<Tag> = tables
            .tags
            .iter()
            .filter(|t| {
                tables
                    .post_tags
                    .iter()
                    .any(|l| l.post_id == post_id && l.tag_id == t.id)
            })
            .cloned()
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn link_post_tag(&self, post_id: PostId, tag_id: TagId) -> AppResult<()> {
        {
            let mut faults = self.faults.lock().unwrap();
            if let Some((remaining, error)) = faults.link_failure.as_mut() {
                if *remaining == 0 {
                    return Err(error.clone());
                }
                *remaining -= 1;
            }
        }

        let mut tables = self.tables.lock().unwrap();
        if !tables.posts.iter().any(|p| p.id == post_id) {
            return Err(AppError::Backend(
                "insert or update on table \"post_tags\" violates foreign key constraint \"post_tags_post_id_fkey\"".into(),
            ));
        }
        if !tables.tags.iter().any(|t| t.id == tag_id) {
            return Err(AppError::Backend(
                "insert or update on table \"post_tags\" violates foreign key constraint \"post_tags_tag_id_fkey\"".into(),
            ));
        }

        let link = PostTag { post_id, tag_id };
        if !tables.post_tags.contains(&link) {
            tables.post_tags.push(link);
        }
        Ok(())
    }

    async fn unlink_post_tags(&self, post_id: PostId) -> AppResult<u64> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.post_tags.len();
        tables.post_tags.retain(|l| l.post_id != post_id);
        Ok((before - tables.post_tags.len()) as u64)
    }

    async fn find_profile(&self, id: ProfileId) -> AppResult<Option<Profile>> {
        self.check_read()?;
        Ok(self.profile(id))
    }

    async fn list_profiles(&self) -> AppResult<Vec<Profile>> {
        self.check_read()?;
        let mut profiles = self.tables.lock().unwrap().profiles.clone();
        profiles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(profiles)
    }

    async fn insert_profile_if_absent(&self, input: &NewProfile) -> AppResult<(Profile, bool)> {
        let mut tables = self.tables.lock().unwrap();
        if let Some(existing) = tables.profiles.iter().find(|p| p.id == input.id) {
            return Ok((existing.clone(), false));
        }
        if tables
            .profiles
            .iter()
            .any(|p| p.email.eq_ignore_ascii_case(&input.email))
        {
            return Err(AppError::Conflict("idx_profiles_email already taken".into()));
        }

        let now = tables.tick();
        let profile = Profile {
            id: input.id,
            display_name: input.display_name.clone(),
            email: input.email.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.profiles.push(profile.clone());
        Ok((profile, true))
    }

    async fn update_profile(&self, id: ProfileId, display_name: &str) -> AppResult<Profile> {
        let mut tables = self.tables.lock().unwrap();
        let now = tables.tick();
        let profile = tables
            .profiles
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::NotFound(format!("profile {}", id)))?;

        profile.display_name = display_name.to_string();
        profile.updated_at = now;
        Ok(profile.clone())
    }

    async fn delete_profile(&self, id: ProfileId) -> AppResult<bool> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.profiles.len();
        tables.profiles.retain(|p| p.id != id);
        if tables.profiles.len() == before {
            return Ok(false);
        }

        tables.user_roles.retain(|r| r.profile_id != id);
        let removed: Vec<PostId> = tables
            .posts
            .iter()
            .filter(|p| p.author_id == id)
            .map(|p| p.id)
            .collect();
        tables.posts.retain(|p| p.author_id != id);
        tables.post_tags.retain(|l| !removed.contains(&l.post_id));
        Ok(true)
    }

    async fn roles_for(&self, id: ProfileId) -> AppResult<Vec<Role>> {
        self.check_read()?;
        let tables = self.tables.lock().unwrap();
        let mut roles: Vec<Role> = tables
            .user_roles
            .iter()
            .filter(|r| r.profile_id == id)
            .filter_map(UserRole::role)
            .collect();
        roles.sort();
        Ok(roles)
    }

    async fn list_role_assignments(&self) -> AppResult<Vec<UserRole>> {
        self.check_read()?;
        Ok(self.tables.lock().unwrap().user_roles.clone())
    }

    async fn grant_role(&self, id: ProfileId, role: Role) -> AppResult<()> {
        {
            let mut faults = self.faults.lock().unwrap();
            if matches!(&faults.role_grant_failure, Some((failing, _)) if *failing == role) {
                if let Some((_, error)) = faults.role_grant_failure.take() {
                    return Err(error);
                }
            }
        }

        let mut tables = self.tables.lock().unwrap();
        let held = tables
            .user_roles
            .iter()
            .any(|r| r.profile_id == id && r.role() == Some(role));
        if !held {
            let now = tables.tick();
            tables.user_roles.push(UserRole {
                profile_id: id,
                role: role.to_string(),
                created_at: now,
            });
        }
        Ok(())
    }

    async fn revoke_role(&self, id: ProfileId, role: Role) -> AppResult<bool> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.user_roles.len();
        tables
            .user_roles
            .retain(|r| !(r.profile_id == id && r.role() == Some(role)));
        Ok(tables.user_roles.len() < before)
    }

    async fn ping(&self) -> AppResult<()> {
        self.check_read()
    }
}

// =============================================================================
// Mock Object Storage
// =============================================================================

/// An upload captured by MockObjectStorage
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedUpload {
    pub path: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Default)]
pub struct MockObjectStorage {
    uploads: Mutex<Vec<RecordedUpload>>,
    failure: Mutex<Option<AppError>>,
}

impl MockObjectStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every upload fails with `error` from now on
    pub fn fail_uploads_with(&self, error: AppError) {
        *self.failure.lock().unwrap() = Some(error);
    }

    /// Get all successful uploads
    pub fn uploads(&self) -> Vec<RecordedUpload> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl BaseObjectStorage for MockObjectStorage {
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> AppResult<()> {
        if let Some(error) = self.failure.lock().unwrap().clone() {
            return Err(error);
        }

        let mut uploads = self.uploads.lock().unwrap();
        if uploads.iter().any(|u| u.path == path) {
            return Err(AppError::Conflict(format!("object {} already exists", path)));
        }
        uploads.push(RecordedUpload {
            path: path.to_string(),
            content_type: content_type.to_string(),
            bytes,
        });
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("https://storage.test/post-images/{}", path)
    }
}

// =============================================================================
// TestDependencies
// =============================================================================

pub struct TestDependencies {
    pub store: Arc<InMemoryContentStore>,
    pub storage: Arc<MockObjectStorage>,
    pub jwt_service: Arc<JwtService>,
    pub tag_conflict_policy: TagConflictPolicy,
    pub admin_emails: Vec<String>,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            store: Arc::new(InMemoryContentStore::new()),
            storage: Arc::new(MockObjectStorage::new()),
            jwt_service: Arc::new(JwtService::new(TEST_JWT_SECRET, None)),
            tag_conflict_policy: TagConflictPolicy::default(),
            admin_emails: Vec::new(),
        }
    }

    /// Emails that always hold the admin role
    pub fn with_admin_emails(mut self, emails: Vec<&str>) -> Self {
        self.admin_emails = emails.into_iter().map(|e| e.to_lowercase()).collect();
        self
    }

    pub fn with_tag_conflict_policy(mut self, policy: TagConflictPolicy) -> Self {
        self.tag_conflict_policy = policy;
        self
    }

    /// ServerDeps sharing this instance's store and storage
    pub fn deps(&self) -> ServerDeps {
        ServerDeps::new(
            self.store.clone(),
            self.storage.clone(),
            self.jwt_service.clone(),
            self.tag_conflict_policy,
            self.admin_emails.clone(),
        )
    }

    /// A signed bearer token for an identity, as the identity provider would issue
    pub fn token_for(&self, identity: ProfileId, email: &str) -> Result<String> {
        self.jwt_service.create_token(identity.into_uuid(), email, None)
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
