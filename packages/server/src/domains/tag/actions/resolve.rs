//! Tag find-or-create and post linking.
//!
//! Resolution runs without a transaction: a lookup by slug, then an insert
//! when nothing was found. Two writers introducing the same new tag can both
//! miss on the lookup; the loser's insert hits the unique slug constraint and
//! the configured `TagConflictPolicy` decides what happens next.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::common::utils::slug_text;
use crate::common::{AppError, AppResult, PostId};
use crate::domains::tag::models::Tag;
use crate::domains::tag::{TagConflictPolicy, MAX_TAG_RESOLVE_ATTEMPTS};
use crate::kernel::BaseContentStore;

/// Split comma-separated tag input into distinct tag names.
///
/// Entries are trimmed; blanks and entries with no usable slug are dropped;
/// entries sharing a slug collapse to the first one seen, keeping its casing.
pub fn parse_tag_names(raw: &str) -> Vec<String> {
    let mut seen = HashSet::new();

    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .filter_map(|name| {
            let slug = slug_text(name);
            (!slug.is_empty() && seen.insert(slug)).then(|| name.to_string())
        })
        .collect()
}

/// Find a tag by the slug of `name`, creating it when absent.
pub async fn resolve_tag(
    store: &dyn BaseContentStore,
    name: &str,
    policy: TagConflictPolicy,
) -> AppResult<Tag> {
    let slug = slug_text(name);
    if slug.is_empty() {
        return Err(AppError::validation(format!(
            "tag '{}' has no usable characters",
            name
        )));
    }

    let mut attempt = 0;
    loop {
        attempt += 1;

        if let Some(existing) = store.find_tag_by_slug(&slug).await? {
            return Ok(existing);
        }

        match store.insert_tag(name, &slug).await {
            Ok(created) => {
                debug!(tag_id = %created.id, slug = %created.slug, "Created tag");
                return Ok(created);
            }
            Err(err) if err.is_conflict() => match policy {
                TagConflictPolicy::RetryOnConflict if attempt < MAX_TAG_RESOLVE_ATTEMPTS => {
                    debug!(slug = %slug, attempt, "Tag inserted concurrently, looking it up again");
                }
                _ => {
                    warn!(slug = %slug, attempt, ?policy, "Giving up on tag after conflict");
                    return Err(err);
                }
            },
            Err(err) => return Err(err),
        }
    }
}

/// Resolve each name and link it to the post, sequentially in input order.
///
/// Stops at the first failure; links made before it stay in place.
pub async fn link_tags(
    store: &dyn BaseContentStore,
    post_id: PostId,
    names: &[String],
    policy: TagConflictPolicy,
) -> AppResult<Vec<Tag>> {
    let mut linked = Vec::with_capacity(names.len());

    for name in names {
        let tag = resolve_tag(store, name, policy).await?;
        store.link_post_tag(post_id, tag.id).await?;
        linked.push(tag);
    }

    Ok(linked)
}
