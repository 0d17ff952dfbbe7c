use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Upper bound on find/insert rounds while resolving a single tag
pub const MAX_TAG_RESOLVE_ATTEMPTS: u32 = 3;

/// What tag resolution does when its insert loses a race to a concurrent
/// insert of the same slug.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagConflictPolicy {
    /// Treat the conflict as "the tag exists now": look it up again and reuse it.
    #[default]
    RetryOnConflict,
    /// Surface the conflict and abort the surrounding post write.
    FailFast,
}

impl std::fmt::Display for TagConflictPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TagConflictPolicy::RetryOnConflict => write!(f, "retry_on_conflict"),
            TagConflictPolicy::FailFast => write!(f, "fail_fast"),
        }
    }
}

impl std::str::FromStr for TagConflictPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "retry_on_conflict" | "retry" => Ok(TagConflictPolicy::RetryOnConflict),
            "fail_fast" => Ok(TagConflictPolicy::FailFast),
            _ => Err(anyhow::anyhow!("Invalid tag conflict policy: {}", s)),
        }
    }
}
