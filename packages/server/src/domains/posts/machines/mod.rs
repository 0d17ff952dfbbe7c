//! Post creation state machine
//!
//! Pure decision logic - NO IO, only state transitions. The create-post
//! action performs each step and reports the outcome here; the machine
//! rejects events that do not fit the current state.
//!
//! ```text
//! Idle ──ImageUploadStarted──▶ UploadingImage ──ImageUploaded──┐
//!   └──────────ImageSkipped──────────────────────────────────▶ InsertingPost
//! InsertingPost ──PostInserted──▶ LinkingTags{linked, total} ──TagLinked──▶ (same, linked+1)
//! LinkingTags (linked == total) ──Completed──▶ Succeeded
//! UploadingImage | InsertingPost | LinkingTags ──StepFailed──▶ Failed{stage, error}
//! ```
//!
//! Nothing is rolled back on failure: an uploaded image and an inserted post
//! stay where they are, and tags linked before the failure remain linked.

use thiserror::Error;
use tracing::warn;

use crate::common::AppError;
use crate::domains::posts::models::Post;
use crate::domains::tag::models::Tag;

/// Step that was running when creation failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreatePostStage {
    UploadingImage,
    InsertingPost,
    LinkingTags,
}

impl std::fmt::Display for CreatePostStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CreatePostStage::UploadingImage => write!(f, "uploading_image"),
            CreatePostStage::InsertingPost => write!(f, "inserting_post"),
            CreatePostStage::LinkingTags => write!(f, "linking_tags"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CreatePostState {
    Idle,
    UploadingImage,
    InsertingPost {
        image_url: Option<String>,
    },
    LinkingTags {
        post: Post,
        linked: Vec<Tag>,
        total: usize,
    },
    Succeeded {
        post: Post,
        tags: Vec<Tag>,
    },
    Failed {
        stage: CreatePostStage,
        error: AppError,
    },
}

impl CreatePostState {
    pub fn name(&self) -> &'static str {
        match self {
            CreatePostState::Idle => "idle",
            CreatePostState::UploadingImage => "uploading_image",
            CreatePostState::InsertingPost { .. } => "inserting_post",
            CreatePostState::LinkingTags { .. } => "linking_tags",
            CreatePostState::Succeeded { .. } => "succeeded",
            CreatePostState::Failed { .. } => "failed",
        }
    }

    /// Stage a failure in this state would be attributed to
    fn stage(&self) -> Option<CreatePostStage> {
        match self {
            CreatePostState::UploadingImage => Some(CreatePostStage::UploadingImage),
            CreatePostState::InsertingPost { .. } => Some(CreatePostStage::InsertingPost),
            CreatePostState::LinkingTags { .. } => Some(CreatePostStage::LinkingTags),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum CreatePostEvent {
    ImageUploadStarted,
    ImageUploaded { url: String },
    ImageSkipped,
    PostInserted { post: Post, tag_count: usize },
    TagLinked { tag: Tag },
    Completed,
    StepFailed { error: AppError },
}

impl CreatePostEvent {
    fn name(&self) -> &'static str {
        match self {
            CreatePostEvent::ImageUploadStarted => "image_upload_started",
            CreatePostEvent::ImageUploaded { .. } => "image_uploaded",
            CreatePostEvent::ImageSkipped => "image_skipped",
            CreatePostEvent::PostInserted { .. } => "post_inserted",
            CreatePostEvent::TagLinked { .. } => "tag_linked",
            CreatePostEvent::Completed => "completed",
            CreatePostEvent::StepFailed { .. } => "step_failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid create-post transition: {event} while {state}")]
pub struct InvalidTransition {
    pub state: &'static str,
    pub event: &'static str,
}

impl From<InvalidTransition> for AppError {
    fn from(e: InvalidTransition) -> Self {
        AppError::Backend(e.to_string())
    }
}

/// Tracks one post creation from start to a terminal state
#[derive(Debug)]
pub struct CreatePostMachine {
    state: CreatePostState,
}

impl CreatePostMachine {
    pub fn new() -> Self {
        Self {
            state: CreatePostState::Idle,
        }
    }

    pub fn state(&self) -> &CreatePostState {
        &self.state
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self.state,
            CreatePostState::Succeeded { .. } | CreatePostState::Failed { .. }
        )
    }

    /// Image URL decided by the upload step, once past it
    pub fn image_url(&self) -> Option<&str> {
        match &self.state {
            CreatePostState::InsertingPost { image_url } => image_url.as_deref(),
            CreatePostState::LinkingTags { post, .. } | CreatePostState::Succeeded { post, .. } => {
                post.image_url.as_deref()
            }
            _ => None,
        }
    }

    /// Advance the machine. On an invalid transition the state is left untouched.
    pub fn apply(&mut self, event: CreatePostEvent) -> Result<(), InvalidTransition> {
        let invalid = InvalidTransition {
            state: self.state.name(),
            event: event.name(),
        };

        let next = match (std::mem::replace(&mut self.state, CreatePostState::Idle), event) {
            (CreatePostState::Idle, CreatePostEvent::ImageUploadStarted) => {
                CreatePostState::UploadingImage
            }
            (CreatePostState::Idle, CreatePostEvent::ImageSkipped) => {
                CreatePostState::InsertingPost { image_url: None }
            }
            (CreatePostState::UploadingImage, CreatePostEvent::ImageUploaded { url }) => {
                CreatePostState::InsertingPost {
                    image_url: Some(url),
                }
            }
            (CreatePostState::InsertingPost { .. }, CreatePostEvent::PostInserted { post, tag_count }) => {
                CreatePostState::LinkingTags {
                    post,
                    linked: Vec::with_capacity(tag_count),
                    total: tag_count,
                }
            }
            (
                CreatePostState::LinkingTags {
                    post,
                    mut linked,
                    total,
                },
                CreatePostEvent::TagLinked { tag },
            ) if linked.len() < total => {
                linked.push(tag);
                CreatePostState::LinkingTags {
                    post,
                    linked,
                    total,
                }
            }
            (
                CreatePostState::LinkingTags {
                    post,
                    linked,
                    total,
                },
                CreatePostEvent::Completed,
            ) if linked.len() == total => CreatePostState::Succeeded { post, tags: linked },
            (state, CreatePostEvent::StepFailed { error }) if state.stage().is_some() => {
                let stage = state.stage().unwrap_or(CreatePostStage::InsertingPost);
                CreatePostState::Failed { stage, error }
            }
            (state, _) => {
                self.state = state;
                return Err(invalid);
            }
        };

        self.state = next;
        Ok(())
    }

    /// Record a step failure and hand the error back for the caller to return.
    pub fn fail(&mut self, error: AppError) -> AppError {
        let stage = self.state.stage();
        match self.apply(CreatePostEvent::StepFailed {
            error: error.clone(),
        }) {
            Ok(()) => {
                warn!(stage = ?stage, error = %error, "Post creation failed");
                error
            }
            Err(invalid) => invalid.into(),
        }
    }

    /// Final result: the post and its linked tags, or the first error
    pub fn into_outcome(self) -> Result<(Post, Vec<Tag>), AppError> {
        match self.state {
            CreatePostState::Succeeded { post, tags } => Ok((post, tags)),
            CreatePostState::Failed { error, .. } => Err(error),
            other => Err(InvalidTransition {
                state: other.name(),
                event: "finish",
            }
            .into()),
        }
    }
}

impl Default for CreatePostMachine {
    fn default() -> Self {
        Self::new()
    }
}
