//! Event handler: the single entry point wired to the event source.
//!
//! [`Pipeline::handle_event`] is a pure function from one comment event to
//! one pipeline invocation: match the trigger, build the bundle,
//! distribute it. A non-matching event is a silent no-op, not an error.
//! Subscription machinery stays out of this module so the pipeline is
//! independently testable; concurrent events each get their own handler
//! call with no shared mutable state between them.

use crate::compose::{ComposeError, Composer};
use crate::contract::{ArtifactUploader, ReplyPoster, ReplyTarget};
use crate::distribute::{distribute, DistributeError, DistributionReport, Pacing};
use crate::trigger::{CommentEvent, TriggerMatcher};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug)]
pub enum PipelineError {
    Compose(ComposeError),
    Distribute(DistributeError),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Compose(e) => write!(f, "{e}"),
            PipelineError::Distribute(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<ComposeError> for PipelineError {
    fn from(e: ComposeError) -> Self {
        PipelineError::Compose(e)
    }
}

impl From<DistributeError> for PipelineError {
    fn from(e: DistributeError) -> Self {
        PipelineError::Distribute(e)
    }
}

/// Everything one trigger event needs: matcher, composer, pacing and the
/// two platform sessions (upload vs reply posting).
pub struct Pipeline {
    matcher: TriggerMatcher,
    composer: Composer,
    pacing: Pacing,
    uploader: Arc<dyn ArtifactUploader>,
    replies: Arc<dyn ReplyPoster>,
}

impl Pipeline {
    pub fn new(
        matcher: TriggerMatcher,
        composer: Composer,
        pacing: Pacing,
        uploader: Arc<dyn ArtifactUploader>,
        replies: Arc<dyn ReplyPoster>,
    ) -> Self {
        Pipeline {
            matcher,
            composer,
            pacing,
            uploader,
            replies,
        }
    }

    /// Handle one inbound comment event.
    ///
    /// Returns `Ok(None)` when the event does not trigger the pipeline
    /// (wrong post, no pattern match, or empty sanitized nickname);
    /// otherwise builds and distributes the bundle and returns the report.
    pub async fn handle_event(
        &self,
        event: CommentEvent,
    ) -> Result<Option<DistributionReport>, PipelineError> {
        if !self.matcher.matches_post(&event) {
            debug!(post_id = event.post_id, "Ignoring comment on unwatched post");
            return Ok(None);
        }

        let nickname = match self.matcher.extract_nickname(&event.text) {
            Some(nickname) => nickname,
            None => {
                debug!(
                    comment_id = event.comment_id,
                    "No nickname found in trigger comment"
                );
                return Ok(None);
            }
        };

        info!(
            nickname,
            comment_id = event.comment_id,
            "Trigger matched, building bundle"
        );
        let bundle = self.composer.build_bundle(&nickname)?;

        let target = ReplyTarget {
            owner_id: event.post_owner_id,
            post_id: event.post_id,
            comment_id: event.comment_id,
        };
        let report = distribute(
            &bundle,
            &nickname,
            &target,
            self.uploader.as_ref(),
            self.replies.as_ref(),
            &self.pacing,
        )
        .await?;
        Ok(Some(report))
    }
}
