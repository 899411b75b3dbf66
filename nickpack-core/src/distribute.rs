//! High-level pipeline: paced upload sequence and reply composition.
//!
//! This module owns the ordered distribution sequence for one bundle:
//!   - Uploads the three images as preview artifacts, one paced call each
//!   - Uploads the two covers as documents
//!   - Posts reply #1 (previews inline, cover documents attached)
//!   - Packs the bundle archive and uploads avatar + archive as documents
//!   - Posts reply #2 (avatar document and archive attached)
//!
//! # Major Types
//! - [`Pacing`]: randomized delay inserted before every remote call
//! - [`DistributionReport`]: what was uploaded and posted, for audit/logs
//!
//! # Responsibilities
//! - Strictly sequential, fail-fast orchestration: the first failed remote
//!   call aborts the remaining steps
//! - Sole recovery point: on any failure, sends exactly one best-effort
//!   fallback reply into the thread; a failing fallback is logged, never
//!   retried
//! - Invokes logging throughout for traceability
//!
//! # Error Handling
//! Component failures (upload, save, archive, reply) bubble unmodified
//! into [`DistributeError`]; no partial sequence is ever reported as
//! success.

use crate::archive::{pack_bundle, ArchiveError};
use crate::compose::Bundle;
use crate::contract::{
    ArtifactUploadResult, ArtifactUploader, ReplyError, ReplyPoster, ReplyTarget, UploadError,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, error, info};

/// Bounds for the uniform pacing delay before each remote call.
///
/// These are empirically tuned against the platform's burst limits;
/// tests zero them out.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Pacing {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl Default for Pacing {
    fn default() -> Self {
        Pacing {
            min_ms: 1000,
            max_ms: 3000,
        }
    }
}

impl Pacing {
    /// Suspend for a uniformly distributed delay within the bounds.
    pub async fn pause(&self) {
        let millis = {
            let mut rng = rand::thread_rng();
            rng.gen_range(self.min_ms..=self.max_ms)
        };
        debug!(millis, "Pacing before remote call");
        tokio::time::sleep(Duration::from_millis(millis)).await;
    }
}

/// Everything the sequence uploaded and posted, for downstream audit.
#[derive(Debug)]
pub struct DistributionReport {
    pub artifacts: Vec<ArtifactUploadResult>,
    pub replies_posted: usize,
}

#[derive(Debug)]
pub enum DistributeError {
    Upload(UploadError),
    Archive(ArchiveError),
    Reply(ReplyError),
}

impl fmt::Display for DistributeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistributeError::Upload(e) => write!(f, "{e}"),
            DistributeError::Archive(e) => write!(f, "{e}"),
            DistributeError::Reply(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for DistributeError {}

impl From<UploadError> for DistributeError {
    fn from(e: UploadError) -> Self {
        DistributeError::Upload(e)
    }
}

impl From<ArchiveError> for DistributeError {
    fn from(e: ArchiveError) -> Self {
        DistributeError::Archive(e)
    }
}

impl From<ReplyError> for DistributeError {
    fn from(e: ReplyError) -> Self {
        DistributeError::Reply(e)
    }
}

const FALLBACK_MESSAGE: &str =
    "An error occurred while building the bundle. Please try again later.";

/// Distribute one bundle: run the paced upload/reply sequence and, on any
/// failure, attempt the single fallback reply before surfacing the error.
pub async fn distribute<U, R>(
    bundle: &Bundle,
    nickname: &str,
    target: &ReplyTarget,
    uploader: &U,
    replies: &R,
    pacing: &Pacing,
) -> Result<DistributionReport, DistributeError>
where
    U: ArtifactUploader + ?Sized,
    R: ReplyPoster + ?Sized,
{
    info!(nickname, ?target, "[DIST] Starting distribution sequence");
    match run_sequence(bundle, nickname, target, uploader, replies, pacing).await {
        Ok(report) => {
            info!(
                nickname,
                artifacts = report.artifacts.len(),
                replies = report.replies_posted,
                "[DIST] Distribution complete"
            );
            Ok(report)
        }
        Err(e) => {
            error!(nickname, error = %e, "[DIST][ERROR] Sequence aborted, sending fallback reply");
            pacing.pause().await;
            if let Err(fallback_err) = replies.post_reply(target, FALLBACK_MESSAGE, "").await {
                // Best effort only: log and move on, never retry.
                error!(nickname, error = %fallback_err, "[DIST][ERROR] Fallback reply failed");
            }
            Err(e)
        }
    }
}

async fn run_sequence<U, R>(
    bundle: &Bundle,
    nickname: &str,
    target: &ReplyTarget,
    uploader: &U,
    replies: &R,
    pacing: &Pacing,
) -> Result<DistributionReport, DistributeError>
where
    U: ArtifactUploader + ?Sized,
    R: ReplyPoster + ?Sized,
{
    let mut artifacts: Vec<ArtifactUploadResult> = Vec::new();

    // Step 1: the three images as preview artifacts, sequentially.
    let previews: [(&str, &[u8]); 3] = [
        ("avatar.png", &bundle.avatar),
        ("cover_primary.png", &bundle.cover_primary),
        ("cover_secondary.png", &bundle.cover_secondary),
    ];
    let mut preview_refs: Vec<String> = Vec::new();
    for (name, buffer) in previews {
        pacing.pause().await;
        info!(nickname, file = name, "[DIST][UPLOAD] Uploading preview");
        let uploaded = uploader.upload_preview(buffer, name).await?;
        preview_refs.push(uploaded.attachment_ref());
        artifacts.push(uploaded);
    }

    // Step 2: the two covers as documents.
    let mut cover_doc_refs: Vec<String> = Vec::new();
    let cover_docs: [(String, &[u8]); 2] = [
        (format!("{nickname}_cover_primary.png"), &bundle.cover_primary),
        (
            format!("{nickname}_cover_secondary.png"),
            &bundle.cover_secondary,
        ),
    ];
    for (name, buffer) in &cover_docs {
        pacing.pause().await;
        info!(nickname, file = %name, "[DIST][UPLOAD] Uploading cover document");
        let uploaded = uploader.upload_document(buffer, name).await?;
        cover_doc_refs.push(uploaded.attachment_ref());
        artifacts.push(uploaded);
    }

    // Step 3: reply #1 with previews inline and cover documents attached.
    let first_attachments = preview_refs
        .iter()
        .chain(cover_doc_refs.iter())
        .cloned()
        .collect::<Vec<_>>()
        .join(",");
    let first_message = format!(
        "Your \"{nickname}\" bundle is ready! Cover art is attached as documents."
    );
    pacing.pause().await;
    info!(nickname, "[DIST][REPLY] Posting first reply");
    replies
        .post_reply(target, &first_message, &first_attachments)
        .await?;

    // Step 4: pack the archive (local, no pacing).
    let archive = pack_bundle(bundle, nickname)?;

    // Step 5: avatar and archive as documents.
    pacing.pause().await;
    info!(nickname, "[DIST][UPLOAD] Uploading avatar document");
    let avatar_doc = uploader
        .upload_document(&bundle.avatar, &format!("{nickname}_avatar.png"))
        .await?;
    pacing.pause().await;
    info!(nickname, "[DIST][UPLOAD] Uploading bundle archive");
    let archive_doc = uploader
        .upload_document(&archive, &format!("{nickname}_bundle.tar.gz"))
        .await?;

    // Step 6: reply #2 with the avatar document and the archive.
    let second_attachments = format!(
        "{},{}",
        avatar_doc.attachment_ref(),
        archive_doc.attachment_ref()
    );
    artifacts.push(avatar_doc);
    artifacts.push(archive_doc);
    let second_message = "Avatar and the full bundle archive are attached. Enjoy!";
    pacing.pause().await;
    info!(nickname, "[DIST][REPLY] Posting second reply");
    replies
        .post_reply(target, second_message, &second_attachments)
        .await?;

    Ok(DistributionReport {
        artifacts,
        replies_posted: 2,
    })
}
