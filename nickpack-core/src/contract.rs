//! # contract: interfaces to the external platform API
//!
//! This module defines the traits the pipeline needs from the outside
//! world — uploading artifacts and posting replies — plus the plain data
//! and error types they exchange. Concrete HTTP clients live in the CLI
//! crate; tests use the `mockall`-generated mocks.
//!
//! ## Interface & Extensibility
//! - Implement [`ArtifactUploader`] and [`ReplyPoster`] to target a new
//!   platform or a test double.
//! - All methods are async; errors are typed per the failure taxonomy
//!   (transport, malformed response, save/commit rejection, reply
//!   rejection), each naming the remote operation that failed.
//! - The two traits are deliberately separate: uploads and reply posting
//!   run on independently constructed sessions, not an ambient singleton.

use async_trait::async_trait;
use std::fmt;

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

/// What a stored remote artifact is, from the platform's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactUploadKind {
    /// Inline preview rendering in the reply.
    Photo,
    /// Attachment/download rather than inline preview.
    Document,
}

/// A stored remote object, as returned by a completed upload+save cycle.
#[derive(Debug, Clone)]
pub struct ArtifactUploadResult {
    pub owner_id: i64,
    pub id: i64,
    pub kind: ArtifactUploadKind,
}

impl ArtifactUploadResult {
    /// Per-kind attachment token, e.g. `photo12_34` or `doc12_34`.
    pub fn attachment_ref(&self) -> String {
        match self.kind {
            ArtifactUploadKind::Photo => format!("photo{}_{}", self.owner_id, self.id),
            ArtifactUploadKind::Document => format!("doc{}_{}", self.owner_id, self.id),
        }
    }
}

/// Thread coordinates a reply is addressed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyTarget {
    pub owner_id: i64,
    pub post_id: i64,
    pub comment_id: i64,
}

/// The save/commit step rejected or mangled an uploaded token.
#[derive(Debug)]
pub enum SaveError {
    Rejected {
        operation: String,
        code: i64,
        message: String,
    },
    MalformedResponse {
        operation: String,
    },
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveError::Rejected {
                operation,
                code,
                message,
            } => write!(f, "save rejected by {operation} (code {code}): {message}"),
            SaveError::MalformedResponse { operation } => {
                write!(f, "malformed save response from {operation}")
            }
        }
    }
}

impl std::error::Error for SaveError {}

/// Transport or response-shape failure during an upload cycle.
#[derive(Debug)]
pub enum UploadError {
    Transport {
        operation: String,
        message: String,
    },
    MalformedResponse {
        operation: String,
    },
    Api {
        operation: String,
        code: i64,
        message: String,
    },
    Save(SaveError),
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadError::Transport { operation, message } => {
                write!(f, "transport failure in {operation}: {message}")
            }
            UploadError::MalformedResponse { operation } => {
                write!(f, "malformed response from {operation}")
            }
            UploadError::Api {
                operation,
                code,
                message,
            } => write!(f, "{operation} returned API error {code}: {message}"),
            UploadError::Save(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for UploadError {}

impl From<SaveError> for UploadError {
    fn from(e: SaveError) -> Self {
        UploadError::Save(e)
    }
}

/// Posting a reply failed.
#[derive(Debug)]
pub enum ReplyError {
    Transport { message: String },
    Api { code: i64, message: String },
    MalformedResponse,
}

impl fmt::Display for ReplyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplyError::Transport { message } => write!(f, "reply transport failure: {message}"),
            ReplyError::Api { code, message } => {
                write!(f, "reply rejected with API error {code}: {message}")
            }
            ReplyError::MalformedResponse => write!(f, "malformed reply-post response"),
        }
    }
}

impl std::error::Error for ReplyError {}

/// Uploads raw artifact buffers through the platform's two-phase
/// (transport then save/commit) upload flow.
///
/// Implementors validate each response's shape and convert missing fields
/// into [`UploadError::MalformedResponse`] / [`SaveError`] naming the
/// operation. The trait is implemented by the real client and by mocks.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ArtifactUploader: Send + Sync {
    /// Upload an image for inline preview rendering.
    async fn upload_preview(
        &self,
        image: &[u8],
        filename: &str,
    ) -> Result<ArtifactUploadResult, UploadError>;

    /// Upload a buffer as a downloadable document.
    async fn upload_document(
        &self,
        data: &[u8],
        filename: &str,
    ) -> Result<ArtifactUploadResult, UploadError>;
}

/// Posts replies into a comment thread.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ReplyPoster: Send + Sync {
    /// Post one reply with a comma-joined attachment reference string.
    async fn post_reply(
        &self,
        target: &ReplyTarget,
        message: &str,
        attachments: &str,
    ) -> Result<(), ReplyError>;
}
