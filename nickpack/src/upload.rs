//! Concrete platform API clients for artifact upload and reply posting.
//!
//! Both clients speak the platform's two-phase upload protocol: ask the
//! API for a transport URL, POST the raw bytes as multipart, then commit
//! the returned token fields through a save call. Every response's shape
//! is validated here; a missing field becomes an error naming the
//! operation, so the orchestrator's logs identify the failing step.
//!
//! The upload and reply clients hold independent sessions (separate
//! tokens), mirroring the two-role account setup.

use async_trait::async_trait;
use nickpack_core::contract::{
    ArtifactUploadKind, ArtifactUploadResult, ArtifactUploader, ReplyError, ReplyPoster,
    ReplyTarget, SaveError, UploadError,
};
use serde_json::Value;
use tracing::{debug, info};

/// Outcome of one raw API method call, before mapping into the
/// caller-facing error taxonomy.
enum CallError {
    Transport(String),
    Api { code: i64, message: String },
    NoResponse,
}

/// One GET method call against the API, returning the `response` payload.
async fn api_call(
    http: &reqwest::Client,
    base_url: &str,
    method: &str,
    token: &str,
    version: &str,
    params: &[(&str, String)],
) -> Result<Value, CallError> {
    let url = format!("{base_url}/{method}");
    let mut query: Vec<(&str, String)> = vec![
        ("access_token", token.to_string()),
        ("v", version.to_string()),
    ];
    query.extend(params.iter().cloned());

    let payload: Value = http
        .get(&url)
        .query(&query)
        .send()
        .await
        .map_err(|e| CallError::Transport(e.to_string()))?
        .json()
        .await
        .map_err(|e| CallError::Transport(e.to_string()))?;

    if let Some(err) = payload.get("error") {
        return Err(CallError::Api {
            code: err.get("error_code").and_then(Value::as_i64).unwrap_or(0),
            message: err
                .get("error_msg")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string(),
        });
    }
    payload.get("response").cloned().ok_or(CallError::NoResponse)
}

/// Multipart POST of raw bytes against a server-provided transport URL.
async fn transport_post(
    http: &reqwest::Client,
    upload_url: &str,
    field: &str,
    data: &[u8],
    filename: &str,
    mime: &str,
) -> Result<Value, CallError> {
    let part = reqwest::multipart::Part::bytes(data.to_vec())
        .file_name(filename.to_string())
        .mime_str(mime)
        .map_err(|e| CallError::Transport(e.to_string()))?;
    let form = reqwest::multipart::Form::new().part(field.to_string(), part);

    http.post(upload_url)
        .multipart(form)
        .send()
        .await
        .map_err(|e| CallError::Transport(e.to_string()))?
        .json()
        .await
        .map_err(|e| CallError::Transport(e.to_string()))
}

fn upload_error(operation: &str, err: CallError) -> UploadError {
    match err {
        CallError::Transport(message) => UploadError::Transport {
            operation: operation.to_string(),
            message,
        },
        CallError::Api { code, message } => UploadError::Api {
            operation: operation.to_string(),
            code,
            message,
        },
        CallError::NoResponse => UploadError::MalformedResponse {
            operation: operation.to_string(),
        },
    }
}

fn save_error(operation: &str, err: CallError) -> UploadError {
    match err {
        // Transport failures stay transport failures even during save.
        CallError::Transport(message) => UploadError::Transport {
            operation: operation.to_string(),
            message,
        },
        CallError::Api { code, message } => SaveError::Rejected {
            operation: operation.to_string(),
            code,
            message,
        }
        .into(),
        CallError::NoResponse => SaveError::MalformedResponse {
            operation: operation.to_string(),
        }
        .into(),
    }
}

/// Upload-session client: previews (photos) and documents.
pub struct UploadClient {
    http: reqwest::Client,
    base_url: String,
    version: String,
    token: String,
}

impl UploadClient {
    pub fn new(
        base_url: impl Into<String>,
        version: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        UploadClient {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            version: version.into(),
            token: token.into(),
        }
    }

    async fn call(&self, method: &str, params: &[(&str, String)]) -> Result<Value, CallError> {
        api_call(
            &self.http,
            &self.base_url,
            method,
            &self.token,
            &self.version,
            params,
        )
        .await
    }
}

#[async_trait]
impl ArtifactUploader for UploadClient {
    async fn upload_preview(
        &self,
        image: &[u8],
        filename: &str,
    ) -> Result<ArtifactUploadResult, UploadError> {
        let operation = "photos.getUploadServer";
        let server = self
            .call(operation, &[])
            .await
            .map_err(|e| upload_error(operation, e))?;
        let upload_url = server
            .get("upload_url")
            .and_then(Value::as_str)
            .ok_or_else(|| UploadError::MalformedResponse {
                operation: operation.to_string(),
            })?;

        let operation = "photo upload transport";
        let uploaded = transport_post(&self.http, upload_url, "photo", image, filename, "image/png")
            .await
            .map_err(|e| upload_error(operation, e))?;
        let photo = uploaded.get("photo").and_then(Value::as_str);
        let server_token = uploaded.get("server").map(Value::to_string);
        let hash = uploaded.get("hash").and_then(Value::as_str);
        let (photo, server_token, hash) = match (photo, server_token, hash) {
            (Some(p), Some(s), Some(h)) => (p.to_string(), s, h.to_string()),
            _ => {
                return Err(UploadError::MalformedResponse {
                    operation: operation.to_string(),
                })
            }
        };

        let operation = "photos.save";
        let saved = self
            .call(
                operation,
                &[
                    ("photo", photo),
                    ("server", server_token),
                    ("hash", hash),
                ],
            )
            .await
            .map_err(|e| save_error(operation, e))?;
        // The save call answers with a one-element array of descriptors.
        let descriptor = saved.get(0).ok_or_else(|| SaveError::MalformedResponse {
            operation: operation.to_string(),
        })?;
        let owner_id = descriptor.get("owner_id").and_then(Value::as_i64);
        let id = descriptor.get("id").and_then(Value::as_i64);
        let (owner_id, id) = match (owner_id, id) {
            (Some(o), Some(i)) => (o, i),
            _ => {
                return Err(SaveError::MalformedResponse {
                    operation: operation.to_string(),
                }
                .into())
            }
        };

        debug!(filename, owner_id, id, "Preview upload committed");
        Ok(ArtifactUploadResult {
            owner_id,
            id,
            kind: ArtifactUploadKind::Photo,
        })
    }

    async fn upload_document(
        &self,
        data: &[u8],
        filename: &str,
    ) -> Result<ArtifactUploadResult, UploadError> {
        let operation = "docs.getUploadServer";
        let server = self
            .call(operation, &[])
            .await
            .map_err(|e| upload_error(operation, e))?;
        let upload_url = server
            .get("upload_url")
            .and_then(Value::as_str)
            .ok_or_else(|| UploadError::MalformedResponse {
                operation: operation.to_string(),
            })?;

        let operation = "document upload transport";
        let uploaded = transport_post(
            &self.http,
            upload_url,
            "file",
            data,
            filename,
            "application/octet-stream",
        )
        .await
        .map_err(|e| upload_error(operation, e))?;
        let file_token = uploaded
            .get("file")
            .and_then(Value::as_str)
            .ok_or_else(|| UploadError::MalformedResponse {
                operation: operation.to_string(),
            })?
            .to_string();

        let operation = "docs.save";
        let saved = self
            .call(
                operation,
                &[("file", file_token), ("title", filename.to_string())],
            )
            .await
            .map_err(|e| save_error(operation, e))?;
        let descriptor = saved
            .get("doc")
            .ok_or_else(|| SaveError::MalformedResponse {
                operation: operation.to_string(),
            })?;
        let owner_id = descriptor.get("owner_id").and_then(Value::as_i64);
        let id = descriptor.get("id").and_then(Value::as_i64);
        let (owner_id, id) = match (owner_id, id) {
            (Some(o), Some(i)) => (o, i),
            _ => {
                return Err(SaveError::MalformedResponse {
                    operation: operation.to_string(),
                }
                .into())
            }
        };

        debug!(filename, owner_id, id, "Document upload committed");
        Ok(ArtifactUploadResult {
            owner_id,
            id,
            kind: ArtifactUploadKind::Document,
        })
    }
}

/// Reply-session client: posts comments into the watched thread.
pub struct ReplyClient {
    http: reqwest::Client,
    base_url: String,
    version: String,
    token: String,
}

impl ReplyClient {
    pub fn new(
        base_url: impl Into<String>,
        version: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        ReplyClient {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            version: version.into(),
            token: token.into(),
        }
    }
}

#[async_trait]
impl ReplyPoster for ReplyClient {
    async fn post_reply(
        &self,
        target: &ReplyTarget,
        message: &str,
        attachments: &str,
    ) -> Result<(), ReplyError> {
        let mut params: Vec<(&str, String)> = vec![
            ("owner_id", target.owner_id.to_string()),
            ("post_id", target.post_id.to_string()),
            ("reply_to_comment", target.comment_id.to_string()),
            ("message", message.to_string()),
        ];
        if !attachments.is_empty() {
            params.push(("attachments", attachments.to_string()));
        }

        let response = api_call(
            &self.http,
            &self.base_url,
            "wall.createComment",
            &self.token,
            &self.version,
            &params,
        )
        .await
        .map_err(|e| match e {
            CallError::Transport(message) => ReplyError::Transport { message },
            CallError::Api { code, message } => ReplyError::Api { code, message },
            CallError::NoResponse => ReplyError::MalformedResponse,
        })?;

        if response.get("comment_id").and_then(Value::as_i64).is_none() {
            return Err(ReplyError::MalformedResponse);
        }
        info!(
            comment_id = target.comment_id,
            "Reply posted into trigger thread"
        );
        Ok(())
    }
}
