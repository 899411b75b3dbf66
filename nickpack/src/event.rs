//! Long-poll event loop: subscribes to comment-reply events and dispatches
//! each one to the pipeline on its own task.
//!
//! Events are independent: every comment gets its own spawned handler
//! call, with no cross-event locking. The shared remote session is
//! protected by the pipeline's pacing, not by mutual exclusion here.

use anyhow::Result;
use nickpack_core::handler::Pipeline;
use nickpack_core::trigger::CommentEvent;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone)]
pub struct EventLoopConfig {
    pub base_url: String,
    pub version: String,
    pub token: String,
    pub group_id: i64,
    pub wait_secs: u32,
}

#[derive(Debug)]
struct PollSession {
    server: String,
    key: String,
    ts: String,
}

/// Comment-reply event source backed by the platform's long-poll endpoint.
pub struct EventSource {
    http: reqwest::Client,
    config: EventLoopConfig,
}

impl EventSource {
    pub fn new(config: EventLoopConfig) -> Self {
        EventSource {
            http: reqwest::Client::new(),
            config,
        }
    }

    async fn session(&self) -> Result<PollSession> {
        let url = format!("{}/groups.getLongPollServer", self.config.base_url);
        let payload: Value = self
            .http
            .get(&url)
            .query(&[
                ("group_id", self.config.group_id.to_string()),
                ("access_token", self.config.token.clone()),
                ("v", self.config.version.clone()),
            ])
            .send()
            .await?
            .json()
            .await?;
        let response = payload
            .get("response")
            .ok_or_else(|| anyhow::anyhow!("long-poll session response missing: {payload}"))?;
        let field = |name: &str| -> Result<String> {
            response
                .get(name)
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| anyhow::anyhow!("long-poll session missing field {name}"))
        };
        Ok(PollSession {
            server: field("server")?,
            key: field("key")?,
            ts: field("ts")?,
        })
    }

    /// Run the subscription loop forever, dispatching each comment-reply
    /// event to the pipeline on its own task.
    pub async fn run(&self, pipeline: Arc<Pipeline>) -> Result<()> {
        let mut session = self.session().await?;
        info!(server = %session.server, "Long-poll session established");

        loop {
            let url = format!(
                "{}?act=a_check&key={}&ts={}&wait={}",
                session.server, session.key, session.ts, self.config.wait_secs
            );
            let payload: Value = match self.http.get(&url).send().await {
                Ok(response) => match response.json().await {
                    Ok(payload) => payload,
                    Err(e) => {
                        warn!(error = %e, "Long-poll payload unreadable, refreshing session");
                        session = self.session().await?;
                        continue;
                    }
                },
                Err(e) => {
                    warn!(error = %e, "Long-poll request failed, refreshing session");
                    session = self.session().await?;
                    continue;
                }
            };

            if payload.get("failed").is_some() {
                debug!("Long-poll session expired, refreshing");
                session = self.session().await?;
                continue;
            }
            if let Some(ts) = payload.get("ts") {
                session.ts = match ts.as_str() {
                    Some(s) => s.to_string(),
                    None => ts.to_string(),
                };
            }

            let Some(updates) = payload.get("updates").and_then(Value::as_array) else {
                continue;
            };
            for update in updates {
                if update.get("type").and_then(Value::as_str) != Some("wall_reply_new") {
                    continue;
                }
                let Some(event) = comment_event_from(update.get("object")) else {
                    warn!(?update, "Dropping malformed comment-reply payload");
                    continue;
                };
                let pipeline = pipeline.clone();
                tokio::spawn(async move {
                    match pipeline.handle_event(event).await {
                        Ok(Some(report)) => info!(
                            artifacts = report.artifacts.len(),
                            replies = report.replies_posted,
                            "Trigger event fully processed"
                        ),
                        Ok(None) => debug!("Event did not trigger the pipeline"),
                        Err(e) => error!(error = %e, "Trigger event failed"),
                    }
                });
            }
        }
    }
}

fn comment_event_from(object: Option<&Value>) -> Option<CommentEvent> {
    let object = object?;
    Some(CommentEvent {
        post_owner_id: object
            .get("post_owner_id")
            .or_else(|| object.get("owner_id"))
            .and_then(Value::as_i64)?,
        post_id: object.get("post_id").and_then(Value::as_i64)?,
        comment_id: object.get("id").and_then(Value::as_i64)?,
        text: object
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string(),
    })
}
