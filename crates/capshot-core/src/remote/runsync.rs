//! Synchronous runsync transport.
//!
//! One POST to `<base>/<endpoint-id>/runsync` that blocks until the hosted
//! worker finishes. The endpoint wraps worker output in a job envelope:
//! `{"status": "COMPLETED", "output": {"caption": "..."}}` on success,
//! `{"status": "FAILED", "error": "..."}` when the worker reports an error.

use super::endpoint::{CaptionEndpoint, CaptionRequest, CaptionResponse, EndpointAuth};
use crate::error::RemoteError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Blocking runsync transport.
pub struct RunsyncEndpoint {
    url: String,
    api_key: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl RunsyncEndpoint {
    pub(crate) fn new(auth: EndpointAuth, timeout: Duration) -> Self {
        Self {
            url: format!("{}/{}/runsync", auth.base_url, auth.endpoint_id),
            api_key: auth.api_key,
            timeout,
            client: reqwest::Client::new(),
        }
    }
}

// --- Request types ---

#[derive(Serialize)]
struct RunRequest {
    input: RunInput,
}

#[derive(Serialize)]
struct RunInput {
    image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    prompt: Option<String>,
}

impl RunRequest {
    fn from_caption_request(request: &CaptionRequest) -> Self {
        Self {
            input: RunInput {
                image: request.image.data.clone(),
                prompt: request.prompt.clone(),
            },
        }
    }
}

// --- Response types ---

#[derive(Deserialize)]
struct JobEnvelope {
    status: Option<String>,
    output: Option<JobOutput>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct JobOutput {
    caption: Option<String>,
}

/// Interpret a 200 runsync reply body.
///
/// A reported `FAILED` status wins over everything; otherwise a present
/// caption is success and its absence is a permanent "no caption" failure.
fn interpret_reply(body: &str) -> Result<String, RemoteError> {
    let envelope: JobEnvelope = serde_json::from_str(body)
        .map_err(|e| RemoteError::MalformedResponse(e.to_string()))?;

    if envelope.status.as_deref() == Some("FAILED") {
        return Err(RemoteError::Api(
            envelope.error.unwrap_or_else(|| "Unknown error".to_string()),
        ));
    }

    envelope
        .output
        .and_then(|o| o.caption)
        .ok_or(RemoteError::MissingCaption)
}

/// Convert a reqwest transport error into a `RemoteError`.
pub(crate) fn classify_transport_error(error: reqwest::Error, timeout: Duration) -> RemoteError {
    if error.is_timeout() {
        RemoteError::Timeout {
            timeout_ms: timeout.as_millis() as u64,
        }
    } else {
        RemoteError::Network(error.to_string())
    }
}

#[async_trait]
impl CaptionEndpoint for RunsyncEndpoint {
    fn name(&self) -> &str {
        "runsync"
    }

    async fn submit(&self, request: &CaptionRequest) -> Result<CaptionResponse, RemoteError> {
        let start = Instant::now();

        let resp = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&RunRequest::from_caption_request(request))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| classify_transport_error(e, self.timeout))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RemoteError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp
            .text()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;
        let caption = interpret_reply(&body)?;

        Ok(CaptionResponse {
            caption,
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}
