//! Submit-and-poll transport.
//!
//! POST to `<base>/<endpoint-id>/run` returns a job id immediately; the job
//! is then polled via GET `<base>/<endpoint-id>/status/<job-id>` once per
//! interval until it reaches a terminal state or the poll budget runs out.
//! Useful when captions take longer than a proxy is willing to hold a
//! runsync connection open.

use super::endpoint::{CaptionEndpoint, CaptionRequest, CaptionResponse, EndpointAuth};
use super::runsync::classify_transport_error;
use crate::config::LimitsConfig;
use crate::error::RemoteError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Asynchronous submit-and-poll transport.
pub struct PollingEndpoint {
    run_url: String,
    status_url: String,
    api_key: String,
    submit_timeout: Duration,
    poll_timeout: Duration,
    poll_interval: Duration,
    poll_attempts: u32,
    client: reqwest::Client,
}

impl PollingEndpoint {
    pub(crate) fn new(auth: EndpointAuth, limits: &LimitsConfig) -> Self {
        Self {
            run_url: format!("{}/{}/run", auth.base_url, auth.endpoint_id),
            status_url: format!("{}/{}/status", auth.base_url, auth.endpoint_id),
            api_key: auth.api_key,
            submit_timeout: Duration::from_millis(limits.submit_timeout_ms),
            poll_timeout: Duration::from_millis(limits.poll_timeout_ms),
            poll_interval: Duration::from_millis(limits.poll_interval_ms),
            poll_attempts: limits.poll_attempts,
            client: reqwest::Client::new(),
        }
    }

    async fn submit_job(&self, request: &CaptionRequest) -> Result<String, RemoteError> {
        let body = RunRequest {
            input: RunInput {
                image: request.image.data.clone(),
                prompt: request.prompt.clone(),
            },
        };

        let resp = self
            .client
            .post(&self.run_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .timeout(self.submit_timeout)
            .send()
            .await
            .map_err(|e| classify_transport_error(e, self.submit_timeout))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RemoteError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let reply: SubmitReply = resp
            .json()
            .await
            .map_err(|e| RemoteError::MalformedResponse(e.to_string()))?;
        reply
            .id
            .ok_or_else(|| RemoteError::MalformedResponse("no job id in reply".to_string()))
    }

    async fn poll_job(&self, job_id: &str) -> Result<JobPoll, RemoteError> {
        let url = format!("{}/{}", self.status_url, job_id);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .timeout(self.poll_timeout)
            .send()
            .await
            .map_err(|e| classify_transport_error(e, self.poll_timeout))?;

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
        interpret_poll(&body)
    }
}

// --- Wire types ---

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

#[derive(Deserialize)]
struct SubmitReply {
    id: Option<String>,
}

#[derive(Deserialize)]
struct StatusEnvelope {
    status: Option<String>,
    output: Option<StatusOutput>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct StatusOutput {
    caption: Option<String>,
}

/// One observed poll of a job.
#[derive(Debug, PartialEq, Eq)]
enum JobPoll {
    /// Terminal: caption available
    Completed(String),
    /// Still queued or running; the raw status, for logging
    Running(String),
}

/// Interpret a 200 status reply body.
fn interpret_poll(body: &str) -> Result<JobPoll, RemoteError> {
    let envelope: StatusEnvelope = serde_json::from_str(body)
        .map_err(|e| RemoteError::MalformedResponse(e.to_string()))?;

    match envelope.status.as_deref() {
        Some("COMPLETED") => envelope
            .output
            .and_then(|o| o.caption)
            .map(JobPoll::Completed)
            .ok_or(RemoteError::MissingCaption),
        Some("FAILED") => Err(RemoteError::Api(
            envelope.error.unwrap_or_else(|| "Unknown error".to_string()),
        )),
        other => Ok(JobPoll::Running(other.unwrap_or("UNKNOWN").to_string())),
    }
}

#[async_trait]
impl CaptionEndpoint for PollingEndpoint {
    fn name(&self) -> &str {
        "polling"
    }

    async fn submit(&self, request: &CaptionRequest) -> Result<CaptionResponse, RemoteError> {
        let start = Instant::now();

        let job_id = self.submit_job(request).await?;
        tracing::debug!("Submitted job {job_id}, polling for completion");

        for attempt in 1..=self.poll_attempts {
            tokio::time::sleep(self.poll_interval).await;

            match self.poll_job(&job_id).await? {
                JobPoll::Completed(caption) => {
                    return Ok(CaptionResponse {
                        caption,
                        latency_ms: start.elapsed().as_millis() as u64,
                    });
                }
                JobPoll::Running(status) => {
                    tracing::trace!("Job {job_id} poll {attempt}: {status}");
                }
            }
        }

        Err(RemoteError::PollBudgetExhausted {
            job_id,
            attempts: self.poll_attempts,
        })
    }

    fn timeout(&self) -> Duration {
        // Submission plus the full poll budget
        self.submit_timeout
            + (self.poll_interval + self.poll_timeout) * self.poll_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpret_poll_completed() {
        let body = r#"{"status": "COMPLETED", "output": {"caption": "a dog"}}"#;
        assert_eq!(
            interpret_poll(body).unwrap(),
            JobPoll::Completed("a dog".to_string())
        );
    }

    #[test]
    fn test_interpret_poll_failed() {
        let body = r#"{"status": "FAILED", "error": "worker crashed"}"#;
        match interpret_poll(body).unwrap_err() {
            RemoteError::Api(msg) => assert_eq!(msg, "worker crashed"),
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_interpret_poll_in_progress() {
        for status in ["IN_QUEUE", "IN_PROGRESS"] {
            let body = format!(r#"{{"status": "{status}"}}"#);
            assert_eq!(
                interpret_poll(&body).unwrap(),
                JobPoll::Running(status.to_string())
            );
        }
    }

    #[test]
    fn test_interpret_poll_completed_without_caption() {
        let body = r#"{"status": "COMPLETED", "output": {}}"#;
        assert!(matches!(
            interpret_poll(body).unwrap_err(),
            RemoteError::MissingCaption
        ));
    }

    #[test]
    fn test_submit_reply_requires_id() {
        let reply: SubmitReply = serde_json::from_str(r#"{"id": "job-42"}"#).unwrap();
        assert_eq!(reply.id.as_deref(), Some("job-42"));
        let reply: SubmitReply = serde_json::from_str("{}").unwrap();
        assert!(reply.id.is_none());
    }

    #[test]
    fn test_url_shapes_and_budget() {
        let endpoint = PollingEndpoint::new(
            EndpointAuth {
                base_url: "https://api.runpod.ai/v2".to_string(),
                endpoint_id: "abc123".to_string(),
                api_key: "secret".to_string(),
            },
            &LimitsConfig::default(),
        );
        assert_eq!(endpoint.run_url, "https://api.runpod.ai/v2/abc123/run");
        assert_eq!(endpoint.status_url, "https://api.runpod.ai/v2/abc123/status");
        assert_eq!(endpoint.name(), "polling");
        // 30s submit + 60 * (1s interval + 10s poll)
        assert_eq!(endpoint.timeout(), Duration::from_secs(30 + 60 * 11));
    }
}
