//! The `capshot check` command: endpoint diagnostics.
//!
//! Probes the hosted endpoint's health route with the configured
//! credentials so a misconfigured key or a cold endpoint shows up before
//! a long captioning run does.

use anyhow::Context;
use clap::Args;
use std::time::Duration;

use capshot_core::remote::resolve_env_var;
use capshot_core::Config;

/// Arguments for the `check` command.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Endpoint identifier (overrides config/env)
    #[arg(long)]
    pub endpoint_id: Option<String>,
}

/// Execute the check command.
pub async fn execute(args: CheckArgs, mut config: Config) -> anyhow::Result<()> {
    if let Some(endpoint_id) = &args.endpoint_id {
        config.endpoint.endpoint_id = endpoint_id.clone();
    }

    let endpoint_id = resolve_env_var(&config.endpoint.endpoint_id)
        .context("endpoint.endpoint_id not set. Set the ENDPOINT_ID env var.")?;
    let api_key = resolve_env_var(&config.endpoint.api_key)
        .context("endpoint.api_key not set. Set the RUNPOD_API_KEY env var.")?;

    let base = config.endpoint.base_url.trim_end_matches('/');
    let url = format!("{base}/{endpoint_id}/health");
    println!("Probing {url}");

    let client = reqwest::Client::new();
    let resp = client
        .get(&url)
        .bearer_auth(&api_key)
        .timeout(Duration::from_secs(10))
        .send()
        .await
        .context("Health probe failed to connect")?;

    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    println!("  Status: {status}");
    if !body.is_empty() {
        println!("  Response: {}", truncate(&body, 200));
    }

    if status.is_success() {
        println!("Endpoint looks healthy.");
        Ok(())
    } else {
        eprintln!(
            "Endpoint is not healthy. Verify the endpoint is active in the \
             provider console and that the API key has serverless permissions."
        );
        anyhow::bail!("health probe returned {status}")
    }
}

/// Truncate a response body for display, respecting char boundaries.
fn truncate(body: &str, max: usize) -> String {
    if body.chars().count() <= max {
        body.to_string()
    } else {
        let cut: String = body.chars().take(max).collect();
        format!("{cut}...")
    }
}
