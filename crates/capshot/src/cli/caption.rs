//! The `capshot caption` command: the batch captioning run.

use anyhow::Context;
use clap::Args;
use std::path::PathBuf;

use capshot_core::{BatchEvent, BatchRunner, CaptionResult, Config, EndpointFactory, EndpointKind, RunSummary};

/// Arguments for the `caption` command.
#[derive(Args, Debug)]
pub struct CaptionArgs {
    /// Directory of images to caption (falls back to caption.directory in config)
    pub directory: Option<PathBuf>,

    /// Prefix prepended to every persisted caption
    #[arg(long)]
    pub prefix: Option<String>,

    /// Prompt override sent to the endpoint
    #[arg(long)]
    pub prompt: Option<String>,

    /// Endpoint identifier (overrides config/env)
    #[arg(long)]
    pub endpoint_id: Option<String>,

    /// Use the submit-and-poll endpoint instead of the blocking runsync call
    #[arg(long)]
    pub poll: bool,

    /// Total attempts per image, including the first
    #[arg(long)]
    pub retries: Option<u32>,

    /// Print the run summary as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

/// Execute the caption command.
pub async fn execute(args: CaptionArgs, mut config: Config) -> anyhow::Result<()> {
    // CLI flags override the config file
    if let Some(prefix) = &args.prefix {
        config.caption.prefix = prefix.clone();
    }
    if let Some(prompt) = &args.prompt {
        config.caption.prompt = Some(prompt.clone());
    }
    if let Some(endpoint_id) = &args.endpoint_id {
        config.endpoint.endpoint_id = endpoint_id.clone();
    }
    if let Some(retries) = args.retries {
        config.retry.max_attempts = retries.max(1);
    }

    let dir = resolve_directory(&args, &config)
        .context("No directory given and caption.directory is not configured")?;

    let kind = if args.poll {
        EndpointKind::Polling
    } else {
        EndpointKind::Runsync
    };
    let endpoint = EndpointFactory::create(kind, &config)?;
    let runner = BatchRunner::new(&config, endpoint);

    // The scan count isn't known until the runner emits its first event,
    // so the bar starts lengthless and is sized on TaskStarted.
    let progress = create_progress_bar();
    let bar = progress.clone();
    let summary = runner
        .run(&dir, move |event| match event {
            BatchEvent::TaskStarted {
                index, total, path, ..
            } => {
                if index == 0 {
                    bar.set_length(total as u64);
                }
                if let Some(name) = path.file_name() {
                    bar.set_message(name.to_string_lossy().into_owned());
                }
            }
            BatchEvent::TaskFinished { path, result, .. } => {
                if let CaptionResult::Failure { reason } = result {
                    let name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    bar.println(format!("FAILED: {name} - {reason}"));
                }
                bar.inc(1);
            }
        })
        .await?;
    progress.finish_and_clear();

    if summary.total == 0 {
        eprintln!("No images found that need captions.");
        return Ok(());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }

    if !summary.all_succeeded() {
        anyhow::bail!("{} image(s) failed after retries", summary.failed);
    }
    Ok(())
}

/// Pick the target directory from the CLI argument or config, with ~ expansion.
fn resolve_directory(args: &CaptionArgs, config: &Config) -> Option<PathBuf> {
    if let Some(dir) = &args.directory {
        let expanded = shellexpand::tilde(&dir.to_string_lossy().into_owned()).into_owned();
        return Some(PathBuf::from(expanded));
    }
    config.target_directory()
}

/// Create the progress bar for the captioning loop.
fn create_progress_bar() -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
            )
            .unwrap()
            .progress_chars("##-"),
    );
    pb.set_message("scanning...");
    pb
}

/// Print a formatted summary report after the run.
fn print_summary(summary: &RunSummary) {
    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Total:        {:>8}", summary.total);
    eprintln!("    Succeeded:    {:>8}", summary.succeeded);
    if summary.failed > 0 {
        eprintln!("    Failed:       {:>8}", summary.failed);
    }
    eprintln!("  ====================================");

    if !summary.failures.is_empty() {
        eprintln!();
        eprintln!("  Failed files:");
        for failure in &summary.failures {
            eprintln!("    - {}: {}", failure.file, failure.reason);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_args() -> CaptionArgs {
        CaptionArgs {
            directory: None,
            prefix: None,
            prompt: None,
            endpoint_id: None,
            poll: false,
            retries: None,
            json: false,
        }
    }

    #[test]
    fn test_resolve_directory_prefers_cli_argument() {
        let mut config = Config::default();
        config.caption.directory = Some("/from/config".to_string());
        let args = CaptionArgs {
            directory: Some(PathBuf::from("/from/cli")),
            ..bare_args()
        };
        assert_eq!(
            resolve_directory(&args, &config),
            Some(PathBuf::from("/from/cli"))
        );
    }

    #[test]
    fn test_resolve_directory_falls_back_to_config() {
        let mut config = Config::default();
        config.caption.directory = Some("/from/config".to_string());
        assert_eq!(
            resolve_directory(&bare_args(), &config),
            Some(PathBuf::from("/from/config"))
        );
    }

    #[test]
    fn test_resolve_directory_none_when_unset() {
        assert_eq!(resolve_directory(&bare_args(), &Config::default()), None);
    }

    #[test]
    fn test_resolve_directory_expands_tilde() {
        let args = CaptionArgs {
            directory: Some(PathBuf::from("~/photos")),
            ..bare_args()
        };
        let dir = resolve_directory(&args, &Config::default()).unwrap();
        assert!(!dir.to_string_lossy().starts_with('~'));
    }
}
