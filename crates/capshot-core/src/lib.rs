//! Capshot Core - Embeddable batch captioning library.
//!
//! Capshot scans a directory for images without caption sidecars and sends
//! each to a hosted serverless inference endpoint, persisting the returned
//! caption next to the image.
//!
//! # Architecture
//!
//! ```text
//! Scan → (per image: Encode → Submit with retry → Persist sidecar) → Summary
//! ```
//!
//! Strictly sequential: one in-flight request at a time, per-image failures
//! isolated from the rest of the batch.
//!
//! # Usage
//!
//! ```rust,ignore
//! use capshot_core::{BatchRunner, Config, EndpointFactory, EndpointKind};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let endpoint = EndpointFactory::create(EndpointKind::Runsync, &config)?;
//!     let runner = BatchRunner::new(&config, endpoint);
//!
//!     let summary = runner.run("./photos".as_ref(), |_| {}).await?;
//!     println!("{} captioned, {} failed", summary.succeeded, summary.failed);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod batch;
pub mod config;
pub mod error;
pub mod remote;
pub mod scan;
pub mod sidecar;
pub mod types;

// Re-exports for convenient access
pub use batch::{BatchEvent, BatchRunner};
pub use config::Config;
pub use error::{CapshotError, ConfigError, RemoteError, Result};
pub use remote::{CaptionEndpoint, Captioner, EndpointFactory, EndpointKind, RetryOptions};
pub use scan::CaptionScanner;
pub use types::{CaptionResult, ImageTask, RunSummary, TaskFailure};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
