//! Remote captioning: endpoint transports and the retrying invoker.

mod captioner;
mod endpoint;
mod polling;
pub mod retry;
mod runsync;

pub use captioner::{Captioner, RetryOptions};
pub use endpoint::{
    CaptionEndpoint, CaptionRequest, CaptionResponse, EndpointFactory, EndpointKind,
    ImagePayload, resolve_env_var,
};
pub use polling::PollingEndpoint;
pub use runsync::RunsyncEndpoint;
