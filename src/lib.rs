//! Idempotent reconciliation of a single DigitalOcean droplet.
//!
//! The crate exposes a thin REST client over the provider's v2 API, a
//! [`Reconciler`] that locates, creates, powers on, waits for, or deletes one
//! droplet, and the [`Outcome`] report describing what it did. Running the
//! same request twice against an unchanged account performs no mutating
//! calls the second time.

pub mod client;
pub mod config;
pub mod droplet;
pub mod poll;
pub mod report;
pub mod request;
pub mod test_support;
pub mod user_data;

pub use client::{
    ApiResponse, ApiToken, ClientError, ClientFuture, DEFAULT_API_BASE_URL, HttpClient,
    RestClient,
};
pub use config::{ConfigError, DigitalOceanConfig, TOKEN_ENV_VARS};
pub use droplet::{
    Droplet, DropletId, DropletStatus, NetworkInterface, Networks, ReconcileError, Reconciler,
};
pub use poll::{Clock, PollError, PollPolicy, TokioClock, poll_until};
pub use report::{DropletReport, Outcome};
pub use request::{
    DEFAULT_WAIT_TIMEOUT, DesiredState, DropletRequest, DropletRequestBuilder, RequestError,
    SlugOrId,
};
pub use user_data::{UserDataError, resolve_user_data};
