//! Droplet reconciliation: locate, create, power on, wait, delete.

mod create;
mod destroy;
mod error;
mod locate;
mod power;
mod types;

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::client::{ApiResponse, RestClient};
use crate::poll::{Clock, DEFAULT_INTERVAL_CAP, TokioClock};
use crate::report::Outcome;
use crate::request::{DesiredState, DropletRequest};

pub use error::ReconcileError;
pub use types::{Droplet, DropletId, DropletStatus, NetworkInterface, Networks};

const NOT_FOUND_MESSAGE: &str = "Droplet not found.";
const NO_WAIT_MESSAGE: &str =
    "Droplet is powering on; wait was disabled so network addresses may be incomplete.";

/// Drives one droplet towards the state described by a [`DropletRequest`].
#[derive(Clone, Debug)]
pub struct Reconciler<C, K = TokioClock> {
    client: C,
    clock: K,
    poll_interval_cap: Duration,
}

impl<C: RestClient> Reconciler<C> {
    /// Creates a reconciler using the wall clock.
    #[must_use]
    pub const fn new(client: C) -> Self {
        Self::with_clock(client, TokioClock)
    }
}

impl<C: RestClient, K: Clock> Reconciler<C, K> {
    /// Creates a reconciler with an explicit clock.
    #[must_use]
    pub const fn with_clock(client: C, clock: K) -> Self {
        Self {
            client,
            clock,
            poll_interval_cap: DEFAULT_INTERVAL_CAP,
        }
    }

    /// Overrides the longest sleep between status polls.
    #[must_use]
    pub const fn with_poll_interval_cap(mut self, interval: Duration) -> Self {
        self.poll_interval_cap = interval;
        self
    }

    /// Reconciles the droplet and reports what happened.
    ///
    /// Lookup and creation are not atomic: two invocations racing on the
    /// same name can both miss the lookup and both create a droplet. Setting
    /// `unique_name` narrows the window but cannot close it because the
    /// provider has no create-if-absent primitive.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError`] when the request is incomplete, the
    /// provider rejects a call, a supplied id does not resolve while the
    /// droplet should be present, or the droplet does not become active
    /// within the wait timeout.
    pub async fn reconcile(&self, request: &DropletRequest) -> Result<Outcome, ReconcileError> {
        request
            .validate()
            .map_err(|err| ReconcileError::Configuration(err.to_string()))?;

        let located = self.locate(request.id, request.lookup_name()).await?;
        tracing::debug!(
            found = ?located.as_ref().map(|droplet| droplet.id),
            state = %request.state,
            "located droplet"
        );

        match request.state {
            DesiredState::Present => self.ensure_present(request, located).await,
            DesiredState::Absent => self.ensure_absent(located).await,
        }
    }

    // A droplet created in this run reports `changed` even if its first
    // re-fetch is already `active`; only a pre-existing active droplet is a no-op.
    async fn ensure_present(
        &self,
        request: &DropletRequest,
        located: Option<Droplet>,
    ) -> Result<Outcome, ReconcileError> {
        let (droplet, created) = match (located, request.id) {
            (Some(existing), _) => (existing, false),
            (None, Some(id)) => return Err(ReconcileError::NotFound { id }),
            (None, None) => (self.create(request).await?, true),
        };

        let current = self.fetch_existing(droplet.id).await?;
        if current.status.is_active() {
            tracing::info!(droplet_id = %current.id, created, "droplet already active");
            return Ok(Outcome::with_droplet(created, current));
        }

        let powered_on = self.power_on_if_off(&current).await?;
        let changed = created || powered_on;

        if !request.wait {
            return Ok(Outcome::with_droplet(changed, current).message(NO_WAIT_MESSAGE));
        }

        let active = self
            .wait_until_active(current.id, request.wait_timeout)
            .await?;
        Ok(Outcome::with_droplet(changed, active))
    }

    async fn ensure_absent(&self, located: Option<Droplet>) -> Result<Outcome, ReconcileError> {
        let Some(droplet) = located else {
            tracing::info!("droplet already absent");
            return Ok(Outcome::unchanged().message(NOT_FOUND_MESSAGE));
        };

        self.delete(droplet.id).await?;
        Ok(Outcome::deleted(droplet.id))
    }
}

/// Extracts and decodes `key` from a successful response body.
fn decode_field<T: DeserializeOwned>(
    response: &ApiResponse,
    key: &str,
    context: &str,
) -> Result<T, ReconcileError> {
    let value = response
        .field(key)
        .cloned()
        .ok_or_else(|| ReconcileError::Decode {
            context: format!("{context}: missing `{key}`"),
        })?;
    serde_json::from_value(value).map_err(|err| ReconcileError::Decode {
        context: format!("{context}: {err}"),
    })
}

/// Converts an error-shaped response into [`ReconcileError::Provider`].
fn provider_error(response: &ApiResponse) -> ReconcileError {
    ReconcileError::Provider {
        status: response.status,
        message: response
            .error_message()
            .map_or_else(|| format!("unexpected HTTP status {}", response.status), str::to_owned),
    }
}

#[cfg(test)]
mod tests;
