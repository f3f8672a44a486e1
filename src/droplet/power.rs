//! Power-state convergence and the wait for `active`.

use std::time::Duration;

use serde_json::json;

use crate::client::RestClient;
use crate::poll::{Clock, PollError, PollPolicy, poll_until};

use super::{Droplet, DropletId, ReconcileError, Reconciler, provider_error};

impl<C: RestClient, K: Clock> Reconciler<C, K> {
    /// Requests power-on when the droplet reports `off`.
    ///
    /// The action completes asynchronously on the provider side; this only
    /// checks that the request was accepted. Returns whether a request was
    /// sent.
    pub(super) async fn power_on_if_off(&self, droplet: &Droplet) -> Result<bool, ReconcileError> {
        if !droplet.status.is_off() {
            tracing::debug!(
                droplet_id = %droplet.id,
                status = %droplet.status,
                "droplet not off; skipping power-on"
            );
            return Ok(false);
        }

        let path = format!("droplets/{}/actions", droplet.id);
        let body = json!({ "type": "power_on" });
        tracing::info!(droplet_id = %droplet.id, "powering on droplet");
        let response = self.client.post(&path, &body).await?;
        if !response.is_success() {
            return Err(provider_error(&response));
        }
        Ok(true)
    }

    /// Polls until the droplet reports `active`, returning the final
    /// snapshot.
    pub(super) async fn wait_until_active(
        &self,
        id: DropletId,
        timeout: Duration,
    ) -> Result<Droplet, ReconcileError> {
        let policy = PollPolicy::with_timeout(timeout).interval_cap(self.poll_interval_cap);
        tracing::info!(droplet_id = %id, timeout_secs = timeout.as_secs(), "waiting for droplet");

        poll_until(&self.clock, policy, move || self.active_snapshot(id))
            .await
            .map_err(|err| match err {
                PollError::Timeout { waited } => {
                    tracing::warn!(droplet_id = %id, ?waited, "droplet did not become active");
                    ReconcileError::Timeout {
                        droplet_id: id,
                        timeout_secs: timeout.as_secs(),
                    }
                }
                PollError::Probe(source) => source,
            })
    }

    async fn active_snapshot(&self, id: DropletId) -> Result<Option<Droplet>, ReconcileError> {
        let droplet = self.fetch_existing(id).await?;
        tracing::debug!(droplet_id = %id, status = %droplet.status, "polled droplet");
        Ok(droplet.status.is_active().then_some(droplet))
    }
}
