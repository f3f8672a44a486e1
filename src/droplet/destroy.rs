//! Droplet deletion.

use crate::client::RestClient;
use crate::poll::Clock;

use super::{DropletId, ReconcileError, Reconciler, provider_error};

impl<C: RestClient, K: Clock> Reconciler<C, K> {
    /// Issues the delete call without waiting for the droplet to disappear.
    ///
    /// A 404 means the droplet went away between lookup and delete, which
    /// still satisfies the desired state.
    pub(super) async fn delete(&self, id: DropletId) -> Result<(), ReconcileError> {
        let path = format!("droplets/{id}");
        tracing::info!(droplet_id = %id, "deleting droplet");
        let response = self.client.delete(&path).await?;
        if response.is_success() || response.is_not_found() {
            return Ok(());
        }
        Err(provider_error(&response))
    }
}
