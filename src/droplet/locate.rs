//! Resolves the target droplet from an id or a unique name.

use serde::Deserialize;

use crate::client::RestClient;
use crate::poll::Clock;

use super::{Droplet, DropletId, ReconcileError, Reconciler, decode_field, provider_error};

/// Page size requested when listing droplets.
pub(super) const PAGE_SIZE: u32 = 200;

#[derive(Debug, Default, Deserialize)]
struct Links {
    #[serde(default)]
    pages: Pages,
}

#[derive(Debug, Default, Deserialize)]
struct Pages {
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DropletPage {
    droplets: Vec<Droplet>,
    #[serde(default)]
    links: Links,
}

impl<C: RestClient, K: Clock> Reconciler<C, K> {
    /// Finds the droplet by id first, then by name.
    ///
    /// The name is only consulted when the id is absent or unknown to the
    /// provider; the first droplet carrying that exact name wins.
    pub(super) async fn locate(
        &self,
        id: Option<DropletId>,
        name: Option<&str>,
    ) -> Result<Option<Droplet>, ReconcileError> {
        if let Some(droplet_id) = id
            && let Some(droplet) = self.fetch_droplet(droplet_id).await?
        {
            return Ok(Some(droplet));
        }

        match name {
            Some(wanted) => self.find_by_name(wanted).await,
            None => Ok(None),
        }
    }

    /// Fetches one droplet, mapping HTTP 404 to `None`.
    pub(super) async fn fetch_droplet(
        &self,
        id: DropletId,
    ) -> Result<Option<Droplet>, ReconcileError> {
        let path = format!("droplets/{id}");
        let response = self.client.get(&path).await?;
        if response.is_not_found() {
            tracing::debug!(droplet_id = %id, "droplet id not found");
            return Ok(None);
        }
        if !response.is_success() {
            return Err(provider_error(&response));
        }
        decode_field(&response, "droplet", "fetching droplet").map(Some)
    }

    /// Fetches a droplet that must exist.
    pub(super) async fn fetch_existing(&self, id: DropletId) -> Result<Droplet, ReconcileError> {
        self.fetch_droplet(id)
            .await?
            .ok_or(ReconcileError::NotFound { id })
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Droplet>, ReconcileError> {
        let mut page = 1_u32;
        loop {
            let path = format!("droplets?page={page}&per_page={PAGE_SIZE}");
            let response = self.client.get(&path).await?;
            if !response.is_success() {
                return Err(provider_error(&response));
            }
            let body = response.body.ok_or_else(|| ReconcileError::Decode {
                context: String::from("listing droplets: empty body"),
            })?;
            let listing: DropletPage =
                serde_json::from_value(body).map_err(|err| ReconcileError::Decode {
                    context: format!("listing droplets: {err}"),
                })?;

            if listing.droplets.is_empty() {
                return Ok(None);
            }
            if let Some(found) = listing
                .droplets
                .into_iter()
                .find(|droplet| droplet.name == name)
            {
                tracing::debug!(droplet_id = %found.id, name, "matched droplet by name");
                return Ok(Some(found));
            }
            if listing.links.pages.next.is_none() {
                return Ok(None);
            }
            page += 1;
        }
    }
}
