//! Droplet creation.
//!
//! A creation call is issued at most once per reconciliation. A rejected
//! call is fatal and nothing is cleaned up: if the provider created a
//! partial resource, removing it is left to the caller.

use serde::Serialize;

use crate::client::RestClient;
use crate::poll::Clock;
use crate::request::{DropletRequest, SlugOrId};

use super::{Droplet, ReconcileError, Reconciler, decode_field, provider_error};

#[derive(Debug, Serialize)]
struct CreateDropletPayload<'a> {
    name: &'a str,
    size: &'a str,
    image: &'a SlugOrId,
    region: &'a str,
    ssh_keys: &'a [SlugOrId],
    private_networking: bool,
    backups: bool,
    ipv6: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_data: Option<&'a str>,
}

impl<'a> CreateDropletPayload<'a> {
    fn from_request(request: &'a DropletRequest) -> Result<Self, ReconcileError> {
        let (Some(name), Some(size), Some(image), Some(region)) = (
            request.name.as_deref(),
            request.size.as_deref(),
            request.image.as_ref(),
            request.region.as_deref(),
        ) else {
            let mut missing = request.missing_creation_fields();
            if request.name.is_none() {
                missing.insert(0, "name");
            }
            return Err(ReconcileError::Configuration(format!(
                "cannot create droplet without {}",
                missing.join(", ")
            )));
        };

        Ok(Self {
            name,
            size,
            image,
            region,
            ssh_keys: &request.ssh_keys,
            private_networking: request.private_networking,
            backups: request.backups,
            ipv6: request.ipv6,
            user_data: request.user_data.as_deref(),
        })
    }
}

impl<C: RestClient, K: Clock> Reconciler<C, K> {
    pub(super) async fn create(&self, request: &DropletRequest) -> Result<Droplet, ReconcileError> {
        let payload = CreateDropletPayload::from_request(request)?;
        let body = serde_json::to_value(&payload).map_err(|err| ReconcileError::Decode {
            context: format!("encoding creation payload: {err}"),
        })?;

        tracing::info!(name = payload.name, region = payload.region, "creating droplet");
        let response = self.client.post("droplets", &body).await?;
        if !response.is_success() || response.error_message().is_some() {
            return Err(provider_error(&response));
        }

        let droplet: Droplet = decode_field(&response, "droplet", "creating droplet")?;
        tracing::info!(droplet_id = %droplet.id, status = %droplet.status, "droplet created");
        Ok(droplet)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn payload_maps_request_fields() {
        let request = DropletRequest::builder()
            .name("web-1")
            .size("s-1vcpu-1gb")
            .image("ubuntu-22-04-x64")
            .region("nyc1")
            .ssh_keys(["123", "aa:bb"])
            .ipv6(true)
            .user_data(Some(String::from("#cloud-config\n")))
            .build()
            .unwrap_or_else(|err| panic!("valid request: {err}"));

        let payload = CreateDropletPayload::from_request(&request)
            .unwrap_or_else(|err| panic!("payload: {err}"));
        let value =
            serde_json::to_value(&payload).unwrap_or_else(|err| panic!("serialise: {err}"));

        assert_eq!(
            value,
            json!({
                "name": "web-1",
                "size": "s-1vcpu-1gb",
                "image": "ubuntu-22-04-x64",
                "region": "nyc1",
                "ssh_keys": [123, "aa:bb"],
                "private_networking": false,
                "backups": false,
                "ipv6": true,
                "user_data": "#cloud-config\n"
            })
        );
    }

    #[test]
    fn payload_omits_absent_user_data() {
        let request = DropletRequest::builder()
            .name("web-1")
            .size("s-1vcpu-1gb")
            .image("6918990")
            .region("nyc1")
            .build()
            .unwrap_or_else(|err| panic!("valid request: {err}"));

        let payload = CreateDropletPayload::from_request(&request)
            .unwrap_or_else(|err| panic!("payload: {err}"));
        let value =
            serde_json::to_value(&payload).unwrap_or_else(|err| panic!("serialise: {err}"));

        assert!(value.get("user_data").is_none());
        assert_eq!(value.get("image"), Some(&json!(6_918_990)));
    }

    #[test]
    fn payload_requires_creation_attributes() {
        let request = DropletRequest::builder()
            .name("web-1")
            .build()
            .unwrap_or_else(|err| panic!("valid request: {err}"));

        let err = CreateDropletPayload::from_request(&request).expect_err("should fail");
        assert_eq!(
            err,
            ReconcileError::Configuration(String::from(
                "cannot create droplet without size, image, region"
            ))
        );
    }
}
