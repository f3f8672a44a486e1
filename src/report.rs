//! Outcome reported to the caller once reconciliation finishes.

use std::net::{Ipv4Addr, Ipv6Addr};

use serde::Serialize;

use crate::droplet::{Droplet, DropletId};

/// Droplet snapshot plus the addresses callers usually want directly.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DropletReport {
    /// Full provider representation.
    #[serde(flatten)]
    pub droplet: Droplet,
    /// First public IPv4 address, if assigned yet.
    pub ip_address: Option<Ipv4Addr>,
    /// First private IPv4 address, if assigned yet.
    pub private_ip_address: Option<Ipv4Addr>,
    /// First public IPv6 address, if assigned yet.
    pub ipv6_address: Option<Ipv6Addr>,
}

impl From<Droplet> for DropletReport {
    fn from(droplet: Droplet) -> Self {
        Self {
            ip_address: droplet.public_ipv4(),
            private_ip_address: droplet.private_ipv4(),
            ipv6_address: droplet.public_ipv6(),
            droplet,
        }
    }
}

/// Result of one reconciliation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Outcome {
    /// Whether any state-changing call was made.
    pub changed: bool,
    /// Latest known snapshot, when a droplet exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub droplet: Option<DropletReport>,
    /// Human-readable note.
    #[serde(rename = "msg", skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Outcome {
    /// Outcome carrying a droplet snapshot.
    #[must_use]
    pub fn with_droplet(changed: bool, droplet: Droplet) -> Self {
        Self {
            changed,
            droplet: Some(droplet.into()),
            message: None,
        }
    }

    /// No-op outcome without a droplet.
    #[must_use]
    pub const fn unchanged() -> Self {
        Self {
            changed: false,
            droplet: None,
            message: None,
        }
    }

    /// Outcome after a delete call.
    #[must_use]
    pub fn deleted(id: DropletId) -> Self {
        Self {
            changed: true,
            droplet: None,
            message: Some(format!("Droplet {id} deleted.")),
        }
    }

    /// Attaches a message.
    #[must_use]
    pub fn message(mut self, text: impl Into<String>) -> Self {
        self.message = Some(text.into());
        self
    }

    /// Returns the reported droplet id, if any.
    #[must_use]
    pub fn droplet_id(&self) -> Option<DropletId> {
        self.droplet.as_ref().map(|report| report.droplet.id)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::test_support::{active_droplet_json, droplet_json};

    fn droplet(value: serde_json::Value) -> Droplet {
        serde_json::from_value(value).unwrap_or_else(|err| panic!("droplet fixture: {err}"))
    }

    #[test]
    fn report_extracts_addresses() {
        let report = DropletReport::from(droplet(active_droplet_json(7, "web-1")));
        assert_eq!(report.ip_address, Some(Ipv4Addr::new(203, 0, 113, 10)));
        assert_eq!(report.private_ip_address, Some(Ipv4Addr::new(10, 128, 0, 5)));
        assert_eq!(
            report.ipv6_address.map(|addr| addr.to_string()),
            Some(String::from("2604:a880::10"))
        );
    }

    #[test]
    fn outcome_serialises_provider_attributes_verbatim() {
        let outcome = Outcome::with_droplet(true, droplet(droplet_json(7, "web-1", "new")));
        let value =
            serde_json::to_value(&outcome).unwrap_or_else(|err| panic!("serialise: {err}"));

        assert_eq!(value["changed"], json!(true));
        assert_eq!(value["droplet"]["id"], json!(7));
        assert_eq!(value["droplet"]["status"], json!("new"));
        assert_eq!(value["droplet"]["size_slug"], json!("s-1vcpu-1gb"));
        assert_eq!(value["droplet"]["region"]["slug"], json!("nyc1"));
        assert_eq!(value["droplet"]["ip_address"], json!(null));
        assert!(value.get("msg").is_none());
    }

    #[test]
    fn unchanged_outcome_omits_droplet() {
        let value = serde_json::to_value(Outcome::unchanged().message("Droplet not found."))
            .unwrap_or_else(|err| panic!("serialise: {err}"));
        assert_eq!(value, json!({"changed": false, "msg": "Droplet not found."}));
    }

    #[test]
    fn unknown_status_survives_round_trip() {
        let parsed = droplet(droplet_json(9, "archived", "archive"));
        assert_eq!(parsed.status.as_str(), "archive");
        assert!(!parsed.status.is_active());
        assert!(!parsed.status.is_off());
    }
}
