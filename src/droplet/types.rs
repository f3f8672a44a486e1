//! Provider-side droplet representation.

use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Stable provider-assigned droplet identifier.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct DropletId(u64);

impl From<u64> for DropletId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for DropletId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle status as reported by the provider.
///
/// Kept as the raw string so unrecognised statuses (`archive`, future
/// values) survive into the report unchanged.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DropletStatus(String);

impl DropletStatus {
    /// Powered on.
    pub const ACTIVE: &'static str = "active";
    /// Powered off.
    pub const OFF: &'static str = "off";

    /// Returns the raw status string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns true when the droplet is powered on.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.0 == Self::ACTIVE
    }

    /// Returns true when the droplet is powered off.
    #[must_use]
    pub fn is_off(&self) -> bool {
        self.0 == Self::OFF
    }
}

impl fmt::Display for DropletStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One network interface entry.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct NetworkInterface {
    /// Assigned address.
    pub ip_address: String,
    /// `public` or `private`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Netmask, gateway and any other attributes.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NetworkInterface {
    fn is_public(&self) -> bool {
        self.kind == "public"
    }
}

/// Addresses assigned to a droplet; filled in asynchronously after boot.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Networks {
    /// IPv4 interfaces.
    #[serde(default)]
    pub v4: Vec<NetworkInterface>,
    /// IPv6 interfaces.
    #[serde(default)]
    pub v6: Vec<NetworkInterface>,
}

/// A droplet as last observed through the API.
///
/// Only the fields the reconciliation logic reads are typed; everything else
/// the provider returns is carried in `attributes` and serialised back
/// unchanged.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Droplet {
    /// Provider identifier.
    pub id: DropletId,
    /// Droplet name.
    pub name: String,
    /// Lifecycle status.
    pub status: DropletStatus,
    /// Network interfaces.
    #[serde(default)]
    pub networks: Networks,
    /// Remaining provider attributes.
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Droplet {
    /// First public IPv4 address, once assigned.
    #[must_use]
    pub fn public_ipv4(&self) -> Option<Ipv4Addr> {
        self.networks
            .v4
            .iter()
            .filter(|iface| iface.is_public())
            .find_map(|iface| iface.ip_address.parse().ok())
    }

    /// First private IPv4 address, once assigned.
    #[must_use]
    pub fn private_ipv4(&self) -> Option<Ipv4Addr> {
        self.networks
            .v4
            .iter()
            .filter(|iface| !iface.is_public())
            .find_map(|iface| iface.ip_address.parse().ok())
    }

    /// First public IPv6 address, once assigned.
    #[must_use]
    pub fn public_ipv6(&self) -> Option<Ipv6Addr> {
        self.networks
            .v6
            .iter()
            .filter(|iface| iface.is_public())
            .find_map(|iface| iface.ip_address.parse().ok())
    }
}
