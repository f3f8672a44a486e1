//! Desired droplet configuration for one reconciliation.

use std::fmt;
use std::time::Duration;

use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::droplet::DropletId;

/// Default time to wait for a droplet to become active.
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(300);

/// Lifecycle state the caller wants the droplet to end up in.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum DesiredState {
    /// The droplet exists and is powered on (`present` or `active`).
    #[default]
    Present,
    /// The droplet does not exist (`absent` or `deleted`).
    Absent,
}

impl fmt::Display for DesiredState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present => f.write_str("present"),
            Self::Absent => f.write_str("absent"),
        }
    }
}

/// Reference accepted by the provider either as a numeric id or a slug (or
/// fingerprint, for SSH keys).
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SlugOrId {
    /// Numeric provider identifier.
    Id(u64),
    /// Textual slug or fingerprint.
    Slug(String),
}

impl SlugOrId {
    /// Interprets purely numeric input as an id and anything else as a slug.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        trimmed
            .parse::<u64>()
            .map_or_else(|_| Self::Slug(trimmed.to_owned()), Self::Id)
    }
}

impl Serialize for SlugOrId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Id(id) => serializer.serialize_u64(*id),
            Self::Slug(slug) => serializer.serialize_str(slug),
        }
    }
}

/// Errors raised while assembling a [`DropletRequest`].
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum RequestError {
    /// Neither an id nor a name was supplied.
    #[error("one of id or name is required to identify the droplet")]
    MissingIdentity,
    /// Only some of the creation attributes were supplied.
    #[error("size, image and region must be given together (missing: {missing})")]
    Incomplete {
        /// Comma separated list of missing attributes.
        missing: String,
    },
    /// A supplied value was empty after trimming.
    #[error("{0} must not be empty")]
    Empty(&'static str),
}

/// Caller-supplied desired configuration for one droplet.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DropletRequest {
    /// Identity hint: the droplet id, when known.
    pub id: Option<DropletId>,
    /// Human-assigned name; also the name used on creation.
    pub name: Option<String>,
    /// Whether the name identifies at most one droplet.
    pub unique_name: bool,
    /// Size slug (for example `s-1vcpu-1gb`).
    pub size: Option<String>,
    /// Image slug or numeric image id.
    pub image: Option<SlugOrId>,
    /// Region slug (for example `nyc1`).
    pub region: Option<String>,
    /// SSH keys to authorise, by id or fingerprint.
    pub ssh_keys: Vec<SlugOrId>,
    /// Whether to attach a private network interface.
    pub private_networking: bool,
    /// Whether to enable provider backups.
    pub backups: bool,
    /// Whether to enable IPv6.
    pub ipv6: bool,
    /// Opaque user-data made available to the droplet.
    pub user_data: Option<String>,
    /// Desired lifecycle state.
    pub state: DesiredState,
    /// Whether to wait for the droplet to become active.
    pub wait: bool,
    /// Upper bound on the wait.
    pub wait_timeout: Duration,
}

impl DropletRequest {
    /// Starts a builder for a [`DropletRequest`].
    #[must_use]
    pub fn builder() -> DropletRequestBuilder {
        DropletRequestBuilder::new()
    }

    /// Name consulted by the locator, which is only trusted as an identity
    /// when `unique_name` is set.
    #[must_use]
    pub fn lookup_name(&self) -> Option<&str> {
        if self.unique_name {
            self.name.as_deref()
        } else {
            None
        }
    }

    /// Validates identity and creation attributes.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::MissingIdentity`] when neither id nor name is
    /// present, and [`RequestError::Incomplete`] when only some of size,
    /// image and region are present.
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.id.is_none() && self.name.is_none() {
            return Err(RequestError::MissingIdentity);
        }

        let missing = self.missing_creation_fields();
        if !missing.is_empty() && missing.len() < 3 {
            return Err(RequestError::Incomplete {
                missing: missing.join(", "),
            });
        }
        Ok(())
    }

    /// Lists the creation attributes that are absent.
    #[must_use]
    pub fn missing_creation_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.size.is_none() {
            missing.push("size");
        }
        if self.image.is_none() {
            missing.push("image");
        }
        if self.region.is_none() {
            missing.push("region");
        }
        missing
    }
}

/// Builder for [`DropletRequest`] that trims inputs and validates on build.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DropletRequestBuilder {
    request: DropletRequest,
}

impl Default for DropletRequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DropletRequestBuilder {
    /// Creates a builder with the documented defaults: state `present`,
    /// waiting enabled, 300 second timeout.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            request: DropletRequest {
                id: None,
                name: None,
                unique_name: false,
                size: None,
                image: None,
                region: None,
                ssh_keys: Vec::new(),
                private_networking: false,
                backups: false,
                ipv6: false,
                user_data: None,
                state: DesiredState::Present,
                wait: true,
                wait_timeout: DEFAULT_WAIT_TIMEOUT,
            },
        }
    }

    /// Sets the droplet id.
    #[must_use]
    pub fn id(mut self, value: Option<u64>) -> Self {
        self.request.id = value.map(DropletId::from);
        self
    }

    /// Sets the droplet name.
    #[must_use]
    pub fn name(mut self, value: impl Into<String>) -> Self {
        self.request.name = Some(value.into());
        self
    }

    /// Sets whether names are unique.
    #[must_use]
    pub const fn unique_name(mut self, value: bool) -> Self {
        self.request.unique_name = value;
        self
    }

    /// Sets the size slug.
    #[must_use]
    pub fn size(mut self, value: impl Into<String>) -> Self {
        self.request.size = Some(value.into());
        self
    }

    /// Sets the image slug or id.
    #[must_use]
    pub fn image(mut self, value: &str) -> Self {
        self.request.image = Some(SlugOrId::parse(value));
        self
    }

    /// Sets the region slug.
    #[must_use]
    pub fn region(mut self, value: impl Into<String>) -> Self {
        self.request.region = Some(value.into());
        self
    }

    /// Sets the SSH key references.
    #[must_use]
    pub fn ssh_keys<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.request.ssh_keys = values
            .into_iter()
            .map(|value| SlugOrId::parse(value.as_ref()))
            .collect();
        self
    }

    /// Enables or disables private networking.
    #[must_use]
    pub const fn private_networking(mut self, value: bool) -> Self {
        self.request.private_networking = value;
        self
    }

    /// Enables or disables backups.
    #[must_use]
    pub const fn backups(mut self, value: bool) -> Self {
        self.request.backups = value;
        self
    }

    /// Enables or disables IPv6.
    #[must_use]
    pub const fn ipv6(mut self, value: bool) -> Self {
        self.request.ipv6 = value;
        self
    }

    /// Sets the user-data payload.
    #[must_use]
    pub fn user_data(mut self, value: Option<String>) -> Self {
        self.request.user_data = value;
        self
    }

    /// Sets the desired state.
    #[must_use]
    pub const fn state(mut self, value: DesiredState) -> Self {
        self.request.state = value;
        self
    }

    /// Sets whether to wait for the droplet to become active.
    #[must_use]
    pub const fn wait(mut self, value: bool) -> Self {
        self.request.wait = value;
        self
    }

    /// Sets the wait timeout.
    #[must_use]
    pub const fn wait_timeout(mut self, value: Duration) -> Self {
        self.request.wait_timeout = value;
        self
    }

    /// Trims text inputs and validates the assembled request.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError`] when a supplied value is blank or the
    /// identity and creation rules are violated.
    pub fn build(self) -> Result<DropletRequest, RequestError> {
        let Self { mut request } = self;
        request.name = trimmed("name", request.name)?;
        request.size = trimmed("size", request.size)?;
        request.region = trimmed("region", request.region)?;
        if matches!(&request.image, Some(SlugOrId::Slug(slug)) if slug.is_empty()) {
            return Err(RequestError::Empty("image"));
        }
        if request
            .ssh_keys
            .iter()
            .any(|key| matches!(key, SlugOrId::Slug(slug) if slug.is_empty()))
        {
            return Err(RequestError::Empty("ssh key id"));
        }
        request.validate()?;
        Ok(request)
    }
}

fn trimmed(field: &'static str, value: Option<String>) -> Result<Option<String>, RequestError> {
    match value {
        Some(raw) => {
            let clean = raw.trim();
            if clean.is_empty() {
                return Err(RequestError::Empty(field));
            }
            Ok(Some(clean.to_owned()))
        }
        None => Ok(None),
    }
}
