//! Command-line interface definitions for the `droplet` binary.
//!
//! This module centralises the clap parser structures so both the main binary
//! and the build script can reuse them when generating the manual page.

use clap::{ArgAction, Parser, ValueEnum};

/// Top-level CLI for the `droplet` binary.
#[derive(Debug, Parser)]
#[command(
    name = "droplet",
    about = "Converge a DigitalOcean droplet to the requested state",
    arg_required_else_help = true
)]
pub(crate) enum Cli {
    /// Ensure a droplet is present and running, or absent.
    #[command(
        name = "droplet",
        about = "Ensure a droplet is present and running, or absent"
    )]
    Droplet(DropletCommand),
}

/// Desired state accepted on the command line.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub(crate) enum StateArg {
    /// Droplet exists and is powered on.
    Present,
    /// Alias of `present`.
    Active,
    /// Droplet does not exist.
    Absent,
    /// Alias of `absent`.
    Deleted,
}

/// Arguments for the `droplet droplet` subcommand.
#[derive(Debug, Parser)]
#[expect(
    clippy::struct_excessive_bools,
    reason = "flags mirror the provider's boolean droplet options"
)]
pub(crate) struct DropletCommand {
    /// Desired state of the droplet.
    #[arg(long, value_enum, default_value = "present")]
    pub(crate) state: StateArg,
    /// Numeric id of the droplet to operate on.
    #[arg(long, visible_alias = "droplet-id", value_name = "ID")]
    pub(crate) id: Option<u64>,
    /// Droplet name; used on creation and, with --unique-name, for lookup.
    #[arg(long, value_name = "NAME")]
    pub(crate) name: Option<String>,
    /// Treat the name as unique so an existing droplet with it is reused.
    #[arg(long)]
    pub(crate) unique_name: bool,
    /// Size slug for new droplets (for example `s-1vcpu-1gb`).
    #[arg(long, visible_alias = "size-id", value_name = "SLUG")]
    pub(crate) size: Option<String>,
    /// Image slug or numeric image id for new droplets.
    #[arg(long, visible_alias = "image-id", value_name = "IMAGE")]
    pub(crate) image: Option<String>,
    /// Region slug for new droplets (for example `nyc1`).
    #[arg(long, visible_alias = "region-id", value_name = "SLUG")]
    pub(crate) region: Option<String>,
    /// SSH key ids or fingerprints to authorise; repeat or separate with commas.
    #[arg(long = "ssh-key-id", value_name = "KEY", value_delimiter = ',')]
    pub(crate) ssh_key_ids: Vec<String>,
    /// Attach a private network interface.
    #[arg(long)]
    pub(crate) private_networking: bool,
    /// Enable provider backups.
    #[arg(long)]
    pub(crate) backups_enabled: bool,
    /// Enable IPv6.
    #[arg(long)]
    pub(crate) ipv6: bool,
    /// Provide user-data inline.
    #[arg(long, value_name = "USER_DATA", conflicts_with = "user_data_file")]
    pub(crate) user_data: Option<String>,
    /// Provide user-data from a local file.
    #[arg(long, value_name = "PATH", conflicts_with = "user_data")]
    pub(crate) user_data_file: Option<String>,
    /// Wait for the droplet to become active before returning.
    #[arg(long, value_name = "BOOL", default_value_t = true, action = ArgAction::Set)]
    pub(crate) wait: bool,
    /// How long to wait, in seconds.
    #[arg(long, value_name = "SECS", default_value_t = 300)]
    pub(crate) wait_timeout: u64,
    /// API token; falls back to DO_API_TOKEN, then DO_API_KEY.
    #[arg(long, value_name = "TOKEN")]
    pub(crate) api_token: Option<String>,
}
