//! Binary entry point for the `droplet` CLI.

use std::io::{self, Write};
use std::process;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use droplet::{
    ConfigError, DesiredState, DigitalOceanConfig, DropletRequest, HttpClient, Outcome,
    ReconcileError, Reconciler, RequestError, UserDataError, resolve_user_data,
};

mod cli;

use cli::{Cli, DropletCommand, StateArg};

const LOG_ENV: &str = "DROPLET_LOG";

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid request: {0}")]
    Request(#[from] RequestError),
    #[error(transparent)]
    UserData(#[from] UserDataError),
    #[error("backend error: {0}")]
    Backend(String),
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
    #[error("failed to write outcome: {0}")]
    Output(String),
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();
    let exit_code = match dispatch(cli).await {
        Ok(outcome) => match write_outcome(io::stdout(), &outcome) {
            Ok(()) => 0,
            Err(err) => {
                report_error(&err);
                1
            }
        },
        Err(err) => {
            report_error(&err);
            1
        }
    };

    process::exit(exit_code);
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

async fn dispatch(cli: Cli) -> Result<Outcome, CliError> {
    match cli {
        Cli::Droplet(command) => run_droplet(command).await,
    }
}

async fn run_droplet(args: DropletCommand) -> Result<Outcome, CliError> {
    let request = build_request(&args)?;

    let config = DigitalOceanConfig::load_without_cli_args()?;
    config.validate()?;
    let token = config.resolve_token(args.api_token.as_deref())?;
    let client = HttpClient::new(&config.api_base_url, token, config.request_timeout())
        .map_err(|err| CliError::Backend(err.to_string()))?;

    let outcome = Reconciler::new(client).reconcile(&request).await?;
    Ok(outcome)
}

fn build_request(args: &DropletCommand) -> Result<DropletRequest, CliError> {
    let user_data = resolve_user_data(args.user_data.as_deref(), args.user_data_file.as_deref())?;

    let mut builder = DropletRequest::builder()
        .id(args.id)
        .unique_name(args.unique_name)
        .ssh_keys(&args.ssh_key_ids)
        .private_networking(args.private_networking)
        .backups(args.backups_enabled)
        .ipv6(args.ipv6)
        .user_data(user_data)
        .state(desired_state(args.state))
        .wait(args.wait)
        .wait_timeout(Duration::from_secs(args.wait_timeout));
    if let Some(name) = &args.name {
        builder = builder.name(name);
    }
    if let Some(size) = &args.size {
        builder = builder.size(size);
    }
    if let Some(image) = &args.image {
        builder = builder.image(image);
    }
    if let Some(region) = &args.region {
        builder = builder.region(region);
    }

    Ok(builder.build()?)
}

const fn desired_state(arg: StateArg) -> DesiredState {
    match arg {
        StateArg::Present | StateArg::Active => DesiredState::Present,
        StateArg::Absent | StateArg::Deleted => DesiredState::Absent,
    }
}

fn write_outcome(mut target: impl Write, outcome: &Outcome) -> Result<(), CliError> {
    serde_json::to_writer_pretty(&mut target, outcome)
        .map_err(|err| CliError::Output(err.to_string()))?;
    writeln!(target).map_err(|err| CliError::Output(err.to_string()))
}

fn report_error(err: &CliError) {
    write_error(io::stderr(), err);
}

fn write_error(mut target: impl Write, err: &CliError) {
    writeln!(target, "{err}").ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> DropletCommand {
        let argv = std::iter::once("droplet")
            .chain(std::iter::once("droplet"))
            .chain(args.iter().copied());
        match Cli::try_parse_from(argv) {
            Ok(Cli::Droplet(command)) => command,
            Err(err) => panic!("parse failed: {err}"),
        }
    }

    #[test]
    fn defaults_match_documented_values() {
        let command = parse(&["--name", "web-1"]);
        assert_eq!(command.state, StateArg::Present);
        assert!(command.wait);
        assert_eq!(command.wait_timeout, 300);
        assert!(!command.unique_name);
    }

    #[test]
    fn legacy_option_names_are_accepted() {
        let command = parse(&[
            "--droplet-id",
            "42",
            "--size-id",
            "s-1vcpu-1gb",
            "--image-id",
            "ubuntu-22-04-x64",
            "--region-id",
            "nyc1",
            "--state",
            "deleted",
        ]);
        assert_eq!(command.id, Some(42));
        assert_eq!(command.size.as_deref(), Some("s-1vcpu-1gb"));
        assert_eq!(desired_state(command.state), DesiredState::Absent);
    }

    #[test]
    fn build_request_maps_arguments() {
        let command = parse(&[
            "--name",
            "web-1",
            "--unique-name",
            "--size",
            "s-1vcpu-1gb",
            "--image",
            "ubuntu-22-04-x64",
            "--region",
            "nyc1",
            "--ssh-key-id",
            "123,456",
            "--wait",
            "false",
            "--wait-timeout",
            "60",
        ]);
        let request = build_request(&command).unwrap_or_else(|err| panic!("request: {err}"));

        assert_eq!(request.lookup_name(), Some("web-1"));
        assert_eq!(request.ssh_keys.len(), 2);
        assert!(!request.wait);
        assert_eq!(request.wait_timeout, Duration::from_secs(60));
    }

    #[test]
    fn build_request_requires_identity() {
        let command = parse(&["--size", "s-1vcpu-1gb"]);
        let err = build_request(&command).expect_err("identity is required");
        assert!(
            matches!(err, CliError::Request(RequestError::MissingIdentity)),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn build_request_requires_creation_fields_together() {
        let command = parse(&["--name", "web-1", "--size", "s-1vcpu-1gb"]);
        let err = build_request(&command).expect_err("size alone is incomplete");
        assert!(
            err.to_string().contains("image, region"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn write_outcome_emits_json() {
        let mut buf = Vec::new();
        write_outcome(&mut buf, &Outcome::unchanged().message("Droplet not found."))
            .unwrap_or_else(|err| panic!("write: {err}"));
        let rendered = String::from_utf8(buf).unwrap_or_else(|err| panic!("utf8: {err}"));
        assert!(rendered.contains("\"changed\": false"), "rendered: {rendered}");
        assert!(rendered.ends_with('\n'));
    }

    #[test]
    fn write_error_writes_cli_error() {
        let mut buf = Vec::new();
        write_error(
            &mut buf,
            &CliError::Request(RequestError::MissingIdentity),
        );
        let rendered = String::from_utf8(buf).unwrap_or_else(|err| panic!("utf8: {err}"));
        assert!(
            rendered.contains("one of id or name is required"),
            "rendered: {rendered}"
        );
    }
}
