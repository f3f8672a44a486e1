//! User-data attached to a droplet at creation time.
//!
//! The payload is opaque and forwarded verbatim, but DigitalOcean rejects
//! anything over 64 KiB, so oversized payloads are refused before any API
//! call. Files are checked against the limit from their metadata without
//! being read.

use std::io::{self, Read};

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use thiserror::Error;

/// Largest user-data payload the provider accepts.
pub const MAX_USER_DATA_BYTES: u64 = 64 * 1024;

/// Errors raised while resolving user-data.
#[derive(Debug, Error)]
pub enum UserDataError {
    /// Both `--user-data` and `--user-data-file` were given.
    #[error("pass user-data inline or with --user-data-file, not both")]
    Conflict,
    /// The payload contains only whitespace.
    #[error("user-data is blank")]
    Blank,
    /// The payload exceeds [`MAX_USER_DATA_BYTES`].
    #[error("user-data is {len} bytes; droplets accept at most {MAX_USER_DATA_BYTES}")]
    TooLarge {
        /// Payload size in bytes.
        len: u64,
    },
    /// The path does not end in a file name.
    #[error("user-data path `{0}` does not name a file")]
    NotAFile(String),
    /// Opening or reading the file failed.
    #[error("cannot read user-data from {path}: {source}")]
    Read {
        /// Path after home expansion.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Resolves the payload from an inline value or a file path.
///
/// A leading `~/` in the path expands to `$HOME`.
///
/// # Errors
///
/// Returns [`UserDataError`] when both sources are given, the payload is
/// blank or oversized, or the file cannot be read.
pub fn resolve_user_data(
    inline: Option<&str>,
    file: Option<&str>,
) -> Result<Option<String>, UserDataError> {
    let payload = match (inline, file) {
        (Some(_), Some(_)) => return Err(UserDataError::Conflict),
        (None, None) => return Ok(None),
        (Some(text), None) => text.to_owned(),
        (None, Some(raw)) => {
            let home = std::env::var("HOME").ok();
            read_payload(&user_data_path(raw, home.as_deref())?)?
        }
    };

    let len = byte_len(&payload);
    if len > MAX_USER_DATA_BYTES {
        return Err(UserDataError::TooLarge { len });
    }
    if payload.trim().is_empty() {
        return Err(UserDataError::Blank);
    }
    Ok(Some(payload))
}

fn byte_len(payload: &str) -> u64 {
    u64::try_from(payload.len()).unwrap_or(u64::MAX)
}

fn user_data_path(raw: &str, home: Option<&str>) -> Result<Utf8PathBuf, UserDataError> {
    let trimmed = raw.trim();
    let path = match (trimmed.strip_prefix("~/"), home) {
        (Some(rest), Some(home_dir)) => Utf8Path::new(home_dir).join(rest),
        _ => Utf8PathBuf::from(trimmed),
    };
    if path.file_name().is_none() {
        return Err(UserDataError::NotAFile(raw.to_owned()));
    }
    Ok(path)
}

fn read_payload(path: &Utf8Path) -> Result<String, UserDataError> {
    let read_error = |source: io::Error| UserDataError::Read {
        path: path.to_owned(),
        source,
    };
    let name = path
        .file_name()
        .ok_or_else(|| UserDataError::NotAFile(path.to_string()))?;
    let parent = path
        .parent()
        .filter(|dir| !dir.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));

    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(read_error)?;
    let mut file = dir.open(name).map_err(read_error)?;
    let len = file.metadata().map_err(read_error)?.len();
    if len > MAX_USER_DATA_BYTES {
        return Err(UserDataError::TooLarge { len });
    }

    let mut payload = String::new();
    file.read_to_string(&mut payload).map_err(read_error)?;
    Ok(payload)
}
