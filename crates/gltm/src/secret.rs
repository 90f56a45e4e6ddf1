//! Disclosure of a freshly issued token value.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{Level, info};

use crate::error::TokenError;
use crate::logging::SECRET_TARGET;
use crate::model::Secret;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretTarget {
    Stdout,
    File(PathBuf),
}

impl SecretTarget {
    /// `-` and `stdout` select standard output, anything else is a path.
    pub fn parse(directive: &str) -> Result<Self, TokenError> {
        match directive.trim() {
            "" => Err(TokenError::configuration("--output must not be empty")),
            "-" | "stdout" => Ok(Self::Stdout),
            path => Ok(Self::File(PathBuf::from(path))),
        }
    }
}

/// Routes a secret to its destination. Without a target the secret goes to
/// an informational log line, never into the token record. If that line
/// would be filtered out it is written to stderr instead.
#[derive(Debug, Clone, Default)]
pub struct SecretSink {
    target: Option<SecretTarget>,
}

impl SecretSink {
    pub fn new(target: Option<SecretTarget>) -> Self {
        Self { target }
    }

    /// Consume `secret`. A write failure is returned but the remote change
    /// that produced the secret stays in place.
    pub fn disclose(&self, secret: Secret, stdout: &mut dyn Write) -> Result<(), TokenError> {
        match &self.target {
            None => announce(secret, &mut std::io::stderr()),
            Some(SecretTarget::Stdout) => writeln!(stdout, "{}", secret.expose())
                .and_then(|()| stdout.flush())
                .map_err(|err| TokenError::output("stdout", err)),
            Some(SecretTarget::File(path)) => write_secret_file(path, secret)
                .map_err(|err| TokenError::output(path.display().to_string(), err)),
        }
    }
}

fn announce(secret: Secret, fallback: &mut dyn Write) -> Result<(), TokenError> {
    if tracing::enabled!(target: SECRET_TARGET, Level::INFO) {
        info!(target: SECRET_TARGET, "Access Token: {}", secret.expose());
        return Ok(());
    }
    writeln!(fallback, "Access Token: {}", secret.expose())
        .and_then(|()| fallback.flush())
        .map_err(|err| TokenError::output("stderr", err))
}

fn write_secret_file(path: &Path, secret: Secret) -> std::io::Result<()> {
    let mut file = open_truncated(path)?;
    file.write_all(secret.expose().as_bytes())?;
    file.sync_all()?;
    info!(path = %path.display(), "Access token written");
    Ok(())
}

#[cfg(unix)]
fn open_truncated(path: &Path) -> std::io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_truncated(path: &Path) -> std::io::Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}
