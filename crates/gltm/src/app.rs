//! Invocation validation and orchestration.

use std::io::Write;

use time::Date;
use tracing::{error, info};

use crate::cli::{Cli, OutputFormat};
use crate::error::TokenError;
use crate::host::HostClient;
use crate::lifecycle;
use crate::locator::{TokenRef, locate_token};
use crate::model::{CreateRequest, ExpiryDate, IssuedToken, parse_scopes};
use crate::output::write_records;
use crate::owner::{OwnerSelector, resolve_owner};
use crate::scope::TokenScope;
use crate::secret::{SecretSink, SecretTarget};

/// The single mutating action of an invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimaryAction {
    Create {
        name: String,
        scopes: std::collections::BTreeSet<String>,
        expires_at: Option<ExpiryDate>,
    },
    Rotate {
        expires_at: Option<ExpiryDate>,
    },
    Delete,
}

/// A fully validated request. Building one never touches the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub owner: OwnerSelector,
    pub token: Option<TokenRef>,
    pub list: bool,
    pub action: Option<PrimaryAction>,
    pub secret_target: Option<SecretTarget>,
}

impl Invocation {
    pub fn from_cli(cli: &Cli) -> Result<Self, TokenError> {
        let owner = OwnerSelector::from_flags(
            cli.user.as_deref(),
            cli.group.as_deref(),
            cli.project.as_deref(),
        )?;
        let expires_at = cli
            .expires_at
            .as_deref()
            .map(str::parse::<ExpiryDate>)
            .transpose()?;
        let token = match cli.token.as_deref().map(str::trim) {
            Some("") => return Err(TokenError::configuration("--token must not be empty")),
            Some(reference) => Some(TokenRef::parse(reference)),
            None => None,
        };
        let secret_target = cli
            .output
            .as_deref()
            .map(SecretTarget::parse)
            .transpose()?;

        let action = match (cli.create, cli.rotate, cli.delete) {
            (false, false, false) => None,
            (true, false, false) => {
                let name = cli
                    .name
                    .as_deref()
                    .map(str::trim)
                    .filter(|n| !n.is_empty());
                let scopes = cli.scopes.as_deref().map(parse_scopes).unwrap_or_default();
                let Some(name) = name.filter(|_| !scopes.is_empty()) else {
                    return Err(TokenError::configuration(
                        "Access Token Name and Scopes are required to create!",
                    ));
                };
                Some(PrimaryAction::Create {
                    name: name.to_string(),
                    scopes,
                    expires_at,
                })
            }
            (false, true, false) => {
                if token.is_none() {
                    return Err(TokenError::configuration(
                        "Access Token ID or Name is required to rotate!",
                    ));
                }
                Some(PrimaryAction::Rotate { expires_at })
            }
            (false, false, true) => {
                if token.is_none() {
                    return Err(TokenError::configuration(
                        "Access Token ID or Name is required to delete!",
                    ));
                }
                Some(PrimaryAction::Delete)
            }
            _ => {
                return Err(TokenError::configuration(
                    "Only one of --create, --rotate or --delete may be given",
                ));
            }
        };

        if action.is_none() && token.is_none() && !cli.list {
            return Err(TokenError::configuration(
                "Nothing to do. Use --list, --token, --create, --rotate or --delete",
            ));
        }

        Ok(Self {
            owner,
            token,
            list: cli.list,
            action,
            secret_target,
        })
    }
}

/// Explicit per-run context: the host capability and everything else the
/// operations read.
pub struct Session<'a> {
    pub host: &'a dyn HostClient,
    pub sink: SecretSink,
    pub format: OutputFormat,
    pub today: Date,
}

/// Soft failures collected while the rest of the invocation proceeded.
#[derive(Debug, Default)]
pub struct Outcome {
    failures: Vec<TokenError>,
}

impl Outcome {
    fn absorb(&mut self, err: TokenError) -> Result<(), TokenError> {
        if err.is_fatal() {
            return Err(err);
        }
        error!("{err}");
        self.failures.push(err);
        Ok(())
    }

    pub fn failures(&self) -> &[TokenError] {
        &self.failures
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// 0 when every requested action succeeded, 2 when some were skipped or
    /// failed. Fatal errors never reach an `Outcome`.
    pub fn exit_code(&self) -> u8 {
        if self.is_success() { 0 } else { 2 }
    }
}

/// Execute a validated invocation. Fatal errors are returned; everything
/// else is logged and recorded in the [`Outcome`].
pub async fn run(
    session: &Session<'_>,
    invocation: &Invocation,
    out: &mut dyn Write,
) -> Result<Outcome, TokenError> {
    let host = session.host;
    let mut outcome = Outcome::default();

    let owner = resolve_owner(host, &invocation.owner).await?;
    let scope = TokenScope::for_owner(&owner);

    let mut located = None;
    if let Some(reference) = &invocation.token {
        match locate_token(host, &scope, reference).await {
            Ok(token) => {
                if let Err(err) = write_records(out, [&token], session.format) {
                    outcome.absorb(TokenError::output("stdout", err))?;
                }
                located = Some(token);
            }
            Err(err) => outcome.absorb(err)?,
        }
    }

    if invocation.list {
        match lifecycle::list_tokens(host, &scope).await {
            Ok(list) if list.len() == 0 => {
                info!("No active access tokens found for {owner}");
            }
            Ok(list) => {
                let tokens: Vec<_> = list.collect();
                if let Err(err) = write_records(out, &tokens, session.format) {
                    outcome.absorb(TokenError::output("stdout", err))?;
                }
            }
            Err(err) => outcome.absorb(err)?,
        }
    }

    match &invocation.action {
        None => {}
        Some(PrimaryAction::Create {
            name,
            scopes,
            expires_at,
        }) => {
            let expires_at = match expires_at {
                Some(date) => *date,
                None => ExpiryDate::default_from(session.today)?,
            };
            let request = CreateRequest {
                name: name.clone(),
                scopes: scopes.clone(),
                expires_at,
            };
            match lifecycle::create_token(host, &scope, &request).await {
                Ok(issued) => disclose(session, issued, out, &mut outcome)?,
                Err(err) => outcome.absorb(err)?,
            }
        }
        Some(PrimaryAction::Rotate { expires_at }) => {
            // A failed lookup was already reported above.
            if let Some(token) = located.take() {
                match lifecycle::rotate_token(host, &scope, token, *expires_at).await {
                    Ok(issued) => disclose(session, issued, out, &mut outcome)?,
                    Err(err) => outcome.absorb(err)?,
                }
            }
        }
        Some(PrimaryAction::Delete) => {
            if let Some(token) = located.take() {
                if let Err(err) = lifecycle::delete_token(host, &scope, token).await {
                    outcome.absorb(err)?;
                }
            }
        }
    }

    Ok(outcome)
}

/// Print the record of a freshly issued token, then hand its secret to the
/// sink. The secret never appears in the record line.
fn disclose(
    session: &Session<'_>,
    issued: IssuedToken,
    out: &mut dyn Write,
    outcome: &mut Outcome,
) -> Result<(), TokenError> {
    let IssuedToken { token, secret } = issued;
    if let Err(err) = write_records(out, [&token], session.format) {
        outcome.absorb(TokenError::output("stdout", err))?;
    }
    if let Err(err) = session.sink.disclose(secret, out) {
        outcome.absorb(err)?;
    }
    Ok(())
}
