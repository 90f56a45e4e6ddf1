//! Finds an existing token by numeric id or by name.

use std::fmt;

use tracing::debug;

use crate::error::{HostError, Operation, TokenError};
use crate::host::HostClient;
use crate::model::Token;
use crate::scope::TokenScope;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenRef {
    Id(u64),
    Name(String),
}

impl TokenRef {
    /// A reference made only of ASCII digits is an id; anything else is a
    /// name.
    pub fn parse(reference: &str) -> Self {
        let reference = reference.trim();
        if !reference.is_empty() && reference.bytes().all(|b| b.is_ascii_digit()) {
            // Digits too large for an id cannot exist on the host either.
            if let Ok(id) = reference.parse() {
                return Self::Id(id);
            }
        }
        Self::Name(reference.to_string())
    }
}

impl fmt::Display for TokenRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

/// Resolve `reference` within `scope`.
///
/// Ids are fetched directly. Names are matched exactly against the active
/// tokens of the scope; more than one match is reported as
/// [`TokenError::AmbiguousToken`] rather than picking one.
pub async fn locate_token(
    host: &dyn HostClient,
    scope: &TokenScope,
    reference: &TokenRef,
) -> Result<Token, TokenError> {
    match reference {
        TokenRef::Id(id) => host.get_token(scope, *id).await.map_err(|err| match err {
            HostError::NotFound(_) => TokenError::TokenNotFound {
                reference: reference.to_string(),
            },
            err => TokenError::remote(Operation::Lookup, err),
        }),
        TokenRef::Name(name) => {
            let tokens = host
                .list_tokens(scope)
                .await
                .map_err(|err| TokenError::remote(Operation::List, err))?;
            let mut matches: Vec<Token> = tokens
                .into_iter()
                .filter(|t| t.is_active() && &t.name == name)
                .collect();
            debug!(name = %name, matches = matches.len(), "Searched active tokens by name");
            match matches.len() {
                0 => Err(TokenError::TokenNotFound {
                    reference: name.clone(),
                }),
                1 => Ok(matches.remove(0)),
                _ => Err(TokenError::AmbiguousToken {
                    name: name.clone(),
                    ids: matches.iter().map(|t| t.id).collect(),
                }),
            }
        }
    }
}
