//! Create, rotate, delete and list operations.

use tracing::{info, warn};

use crate::error::{Operation, TokenError};
use crate::host::HostClient;
use crate::model::{CreateRequest, ExpiryDate, IssuedToken, Token};
use crate::scope::TokenScope;

/// Active tokens of one scope. Consumed once; listing again issues a new
/// host call.
#[derive(Debug)]
pub struct TokenList(std::vec::IntoIter<Token>);

impl Iterator for TokenList {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.0.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl ExactSizeIterator for TokenList {}

pub async fn list_tokens(
    host: &dyn HostClient,
    scope: &TokenScope,
) -> Result<TokenList, TokenError> {
    let tokens = host
        .list_tokens(scope)
        .await
        .map_err(|err| TokenError::remote(Operation::List, err))?;
    Ok(TokenList(tokens.into_iter()))
}

/// Create a token after checking that no active token of the scope already
/// uses the name. Revoked tokens do not block reuse of a name.
pub async fn create_token(
    host: &dyn HostClient,
    scope: &TokenScope,
    request: &CreateRequest,
) -> Result<IssuedToken, TokenError> {
    let existing = host
        .list_tokens(scope)
        .await
        .map_err(|err| TokenError::remote(Operation::List, err))?;
    if existing
        .iter()
        .any(|t| t.is_active() && t.name == request.name)
    {
        return Err(TokenError::AlreadyExists {
            name: request.name.clone(),
        });
    }

    let issued = host
        .create_token(scope, request)
        .await
        .map_err(|err| TokenError::remote(Operation::Create, err))?;
    info!(
        id = issued.token.id,
        name = %issued.token.name,
        kind = %scope.kind(),
        "Access token created"
    );
    Ok(issued)
}

/// Rotate an already located token, optionally moving its expiry.
pub async fn rotate_token(
    host: &dyn HostClient,
    scope: &TokenScope,
    mut token: Token,
    new_expiry: Option<ExpiryDate>,
) -> Result<IssuedToken, TokenError> {
    if let Some(expires_at) = new_expiry {
        token.expires_at = Some(expires_at);
    }
    let issued = host
        .rotate_token(scope, &token, new_expiry)
        .await
        .map_err(|err| TokenError::remote(Operation::Rotate, err))?;
    if issued.token.id != token.id {
        warn!(
            previous = token.id,
            current = issued.token.id,
            "Host issued the rotated token under a new id"
        );
    }
    info!(id = issued.token.id, name = %issued.token.name, "Access token rotated");
    Ok(issued)
}

/// Revoke an already located token. Returns the id of the revoked token.
pub async fn delete_token(
    host: &dyn HostClient,
    scope: &TokenScope,
    token: Token,
) -> Result<u64, TokenError> {
    host.delete_token(scope, &token)
        .await
        .map_err(|err| TokenError::remote(Operation::Delete, err))?;
    info!("Access token {} has been deleted!", token.id);
    Ok(token.id)
}
