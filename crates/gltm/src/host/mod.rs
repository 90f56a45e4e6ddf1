//! The authenticated host API surface.
//!
//! [`HostClient`] is built once per run and handed to every component by
//! reference. [`GitlabClient`] speaks the GitLab REST v4 API.

mod gitlab;

use async_trait::async_trait;

pub use gitlab::GitlabClient;

use crate::error::HostError;
use crate::model::{CreateRequest, ExpiryDate, IssuedToken, Owner, OwnerKind, Token};
use crate::scope::TokenScope;

#[async_trait]
pub trait HostClient: Send + Sync {
    /// The user the credentials belong to.
    async fn authenticate(&self) -> Result<Owner, HostError>;

    /// Look up an owner by numeric id or by name/path.
    async fn get_owner(&self, kind: OwnerKind, id_or_name: &str) -> Result<Owner, HostError>;

    /// Active tokens in `scope`.
    async fn list_tokens(&self, scope: &TokenScope) -> Result<Vec<Token>, HostError>;

    async fn get_token(&self, scope: &TokenScope, token_id: u64) -> Result<Token, HostError>;

    async fn create_token(
        &self,
        scope: &TokenScope,
        request: &CreateRequest,
    ) -> Result<IssuedToken, HostError>;

    /// Invalidate the current secret of `token` and mint a new one.
    async fn rotate_token(
        &self,
        scope: &TokenScope,
        token: &Token,
        expires_at: Option<ExpiryDate>,
    ) -> Result<IssuedToken, HostError>;

    async fn delete_token(&self, scope: &TokenScope, token: &Token) -> Result<(), HostError>;
}
