//! Owner resolution: turns the `--user` / `--group` / `--project` selector
//! into a concrete [`Owner`].

use tracing::info;

use crate::error::{HostError, TokenError};
use crate::host::HostClient;
use crate::model::{Owner, OwnerKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerSelector {
    /// The user the credentials belong to.
    Current,
    User(String),
    Group(String),
    Project(String),
}

impl OwnerSelector {
    /// Build a selector from the three optional flags. At most one may be set.
    pub fn from_flags(
        user: Option<&str>,
        group: Option<&str>,
        project: Option<&str>,
    ) -> Result<Self, TokenError> {
        let selectors = [
            user.map(|u| Self::User(u.to_string())),
            group.map(|g| Self::Group(g.to_string())),
            project.map(|p| Self::Project(p.to_string())),
        ];
        let mut given = selectors.into_iter().flatten();
        let selector = given.next().unwrap_or(Self::Current);
        if given.next().is_some() {
            return Err(TokenError::configuration(
                "Only one of --user, --group or --project may be given",
            ));
        }
        if let Some(value) = selector.value()
            && value.trim().is_empty()
        {
            return Err(TokenError::configuration(format!(
                "The {} selector must not be empty",
                selector.kind()
            )));
        }
        Ok(selector)
    }

    pub fn kind(&self) -> OwnerKind {
        match self {
            Self::Current | Self::User(_) => OwnerKind::Personal,
            Self::Group(_) => OwnerKind::Group,
            Self::Project(_) => OwnerKind::Project,
        }
    }

    fn value(&self) -> Option<&str> {
        match self {
            Self::Current => None,
            Self::User(v) | Self::Group(v) | Self::Project(v) => Some(v),
        }
    }
}

/// Resolve the owner once. Any failure here aborts the run; there is no
/// fallback to another owner kind.
pub async fn resolve_owner(
    host: &dyn HostClient,
    selector: &OwnerSelector,
) -> Result<Owner, TokenError> {
    let result = match selector.value() {
        None => host.authenticate().await,
        Some(value) => host.get_owner(selector.kind(), value).await,
    };
    let owner = result.map_err(|err| match err {
        HostError::Authentication(message) => TokenError::Authentication(message),
        source => TokenError::OwnerResolution {
            kind: selector.kind(),
            selector: selector.value().unwrap_or("current user").to_string(),
            source,
        },
    })?;
    info!(kind = %owner.kind, owner = %owner.display_name, id = owner.id, "Resolved token owner");
    Ok(owner)
}
