//! Per-owner-kind request shapes.
//!
//! Personal tokens live in a global index filtered by user id; group and
//! project tokens live under the owner's own `access_tokens` sub-resource.
//! Every path and payload difference between the kinds is kept here.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::model::{CreateRequest, ExpiryDate, Owner, OwnerKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenScope {
    Personal { user_id: u64 },
    Group { group_id: u64 },
    Project { project_id: u64 },
}

/// Body of a create call. `expires_at` is absent for personal tokens.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct CreatePayload<'a> {
    pub name: &'a str,
    pub scopes: &'a BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<ExpiryDate>,
}

impl TokenScope {
    pub fn for_owner(owner: &Owner) -> Self {
        match owner.kind {
            OwnerKind::Personal => Self::Personal { user_id: owner.id },
            OwnerKind::Group => Self::Group { group_id: owner.id },
            OwnerKind::Project => Self::Project { project_id: owner.id },
        }
    }

    pub fn kind(&self) -> OwnerKind {
        match self {
            Self::Personal { .. } => OwnerKind::Personal,
            Self::Group { .. } => OwnerKind::Group,
            Self::Project { .. } => OwnerKind::Project,
        }
    }

    pub fn list_path(&self) -> String {
        match self {
            Self::Personal { .. } => "personal_access_tokens".to_string(),
            Self::Group { group_id } => format!("groups/{group_id}/access_tokens"),
            Self::Project { project_id } => format!("projects/{project_id}/access_tokens"),
        }
    }

    /// Query filtering the listing down to active tokens of this owner.
    pub fn list_query(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::Personal { user_id } => vec![
                ("user_id", user_id.to_string()),
                ("state", "active".to_string()),
            ],
            Self::Group { .. } | Self::Project { .. } => vec![("state", "active".to_string())],
        }
    }

    pub fn token_path(&self, token_id: u64) -> String {
        format!("{}/{token_id}", self.list_path())
    }

    pub fn rotate_path(&self, token_id: u64) -> String {
        format!("{}/rotate", self.token_path(token_id))
    }

    pub fn create_path(&self) -> String {
        match self {
            Self::Personal { user_id } => format!("users/{user_id}/personal_access_tokens"),
            Self::Group { .. } | Self::Project { .. } => self.list_path(),
        }
    }

    pub fn create_payload<'a>(&self, request: &'a CreateRequest) -> CreatePayload<'a> {
        let expires_at = match self {
            Self::Personal { .. } => None,
            Self::Group { .. } | Self::Project { .. } => Some(request.expires_at),
        };
        CreatePayload {
            name: &request.name,
            scopes: &request.scopes,
            expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use time::macros::date;

    use super::*;
    use crate::model::parse_scopes;

    fn request() -> CreateRequest {
        CreateRequest {
            name: "ci-bot".into(),
            scopes: parse_scopes("api,read_repository"),
            expires_at: ExpiryDate::new(date!(2030 - 01 - 01)),
        }
    }

    #[test]
    fn personal_scope_uses_global_index() {
        let scope = TokenScope::Personal { user_id: 7 };
        assert_eq!(scope.list_path(), "personal_access_tokens");
        assert_eq!(
            scope.list_query(),
            vec![("user_id", "7".to_string()), ("state", "active".to_string())]
        );
        assert_eq!(scope.token_path(42), "personal_access_tokens/42");
        assert_eq!(scope.rotate_path(42), "personal_access_tokens/42/rotate");
        assert_eq!(scope.create_path(), "users/7/personal_access_tokens");
    }

    #[test]
    fn group_and_project_scopes_use_sub_resources() {
        let group = TokenScope::Group { group_id: 3 };
        assert_eq!(group.list_path(), "groups/3/access_tokens");
        assert_eq!(group.create_path(), "groups/3/access_tokens");
        assert_eq!(group.rotate_path(9), "groups/3/access_tokens/9/rotate");

        let project = TokenScope::Project { project_id: 5 };
        assert_eq!(project.token_path(9), "projects/5/access_tokens/9");
        assert_eq!(project.list_query(), vec![("state", "active".to_string())]);
    }

    #[test]
    fn personal_payload_omits_expiry() {
        let request = request();
        let body = serde_json::to_value(TokenScope::Personal { user_id: 1 }.create_payload(&request))
            .unwrap();
        assert_eq!(body, json!({"name": "ci-bot", "scopes": ["api", "read_repository"]}));
    }

    #[test]
    fn group_payload_carries_expiry() {
        let request = request();
        let body = serde_json::to_value(TokenScope::Group { group_id: 1 }.create_payload(&request))
            .unwrap();
        assert_eq!(
            body,
            json!({"name": "ci-bot", "scopes": ["api", "read_repository"], "expires_at": "2030-01-01"})
        );
    }

    #[test]
    fn scope_follows_owner_kind() {
        let owner = Owner {
            kind: OwnerKind::Project,
            id: 11,
            display_name: "infra/deploy".into(),
        };
        let scope = TokenScope::for_owner(&owner);
        assert_eq!(scope, TokenScope::Project { project_id: 11 });
        assert_eq!(scope.kind(), OwnerKind::Project);
    }
}
