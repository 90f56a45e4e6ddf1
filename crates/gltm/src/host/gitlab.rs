use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::HostClient;
use crate::error::HostError;
use crate::model::{CreateRequest, ExpiryDate, IssuedToken, Owner, OwnerKind, Secret, Token};
use crate::scope::TokenScope;

const PER_PAGE: u32 = 100;

pub struct GitlabClient {
    http: reqwest::Client,
    base_url: String,
    private_token: String,
}

#[derive(Deserialize)]
struct UserRecord {
    id: u64,
    username: String,
}

#[derive(Deserialize)]
struct GroupRecord {
    id: u64,
    full_path: String,
}

#[derive(Deserialize)]
struct ProjectRecord {
    id: u64,
    path_with_namespace: String,
}

/// Token record as returned by create and rotate, which include the secret.
#[derive(Deserialize)]
struct IssuedRecord {
    #[serde(flatten)]
    token: Token,
    #[serde(rename = "token")]
    secret: Option<String>,
}

#[derive(serde::Serialize)]
struct RotateBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    expires_at: Option<ExpiryDate>,
}

impl GitlabClient {
    pub fn new(base_url: &str, private_token: &str) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
            private_token: private_token.to_string(),
        }
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/api/v4/{}", self.base_url, path)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, self.api_url(path))
            .header("PRIVATE-TOKEN", &self.private_token)
            .header("Accept", "application/json")
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, HostError> {
        let resp = self
            .request(reqwest::Method::GET, path)
            .query(query)
            .send()
            .await?;
        decode(check_status(resp).await?).await
    }

    /// Follow `x-next-page` until the listing is exhausted.
    async fn get_all<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, HostError> {
        let mut items = Vec::new();
        let mut page = 1u32;
        loop {
            let resp = self
                .request(reqwest::Method::GET, path)
                .query(query)
                .query(&[("per_page", PER_PAGE), ("page", page)])
                .send()
                .await?;
            let resp = check_status(resp).await?;
            let next = resp
                .headers()
                .get("x-next-page")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u32>().ok());
            let batch: Vec<T> = decode(resp).await?;
            items.extend(batch);
            match next {
                Some(n) if n > page => page = n,
                _ => break,
            }
        }
        Ok(items)
    }

    async fn post_json<B: serde::Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, HostError> {
        let resp = self
            .request(reqwest::Method::POST, path)
            .json(body)
            .send()
            .await?;
        decode(check_status(resp).await?).await
    }

    async fn find_user(&self, id_or_name: &str) -> Result<Owner, HostError> {
        let user = if is_numeric(id_or_name) {
            self.get_json::<UserRecord>(&format!("users/{id_or_name}"), &[])
                .await?
        } else {
            let candidates: Vec<UserRecord> = self
                .get_json("users", &[("username", id_or_name.to_string())])
                .await?;
            candidates
                .into_iter()
                .find(|u| u.username.eq_ignore_ascii_case(id_or_name))
                .ok_or_else(|| HostError::NotFound(format!("user {id_or_name}")))?
        };
        Ok(Owner {
            kind: OwnerKind::Personal,
            id: user.id,
            display_name: user.username,
        })
    }
}

#[async_trait]
impl HostClient for GitlabClient {
    async fn authenticate(&self) -> Result<Owner, HostError> {
        let user: UserRecord = self.get_json("user", &[]).await?;
        tracing::debug!(user_id = user.id, username = %user.username, "Authenticated");
        Ok(Owner {
            kind: OwnerKind::Personal,
            id: user.id,
            display_name: user.username,
        })
    }

    async fn get_owner(&self, kind: OwnerKind, id_or_name: &str) -> Result<Owner, HostError> {
        match kind {
            OwnerKind::Personal => self.find_user(id_or_name).await,
            OwnerKind::Group => {
                let group: GroupRecord = self
                    .get_json(&format!("groups/{}", path_segment(id_or_name)), &[])
                    .await?;
                Ok(Owner {
                    kind,
                    id: group.id,
                    display_name: group.full_path,
                })
            }
            OwnerKind::Project => {
                let project: ProjectRecord = self
                    .get_json(&format!("projects/{}", path_segment(id_or_name)), &[])
                    .await?;
                Ok(Owner {
                    kind,
                    id: project.id,
                    display_name: project.path_with_namespace,
                })
            }
        }
    }

    async fn list_tokens(&self, scope: &TokenScope) -> Result<Vec<Token>, HostError> {
        let mut tokens: Vec<Token> = self.get_all(&scope.list_path(), &scope.list_query()).await?;
        tokens.retain(|t| t.is_active() && belongs_to(scope, t));
        Ok(tokens)
    }

    async fn get_token(&self, scope: &TokenScope, token_id: u64) -> Result<Token, HostError> {
        let token: Token = self.get_json(&scope.token_path(token_id), &[]).await?;
        if !belongs_to(scope, &token) {
            return Err(HostError::NotFound(format!(
                "token {token_id} does not belong to this user"
            )));
        }
        Ok(token)
    }

    async fn create_token(
        &self,
        scope: &TokenScope,
        request: &CreateRequest,
    ) -> Result<IssuedToken, HostError> {
        let record: IssuedRecord = self
            .post_json(&scope.create_path(), &scope.create_payload(request))
            .await?;
        issued(record)
    }

    async fn rotate_token(
        &self,
        scope: &TokenScope,
        token: &Token,
        expires_at: Option<ExpiryDate>,
    ) -> Result<IssuedToken, HostError> {
        let record: IssuedRecord = self
            .post_json(&scope.rotate_path(token.id), &RotateBody { expires_at })
            .await?;
        issued(record)
    }

    async fn delete_token(&self, scope: &TokenScope, token: &Token) -> Result<(), HostError> {
        let resp = self
            .request(reqwest::Method::DELETE, &scope.token_path(token.id))
            .send()
            .await?;
        check_status(resp).await?;
        Ok(())
    }
}

fn issued(record: IssuedRecord) -> Result<IssuedToken, HostError> {
    let secret = record
        .secret
        .ok_or_else(|| HostError::Decode("response did not include the token value".into()))?;
    Ok(IssuedToken {
        token: record.token,
        secret: Secret::new(secret),
    })
}

/// Personal tokens are served from a global index, so an administrator can
/// read any user's token by id. Only tokens of the scope's user count.
fn belongs_to(scope: &TokenScope, token: &Token) -> bool {
    match scope {
        TokenScope::Personal { user_id } => token.user_id == Some(*user_id),
        TokenScope::Group { .. } | TokenScope::Project { .. } => true,
    }
}

fn is_numeric(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Namespaced paths such as `infra/deploy` are addressed URL-encoded.
fn path_segment(id_or_path: &str) -> String {
    url::form_urlencoded::byte_serialize(id_or_path.as_bytes()).collect()
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, HostError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    let message = error_message(&body);
    Err(match status.as_u16() {
        401 => HostError::Authentication(message),
        403 => HostError::Permission(message),
        404 => HostError::NotFound(message),
        code => HostError::Status {
            status: code,
            message,
        },
    })
}

/// GitLab reports errors as `{"message": ...}` or `{"error": ...}`, where
/// `message` may itself be an object of field errors.
fn error_message(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        for key in ["message", "error"] {
            match json.get(key) {
                Some(Value::String(s)) => return s.clone(),
                Some(v) if !v.is_null() => return v.to_string(),
                _ => {}
            }
        }
    }
    body.trim().to_string()
}

async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, HostError> {
    let body = resp.text().await?;
    serde_json::from_str(&body).map_err(|e| HostError::Decode(e.to_string()))
}
