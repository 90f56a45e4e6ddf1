#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use gltm::{
    CreateRequest, ExpiryDate, HostClient, HostError, IssuedToken, Owner, OwnerKind, Secret,
    Token, TokenScope,
};

/// In-memory host. Tokens are stored per scope; revoking keeps the record.
pub struct FakeHost {
    state: Mutex<State>,
}

struct State {
    caller: Owner,
    owners: Vec<Owner>,
    tokens: Vec<(TokenScope, Token)>,
    next_id: u64,
    minted: u64,
    reject_auth: bool,
    fail_list: bool,
    calls: Vec<&'static str>,
}

pub fn owner(kind: OwnerKind, id: u64, name: &str) -> Owner {
    Owner {
        kind,
        id,
        display_name: name.to_string(),
    }
}

impl FakeHost {
    pub fn new() -> Self {
        let caller = owner(OwnerKind::Personal, 7, "alice");
        Self {
            state: Mutex::new(State {
                owners: vec![
                    caller.clone(),
                    owner(OwnerKind::Personal, 8, "bob"),
                    owner(OwnerKind::Group, 3, "infra"),
                    owner(OwnerKind::Project, 5, "infra/deploy"),
                ],
                caller,
                tokens: Vec::new(),
                next_id: 100,
                minted: 0,
                reject_auth: false,
                fail_list: false,
                calls: Vec::new(),
            }),
        }
    }

    pub fn rejecting_auth(self) -> Self {
        self.state.lock().unwrap().reject_auth = true;
        self
    }

    pub fn failing_list(self) -> Self {
        self.state.lock().unwrap().fail_list = true;
        self
    }

    /// Seed a token directly, bypassing the create path.
    pub fn seed(&self, scope: TokenScope, id: u64, name: &str, revoked: bool) {
        let token = Token {
            id,
            name: name.to_string(),
            created_at: Some("2026-01-01T00:00:00.000Z".to_string()),
            expires_at: None,
            revoked,
            active: !revoked,
            scopes: gltm::model::parse_scopes("api"),
            user_id: match scope {
                TokenScope::Personal { user_id } => Some(user_id),
                _ => None,
            },
        };
        self.state.lock().unwrap().tokens.push((scope, token));
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn active_named(&self, scope: TokenScope, name: &str) -> Vec<Token> {
        self.state
            .lock()
            .unwrap()
            .tokens
            .iter()
            .filter(|(s, t)| *s == scope && t.name == name && t.is_active())
            .map(|(_, t)| t.clone())
            .collect()
    }

    pub fn token(&self, scope: TokenScope, id: u64) -> Option<Token> {
        self.state
            .lock()
            .unwrap()
            .tokens
            .iter()
            .find(|(s, t)| *s == scope && t.id == id)
            .map(|(_, t)| t.clone())
    }
}

impl State {
    fn record(&mut self, call: &'static str) -> Result<(), HostError> {
        self.calls.push(call);
        if self.reject_auth {
            return Err(HostError::Authentication("401 Unauthorized".into()));
        }
        Ok(())
    }

    fn mint(&mut self) -> Secret {
        self.minted += 1;
        Secret::new(format!("glpat-secret-{}", self.minted))
    }
}

#[async_trait]
impl HostClient for FakeHost {
    async fn authenticate(&self) -> Result<Owner, HostError> {
        let mut state = self.state.lock().unwrap();
        state.record("authenticate")?;
        Ok(state.caller.clone())
    }

    async fn get_owner(&self, kind: OwnerKind, id_or_name: &str) -> Result<Owner, HostError> {
        let mut state = self.state.lock().unwrap();
        state.record("get_owner")?;
        state
            .owners
            .iter()
            .find(|o| {
                o.kind == kind && (o.display_name == id_or_name || o.id.to_string() == id_or_name)
            })
            .cloned()
            .ok_or_else(|| HostError::NotFound(format!("404 {kind} Not Found")))
    }

    async fn list_tokens(&self, scope: &TokenScope) -> Result<Vec<Token>, HostError> {
        let mut state = self.state.lock().unwrap();
        state.record("list_tokens")?;
        if state.fail_list {
            return Err(HostError::Network("connection reset".into()));
        }
        Ok(state
            .tokens
            .iter()
            .filter(|(s, t)| s == scope && t.is_active())
            .map(|(_, t)| t.clone())
            .collect())
    }

    async fn get_token(&self, scope: &TokenScope, token_id: u64) -> Result<Token, HostError> {
        let mut state = self.state.lock().unwrap();
        state.record("get_token")?;
        state
            .tokens
            .iter()
            .find(|(s, t)| s == scope && t.id == token_id)
            .map(|(_, t)| t.clone())
            .ok_or_else(|| HostError::NotFound("404 Not Found".into()))
    }

    async fn create_token(
        &self,
        scope: &TokenScope,
        request: &CreateRequest,
    ) -> Result<IssuedToken, HostError> {
        let mut state = self.state.lock().unwrap();
        state.record("create_token")?;
        let payload = scope.create_payload(request);
        let token = Token {
            id: state.next_id,
            name: payload.name.to_string(),
            created_at: Some("2026-10-19T09:30:00.000Z".to_string()),
            expires_at: payload.expires_at,
            revoked: false,
            active: true,
            scopes: payload.scopes.clone(),
            user_id: match scope {
                TokenScope::Personal { user_id } => Some(*user_id),
                _ => None,
            },
        };
        state.next_id += 1;
        state.tokens.push((*scope, token.clone()));
        let secret = state.mint();
        Ok(IssuedToken { token, secret })
    }

    async fn rotate_token(
        &self,
        scope: &TokenScope,
        token: &Token,
        expires_at: Option<ExpiryDate>,
    ) -> Result<IssuedToken, HostError> {
        let mut state = self.state.lock().unwrap();
        state.record("rotate_token")?;
        let stored = state
            .tokens
            .iter_mut()
            .find(|(s, t)| s == scope && t.id == token.id && t.is_active())
            .map(|(_, t)| t)
            .ok_or_else(|| HostError::NotFound("404 Not Found".into()))?;
        if let Some(expires_at) = expires_at {
            stored.expires_at = Some(expires_at);
        }
        let token = stored.clone();
        let secret = state.mint();
        Ok(IssuedToken { token, secret })
    }

    async fn delete_token(&self, scope: &TokenScope, token: &Token) -> Result<(), HostError> {
        let mut state = self.state.lock().unwrap();
        state.record("delete_token")?;
        let stored = state
            .tokens
            .iter_mut()
            .find(|(s, t)| s == scope && t.id == token.id && t.is_active())
            .map(|(_, t)| t)
            .ok_or_else(|| HostError::NotFound("404 Not Found".into()))?;
        stored.revoked = true;
        stored.active = false;
        Ok(())
    }
}
