//! In-memory identity provider.
//!
//! Backs tests and local runs with the same surface the hosted auth
//! service exposes: credential login, signup with categorized failures,
//! one-shot authorization codes, and opaque session tokens. Tokens and
//! passwords are stored as SHA-256 digests — even the in-memory fake
//! never holds plaintext secrets.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use forkline_types::{ForklineError, Identity, Result, Role, UserId};
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::session::{CredentialError, IdentityProvider, Session};

/// Minimum accepted password length, mirroring the hosted provider's policy.
const MIN_PASSWORD_LEN: usize = 10;

struct Account {
    identity: Identity,
    password_hash: String,
}

#[derive(Default)]
struct ProviderState {
    /// email -> account
    accounts: HashMap<String, Account>,
    /// sha256(token) -> identity
    sessions: HashMap<String, Identity>,
    /// sha256(code) -> email; consumed on exchange
    auth_codes: HashMap<String, String>,
}

/// See module docs.
#[derive(Default)]
pub struct MemoryIdentityProvider {
    state: RwLock<ProviderState>,
}

impl MemoryIdentityProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an account with a role and hand back a live session.
    /// Test/bootstrap helper; the public surface only mints customers.
    pub fn seed_user(&self, email: &str, password: &str, role: Role) -> Session {
        let identity = Identity {
            user_id: UserId::new(),
            role,
            email: email.to_string(),
        };
        let token = fresh_token();
        let mut state = self.state.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        state.accounts.insert(
            email.to_string(),
            Account {
                identity: identity.clone(),
                password_hash: digest(password),
            },
        );
        state.sessions.insert(digest(&token), identity.clone());
        Session { token, identity }
    }

    /// Mint a one-shot authorization code for an existing account.
    pub fn issue_code(&self, email: &str) -> Option<String> {
        let mut state = self.state.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        if !state.accounts.contains_key(email) {
            return None;
        }
        let code = fresh_token();
        state.auth_codes.insert(digest(&code), email.to_string());
        Some(code)
    }

    /// Revoke a session token.
    pub fn revoke(&self, token: &str) {
        let mut state = self.state.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        state.sessions.remove(&digest(token));
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    async fn resolve(&self, token: &str) -> Result<Option<Identity>> {
        let state = self
            .state
            .read()
            .map_err(|_| ForklineError::Internal("identity provider lock poisoned".into()))?;
        Ok(state.sessions.get(&digest(token)).cloned())
    }

    async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> std::result::Result<Session, CredentialError> {
        let token = fresh_token();
        let mut state = self.state.write().map_err(|_| {
            CredentialError::Unavailable("identity provider lock poisoned".into())
        })?;
        let Some(account) = state.accounts.get(email) else {
            return Err(CredentialError::InvalidCredentials);
        };
        if account.password_hash != digest(password) {
            return Err(CredentialError::InvalidCredentials);
        }
        let identity = account.identity.clone();
        state.sessions.insert(digest(&token), identity.clone());
        Ok(Session { token, identity })
    }

    async fn signup(
        &self,
        email: &str,
        password: &str,
    ) -> std::result::Result<Session, CredentialError> {
        if !looks_like_email(email) {
            return Err(CredentialError::MalformedEmail);
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(CredentialError::WeakPassword);
        }
        let token = fresh_token();
        let mut state = self.state.write().map_err(|_| {
            CredentialError::Unavailable("identity provider lock poisoned".into())
        })?;
        if state.accounts.contains_key(email) {
            return Err(CredentialError::DuplicateAccount);
        }
        let identity = Identity {
            user_id: UserId::new(),
            role: Role::Customer,
            email: email.to_string(),
        };
        state.accounts.insert(
            email.to_string(),
            Account {
                identity: identity.clone(),
                password_hash: digest(password),
            },
        );
        state.sessions.insert(digest(&token), identity.clone());
        Ok(Session { token, identity })
    }

    async fn exchange_code(&self, code: &str) -> std::result::Result<Session, CredentialError> {
        let token = fresh_token();
        let mut state = self.state.write().map_err(|_| {
            CredentialError::Unavailable("identity provider lock poisoned".into())
        })?;
        let Some(email) = state.auth_codes.remove(&digest(code)) else {
            return Err(CredentialError::InvalidCode);
        };
        let identity = state
            .accounts
            .get(&email)
            .map(|account| account.identity.clone())
            .ok_or(CredentialError::InvalidCode)?;
        state.sessions.insert(digest(&token), identity.clone());
        Ok(Session { token, identity })
    }
}

fn digest(input: &str) -> String {
    hex::encode(Sha256::digest(input.as_bytes()))
}

fn fresh_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.ends_with('.'),
        None => false,
    }
}
