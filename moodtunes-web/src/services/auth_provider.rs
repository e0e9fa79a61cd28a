//! Authentication provider
//!
//! Sign-up, sign-in and sign-out behind the [`AuthProvider`] trait. The
//! in-memory provider keeps accounts and sessions for the life of the
//! process; nothing is persisted.

use async_trait::async_trait;
use moodtunes_common::{Error, Identity, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

/// Minimum accepted password length
pub const MIN_PASSWORD_LEN: usize = 6;

/// Opaque session token handed to the browser as a cookie
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SessionToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SessionToken {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

// Tokens are credentials; keep them out of logs
impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(..)")
    }
}

/// Authentication backend
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Register a new account
    ///
    /// Does not sign the user in; the caller asks them to confirm and sign in.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<String>,
    ) -> Result<Identity>;

    /// Verify credentials and open a session
    async fn sign_in(&self, email: &str, password: &str) -> Result<(SessionToken, Identity)>;

    /// Close a session, returning whose it was (`None` if already closed)
    async fn sign_out(&self, token: &SessionToken) -> Option<Identity>;

    /// Identity behind a session token
    async fn current_user(&self, token: &SessionToken) -> Option<Identity>;
}

struct Account {
    identity: Identity,
    salt: String,
    password_hash: String,
}

/// Process-local provider for development and tests
///
/// Not for production credentials: passwords are stored as a single salted
/// SHA-256 digest, with no key stretching, and everything is lost on restart.
pub struct InMemoryAuthProvider {
    /// Keyed by lower-cased e-mail
    accounts: RwLock<HashMap<String, Account>>,
    sessions: RwLock<HashMap<SessionToken, Uuid>>,
}

impl InMemoryAuthProvider {
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub async fn account_count(&self) -> usize {
        self.accounts.read().await.len()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

impl Default for InMemoryAuthProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn generate_salt() -> String {
    let bytes: [u8; 16] = rand::thread_rng().gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// One round of salted SHA-256; fast by construction, dev use only
fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn validate_credentials(email: &str, password: &str) -> Result<()> {
    if !email.contains('@') {
        return Err(Error::InvalidInput(
            "Please enter a valid email address".to_string(),
        ));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::InvalidInput(format!(
            "Password should be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

#[async_trait]
impl AuthProvider for InMemoryAuthProvider {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<String>,
    ) -> Result<Identity> {
        let email = email.trim();
        validate_credentials(email, password)?;

        let key = email.to_lowercase();
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&key) {
            return Err(Error::InvalidInput("User already registered".to_string()));
        }

        let identity = Identity::new(Uuid::new_v4(), email, display_name);
        let salt = generate_salt();
        let password_hash = hash_password(&salt, password);

        accounts.insert(
            key,
            Account {
                identity: identity.clone(),
                salt,
                password_hash,
            },
        );

        info!("Registered account {} ({})", identity.id, identity.email);
        Ok(identity)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<(SessionToken, Identity)> {
        let key = email.trim().to_lowercase();

        let identity = {
            let accounts = self.accounts.read().await;
            match accounts.get(&key) {
                Some(account) if hash_password(&account.salt, password) == account.password_hash => {
                    account.identity.clone()
                }
                _ => {
                    debug!("Rejected sign-in for '{}'", key);
                    return Err(Error::Auth("Invalid login credentials".to_string()));
                }
            }
        };

        let token = SessionToken::generate();
        self.sessions
            .write()
            .await
            .insert(token.clone(), identity.id);

        info!("User {} signed in", identity.id);
        Ok((token, identity))
    }

    async fn sign_out(&self, token: &SessionToken) -> Option<Identity> {
        let user_id = self.sessions.write().await.remove(token)?;
        let accounts = self.accounts.read().await;
        let identity = accounts
            .values()
            .find(|account| account.identity.id == user_id)
            .map(|account| account.identity.clone());

        if let Some(identity) = &identity {
            info!("User {} signed out", identity.id);
        }
        identity
    }

    async fn current_user(&self, token: &SessionToken) -> Option<Identity> {
        let user_id = *self.sessions.read().await.get(token)?;
        self.accounts
            .read()
            .await
            .values()
            .find(|account| account.identity.id == user_id)
            .map(|account| account.identity.clone())
    }
}
