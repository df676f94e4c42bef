//! Account storage for registration and login.
//!
//! Accounts persist as a JSON file at `{data_dir}/accounts.json`. Password
//! hashes use PBKDF2-HMAC-SHA256 in the format
//! `pbkdf2:iterations:hex_salt:hex_hash`; the hash string never leaves
//! this module in a response body.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tokio::sync::RwLock;

use crate::error::AccountError;
use crate::task::is_valid_email;

const PBKDF2_ITERATIONS: u32 = 100_000;
const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;

/// A registered user account. Never serialized into HTTP responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub email: String,
    #[serde(rename = "nome")]
    pub name: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// In-memory account map with disk persistence.
pub struct AccountStore {
    accounts: RwLock<HashMap<String, Account>>,
    storage_path: PathBuf,
}

impl AccountStore {
    /// Create an account store, loading from disk if the file exists.
    pub async fn new(data_dir: &Path) -> Self {
        let storage_path = data_dir.join("accounts.json");

        let accounts = if storage_path.exists() {
            match Self::load_from_path(&storage_path) {
                Ok(map) => {
                    tracing::info!(
                        "Loaded {} accounts from {}",
                        map.len(),
                        storage_path.display()
                    );
                    map
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to load accounts from {}: {}, starting empty",
                        storage_path.display(),
                        e
                    );
                    HashMap::new()
                }
            }
        } else {
            HashMap::new()
        };

        Self {
            accounts: RwLock::new(accounts),
            storage_path,
        }
    }

    fn load_from_path(path: &Path) -> Result<HashMap<String, Account>, std::io::Error> {
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    async fn save_to_disk(&self) -> Result<(), AccountError> {
        let accounts = self.accounts.read().await;

        if let Some(parent) = self.storage_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AccountError::Upstream(e.to_string()))?;
        }

        let contents = serde_json::to_string_pretty(&*accounts)
            .map_err(|e| AccountError::Upstream(e.to_string()))?;
        std::fs::write(&self.storage_path, contents)
            .map_err(|e| AccountError::Upstream(e.to_string()))?;
        tracing::debug!("Saved accounts to {}", self.storage_path.display());
        Ok(())
    }

    /// Register a new account (`POST /cadastre`).
    pub async fn register(
        &self,
        email: &str,
        name: &str,
        password: &str,
    ) -> Result<Account, AccountError> {
        let email = email.trim();
        if !is_valid_email(email) {
            return Err(AccountError::Validation(format!(
                "invalid email: {}",
                email
            )));
        }
        if name.trim().is_empty() {
            return Err(AccountError::Validation("nome must not be empty".to_string()));
        }
        if password.is_empty() {
            return Err(AccountError::Validation(
                "senha must not be empty".to_string(),
            ));
        }

        let account = Account {
            email: email.to_string(),
            name: name.trim().to_string(),
            password_hash: hash_password(password),
            created_at: Utc::now(),
        };

        {
            let mut accounts = self.accounts.write().await;
            if accounts.contains_key(email) {
                return Err(AccountError::Conflict(email.to_string()));
            }
            accounts.insert(email.to_string(), account.clone());
        }
        self.save_to_disk().await?;
        tracing::info!(email = %account.email, "registered account");
        Ok(account)
    }

    /// Verify login credentials, returning the account on success.
    pub async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Account, AccountError> {
        let accounts = self.accounts.read().await;
        let account = accounts
            .get(email.trim())
            .ok_or(AccountError::InvalidCredentials)?;
        if verify_password(password, &account.password_hash) {
            Ok(account.clone())
        } else {
            Err(AccountError::InvalidCredentials)
        }
    }
}

/// Hash a password as `pbkdf2:iterations:hex_salt:hex_hash`.
fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);

    let mut hash = [0u8; HASH_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, PBKDF2_ITERATIONS, &mut hash);

    format!(
        "pbkdf2:{}:{}:{}",
        PBKDF2_ITERATIONS,
        hex::encode(salt),
        hex::encode(hash)
    )
}

/// Recompute the PBKDF2 hash with the stored salt and compare in constant
/// time.
fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.split(':');
    let (scheme, iterations, salt_hex, hash_hex) = match (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) {
        (Some(s), Some(i), Some(salt), Some(hash)) => (s, i, salt, hash),
        _ => return false,
    };
    if scheme != "pbkdf2" {
        return false;
    }
    let iterations: u32 = match iterations.parse() {
        Ok(i) => i,
        Err(_) => return false,
    };
    let salt = match hex::decode(salt_hex) {
        Ok(s) => s,
        Err(_) => return false,
    };

    let mut computed = [0u8; HASH_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, iterations, &mut computed);
    constant_time_eq(&hex::encode(computed), hash_hex)
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();
    if a_bytes.len() != b_bytes.len() {
        return false;
    }
    let mut diff: u8 = 0;
    for i in 0..a_bytes.len() {
        diff |= a_bytes[i] ^ b_bytes[i];
    }
    diff == 0
}
