use std::path::{Path, PathBuf};
use std::sync::Mutex;

use argon2::{
    password_hash::{PasswordHasher, SaltString},
    Algorithm, Argon2, Params, PasswordHash, PasswordVerifier, Version,
};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::HashCost;
use crate::error::{Error, Result};
use crate::fsio::write_atomic;

/// A registered account. `password_hash` is a PHC string carrying the
/// algorithm, cost parameters and salt alongside the digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: String,
    pub password_hash: String,
}

/// File-backed list of user records, stored as a JSON array.
///
/// Reads always go to disk so external edits of the file are picked up.
/// Writers in this process are serialised, which makes `create` an atomic
/// check-and-append.
pub struct CredentialStore {
    path: PathBuf,
    params: Params,
    write_lock: Mutex<()>,
}

impl CredentialStore {
    pub fn new(path: PathBuf, cost: HashCost) -> Result<Self> {
        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
            .map_err(|e| Error::store_unavailable(format!("invalid hash cost: {}", e)))?;
        Ok(Self {
            path,
            params,
            write_lock: Mutex::new(()),
        })
    }

    /// Open the store at `path`, creating an empty one if the file is missing.
    pub fn init(path: PathBuf, cost: HashCost) -> Result<Self> {
        let store = Self::new(path, cost)?;
        if !store.path.exists() {
            info!(path = %store.path.display(), "Creating empty credential store");
            store.save(&[])?;
        }
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record from disk.
    pub fn load(&self) -> Result<Vec<UserRecord>> {
        let contents = std::fs::read_to_string(&self.path).map_err(|e| {
            Error::store_unavailable(format!("{}: {}", self.path.display(), e))
        })?;
        serde_json::from_str(&contents)
            .map_err(|e| Error::store_unavailable(format!("{}: {}", self.path.display(), e)))
    }

    /// Replace the whole file with `records`.
    pub fn save(&self, records: &[UserRecord]) -> Result<()> {
        let contents = serde_json::to_vec_pretty(records).map_err(Error::store_unavailable)?;
        write_atomic(&self.path, &contents).map_err(|e| {
            Error::store_unavailable(format!("{}: {}", self.path.display(), e))
        })
    }

    pub fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>> {
        Ok(self
            .load()?
            .into_iter()
            .find(|record| record.username == username))
    }

    pub fn exists(&self, username: &str) -> Result<bool> {
        Ok(self.find_by_username(username)?.is_some())
    }

    /// Number of stored records
    pub fn len(&self) -> Result<usize> {
        Ok(self.load()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Hash `password` and append a new record for `username`.
    ///
    /// Fails with `DuplicateUser` if the name is taken. The existence check
    /// and the write happen under the writer lock.
    pub fn create(&self, username: &str, password: &str) -> Result<UserRecord> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

        let mut records = self.load()?;
        if records.iter().any(|r| r.username == username) {
            warn!(user = %username, "Refusing to create duplicate user");
            return Err(Error::DuplicateUser(username.to_string()));
        }

        let record = UserRecord {
            username: username.to_string(),
            password_hash: self.hash_password(password)?,
        };
        records.push(record.clone());
        self.save(&records)?;

        info!(user = %username, "Created user");
        Ok(record)
    }

    /// Check `password` against the stored hash for `username`.
    ///
    /// Unknown users and unparseable hashes verify as false. The digest
    /// comparison inside Argon2 is constant-time.
    pub fn verify(&self, username: &str, password: &str) -> Result<bool> {
        let Some(record) = self.find_by_username(username)? else {
            debug!(user = %username, "No such user");
            return Ok(false);
        };

        let parsed = match PasswordHash::new(&record.password_hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(user = %username, error = %e, "Stored password hash is malformed");
                return Ok(false);
            }
        };

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    fn hash_password(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone());
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| Error::store_unavailable(format!("password hashing failed: {}", e)))?;
        Ok(hash.to_string())
    }
}
