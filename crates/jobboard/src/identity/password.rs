use argon2::Config;
use tracing::warn;
use uuid::Uuid;

use super::domain::PasswordHash;

/// Credential hashing seam used by the identity service.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<PasswordHash, PasswordError>;
    fn verify(&self, password: &str, hash: &PasswordHash) -> bool;
}

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hashing(#[from] argon2::Error),
}

/// Argon2 hasher producing PHC-encoded strings (`$argon2id$v=19$...`).
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    config: Config<'static>,
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self {
            config: Config::default(),
        }
    }
}

impl Argon2Hasher {
    pub fn with_config(config: Config<'static>) -> Self {
        Self { config }
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<PasswordHash, PasswordError> {
        let salt = Uuid::new_v4();
        let encoded = argon2::hash_encoded(password.as_bytes(), salt.as_bytes(), &self.config)?;
        Ok(PasswordHash { encoded })
    }

    fn verify(&self, password: &str, hash: &PasswordHash) -> bool {
        match argon2::verify_encoded(&hash.encoded, password.as_bytes()) {
            Ok(matches) => matches,
            Err(err) => {
                warn!(error = %err, "stored password hash could not be decoded");
                false
            }
        }
    }
}

#[cfg(test)]
pub(crate) fn fast_hasher() -> Argon2Hasher {
    Argon2Hasher::with_config(Config {
        mem_cost: 256,
        time_cost: 1,
        ..Config::default()
    })
}
