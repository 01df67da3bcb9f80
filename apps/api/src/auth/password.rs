//! Password hashing with Argon2id, stored in PHC string format.

use std::sync::{Arc, OnceLock};

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;

const DUMMY_PASSWORD: &str = "dummy-password-for-unknown-accounts";

/// Hashes and verifies account passwords.
///
/// The digest embeds its own salt and work parameters, so verification works
/// against digests produced under older parameters too.
#[derive(Clone)]
pub struct PasswordService {
    argon2: Argon2<'static>,
    // Digest under the service's own params, built on the first miss.
    dummy_digest: Arc<OnceLock<String>>,
}

impl Default for PasswordService {
    fn default() -> Self {
        Self::with_params(Params::default())
    }
}

impl PasswordService {
    pub fn with_params(params: Params) -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            dummy_digest: Arc::new(OnceLock::new()),
        }
    }

    /// Hashes `plain` under a freshly generated random salt.
    pub fn hash(&self, plain: &str) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("failed to hash password: {e}"))?
            .to_string();
        Ok(hash)
    }

    /// Returns false for a wrong password and for a digest that does not parse.
    pub fn verify(&self, plain: &str, digest: &str) -> bool {
        let parsed = match PasswordHash::new(digest) {
            Ok(h) => h,
            Err(_) => return false,
        };
        self.argon2
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok()
    }

    /// Spends one verification on a throwaway digest, so a login for an
    /// unknown account costs the same as one with a wrong password.
    pub fn verify_missing(&self, plain: &str) {
        let digest = self
            .dummy_digest
            .get_or_init(|| self.hash(DUMMY_PASSWORD).unwrap_or_default());
        let _ = self.verify(plain, digest);
    }

    #[cfg(test)]
    pub(crate) fn has_dummy_digest(&self) -> bool {
        self.dummy_digest.get().is_some()
    }
}

#[cfg(test)]
pub(crate) fn fast_password_service() -> PasswordService {
    // Minimum work factors keep unit tests quick.
    PasswordService::with_params(Params::new(Params::MIN_M_COST, 1, 1, None).unwrap())
}
