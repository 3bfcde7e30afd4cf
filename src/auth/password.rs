use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{self, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
};
use rand::thread_rng;

use crate::error::AppError;

/// Argon2id hashing where the configured work factor is the iteration count.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    fn argon2(&self) -> Result<Argon2<'static>, AppError> {
        let params = Params::new(
            Params::DEFAULT_M_COST,
            self.cost,
            Params::DEFAULT_P_COST,
            None,
        )
        .map_err(|err| AppError::internal_with("Password hashing failed", err))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    pub async fn hash(&self, plain: &str) -> Result<String, AppError> {
        let argon2 = self.argon2()?;
        let plain = plain.to_owned();

        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut thread_rng());
            argon2
                .hash_password(plain.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|err| AppError::internal_with("Password hashing failed", err))
        })
        .await
        .map_err(|err| AppError::internal_with("Password hashing failed", err))?
    }

    /// `Ok(false)` on mismatch; an unparsable stored hash is an internal error.
    pub async fn verify(&self, plain: &str, hash: &str) -> Result<bool, AppError> {
        let plain = plain.to_owned();
        let hash = hash.to_owned();

        tokio::task::spawn_blocking(move || {
            let parsed = PasswordHash::new(&hash)
                .map_err(|err| AppError::internal_with("Stored password hash is invalid", err))?;
            match Argon2::default().verify_password(plain.as_bytes(), &parsed) {
                Ok(()) => Ok(true),
                Err(password_hash::Error::Password) => Ok(false),
                Err(err) => Err(AppError::internal_with("Password verification failed", err)),
            }
        })
        .await
        .map_err(|err| AppError::internal_with("Password verification failed", err))?
    }
}
