//! Cryptographic logics for delivery codes.

use std::fmt;

use rand::rngs::OsRng;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ServerError};

const OTP_MIN: u32 = 100_000;
const OTP_MAX: u32 = 999_999;
const TRANSACTION_PREFIX: &str = "TXN";

/// Plaintext delivery code. Only ever handed back to the buyer once.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Otp(String);

impl Otp {
    /// Draw a uniform 6-digit code.
    pub fn generate() -> Self {
        let code = rand::thread_rng().gen_range(OTP_MIN..=OTP_MAX);
        Self(code.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Otp {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Debug for Otp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Otp(******)")
    }
}

/// bcrypt digest of an [`Otp`].
///
/// Can only be produced by [`OtpHasher::hash`] or read back from storage, so
/// a persisted digest is never hashed twice.
#[derive(Clone, Default, PartialEq, Eq, sqlx::Type)]
#[sqlx(transparent)]
pub struct HashedOtp(String);

impl HashedOtp {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for HashedOtp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HashedOtp(..)")
    }
}

/// Slow salted hashing of delivery codes.
///
/// bcrypt is CPU-bound, every call runs on the blocking pool.
#[derive(Clone, Debug)]
pub struct OtpHasher {
    cost: u32,
}

impl OtpHasher {
    /// Create a new [`OtpHasher`].
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Hash a code with a fresh salt.
    pub async fn hash(&self, otp: &Otp) -> Result<HashedOtp> {
        let cost = self.cost;
        let plaintext = otp.0.clone();

        let digest = tokio::task::spawn_blocking(move || bcrypt::hash(plaintext, cost))
            .await
            .map_err(|err| ServerError::internal("otp hashing task failed", err))??;

        Ok(HashedOtp(digest))
    }

    /// Constant-time comparison of a candidate code against a digest.
    pub async fn verify(&self, candidate: &str, digest: &HashedOtp) -> Result<bool> {
        let candidate = candidate.to_owned();
        let digest = digest.0.clone();

        let matches = tokio::task::spawn_blocking(move || bcrypt::verify(candidate, &digest))
            .await
            .map_err(|err| ServerError::internal("otp verification task failed", err))??;

        Ok(matches)
    }
}

/// Generate a globally unique transaction identifier.
///
/// Creation time in milliseconds followed by 128 random bits.
pub fn transaction_id() -> String {
    let mut suffix = [0u8; 16];
    OsRng.fill_bytes(&mut suffix);

    format!(
        "{TRANSACTION_PREFIX}{}-{}",
        chrono::Utc::now().timestamp_millis(),
        hex::encode(suffix)
    )
}
