//! Manage json web tokens issued by the campus identity service.

use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, ServerError};

pub const DEFAULT_AUDIENCE: &str = "campus-market";
const EXPIRATION_TIME: u64 = 60 * 15; // 15 minutes.

/// Pieces of information asserted on a JWT.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Claims {
    /// Recipients that the JWT is intended for.
    pub aud: String,
    /// Expiration time, in seconds since epoch.
    pub exp: u64,
    /// Identifies the time at which the JWT was issued.
    pub iat: u64,
    /// Identifies the organization that issued the JWT.
    pub iss: String,
    /// User ID.
    pub sub: String,
}

impl Claims {
    /// Subject as a user id.
    pub fn user_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub).map_err(|_| ServerError::Unauthorized)
    }
}

/// Manage JWT tokens signed with a shared secret.
#[derive(Clone)]
pub struct TokenManager {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    name: String,
    audience: String,
}

impl TokenManager {
    /// Create a new [`TokenManager`] instance.
    pub fn new(name: &str, secret: &[u8]) -> Self {
        Self {
            algorithm: Algorithm::HS256,
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            name: name.to_owned(),
            audience: DEFAULT_AUDIENCE.to_owned(),
        }
    }

    /// Set `audience` field on JWT.
    pub fn audience(&mut self, audience: &str) {
        self.audience = audience.to_owned();
    }

    /// Create a new [`jsonwebtoken`].
    pub fn create(&self, user_id: Uuid) -> Result<String> {
        let time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|err| ServerError::internal("system clock before epoch", err))?
            .as_secs();
        let claims = Claims {
            aud: self.audience.clone(),
            exp: time + EXPIRATION_TIME,
            iat: time,
            iss: self.name.clone(),
            sub: user_id.to_string(),
        };

        Ok(encode(&Header::new(self.algorithm), &claims, &self.encoding_key)?)
    }

    /// Decode and check a token.
    pub fn decode(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(self.algorithm);
        validation.set_audience(&[&self.audience]);
        validation.set_issuer(&[&self.name]);

        Ok(decode::<Claims>(token, &self.decoding_key, &validation)?.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_decode() {
        let manager = TokenManager::new("https://market.campus.test", b"secret");
        let id = Uuid::new_v4();

        let token = manager.create(id).unwrap();
        let claims = manager.decode(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), id);
        assert_eq!(claims.aud, DEFAULT_AUDIENCE);
    }

    #[test]
    fn test_rejects_foreign_tokens() {
        let manager = TokenManager::new("https://market.campus.test", b"secret");
        let token = TokenManager::new("https://market.campus.test", b"other")
            .create(Uuid::new_v4())
            .unwrap();
        assert!(manager.decode(&token).is_err());

        let mut other_audience = TokenManager::new("https://market.campus.test", b"secret");
        other_audience.audience("somewhere-else");
        let token = other_audience.create(Uuid::new_v4()).unwrap();
        assert!(manager.decode(&token).is_err());

        assert!(manager.decode("not.a.token").is_err());
    }
}
