use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{decode, encode, errors::Error, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub employer_id: i64,
    pub sub: String,
    pub exp: usize,
    pub jti: String,
    pub token_type: TokenType,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub enum TokenType {
    Access,
    Refresh,
    Reset,
}

fn now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before epoch")
        .as_secs() as usize
}

fn mint(claims: &Claims, key: &[u8]) -> Result<String, Error> {
    encode(&Header::default(), claims, &EncodingKey::from_secret(key))
}

pub fn generate_access_token(
    employer_id: i64,
    username: String,
    secret: &str,
    ttl: usize,
) -> Result<String, Error> {
    mint(
        &Claims {
            employer_id,
            sub: username,
            exp: now() + ttl,
            jti: Uuid::new_v4().to_string(),
            token_type: TokenType::Access,
        },
        secret.as_bytes(),
    )
}

pub fn generate_refresh_token(
    employer_id: i64,
    username: String,
    secret: &str,
    ttl: usize,
) -> Result<(String, Claims), Error> {
    let claims = Claims {
        employer_id,
        sub: username,
        exp: now() + ttl,
        jti: Uuid::new_v4().to_string(),
        token_type: TokenType::Refresh,
    };
    let token = mint(&claims, secret.as_bytes())?;
    Ok((token, claims))
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}

// Reset tokens are keyed with the current password hash folded into the
// secret: once the reset lands and the hash changes, the token no longer
// verifies, making it single-use without extra state.
fn reset_key(secret: &str, pwd_hash: &str) -> Vec<u8> {
    [secret.as_bytes(), pwd_hash.as_bytes()].concat()
}

pub fn generate_reset_token(
    employer_id: i64,
    username: String,
    secret: &str,
    pwd_hash: &str,
    ttl: usize,
) -> Result<String, Error> {
    mint(
        &Claims {
            employer_id,
            sub: username,
            exp: now() + ttl,
            jti: Uuid::new_v4().to_string(),
            token_type: TokenType::Reset,
        },
        &reset_key(secret, pwd_hash),
    )
}

pub fn verify_reset_token(token: &str, secret: &str, pwd_hash: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(&reset_key(secret, pwd_hash)),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_token_round_trip() {
        let token = generate_access_token(7, "acme".into(), "secret", 60).unwrap();
        let claims = verify_token(&token, "secret").unwrap();
        assert_eq!(claims.employer_id, 7);
        assert_eq!(claims.sub, "acme");
        assert_eq!(claims.token_type, TokenType::Access);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = generate_access_token(7, "acme".into(), "secret", 60).unwrap();
        assert!(verify_token(&token, "other").is_err());
    }

    #[test]
    fn reset_token_dies_with_the_old_hash() {
        let token = generate_reset_token(7, "acme".into(), "secret", "old-hash", 60).unwrap();
        assert!(verify_reset_token(&token, "secret", "old-hash").is_ok());
        // After the password actually changes, the same token is dead.
        assert!(verify_reset_token(&token, "secret", "new-hash").is_err());
    }
}
