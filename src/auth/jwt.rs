use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, decode, Header, Validation, EncodingKey, DecodingKey, Algorithm};
use serde::{Serialize, Deserialize};
use uuid::Uuid;
use crate::error::AppError;

/// Token claims. `sid` points at the `sessions` row that must still be live for the token to be accepted.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub sid: Uuid,
    pub role: String,
    pub exp: usize,
    pub iat: usize,
}

pub fn sign_token(
    user_id: i64,
    session_id: Uuid,
    role: &str,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    secret: &str,
) -> Result<String, AppError> {
    let claims = Claims {
        sub: user_id,
        sid: session_id,
        role: role.to_string(),
        iat: issued_at.timestamp() as usize,
        exp: expires_at.timestamp() as usize,
    };
    encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| AppError::internal(format!("Token signing failed: {e}")))
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256)
    )
    .map(|d| d.claims)
    .map_err(|_| AppError::unauthorized("invalid or expired token"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn signed_token_round_trips_claims() {
        let sid = Uuid::new_v4();
        let now = Utc::now();
        let token = sign_token(42, sid, "admin", now, now + Duration::hours(1), "s3cret").unwrap();

        let claims = verify_token(&token, "s3cret").unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.sid, sid);
        assert_eq!(claims.role, "admin");
    }

    #[test]
    fn wrong_secret_is_unauthorized() {
        let now = Utc::now();
        let token = sign_token(1, Uuid::new_v4(), "staff", now, now + Duration::hours(1), "a").unwrap();
        assert!(matches!(verify_token(&token, "b"), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn expired_token_is_unauthorized() {
        let issued = Utc::now() - Duration::hours(3);
        let token = sign_token(1, Uuid::new_v4(), "staff", issued, issued + Duration::hours(1), "k").unwrap();
        assert!(matches!(verify_token(&token, "k"), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn garbage_is_unauthorized() {
        assert!(matches!(verify_token("not-a-token", "k"), Err(AppError::Unauthorized(_))));
    }
}
