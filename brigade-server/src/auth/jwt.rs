//! JWT issue and verification (HS256)

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared::models::{Role, User};

use super::Identity;

/// JWT claims
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    pub role: Role,
    /// Absent for superadmins
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restaurant_id: Option<i64>,
    pub name: String,
    /// Expiration (Unix timestamp seconds)
    pub exp: usize,
    /// Issued at (Unix timestamp seconds)
    pub iat: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("token expired")]
    Expired,
    #[error("invalid token: {0}")]
    Invalid(String),
    #[error("token encoding failed: {0}")]
    Encode(String),
}

/// Secret and lifetime for issued tokens
#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiry_hours: i64,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>, expiry_hours: i64) -> Self {
        Self {
            secret: secret.into(),
            expiry_hours,
        }
    }

    /// Issue a token for `user`
    pub fn create_token(&self, user: &User) -> Result<String, JwtError> {
        self.create_token_with_ttl(user, chrono::Duration::hours(self.expiry_hours))
    }

    fn create_token_with_ttl(&self, user: &User, ttl: chrono::Duration) -> Result<String, JwtError> {
        let now = chrono::Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            role: user.role,
            restaurant_id: user.restaurant_id,
            name: user.name.clone(),
            exp: (now + ttl).timestamp().max(0) as usize,
            iat: now.timestamp() as usize,
        };

        jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| JwtError::Encode(e.to_string()))
    }

    /// Verify signature and expiry, returning the caller identity
    pub fn verify(&self, token: &str) -> Result<Identity, JwtError> {
        let data = jsonwebtoken::decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => JwtError::Expired,
            _ => JwtError::Invalid(e.to_string()),
        })?;

        let claims = data.claims;
        let user_id = claims
            .sub
            .parse()
            .map_err(|_| JwtError::Invalid("subject is not a user id".into()))?;
        if claims.role.is_tenant_bound() && claims.restaurant_id.is_none() {
            return Err(JwtError::Invalid("missing restaurant_id".into()));
        }

        Ok(Identity {
            user_id,
            role: claims.role,
            restaurant_id: claims.restaurant_id,
            name: claims.name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn user(role: Role, restaurant_id: Option<i64>) -> User {
        User {
            id: 42,
            restaurant_id,
            role,
            name: "Ana".into(),
            email: "ana@bistro.io".into(),
            phone: None,
            position: None,
            monthly_salary: Decimal::ZERO,
            joined_on: None,
            is_active: true,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn token_round_trip() {
        let jwt = JwtConfig::new("test-secret", 24);
        let token = jwt.create_token(&user(Role::Manager, Some(7))).unwrap();
        let identity = jwt.verify(&token).unwrap();
        assert_eq!(identity.user_id, 42);
        assert_eq!(identity.role, Role::Manager);
        assert_eq!(identity.restaurant_id, Some(7));
        assert_eq!(identity.name, "Ana");
    }

    #[test]
    fn superadmin_has_no_tenant() {
        let jwt = JwtConfig::new("test-secret", 24);
        let token = jwt.create_token(&user(Role::Superadmin, None)).unwrap();
        let identity = jwt.verify(&token).unwrap();
        assert_eq!(identity.restaurant_id, None);
    }

    #[test]
    fn wrong_secret_rejected() {
        let token = JwtConfig::new("a", 24)
            .create_token(&user(Role::Admin, Some(1)))
            .unwrap();
        let err = JwtConfig::new("b", 24).verify(&token).unwrap_err();
        assert!(matches!(err, JwtError::Invalid(_)));
    }

    #[test]
    fn expired_token_rejected() {
        let jwt = JwtConfig::new("test-secret", 24);
        let token = jwt
            .create_token_with_ttl(&user(Role::Employee, Some(1)), chrono::Duration::hours(-2))
            .unwrap();
        assert!(matches!(jwt.verify(&token), Err(JwtError::Expired)));
    }

    #[test]
    fn tenant_role_without_restaurant_rejected() {
        let jwt = JwtConfig::new("test-secret", 24);
        let token = jwt.create_token(&user(Role::Employee, None)).unwrap();
        assert!(matches!(jwt.verify(&token), Err(JwtError::Invalid(_))));
    }

    #[test]
    fn garbage_rejected() {
        let jwt = JwtConfig::new("test-secret", 24);
        assert!(matches!(jwt.verify("not.a.jwt"), Err(JwtError::Invalid(_))));
    }
}
