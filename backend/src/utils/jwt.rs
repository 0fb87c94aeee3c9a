use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use marketplace_shared::UserRole;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use crate::error::AppError;


#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,    // User ID
    pub email: String,
    pub role: UserRole,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,    // Token ID, used for revocation
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.sub).map_err(|_| AppError::Authentication("Invalid user ID in token".to_string()))
    }
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_token_ttl: Duration,
    /// Revoked token ids mapped to their `exp`; dropped once the token would fail validation anyway.
    revoked_tokens: Arc<RwLock<HashMap<String, i64>>>,
}

impl JwtService {
    pub fn new(secret: &str, access_token_ttl_minutes: i64) -> Result<Self, AppError> {
        if secret.len() < 32 {
            return Err(AppError::Internal("JWT secret must be at least 32 characters long".to_string()));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation.validate_exp = true;
        validation.leeway = 30;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            access_token_ttl: Duration::minutes(access_token_ttl_minutes),
            revoked_tokens: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    /// Lifetime of issued access tokens, in seconds.
    pub fn expires_in(&self) -> i64 {
        self.access_token_ttl.num_seconds()
    }

    pub fn generate_access_token(&self, user_id: Uuid, email: &str, role: UserRole) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            role,
            exp: (now + self.access_token_ttl).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to encode JWT: {}", e)))
    }

    /// Validate and decode a token
    pub fn validate_token(&self, token: &str) -> Result<Claims, AppError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                AppError::Authentication("Token has expired".to_string())
            }
            jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                AppError::Authentication("Invalid token signature".to_string())
            }
            _ => AppError::Authentication("Invalid token".to_string()),
        })?;

        if self.is_token_revoked(&token_data.claims.jti) {
            return Err(AppError::Authentication("Token has been revoked".to_string()));
        }

        Ok(token_data.claims)
    }

    pub fn revoke_token(&self, jti: &str, exp: i64) -> Result<(), AppError> {
        let mut revoked_tokens = self
            .revoked_tokens
            .write()
            .map_err(|_| AppError::Internal("Failed to acquire write lock".to_string()))?;
        let cutoff = Utc::now().timestamp() - self.validation.leeway as i64;
        revoked_tokens.retain(|_, expires_at| *expires_at >= cutoff);
        if exp >= cutoff {
            revoked_tokens.insert(jti.to_string(), exp);
        }
        Ok(())
    }

    pub fn is_token_revoked(&self, jti: &str) -> bool {
        self.revoked_tokens
            .read()
            .map(|tokens| tokens.contains_key(jti))
            .unwrap_or(false)
    }

    /// Number of revocations still held.
    pub fn revoked_count(&self) -> usize {
        self.revoked_tokens.read().map(|tokens| tokens.len()).unwrap_or(0)
    }
}
