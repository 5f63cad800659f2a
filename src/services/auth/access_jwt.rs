//! HS256 access tokens: issue on login/refresh, verify in the access middleware.
//!
//! Verification keeps "expired" apart from every other failure because the
//! two map to different error codes: an expired token is worth refreshing,
//! an invalid one is not.

use std::fmt;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::Rol;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub sub: String,
    pub email: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

/// Claims after verification, promoted to application types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedAccessToken {
    pub user_id: Uuid,
    pub email: String,
    pub rol: Rol,
}

#[derive(Debug)]
pub enum AccessJwtError {
    Expired,
    Invalid(String),
}

impl fmt::Display for AccessJwtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expired => write!(f, "access token expired"),
            Self::Invalid(reason) => write!(f, "invalid access token: {}", reason),
        }
    }
}

impl std::error::Error for AccessJwtError {}

impl From<jsonwebtoken::errors::Error> for AccessJwtError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            _ => Self::Invalid(e.to_string()),
        }
    }
}

impl From<AccessJwtError> for AppError {
    fn from(e: AccessJwtError) -> Self {
        match e {
            AccessJwtError::Expired => AppError::TokenExpired,
            AccessJwtError::Invalid(_) => AppError::TokenInvalid,
        }
    }
}

/// Signs and verifies access tokens with one shared secret.
///
/// Key material is not printable via Debug.
#[derive(Clone)]
pub struct AccessTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_seconds: u64,
}

impl fmt::Debug for AccessTokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessTokenService")
            .field("ttl_seconds", &self.ttl_seconds)
            .field("leeway", &self.validation.leeway)
            .finish()
    }
}

impl AccessTokenService {
    pub fn new(secret: &[u8], ttl_seconds: u64, leeway_seconds: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = leeway_seconds;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl_seconds,
        }
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    pub fn issue(&self, user_id: Uuid, email: &str, rol: Rol) -> Result<String, AppError> {
        let now = chrono::Utc::now().timestamp();
        self.issue_at(user_id, email, rol, now, now + self.ttl_seconds as i64)
    }

    /// Sign with explicit timestamps.
    pub fn issue_at(
        &self,
        user_id: Uuid,
        email: &str,
        rol: Rol,
        iat: i64,
        exp: i64,
    ) -> Result<String, AppError> {
        let claims = AccessTokenClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            role: rol.as_str().to_string(),
            iat,
            exp,
        };

        let mut header = Header::new(Algorithm::HS256);
        header.typ = Some("JWT".to_string());
        jsonwebtoken::encode(&header, &claims, &self.encoding_key).map_err(|e| {
            error!(error = %e, "failed to sign JWT");
            AppError::Internal
        })
    }

    pub fn verify(&self, token: &str) -> Result<VerifiedAccessToken, AccessJwtError> {
        let data =
            jsonwebtoken::decode::<AccessTokenClaims>(token, &self.decoding_key, &self.validation)?;
        let claims = data.claims;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AccessJwtError::Invalid("sub is not a UUID".to_string()))?;
        let rol = claims
            .role
            .parse::<Rol>()
            .map_err(|e| AccessJwtError::Invalid(e.to_string()))?;
        if claims.email.trim().is_empty() {
            return Err(AccessJwtError::Invalid("empty email".to_string()));
        }

        Ok(VerifiedAccessToken {
            user_id,
            email: claims.email,
            rol,
        })
    }
}
