//! JWT-based authentication

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Token issuer and expected `iss` claim
pub const ISSUER: &str = "debate-coach";

/// Fixed bearer token accepted for demos and local testing
pub const DEMO_TOKEN: &str = "demo-session-token";
/// User that [`DEMO_TOKEN`] and unauthenticated optional-auth requests act as
pub const DEMO_USER: &str = "demo-user";

/// Lifetime of tokens issued on register/login
pub const TOKEN_TTL_DAYS: i64 = 7;

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Issuer
    pub iss: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl Claims {
    /// Create new claims for a user
    pub fn for_user(user_id: &str, username: Option<&str>, expires_in: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id.to_string(),
            exp: (now + expires_in).timestamp(),
            iat: now.timestamp(),
            iss: ISSUER.to_string(),
            username: username.map(str::to_string),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

/// The caller a request acts on behalf of
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: String,
    /// False when falling back to the demo user on an optional-auth route
    pub authenticated: bool,
}

impl AuthUser {
    pub fn demo() -> Self {
        Self {
            user_id: DEMO_USER.to_string(),
            authenticated: false,
        }
    }
}

/// JWT authentication handler
#[derive(Clone)]
pub struct JwtAuth {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtAuth {
    /// Create new JWT auth with secret
    pub fn new(secret: &str) -> Self {
        let encoding_key = EncodingKey::from_secret(secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(secret.as_bytes());

        let mut validation = Validation::default();
        validation.set_issuer(&[ISSUER]);
        validation.validate_exp = true;

        Self {
            encoding_key,
            decoding_key,
            validation,
        }
    }

    /// Create from `COACH_JWT_SECRET` (at least 32 characters)
    pub fn from_env() -> Result<Self, ApiError> {
        let secret = std::env::var("COACH_JWT_SECRET").map_err(|_| {
            ApiError::Internal(
                "COACH_JWT_SECRET environment variable is required. \
                 Generate with: openssl rand -base64 32"
                    .to_string(),
            )
        })?;

        if secret.len() < 32 {
            return Err(ApiError::Internal(
                "COACH_JWT_SECRET must be at least 32 characters".to_string(),
            ));
        }

        Ok(Self::new(&secret))
    }

    /// Generate a token for claims
    pub fn encode(&self, claims: &Claims) -> Result<String, ApiError> {
        encode(&Header::default(), claims, &self.encoding_key)
            .map_err(|e| ApiError::Internal(format!("JWT encoding error: {}", e)))
    }

    /// Issue a session token for a registered user
    pub fn issue(&self, user_id: &str, username: &str) -> Result<String, ApiError> {
        self.encode(&Claims::for_user(
            user_id,
            Some(username),
            Duration::days(TOKEN_TTL_DAYS),
        ))
    }

    /// Validate and decode a token
    pub fn decode(&self, token: &str) -> Result<Claims, ApiError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    ApiError::Unauthorized("Token expired".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidToken => {
                    ApiError::Unauthorized("Invalid token".to_string())
                }
                _ => ApiError::Unauthorized(format!("Token validation failed: {}", e)),
            })
    }

    /// Extract token from Authorization header
    pub fn extract_from_header(header: &str) -> Result<&str, ApiError> {
        header.strip_prefix("Bearer ").map(str::trim).ok_or_else(|| {
            ApiError::Unauthorized("Invalid Authorization header format".to_string())
        })
    }

    /// Resolve an Authorization header value to a user
    pub fn authenticate(&self, header: &str) -> Result<AuthUser, ApiError> {
        let token = Self::extract_from_header(header)?;
        let user_id = if token == DEMO_TOKEN {
            DEMO_USER.to_string()
        } else {
            self.decode(token)?.sub
        };
        Ok(AuthUser {
            user_id,
            authenticated: true,
        })
    }
}
