//! Bearer-token authentication for the network transport.
//!
//! Tokens are RS256 JWTs issued by the dashboard; verification checks the
//! signature against a configured public key plus the issuer, audience, and
//! expiry claims. Requests are rejected before any MCP handling runs. When no
//! key material is configured the server keeps serving without authentication
//! and logs the fallback loudly.

use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use marketfiyat_core::AppConfig;

/// Claims expected in a dashboard-issued bearer token.
#[derive(Debug, Deserialize)]
pub struct Claims {
    /// Calling client's identity.
    pub sub: Option<String>,
    pub exp: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("failed to read public key {path}: {source}")]
    ReadKey {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid RS256 public key: {0}")]
    InvalidKey(#[from] jsonwebtoken::errors::Error),
}

/// Verifies RS256 bearer tokens against one public key, issuer, and audience.
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    /// Loads the PEM public key at `path` and fixes the expected claims.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::ReadKey`] if the file cannot be read or
    /// [`AuthError::InvalidKey`] if it is not a valid RSA public key.
    pub fn from_pem_file(path: &Path, issuer: &str, audience: &str) -> Result<Self, AuthError> {
        let pem = std::fs::read(path).map_err(|source| AuthError::ReadKey {
            path: path.display().to_string(),
            source,
        })?;
        let decoding_key = DecodingKey::from_rsa_pem(&pem)?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[issuer]);
        validation.set_audience(&[audience]);

        Ok(Self {
            decoding_key,
            validation,
        })
    }

    /// Decodes and validates one token, returning its claims.
    ///
    /// # Errors
    ///
    /// Returns the underlying `jsonwebtoken` error on a bad signature, wrong
    /// issuer or audience, or an expired token.
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }
}

/// Auth settings shared with the middleware.
#[derive(Clone)]
pub struct AuthState {
    verifier: Option<Arc<JwtVerifier>>,
}

impl AuthState {
    /// Builds auth state from the configured key path, issuer, and audience.
    ///
    /// All three must be present to enable verification; otherwise the server
    /// runs in the documented insecure mode and a warning is logged.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] only when a key file exists but cannot be used.
    pub fn from_config(config: &AppConfig) -> Result<Self, AuthError> {
        let (Some(issuer), Some(audience)) =
            (config.issuer_url.as_deref(), config.audience.as_deref())
        else {
            tracing::warn!(
                "DASHBOARD_ISSUER_URL/DASHBOARD_AUDIENCE not set; serving without authentication"
            );
            return Ok(Self { verifier: None });
        };

        if !config.public_key_path.exists() {
            tracing::warn!(
                path = %config.public_key_path.display(),
                "public key file not found; server running in insecure mode"
            );
            return Ok(Self { verifier: None });
        }

        let verifier = JwtVerifier::from_pem_file(&config.public_key_path, issuer, audience)?;
        tracing::info!("bearer authentication enabled");
        Ok(Self {
            verifier: Some(Arc::new(verifier)),
        })
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.verifier.is_some()
    }
}

#[derive(Debug, Serialize)]
struct AuthErrorBody {
    error: AuthErrorDetail,
}

#[derive(Debug, Serialize)]
struct AuthErrorDetail {
    code: &'static str,
    message: &'static str,
}

/// Middleware enforcing bearer-token verification when enabled.
pub async fn require_bearer_auth(
    State(auth): State<AuthState>,
    req: Request,
    next: Next,
) -> Response {
    let Some(verifier) = auth.verifier.as_ref() else {
        return next.run(req).await;
    };

    match extract_bearer_token(req.headers().get(AUTHORIZATION)) {
        Some(token) => match verifier.verify(token) {
            Ok(claims) => {
                tracing::debug!(
                    client_id = claims.sub.as_deref().unwrap_or("unknown"),
                    expires_at = claims.exp,
                    "token verified"
                );
                next.run(req).await
            }
            Err(e) => {
                tracing::warn!(error = %e, "token verification failed");
                unauthorized()
            }
        },
        None => unauthorized(),
    }
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(AuthErrorBody {
            error: AuthErrorDetail {
                code: "unauthorized",
                message: "missing or invalid bearer token",
            },
        }),
    )
        .into_response()
}

fn extract_bearer_token(value: Option<&HeaderValue>) -> Option<&str> {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|s| !s.trim().is_empty())
}
