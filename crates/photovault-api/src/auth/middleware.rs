use crate::auth::models::JwtClaims;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use photovault_core::{AppError, AuthUser};
use std::sync::Arc;

/// HS256 verification settings for bearer tokens
#[derive(Clone)]
pub struct AuthState {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl AuthState {
    pub fn new(jwt_secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        Self {
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Validate and decode a bearer token
    pub fn validate_token(&self, token: &str) -> Result<AuthUser, AppError> {
        let token_data =
            decode::<JwtClaims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                        AppError::Unauthorized("Token has expired".to_string())
                    }
                    _ => AppError::Unauthorized(format!("Invalid or expired token: {}", e)),
                }
            })?;

        Ok(token_data.claims.into())
    }
}

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Resolve the caller's identity and store it in request extensions.
///
/// Requests without a usable token continue without an identity; routes decide
/// what an anonymous caller may do.
pub async fn auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let identity = match bearer_token(&request) {
        Some(token) => match auth_state.validate_token(token) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::debug!(error = %e, "JWT validation failed");
                None
            }
        },
        None => None,
    };

    if let Some(user) = identity {
        tracing::debug!(user_id = %user.id, public = user.is_public_user, "Caller authenticated");
        request.extensions_mut().insert(user);
    }

    next.run(request).await
}
