use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use photovault_core::AuthUser;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String, // user id
    /// Caller came in through a shared link rather than as the account owner
    #[serde(default)]
    pub is_public_user: bool,
    /// Whether a shared-link caller may upload
    #[serde(default)]
    pub is_allow_upload: bool,
    pub exp: i64, // expiration timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

impl From<JwtClaims> for AuthUser {
    fn from(claims: JwtClaims) -> Self {
        AuthUser {
            id: claims.sub,
            is_public_user: claims.is_public_user,
            is_allow_upload: claims.is_allow_upload,
        }
    }
}

/// Identity resolved by the auth middleware, if any.
///
/// Extracting never fails: whether an absent identity may proceed is decided by
/// the upload gate, not here. Implemented on request parts so it can be used
/// alongside `Multipart`.
#[derive(Debug, Clone, Default)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl MaybeAuthUser {
    pub fn identity(&self) -> Option<&AuthUser> {
        self.0.as_ref()
    }
}

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuthUser(parts.extensions.get::<AuthUser>().cloned()))
    }
}
