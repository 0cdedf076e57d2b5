use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use photovault_api::auth::models::JwtClaims;
use std::time::{SystemTime, UNIX_EPOCH};

/// Test JWT secret (must match create_test_config).
pub const TEST_JWT_SECRET: &str = "test-jwt-secret-at-least-32-characters-long";

fn sign(claims: &JwtClaims, secret: &str) -> String {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("Failed to sign test token")
}

fn claims(user_id: &str, is_public_user: bool, is_allow_upload: bool) -> JwtClaims {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch")
        .as_secs() as i64;
    JwtClaims {
        sub: user_id.to_string(),
        is_public_user,
        is_allow_upload,
        exp: now + 3600,
        iat: Some(now),
    }
}

/// Token for the account owner `user_id`.
pub fn owner_token(user_id: &str) -> String {
    sign(&claims(user_id, false, false), TEST_JWT_SECRET)
}

/// Token for a shared-link caller acting on behalf of `user_id`.
pub fn shared_link_token(user_id: &str, allow_upload: bool) -> String {
    sign(&claims(user_id, true, allow_upload), TEST_JWT_SECRET)
}

/// Correctly shaped token signed with the wrong key.
pub fn forged_token(user_id: &str) -> String {
    sign(
        &claims(user_id, false, false),
        "some-other-secret-at-least-32-characters",
    )
}
