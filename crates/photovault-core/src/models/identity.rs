use serde::{Deserialize, Serialize};

/// Authenticated caller, as resolved by the identity layer before an upload runs.
///
/// `is_public_user` marks callers that arrived through a shared link rather than
/// a user session; such callers may only upload when the link sets
/// `is_allow_upload`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub is_public_user: bool,
    #[serde(default)]
    pub is_allow_upload: bool,
}
