//! API constants
//!
//! Route prefixes shared by the router, the OpenAPI annotations and the tests.

/// API base path prefix
pub const API_PREFIX: &str = "/api";

/// Asset upload route, relative to [`API_PREFIX`]
pub const ASSET_UPLOAD_PATH: &str = "/asset/upload";

/// Location the OpenAPI document is served from
pub const OPENAPI_JSON_PATH: &str = "/api/openapi.json";
