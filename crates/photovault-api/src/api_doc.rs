//! OpenAPI documentation, served as JSON and through RapiDoc.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error;
use crate::handlers;
use photovault_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Photovault API",
        version = "0.1.0",
        description = "Streaming upload of photo and video originals. Files are written straight to disk and checksummed (SHA-1) in the same pass."
    ),
    paths(
        handlers::asset_upload::upload_asset,
        handlers::health::health_check,
    ),
    components(schemas(
        handlers::asset_upload::AssetUploadResponse,
        handlers::health::HealthResponse,
        models::StoredFile,
        models::UploadFieldRole,
        error::ErrorResponse,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "assets", description = "Asset upload"),
        (name = "health", description = "Health checks")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
