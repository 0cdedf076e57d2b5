use std::collections::BTreeMap;
use std::io;
use std::sync::Arc;

use axum::{
    extract::{multipart::Field, Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use futures::TryStreamExt;
use photovault_core::validation::extname;
use photovault_core::{AppError, AuthUser, StoredFile, UploadFieldRole};
use photovault_storage::{UploadRequest, UploadSink};
use serde::Serialize;
use tokio_util::io::StreamReader;
use utoipa::ToSchema;

use crate::auth::models::MaybeAuthUser;
use crate::error::{multipart_error, ErrorResponse, HttpAppError};
use crate::state::AppState;

const DEVICE_ID_FIELD: &str = "deviceId";
const FILE_EXTENSION_FIELD: &str = "fileExtension";
const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Files stored for one upload request
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssetUploadResponse {
    pub asset: StoredFile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live_photo: Option<StoredFile>,
    pub device_id: String,
    /// Text fields other than `deviceId` and `fileExtension`, passed through as sent
    pub metadata: BTreeMap<String, String>,
}

/// Text fields seen so far in the form
#[derive(Debug, Default)]
struct UploadForm {
    device_id: Option<String>,
    file_extension: Option<String>,
    metadata: BTreeMap<String, String>,
}

/// Upload an asset handler
///
/// Streams `assetData` (and the optional `livePhotoData`) straight to disk,
/// hashing each file on the way. Text fields must come before the file fields
/// they apply to.
///
/// # Errors
/// - `AppError::Unauthorized` - No identity, or a shared link without upload permission
/// - `AppError::UnsupportedMediaType` - File type not in the allow-list
/// - `AppError::BadRequest` - Missing `assetData`, duplicate file field, or malformed form
/// - `AppError::Storage` - Disk failure or interrupted stream; nothing is kept
#[utoipa::path(
    post,
    path = "/api/asset/upload",
    tag = "assets",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Asset stored", body = AssetUploadResponse),
        (status = 400, description = "Invalid input or unsupported file type", body = ErrorResponse),
        (status = 401, description = "Not allowed to upload", body = ErrorResponse),
        (status = 413, description = "Request body too large", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state, identity, multipart),
    fields(
        user_id = identity.identity().map(|u| u.id.as_str()).unwrap_or("anonymous"),
        operation = "upload_asset"
    )
)]
pub async fn upload_asset(
    State(state): State<Arc<AppState>>,
    identity: MaybeAuthUser,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let uploads = state.uploads.as_ref();
    let mut form = UploadForm::default();
    let mut stored: Vec<StoredFile> = Vec::new();

    let received = receive_fields(
        uploads,
        identity.identity(),
        multipart,
        &mut form,
        &mut stored,
    )
    .await;
    if let Err(e) = received {
        discard_stored(uploads, &stored).await;
        return Err(e.into());
    }

    let mut asset = None;
    let mut live_photo = None;
    for file in stored {
        match file.field_role {
            UploadFieldRole::Asset => asset = Some(file),
            UploadFieldRole::LivePhoto => live_photo = Some(file),
        }
    }

    let Some(asset) = asset else {
        return Err(AppError::Internal("Upload finished without an asset".to_string()).into());
    };

    let response = AssetUploadResponse {
        asset,
        live_photo,
        device_id: form.device_id.unwrap_or_default(),
        metadata: form.metadata,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// Consume the form, storing each file field as it arrives.
///
/// Every successfully stored file is pushed to `stored` so the caller can
/// remove it if a later field fails.
async fn receive_fields(
    uploads: &UploadSink,
    identity: Option<&AuthUser>,
    mut multipart: Multipart,
    form: &mut UploadForm,
    stored: &mut Vec<StoredFile>,
) -> Result<(), AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        match UploadFieldRole::from_field_name(&name) {
            Some(role) => {
                if stored.iter().any(|f| f.field_role == role) {
                    return Err(AppError::BadRequest(format!(
                        "Duplicate file field {}",
                        role.field_name()
                    )));
                }
                let file = store_field(uploads, identity, role, form, field).await?;
                stored.push(file);
            }
            None => {
                let value = field.text().await.map_err(multipart_error)?;
                match name.as_str() {
                    DEVICE_ID_FIELD => form.device_id = Some(value),
                    FILE_EXTENSION_FIELD => form.file_extension = Some(value),
                    _ => {
                        form.metadata.insert(name, value);
                    }
                }
            }
        }
    }

    if !stored.iter().any(|f| f.field_role == UploadFieldRole::Asset) {
        return Err(AppError::BadRequest(format!(
            "Missing {}",
            UploadFieldRole::ASSET_FIELD
        )));
    }

    Ok(())
}

async fn store_field(
    uploads: &UploadSink,
    identity: Option<&AuthUser>,
    role: UploadFieldRole,
    form: &UploadForm,
    field: Field<'_>,
) -> Result<StoredFile, AppError> {
    let original_name = field.file_name().unwrap_or_default().to_string();
    let mime_type = field
        .content_type()
        .unwrap_or(DEFAULT_MIME_TYPE)
        .to_string();
    let file_extension = form
        .file_extension
        .clone()
        .unwrap_or_else(|| extname(&original_name).to_string());

    let reader = StreamReader::new(field.map_err(io::Error::other));
    tokio::pin!(reader);

    let request = UploadRequest {
        original_name,
        mime_type,
        field_role: role,
        file_extension,
        device_id: form.device_id.clone().unwrap_or_default(),
        reader,
    };

    uploads.handle_file(identity, request).await
}

async fn discard_stored(uploads: &UploadSink, stored: &[StoredFile]) {
    for file in stored {
        if let Err(e) = uploads.remove_file(file).await {
            tracing::warn!(
                path = %file.path.display(),
                error = %e,
                "Failed to remove file from an aborted upload"
            );
        }
    }
}
