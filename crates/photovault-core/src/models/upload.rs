use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;
use utoipa::ToSchema;

/// Role of a multipart file field in an asset upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum UploadFieldRole {
    /// The asset itself (photo or video)
    Asset,
    /// Motion clip paired with a still photo
    LivePhoto,
}

impl UploadFieldRole {
    pub const ASSET_FIELD: &'static str = "assetData";
    pub const LIVE_PHOTO_FIELD: &'static str = "livePhotoData";

    /// Map a multipart field name to its role; `None` for non-file fields.
    pub fn from_field_name(name: &str) -> Option<Self> {
        match name {
            Self::ASSET_FIELD => Some(UploadFieldRole::Asset),
            Self::LIVE_PHOTO_FIELD => Some(UploadFieldRole::LivePhoto),
            _ => None,
        }
    }

    pub fn field_name(&self) -> &'static str {
        match self {
            UploadFieldRole::Asset => Self::ASSET_FIELD,
            UploadFieldRole::LivePhoto => Self::LIVE_PHOTO_FIELD,
        }
    }
}

/// SHA-1 digest of a stored file's bytes
///
/// Serialized as 40 lowercase hex characters.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Checksum([u8; Checksum::LEN]);

impl Checksum {
    pub const LEN: usize = 20;

    pub fn from_bytes(bytes: [u8; Self::LEN]) -> Self {
        Checksum(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let mut bytes = [0u8; Self::LEN];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Checksum(bytes))
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Checksum({})", self.to_hex())
    }
}

impl Serialize for Checksum {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Checksum {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Checksum::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Descriptor of a file persisted by the upload sink
///
/// Only produced once the bytes are on disk and the digest is final.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    /// Location of the stored original
    #[schema(value_type = String)]
    pub path: PathBuf,
    /// Generated name of the stored file
    pub file_name: String,
    /// Client-supplied file name, after encoding repair
    pub original_name: String,
    pub field_role: UploadFieldRole,
    pub mime_type: String,
    /// Bytes written
    pub size: u64,
    /// SHA-1 of the stored bytes, hex encoded
    #[schema(value_type = String, example = "aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d")]
    pub checksum: Checksum,
}
