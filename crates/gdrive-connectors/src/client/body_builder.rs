//! `multipart/related` bodies for Drive metadata + media uploads

use crate::error::ClientResult;
use crate::model::{FileMetadata, Media};

/// Built request body ready for reqwest
#[derive(Debug)]
pub struct RelatedBody {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

pub struct BodyBuilder;

impl BodyBuilder {
    /// Build a two part body: JSON metadata first, then the media
    pub fn multipart_related(metadata: &FileMetadata, media: &Media) -> ClientResult<RelatedBody> {
        Self::multipart_related_with_boundary(metadata, media, &Self::boundary())
    }

    fn boundary() -> String {
        format!("gdrive-{}", uuid::Uuid::new_v4().simple())
    }

    pub(crate) fn multipart_related_with_boundary(
        metadata: &FileMetadata,
        media: &Media,
        boundary: &str,
    ) -> ClientResult<RelatedBody> {
        let metadata_json = serde_json::to_vec(metadata)?;

        let mut bytes = Vec::with_capacity(metadata_json.len() + media.bytes.len() + 256);
        bytes.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        bytes.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
        bytes.extend_from_slice(&metadata_json);
        bytes.extend_from_slice(format!("\r\n--{}\r\n", boundary).as_bytes());
        bytes.extend_from_slice(format!("Content-Type: {}\r\n\r\n", media.content_type).as_bytes());
        bytes.extend_from_slice(&media.bytes);
        bytes.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

        Ok(RelatedBody {
            content_type: format!("multipart/related; boundary={}", boundary),
            bytes,
        })
    }
}
