use std::path::Path;

use axum::{
    extract::{Path as UrlPath, State},
    http::header,
    response::{IntoResponse, Response},
};
use tracing::{error, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// 5 MiB cap on item photos
pub const MAX_IMAGE_SIZE: usize = 5 * 1024 * 1024;

/// Stored references are relative to the public prefix: `uploads/<file>`.
pub const UPLOAD_REF_PREFIX: &str = "uploads/";

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Accept only a single plain file name: ASCII alphanumerics, `-`, `_` and
/// `.`, not starting with a dot. Anything that could leave the upload
/// directory is rejected.
pub fn sanitize_filename(name: &str) -> Option<&str> {
    let plain = !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    plain.then_some(name)
}

fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

fn content_type_for(name: &str) -> &'static str {
    match extension_of(name).as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

/// GET /static/uploads/{filename}
pub async fn serve_upload(
    State(state): State<AppState>,
    UrlPath(filename): UrlPath<String>,
) -> Result<Response, ApiError> {
    let Some(name) = sanitize_filename(&filename) else {
        warn!("Rejected upload path {:?}", filename);
        return Err(ApiError::BadRequest("invalid file name".to_string()));
    };

    let path = state.config.upload_dir.join(name);
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(ApiError::NotFound),
        Err(e) => {
            error!("Failed to read upload {}: {}", path.display(), e);
            return Err(ApiError::Internal(e.to_string()));
        }
    };

    Ok(([(header::CONTENT_TYPE, content_type_for(name))], bytes).into_response())
}

/// Write an item photo under a fresh name and return its stored reference.
pub async fn store_image(
    upload_dir: &Path,
    original_name: Option<&str>,
    bytes: &[u8],
) -> Result<String, ApiError> {
    if bytes.len() > MAX_IMAGE_SIZE {
        warn!("Rejected {} byte image (max {})", bytes.len(), MAX_IMAGE_SIZE);
        return Err(ApiError::PayloadTooLarge { max: MAX_IMAGE_SIZE });
    }

    let ext = original_name
        .and_then(extension_of)
        .filter(|e| IMAGE_EXTENSIONS.contains(&e.as_str()))
        .ok_or_else(|| ApiError::BadRequest("image must be jpg, png, gif or webp".to_string()))?;

    tokio::fs::create_dir_all(upload_dir).await.map_err(|e| {
        error!("Failed to create upload directory {}: {}", upload_dir.display(), e);
        ApiError::Internal(e.to_string())
    })?;

    let file_name = format!("{}.{}", Uuid::new_v4(), ext);
    let path = upload_dir.join(&file_name);
    tokio::fs::write(&path, bytes).await.map_err(|e| {
        error!("Failed to write upload {}: {}", path.display(), e);
        ApiError::Internal(e.to_string())
    })?;

    Ok(format!("{UPLOAD_REF_PREFIX}{file_name}"))
}

/// Best-effort cleanup when the row for a stored image could not be written.
pub async fn discard_image(upload_dir: &Path, stored_ref: &str) {
    if let Some(name) = stored_ref.strip_prefix(UPLOAD_REF_PREFIX).and_then(sanitize_filename) {
        let path = upload_dir.join(name);
        if let Err(e) = tokio::fs::remove_file(&path).await {
            warn!("Failed to remove orphaned upload {}: {}", path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_names_pass() {
        assert_eq!(sanitize_filename("photo.jpg"), Some("photo.jpg"));
        assert_eq!(
            sanitize_filename("0b6f7c1e-2d3a-4a43-9a53-6f1f0f1b2c3d.png"),
            Some("0b6f7c1e-2d3a-4a43-9a53-6f1f0f1b2c3d.png")
        );
    }

    #[test]
    fn traversal_and_hidden_names_fail() {
        for bad in ["", "..", "../etc/passwd", "a/b.jpg", "a\\b.jpg", ".env", "x\0.jpg", "~root", "a b.jpg"] {
            assert_eq!(sanitize_filename(bad), None, "{bad:?} should be rejected");
        }
    }

    #[test]
    fn content_type_from_extension() {
        assert_eq!(content_type_for("a.JPG"), "image/jpeg");
        assert_eq!(content_type_for("a.webp"), "image/webp");
        assert_eq!(content_type_for("a"), "application/octet-stream");
    }

    #[tokio::test]
    async fn stores_under_fresh_name() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = dir.path().join("uploads");

        let stored = store_image(&uploads, Some("Holiday.JPEG"), b"fake jpeg").await.unwrap();
        assert!(stored.starts_with("uploads/"));
        assert!(stored.ends_with(".jpeg"));

        let name = stored.strip_prefix(UPLOAD_REF_PREFIX).unwrap();
        assert_eq!(std::fs::read(uploads.join(name)).unwrap(), b"fake jpeg");

        discard_image(&uploads, &stored).await;
        assert!(!uploads.join(name).exists());
    }

    #[tokio::test]
    async fn rejects_unknown_types_and_oversize() {
        let dir = tempfile::tempdir().unwrap();

        let err = store_image(dir.path(), Some("script.sh"), b"#!/bin/sh").await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));

        let err = store_image(dir.path(), None, b"x").await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));

        let big = vec![0u8; MAX_IMAGE_SIZE + 1];
        let err = store_image(dir.path(), Some("big.png"), &big).await.unwrap_err();
        assert!(matches!(err, ApiError::PayloadTooLarge { .. }));
    }
}
