use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use axum::{
    extract::{Path as UrlPath, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

/// Public path prefix under which stored images are addressable.
pub const UPLOAD_PREFIX: &str = "/uploads/";

const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

#[async_trait]
pub trait UploadStore: Send + Sync {
    /// Persist `body` under a freshly generated name with the given
    /// (already validated) extension; returns the public reference path.
    async fn save(&self, ext: &str, body: Bytes) -> anyhow::Result<String>;

    /// Read back a stored file by bare filename. `None` if it does not exist.
    async fn read(&self, filename: &str) -> anyhow::Result<Option<Vec<u8>>>;
}

/// Upload store backed by a directory on the local filesystem.
#[derive(Clone)]
pub struct DiskUploads {
    content_dir: PathBuf,
}

impl DiskUploads {
    pub fn new(content_dir: impl Into<PathBuf>) -> Self {
        Self {
            content_dir: content_dir.into(),
        }
    }
}

#[async_trait]
impl UploadStore for DiskUploads {
    async fn save(&self, ext: &str, body: Bytes) -> anyhow::Result<String> {
        let filename = format!("{}.{}", Uuid::new_v4().simple(), ext);
        tokio::fs::create_dir_all(&self.content_dir)
            .await
            .with_context(|| format!("create upload dir {}", self.content_dir.display()))?;
        let path = self.content_dir.join(&filename);
        tokio::fs::write(&path, &body)
            .await
            .with_context(|| format!("write upload {}", path.display()))?;
        Ok(format!("{UPLOAD_PREFIX}{filename}"))
    }

    async fn read(&self, filename: &str) -> anyhow::Result<Option<Vec<u8>>> {
        if !is_safe_filename(filename) {
            return Ok(None);
        }
        match tokio::fs::read(self.content_dir.join(filename)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).context("read upload"),
        }
    }
}

/// A filename is servable only as a single path component inside the
/// content directory.
fn is_safe_filename(filename: &str) -> bool {
    !filename.is_empty()
        && filename != ".."
        && filename != "."
        && !filename.contains('/')
        && !filename.contains('\\')
}

/// Extract the extension of a client-supplied filename if it is in the
/// allowed image set. Case-insensitive; returns the lowercased extension.
pub fn allowed_extension(filename: &str) -> Option<String> {
    let ext = Path::new(filename).extension()?.to_str()?.to_lowercase();
    ALLOWED_IMAGE_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

/// Validate a client-supplied `image_url`. Accepted only as a reference the
/// upload store itself could have produced: `/uploads/<filename>` with a
/// single path component and an allowed extension. Anything else is dropped.
pub fn validate_upload_ref(image_url: &str) -> Option<String> {
    let filename = image_url.strip_prefix(UPLOAD_PREFIX)?;
    if !is_safe_filename(filename) || allowed_extension(filename).is_none() {
        return None;
    }
    Some(image_url.to_string())
}

fn content_type_for(filename: &str) -> &'static str {
    match Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

/// GET /uploads/:filename
pub async fn serve_upload(
    State(state): State<AppState>,
    UrlPath(filename): UrlPath<String>,
) -> Result<Response, ApiError> {
    let bytes = state
        .uploads
        .read(&filename)
        .await?
        .ok_or(ApiError::NotFound("File"))?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, content_type_for(&filename))],
        bytes,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> DiskUploads {
        let dir = std::env::temp_dir().join(format!("tastebook-test-{}", Uuid::new_v4().simple()));
        DiskUploads::new(dir)
    }

    #[test]
    fn extension_allowlist_is_case_insensitive() {
        assert_eq!(allowed_extension("photo.PNG").as_deref(), Some("png"));
        assert_eq!(allowed_extension("pic.JpEg").as_deref(), Some("jpeg"));
        assert_eq!(allowed_extension("anim.gif").as_deref(), Some("gif"));
        assert_eq!(allowed_extension("modern.webp").as_deref(), Some("webp"));
    }

    #[test]
    fn disallowed_or_missing_extensions_are_rejected() {
        assert_eq!(allowed_extension("malware.exe"), None);
        assert_eq!(allowed_extension("noext"), None);
        assert_eq!(allowed_extension("archive.tar.gz"), None);
        assert_eq!(allowed_extension(""), None);
    }

    #[test]
    fn upload_refs_must_stay_inside_the_namespace() {
        assert_eq!(
            validate_upload_ref("/uploads/abc123.png").as_deref(),
            Some("/uploads/abc123.png")
        );
        assert_eq!(validate_upload_ref("https://evil.example/x.png"), None);
        assert_eq!(validate_upload_ref("/uploads/../secrets.png"), None);
        assert_eq!(validate_upload_ref("/uploads/a/b.png"), None);
        assert_eq!(validate_upload_ref("/uploads/script.exe"), None);
        assert_eq!(validate_upload_ref("/uploads/"), None);
        assert_eq!(validate_upload_ref(""), None);
    }

    #[tokio::test]
    async fn save_generates_unique_hex_names() {
        let store = temp_store();
        let a = store.save("png", Bytes::from_static(b"a")).await.unwrap();
        let b = store.save("png", Bytes::from_static(b"b")).await.unwrap();
        assert_ne!(a, b);
        for reference in [&a, &b] {
            let name = reference.strip_prefix(UPLOAD_PREFIX).unwrap();
            let (stem, ext) = name.split_once('.').unwrap();
            assert_eq!(ext, "png");
            assert_eq!(stem.len(), 32);
            assert!(stem.chars().all(|c| c.is_ascii_hexdigit()));
        }
    }

    #[tokio::test]
    async fn saved_bytes_read_back_identical() {
        let store = temp_store();
        let body = Bytes::from_static(b"\x89PNG fake image bytes");
        let reference = store.save("png", body.clone()).await.unwrap();
        let name = reference.strip_prefix(UPLOAD_PREFIX).unwrap();
        let read = store.read(name).await.unwrap().unwrap();
        assert_eq!(read, body.to_vec());
    }

    #[tokio::test]
    async fn read_refuses_traversal_and_misses() {
        let store = temp_store();
        store.save("png", Bytes::from_static(b"x")).await.unwrap();
        assert!(store.read("../etc/passwd").await.unwrap().is_none());
        assert!(store.read("a/b.png").await.unwrap().is_none());
        assert!(store.read("..").await.unwrap().is_none());
        assert!(store.read("").await.unwrap().is_none());
        assert!(store.read("missing.png").await.unwrap().is_none());
    }

    #[test]
    fn content_types_follow_the_extension() {
        assert_eq!(content_type_for("a.png"), "image/png");
        assert_eq!(content_type_for("a.JPG"), "image/jpeg");
        assert_eq!(content_type_for("a.jpeg"), "image/jpeg");
        assert_eq!(content_type_for("a.webp"), "image/webp");
        assert_eq!(content_type_for("a.bin"), "application/octet-stream");
    }

    #[tokio::test]
    async fn serving_an_unknown_upload_is_a_404_envelope() {
        let state = AppState::fake();
        let err = serve_upload(State(state), UrlPath("missing.png".into()))
            .await
            .expect_err("fake store holds no files");

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "File not found");
    }
}
