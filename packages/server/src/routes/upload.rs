//! Image upload and the media library listing.

use crate::state::AppState;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{error, info, warn};

pub const UPLOADS_URL: &str = "/uploads";
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "webp", "svg", "gif"];

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UploadResponse {
    fn ok(image_url: String) -> Self {
        Self {
            success: true,
            image_url: Some(image_url),
            error: None,
        }
    }

    fn failed(error: &str) -> Self {
        Self {
            success: false,
            image_url: None,
            error: Some(error.to_string()),
        }
    }
}

/// Lowercase, whitespace to `-`, and nothing that could leave the uploads
/// directory
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(name);
    let cleaned: String = base
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();

    match cleaned.trim_start_matches('.') {
        "" => "upload".to_string(),
        rest => rest.to_string(),
    }
}

pub fn stored_name(original: &str, millis: u128) -> String {
    format!("{}-{}", millis, sanitize_filename(original))
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

pub async fn upload(State(state): State<AppState>, mut multipart: Multipart) -> (StatusCode, Json<UploadResponse>) {
    let field = loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some("file") => break field,
            Ok(Some(_)) => continue,
            Ok(None) => return (StatusCode::BAD_REQUEST, Json(UploadResponse::failed("No file provided."))),
            Err(e) => {
                warn!(error = %e, "Malformed upload");
                return (StatusCode::BAD_REQUEST, Json(UploadResponse::failed("No file provided.")));
            }
        }
    };

    if !field.content_type().is_some_and(|t| t.starts_with("image/")) {
        return (StatusCode::BAD_REQUEST, Json(UploadResponse::failed("Invalid file type.")));
    }

    let filename = stored_name(field.file_name().unwrap_or("upload"), now_millis());
    let bytes = match field.bytes().await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(error = %e, "Upload body could not be read");
            return (StatusCode::BAD_REQUEST, Json(UploadResponse::failed("Failed to save file.")));
        }
    };

    let target = state.uploads_dir.join(&filename);
    if let Err(e) = tokio::fs::write(&target, &bytes).await {
        error!(path = %target.display(), error = %e, "Upload could not be written");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(UploadResponse::failed("Failed to save file.")),
        );
    }

    info!(file = %filename, bytes = bytes.len(), "Stored upload");
    (StatusCode::OK, Json(UploadResponse::ok(format!("{}/{}", UPLOADS_URL, filename))))
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// URLs of every image in the uploads directory, sorted. A missing or
/// unreadable directory lists as empty.
pub async fn list_images(dir: &Path) -> Vec<String> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) => {
            warn!(path = %dir.display(), error = %e, "Could not read uploads directory");
            return Vec::new();
        }
    };

    let mut urls = Vec::new();
    while let Ok(Some(entry)) = entries.next_entry().await {
        let path = entry.path();
        if is_image(&path) {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                urls.push(format!("{}/{}", UPLOADS_URL, name));
            }
        }
    }
    urls.sort();
    urls
}

pub async fn media(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(list_images(&state.uploads_dir).await)
}
