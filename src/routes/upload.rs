//! Image upload endpoints (admin only).

use axum::{
    extract::{Multipart, Path, State},
    response::IntoResponse,
    Json,
};
use serde::Serialize;

use crate::auth::AdminSession;
use crate::error::{AppError, AppResult};
use crate::routes::ApiResponse;
use crate::state::AppState;
use crate::storage::{ImageFormat, StoredImage, MAX_FILES, MAX_FILE_SIZE};

const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];

/// Body limit for the upload routes: a full batch plus multipart overhead.
pub const UPLOAD_BODY_LIMIT: usize = MAX_FILES * MAX_FILE_SIZE + 1024 * 1024;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    #[serde(flatten)]
    pub image: StoredImage,
}

#[derive(Debug, Serialize)]
pub struct UploadManyResponse {
    pub success: bool,
    pub images: Vec<StoredImage>,
}

fn sanitize_filename(filename: &str) -> bool {
    !filename.contains("..")
        && !filename.contains('/')
        && !filename.contains('\\')
        && !filename.contains('\0')
}

fn extension_allowed(filename: &str) -> bool {
    match filename.rsplit_once('.') {
        Some((_, ext)) => ALLOWED_EXTENSIONS.contains(&ext.to_lowercase().as_str()),
        None => false,
    }
}

/// Checks one uploaded file and identifies its format from its content.
fn check_file(filename: Option<&str>, bytes: &[u8]) -> AppResult<ImageFormat> {
    if let Some(name) = filename {
        if !sanitize_filename(name) {
            return Err(AppError::validation("Invalid filename"));
        }
        if !extension_allowed(name) {
            return Err(AppError::validation("Only image files are allowed!"));
        }
    }
    if bytes.is_empty() {
        return Err(AppError::validation("Uploaded file is empty"));
    }
    if bytes.len() > MAX_FILE_SIZE {
        return Err(AppError::validation(format!(
            "File too large. Maximum size is {}MB",
            MAX_FILE_SIZE / 1024 / 1024
        )));
    }
    ImageFormat::sniff(bytes).ok_or_else(|| AppError::validation("Only image files are allowed!"))
}

/// Reads every part named `field`, up to `max` of them. Other parts are
/// ignored.
async fn read_images(
    multipart: &mut Multipart,
    field: &str,
    max: usize,
) -> AppResult<Vec<(Vec<u8>, ImageFormat)>> {
    let mut files = Vec::new();
    while let Some(part) = multipart.next_field().await? {
        if part.name() != Some(field) {
            continue;
        }
        if files.len() == max {
            return Err(AppError::validation(format!(
                "Too many files. Maximum is {max}"
            )));
        }
        let filename = part.file_name().map(str::to_string);
        let bytes = part.bytes().await?;
        let format = check_file(filename.as_deref(), &bytes)?;
        files.push((bytes.to_vec(), format));
    }
    Ok(files)
}

/// POST /api/upload/image
pub async fn upload_image(
    State(state): State<AppState>,
    AdminSession(_admin): AdminSession,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let mut files = read_images(&mut multipart, "image", 1).await?;
    let (bytes, format) = files
        .pop()
        .ok_or_else(|| AppError::validation("Please upload an image file"))?;

    let image = state.images.save(&bytes, format).await?;
    Ok(Json(UploadResponse {
        success: true,
        image,
    }))
}

/// POST /api/upload/images
pub async fn upload_images(
    State(state): State<AppState>,
    AdminSession(_admin): AdminSession,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let files = read_images(&mut multipart, "images", MAX_FILES).await?;
    if files.is_empty() {
        return Err(AppError::validation("Please upload at least one image"));
    }

    let mut images = Vec::with_capacity(files.len());
    for (bytes, format) in &files {
        images.push(state.images.save(bytes, *format).await?);
    }
    Ok(Json(UploadManyResponse {
        success: true,
        images,
    }))
}

/// DELETE /api/upload/{publicId}
///
/// The id arrives with `/` replaced by `-` so it fits in one path segment.
/// Stored names never contain `-`, so only the last one marks the split.
pub async fn delete_image(
    State(state): State<AppState>,
    AdminSession(_admin): AdminSession,
    Path(public_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let public_id = decode_public_id(&public_id);
    if !state.images.delete(&public_id).await? {
        return Err(AppError::validation("Failed to delete image"));
    }
    Ok(ApiResponse::message("Image deleted successfully"))
}

fn decode_public_id(raw: &str) -> String {
    if raw.contains('/') {
        return raw.to_string();
    }
    match raw.rsplit_once('-') {
        Some((folder, name)) => format!("{folder}/{name}"),
        None => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_public_id() {
        assert_eq!(decode_public_id("aboutsl-abc123"), "aboutsl/abc123");
        assert_eq!(decode_public_id("about-sl-abc123"), "about-sl/abc123");
        assert_eq!(decode_public_id("aboutsl/abc123"), "aboutsl/abc123");
        assert_eq!(decode_public_id("abc123"), "abc123");
    }

    #[test]
    fn test_sanitize_filename() {
        assert!(sanitize_filename("beach.jpg"));
        assert!(!sanitize_filename("../etc/passwd"));
        assert!(!sanitize_filename("a/b.png"));
        assert!(!sanitize_filename("a\\b.png"));
    }

    #[test]
    fn test_check_file() {
        let png = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert_eq!(check_file(Some("x.PNG"), &png).unwrap(), ImageFormat::Png);
        assert_eq!(check_file(None, &png).unwrap(), ImageFormat::Png);
        assert!(check_file(Some("x.pdf"), &png).is_err());
        assert!(check_file(Some("x.png"), b"%PDF-1.4").is_err());
        assert!(check_file(Some("x.png"), &[]).is_err());

        let mut big = vec![0xFF, 0xD8, 0xFF];
        big.resize(MAX_FILE_SIZE + 1, 0);
        assert!(check_file(Some("big.jpg"), &big).is_err());
    }
}
