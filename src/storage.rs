//! Image storage behind the upload routes.
//!
//! Images are addressed by a `publicId` of the form `<folder>/<name>` and
//! served from `/uploads/<folder>/<name>.<ext>`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

pub const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;
pub const MAX_FILES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    Webp,
}

impl ImageFormat {
    pub const ALL: [ImageFormat; 4] = [Self::Jpeg, Self::Png, Self::Gif, Self::Webp];

    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::Webp => "webp",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::Webp => "image/webp",
        }
    }

    /// Identify the format from the file's magic bytes.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [0xFF, 0xD8, 0xFF, ..] => Some(Self::Jpeg),
            [0x89, 0x50, 0x4E, 0x47, ..] => Some(Self::Png),
            [0x47, 0x49, 0x46, 0x38, ..] => Some(Self::Gif),
            [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Some(Self::Webp),
            _ => None,
        }
    }
}

/// Pixel dimensions read from the image header, where the format makes
/// that cheap.
pub fn dimensions(format: ImageFormat, bytes: &[u8]) -> Option<(u32, u32)> {
    let be16 = |at: usize| -> Option<u32> {
        Some(u16::from_be_bytes([*bytes.get(at)?, *bytes.get(at + 1)?]) as u32)
    };
    match format {
        ImageFormat::Png => {
            let w = bytes.get(16..20)?;
            let h = bytes.get(20..24)?;
            Some((
                u32::from_be_bytes([w[0], w[1], w[2], w[3]]),
                u32::from_be_bytes([h[0], h[1], h[2], h[3]]),
            ))
        }
        ImageFormat::Gif => {
            let d = bytes.get(6..10)?;
            Some((
                u16::from_le_bytes([d[0], d[1]]) as u32,
                u16::from_le_bytes([d[2], d[3]]) as u32,
            ))
        }
        ImageFormat::Jpeg => {
            let mut i = 2;
            while i + 4 <= bytes.len() {
                if bytes[i] != 0xFF {
                    return None;
                }
                let marker = bytes[i + 1];
                let len = be16(i + 2)? as usize;
                // SOF0..SOF15 except DHT (C4), JPG (C8) and DAC (CC)
                if (0xC0..=0xCF).contains(&marker) && !matches!(marker, 0xC4 | 0xC8 | 0xCC) {
                    return Some((be16(i + 7)?, be16(i + 5)?));
                }
                i += 2 + len;
            }
            None
        }
        ImageFormat::Webp => None,
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredImage {
    pub url: String,
    pub public_id: String,
    pub format: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub bytes: usize,
}

#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn save(&self, bytes: &[u8], format: ImageFormat) -> AppResult<StoredImage>;

    /// Returns false when nothing was stored under `public_id`.
    async fn delete(&self, public_id: &str) -> AppResult<bool>;
}

/// Stores images on the local filesystem under `<root>/<folder>/`.
pub struct LocalImageStore {
    root: PathBuf,
    folder: String,
    base_url: String,
}

impl LocalImageStore {
    pub fn new(root: impl Into<PathBuf>, folder: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            folder: folder.into(),
            base_url: base_url.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn folder_path(&self) -> PathBuf {
        self.root.join(&self.folder)
    }

    /// Splits `<folder>/<name>` and rejects anything that could escape it.
    ///
    /// Folder separators match whether written as `/` or `-`.
    fn file_stem<'a>(&self, public_id: &'a str) -> Option<&'a str> {
        let (folder, name) = public_id.rsplit_once('/')?;
        if folder.replace('/', "-") != self.folder.replace('/', "-") {
            return None;
        }
        let safe = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');
        safe.then_some(name)
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn save(&self, bytes: &[u8], format: ImageFormat) -> AppResult<StoredImage> {
        let dir = self.folder_path();
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            tracing::error!("Failed to create upload directory: {}", e);
            AppError::internal("Failed to initialize upload directory")
        })?;

        let name = Uuid::new_v4().simple().to_string();
        let filename = format!("{}.{}", name, format.extension());
        tokio::fs::write(dir.join(&filename), bytes)
            .await
            .map_err(|e| {
                tracing::error!("Failed to write upload file: {}", e);
                AppError::internal("Failed to save file")
            })?;

        let (width, height) = match dimensions(format, bytes) {
            Some((w, h)) => (Some(w), Some(h)),
            None => (None, None),
        };

        tracing::info!("Image uploaded: {} ({}, {} bytes)", filename, format.mime(), bytes.len());

        Ok(StoredImage {
            url: format!("{}/uploads/{}/{}", self.base_url, self.folder, filename),
            public_id: format!("{}/{}", self.folder, name),
            format: format.extension().to_string(),
            width,
            height,
            bytes: bytes.len(),
        })
    }

    async fn delete(&self, public_id: &str) -> AppResult<bool> {
        let stem = self
            .file_stem(public_id)
            .ok_or_else(|| AppError::validation("Invalid image id"))?;

        let dir = self.folder_path();
        for format in ImageFormat::ALL {
            let path = dir.join(format!("{}.{}", stem, format.extension()));
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {
                    tracing::info!("Image deleted: {}", public_id);
                    return Ok(true);
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => {
                    tracing::error!("Failed to delete file {}: {}", path.display(), e);
                    return Err(AppError::internal("Failed to delete file"));
                }
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_1X2: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13, b'I', b'H', b'D', b'R', 0, 0,
        0, 1, 0, 0, 0, 2, 8, 6, 0, 0, 0,
    ];

    #[test]
    fn test_sniff() {
        assert_eq!(ImageFormat::sniff(PNG_1X2), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::sniff(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::sniff(b"GIF89a"), Some(ImageFormat::Gif));
        assert_eq!(ImageFormat::sniff(b"RIFF\0\0\0\0WEBPVP8 "), Some(ImageFormat::Webp));
        assert_eq!(ImageFormat::sniff(b"%PDF-1.7"), None);
        assert_eq!(ImageFormat::sniff(b""), None);
    }

    #[test]
    fn test_dimensions() {
        assert_eq!(dimensions(ImageFormat::Png, PNG_1X2), Some((1, 2)));
        assert_eq!(
            dimensions(ImageFormat::Gif, b"GIF89a\x03\x00\x04\x00"),
            Some((3, 4))
        );
        let jpeg = [
            0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x04, 0x00, 0x00, 0xFF, 0xC0, 0x00, 0x11, 0x08, 0x00,
            0x20, 0x00, 0x40,
        ];
        assert_eq!(dimensions(ImageFormat::Jpeg, &jpeg), Some((64, 32)));
        assert_eq!(dimensions(ImageFormat::Png, &PNG_1X2[..10]), None);
    }

    #[tokio::test]
    async fn test_save_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalImageStore::new(dir.path(), "aboutsl", "");

        let image = store.save(PNG_1X2, ImageFormat::Png).await.unwrap();
        assert!(image.public_id.starts_with("aboutsl/"));
        assert!(image.url.starts_with("/uploads/aboutsl/"));
        assert!(image.url.ends_with(".png"));
        assert_eq!(image.width, Some(1));

        assert!(store.delete(&image.public_id).await.unwrap());
        assert!(!store.delete(&image.public_id).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalImageStore::new(dir.path(), "aboutsl", "");
        assert!(store.delete("aboutsl/../secret").await.is_err());
        assert!(store.delete("other/abc").await.is_err());
        assert!(store.delete("aboutsl/").await.is_err());
    }

    #[tokio::test]
    async fn test_delete_in_nested_or_hyphenated_folder() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalImageStore::new(dir.path(), "about-sl", "");
        let image = store.save(PNG_1X2, ImageFormat::Png).await.unwrap();
        assert!(image.public_id.starts_with("about-sl/"));
        assert!(store.delete(&image.public_id).await.unwrap());

        let store = LocalImageStore::new(dir.path(), "about/hotels", "");
        let image = store.save(PNG_1X2, ImageFormat::Png).await.unwrap();
        let name = image.public_id.rsplit_once('/').unwrap().1;
        assert!(store.delete(&format!("about-hotels/{name}")).await.unwrap());
    }
}
