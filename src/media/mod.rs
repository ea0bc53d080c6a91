/// Media intake: per-class validation and durable file storage
///
/// Each media class carries its own size ceiling and extension allow-list.
/// Accepted uploads are written under `<base>/<class subdir>/` with a
/// generated collision-free name; the caller persists that name on the post
/// row only after the write completed.
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use uuid::Uuid;

/// A buffered multipart file part, as produced by the form parser.
#[derive(Debug, Clone)]
pub struct UploadPart {
    /// Filename as supplied by the client.
    pub original_name: String,
    pub data: Vec<u8>,
}

/// Media class accepted by the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaClass {
    Image,
    Video,
}

impl MediaClass {
    /// Size ceiling in bytes.
    pub fn max_bytes(self) -> usize {
        match self {
            MediaClass::Image => 20 * 1024 * 1024,
            MediaClass::Video => 100 * 1024 * 1024,
        }
    }

    /// Allowed file extensions, lowercase, with the leading dot.
    pub fn allowed_extensions(self) -> &'static [&'static str] {
        match self {
            MediaClass::Image => &[".jpg", ".jpeg", ".png", ".gif"],
            MediaClass::Video => &[".mp4", ".mov", ".avi", ".mkv", ".webm"],
        }
    }

    /// Storage subdirectory below the upload base.
    pub fn subdir(self) -> &'static str {
        match self {
            MediaClass::Image => "images",
            MediaClass::Video => "videos",
        }
    }
}

impl fmt::Display for MediaClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaClass::Image => write!(f, "image"),
            MediaClass::Video => write!(f, "video"),
        }
    }
}

/// Media intake failure.
///
/// `echoed_filename` is deliberately asymmetric: oversized uploads and write
/// failures echo the client's filename so the UI can show what was rejected,
/// while unsupported formats echo nothing. The asymmetry is inherited
/// behavior kept for compatibility pending a product decision.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("{class} size exceeds the {limit_mib} MiB limit")]
    Oversized {
        class: MediaClass,
        limit_mib: usize,
        original_name: String,
    },

    #[error("invalid {class} format; allowed: {allowed}")]
    UnsupportedFormat { class: MediaClass, allowed: String },

    #[error("could not store the uploaded {class}")]
    WriteFailed {
        class: MediaClass,
        original_name: String,
        #[source]
        source: std::io::Error,
    },
}

impl MediaError {
    /// Original filename to echo back to the client, when this failure
    /// class echoes one.
    pub fn echoed_filename(&self) -> Option<&str> {
        match self {
            MediaError::Oversized { original_name, .. }
            | MediaError::WriteFailed { original_name, .. } => Some(original_name),
            MediaError::UnsupportedFormat { .. } => None,
        }
    }
}

/// Validates uploads and writes accepted ones under a fixed base directory.
#[derive(Debug, Clone)]
pub struct MediaStore {
    base_dir: PathBuf,
}

impl MediaStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Directory holding stored files of the given class.
    pub fn class_dir(&self, class: MediaClass) -> PathBuf {
        self.base_dir.join(class.subdir())
    }

    /// Validate an optional upload and persist it on success.
    ///
    /// Returns `Ok(None)` when no part was supplied; absence is not a
    /// failure. On success returns the generated stored filename. The
    /// destination is written in place (no temp-file/rename), so a failed
    /// copy can leave a truncated file behind; the orphan sweep reclaims it.
    pub fn validate_and_store(
        &self,
        upload: Option<&UploadPart>,
        class: MediaClass,
    ) -> Result<Option<String>, MediaError> {
        let Some(part) = upload else {
            return Ok(None);
        };

        if part.data.len() > class.max_bytes() {
            return Err(MediaError::Oversized {
                class,
                limit_mib: class.max_bytes() / (1024 * 1024),
                original_name: part.original_name.clone(),
            });
        }

        let ext = extension_of(&part.original_name);
        let allowed = class.allowed_extensions();
        if !allowed.contains(&ext.to_ascii_lowercase().as_str()) {
            return Err(MediaError::UnsupportedFormat {
                class,
                allowed: allowed.join(", "),
            });
        }

        let stored_name = unique_name(&part.original_name);
        let dir = self.class_dir(class);
        self.write_part(&dir, &stored_name, &part.data)
            .map_err(|source| MediaError::WriteFailed {
                class,
                original_name: part.original_name.clone(),
                source,
            })?;

        Ok(Some(stored_name))
    }

    fn write_part(&self, dir: &Path, name: &str, data: &[u8]) -> std::io::Result<()> {
        fs::create_dir_all(dir)?;
        let mut dest = fs::File::create(dir.join(name))?;
        dest.write_all(data)?;
        Ok(())
    }
}

/// Generate a collision-free stored filename carrying the original
/// extension, lowercased so downstream extension checks need not be
/// case-aware. A random 128-bit token replaces the millisecond timestamps
/// the board historically used, which could collide for uploads landing in
/// the same millisecond.
pub fn unique_name(original: &str) -> String {
    format!(
        "{}{}",
        Uuid::new_v4().simple(),
        extension_of(original).to_ascii_lowercase()
    )
}

/// Extension of a filename including the leading dot, or `""` if none.
fn extension_of(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) if idx > 0 => &name[idx..],
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn part(name: &str, len: usize) -> UploadPart {
        UploadPart {
            original_name: name.to_string(),
            data: vec![0u8; len],
        }
    }

    #[test]
    fn absent_upload_is_not_a_failure() {
        let dir = tempdir().unwrap();
        let store = MediaStore::new(dir.path());
        let stored = store.validate_and_store(None, MediaClass::Image).unwrap();
        assert!(stored.is_none());
        assert!(!store.class_dir(MediaClass::Image).exists());
    }

    #[test]
    fn accepted_image_is_written_with_matching_extension() {
        let dir = tempdir().unwrap();
        let store = MediaStore::new(dir.path());

        let stored = store
            .validate_and_store(Some(&part("holiday.png", 1024)), MediaClass::Image)
            .unwrap()
            .expect("image should be stored");

        assert!(stored.ends_with(".png"));
        let path = store.class_dir(MediaClass::Image).join(&stored);
        assert_eq!(fs::metadata(path).unwrap().len(), 1024);

        let entries: Vec<_> = fs::read_dir(store.class_dir(MediaClass::Image))
            .unwrap()
            .collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn oversized_image_is_rejected_and_echoes_filename() {
        let dir = tempdir().unwrap();
        let store = MediaStore::new(dir.path());

        let err = store
            .validate_and_store(
                Some(&part("big.jpg", 20 * 1024 * 1024 + 1)),
                MediaClass::Image,
            )
            .unwrap_err();

        assert_eq!(err.echoed_filename(), Some("big.jpg"));
        assert!(matches!(err, MediaError::Oversized { .. }));
        assert!(!store.class_dir(MediaClass::Image).exists());
    }

    #[test]
    fn unsupported_format_is_rejected_without_filename_echo() {
        let dir = tempdir().unwrap();
        let store = MediaStore::new(dir.path());

        let err = store
            .validate_and_store(Some(&part("payload.exe", 16)), MediaClass::Image)
            .unwrap_err();

        assert!(matches!(err, MediaError::UnsupportedFormat { .. }));
        assert_eq!(err.echoed_filename(), None);
        assert!(!store.class_dir(MediaClass::Image).exists());
    }

    #[test]
    fn uppercase_extensions_are_accepted_and_stored_lowercase() {
        let dir = tempdir().unwrap();
        let store = MediaStore::new(dir.path());

        let stored = store
            .validate_and_store(Some(&part("CLIP.MP4", 64)), MediaClass::Video)
            .unwrap()
            .expect("video should be stored");
        assert!(stored.ends_with(".mp4"));
        assert!(store.class_dir(MediaClass::Video).join(&stored).is_file());
    }

    #[test]
    fn video_ceiling_is_one_hundred_mib() {
        let dir = tempdir().unwrap();
        let store = MediaStore::new(dir.path());

        let err = store
            .validate_and_store(
                Some(&part("clip.webm", 100 * 1024 * 1024 + 1)),
                MediaClass::Video,
            )
            .unwrap_err();
        assert_eq!(err.echoed_filename(), Some("clip.webm"));
    }

    #[test]
    fn unique_names_preserve_extension_and_differ() {
        let a = unique_name("photo.jpeg");
        let b = unique_name("photo.jpeg");
        assert!(a.ends_with(".jpeg"));
        assert!(b.ends_with(".jpeg"));
        assert_ne!(a, b);
    }

    #[test]
    fn filenames_without_extension_get_none_appended() {
        let name = unique_name("noext");
        assert!(!name.contains('.'));
        assert_eq!(name.len(), 32);
    }
}
