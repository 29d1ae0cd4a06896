//! Frame capture sources
//!
//! A capture source synchronously yields one encoded still image, or
//! `None` when the device has nothing to offer (no permission, unplugged,
//! no frame written yet).

use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

/// Encodings accepted by the classifier service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Webp,
}

impl ImageFormat {
    /// Detect format from a file extension (case-insensitive)
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "png" => Some(ImageFormat::Png),
            "webp" => Some(ImageFormat::Webp),
            _ => None,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::Webp => "image/webp",
        }
    }
}

/// One encoded still frame
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
}

impl EncodedImage {
    pub fn jpeg(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            format: ImageFormat::Jpeg,
        }
    }
}

/// Synchronous source of encoded frames
pub trait FrameSource: Send + Sync {
    /// Grab the current frame, `None` if unavailable
    fn capture(&self) -> Option<EncodedImage>;
}

/// Reads frames that a camera daemon writes to disk
///
/// If `path` is a file, that file is the frame. If it is a directory, the
/// most recently modified supported image in it is used.
#[derive(Debug, Clone)]
pub struct FileFrameSource {
    path: PathBuf,
}

impl FileFrameSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn latest_in_dir(dir: &Path) -> Option<PathBuf> {
        let entries = std::fs::read_dir(dir).ok()?;

        entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter(|entry| ImageFormat::from_path(&entry.path()).is_some())
            .map(|entry| {
                let modified = entry
                    .metadata()
                    .and_then(|m| m.modified())
                    .unwrap_or(SystemTime::UNIX_EPOCH);
                (modified, entry.path())
            })
            .max_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)))
            .map(|(_, path)| path)
    }

    fn read_frame(path: &Path) -> Option<EncodedImage> {
        let format = ImageFormat::from_path(path)?;
        match std::fs::read(path) {
            Ok(bytes) if !bytes.is_empty() => Some(EncodedImage { bytes, format }),
            Ok(_) => {
                debug!(path = %path.display(), "Frame file is empty");
                None
            }
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Frame file unreadable");
                None
            }
        }
    }
}

impl FrameSource for FileFrameSource {
    fn capture(&self) -> Option<EncodedImage> {
        let frame_path = if self.path.is_dir() {
            Self::latest_in_dir(&self.path)?
        } else {
            self.path.clone()
        };

        Self::read_frame(&frame_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;

    #[test]
    fn test_format_detection() {
        assert_eq!(ImageFormat::from_path(Path::new("a.JPG")), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_path(Path::new("a.jpeg")), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_path(Path::new("a.png")), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_path(Path::new("a.webp")), Some(ImageFormat::Webp));
        assert_eq!(ImageFormat::from_path(Path::new("a.gif")), None);
        assert_eq!(ImageFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn test_single_file_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.jpg");
        fs::write(&path, [0xFF, 0xD8, 0xFF]).unwrap();

        let frame = FileFrameSource::new(&path).capture().unwrap();
        assert_eq!(frame.format, ImageFormat::Jpeg);
        assert_eq!(frame.bytes, vec![0xFF, 0xD8, 0xFF]);
    }

    #[test]
    fn test_missing_or_empty_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        assert!(FileFrameSource::new(dir.path().join("none.jpg")).capture().is_none());

        let empty = dir.path().join("empty.jpg");
        fs::write(&empty, []).unwrap();
        assert!(FileFrameSource::new(&empty).capture().is_none());
    }

    #[test]
    fn test_directory_source_picks_newest_image() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("old.jpg"), b"old").unwrap();
        std::thread::sleep(Duration::from_millis(20));
        fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();
        std::thread::sleep(Duration::from_millis(20));
        fs::write(dir.path().join("new.png"), b"new").unwrap();

        let frame = FileFrameSource::new(dir.path()).capture().unwrap();
        assert_eq!(frame.bytes, b"new".to_vec());
        assert_eq!(frame.format, ImageFormat::Png);
    }

    #[test]
    fn test_empty_directory_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        assert!(FileFrameSource::new(dir.path()).capture().is_none());
    }
}
