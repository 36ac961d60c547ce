//! Image availability check before presentation

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];
const JPEG_SIGNATURE: [u8; 3] = [0xff, 0xd8, 0xff];

/// Image container detected from the file signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Png => write!(f, "PNG"),
            Self::Jpeg => write!(f, "JPEG"),
        }
    }
}

/// Outcome of loading the current image
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ImageCheck {
    Ok { format: ImageFormat, size: u64 },
    Failed { reason: String },
}

impl ImageCheck {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }

    pub fn failure(&self) -> Option<&str> {
        match self {
            Self::Ok { .. } => None,
            Self::Failed { reason } => Some(reason),
        }
    }
}

/// Read the head of an image file and check that it is a PNG or JPEG
pub fn check_image(path: &Path) -> ImageCheck {
    let failed = |reason: String| {
        debug!(?path, %reason, "check_image: image unusable");
        ImageCheck::Failed { reason }
    };

    let mut file = match File::open(path) {
        Ok(f) => f,
        Err(e) => return failed(format!("cannot open: {}", e)),
    };
    let size = match file.metadata() {
        Ok(m) => m.len(),
        Err(e) => return failed(format!("cannot stat: {}", e)),
    };

    let mut head = [0u8; 8];
    let mut read = 0;
    while read < head.len() {
        match file.read(&mut head[read..]) {
            Ok(0) => break,
            Ok(n) => read += n,
            Err(e) => return failed(format!("cannot read: {}", e)),
        }
    }
    let head = &head[..read];

    if head.starts_with(&PNG_SIGNATURE) {
        ImageCheck::Ok {
            format: ImageFormat::Png,
            size,
        }
    } else if head.starts_with(&JPEG_SIGNATURE) {
        ImageCheck::Ok {
            format: ImageFormat::Jpeg,
            size,
        }
    } else if head.is_empty() {
        failed("file is empty".to_string())
    } else {
        failed("not a PNG or JPEG image".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_png_and_jpeg_detected() {
        let temp = TempDir::new().unwrap();
        let png = temp.path().join("a.png");
        let jpg = temp.path().join("b.jpg");
        let mut png_bytes = PNG_SIGNATURE.to_vec();
        png_bytes.extend_from_slice(b"rest");
        fs::write(&png, &png_bytes).unwrap();
        fs::write(&jpg, [0xff, 0xd8, 0xff, 0xe0]).unwrap();

        assert_eq!(
            check_image(&png),
            ImageCheck::Ok {
                format: ImageFormat::Png,
                size: 12
            }
        );
        assert!(matches!(
            check_image(&jpg),
            ImageCheck::Ok {
                format: ImageFormat::Jpeg,
                ..
            }
        ));
    }

    #[test]
    fn test_failures_are_reported() {
        let temp = TempDir::new().unwrap();
        let empty = temp.path().join("empty.png");
        let text = temp.path().join("text.png");
        fs::write(&empty, b"").unwrap();
        fs::write(&text, b"hello world").unwrap();

        assert_eq!(check_image(&empty).failure(), Some("file is empty"));
        assert_eq!(check_image(&text).failure(), Some("not a PNG or JPEG image"));
        assert!(
            check_image(&temp.path().join("missing.png"))
                .failure()
                .unwrap()
                .starts_with("cannot open")
        );
    }
}
