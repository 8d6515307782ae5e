//! Encoded image buffers and content-based format identification.

use serde::{Deserialize, Serialize};

/// Image container recognized from buffer content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// JPEG/JFIF.
    Jpeg,
    /// WebP (RIFF container, lossy or lossless).
    Webp,
    /// Anything else.
    Unknown,
}

impl ImageFormat {
    /// Identify the format of `data` from its leading bytes.
    #[must_use]
    pub fn sniff(data: &[u8]) -> Self {
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Self::Jpeg;
        }

        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Self::Webp;
        }

        Self::Unknown
    }

    /// Canonical file extension, without the dot.
    #[must_use]
    pub fn extension(self) -> Option<&'static str> {
        match self {
            Self::Jpeg => Some("jpg"),
            Self::Webp => Some("webp"),
            Self::Unknown => None,
        }
    }

    /// Whether `ext` is a conventional extension for this format.
    #[must_use]
    pub fn matches_extension(self, ext: &str) -> bool {
        let ext = ext.to_ascii_lowercase();
        match self {
            Self::Jpeg => matches!(ext.as_str(), "jpg" | "jpeg" | "jpe" | "jfif"),
            Self::Webp => ext == "webp",
            Self::Unknown => false,
        }
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Jpeg => write!(f, "jpeg"),
            Self::Webp => write!(f, "webp"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// An immutable encoded image with its sniffed format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBuffer {
    bytes: Vec<u8>,
    format: ImageFormat,
}

impl ImageBuffer {
    /// Wrap encoded bytes, sniffing the format from the content.
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        let format = ImageFormat::sniff(&bytes);
        Self { bytes, format }
    }

    /// Sniffed format.
    #[must_use]
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Encoded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl From<Vec<u8>> for ImageBuffer {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}
