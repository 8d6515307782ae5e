//! Built-in compression stages.
//!
//! Stages decode their input with [`crate::decode`] and re-encode it:
//!
//! - `jpeg:<q>`: JPEG at quality `q`. Uses mozjpeg with the `mozjpeg`
//!   feature, the pure-Rust `image` encoder otherwise.
//! - `webp:<q>`: lossy WebP at quality `q` through libwebp (`libwebp`
//!   feature). Without the feature, building the stage is a configuration
//!   error.
//! - `webp-lossless`: lossless WebP through the `image` crate.

use std::str::FromStr;

use image::codecs::webp::WebPEncoder;
use image::{ExtendedColorType, ImageEncoder};
use serde::{Deserialize, Serialize};

use crate::buffer::ImageBuffer;
use crate::decode::{PixelBitmap, decode};
use crate::error::{Error, Result};
use crate::pipeline::Transform;

/// Declarative description of a built-in stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "codec", rename_all = "kebab-case")]
pub enum StageSpec {
    /// Re-encode as JPEG.
    Jpeg {
        /// Encoder quality, 1-100.
        quality: u8,
    },
    /// Encode as lossy WebP.
    Webp {
        /// Encoder quality, 1-100.
        quality: u8,
    },
    /// Encode as lossless WebP.
    WebpLossless,
}

impl StageSpec {
    fn validate(&self) -> Result<()> {
        match *self {
            Self::Jpeg { quality } | Self::Webp { quality } if !(1..=100).contains(&quality) => {
                Err(Error::Configuration(format!(
                    "stage {self}: quality must be within 1-100"
                )))
            }
            _ => Ok(()),
        }
    }
}

impl std::fmt::Display for StageSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Jpeg { quality } => write!(f, "jpeg:{quality}"),
            Self::Webp { quality } => write!(f, "webp:{quality}"),
            Self::WebpLossless => write!(f, "webp-lossless"),
        }
    }
}

impl FromStr for StageSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (codec, quality) = match s.split_once(':') {
            Some((codec, quality)) => (codec, Some(quality)),
            None => (s, None),
        };

        let parse_quality = |q: Option<&str>| -> Result<u8> {
            let q = q.ok_or_else(|| {
                Error::Configuration(format!("stage `{s}` needs a quality, e.g. `{codec}:80`"))
            })?;
            q.trim()
                .parse::<u8>()
                .map_err(|_| Error::Configuration(format!("stage `{s}`: invalid quality `{q}`")))
        };

        let spec = match codec.to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Self::Jpeg {
                quality: parse_quality(quality)?,
            },
            "webp" => Self::Webp {
                quality: parse_quality(quality)?,
            },
            "webp-lossless" if quality.is_none() => Self::WebpLossless,
            _ => {
                return Err(Error::Configuration(format!(
                    "unknown stage `{s}` (expected jpeg:<q>, webp:<q> or webp-lossless)"
                )));
            }
        };
        spec.validate()?;
        Ok(spec)
    }
}

/// Instantiate the transform described by `spec`.
pub fn build_stage(spec: &StageSpec) -> Result<Box<dyn Transform>> {
    spec.validate()?;

    Ok(match *spec {
        StageSpec::Jpeg { quality } => Box::new(JpegStage::new(quality)),
        StageSpec::Webp { quality } => lossy_webp_stage(quality)?,
        StageSpec::WebpLossless => Box::new(WebpStage::lossless()),
    })
}

#[cfg(feature = "libwebp")]
fn lossy_webp_stage(quality: u8) -> Result<Box<dyn Transform>> {
    Ok(Box::new(WebpStage::lossy(quality)))
}

#[cfg(not(feature = "libwebp"))]
fn lossy_webp_stage(quality: u8) -> Result<Box<dyn Transform>> {
    Err(Error::Configuration(format!(
        "stage webp:{quality} needs the `libwebp` feature (use webp-lossless instead)"
    )))
}

/// Re-encode to JPEG.
pub struct JpegStage {
    name: String,
    quality: u8,
}

impl JpegStage {
    /// Stage encoding at `quality` (1-100).
    #[must_use]
    pub fn new(quality: u8) -> Self {
        Self {
            name: StageSpec::Jpeg { quality }.to_string(),
            quality,
        }
    }
}

impl Transform for JpegStage {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, input: &ImageBuffer) -> Result<ImageBuffer> {
        let bitmap = decode(input)?;
        encode_jpeg(&bitmap, self.quality).map(ImageBuffer::new)
    }
}

#[cfg(feature = "mozjpeg")]
fn encode_jpeg(bitmap: &PixelBitmap, quality: u8) -> Result<Vec<u8>> {
    use mozjpeg::{ColorSpace, Compress};

    let rgb_data = bitmap.to_rgb8_vec();

    let mut comp = Compress::new(ColorSpace::JCS_RGB);
    comp.set_size(bitmap.width(), bitmap.height());
    comp.set_quality(f32::from(quality));
    comp.set_optimize_coding(true);
    comp.set_progressive_mode();

    let mut comp = comp
        .start_compress(Vec::new())
        .map_err(|e| encode_error("mozjpeg", format!("Failed to start compression: {e}")))?;

    comp.write_scanlines(&rgb_data)
        .map_err(|e| encode_error("mozjpeg", format!("Failed to write scanlines: {e}")))?;

    comp.finish()
        .map_err(|e| encode_error("mozjpeg", format!("Failed to finish compression: {e}")))
}

#[cfg(not(feature = "mozjpeg"))]
fn encode_jpeg(bitmap: &PixelBitmap, quality: u8) -> Result<Vec<u8>> {
    let rgb_data = bitmap.to_rgb8_vec();
    let mut out = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, quality)
        .write_image(
            &rgb_data,
            bitmap.width() as u32,
            bitmap.height() as u32,
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| encode_error("jpeg", e.to_string()))?;
    Ok(out)
}

/// Encode to WebP.
pub struct WebpStage {
    name: String,
    quality: Option<u8>,
}

impl WebpStage {
    /// Lossy WebP at `quality` (1-100).
    #[cfg(feature = "libwebp")]
    #[must_use]
    pub fn lossy(quality: u8) -> Self {
        Self {
            name: StageSpec::Webp { quality }.to_string(),
            quality: Some(quality),
        }
    }

    /// Lossless WebP.
    #[must_use]
    pub fn lossless() -> Self {
        Self {
            name: StageSpec::WebpLossless.to_string(),
            quality: None,
        }
    }
}

impl Transform for WebpStage {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, input: &ImageBuffer) -> Result<ImageBuffer> {
        let bitmap = decode(input)?;
        let encoded = match self.quality {
            #[cfg(feature = "libwebp")]
            Some(quality) => encode_webp_lossy(&bitmap, quality)?,
            _ => encode_webp_lossless(&bitmap)?,
        };
        Ok(ImageBuffer::new(encoded))
    }
}

#[cfg(feature = "libwebp")]
fn encode_webp_lossy(bitmap: &PixelBitmap, quality: u8) -> Result<Vec<u8>> {
    let encoder = webp::Encoder::from_rgba(
        bitmap.data(),
        bitmap.width() as u32,
        bitmap.height() as u32,
    );
    Ok(encoder.encode(f32::from(quality)).to_vec())
}

fn encode_webp_lossless(bitmap: &PixelBitmap) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    WebPEncoder::new_lossless(&mut out)
        .write_image(
            bitmap.data(),
            bitmap.width() as u32,
            bitmap.height() as u32,
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| encode_error("webp", e.to_string()))?;
    Ok(out)
}

fn encode_error(codec: &str, message: String) -> Error {
    Error::Transform {
        index: 0,
        stage: codec.to_string(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::ImageFormat;
    use crate::fixtures;

    #[test]
    fn test_parse_stage_specs() {
        assert_eq!("jpeg:84".parse::<StageSpec>().unwrap(), StageSpec::Jpeg { quality: 84 });
        assert_eq!("JPG:50".parse::<StageSpec>().unwrap(), StageSpec::Jpeg { quality: 50 });
        assert_eq!("webp:80".parse::<StageSpec>().unwrap(), StageSpec::Webp { quality: 80 });
        assert_eq!(
            "webp-lossless".parse::<StageSpec>().unwrap(),
            StageSpec::WebpLossless
        );
    }

    #[test]
    fn test_parse_rejects_bad_specs() {
        for bad in ["jpeg", "jpeg:0", "jpeg:101", "jpeg:abc", "avif:50", "webp-lossless:3", ""] {
            let result = bad.parse::<StageSpec>();
            assert!(
                matches!(result, Err(Error::Configuration(_))),
                "`{bad}` should be rejected"
            );
        }
    }

    #[test]
    fn test_display_roundtrips_through_parse() {
        for spec in [
            StageSpec::Jpeg { quality: 84 },
            StageSpec::Webp { quality: 80 },
            StageSpec::WebpLossless,
        ] {
            assert_eq!(spec.to_string().parse::<StageSpec>().unwrap(), spec);
        }
    }

    #[test]
    fn test_serde_representation() {
        let spec: StageSpec = serde_json::from_str(r#"{"codec":"jpeg","quality":84}"#).unwrap();
        assert_eq!(spec, StageSpec::Jpeg { quality: 84 });
        let spec: StageSpec = serde_json::from_str(r#"{"codec":"webp-lossless"}"#).unwrap();
        assert_eq!(spec, StageSpec::WebpLossless);
    }

    #[test]
    fn test_build_stage_validates_quality() {
        assert!(build_stage(&StageSpec::Jpeg { quality: 0 }).is_err());
        let stage = build_stage(&StageSpec::Jpeg { quality: 70 }).unwrap();
        assert_eq!(stage.name(), "jpeg:70");
    }

    #[test]
    fn test_jpeg_stage_reencodes() {
        let source = ImageBuffer::new(fixtures::jpeg(32, 32, 100));
        let output = JpegStage::new(40).apply(&source).unwrap();
        assert_eq!(output.format(), ImageFormat::Jpeg);
        assert!(output.len() < source.len());
        let bitmap = decode(&output).unwrap();
        assert_eq!((bitmap.width(), bitmap.height()), (32, 32));
    }

    #[test]
    fn test_webp_lossless_stage_changes_container() {
        let rgb = fixtures::solid_rgb(32, 32, [200, 30, 60]);
        let source = ImageBuffer::new(fixtures::encode_jpeg(32, 32, &rgb, 100));
        let output = WebpStage::lossless().apply(&source).unwrap();
        assert_eq!(output.format(), ImageFormat::Webp);
        assert_eq!(decode(&output).unwrap(), decode(&source).unwrap());
    }

    #[cfg(feature = "libwebp")]
    #[test]
    fn test_lossy_webp_stage_shrinks_photo() {
        let (w, h) = (128, 96);
        let source = ImageBuffer::new(fixtures::encode_jpeg(w, h, &fixtures::photo_rgb(w, h), 90));
        let stage = build_stage(&StageSpec::Webp { quality: 80 }).unwrap();
        assert_eq!(stage.name(), "webp:80");

        let output = stage.apply(&source).unwrap();
        assert_eq!(output.format(), ImageFormat::Webp);
        assert!(output.len() < source.len(), "{} >= {}", output.len(), source.len());
        let lossless = WebpStage::lossless().apply(&source).unwrap();
        assert!(output.len() < lossless.len());
        let bitmap = decode(&output).unwrap();
        assert_eq!((bitmap.width(), bitmap.height()), (w, h));
    }

    #[cfg(not(feature = "libwebp"))]
    #[test]
    fn test_lossy_webp_needs_libwebp() {
        let result = build_stage(&StageSpec::Webp { quality: 80 });
        match result {
            Err(Error::Configuration(message)) => assert!(message.contains("libwebp")),
            Err(e) => panic!("unexpected error: {e}"),
            Ok(_) => panic!("webp:80 built without libwebp"),
        }
        assert!(build_stage(&StageSpec::WebpLossless).is_ok());
    }

    #[test]
    fn test_stage_rejects_undecodable_input() {
        let result = JpegStage::new(80).apply(&ImageBuffer::new(b"not an image".to_vec()));
        assert!(matches!(result, Err(Error::UnsupportedFormat(_))));
    }
}
