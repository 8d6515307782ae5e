//! Decoding encoded buffers to RGBA bitmaps.
//!
//! Dispatch is driven by the sniffed [`ImageFormat`], never by file name.
//! JPEG goes through `jpeg-decoder`, WebP through the `image` crate's WebP
//! decoder. [`ImageFormat::Unknown`] is rejected with
//! [`Error::UnsupportedFormat`]; a known format that fails to decode yields
//! [`Error::Decode`].

use crate::buffer::{ImageBuffer, ImageFormat};
use crate::error::{Error, Result};

/// A decoded image: RGBA8 samples, row-major, top-to-bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBitmap {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl PixelBitmap {
    /// Samples per pixel.
    pub const CHANNELS: usize = 4;

    /// Create a bitmap from RGBA8 samples.
    ///
    /// Fails if `data` does not hold exactly `width * height * 4` samples.
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        let expected = width * height * Self::CHANNELS;
        if data.len() != expected {
            return Err(Error::MetricCalculation {
                metric: "bitmap".to_string(),
                reason: format!(
                    "{}x{} RGBA needs {expected} samples, got {}",
                    width,
                    height,
                    data.len()
                ),
            });
        }
        Ok(Self { width, height, data })
    }

    /// Create a bitmap from packed RGB8 samples, with opaque alpha.
    pub fn from_rgb(width: usize, height: usize, rgb: &[u8]) -> Result<Self> {
        let data = rgb
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect();
        Self::new(width, height, data)
    }

    /// Image width.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height.
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw RGBA samples.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Packed RGB8 samples, alpha dropped.
    #[must_use]
    pub fn to_rgb8_vec(&self) -> Vec<u8> {
        let mut rgb = Vec::with_capacity(self.width * self.height * 3);
        for chunk in self.data.chunks_exact(4) {
            rgb.push(chunk[0]);
            rgb.push(chunk[1]);
            rgb.push(chunk[2]);
        }
        rgb
    }
}

/// Decode a buffer according to its sniffed format.
pub fn decode(buffer: &ImageBuffer) -> Result<PixelBitmap> {
    match buffer.format() {
        ImageFormat::Jpeg => decode_jpeg(buffer.as_bytes()),
        ImageFormat::Webp => decode_webp(buffer.as_bytes()),
        ImageFormat::Unknown => Err(Error::UnsupportedFormat(
            "image content should be encoded as JPEG or WebP".to_string(),
        )),
    }
}

/// Decode JPEG data to RGBA.
pub fn decode_jpeg(data: &[u8]) -> Result<PixelBitmap> {
    use std::io::Cursor;

    let mut decoder = jpeg_decoder::Decoder::new(Cursor::new(data));
    let pixels = decoder.decode().map_err(|e| jpeg_error(e.to_string()))?;

    let info = decoder
        .info()
        .ok_or_else(|| jpeg_error("Missing JPEG info after decode".to_string()))?;

    let width = usize::from(info.width);
    let height = usize::from(info.height);

    let rgba: Vec<u8> = match info.pixel_format {
        jpeg_decoder::PixelFormat::RGB24 => return PixelBitmap::from_rgb(width, height, &pixels),
        jpeg_decoder::PixelFormat::L8 => pixels.iter().flat_map(|&g| [g, g, g, 255]).collect(),
        jpeg_decoder::PixelFormat::L16 => {
            // 16-bit grayscale, big endian - keep the high byte
            pixels
                .chunks_exact(2)
                .flat_map(|c| [c[0], c[0], c[0], 255])
                .collect()
        }
        jpeg_decoder::PixelFormat::CMYK32 => {
            return Err(jpeg_error("CMYK JPEGs are not supported".to_string()));
        }
    };

    PixelBitmap::new(width, height, rgba)
}

/// Decode WebP data (lossy or lossless) to RGBA.
pub fn decode_webp(data: &[u8]) -> Result<PixelBitmap> {
    let image = image::load_from_memory_with_format(data, image::ImageFormat::WebP).map_err(|e| {
        Error::Decode {
            format: ImageFormat::Webp,
            message: e.to_string(),
        }
    })?;

    let rgba = image.to_rgba8();
    let (width, height) = (rgba.width() as usize, rgba.height() as usize);
    PixelBitmap::new(width, height, rgba.into_raw())
}

fn jpeg_error(message: String) -> Error {
    Error::Decode {
        format: ImageFormat::Jpeg,
        message,
    }
}
