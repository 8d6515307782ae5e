//! Synthetic encoded images for unit tests.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::webp::WebPEncoder;
use image::{ExtendedColorType, ImageEncoder};

/// Packed RGB8 gradient with some high-frequency detail.
pub fn gradient_rgb(width: usize, height: usize) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(width * height * 3);
    for y in 0..height {
        for x in 0..width {
            let checker = if (x / 2 + y / 2) % 2 == 0 { 40 } else { 0 };
            rgb.push(((x * 255) / width.max(1)) as u8);
            rgb.push(((y * 255) / height.max(1)) as u8);
            rgb.push((((x + y) * 7) % 200) as u8 + checker);
        }
    }
    rgb
}

/// Packed RGB8 with smooth shading plus low-amplitude sensor-like noise.
pub fn photo_rgb(width: usize, height: usize) -> Vec<u8> {
    let mut state: u32 = 0x1234_5678;
    let mut rgb = Vec::with_capacity(width * height * 3);
    for y in 0..height {
        for x in 0..width {
            let base = [
                60 + (x * 120) / width.max(1),
                40 + (y * 140) / height.max(1),
                90 + ((x + y) * 80) / (width + height).max(1),
            ];
            for channel in base {
                state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                let noise = ((state >> 16) % 13) as usize;
                rgb.push((channel + noise).min(255) as u8);
            }
        }
    }
    rgb
}

/// Packed RGB8 image of a single color.
pub fn solid_rgb(width: usize, height: usize, color: [u8; 3]) -> Vec<u8> {
    color.repeat(width * height)
}

/// Encode RGB8 samples as JPEG.
pub fn encode_jpeg(width: usize, height: usize, rgb: &[u8], quality: u8) -> Vec<u8> {
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality)
        .write_image(rgb, width as u32, height as u32, ExtendedColorType::Rgb8)
        .unwrap();
    out
}

/// JPEG of the gradient pattern.
pub fn jpeg(width: usize, height: usize, quality: u8) -> Vec<u8> {
    encode_jpeg(width, height, &gradient_rgb(width, height), quality)
}

/// Encode RGB8 samples as lossless WebP.
pub fn webp_lossless(width: usize, height: usize, rgb: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    WebPEncoder::new_lossless(&mut out)
        .write_image(rgb, width as u32, height as u32, ExtendedColorType::Rgb8)
        .unwrap();
    out
}
