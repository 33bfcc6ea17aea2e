//! Image Normalizer
//!
//! 上传的图片统一缩放到固定宽度，重新编码为 JPEG，并以 data URL 的形式
//! 直接写入商家记录的 `photo` 字段。

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::DynamicImage;
use image::imageops::FilterType;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

/// 默认最大宽度 (px)
pub const DEFAULT_MAX_WIDTH: u32 = 800;
/// 默认 JPEG 质量 (0-1)
pub const DEFAULT_QUALITY: f32 = 0.7;
/// 默认上传大小上限 (5MB)
pub const DEFAULT_MAX_BYTES: usize = 5 * 1024 * 1024;

const DATA_URL_PREFIX: &str = "data:image/jpeg;base64,";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageError {
    #[error("Empty image provided")]
    Empty,

    #[error("Image too large: {size} bytes (max {max} bytes)")]
    TooLarge { size: usize, max: usize },

    #[error("Invalid image: {0}")]
    Decode(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),
}

#[derive(Debug, Clone)]
pub struct ImageConfig {
    pub max_width: u32,
    /// JPEG 质量，0-1
    pub quality: f32,
    /// 窄于 `max_width` 的图片是否放大
    pub allow_upscale: bool,
    pub max_bytes: usize,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_WIDTH,
            quality: DEFAULT_QUALITY,
            allow_upscale: false,
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }
}

/// 规范化结果
#[derive(Debug, Clone, Serialize)]
pub struct NormalizedImage {
    pub data_url: String,
    pub width: u32,
    pub height: u32,
    /// 编码后的 JPEG 字节数
    pub bytes: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ImageNormalizer {
    config: Arc<ImageConfig>,
}

impl ImageNormalizer {
    pub fn new(config: ImageConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &ImageConfig {
        &self.config
    }

    /// 目标尺寸：宽度按 `max_width` 缩放，高度向下取整且至少为 1
    pub fn target_size(&self, width: u32, height: u32) -> (u32, u32) {
        let max_width = self.config.max_width.max(1);
        if width <= max_width && !self.config.allow_upscale {
            return (width, height);
        }
        let scale = f64::from(max_width) / f64::from(width.max(1));
        let scaled = (f64::from(height) * scale).floor() as u32;
        (max_width, scaled.max(1))
    }

    fn jpeg_quality(&self) -> u8 {
        (self.config.quality * 100.0).round().clamp(1.0, 100.0) as u8
    }

    pub fn normalize(&self, data: &[u8]) -> Result<NormalizedImage, ImageError> {
        if data.is_empty() {
            return Err(ImageError::Empty);
        }
        if data.len() > self.config.max_bytes {
            return Err(ImageError::TooLarge {
                size: data.len(),
                max: self.config.max_bytes,
            });
        }

        let img = image::load_from_memory(data).map_err(|e| ImageError::Decode(e.to_string()))?;
        let (width, height) = self.target_size(img.width(), img.height());
        let img = if (width, height) == (img.width(), img.height()) {
            img
        } else {
            img.resize_exact(width, height, FilterType::Triangle)
        };

        let encoded = self.encode_jpeg(&img)?;
        tracing::debug!(
            source_bytes = data.len(),
            bytes = encoded.len(),
            width,
            height,
            "Image normalized"
        );

        let mut data_url = String::with_capacity(DATA_URL_PREFIX.len() + encoded.len() * 4 / 3 + 4);
        data_url.push_str(DATA_URL_PREFIX);
        STANDARD.encode_string(&encoded, &mut data_url);

        Ok(NormalizedImage {
            data_url,
            width,
            height,
            bytes: encoded.len(),
        })
    }

    /// 在阻塞线程池上执行 [`normalize`](Self::normalize)
    pub async fn normalize_async(&self, data: Vec<u8>) -> Result<NormalizedImage, ImageError> {
        let normalizer = self.clone();
        tokio::task::spawn_blocking(move || normalizer.normalize(&data))
            .await
            .map_err(|e| ImageError::Encode(format!("worker failed: {e}")))?
    }

    fn encode_jpeg(&self, img: &DynamicImage) -> Result<Vec<u8>, ImageError> {
        let mut buffer = Vec::new();
        let encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, self.jpeg_quality());
        img.to_rgb8()
            .write_with_encoder(encoder)
            .map_err(|e| ImageError::Encode(e.to_string()))?;
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbaImage};
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            image::Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
        });
        let mut out = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .unwrap();
        out
    }

    fn decode_data_url(url: &str) -> DynamicImage {
        let payload = url.strip_prefix(DATA_URL_PREFIX).unwrap();
        let bytes = STANDARD.decode(payload).unwrap();
        assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Jpeg);
        image::load_from_memory(&bytes).unwrap()
    }

    #[test]
    fn test_wide_image_is_scaled_to_max_width() {
        let normalizer = ImageNormalizer::default();
        let out = normalizer.normalize(&png(1600, 1200)).unwrap();
        assert_eq!((out.width, out.height), (800, 600));
        let decoded = decode_data_url(&out.data_url);
        assert_eq!((decoded.width(), decoded.height()), (800, 600));
    }

    #[test]
    fn test_target_size_floors_height() {
        let normalizer = ImageNormalizer::default();
        assert_eq!(normalizer.target_size(1601, 1201), (800, 600));
        assert_eq!(normalizer.target_size(10_000, 1), (800, 1));
    }

    #[test]
    fn test_narrow_image_keeps_size_unless_upscale_enabled() {
        let keep = ImageNormalizer::default();
        assert_eq!(keep.target_size(400, 300), (400, 300));

        let upscale = ImageNormalizer::new(ImageConfig {
            allow_upscale: true,
            ..ImageConfig::default()
        });
        assert_eq!(upscale.target_size(400, 300), (800, 600));
        let out = upscale.normalize(&png(400, 300)).unwrap();
        assert_eq!((out.width, out.height), (800, 600));
    }

    #[test]
    fn test_rejects_bad_input() {
        let normalizer = ImageNormalizer::new(ImageConfig {
            max_bytes: 16,
            ..ImageConfig::default()
        });
        assert!(matches!(normalizer.normalize(&[]), Err(ImageError::Empty)));
        assert!(matches!(
            normalizer.normalize(&[0u8; 17]),
            Err(ImageError::TooLarge { size: 17, max: 16 })
        ));
        assert!(matches!(
            ImageNormalizer::default().normalize(b"definitely not an image"),
            Err(ImageError::Decode(_))
        ));
    }

    #[test]
    fn test_quality_maps_to_percent() {
        assert_eq!(ImageNormalizer::default().jpeg_quality(), 70);
    }

    #[tokio::test]
    async fn test_normalize_async() {
        let out = ImageNormalizer::default()
            .normalize_async(png(1000, 500))
            .await
            .unwrap();
        assert_eq!((out.width, out.height), (800, 400));
        assert!(out.data_url.starts_with(DATA_URL_PREFIX));
    }
}
