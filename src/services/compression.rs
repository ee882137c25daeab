use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};

use crate::config::CompressionConfig;
use crate::models::submission::SourceImage;

/// JPEG qualities tried in order until the output fits the size budget.
const QUALITY_STEPS: &[u8] = &[90, 80, 70, 60, 50, 40];

/// Shrinks a selfie before it is uploaded.
#[async_trait]
pub trait Compressor: Send + Sync {
    /// Produce the upload payload, renamed to `object_name`.
    async fn compress(
        &self,
        image: &SourceImage,
        object_name: &str,
    ) -> Result<SourceImage, CompressionError>;
}

/// Downscales to a maximum edge and re-encodes as JPEG under a byte budget.
pub struct ImageCompressor {
    config: CompressionConfig,
}

impl ImageCompressor {
    pub fn new(config: CompressionConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Compressor for ImageCompressor {
    async fn compress(
        &self,
        image: &SourceImage,
        object_name: &str,
    ) -> Result<SourceImage, CompressionError> {
        let bytes = image.bytes.clone();
        let config = self.config.clone();

        let compressed = tokio::task::spawn_blocking(move || compress_jpeg(&bytes, &config))
            .await
            .map_err(|e| CompressionError::Join(e.to_string()))??;

        tracing::debug!(
            original_bytes = image.len(),
            compressed_bytes = compressed.len(),
            object_name = %object_name,
            "Image compressed"
        );

        Ok(SourceImage::new(object_name, "image/jpeg", compressed))
    }
}

/// Decode, downscale and encode; returns the smallest attempt if none fits.
pub fn compress_jpeg(bytes: &[u8], config: &CompressionConfig) -> Result<Vec<u8>, CompressionError> {
    let decoded = image::load_from_memory(bytes)?;
    let resized = downscale(decoded, config.max_dimension);
    let rgb = resized.to_rgb8();

    let mut smallest: Option<Vec<u8>> = None;
    for &quality in QUALITY_STEPS {
        let mut buf = Vec::new();
        JpegEncoder::new_with_quality(&mut buf, quality).encode_image(&rgb)?;

        if buf.len() <= config.max_bytes {
            return Ok(buf);
        }
        if smallest.as_ref().map_or(true, |s| buf.len() < s.len()) {
            smallest = Some(buf);
        }
    }

    smallest.ok_or(CompressionError::Empty)
}

fn downscale(image: DynamicImage, max_dimension: u32) -> DynamicImage {
    let (width, height) = image.dimensions();
    if width.max(height) <= max_dimension {
        return image;
    }
    image.resize(max_dimension, max_dimension, FilterType::Triangle)
}

#[derive(Debug, thiserror::Error)]
pub enum CompressionError {
    #[error("Image codec error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Compression worker failed: {0}")]
    Join(String),

    #[error("Encoder produced no output")]
    Empty,
}
