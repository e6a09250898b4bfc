//! Image normalization for the OpenAI edit endpoint.
//!
//! The edit endpoint wants a square RGBA PNG and a mask of identical size.
//! Uploads of any decodable format and dimensions are cover-fitted onto a
//! fixed canvas; the mask is fully transparent so the whole image is
//! eligible for editing.

use crate::error::{Result, StylizeError};
use ::image::imageops::FilterType;
use ::image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

/// Side length of the square canvas sent to the edit endpoint.
pub const EDIT_IMAGE_SIZE: u32 = 1024;

/// A preprocessed image and its matching mask, both PNG-encoded.
#[derive(Debug, Clone)]
pub struct PreparedImage {
    /// Square RGBA PNG of the upload.
    pub image: Vec<u8>,
    /// Fully transparent RGBA PNG of the same size.
    pub mask: Vec<u8>,
    /// Side length of both canvases.
    pub size: u32,
}

impl PreparedImage {
    /// Preprocesses raw upload bytes for the edit endpoint.
    pub fn from_upload(data: &[u8]) -> Result<Self> {
        Ok(Self {
            image: prepare_for_edit(data, EDIT_IMAGE_SIZE)?,
            mask: transparent_mask(EDIT_IMAGE_SIZE)?,
            size: EDIT_IMAGE_SIZE,
        })
    }

    /// Async version of [`from_upload`](Self::from_upload) that runs on a
    /// blocking thread.
    ///
    /// Decoding and Lanczos resampling of a large upload take long enough to
    /// stall a runtime worker, so request handlers go through this.
    pub async fn from_upload_async(data: Vec<u8>) -> Result<Self> {
        tokio::task::spawn_blocking(move || Self::from_upload(&data)).await?
    }

    /// Returns the size string the edit endpoint expects (e.g. `1024x1024`).
    pub fn size_param(&self) -> String {
        format!("{}x{}", self.size, self.size)
    }
}

/// Decodes `data`, cover-fits it onto a `size`×`size` canvas and encodes RGBA PNG.
pub fn prepare_for_edit(data: &[u8], size: u32) -> Result<Vec<u8>> {
    let img = ::image::load_from_memory(data)?;
    tracing::debug!(
        width = img.width(),
        height = img.height(),
        target = size,
        "preprocessing upload for edit"
    );

    // resize_to_fill scales to cover, then center-crops
    let filled = img.resize_to_fill(size, size, FilterType::Lanczos3);
    encode_png(DynamicImage::ImageRgba8(filled.to_rgba8()))
}

/// Builds a `size`×`size` PNG whose every pixel has alpha 0.
pub fn transparent_mask(size: u32) -> Result<Vec<u8>> {
    let mask = RgbaImage::from_pixel(size, size, Rgba([0, 0, 0, 0]));
    encode_png(DynamicImage::ImageRgba8(mask))
}

fn encode_png(img: DynamicImage) -> Result<Vec<u8>> {
    encode_as(img, ImageFormat::Png)
}

// Encoding our own buffer is never the caller's fault.
fn encode_as(img: DynamicImage, format: ImageFormat) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, format)
        .map_err(|e| StylizeError::Internal(format!("failed to encode {format:?}: {e}")))?;
    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::image::{GenericImageView, Rgb, RgbImage};

    fn encode(img: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        img.write_to(&mut buffer, format).unwrap();
        buffer.into_inner()
    }

    #[test]
    fn test_prepare_wide_jpeg_becomes_square_rgba_png() {
        let src = RgbImage::from_pixel(300, 120, Rgb([200, 30, 30]));
        let jpeg = encode(DynamicImage::ImageRgb8(src), ImageFormat::Jpeg);

        let out = prepare_for_edit(&jpeg, 64).unwrap();
        assert_eq!(::image::guess_format(&out).unwrap(), ImageFormat::Png);

        let decoded = ::image::load_from_memory(&out).unwrap();
        assert_eq!(decoded.dimensions(), (64, 64));
        assert!(decoded.color().has_alpha());
    }

    #[test]
    fn test_prepare_tall_and_tiny_inputs_hit_target_size() {
        for (w, h) in [(10, 400), (1, 1), (2048, 2048)] {
            let src = RgbaImage::from_pixel(w, h, Rgba([1, 2, 3, 255]));
            let png = encode(DynamicImage::ImageRgba8(src), ImageFormat::Png);
            let out = prepare_for_edit(&png, 32).unwrap();
            let decoded = ::image::load_from_memory(&out).unwrap();
            assert_eq!(decoded.dimensions(), (32, 32), "input {w}x{h}");
        }
    }

    #[test]
    fn test_prepare_rejects_garbage() {
        let err = prepare_for_edit(b"definitely not an image", 64).unwrap_err();
        assert!(matches!(err, StylizeError::Decode(_)));
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_encode_failure_is_server_error() {
        // JPEG has no alpha channel, so the encoder refuses RGBA input
        let rgba = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 0]));
        let err = encode_as(DynamicImage::ImageRgba8(rgba), ImageFormat::Jpeg).unwrap_err();
        assert!(matches!(err, StylizeError::Internal(_)));
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn test_mask_is_fully_transparent() {
        let mask = transparent_mask(48).unwrap();
        let decoded = ::image::load_from_memory(&mask).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (48, 48));
        assert!(decoded.pixels().all(|p| p.0[3] == 0));
    }

    #[test]
    fn test_prepared_image_matches_mask_dimensions() {
        let src = RgbImage::from_pixel(640, 480, Rgb([10, 120, 60]));
        let png = encode(DynamicImage::ImageRgb8(src), ImageFormat::Png);

        let prepared = PreparedImage::from_upload(&png).unwrap();
        let image = ::image::load_from_memory(&prepared.image).unwrap();
        let mask = ::image::load_from_memory(&prepared.mask).unwrap();

        assert_eq!(image.dimensions(), (EDIT_IMAGE_SIZE, EDIT_IMAGE_SIZE));
        assert_eq!(mask.dimensions(), image.dimensions());
        assert_eq!(prepared.size_param(), "1024x1024");
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_async_preprocess_leaves_runtime_responsive() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;
        use std::time::Duration;

        let src = RgbImage::from_fn(3000, 2000, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 90])
        });
        let jpeg = encode(DynamicImage::ImageRgb8(src), ImageFormat::Jpeg);

        let ticks = Arc::new(AtomicUsize::new(0));
        let ticker = {
            let ticks = ticks.clone();
            tokio::spawn(async move {
                loop {
                    tokio::time::sleep(Duration::from_millis(1)).await;
                    ticks.fetch_add(1, Ordering::Relaxed);
                }
            })
        };
        tokio::task::yield_now().await;

        let prepared = PreparedImage::from_upload_async(jpeg).await.unwrap();
        ticker.abort();

        assert_eq!(prepared.size, EDIT_IMAGE_SIZE);
        // On a single-threaded runtime the ticker only advances if the
        // resize ran elsewhere.
        assert!(ticks.load(Ordering::Relaxed) >= 2);
    }

    #[tokio::test]
    async fn test_async_preprocess_rejects_garbage() {
        let err = PreparedImage::from_upload_async(b"nope".to_vec())
            .await
            .unwrap_err();
        assert!(matches!(err, StylizeError::Decode(_)));
    }
}
