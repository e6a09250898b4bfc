//! Core types for image stylization.

use crate::error::StylizeError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Image formats accepted from uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG format (lossless).
    #[default]
    Png,
    /// JPEG format (lossy).
    Jpeg,
    /// WebP format.
    WebP,
    /// GIF format.
    Gif,
}

impl ImageFormat {
    /// Returns the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
            Self::Gif => "image/gif",
        }
    }

    /// Detects image format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 12 {
            return None;
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        // WebP: RIFF....WEBP
        if data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some(Self::WebP);
        }

        if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            return Some(Self::Gif);
        }

        None
    }
}

/// Which provider stylizes the image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// xAI Grok: vision description followed by text-to-image generation.
    #[default]
    Grok,
    /// OpenAI: image edit with a transparent mask.
    #[serde(rename = "openai")]
    OpenAI,
}

impl ProviderKind {
    /// All selectable providers, in UI order.
    pub const ALL: [ProviderKind; 2] = [ProviderKind::Grok, ProviderKind::OpenAI];

    /// Returns the wire identifier (`"grok"` or `"openai"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Grok => "grok",
            Self::OpenAI => "openai",
        }
    }

    /// Returns the display name of this provider.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Grok => "Grok (xAI)",
            Self::OpenAI => "DALL-E (OpenAI)",
        }
    }

    /// Returns the environment variable holding this provider's API key.
    pub fn api_key_env_var(&self) -> &'static str {
        match self {
            Self::Grok => "XAI_API_KEY",
            Self::OpenAI => "OPENAI_API_KEY",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = StylizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "grok" => Ok(Self::Grok),
            "openai" => Ok(Self::OpenAI),
            other => Err(StylizeError::Validation(format!(
                "Unsupported model '{other}'. Expected 'grok' or 'openai'."
            ))),
        }
    }
}

/// An image uploaded by the caller. Lives for one request.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    /// Raw image bytes.
    pub data: Vec<u8>,
    /// Media type declared by the uploader, if any.
    pub media_type: Option<String>,
}

impl UploadedImage {
    /// Creates an upload from raw bytes.
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            media_type: None,
        }
    }

    /// Sets the declared media type.
    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    /// Returns the media type to advertise for these bytes.
    ///
    /// Prefers the declared `image/*` type, then magic-byte detection,
    /// then `image/png`.
    pub fn effective_media_type(&self) -> &str {
        match self.media_type.as_deref() {
            Some(declared) if declared.starts_with("image/") => declared,
            _ => ImageFormat::from_magic_bytes(&self.data)
                .map(|f| f.mime_type())
                .unwrap_or("image/png"),
        }
    }

    /// Returns the image as a base64 data URL.
    pub fn to_data_url(&self) -> String {
        use base64::Engine;
        format!(
            "data:{};base64,{}",
            self.effective_media_type(),
            base64::engine::general_purpose::STANDARD.encode(&self.data)
        )
    }
}

/// Metadata about the stylization run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationMetadata {
    /// Provider model that produced the image.
    pub model: Option<String>,
    /// Total duration of all provider calls in milliseconds.
    pub duration_ms: Option<u64>,
}

/// The outcome of a stylization: a provider-hosted image reference.
#[derive(Debug, Clone)]
#[must_use = "stylized image reference should be returned to the caller"]
pub struct StylizedImage {
    /// URL of the generated image, hosted by the provider.
    pub url: String,
    /// Prompt sent to the generation or edit endpoint.
    pub prompt: String,
    /// Untruncated vision description (Grok only).
    pub description: Option<String>,
    /// Provider that produced the image.
    pub provider: ProviderKind,
    /// Run metadata.
    pub metadata: GenerationMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: [u8; 12] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
    const JPEG_MAGIC: [u8; 12] = [0xFF, 0xD8, 0xFF, 0xE0, 0, 0, 0, 0, 0, 0, 0, 0];
    const WEBP_MAGIC: [u8; 12] = *b"RIFF\x00\x00\x00\x00WEBP";

    #[test]
    fn test_format_from_magic_bytes() {
        assert_eq!(
            ImageFormat::from_magic_bytes(&PNG_MAGIC),
            Some(ImageFormat::Png)
        );
        assert_eq!(
            ImageFormat::from_magic_bytes(&JPEG_MAGIC),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(
            ImageFormat::from_magic_bytes(&WEBP_MAGIC),
            Some(ImageFormat::WebP)
        );
        assert_eq!(ImageFormat::from_magic_bytes(b"GIF89a\0\0\0\0\0\0"), Some(ImageFormat::Gif));
        assert_eq!(ImageFormat::from_magic_bytes(b"short"), None);
    }

    #[test]
    fn test_provider_kind_parse() {
        assert_eq!("grok".parse::<ProviderKind>().unwrap(), ProviderKind::Grok);
        assert_eq!(" OpenAI ".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAI);

        let err = "midjourney".parse::<ProviderKind>().unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_provider_kind_display() {
        assert_eq!(ProviderKind::Grok.to_string(), "grok");
        assert_eq!(ProviderKind::OpenAI.to_string(), "openai");
        assert_eq!(ProviderKind::default(), ProviderKind::Grok);
    }

    #[test]
    fn test_provider_kind_serde() {
        let json = serde_json::to_string(&ProviderKind::OpenAI).unwrap();
        assert_eq!(json, "\"openai\"");
    }

    #[test]
    fn test_effective_media_type() {
        let declared = UploadedImage::new(PNG_MAGIC.to_vec()).with_media_type("image/jpeg");
        assert_eq!(declared.effective_media_type(), "image/jpeg");

        let sniffed = UploadedImage::new(JPEG_MAGIC.to_vec()).with_media_type("application/octet-stream");
        assert_eq!(sniffed.effective_media_type(), "image/jpeg");

        let unknown = UploadedImage::new(vec![1, 2, 3]);
        assert_eq!(unknown.effective_media_type(), "image/png");
    }

    #[test]
    fn test_to_data_url() {
        let img = UploadedImage::new(vec![1, 2, 3]).with_media_type("image/webp");
        assert_eq!(img.to_data_url(), "data:image/webp;base64,AQID");
    }
}
