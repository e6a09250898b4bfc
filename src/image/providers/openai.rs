//! OpenAI stylization provider (image edit endpoint).

use crate::config::DEFAULT_OPENAI_BASE_URL;
use crate::error::{Result, StylizeError};
use crate::image::preprocess::PreparedImage;
use crate::image::provider::StyleProvider;
use crate::image::types::{GenerationMetadata, ProviderKind, StylizedImage, UploadedImage};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Instant;

const EDIT_MODEL: &str = "dall-e-3";

/// Fixed prompt sent with every edit request.
pub const STYLE_PROMPT: &str = "Convert this image to Studio Ghibli style with vibrant colors, \
soft lighting, and hand-drawn animation look.";

/// Builder for OpenAiProvider.
#[derive(Debug, Clone, Default)]
pub struct OpenAiProviderBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    client: Option<reqwest::Client>,
}

impl OpenAiProviderBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Falls back to `OPENAI_API_KEY` env var.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the API base URL (defaults to `https://api.openai.com/v1`).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Reuses an existing HTTP client.
    pub fn client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Builds the provider, resolving the API key.
    pub fn build(self) -> Result<OpenAiProvider> {
        let api_key = self
            .api_key
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                StylizeError::Config("OpenAI API key not configured on server.".into())
            })?;

        Ok(OpenAiProvider {
            client: self.client.unwrap_or_default(),
            api_key,
            base_url: self
                .base_url
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
        })
    }
}

/// OpenAI stylization provider: preprocess, then edit.
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAiProvider {
    /// Creates a new `OpenAiProviderBuilder`.
    pub fn builder() -> OpenAiProviderBuilder {
        OpenAiProviderBuilder::new()
    }

    fn edit_form(prepared: PreparedImage) -> Result<reqwest::multipart::Form> {
        let size = prepared.size_param();
        let image_part = png_part(prepared.image, "image.png")?;
        let mask_part = png_part(prepared.mask, "mask.png")?;

        Ok(reqwest::multipart::Form::new()
            .text("model", EDIT_MODEL)
            .text("prompt", STYLE_PROMPT)
            .text("n", "1")
            .text("size", size)
            .text("response_format", "url")
            .part("image", image_part)
            .part("mask", mask_part))
    }
}

fn png_part(data: Vec<u8>, filename: &'static str) -> Result<reqwest::multipart::Part> {
    reqwest::multipart::Part::bytes(data)
        .file_name(filename)
        .mime_str("image/png")
        .map_err(StylizeError::from)
}

#[async_trait]
impl StyleProvider for OpenAiProvider {
    async fn stylize(&self, image: &UploadedImage) -> Result<StylizedImage> {
        let start = Instant::now();

        let prepared = PreparedImage::from_upload_async(image.data.clone()).await?;
        tracing::debug!(
            image_bytes = prepared.image.len(),
            mask_bytes = prepared.mask.len(),
            "calling OpenAI image edit"
        );

        let response = self
            .client
            .post(format!("{}/images/edits", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .multipart(Self::edit_form(prepared)?)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "OpenAI image edit failed");
            return Err(StylizeError::from_upstream(status.as_u16(), &text));
        }

        let edit_response: ImagesResponse = response.json().await?;

        let url = edit_response
            .data
            .into_iter()
            .next()
            .and_then(|d| d.url)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| {
                StylizeError::ContractViolation("OpenAI did not return an image URL.".into())
            })?;

        Ok(StylizedImage {
            url,
            prompt: STYLE_PROMPT.to_string(),
            description: None,
            provider: ProviderKind::OpenAI,
            metadata: GenerationMetadata {
                model: Some(EDIT_MODEL.to_string()),
                duration_ms: Some(start.elapsed().as_millis() as u64),
            },
        })
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAI
    }
}

#[derive(Debug, Deserialize)]
struct ImagesResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    #[serde(default)]
    url: Option<String>,
}
