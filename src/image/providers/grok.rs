//! Grok (xAI) stylization provider.
//!
//! Grok cannot edit an input image in the style we want, so the upload is
//! first described by the vision model and the description is turned into a
//! text-to-image prompt.

use crate::config::DEFAULT_XAI_BASE_URL;
use crate::error::{Result, StylizeError};
use crate::image::provider::StyleProvider;
use crate::image::types::{GenerationMetadata, ProviderKind, StylizedImage, UploadedImage};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;

const VISION_MODEL: &str = "grok-2-vision-1212";
const IMAGE_MODEL: &str = "grok-2-image";

const VISION_SYSTEM_PROMPT: &str = "You are an expert at describing images in detail. \
Restyle image in studio ghibli style, keep all details. \
Limit your description to 100 words maximum.";
const VISION_USER_PROMPT: &str =
    "Describe this image briefly. Focus on main subjects and style. Keep it under 100 words.";
const VISION_MAX_TOKENS: u32 = 150;

/// Descriptions longer than this many characters are truncated before use.
pub const DESCRIPTION_CHAR_LIMIT: usize = 300;
/// Appended to a truncated description.
pub const TRUNCATION_MARKER: &str = "...";

/// Shortens `description` to [`DESCRIPTION_CHAR_LIMIT`] characters plus
/// [`TRUNCATION_MARKER`] when it is longer than the limit.
pub fn truncate_description(description: &str) -> String {
    match description.char_indices().nth(DESCRIPTION_CHAR_LIMIT) {
        Some((cut, _)) => format!("{}{}", &description[..cut], TRUNCATION_MARKER),
        None => description.to_string(),
    }
}

/// Builds the text-to-image prompt from a (possibly truncated) description.
pub fn compose_prompt(description: &str) -> String {
    format!(
        "Studio Ghibli style: {description}. \
Vibrant colors, hand-drawn animation look, dreamlike quality."
    )
}

/// Builder for GrokProvider.
#[derive(Debug, Clone, Default)]
pub struct GrokProviderBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    client: Option<reqwest::Client>,
}

impl GrokProviderBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Falls back to `XAI_API_KEY` env var.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the API base URL (defaults to `https://api.x.ai/v1`).
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
    pub fn build(self) -> Result<GrokProvider> {
        let api_key = self
            .api_key
            .or_else(|| std::env::var("XAI_API_KEY").ok())
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| StylizeError::Config("Grok API key not configured on server.".into()))?;

        Ok(GrokProvider {
            client: self.client.unwrap_or_default(),
            api_key,
            base_url: self
                .base_url
                .unwrap_or_else(|| DEFAULT_XAI_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
        })
    }
}

/// Grok stylization provider: describe, then generate.
pub struct GrokProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GrokProvider {
    /// Creates a new `GrokProviderBuilder`.
    pub fn builder() -> GrokProviderBuilder {
        GrokProviderBuilder::new()
    }

    async fn post_json<B: Serialize, T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::warn!(path, status = status.as_u16(), "xAI request failed");
            return Err(StylizeError::from_upstream(status.as_u16(), &text));
        }

        Ok(response.json().await?)
    }

    /// Asks the vision model to describe the upload.
    async fn describe(&self, image: &UploadedImage) -> Result<String> {
        let request = VisionRequest::for_image(image);
        let response: ChatResponse = self.post_json("/chat/completions", &request).await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| StylizeError::Upstream {
                status: None,
                message: "Grok vision response contained no description".into(),
            })
    }

    /// Generates one image for `prompt`, returning its URL.
    async fn generate_url(&self, prompt: &str) -> Result<String> {
        let request = GenerationRequest::new(prompt);
        let response: ImagesResponse = self.post_json("/images/generations", &request).await?;

        response
            .data
            .into_iter()
            .next()
            .and_then(|d| d.url)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| {
                StylizeError::ContractViolation("Grok did not return an image URL.".into())
            })
    }
}

#[async_trait]
impl StyleProvider for GrokProvider {
    async fn stylize(&self, image: &UploadedImage) -> Result<StylizedImage> {
        let start = Instant::now();

        tracing::debug!(bytes = image.data.len(), "describing image with Grok vision");
        let description = self.describe(image).await?;
        tracing::debug!(chars = description.chars().count(), "image description generated");

        let prompt = compose_prompt(&truncate_description(&description));

        tracing::debug!("generating Ghibli image with Grok");
        let url = self.generate_url(&prompt).await?;

        Ok(StylizedImage {
            url,
            prompt,
            description: Some(description),
            provider: ProviderKind::Grok,
            metadata: GenerationMetadata {
                model: Some(IMAGE_MODEL.to_string()),
                duration_ms: Some(start.elapsed().as_millis() as u64),
            },
        })
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Grok
    }
}

#[derive(Debug, Serialize)]
struct VisionRequest {
    model: &'static str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

impl VisionRequest {
    fn for_image(image: &UploadedImage) -> Self {
        Self {
            model: VISION_MODEL,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: MessageContent::Text(VISION_SYSTEM_PROMPT.to_string()),
                },
                ChatMessage {
                    role: "user",
                    content: MessageContent::Parts(vec![
                        ContentPart::Text {
                            text: VISION_USER_PROMPT.to_string(),
                        },
                        ContentPart::ImageUrl {
                            image_url: ImageUrl {
                                url: image.to_data_url(),
                            },
                        },
                    ]),
                },
            ],
            max_tokens: VISION_MAX_TOKENS,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: MessageContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct GenerationRequest {
    model: &'static str,
    prompt: String,
    n: u32,
    response_format: &'static str,
}

impl GenerationRequest {
    fn new(prompt: &str) -> Self {
        Self {
            model: IMAGE_MODEL,
            prompt: prompt.to_string(),
            n: 1,
            response_format: "url",
        }
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
