//! Request handlers.

use super::error::ApiError;
use super::AppState;
use crate::error::StylizeError;
use crate::image::providers::build_provider;
use crate::image::{ProviderKind, StylizedImage, UploadedImage};
use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
        Multipart, State,
    },
    http::StatusCode,
    response::Html,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Successful `/api/stylize` response.
#[derive(Debug, Serialize, Deserialize)]
pub struct StylizeResponse {
    /// Provider-hosted URL of the generated image.
    pub url: String,
    /// Prompt the image was generated from.
    pub prompt: String,
    /// Provider that handled the request.
    pub model: ProviderKind,
    /// Vision description; only present for Grok.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl From<StylizedImage> for StylizeResponse {
    fn from(image: StylizedImage) -> Self {
        Self {
            url: image.url,
            prompt: image.prompt,
            model: image.provider,
            description: image.description,
        }
    }
}

/// Parsed `/api/stylize` form.
struct StylizeForm {
    image: Option<UploadedImage>,
    model: Option<String>,
}

// Any malformed or oversized form is the caller's fault.
fn form_error(err: MultipartError) -> ApiError {
    tracing::debug!(status = %err.status(), "multipart parse failed");
    ApiError::bad_request(err.body_text())
}

async fn read_form(mut multipart: Multipart) -> Result<StylizeForm, ApiError> {
    let mut form = StylizeForm {
        image: None,
        model: None,
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(form_error)?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("image") => {
                let media_type = field.content_type().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(form_error)?;
                // An empty file input still submits a zero-length part
                if !data.is_empty() {
                    let mut upload = UploadedImage::new(data.to_vec());
                    upload.media_type = media_type;
                    form.image = Some(upload);
                }
            }
            Some("model") => {
                let text = field
                    .text()
                    .await
                    .map_err(form_error)?;
                form.model = Some(text);
            }
            _ => {}
        }
    }

    Ok(form)
}

/// `POST /api/stylize`: multipart `image` + optional `model`.
pub async fn stylize_handler(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<StylizeResponse>, ApiError> {
    let multipart = multipart.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let form = read_form(multipart).await?;

    let image = form
        .image
        .ok_or_else(|| ApiError::bad_request("No image file provided"))?;

    let kind = match form.model.as_deref().map(str::trim) {
        None | Some("") => ProviderKind::default(),
        Some(model) => model.parse::<ProviderKind>()?,
    };

    let provider = build_provider(kind, &state.config, state.client.clone())?;

    tracing::info!(model = %kind, bytes = image.data.len(), "stylizing image");
    let result = provider.stylize(&image).await?;
    tracing::info!(
        model = %kind,
        duration_ms = result.metadata.duration_ms,
        "stylization complete"
    );

    Ok(Json(result.into()))
}

/// `/api/convert` request body.
#[derive(Debug, Deserialize)]
pub struct ConvertRequest {
    /// Base64 image data.
    #[serde(default)]
    pub image: Option<String>,
}

/// `/api/convert` response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ConvertResponse {
    /// The request's image, unchanged.
    #[serde(rename = "convertedImage")]
    pub converted_image: String,
}

/// `POST /api/convert`: echoes the base64 image unchanged.
pub async fn convert_handler(
    payload: Result<Json<ConvertRequest>, JsonRejection>,
) -> Result<Json<ConvertResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let image = request
        .image
        .filter(|i| !i.is_empty())
        .ok_or_else(|| ApiError::from(StylizeError::Validation("No image data provided".into())))?;

    tracing::debug!(chars = image.len(), "echoing image through convert placeholder");
    Ok(Json(ConvertResponse {
        converted_image: image,
    }))
}

/// Per-provider credential presence.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProviderStatus {
    /// Value accepted in the `model` form field.
    pub model: ProviderKind,
    /// Human-readable provider name.
    pub name: String,
    /// Whether the provider's API key is set.
    pub configured: bool,
}

/// `GET /api/health` response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `ok` while the server is up.
    pub status: String,
    /// Credential presence per provider.
    pub providers: Vec<ProviderStatus>,
}

/// `GET /api/health`: liveness plus which providers have keys.
pub async fn health_handler(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let providers = ProviderKind::ALL
        .into_iter()
        .map(|kind| ProviderStatus {
            model: kind,
            name: kind.display_name().to_string(),
            configured: state.config.api_key(kind).is_some(),
        })
        .collect();

    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".into(),
            providers,
        }),
    )
}

/// `GET /`: the single-page UI.
pub async fn index_handler() -> Html<&'static str> {
    Html(crate::ui::INDEX_HTML)
}
