//! Runtime configuration.
//!
//! Credentials are captured once at startup but only checked when a request
//! selects the matching provider, so the server starts without any keys.

use crate::image::ProviderKind;

/// Default xAI API base URL.
pub const DEFAULT_XAI_BASE_URL: &str = "https://api.x.ai/v1";
/// Default OpenAI API base URL.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
/// Default cap on request bodies (uploads), 20 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Provider credentials and endpoints.
#[derive(Clone, Default)]
pub struct Config {
    /// xAI API key (`XAI_API_KEY`).
    pub xai_api_key: Option<String>,
    /// OpenAI API key (`OPENAI_API_KEY`).
    pub openai_api_key: Option<String>,
    /// xAI API base URL, without trailing slash.
    pub xai_base_url: Option<String>,
    /// OpenAI API base URL, without trailing slash.
    pub openai_base_url: Option<String>,
    /// Maximum accepted request body size in bytes.
    pub max_upload_bytes: Option<usize>,
}

impl Config {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Self {
        Self {
            xai_api_key: std::env::var("XAI_API_KEY").ok(),
            openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
            xai_base_url: std::env::var("XAI_BASE_URL").ok(),
            openai_base_url: std::env::var("OPENAI_BASE_URL").ok(),
            max_upload_bytes: std::env::var("GHIBLIFY_MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|v| v.parse().ok()),
        }
    }

    /// Returns the API key for `kind`, treating blank values as absent.
    pub fn api_key(&self, kind: ProviderKind) -> Option<&str> {
        let key = match kind {
            ProviderKind::Grok => self.xai_api_key.as_deref(),
            ProviderKind::OpenAI => self.openai_api_key.as_deref(),
        };
        key.map(str::trim).filter(|k| !k.is_empty())
    }

    /// Returns the API base URL for `kind`.
    pub fn base_url(&self, kind: ProviderKind) -> &str {
        let url = match kind {
            ProviderKind::Grok => self.xai_base_url.as_deref(),
            ProviderKind::OpenAI => self.openai_base_url.as_deref(),
        };
        url.map(|u| u.trim_end_matches('/'))
            .filter(|u| !u.is_empty())
            .unwrap_or(match kind {
                ProviderKind::Grok => DEFAULT_XAI_BASE_URL,
                ProviderKind::OpenAI => DEFAULT_OPENAI_BASE_URL,
            })
    }

    /// Returns the request body cap in bytes.
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES)
    }
}

// Keys must never end up in logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("xai_api_key", &self.xai_api_key.as_ref().map(|_| "<set>"))
            .field(
                "openai_api_key",
                &self.openai_api_key.as_ref().map(|_| "<set>"),
            )
            .field("xai_base_url", &self.base_url(ProviderKind::Grok))
            .field("openai_base_url", &self.base_url(ProviderKind::OpenAI))
            .field("max_upload_bytes", &self.max_upload_bytes())
            .finish()
    }
}
