//! Stylization providers.

mod grok;
mod openai;

pub use grok::{
    compose_prompt, truncate_description, GrokProvider, GrokProviderBuilder,
    DESCRIPTION_CHAR_LIMIT, TRUNCATION_MARKER,
};
pub use openai::{OpenAiProvider, OpenAiProviderBuilder, STYLE_PROMPT};

use crate::config::Config;
use crate::error::{Result, StylizeError};
use crate::image::provider::StyleProvider;
use crate::image::types::ProviderKind;

/// Builds the provider selected by `kind` from `config`.
///
/// Fails with [`StylizeError::Config`] before any network activity when the
/// provider's credential is missing. The env-var fallback of the individual
/// builders is bypassed so `config` is the only source of keys.
pub fn build_provider(
    kind: ProviderKind,
    config: &Config,
    client: reqwest::Client,
) -> Result<Box<dyn StyleProvider>> {
    let api_key = config.api_key(kind).ok_or_else(|| {
        tracing::error!(env_var = kind.api_key_env_var(), "provider API key not set");
        StylizeError::Config(match kind {
            ProviderKind::Grok => "Grok API key not configured on server.".into(),
            ProviderKind::OpenAI => "OpenAI API key not configured on server.".into(),
        })
    })?;
    let base_url = config.base_url(kind);

    Ok(match kind {
        ProviderKind::Grok => Box::new(
            GrokProvider::builder()
                .api_key(api_key)
                .base_url(base_url)
                .client(client)
                .build()?,
        ),
        ProviderKind::OpenAI => Box::new(
            OpenAiProvider::builder()
                .api_key(api_key)
                .base_url(base_url)
                .client(client)
                .build()?,
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_provider_selects_kind() {
        let config = Config {
            xai_api_key: Some("xai-test".into()),
            openai_api_key: Some("sk-test".into()),
            ..Default::default()
        };
        for kind in ProviderKind::ALL {
            let provider = build_provider(kind, &config, reqwest::Client::new()).unwrap();
            assert_eq!(provider.kind(), kind);
        }
    }

    #[test]
    fn test_build_provider_missing_key() {
        let config = Config {
            openai_api_key: Some("sk-test".into()),
            ..Default::default()
        };
        let err = build_provider(ProviderKind::Grok, &config, reqwest::Client::new())
            .err()
            .unwrap();
        assert!(matches!(err, StylizeError::Config(_)));
        assert_eq!(err.to_string(), "Grok API key not configured on server.");
        assert_eq!(err.status_code(), 500);
    }
}
