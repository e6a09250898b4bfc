//! Style provider trait.

use crate::error::Result;
use crate::image::types::{ProviderKind, StylizedImage, UploadedImage};
use async_trait::async_trait;

/// Trait for providers that turn an uploaded image into a stylized one.
#[async_trait]
pub trait StyleProvider: Send + Sync {
    /// Stylizes the given upload, returning a provider-hosted image reference.
    async fn stylize(&self, image: &UploadedImage) -> Result<StylizedImage>;

    /// Returns the kind of this provider.
    fn kind(&self) -> ProviderKind;

    /// Returns the name of this provider for display.
    fn name(&self) -> &str {
        self.kind().display_name()
    }
}
