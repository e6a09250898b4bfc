//! Image stylization module.

pub mod preprocess;
mod provider;
pub mod providers;
mod types;

pub use preprocess::{PreparedImage, EDIT_IMAGE_SIZE};
pub use provider::StyleProvider;
pub use types::{GenerationMetadata, ImageFormat, ProviderKind, StylizedImage, UploadedImage};
