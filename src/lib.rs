#![warn(missing_docs)]
//! Ghiblify - turn an uploaded image into a Studio Ghibli style rendering.
//!
//! The crate is a thin relay in front of two hosted providers:
//!
//! - **Grok (xAI)**: the upload is described by a vision model, the
//!   description becomes a text-to-image prompt, and one image is generated.
//! - **OpenAI**: the upload is cover-fitted to a 1024×1024 RGBA PNG, paired
//!   with a fully transparent mask and sent to the image edit endpoint.
//!
//! Either way the result is a provider-hosted URL; nothing is downloaded or
//! stored.
//!
//! # Quick Start
//!
//! ```no_run
//! use ghiblify::{Config, ProviderKind, StyleProvider, UploadedImage};
//! use ghiblify::image::providers::build_provider;
//!
//! #[tokio::main]
//! async fn main() -> ghiblify::Result<()> {
//!     let config = Config::from_env();
//!     let provider = build_provider(ProviderKind::Grok, &config, reqwest::Client::new())?;
//!     let upload = UploadedImage::new(std::fs::read("cat.jpg").unwrap());
//!     let styled = provider.stylize(&upload).await?;
//!     println!("{}", styled.url);
//!     Ok(())
//! }
//! ```
//!
//! # Serving
//!
//! [`server::router`] exposes `POST /api/stylize`, `POST /api/convert`,
//! `GET /api/health` and the UI page at `/`.

pub mod config;
mod error;
pub mod image;
pub mod server;
pub mod ui;

pub use config::Config;
pub use error::{Result, StylizeError};

pub use crate::image::{
    GenerationMetadata, ImageFormat, PreparedImage, ProviderKind, StyleProvider, StylizedImage,
    UploadedImage,
};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{Result, StylizeError};
    pub use crate::image::providers::{build_provider, GrokProvider, OpenAiProvider};
    pub use crate::image::{ProviderKind, StyleProvider, StylizedImage, UploadedImage};
}
