//! Image-generation provider seam.
//!
//! The staging queue only ever talks to an [`ImageGenerator`]; the HTTP
//! implementation lives in [`http`], tests substitute counting mocks.

pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::gateway::ProviderError;

pub use http::HttpImageGenerator;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub negative_prompt: Option<String>,
    /// Room photo the provider should edit in place.
    pub reference_image: Option<PathBuf>,
}

/// Signals some providers attach to a result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputMetadata {
    #[serde(default)]
    pub safety_blocked: bool,
    #[serde(default)]
    pub geometry_changed: bool,
}

/// A completed provider call. `image` is absent when the provider refused
/// to render, in which case `metadata` usually says why.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationOutput {
    pub image: Option<Vec<u8>>,
    pub metadata: Option<OutputMetadata>,
}

impl GenerationOutput {
    pub fn image(bytes: Vec<u8>) -> Self {
        Self {
            image: Some(bytes),
            metadata: None,
        }
    }
}

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationOutput, ProviderError>;

    fn provider_name(&self) -> &'static str;
}
