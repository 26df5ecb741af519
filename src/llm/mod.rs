//! Vision tagging of listing photos.

pub mod client;
pub mod provider;

pub use client::{parse_tagged_response, PhotoTagger, PhotoTags};
pub use provider::{create_provider, OllamaProvider, OpenAICompatibleProvider, TaggingProvider};
