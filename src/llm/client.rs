use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use super::provider::{create_provider, TaggingProvider};
use crate::config::{GatewayConfig, TaggingConfig};
use crate::gateway::{ApiGateway, ProviderError, RetryPolicy};

/// Description and tags extracted from one listing photo.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PhotoTags {
    pub description: String,
    pub tags: Vec<String>,
}

impl PhotoTags {
    /// Text fed to listing vibe inference.
    pub fn as_signal_text(&self) -> String {
        if self.tags.is_empty() {
            self.description.clone()
        } else {
            format!("{} {}", self.description, self.tags.join(", "))
        }
    }
}

/// Split a model response into description and lowercase tags. Without
/// a `TAGS:` line the whole response is the description.
pub fn parse_tagged_response(response: &str) -> PhotoTags {
    if let Some(tags_idx) = response.find("TAGS:") {
        let description = response[..tags_idx].trim().to_string();
        let tags = response[tags_idx + 5..]
            .trim()
            .split(',')
            .map(|t| t.trim().trim_end_matches('.').to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        PhotoTags { description, tags }
    } else {
        PhotoTags {
            description: response.trim().to_string(),
            tags: Vec::new(),
        }
    }
}

/// Tags listing photos through its own rate-limited gateway, independent
/// of the image-generation queue.
pub struct PhotoTagger {
    provider: Arc<dyn TaggingProvider>,
    gateway: ApiGateway,
}

impl PhotoTagger {
    pub fn new(provider: Arc<dyn TaggingProvider>, interval: Duration, retry: RetryPolicy) -> Self {
        Self {
            provider,
            gateway: ApiGateway::new("tagging", interval, retry),
        }
    }

    pub fn from_config(tagging: &TaggingConfig, gateway: &GatewayConfig) -> Self {
        Self::new(
            create_provider(tagging),
            Duration::from_millis(gateway.tagging_interval_ms),
            RetryPolicy::from_config(gateway),
        )
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.provider_name()
    }

    pub async fn tag_photo(&self, image_path: &Path) -> Result<PhotoTags, ProviderError> {
        let response = self
            .gateway
            .call("tag_photo", || self.provider.describe_photo(image_path))
            .await?;
        Ok(parse_tagged_response(&response))
    }

    /// Tag photos one after another. A failed photo is logged and reported
    /// in place; the rest still run.
    pub async fn tag_photos(&self, paths: &[PathBuf]) -> Vec<(PathBuf, Result<PhotoTags, ProviderError>)> {
        let mut results = Vec::with_capacity(paths.len());
        for path in paths {
            let result = self.tag_photo(path).await;
            if let Err(ref e) = result {
                tracing::warn!(path = %path.display(), error = %e, "Failed to tag photo");
            }
            results.push((path.clone(), result));
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FlakyProvider {
        calls: AtomicU32,
        quota_failures: u32,
    }

    #[async_trait]
    impl TaggingProvider for FlakyProvider {
        async fn describe_photo(&self, image_path: &Path) -> Result<String, ProviderError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.quota_failures {
                return Err(ProviderError::Quota("429".to_string()));
            }
            if image_path.ends_with("broken.jpg") {
                return Err(ProviderError::Http {
                    status: 400,
                    body: "unsupported image".to_string(),
                });
            }
            Ok("A bright loft.\nTAGS: Exposed Brick, concrete floors, ".to_string())
        }

        fn provider_name(&self) -> &'static str {
            "flaky"
        }
    }

    fn tagger(quota_failures: u32) -> (Arc<FlakyProvider>, PhotoTagger) {
        let provider = Arc::new(FlakyProvider {
            calls: AtomicU32::new(0),
            quota_failures,
        });
        let tagger = PhotoTagger::new(
            provider.clone(),
            Duration::from_millis(1),
            RetryPolicy::new(3, Duration::from_millis(1)),
        );
        (provider, tagger)
    }

    #[test]
    fn test_parse_tagged_response() {
        let parsed = parse_tagged_response("Cozy room with rattan chairs.\nTAGS: Boho, rattan , macrame.");
        assert_eq!(parsed.description, "Cozy room with rattan chairs.");
        assert_eq!(parsed.tags, vec!["boho", "rattan", "macrame"]);
        assert_eq!(parsed.as_signal_text(), "Cozy room with rattan chairs. boho, rattan, macrame");

        let untagged = parse_tagged_response("  Just a description. ");
        assert_eq!(untagged.description, "Just a description.");
        assert!(untagged.tags.is_empty());
    }

    #[tokio::test]
    async fn test_tag_photo_retries_quota() {
        let (provider, tagger) = tagger(2);
        let tags = tagger.tag_photo(Path::new("/photos/loft.jpg")).await.unwrap();
        assert_eq!(tags.tags, vec!["exposed brick", "concrete floors"]);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_tag_photos_keeps_going_after_failure() {
        let (_provider, tagger) = tagger(0);
        let paths = vec![PathBuf::from("/photos/broken.jpg"), PathBuf::from("/photos/ok.jpg")];
        let results = tagger.tag_photos(&paths).await;

        assert_eq!(results.len(), 2);
        assert!(matches!(results[0].1, Err(ProviderError::Http { status: 400, .. })));
        assert!(results[1].1.is_ok());
        assert_eq!(tagger.provider_name(), "flaky");
    }
}
