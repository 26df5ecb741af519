//! OpenAI-compatible image edit endpoint.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{GenerationOutput, GenerationRequest, ImageGenerator, OutputMetadata};
use crate::config::GenerationConfig;
use crate::gateway::ProviderError;
use crate::imaging;

#[derive(Debug, Clone)]
pub struct HttpImageGenerator {
    endpoint: String,
    model: String,
    api_key: Option<String>,
    timeout: Duration,
    max_image_dimension: u32,
}

#[derive(Debug, Serialize)]
struct ImageEditRequest {
    model: String,
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    negative_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<String>,
    n: u32,
    response_format: &'static str,
}

#[derive(Debug, Default, Deserialize)]
struct ImageEditResponse {
    #[serde(default)]
    data: Vec<ImageData>,
    #[serde(default)]
    safety_blocked: Option<bool>,
    #[serde(default)]
    geometry_changed: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    #[serde(default)]
    b64_json: Option<String>,
}

impl HttpImageGenerator {
    pub fn new(endpoint: &str, model: &str, api_key: Option<&str>) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.map(|s| s.to_string()),
            timeout: Duration::from_secs(180),
            max_image_dimension: 1536,
        }
    }

    pub fn from_config(config: &GenerationConfig) -> Self {
        Self::new(&config.endpoint, &config.model, config.api_key.as_deref())
            .with_timeout(Duration::from_secs(config.timeout_secs))
            .with_max_image_dimension(config.max_image_dimension)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_image_dimension(mut self, max: u32) -> Self {
        self.max_image_dimension = max;
        self
    }

    fn generate_blocking(&self, request: GenerationRequest) -> Result<GenerationOutput, ProviderError> {
        let image = match &request.reference_image {
            Some(path) => Some(
                imaging::encode_data_url(path, self.max_image_dimension)
                    .map_err(|e| ProviderError::Other(e.to_string()))?,
            ),
            None => None,
        };

        let body = ImageEditRequest {
            model: self.model.clone(),
            prompt: request.prompt,
            negative_prompt: request.negative_prompt,
            image,
            n: 1,
            response_format: "b64_json",
        };

        let url = format!("{}/images/edits", self.endpoint);
        let agent = ureq::AgentBuilder::new().timeout(self.timeout).build();

        let mut req = agent.post(&url).set("Content-Type", "application/json");
        if let Some(ref api_key) = self.api_key {
            req = req.set("Authorization", &format!("Bearer {}", api_key));
        }

        match req.send_json(&body) {
            Ok(response) => {
                let parsed: ImageEditResponse = response
                    .into_json()
                    .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
                parse_response(parsed)
            }
            Err(ureq::Error::Status(status, response)) => {
                let body = response.into_string().unwrap_or_default();
                if is_content_policy_refusal(status, &body) {
                    tracing::warn!(status, "Image provider refused the request on safety grounds");
                    return Ok(GenerationOutput {
                        image: None,
                        metadata: Some(OutputMetadata {
                            safety_blocked: true,
                            geometry_changed: false,
                        }),
                    });
                }
                Err(ProviderError::from_status(status, body))
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn parse_response(response: ImageEditResponse) -> Result<GenerationOutput, ProviderError> {
    let image = match response.data.into_iter().find_map(|d| d.b64_json) {
        Some(encoded) => Some(
            BASE64
                .decode(encoded.trim())
                .map_err(|e| ProviderError::InvalidResponse(format!("bad image payload: {}", e)))?,
        ),
        None => None,
    };

    let metadata = if response.safety_blocked.is_some() || response.geometry_changed.is_some() {
        Some(OutputMetadata {
            safety_blocked: response.safety_blocked.unwrap_or(false),
            geometry_changed: response.geometry_changed.unwrap_or(false),
        })
    } else {
        None
    };

    Ok(GenerationOutput { image, metadata })
}

fn is_content_policy_refusal(status: u16, body: &str) -> bool {
    let lower = body.to_lowercase();
    status == 400 && (lower.contains("content_policy") || lower.contains("safety system"))
}

#[async_trait]
impl ImageGenerator for HttpImageGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationOutput, ProviderError> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.generate_blocking(request))
            .await
            .map_err(|e| ProviderError::Other(format!("generation task panicked: {}", e)))?
    }

    fn provider_name(&self) -> &'static str {
        "OpenAI-compatible images"
    }
}
