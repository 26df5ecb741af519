use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::config::{TaggingConfig, TaggingProviderType};
use crate::gateway::ProviderError;
use crate::imaging::load_and_encode_image;

/// Longest edge of a listing photo sent for tagging.
const TAGGING_MAX_DIMENSION: u32 = 1024;

/// Vision model that describes a listing photo in free text.
#[async_trait]
pub trait TaggingProvider: Send + Sync {
    /// Raw model output for the photo: a description followed by a
    /// `TAGS:` line.
    async fn describe_photo(&self, image_path: &Path) -> Result<String, ProviderError>;

    fn provider_name(&self) -> &'static str;
}

// ============================================================================
// OpenAI-compatible provider (LM Studio, OpenAI and compatible APIs)
// ============================================================================

#[derive(Debug, Clone)]
pub struct OpenAICompatibleProvider {
    endpoint: String,
    model: String,
    api_key: Option<String>,
    base_prompt: Option<String>,
}

#[derive(Debug, Serialize)]
struct OpenAIChatRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: String,
    content: Vec<OpenAIContentPart>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
enum OpenAIContentPart {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIChatResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    content: String,
}

impl OpenAICompatibleProvider {
    pub fn new(endpoint: &str, model: &str, api_key: Option<&str>) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.map(|s| s.to_string()),
            base_prompt: None,
        }
    }

    pub fn with_base_prompt(mut self, prompt: Option<String>) -> Self {
        self.base_prompt = prompt;
        self
    }

    fn describe_blocking(&self, image_path: &Path) -> Result<String, ProviderError> {
        let (base64_image, mime_type) = load_and_encode_image(image_path, TAGGING_MAX_DIMENSION)
            .map_err(|e| ProviderError::Other(e.to_string()))?;
        let data_url = format!("data:{};base64,{}", mime_type, base64_image);

        let request = OpenAIChatRequest {
            model: self.model.clone(),
            messages: vec![OpenAIMessage {
                role: "user".to_string(),
                content: vec![
                    OpenAIContentPart::Text {
                        text: tagging_prompt(self.base_prompt.as_deref()).to_string(),
                    },
                    OpenAIContentPart::ImageUrl {
                        image_url: ImageUrl { url: data_url },
                    },
                ],
            }],
            max_tokens: 500,
            temperature: 0.3,
        };

        let url = format!("{}/chat/completions", self.endpoint);

        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(120))
            .build();

        let mut req = agent.post(&url).set("Content-Type", "application/json");

        if let Some(ref api_key) = self.api_key {
            req = req.set("Authorization", &format!("Bearer {}", api_key));
        }

        let response = req.send_json(&request)?;

        let chat_response: OpenAIChatResponse = response
            .into_json()
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        chat_response
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .ok_or_else(|| ProviderError::InvalidResponse("no choices in response".to_string()))
    }
}

#[async_trait]
impl TaggingProvider for OpenAICompatibleProvider {
    async fn describe_photo(&self, image_path: &Path) -> Result<String, ProviderError> {
        let this = self.clone();
        let path = image_path.to_path_buf();
        run_blocking(move || this.describe_blocking(&path)).await
    }

    fn provider_name(&self) -> &'static str {
        "OpenAI-compatible"
    }
}

// ============================================================================
// Ollama provider
// ============================================================================

#[derive(Debug, Clone)]
pub struct OllamaProvider {
    endpoint: String,
    model: String,
    base_prompt: Option<String>,
}

#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    images: Vec<String>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

impl OllamaProvider {
    pub fn new(endpoint: Option<&str>, model: &str) -> Self {
        Self {
            endpoint: endpoint
                .unwrap_or("http://localhost:11434")
                .trim_end_matches('/')
                .to_string(),
            model: model.to_string(),
            base_prompt: None,
        }
    }

    pub fn with_base_prompt(mut self, prompt: Option<String>) -> Self {
        self.base_prompt = prompt;
        self
    }

    fn describe_blocking(&self, image_path: &Path) -> Result<String, ProviderError> {
        let (base64_image, _mime_type) = load_and_encode_image(image_path, TAGGING_MAX_DIMENSION)
            .map_err(|e| ProviderError::Other(e.to_string()))?;

        let request = OllamaRequest {
            model: self.model.clone(),
            prompt: tagging_prompt(self.base_prompt.as_deref()).to_string(),
            images: vec![base64_image],
            stream: false,
        };

        let url = format!("{}/api/generate", self.endpoint);

        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(180))
            .build();

        let response = agent
            .post(&url)
            .set("Content-Type", "application/json")
            .send_json(&request)?;

        let ollama_response: OllamaResponse = response
            .into_json()
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        Ok(ollama_response.response)
    }
}

#[async_trait]
impl TaggingProvider for OllamaProvider {
    async fn describe_photo(&self, image_path: &Path) -> Result<String, ProviderError> {
        let this = self.clone();
        let path: PathBuf = image_path.to_path_buf();
        run_blocking(move || this.describe_blocking(&path)).await
    }

    fn provider_name(&self) -> &'static str {
        "Ollama"
    }
}

/// Run a blocking ureq call on tokio's blocking pool.
async fn run_blocking<F>(f: F) -> Result<String, ProviderError>
where
    F: FnOnce() -> Result<String, ProviderError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ProviderError::Other(format!("tagging task panicked: {}", e)))?
}

/// Built-in instructions; asks for the description and a `TAGS:` line in
/// a single response.
fn base_tagging_prompt() -> &'static str {
    "Describe this real-estate listing photo for an interior designer. Include: \
     1) The room type \
     2) Furniture and decor, with their materials and colors \
     3) Architectural features such as flooring, ceilings, windows and fireplaces \
     4) The overall mood and interior style \
     Keep the description concise.\n\n\
     After the description, on a new line write TAGS: followed by a comma-separated list \
     of short, lowercase style and material tags. Example format:\n\
     TAGS: exposed brick, concrete floors, leather sofa, industrial"
}

fn tagging_prompt(base_prompt: Option<&str>) -> &str {
    base_prompt.unwrap_or_else(|| base_tagging_prompt())
}

pub fn create_provider(config: &TaggingConfig) -> Arc<dyn TaggingProvider> {
    let base_prompt = config.base_prompt.clone();

    match config.provider {
        TaggingProviderType::LmStudio => Arc::new(
            OpenAICompatibleProvider::new(&config.endpoint, &config.model, config.api_key.as_deref())
                .with_base_prompt(base_prompt),
        ),
        TaggingProviderType::OpenAI => Arc::new(
            OpenAICompatibleProvider::new(
                "https://api.openai.com/v1",
                &config.model,
                config.api_key.as_deref(),
            )
            .with_base_prompt(base_prompt),
        ),
        TaggingProviderType::Ollama => Arc::new(
            OllamaProvider::new(Some(&config.endpoint), &config.model).with_base_prompt(base_prompt),
        ),
    }
}
