use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::config::{Config, LlmProvider};
use crate::error::{ConfigError, ModelError};

/// Longest slice of an error body kept in a `ModelError`.
const MAX_ERROR_BODY_CHARS: usize = 300;

/// "Given a text prompt, return a text completion."
#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn model(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String, ModelError>;
}

/// Picks the backend named by the configuration.
pub fn build_generator(config: &Config) -> Result<Arc<dyn TextGenerator>, ConfigError> {
    let client = build_client(config)?;

    let generator: Arc<dyn TextGenerator> = match config.provider {
        LlmProvider::Gemini => Arc::new(GeminiClient::new(
            client,
            &config.api_key,
            &config.model,
            &config.llm_base_url,
        )),
        LlmProvider::OpenRouter => Arc::new(OpenRouterClient::new(
            client,
            &config.api_key,
            &config.model,
            &config.llm_base_url,
        )),
    };

    Ok(generator)
}

fn build_client(config: &Config) -> Result<Client, ConfigError> {
    ClientBuilder::new()
        .timeout(config.model_timeout)
        .build()
        .map_err(|e| ConfigError::HttpClient(e.to_string()))
}

async fn ensure_success(response: Response) -> Result<Response, ModelError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message: String = body.trim().chars().take(MAX_ERROR_BODY_CHARS).collect();
    warn!(status = status.as_u16(), "Model backend returned an error status");
    Err(ModelError::from_status(status, message))
}

// --- Gemini ---------------------------------------------------------------

#[derive(Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    role: &'a str,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
}

#[derive(Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiCandidatePart>,
}

#[derive(Deserialize)]
struct GeminiCandidatePart {
    text: Option<String>,
}

/// Google Generative Language `generateContent` endpoint.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(client: Client, api_key: &str, model: &str, base_url: &str) -> Self {
        Self {
            client,
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn model(&self) -> &str {
        &self.model
    }

    #[instrument(skip_all, fields(model = %self.model))]
    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        let body = GeminiRequest {
            contents: vec![GeminiContent {
                role: "user",
                parts: vec![GeminiPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", self.api_key.as_str())
            .json(&body)
            .send()
            .await
            .map_err(ModelError::from_reqwest_error)?;

        let parsed: GeminiResponse = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(ModelError::from_reqwest_error)?;

        let candidate = parsed
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| ModelError::InvalidResponse("no candidates in response".to_string()))?;

        let text: String = candidate
            .content
            .map(|content| content.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|part| part.text)
            .collect();

        if text.trim().is_empty() {
            return Err(ModelError::EmptyCompletion);
        }

        debug!(chars = text.len(), "Received completion");
        Ok(text)
    }
}

// --- OpenRouter -----------------------------------------------------------

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// OpenAI-compatible chat completions, as served by OpenRouter.
pub struct OpenRouterClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenRouterClient {
    pub fn new(client: Client, api_key: &str, model: &str, base_url: &str) -> Self {
        Self {
            client,
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl fmt::Debug for OpenRouterClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenRouterClient")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl TextGenerator for OpenRouterClient {
    fn model(&self) -> &str {
        &self.model
    }

    #[instrument(skip_all, fields(model = %self.model))]
    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(ModelError::from_reqwest_error)?;

        let parsed: ChatResponse = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(ModelError::from_reqwest_error)?;

        let reply = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ModelError::InvalidResponse("no choices in response".to_string()))?
            .message
            .content
            .unwrap_or_default();

        if reply.trim().is_empty() {
            return Err(ModelError::EmptyCompletion);
        }

        debug!(chars = reply.len(), "Received completion");
        Ok(reply)
    }
}
