//! Gemini client implementation

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

use lectern_core::{
    Embedder, Error, GenerationConfig, GenerationResult, LLMProvider, Result,
};

use crate::config::GeminiConfig;

/// Gemini chat and embedding client
pub struct GeminiClient {
    config: GeminiConfig,
    client: Client,
    current_model: String,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

impl Content {
    fn text(role: Option<&str>, text: &str) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationParams {
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop_sequences: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationParams,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<ResponseContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    total_token_count: Option<u32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    usage_metadata: Option<UsageMetadata>,
}

/// Embedding task hint; documents and queries are embedded asymmetrically
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum TaskType {
    RetrievalDocument,
    RetrievalQuery,
}

#[derive(Serialize)]
struct EmbedContentRequest {
    model: String,
    content: Content,
    #[serde(rename = "taskType")]
    task_type: TaskType,
}

#[derive(Serialize)]
struct BatchEmbedContentsRequest {
    requests: Vec<EmbedContentRequest>,
}

#[derive(Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

#[derive(Deserialize)]
struct EmbedContentResponse {
    embedding: EmbeddingValues,
}

#[derive(Deserialize)]
struct BatchEmbedContentsResponse {
    #[serde(default)]
    embeddings: Vec<EmbeddingValues>,
}

/// Which kind of call an HTTP failure belongs to
#[derive(Clone, Copy)]
enum Call {
    Generate,
    Embed,
}

impl GeminiClient {
    /// Model constants
    pub const GEMINI_1_5_FLASH: &'static str = "gemini-1.5-flash-latest";
    pub const EMBEDDING_001: &'static str = "models/embedding-001";

    /// Largest number of texts sent in one batchEmbedContents call
    pub const MAX_BATCH_SIZE: usize = 100;

    /// Create a new Gemini client from configuration
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("lectern/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        let current_model = config.chat_model.clone();

        Ok(Self {
            config,
            client,
            current_model,
        })
    }

    /// Create a new Gemini client from environment variables
    pub fn from_env() -> Result<Self> {
        let config = GeminiConfig::from_env()?;
        Self::new(config)
    }

    /// Set the chat model to use for generation
    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.current_model = model_id.into();
        self
    }

    /// Per-call timeout if one was given, else the configured client timeout
    fn call_timeout(&self, config: &GenerationConfig) -> Duration {
        config.timeout.unwrap_or_else(|| self.config.timeout())
    }

    /// REST resource name for a model id
    fn model_path(model_id: &str) -> String {
        if model_id.starts_with("models/") {
            model_id.to_string()
        } else {
            format!("models/{}", model_id)
        }
    }

    fn endpoint(&self, model_id: &str, method: &str) -> String {
        format!(
            "{}/{}:{}",
            self.config.api_url,
            Self::model_path(model_id),
            method
        )
    }

    /// POST a JSON body and decode the JSON reply
    async fn post_json<B, R>(&self, url: &str, body: &B, call: Call) -> Result<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", &self.config.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Timeout(e.to_string())
                } else {
                    Error::Network(e.to_string())
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(Self::status_error(status, &text, call));
        }

        serde_json::from_str(&text).map_err(|e| {
            Error::Serialization(format!("Invalid Gemini response: {} - {}", e, text))
        })
    }

    fn status_error(status: StatusCode, body: &str, call: Call) -> Error {
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Error::Authentication(format!("Gemini rejected the API key ({})", status));
        }

        let message = format!("Gemini API request failed with status {}: {}", status, body);
        match call {
            Call::Generate => Error::LLMProvider(message),
            Call::Embed => Error::Embedding(message),
        }
    }

    /// Perform the actual generation request
    async fn perform_generation(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<GenerationResult> {
        let request_body = GenerateContentRequest {
            contents: vec![Content::text(Some("user"), prompt)],
            generation_config: GenerationParams {
                max_output_tokens: config.max_tokens,
                temperature: config.temperature,
                top_p: config.top_p,
                top_k: config.top_k,
                stop_sequences: config.stop_sequences.clone(),
            },
        };

        let url = self.endpoint(&config.model_id, "generateContent");
        debug!(model = %config.model_id, prompt_chars = prompt.len(), "Gemini generateContent");

        let response: GenerateContentResponse =
            self.post_json(&url, &request_body, Call::Generate).await?;

        let candidate = match response.candidates.first() {
            Some(candidate) => candidate,
            None => {
                let reason = response
                    .prompt_feedback
                    .and_then(|f| f.block_reason)
                    .unwrap_or_else(|| "no candidates returned".to_string());
                return Err(Error::LLMProvider(format!(
                    "Empty response from Gemini: {}",
                    reason
                )));
            }
        };

        let mut answer = String::new();
        if let Some(content) = &candidate.content {
            for part in &content.parts {
                match &part.text {
                    Some(text) => answer.push_str(text),
                    None => warn!("Skipping non-text part in Gemini response"),
                }
            }
        }

        if answer.trim().is_empty() {
            return Err(Error::LLMProvider(format!(
                "Empty response from Gemini (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }

        Ok(GenerationResult {
            text: answer,
            model_id: config.model_id.clone(),
            tokens_used: response.usage_metadata.and_then(|u| u.total_token_count),
        })
    }

    fn embed_request(&self, text: &str, task_type: TaskType) -> EmbedContentRequest {
        EmbedContentRequest {
            model: Self::model_path(&self.config.embedding_model),
            content: Content::text(None, text),
            task_type,
        }
    }

    /// Embed one batch of at most MAX_BATCH_SIZE texts
    async fn embed_chunk(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let request_body = BatchEmbedContentsRequest {
            requests: texts
                .iter()
                .map(|t| self.embed_request(t, TaskType::RetrievalDocument))
                .collect(),
        };

        let url = self.endpoint(&self.config.embedding_model, "batchEmbedContents");
        let response: BatchEmbedContentsResponse =
            self.post_json(&url, &request_body, Call::Embed).await?;

        if response.embeddings.len() != texts.len() {
            return Err(Error::Embedding(format!(
                "Gemini returned {} embeddings for {} texts",
                response.embeddings.len(),
                texts.len()
            )));
        }

        Ok(response.embeddings.into_iter().map(|e| e.values).collect())
    }
}

#[async_trait]
impl LLMProvider for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<GenerationResult> {
        let config = GenerationConfig {
            model_id: self.current_model.clone(),
            ..Default::default()
        };
        self.generate_with_config(prompt, &config).await
    }

    async fn generate_with_config(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<GenerationResult> {
        let generation_future = self.perform_generation(prompt, config);

        match timeout(self.call_timeout(config), generation_future).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout("Request timed out".to_string())),
        }
    }

    fn model_id(&self) -> &str {
        &self.current_model
    }
}

#[async_trait]
impl Embedder for GeminiClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let request_body = self.embed_request(text, TaskType::RetrievalQuery);
        let url = self.endpoint(&self.config.embedding_model, "embedContent");

        let response: EmbedContentResponse =
            self.post_json(&url, &request_body, Call::Embed).await?;

        if response.embedding.values.is_empty() {
            return Err(Error::Embedding("Gemini returned an empty embedding".to_string()));
        }

        Ok(response.embedding.values)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());

        for batch in texts.chunks(Self::MAX_BATCH_SIZE) {
            debug!(batch_size = batch.len(), "Gemini batchEmbedContents");
            vectors.extend(self.embed_chunk(batch).await?);
        }

        Ok(vectors)
    }

    fn model_id(&self) -> &str {
        &self.config.embedding_model
    }
}
