use std::time::Duration;

use async_trait::async_trait;
use prowl_core::{LlmConfig, ProwlError};
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai";

/// A text-completion backend.
///
/// The review requester talks to this trait so the polling loop can be
/// exercised without a network.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Send `prompt` to `model` and return the raw response text.
    ///
    /// # Errors
    ///
    /// Returns [`ProwlError::Service`] on a non-success status or an
    /// undecodable response.
    async fn complete(&self, prompt: &str, model: &str) -> Result<String, ProwlError>;
}

/// A message in a chat conversation with the LLM.
///
/// # Examples
///
/// ```
/// use prowl_review::llm::{ChatMessage, Role};
///
/// let msg = ChatMessage {
///     role: Role::User,
///     content: "Review this code".into(),
/// };
/// assert!(matches!(msg.role, Role::User));
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    /// Role of the message sender.
    pub role: Role,
    /// Text content of the message.
    pub content: String,
}

/// Role in the chat conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System-level instructions.
    System,
    /// User input.
    User,
    /// Assistant response.
    Assistant,
}

/// OpenAI-compatible chat completions client.
///
/// Works with any provider that exposes `/v1/chat/completions`: Groq,
/// OpenAI, Ollama, vLLM, etc.
///
/// # Examples
///
/// ```
/// use prowl_core::LlmConfig;
/// use prowl_review::llm::LlmClient;
///
/// let config = LlmConfig {
///     api_key: Some("test-key".into()),
///     ..LlmConfig::default()
/// };
/// let client = LlmClient::new(&config).unwrap();
/// assert_eq!(client.model(), "llama3-8b-8192");
/// ```
pub struct LlmClient {
    client: reqwest::Client,
    model: String,
    api_key: Option<String>,
    base_url: String,
}

impl LlmClient {
    /// Create a new LLM client from configuration.
    ///
    /// The API key falls back to `GROQ_API_KEY`, then `OPENAI_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns [`ProwlError::Config`] if the HTTP client cannot be built.
    pub fn new(config: &LlmConfig) -> Result<Self, ProwlError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| ProwlError::Config(format!("failed to create HTTP client: {e}")))?;

        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("GROQ_API_KEY").ok())
            .or_else(|| std::env::var("OPENAI_API_KEY").ok());

        let base_url = config
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client,
            model: config.model.clone(),
            api_key,
            base_url,
        })
    }

    /// Return the configured model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Whether an API key was found in config or the environment.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Send a chat completion request and return the text response.
    ///
    /// # Errors
    ///
    /// Returns [`ProwlError::Service`] on transport failures, non-success
    /// statuses (with status and body), or a response without
    /// `choices[0].message.content`.
    pub async fn chat(&self, messages: Vec<ChatMessage>, model: &str) -> Result<String, ProwlError> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let body = serde_json::json!({
            "model": model,
            "messages": messages,
        });

        let mut request = self.client.post(&url);
        if let Some(api_key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {api_key}"));
        }
        request = request.header("Content-Type", "application/json");

        let response = request
            .json(&body)
            .send()
            .await
            .map_err(|e| ProwlError::Service(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(ProwlError::Service(format!("{status}: {body_text}")));
        }

        let response_body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ProwlError::Service(format!("failed to parse response: {e}")))?;

        let content = response_body
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .ok_or_else(|| {
                ProwlError::Service(format!("unexpected response structure: {response_body}"))
            })?;

        Ok(content.to_string())
    }
}

#[async_trait]
impl CompletionService for LlmClient {
    async fn complete(&self, prompt: &str, model: &str) -> Result<String, ProwlError> {
        let messages = vec![ChatMessage {
            role: Role::User,
            content: prompt.to_string(),
        }];
        self.chat(messages, model).await
    }
}
