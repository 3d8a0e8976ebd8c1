use std::error::Error;
use std::fmt;

use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;

/// Fixed system-role instruction sent with every completion request.
const SYSTEM_PROMPT: &str = "你是一个专业的旅游规划助手，能够合理的帮助用户规划具体的旅游方案。你的回答必须是纯JSON格式，不要添加任何额外的解释文字。";

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}

#[derive(Debug)]
pub enum LlmServiceError {
    EnvironmentError(String),
    HttpError(reqwest::Error),
    ResponseError(String),
}

impl fmt::Display for LlmServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmServiceError::EnvironmentError(msg) => write!(f, "Environment error: {}", msg),
            LlmServiceError::HttpError(err) => write!(f, "HTTP error: {}", err),
            LlmServiceError::ResponseError(msg) => write!(f, "Response error: {}", msg),
        }
    }
}

impl Error for LlmServiceError {}

impl From<reqwest::Error> for LlmServiceError {
    fn from(err: reqwest::Error) -> Self {
        LlmServiceError::HttpError(err)
    }
}

/// Thin client for an OpenAI-compatible chat-completions endpoint. One
/// request per plan, no retries; whatever text comes back is handed to the
/// recovery engine untouched.
#[derive(Clone)]
pub struct LlmService {
    client: Client,
    config: LlmConfig,
}

impl LlmService {
    pub fn new(config: LlmConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn from_env() -> Result<Self, LlmServiceError> {
        let config = LlmConfig::from_env().map_err(LlmServiceError::EnvironmentError)?;
        Ok(Self::new(config))
    }

    /// Send one completion request and return the raw text of the first
    /// choice. No guarantee the content is JSON.
    pub async fn complete(&self, prompt: &str) -> Result<String, LlmServiceError> {
        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        debug!("requesting completion from {}", self.config.api_url);

        let response = self
            .client
            .post(&self.config.api_url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LlmServiceError::ResponseError(format!(
                "Completion request failed with status {}: {}",
                status, error_text
            )));
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            LlmServiceError::ResponseError(format!("Failed to parse response: {}", e))
        })?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| {
                LlmServiceError::ResponseError("Completion returned no choices".to_string())
            })
    }
}
