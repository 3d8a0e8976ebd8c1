use std::env;

const DEFAULT_API_URL: &str = "https://api.moonshot.cn/v1/chat/completions";
const DEFAULT_MODEL: &str = "moonshot-v1-auto";
const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Completion-endpoint configuration, read from the environment once at
/// startup and passed into the LLM client. Only the API key is mandatory.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub api_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl LlmConfig {
    pub fn from_env() -> Result<Self, String> {
        let api_key =
            env::var("LLM_API_KEY").map_err(|_| "LLM_API_KEY not set".to_string())?;

        let api_url = env::var("LLM_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let model = env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let temperature = env::var("LLM_TEMPERATURE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TEMPERATURE);
        let max_tokens = env::var("LLM_MAX_TOKENS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_TOKENS);

        Ok(Self {
            api_key,
            api_url,
            model,
            temperature,
            max_tokens,
        })
    }
}
