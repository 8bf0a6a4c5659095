//! OpenAI-compatible chat-completions client.
//!
//! Works against any endpoint speaking the `/chat/completions` dialect -
//! the OpenAI API itself or a multi-provider gateway. Model ids stay in
//! their provider-prefixed form (`openai/gpt-...`, `anthropic/claude-...`);
//! the prefix is validated here and the id is passed through verbatim for
//! the endpoint to resolve.

use serde_json::{Map, Value};
use tracing::debug;

use super::{
    check_http_response, parse_model_id, ChatCompletion, ChatMessage, ModelClient, ProviderError,
    WireTool,
};
use async_trait::async_trait;

/// Default completion endpoint base.
pub const DEFAULT_API_BASE: &str = "https://openrouter.ai/api/v1";

/// Environment variables consulted for the API key, in order.
const API_KEY_VARS: [&str; 2] = ["CRISISBENCH_API_KEY", "OPENAI_API_KEY"];

/// Reqwest-backed [`ModelClient`] for OpenAI-compatible endpoints.
#[derive(Debug, Clone)]
pub struct OpenAiCompatClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiCompatClient {
    /// Build a client for `base_url` with an explicit API key.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Build a client from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Unavailable`] if no API key variable is set.
    pub fn from_env(base_url: Option<&str>) -> Result<Self, ProviderError> {
        let api_key = API_KEY_VARS
            .iter()
            .find_map(|var| std::env::var(var).ok())
            .ok_or_else(|| {
                ProviderError::Unavailable(format!(
                    "no API key found; set one of {API_KEY_VARS:?}"
                ))
            })?;
        Ok(Self::new(
            base_url.unwrap_or(DEFAULT_API_BASE).to_owned(),
            api_key,
        ))
    }
}

#[async_trait]
impl ModelClient for OpenAiCompatClient {
    async fn complete(
        &self,
        model: &str,
        messages: &[ChatMessage],
        tools: &[WireTool],
        params: &Map<String, Value>,
    ) -> Result<ChatCompletion, ProviderError> {
        parse_model_id(model)?;

        let mut body = Map::new();
        body.insert("model".to_owned(), Value::String(model.to_owned()));
        body.insert(
            "messages".to_owned(),
            serde_json::to_value(messages).map_err(|e| ProviderError::Parse(e.to_string()))?,
        );
        if !tools.is_empty() {
            body.insert(
                "tools".to_owned(),
                serde_json::to_value(tools).map_err(|e| ProviderError::Parse(e.to_string()))?,
            );
        }
        // The caller's parameter bundle is forwarded verbatim.
        for (key, value) in params {
            body.insert(key.clone(), value.clone());
        }

        debug!(model, message_count = messages.len(), tool_count = tools.len(), "completion request");

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&Value::Object(body))
            .send()
            .await?;

        let text = check_http_response(response).await?;
        serde_json::from_str(&text).map_err(|e| ProviderError::Parse(e.to_string()))
    }
}
