//! LLM provider abstraction.
//!
//! The runtime assumes one provider-agnostic completion call: given a
//! model id, a message list, tool definitions, and a verbatim parameter
//! bundle, return a response whose first choice carries optional text and
//! an optional list of tool calls with arguments encoded as JSON strings.
//! [`openai::OpenAiCompatClient`] implements it over any OpenAI-compatible
//! chat-completions endpoint; anything satisfying [`ModelClient`] works.

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub mod openai;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// A chat message in provider wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role: `system`, `user`, `assistant`, or `tool`.
    pub role: String,
    /// Plain text content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Assistant tool calls.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<WireToolCall>>,
    /// Call id this message answers, when role is `tool`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    /// A system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_owned(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    /// A user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_owned(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    /// An assistant message echoing text and tool calls.
    pub fn assistant(content: Option<String>, tool_calls: Vec<WireToolCall>) -> Self {
        Self {
            role: "assistant".to_owned(),
            content,
            tool_calls: if tool_calls.is_empty() {
                None
            } else {
                Some(tool_calls)
            },
            tool_call_id: None,
        }
    }

    /// A tool-result message answering `call_id`.
    pub fn tool_result(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: "tool".to_owned(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: Some(call_id.into()),
        }
    }
}

/// A tool call on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireToolCall {
    /// Provider-assigned call id.
    pub id: String,
    /// Always `function`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Function payload.
    pub function: WireFunctionCall,
}

/// Function payload inside a wire tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireFunctionCall {
    /// Tool name (sanitized form on the wire).
    pub name: String,
    /// Arguments encoded as a JSON string, per the provider-agnostic format.
    pub arguments: String,
}

/// A tool definition on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireTool {
    /// Always `function`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Function schema.
    pub function: WireToolFunction,
}

/// Function schema inside a wire tool definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireToolFunction {
    /// Tool name (sanitized form on the wire).
    pub name: String,
    /// Description shown to the model.
    pub description: String,
    /// JSON Schema for the parameters.
    pub parameters: Value,
}

/// A completion response reduced to what the runtime consumes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatCompletion {
    /// Response choices; the runtime reads the first.
    pub choices: Vec<ChatChoice>,
}

/// One response choice.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatChoice {
    /// The assistant message.
    pub message: ChatResponseMessage,
    /// Why generation stopped, when the provider reports it.
    pub finish_reason: Option<String>,
}

/// Assistant message in a response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatResponseMessage {
    /// Text content, if any.
    pub content: Option<String>,
    /// Tool calls, if any.
    pub tool_calls: Option<Vec<WireToolCall>>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors returned by model clients.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// HTTP transport failure.
    #[error("provider request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Response did not match the expected schema.
    #[error("provider response parse error: {0}")]
    Parse(String),
    /// Upstream responded with an error status.
    #[error("provider returned non-success status {status}: {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Redacted, truncated response body.
        body: String,
    },
    /// The model id is not in `provider/model` form.
    #[error("invalid model id: {0}")]
    InvalidModel(String),
    /// The client is missing configuration (for example an API key).
    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

// ---------------------------------------------------------------------------
// HTTP helpers
// ---------------------------------------------------------------------------

/// Check HTTP response status and return the body text, or a structured
/// error with a redacted body.
///
/// # Errors
///
/// Returns [`ProviderError::Request`] on transport failure and
/// [`ProviderError::HttpStatus`] on a non-2xx status.
pub async fn check_http_response(response: reqwest::Response) -> Result<String, ProviderError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(ProviderError::HttpStatus {
            status: status.as_u16(),
            body: redact_error_body(&body),
        });
    }
    Ok(body)
}

/// Strip credential-shaped substrings and truncate before an HTTP error
/// body enters an error value.
fn redact_error_body(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut sanitized = collapsed;
    for pattern in [
        r"sk-ant-[A-Za-z0-9_\-]{10,}",
        r"sk-[A-Za-z0-9]{32,}",
        r"Bearer [A-Za-z0-9._\-]{16,}",
    ] {
        if let Ok(regex) = Regex::new(pattern) {
            sanitized = regex.replace_all(&sanitized, "[REDACTED]").into_owned();
        }
    }

    const MAX_ERROR_BODY_CHARS: usize = 256;
    if sanitized.chars().count() > MAX_ERROR_BODY_CHARS {
        let shortened = sanitized
            .chars()
            .take(MAX_ERROR_BODY_CHARS)
            .collect::<String>();
        return format!("{shortened}...[truncated]");
    }

    sanitized
}

/// Split a provider-prefixed model id like `openai/gpt-4.1` into
/// `(provider, model)`.
///
/// # Errors
///
/// Returns [`ProviderError::InvalidModel`] unless both parts are non-empty.
pub fn parse_model_id(id: &str) -> Result<(&str, &str), ProviderError> {
    let (provider, model) = id
        .split_once('/')
        .ok_or_else(|| ProviderError::InvalidModel(id.to_owned()))?;
    if provider.is_empty() || model.is_empty() {
        return Err(ProviderError::InvalidModel(id.to_owned()));
    }
    Ok((provider, model))
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// The provider-agnostic completion call.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Request a completion.
    ///
    /// `params` is forwarded verbatim into the request body (temperature,
    /// reasoning effort, max tokens, provider-specific).
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on transport, status, or parse failure.
    /// The runtime does not retry.
    async fn complete(
        &self,
        model: &str,
        messages: &[ChatMessage],
        tools: &[WireTool],
        params: &Map<String, Value>,
    ) -> Result<ChatCompletion, ProviderError>;
}
