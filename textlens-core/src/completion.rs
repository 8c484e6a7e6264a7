//! HTTP client for the completion service
//!
//! One call per analysis request, under a hard wall-clock deadline enforced
//! here regardless of how the service behaves. The wire format is the
//! chat-completions shape: `POST {endpoint}/v1/chat/completions` with a
//! single user message, bearer-authenticated.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use crate::config::CompletionConfig;
use crate::error::{Error, Result};
use crate::types::CompletionBudget;

/// Request body for POST /v1/chat/completions
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    presence_penalty: f32,
    frequency_penalty: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Response body from POST /v1/chat/completions
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// Transport seam for the completion call.
///
/// The HTTP implementation is the default; tests substitute stubs to
/// exercise the deadline and failure paths without a network.
#[async_trait]
pub trait CompletionTransport: Send + Sync {
    /// Send one prompt and return the raw completion text.
    async fn send(&self, model: &str, prompt: &str, budget: &CompletionBudget) -> Result<String>;
}

/// Default transport: reqwest against a chat-completions endpoint.
pub struct HttpTransport {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Build the transport from configuration.
    ///
    /// Fails with a config error when no API key is resolvable - checked
    /// here, before any request could be issued.
    pub fn new(config: &CompletionConfig) -> Result<Self> {
        config.validate()?;

        let api_key = config
            .resolve_api_key()
            .ok_or_else(|| Error::Config("completion.api_key is not set".to_string()))?;

        let base_url = config.endpoint.trim_end_matches('/').to_string();

        // Build default headers
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let auth_value = format!("Bearer {}", api_key);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth_value)
                .map_err(|e| Error::Config(format!("invalid api_key: {}", e)))?,
        );

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.deadline_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url,
        })
    }
}

#[async_trait]
impl CompletionTransport for HttpTransport {
    async fn send(&self, model: &str, prompt: &str, budget: &CompletionBudget) -> Result<String> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let request_body = ChatRequest {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: budget.temperature,
            max_tokens: budget.max_tokens,
            presence_penalty: 0.0,
            frequency_penalty: 0.0,
        };

        let response = self
            .http_client
            .post(&url)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| Error::UpstreamTransport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::UpstreamHttp {
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::UpstreamTransport(e.to_string()))?;

        let decoded: ChatResponse = serde_json::from_str(&body).map_err(|e| {
            Error::MalformedOutput {
                message: format!("completion response is not chat-completions JSON: {}", e),
                raw: body.clone(),
            }
        })?;

        let choice = decoded
            .choices
            .into_iter()
            .next()
            .ok_or(Error::MalformedOutput {
                message: "completion response carries no choices".to_string(),
                raw: body,
            })?;

        Ok(choice.message.content)
    }
}

/// Completion client: one transport plus the hard deadline.
pub struct CompletionClient {
    transport: Box<dyn CompletionTransport>,
    model: String,
    deadline: Duration,
}

impl CompletionClient {
    /// Create a client from configuration with the default HTTP transport.
    pub fn new(config: &CompletionConfig) -> Result<Self> {
        let transport = HttpTransport::new(config)?;
        Ok(Self {
            transport: Box::new(transport),
            model: config.model.clone(),
            deadline: Duration::from_secs(config.deadline_secs),
        })
    }

    /// Create a client over a custom transport (tests, alternative services).
    pub fn with_transport(
        transport: Box<dyn CompletionTransport>,
        model: impl Into<String>,
        deadline: Duration,
    ) -> Self {
        Self {
            transport,
            model: model.into(),
            deadline,
        }
    }

    /// The configured deadline for one call.
    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Perform one completion call under the deadline.
    ///
    /// On expiry the in-flight future is dropped, which cancels the
    /// underlying request, and `UpstreamTimeout` is returned.
    pub async fn complete(&self, prompt: &str, budget: &CompletionBudget) -> Result<String> {
        let call = self.transport.send(&self.model, prompt, budget);
        match tokio::time::timeout(self.deadline, call).await {
            Ok(result) => result,
            Err(_) => Err(Error::UpstreamTimeout(self.deadline)),
        }
    }
}
