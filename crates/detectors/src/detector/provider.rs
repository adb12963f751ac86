use anyhow::Result;
use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
        ChatCompletionRequestUserMessage, ChatCompletionResponseFormat,
        ChatCompletionResponseFormatType, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::category::SmellCategory;
use crate::core::config::ProviderConfig;
use crate::core::usage::TokenUsage;

#[derive(Debug, Error)]
pub enum DetectorError {
    #[error("API error: {0}")]
    Api(String),

    #[error("invalid response format: {0}")]
    InvalidResponse(String),

    #[error("rate limit exceeded")]
    RateLimited,

    #[error("network error: {0}")]
    Network(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("request deadline exceeded before call could start")]
    DeadlineExceeded,
}

/// One category-specific detection request. `instructions` carry the
/// category's task description; `payload` is the source plus the structural
/// hint (line-numbered source).
#[derive(Debug, Clone)]
pub struct DetectorRequest {
    pub category: SmellCategory,
    pub instructions: String,
    pub payload: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Clone)]
pub struct DetectorResponse {
    pub content: String,
    pub model: String,
    pub usage: TokenUsage,
}

/// The external detector capability. Stateless, possibly slow or
/// unavailable, and adversarial with respect to output shape: nothing it
/// returns is trusted until it survives decoding and validation.
#[async_trait]
pub trait DetectorProvider: Send + Sync {
    async fn invoke(&self, request: DetectorRequest) -> Result<DetectorResponse, DetectorError>;

    fn model_name(&self) -> &str;

    fn estimate_tokens(&self, text: &str) -> usize {
        text.len() / 4
    }
}

/// Provider for any OpenAI-compatible chat-completions endpoint. The
/// production deployment points this at OpenRouter via `base_url`.
pub struct OpenAiDetectorProvider {
    client: Client<OpenAIConfig>,
    model: String,
    max_retries: u32,
}

impl OpenAiDetectorProvider {
    pub fn new(config: &ProviderConfig, max_retries: u32) -> Result<Self> {
        let ProviderConfig::OpenAi {
            model,
            api_key,
            base_url,
            ..
        } = config;

        let api_key = match api_key {
            Some(key) => key.clone(),
            None => std::env::var("OPENAI_API_KEY")
                .map_err(|_| anyhow::anyhow!("OPENAI_API_KEY not set"))?,
        };

        let mut openai_config = OpenAIConfig::new().with_api_key(api_key);
        if let Some(base) = base_url {
            openai_config = openai_config.with_api_base(base);
        }

        Ok(Self {
            client: Client::with_config(openai_config),
            model: model.clone(),
            max_retries,
        })
    }
}

#[async_trait]
impl DetectorProvider for OpenAiDetectorProvider {
    async fn invoke(&self, request: DetectorRequest) -> Result<DetectorResponse, DetectorError> {
        debug!(
            category = %request.category,
            model = %self.model,
            "sending detector request"
        );

        let system_message = ChatCompletionRequestSystemMessage {
            content: request.instructions.clone(),
            ..Default::default()
        };

        let user_message = ChatCompletionRequestUserMessage {
            content: async_openai::types::ChatCompletionRequestUserMessageContent::Text(
                request.payload.clone(),
            ),
            ..Default::default()
        };

        let messages = vec![
            ChatCompletionRequestMessage::System(system_message),
            ChatCompletionRequestMessage::User(user_message),
        ];

        let api_request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(request.temperature)
            .max_tokens(request.max_tokens)
            .response_format(ChatCompletionResponseFormat {
                r#type: ChatCompletionResponseFormatType::JsonObject,
            })
            .build()
            .map_err(|e| DetectorError::Api(e.to_string()))?;

        let mut attempt = 0;
        let max_attempts = self.max_retries.max(1);
        let mut last_error = None;

        let response = loop {
            attempt += 1;

            match self.client.chat().create(api_request.clone()).await {
                Ok(response) => break response,
                Err(e) => {
                    warn!(
                        category = %request.category,
                        attempt,
                        "detector API error: {}",
                        e
                    );
                    let message = e.to_string();
                    let rate_limited = message.contains("rate") || message.contains("429");
                    last_error = Some(message);

                    if attempt >= max_attempts {
                        return Err(if rate_limited {
                            DetectorError::RateLimited
                        } else {
                            DetectorError::Api(last_error.unwrap_or_default())
                        });
                    }

                    let wait = if rate_limited {
                        Duration::from_secs(2_u64.pow(attempt))
                    } else {
                        Duration::from_millis(100 * attempt as u64)
                    };
                    tokio::time::sleep(wait).await;
                }
            }
        };

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| DetectorError::InvalidResponse("no content in response".to_string()))?;

        let usage = response
            .usage
            .map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            })
            .unwrap_or_default();

        debug!(
            category = %request.category,
            tokens = usage.total_tokens,
            "detector call completed"
        );

        Ok(DetectorResponse {
            content,
            model: response.model,
            usage,
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
