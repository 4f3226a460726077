//! OpenAI chat client implementation.

use async_openai::{
    Client,
    config::OpenAIConfig as AsyncOpenAIConfig,
    types::{
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequest,
        CreateChatCompletionRequestArgs,
    },
};
use async_stream::try_stream;
use async_trait::async_trait;
use futures::StreamExt;
use tracing::debug;

use askbase_core::{AskError, Generator, Result, TextStream};

use super::config::OpenAIConfig;

/// Chat generator for the standard OpenAI API and OpenAI-compatible APIs.
///
/// The assembled RAG prompt is sent as a single user message; grounding
/// instructions are part of the prompt, so no separate system message is
/// needed.
pub struct OpenAIGenerator {
    client: Client<AsyncOpenAIConfig>,
    model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl OpenAIGenerator {
    /// Create a new OpenAI chat generator.
    pub fn new(config: OpenAIConfig) -> Result<Self> {
        let mut openai_config = AsyncOpenAIConfig::new().with_api_key(&config.api_key);

        if let Some(org_id) = &config.organization_id {
            openai_config = openai_config.with_org_id(org_id);
        }

        if let Some(base_url) = &config.base_url {
            openai_config = openai_config.with_api_base(base_url);
        }

        Ok(Self {
            client: Client::with_config(openai_config),
            model: config.model,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    /// Create a generator for an OpenAI-compatible API (Ollama, vLLM, ...).
    pub fn compatible(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self> {
        let config = OpenAIConfig::compatible(api_key.into(), base_url.into(), model.into());
        Self::new(config)
    }

    fn build_request(&self, prompt: &str) -> Result<CreateChatCompletionRequest> {
        let message = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| AskError::Model(format!("Failed to build message: {e}")))?;

        let mut request_builder = CreateChatCompletionRequestArgs::default();
        request_builder.model(&self.model).messages(vec![message.into()]);

        if let Some(temperature) = self.temperature {
            request_builder.temperature(temperature);
        }
        if let Some(max_tokens) = self.max_tokens {
            request_builder.max_tokens(max_tokens);
        }

        request_builder.build().map_err(|e| AskError::Model(format!("Failed to build request: {e}")))
    }
}

#[async_trait]
impl Generator for OpenAIGenerator {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        debug!(model = %self.model, prompt_len = prompt.len(), "chat completion request");

        let request = self.build_request(prompt)?;
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| AskError::Model(format!("OpenAI API error: {e}")))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AskError::Model("API returned no content".to_string()))
    }

    async fn generate_stream(&self, prompt: &str) -> Result<TextStream> {
        debug!(model = %self.model, prompt_len = prompt.len(), "streaming chat completion request");

        let request = self.build_request(prompt)?;
        let client = self.client.clone();

        let stream = try_stream! {
            // Make streaming request
            let mut stream = client
                .chat()
                .create_stream(request)
                .await
                .map_err(|e| AskError::Model(format!("OpenAI API error: {e}")))?;

            // Process stream chunks
            while let Some(result) = stream.next().await {
                let chunk = result.map_err(|e| AskError::Stream(format!("Stream error: {e}")))?;
                for choice in chunk.choices {
                    if let Some(content) = choice.delta.content {
                        if !content.is_empty() {
                            yield content;
                        }
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }
}
