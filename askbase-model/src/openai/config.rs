//! Configuration for the OpenAI chat backend.

/// Configuration for [`OpenAIGenerator`](super::OpenAIGenerator).
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// API key. Compatible servers often accept any non-empty value.
    pub api_key: String,
    /// Model name (e.g. `gpt-4o-mini`, or a local model tag for Ollama).
    pub model: String,
    /// Override of the API base URL for OpenAI-compatible servers.
    pub base_url: Option<String>,
    /// Optional OpenAI organization ID.
    pub organization_id: Option<String>,
    /// Sampling temperature. Grounded answering works best low.
    pub temperature: Option<f32>,
    /// Maximum number of tokens to generate.
    pub max_tokens: Option<u32>,
}

impl OpenAIConfig {
    /// Configuration for the hosted OpenAI API.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: None,
            organization_id: None,
            temperature: None,
            max_tokens: None,
        }
    }

    /// Configuration for an OpenAI-compatible API at a custom base URL.
    pub fn compatible(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        let mut config = Self::new(api_key, model);
        config.base_url = Some(base_url.into());
        config
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the generation length limit.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the OpenAI organization ID.
    pub fn with_organization(mut self, organization_id: impl Into<String>) -> Self {
        self.organization_id = Some(organization_id.into());
        self
    }
}
