//! LLM provider abstraction and implementations.
//!
//! Supports Gemini, Anthropic, and `OpenAI` via a common trait. Each
//! provider is asked for exactly one JSON document per call.

pub mod anthropic;
pub mod gemini;
pub mod openai;

use crate::AiError;

/// Maximum tokens requested for a single completion.
pub(crate) const MAX_OUTPUT_TOKENS: u32 = 2048;

/// Trait for LLM providers.
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Sends a single-turn completion request and returns the raw text the
    /// model produced, which should be a JSON document matching `schema`.
    ///
    /// `schema` is a JSON Schema object (lower-case `type` names).
    ///
    /// # Errors
    ///
    /// Returns [`AiError`] if the request fails or the provider rejects it.
    async fn complete_json(
        &self,
        system_prompt: &str,
        prompt: &str,
        schema: &serde_json::Value,
    ) -> Result<String, AiError>;
}

/// Appends the schema to a system prompt for providers without native
/// structured output.
pub(crate) fn schema_instructions(system_prompt: &str, schema: &serde_json::Value) -> String {
    format!(
        "{system_prompt}\n\nResponda apenas com um único documento JSON válido, sem markdown, \
         que siga exatamente este JSON Schema:\n{schema}"
    )
}

/// Creates an LLM provider based on environment variables.
///
/// If `AI_PROVIDER` is explicitly set, uses that provider. Otherwise
/// auto-detects from available credentials:
///
/// 1. `GEMINI_API_KEY` (or `API_KEY`) set -> Gemini
/// 2. `ANTHROPIC_API_KEY` set -> Anthropic Claude
/// 3. `OPENAI_API_KEY` set -> `OpenAI`
///
/// `AI_PROVIDER=offline` disables analysis altogether.
///
/// `AI_MODEL` overrides the provider's default model and `AI_BASE_URL`
/// points the `OpenAI` provider at a compatible self-hosted server.
///
/// # Errors
///
/// Returns [`AiError::Config`] if no credentials are found or the
/// explicitly requested provider is not configured.
pub fn create_provider_from_env() -> Result<Box<dyn LlmProvider>, AiError> {
    let provider = std::env::var("AI_PROVIDER").unwrap_or_else(|_| detect_provider());
    let model = std::env::var("AI_MODEL").ok();

    match provider.to_lowercase().as_str() {
        "gemini" | "google" => {
            let api_key = std::env::var("GEMINI_API_KEY")
                .or_else(|_| std::env::var("API_KEY"))
                .map_err(|_| AiError::Config {
                    message: "GEMINI_API_KEY environment variable not set".to_string(),
                })?;
            let model = model.unwrap_or_else(|| gemini::DEFAULT_MODEL.to_string());
            Ok(Box::new(gemini::GeminiProvider::new(api_key, model)))
        }
        "anthropic" | "claude" => {
            let api_key = std::env::var("ANTHROPIC_API_KEY").map_err(|_| AiError::Config {
                message: "ANTHROPIC_API_KEY environment variable not set".to_string(),
            })?;
            let model = model.unwrap_or_else(|| anthropic::DEFAULT_MODEL.to_string());
            Ok(Box::new(anthropic::AnthropicProvider::new(api_key, model)))
        }
        "openai" | "gpt" => {
            let base_url = std::env::var("AI_BASE_URL").ok();
            // Self-hosted OpenAI-compatible servers usually don't need a key.
            let api_key = match std::env::var("OPENAI_API_KEY") {
                Ok(key) => key,
                Err(_) if base_url.is_some() => String::new(),
                Err(_) => {
                    return Err(AiError::Config {
                        message: "OPENAI_API_KEY environment variable not set".to_string(),
                    });
                }
            };
            let model = model.unwrap_or_else(|| openai::DEFAULT_MODEL.to_string());
            let mut provider = openai::OpenAiProvider::new(api_key, model);
            if let Some(url) = base_url {
                provider = provider.with_base_url(url);
            }
            Ok(Box::new(provider))
        }
        "offline" | "none" => Err(AiError::Config {
            message: "AI analysis disabled (AI_PROVIDER=offline)".to_string(),
        }),
        other => Err(AiError::Config {
            message: format!(
                "Unknown AI provider: {other}. Use 'gemini', 'anthropic', 'openai' or 'offline'."
            ),
        }),
    }
}

/// Auto-detects which provider to use based on available credentials.
///
/// Returns a provider name string that matches the arms in
/// [`create_provider_from_env`].
fn detect_provider() -> String {
    if std::env::var("GEMINI_API_KEY").is_ok() || std::env::var("API_KEY").is_ok() {
        log::info!("Auto-detected AI provider: Gemini (GEMINI_API_KEY found)");
        return "gemini".to_string();
    }

    if std::env::var("ANTHROPIC_API_KEY").is_ok() {
        log::info!("Auto-detected AI provider: Anthropic (ANTHROPIC_API_KEY found)");
        return "anthropic".to_string();
    }

    if std::env::var("OPENAI_API_KEY").is_ok() || std::env::var("AI_BASE_URL").is_ok() {
        log::info!("Auto-detected AI provider: OpenAI-compatible");
        return "openai".to_string();
    }

    log::warn!(
        "No AI credentials detected. Set one of: GEMINI_API_KEY, ANTHROPIC_API_KEY, \
         OPENAI_API_KEY or AI_BASE_URL. You can also set AI_PROVIDER explicitly."
    );

    // Fall back to gemini, which produces a clear error about the missing key
    "gemini".to_string()
}
