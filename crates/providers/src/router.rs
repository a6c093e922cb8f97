//! Provider selection: builds the configured default generation provider.

use crate::openai_compat::OpenAiCompatProvider;
use shuttlechat_config::AppConfig;
use shuttlechat_core::provider::Provider;
use std::sync::Arc;
use tracing::debug;

/// Build the provider named by `default_provider`.
///
/// A `[providers.<name>]` entry may override the key and URL; otherwise the
/// root `api_key` and the well-known base URL for the name apply.
pub fn build_default(config: &AppConfig) -> Arc<dyn Provider> {
    let name = &config.default_provider;
    let overrides = config.providers.get(name);

    let api_key = overrides
        .and_then(|p| p.api_key.clone())
        .or_else(|| config.api_key.clone())
        .unwrap_or_default();
    let base_url = overrides
        .and_then(|p| p.api_url.clone())
        .unwrap_or_else(|| default_base_url(name));

    debug!(provider = %name, base_url = %base_url, "Generation provider selected");
    Arc::new(OpenAiCompatProvider::new(name.as_str(), base_url, api_key))
}

/// Default base URL for well-known OpenAI-compatible services.
fn default_base_url(provider_name: &str) -> String {
    match provider_name {
        "openai" => "https://api.openai.com/v1".into(),
        "openrouter" => "https://openrouter.ai/api/v1".into(),
        "ollama" => "http://localhost:11434/v1".into(),
        "groq" => "https://api.groq.com/openai/v1".into(),
        _ => format!("https://{provider_name}.api.example.com/v1"),
    }
}

/// Resolve the model for the default provider: a per-provider override wins
/// over the global default.
pub fn resolve_model(config: &AppConfig) -> String {
    config
        .providers
        .get(&config.default_provider)
        .and_then(|p| p.default_model.clone())
        .unwrap_or_else(|| config.default_model.clone())
}
