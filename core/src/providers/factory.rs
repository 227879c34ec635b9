use crate::config::Config;
use crate::providers::AnthropicProvider;
use crate::traits::Provider;
use anyhow::{Result, anyhow};
use std::sync::Arc;

pub fn create_provider(config: &Config) -> Result<Arc<dyn Provider>> {
    let provider_name = config.provider.as_deref().unwrap_or("anthropic");

    match provider_name.to_lowercase().as_str() {
        "anthropic" => {
            let api_key = resolve_api_key_with_fallback(
                &["ANTHROPIC_API_KEY", "TYMORA_ANTHROPIC_API_KEY"],
                &config.api_key,
            )?;
            let mut provider = AnthropicProvider::new(api_key).with_model(config.model.clone());
            if let Some(base_url) = &config.base_url {
                provider = provider.with_base_url(base_url.clone());
            }
            Ok(Arc::new(provider))
        }
        _ => Err(anyhow!(
            "Unknown provider: {}. Available: anthropic",
            provider_name
        )),
    }
}

fn resolve_api_key_with_fallback(env_vars: &[&str], config_key: &str) -> Result<String> {
    for var_name in env_vars {
        if let Ok(key) = std::env::var(var_name)
            && !key.is_empty()
        {
            return Ok(key);
        }
    }
    if !config_key.is_empty() {
        Ok(config_key.to_string())
    } else {
        Err(anyhow!(
            "No API key found. Set ANTHROPIC_API_KEY or run 'tymora onboard'."
        ))
    }
}
