use crate::config::{Config, resolve_secret};
use crate::providers::OpenAIProvider;
use crate::traits::Provider;
use anyhow::{Result, anyhow};

const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

pub fn create_provider(config: &Config) -> Result<Box<dyn Provider>> {
    let provider_name = config.provider.as_deref().unwrap_or("openai");

    let (env_vars, default_base_url): (&[&str], Option<&str>) =
        match provider_name.to_lowercase().as_str() {
            "openai" => (&["OPENAI_API_KEY", "REBO_OPENAI_API_KEY"], None),
            "openrouter" => (
                &["OPENROUTER_API_KEY", "REBO_OPENROUTER_API_KEY"],
                Some(OPENROUTER_BASE_URL),
            ),
            _ => {
                return Err(anyhow!(
                    "Unknown provider: {}. Available: openai, openrouter",
                    provider_name
                ));
            }
        };

    let api_key = resolve_secret(env_vars, Some(&config.api_key))
        .ok_or_else(|| anyhow!("No API key found for provider {}", provider_name))?;

    let mut provider = OpenAIProvider::new(api_key)
        .with_model(config.model.clone())
        .with_temperature(config.temperature);
    if let Some(base_url) = config.base_url.as_deref().or(default_base_url) {
        provider = provider.with_base_url(base_url);
    }
    Ok(Box::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_provider_is_rejected() {
        let config = Config {
            provider: Some("carrier-pigeon".into()),
            api_key: "k".into(),
            ..Config::default()
        };
        let err = create_provider(&config).err().unwrap();
        assert!(err.to_string().contains("Unknown provider"));
    }

    #[test]
    fn configured_key_builds_provider() {
        let config = Config {
            provider: Some("OpenRouter".into()),
            api_key: "k".into(),
            ..Config::default()
        };
        assert!(create_provider(&config).is_ok());
    }
}
