//! Relay endpoint configuration.

use std::borrow::Cow;

use secrecy::SecretString;
use serde::Deserialize;

/// Configuration for the chat relay endpoint and its upstream provider.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RelayConfig {
    /// The path where the relay endpoint will be mounted.
    pub path: Cow<'static, str>,

    /// The model identifier sent with every upstream request.
    pub model: String,

    /// API key for upstream authentication.
    ///
    /// Usually resolved from the process environment through a
    /// `{{ env.OPENAI_API_KEY }}` dynamic string in the TOML file.
    pub api_key: Option<SecretString>,

    /// Custom base URL for the upstream completion API.
    pub base_url: Option<String>,

    /// Completion token budget for text-only turns.
    pub max_tokens: u32,

    /// Completion token budget when the user attached files. Larger,
    /// since file content inflates the expected response.
    pub max_tokens_with_files: u32,

    /// Sampling temperature sent with every upstream request.
    pub temperature: f32,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            path: Cow::Borrowed("/ai"),
            model: "gpt-3.5-turbo".to_string(),
            api_key: None,
            base_url: None,
            max_tokens: 1000,
            max_tokens_with_files: 2000,
            temperature: 0.7,
        }
    }
}

impl RelayConfig {
    /// The completion token budget for a turn, depending on whether the
    /// user attached files.
    pub fn token_budget(&self, has_files: bool) -> u32 {
        if has_files { self.max_tokens_with_files } else { self.max_tokens }
    }
}

#[cfg(test)]
mod tests {
    use super::RelayConfig;

    #[test]
    fn defaults_match_documented_values() {
        let config = RelayConfig::default();

        assert_eq!(config.path, "/ai");
        assert_eq!(config.model, "gpt-3.5-turbo");
        assert_eq!(config.max_tokens, 1000);
        assert_eq!(config.max_tokens_with_files, 2000);
        assert!((config.temperature - 0.7).abs() < f32::EPSILON);
        assert!(config.api_key.is_none());
        assert!(config.base_url.is_none());
    }

    #[test]
    fn token_budget_depends_on_file_presence() {
        let config = RelayConfig::default();

        assert_eq!(config.token_budget(false), 1000);
        assert_eq!(config.token_budget(true), 2000);
    }
}
