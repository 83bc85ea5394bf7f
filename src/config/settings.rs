use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use super::ConfigError;
use crate::translation::models::{self, DEFAULT_MODEL_LABEL, ModelEntry, ProviderId};
use crate::translation::prompt::DEFAULT_SYSTEM_PROMPT;

/// Flat keys written by earlier releases, mapped onto the provider they belong to.
const LEGACY_KEY_FIELDS: &[(&str, ProviderId)] = &[
    ("anthropic_api_key", ProviderId::Anthropic),
    ("gemini_api_key", ProviderId::Gemini),
    ("openai_api_key", ProviderId::OpenAi),
];

/// The persisted settings document.
///
/// Corresponds to `~/.config/clip-translator/config.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// One key per provider; an empty string means not configured.
    pub api_keys: BTreeMap<ProviderId, String>,
    /// Instructions sent with every translation request.
    pub system_prompt: String,
    /// Registry label of the selected model. Not validated on load.
    pub model_label: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_keys: ProviderId::ALL
                .iter()
                .map(|&p| (p, String::new()))
                .collect(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            model_label: DEFAULT_MODEL_LABEL.to_string(),
        }
    }
}

impl Config {
    /// Builds a config from an arbitrary JSON value, field by field.
    ///
    /// Fields that are missing or have the wrong type keep their defaults.
    /// Legacy flat keys are read too; the current shape wins when both exist.
    pub fn from_value(value: &Value) -> Self {
        let mut config = Self::default();
        let Some(doc) = value.as_object() else {
            return config;
        };

        for &(field, provider) in LEGACY_KEY_FIELDS {
            if let Some(key) = doc.get(field).and_then(Value::as_str) {
                config.set_api_key(provider, key);
            }
        }
        if let Some(prompt) = non_blank(doc.get("system_prompt")) {
            config.system_prompt = prompt.to_string();
        }
        if let Some(label) = non_blank(doc.get("model")) {
            config.model_label = label.to_string();
        }

        // An empty entry never clears a key taken from a legacy field.
        if let Some(keys) = doc.get("apiKeys").and_then(Value::as_object) {
            for (name, key) in keys {
                if let (Some(provider), Some(key)) =
                    (ProviderId::parse(name), non_blank(Some(key)))
                {
                    config.set_api_key(provider, key);
                }
            }
        }
        if let Some(prompt) = non_blank(doc.get("systemPrompt")) {
            config.system_prompt = prompt.to_string();
        }
        if let Some(label) = non_blank(doc.get("modelLabel")) {
            config.model_label = label.to_string();
        }

        config
    }

    /// Returns the key for `provider`, treating an empty key as absent.
    pub fn api_key(&self, provider: ProviderId) -> Option<&str> {
        self.api_keys
            .get(&provider)
            .map(|k| k.as_str())
            .filter(|k| !k.is_empty())
    }

    pub fn set_api_key(&mut self, provider: ProviderId, key: &str) {
        self.api_keys.insert(provider, key.trim().to_string());
    }

    /// Providers that have a non-empty key, in declaration order.
    pub fn configured_providers(&self) -> Vec<ProviderId> {
        ProviderId::ALL
            .iter()
            .copied()
            .filter(|&p| self.api_key(p).is_some())
            .collect()
    }

    /// Resolves the selected label against the registry.
    pub fn selected_model(&self) -> Result<&'static ModelEntry, ConfigError> {
        models::resolve(&self.model_label)
            .map_err(|_| ConfigError::UnknownModel(self.model_label.clone()))
    }

    /// Resolves the selected model and checks that its provider has a key.
    pub fn check_credential(&self) -> Result<&'static ModelEntry, ConfigError> {
        let entry = self.selected_model()?;
        self.api_key(entry.provider)
            .map(|_| entry)
            .ok_or(ConfigError::MissingCredential(entry.provider))
    }
}

fn non_blank(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

/// Masks an API key for display, keeping a short prefix and suffix.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.is_empty() {
        return String::new();
    }
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}…{tail}")
}
