//! Model registry: user-facing model labels and the provider behind each one.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A remote LLM provider with its own request/response shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Anthropic,
    Gemini,
    OpenAi,
}

impl ProviderId {
    pub const ALL: &'static [Self] = &[Self::Anthropic, Self::Gemini, Self::OpenAi];

    /// Lowercase identifier used as the key in the config document.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Anthropic => "anthropic",
            Self::Gemini => "gemini",
            Self::OpenAi => "openai",
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Anthropic => "Anthropic",
            Self::Gemini => "Gemini",
            Self::OpenAi => "OpenAI",
        }
    }

    /// Parses the config-document key, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "anthropic" => Some(Self::Anthropic),
            "gemini" => Some(Self::Gemini),
            "openai" => Some(Self::OpenAi),
            _ => None,
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One selectable model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelEntry {
    /// Stable user-facing label, unique within the registry.
    pub label: &'static str,
    pub provider: ProviderId,
    /// Identifier sent on the wire to the provider.
    pub provider_model_id: &'static str,
    /// Upper bound on generated tokens requested for this model.
    pub max_output_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("unknown model: '{0}'")]
    UnknownModel(String),
}

/// Label selected when nothing else is configured.
pub const DEFAULT_MODEL_LABEL: &str = "Gemini 1.5 Flash";

/// Registry content in display order.
pub const MODELS: &[ModelEntry] = &[
    ModelEntry {
        label: "Gemini 1.5 Flash",
        provider: ProviderId::Gemini,
        provider_model_id: "gemini-1.5-flash-latest",
        max_output_tokens: 8192,
    },
    ModelEntry {
        label: "Gemini 1.5 Pro",
        provider: ProviderId::Gemini,
        provider_model_id: "models/gemini-1.5-pro-latest",
        max_output_tokens: 8192,
    },
    ModelEntry {
        label: "Claude 3 Haiku",
        provider: ProviderId::Anthropic,
        provider_model_id: "claude-3-haiku-20240307",
        max_output_tokens: 4096,
    },
    ModelEntry {
        label: "Claude 3 Sonnet",
        provider: ProviderId::Anthropic,
        provider_model_id: "claude-3-sonnet-20240229",
        max_output_tokens: 4096,
    },
    ModelEntry {
        label: "Claude 3 Opus",
        provider: ProviderId::Anthropic,
        provider_model_id: "claude-3-opus-20240229",
        max_output_tokens: 4096,
    },
    ModelEntry {
        label: "GPT-3.5 Turbo",
        provider: ProviderId::OpenAi,
        provider_model_id: "gpt-3.5-turbo",
        max_output_tokens: 4096,
    },
    ModelEntry {
        label: "GPT-4o",
        provider: ProviderId::OpenAi,
        provider_model_id: "gpt-4o",
        max_output_tokens: 4096,
    },
    ModelEntry {
        label: "GPT-4o mini",
        provider: ProviderId::OpenAi,
        provider_model_id: "gpt-4o-mini",
        max_output_tokens: 4096,
    },
];

/// Looks up a model by its label.
pub fn resolve(label: &str) -> Result<&'static ModelEntry, ModelError> {
    MODELS
        .iter()
        .find(|m| m.label == label)
        .ok_or_else(|| ModelError::UnknownModel(label.to_string()))
}

/// Labels in declaration order.
pub fn list_labels() -> Vec<&'static str> {
    MODELS.iter().map(|m| m.label).collect()
}
