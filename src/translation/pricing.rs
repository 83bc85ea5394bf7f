//! Per-model token prices and request cost estimation.

use thiserror::Error;

use super::providers::Usage;

/// USD price per one million tokens for a provider model id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelPrice {
    pub provider_model_id: &'static str,
    pub input_per_million: f64,
    pub output_per_million: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    #[error("no pricing known for model '{0}'")]
    UnknownPricing(String),
}

/// Published list prices at integration time. Update here when a provider
/// changes its rates.
pub const MODEL_PRICES: &[ModelPrice] = &[
    ModelPrice {
        provider_model_id: "gemini-1.5-flash-latest",
        input_per_million: 0.35,
        output_per_million: 0.53,
    },
    ModelPrice {
        provider_model_id: "models/gemini-1.5-pro-latest",
        input_per_million: 3.5,
        output_per_million: 21.0,
    },
    ModelPrice {
        provider_model_id: "claude-3-haiku-20240307",
        input_per_million: 0.25,
        output_per_million: 1.25,
    },
    ModelPrice {
        provider_model_id: "claude-3-sonnet-20240229",
        input_per_million: 3.0,
        output_per_million: 15.0,
    },
    ModelPrice {
        provider_model_id: "claude-3-opus-20240229",
        input_per_million: 15.0,
        output_per_million: 75.0,
    },
    ModelPrice {
        provider_model_id: "gpt-3.5-turbo",
        input_per_million: 0.5,
        output_per_million: 1.5,
    },
    ModelPrice {
        provider_model_id: "gpt-4o",
        input_per_million: 5.0,
        output_per_million: 15.0,
    },
    ModelPrice {
        provider_model_id: "gpt-4o-mini",
        input_per_million: 0.15,
        output_per_million: 0.6,
    },
];

pub fn price_for(provider_model_id: &str) -> Result<&'static ModelPrice, PricingError> {
    MODEL_PRICES
        .iter()
        .find(|p| p.provider_model_id == provider_model_id)
        .ok_or_else(|| PricingError::UnknownPricing(provider_model_id.to_string()))
}

/// Estimated USD cost of one request.
pub fn cost(provider_model_id: &str, usage: &Usage) -> Result<f64, PricingError> {
    let price = price_for(provider_model_id)?;
    Ok(price.cost(usage))
}

impl ModelPrice {
    pub fn cost(&self, usage: &Usage) -> f64 {
        (usage.input_tokens as f64 / 1_000_000.0) * self.input_per_million
            + (usage.output_tokens as f64 / 1_000_000.0) * self.output_per_million
    }
}
