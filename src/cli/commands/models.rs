//! Lists the model registry with prices and credential status.

use anyhow::Result;

use crate::config::{Config, ConfigStore};
use crate::translation::{MODELS, ModelEntry, pricing};
use crate::ui::Style;

pub fn print_models() -> Result<()> {
    let config = ConfigStore::new()?.load();

    println!("{}", Style::header("Available models"));
    for entry in MODELS {
        println!("{}", model_line(entry, &config));
    }
    println!();
    println!("{}", Style::hint("Prices are USD per million input / output tokens."));

    Ok(())
}

fn model_line(entry: &ModelEntry, config: &Config) -> String {
    let marker = if entry.label == config.model_label {
        Style::selected_marker()
    } else {
        " ".to_string()
    };

    let prices = pricing::price_for(entry.provider_model_id).map_or_else(
        |_| "price unknown".to_string(),
        |p| format!("${} / ${}", p.input_per_million, p.output_per_million),
    );

    let key_status = if config.api_key(entry.provider).is_some() {
        Style::success("key set")
    } else {
        Style::warning("no key")
    };

    format!(
        "{marker} {} {:<10} {} {:<14} {key_status}",
        Style::value(format!("{:<18}", entry.label)),
        entry.provider.display_name(),
        Style::secondary(format!("{:<30}", entry.provider_model_id)),
        prices,
    )
}
