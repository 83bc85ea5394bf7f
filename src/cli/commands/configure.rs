//! Configure command handler for API keys, the model and the system prompt.

use anyhow::Result;
use inquire::{Confirm, Editor, Password, PasswordDisplayMode, Select};

use crate::config::{Config, ConfigStore, mask_key};
use crate::translation::{MODELS, ProviderId, models};
use crate::ui::{Style, handle_prompt_cancellation};

/// Runs the interactive configure flow.
pub fn run_configure() -> Result<()> {
    handle_prompt_cancellation(run_configure_inner)
}

/// Prints the stored settings with keys masked.
pub fn show_config() -> Result<()> {
    let store = ConfigStore::new()?;
    let config = store.load();

    print_config(&config);
    println!(
        "{} {}",
        Style::label("file"),
        Style::secondary(store.path().display())
    );
    Ok(())
}

fn run_configure_inner() -> Result<()> {
    let store = ConfigStore::new()?;
    let mut config = store.load();

    print_config(&config);

    config.model_label = select_model(&config.model_label)?;
    let provider = models::resolve(&config.model_label)?.provider;

    if let Some(key) = prompt_api_key(provider, config.api_key(provider))? {
        config.set_api_key(provider, &key);
    }

    let edit_prompt = Confirm::new("Edit the system prompt?")
        .with_default(false)
        .prompt()?;
    if edit_prompt {
        let prompt = Editor::new("System prompt:")
            .with_predefined_text(&config.system_prompt)
            .prompt()?;
        if !prompt.trim().is_empty() {
            config.system_prompt = prompt.trim_end().to_string();
        }
    }

    store.save(&config)?;

    println!();
    println!(
        "{} Configuration saved to {}",
        Style::success("✓"),
        Style::secondary(store.path().display())
    );

    if config.api_key(provider).is_none() {
        println!(
            "{} No API key set for {provider}; translations with {} will fail.",
            Style::warning("Warning:"),
            config.model_label
        );
    }

    Ok(())
}

fn print_config(config: &Config) {
    println!("{}", Style::header("Current configuration"));
    println!(
        "  {}  {}",
        Style::label("model"),
        Style::value(&config.model_label)
    );
    if models::resolve(&config.model_label).is_err() {
        println!(
            "         {}",
            Style::warning("(not a known model; pick another one)")
        );
    }
    for &provider in ProviderId::ALL {
        let key = config
            .api_key(provider)
            .map_or_else(|| Style::secondary("(not set)"), |k| Style::value(mask_key(k)));
        println!(
            "  {}  {key}",
            Style::label(format!("{:<10}", format!("{} key", provider.as_str())))
        );
    }
    println!("  {}", Style::label("system prompt"));
    for line in config.system_prompt.lines() {
        println!("    {}", Style::secondary(line));
    }
    println!();
}

fn select_model(current: &str) -> Result<String> {
    let labels = models::list_labels();
    let start = labels.iter().position(|l| *l == current).unwrap_or(0);

    let selection = Select::new("Model:", labels)
        .with_starting_cursor(start)
        .with_page_size(MODELS.len())
        .prompt()?;

    Ok(selection.to_string())
}

/// Returns `None` when the user keeps the current key.
fn prompt_api_key(provider: ProviderId, current: Option<&str>) -> Result<Option<String>> {
    let help = current.map_or_else(
        || "Leave empty to skip".to_string(),
        |k| format!("Current: {}. Leave empty to keep it", mask_key(k)),
    );

    let key = Password::new(&format!("{provider} API key:"))
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_help_message(&help)
        .prompt()?;

    let key = key.trim();
    Ok((!key.is_empty()).then(|| key.to_string()))
}
