//! Chat mode UI components.

use crate::config::Config;
use crate::translation::MODELS;
use crate::ui::{Style, format_cost};

use super::CostLedger;

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn print_header(config: &Config) {
    println!(
        "{} {} - Interactive Translation Mode",
        Style::header("clip-translator"),
        Style::version(format!("v{VERSION}"))
    );
    println!(
        "{} {}",
        Style::label("model"),
        Style::value(&config.model_label)
    );
    println!();
}

pub fn print_goodbye(ledger: &CostLedger) {
    if ledger.priced() + ledger.unpriced() > 0 {
        println!(
            "{}",
            Style::secondary(format!(
                "Session cost: {}",
                format_cost(Some(ledger.total_usd()))
            ))
        );
    }
    println!("{}", Style::success("Goodbye!"));
}

pub fn print_config(config: &Config, path: &str) {
    println!("{}", Style::header("Configuration"));
    println!(
        "  {}     {}",
        Style::label("model"),
        Style::value(&config.model_label)
    );
    let providers: Vec<&str> = config
        .configured_providers()
        .iter()
        .map(|p| p.display_name())
        .collect();
    println!(
        "  {}      {}",
        Style::label("keys"),
        if providers.is_empty() {
            Style::secondary("(none)")
        } else {
            Style::value(providers.join(", "))
        }
    );
    println!("  {}      {}", Style::label("file"), Style::secondary(path));
    println!();
}

pub fn print_models(config: &Config) {
    println!("{}", Style::header("Models"));
    for entry in MODELS {
        let marker = if entry.label == config.model_label {
            Style::selected_marker()
        } else {
            " ".to_string()
        };
        let key = if config.api_key(entry.provider).is_some() {
            String::new()
        } else {
            Style::warning(" (no key)")
        };
        println!(
            "  {marker} {} {}{key}",
            Style::value(entry.label),
            Style::secondary(entry.provider.display_name())
        );
    }
    println!("{}", Style::hint("Switch with /model <label>"));
    println!();
}

pub fn print_cost(ledger: &CostLedger) {
    println!(
        "{} {} over {} translation(s)",
        Style::label("session cost"),
        Style::value(format_cost(Some(ledger.total_usd()))),
        ledger.priced()
    );
    if ledger.unpriced() > 0 {
        println!(
            "{}",
            Style::hint(format!(
                "{} translation(s) had no usage data and are not included",
                ledger.unpriced()
            ))
        );
    }
    println!();
}

pub fn print_help() {
    println!("{}", Style::header("Available commands"));
    for (command, description) in [
        ("/model [label]", "Show models or switch to <label> (saved)"),
        ("/models", "List available models"),
        ("/config", "Show current configuration"),
        ("/cost", "Show the cost of this session"),
        ("/help", "Show this help"),
        ("/quit", "Exit chat mode"),
    ] {
        println!(
            "  {}  {}",
            Style::command(format!("{command:<15}")),
            Style::secondary(description)
        );
    }
    println!();
}

pub fn print_success(message: &str) {
    println!("{} {message}", Style::success("✓"));
    println!();
}

pub fn print_error(message: &str) {
    eprintln!("{} {message}", Style::error("Error:"));
    eprintln!();
}
