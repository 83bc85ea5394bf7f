use anyhow::Result;
use inquire::Text;
use inquire::ui::{Attributes, Color, RenderConfig, StyleSheet, Styled};
use std::io::{self, Write};

use super::CostLedger;
use super::command::{Input, SlashCommand, SlashCommandCompleter, parse_input};
use super::ui;
use crate::config::{Config, ConfigError, ConfigStore};
use crate::translation::{Dispatcher, TranslationResult, models};
use crate::ui::{Spinner, Style, cost_line};

/// An interactive chat session for translation.
///
/// The config is loaded once; `/model` changes are written back to the store.
pub struct ChatSession {
    store: ConfigStore,
    config: Config,
    dispatcher: Dispatcher,
    ledger: CostLedger,
}

impl ChatSession {
    pub fn new(store: ConfigStore, config: Config, dispatcher: Dispatcher) -> Self {
        Self {
            store,
            config,
            dispatcher,
            ledger: CostLedger::default(),
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        ui::print_header(&self.config);

        let prompt_style = Styled::new("❯")
            .with_fg(Color::LightBlue)
            .with_attr(Attributes::BOLD);
        let mut render_config = RenderConfig::default()
            .with_prompt_prefix(prompt_style)
            .with_answered_prompt_prefix(prompt_style);
        render_config.option = StyleSheet::new().with_fg(Color::Grey);
        render_config.selected_option = Some(StyleSheet::new().with_fg(Color::DarkMagenta));

        loop {
            let input = Text::new("")
                .with_render_config(render_config)
                .with_autocomplete(SlashCommandCompleter)
                .with_help_message("Type text to translate, /help for commands, Ctrl+C to quit")
                .prompt();

            match input {
                Ok(line) => match parse_input(&line) {
                    Input::Empty => {}
                    Input::Command(cmd) => {
                        if !self.handle_command(cmd) {
                            break;
                        }
                    }
                    Input::Text(text) => self.translate_and_print(&text).await?,
                },
                Err(
                    inquire::InquireError::OperationCanceled
                    | inquire::InquireError::OperationInterrupted,
                ) => {
                    println!();
                    break;
                }
                Err(e) => return Err(e.into()),
            }
        }

        ui::print_goodbye(&self.ledger);
        Ok(())
    }

    /// Returns `false` when the session should end.
    fn handle_command(&mut self, cmd: SlashCommand) -> bool {
        match cmd {
            SlashCommand::Config => {
                ui::print_config(&self.config, &self.store.path().display().to_string());
            }
            SlashCommand::Cost => ui::print_cost(&self.ledger),
            SlashCommand::Help => ui::print_help(),
            SlashCommand::Model(None) | SlashCommand::Models => ui::print_models(&self.config),
            SlashCommand::Model(Some(label)) => self.switch_model(&label),
            SlashCommand::Quit => return false,
            SlashCommand::Unknown(cmd) => {
                ui::print_error(&format!("Unknown command: /{cmd}"));
            }
        }
        true
    }

    fn switch_model(&mut self, label: &str) {
        let entry = match models::resolve(label) {
            Ok(entry) => entry,
            Err(e) => {
                ui::print_error(&format!("{e}. Use /models to see the choices."));
                return;
            }
        };

        // Only the label is written back; other settings stay as stored.
        let mut saved = self.store.load();
        saved.model_label = entry.label.to_string();
        if let Err(e) = self.store.save(&saved) {
            ui::print_error(&e.to_string());
            return;
        }
        self.config.model_label = entry.label.to_string();

        if self.config.api_key(entry.provider).is_none() {
            match self.store.require_credential(entry.provider) {
                Ok(fresh) => self.config.api_keys = fresh.api_keys,
                Err(e @ ConfigError::MissingCredential(_)) => {
                    println!(
                        "{} {e}; run 'clip-translator configure' to add it.",
                        Style::warning("Warning:")
                    );
                }
                Err(e) => ui::print_error(&e.to_string()),
            }
        }

        ui::print_success(&format!("Model set to {}", Style::value(entry.label)));
    }

    async fn translate_and_print(&mut self, text: &str) -> Result<()> {
        let spinner = Spinner::new("Translating...");
        let mut printed = false;

        let result = self
            .dispatcher
            .translate_streaming(&self.config, text, |fragment| {
                spinner.stop();
                print!("{fragment}");
                let _ = io::stdout().flush();
                printed = true;
            })
            .await;
        spinner.stop();

        if printed {
            println!();
        }
        self.ledger.record(&result);

        match result {
            TranslationResult::Success { cost_usd, usage, .. } => {
                crate::status!("{}", Style::secondary(cost_line(cost_usd, usage.as_ref())));
                println!();
            }
            TranslationResult::Error { kind, message } => {
                if kind.needs_configuration() {
                    ui::print_error(&format!(
                        "{message}\nRun 'clip-translator configure' or pick another model with /model."
                    ));
                } else {
                    ui::print_error(&message);
                }
            }
        }

        io::stdout().flush()?;
        Ok(())
    }
}
