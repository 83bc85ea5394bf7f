use anyhow::Result;
use std::io::{self, Write};

use crate::cli::{CommandError, failure_exit_code};
use crate::config::{Config, ConfigStore};
use crate::input::{InputReader, InputSource};
use crate::translation::{Dispatcher, TranslationResult};
use crate::ui::{Spinner, Style, cost_line};

pub struct TranslateOptions {
    pub file: Option<String>,
    pub text: Option<String>,
    pub model: Option<String>,
    pub json: bool,
    pub no_stream: bool,
}

pub async fn run_translate(options: TranslateOptions) -> Result<()> {
    let source = InputSource::select(options.text.as_deref(), options.file.as_deref());
    let source_text = InputReader::read(source)
        .map_err(|e| CommandError::new(exitcode::NOINPUT, format!("{e:#}")))?;

    if source_text.trim().is_empty() {
        return Err(CommandError::new(exitcode::DATAERR, "Input is empty").into());
    }

    let store = ConfigStore::new()?;
    let config = load_config(&store, options.model, options.json)?;
    let dispatcher = Dispatcher::http()?;

    if options.json {
        let result = if options.no_stream {
            dispatcher.translate(&config, &source_text).await
        } else {
            dispatcher
                .translate_streaming(&config, &source_text, |_| {})
                .await
        };
        println!("{}", serde_json::to_string_pretty(&result)?);
        return match result {
            TranslationResult::Success { .. } => Ok(()),
            TranslationResult::Error { kind, .. } => {
                Err(CommandError::reported(failure_exit_code(kind)).into())
            }
        };
    }

    let spinner = Spinner::new("Translating...");
    let result = if options.no_stream {
        let result = dispatcher.translate(&config, &source_text).await;
        spinner.stop();
        if let Some(text) = result.destination_text() {
            print!("{text}");
        }
        result
    } else {
        dispatcher
            .translate_streaming(&config, &source_text, |fragment| {
                spinner.stop();
                print!("{fragment}");
                let _ = io::stdout().flush();
            })
            .await
    };
    spinner.stop();

    finish(result)
}

/// Loads the saved settings, applies a one-off model override and checks the
/// credential for the selected provider.
///
/// In JSON mode a missing credential is left to the dispatcher so it shows up
/// as a structured result.
fn load_config(store: &ConfigStore, model: Option<String>, json: bool) -> Result<Config> {
    let config = match model {
        Some(label) => {
            let mut config = store.load();
            config.model_label = label;
            if !json {
                config.check_credential().map_err(CommandError::from)?;
            }
            config
        }
        None if json => store.load(),
        None => store
            .require_selected_credential()
            .map_err(CommandError::from)?,
    };
    Ok(config)
}

fn finish(result: TranslationResult) -> Result<()> {
    match result {
        TranslationResult::Success {
            destination_text,
            cost_usd,
            usage,
        } => {
            if !destination_text.ends_with('\n') {
                println!();
            }
            io::stdout().flush()?;
            crate::status!("{}", Style::secondary(cost_line(cost_usd, usage.as_ref())));
            Ok(())
        }
        TranslationResult::Error { kind, message } => {
            Err(CommandError::from_failure(kind, &message).into())
        }
    }
}
