use anyhow::Result;
use clap::Parser;

use clip_translator::cli::commands::{chat, configure, models, translate};
use clip_translator::cli::{Args, Command, exit_code};
use clip_translator::output::{self, OutputConfig};
use clip_translator::ui::Style;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    output::init(OutputConfig::from_flags(args.quiet, args.no_color));
    output::init_tracing(args.verbose);

    if let Err(err) = run(args).await {
        let message = format!("{err:#}");
        if !message.is_empty() {
            eprintln!("{} {message}", Style::error("Error:"));
        }
        std::process::exit(exit_code(&err));
    }
}

async fn run(args: Args) -> Result<()> {
    match args.command {
        Some(Command::Models) => models::print_models(),
        Some(Command::Configure { show: true }) => configure::show_config(),
        Some(Command::Configure { show: false }) => configure::run_configure(),
        Some(Command::Chat { model }) => chat::run_chat(chat::ChatOptions { model }).await,
        None => {
            let options = translate::TranslateOptions {
                file: args.file,
                text: args.text,
                model: args.model,
                json: args.json,
                no_stream: args.no_stream,
            };
            translate::run_translate(options).await
        }
    }
}
