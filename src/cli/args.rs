use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "clip-translator")]
#[command(about = "Translate text with Claude, Gemini or OpenAI models")]
#[command(version)]
pub struct Args {
    /// File to translate (reads from stdin if neither FILE nor --text is given)
    pub file: Option<String>,

    /// Text to translate, instead of a file or stdin
    #[arg(long, conflicts_with = "file")]
    pub text: Option<String>,

    /// Model label for this run (see `clip-translator models`)
    #[arg(short = 'm', long)]
    pub model: Option<String>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,

    /// Wait for the whole reply instead of streaming it
    #[arg(long)]
    pub no_stream: bool,

    /// Suppress status output
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Show debug logs on stderr
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List available models and their prices
    Models,
    /// Set API keys, the model and the system prompt
    Configure {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
    /// Interactive chat mode for translation
    Chat {
        /// Model label for this session
        #[arg(short = 'm', long)]
        model: Option<String>,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_translate_flags() {
        let args = Args::try_parse_from([
            "clip-translator",
            "--text",
            "hello",
            "-m",
            "GPT-4o",
            "--json",
            "--no-stream",
        ])
        .unwrap();
        assert_eq!(args.text.as_deref(), Some("hello"));
        assert_eq!(args.model.as_deref(), Some("GPT-4o"));
        assert!(args.json);
        assert!(args.no_stream);
        assert!(args.command.is_none());
    }

    #[test]
    fn test_text_conflicts_with_file() {
        assert!(Args::try_parse_from(["clip-translator", "notes.md", "--text", "hi"]).is_err());
    }

    #[test]
    fn test_parse_subcommands() {
        let args = Args::try_parse_from(["clip-translator", "configure", "--show"]).unwrap();
        assert!(matches!(args.command, Some(Command::Configure { show: true })));

        let args = Args::try_parse_from(["clip-translator", "chat", "-m", "Claude 3 Opus"]).unwrap();
        assert!(
            matches!(args.command, Some(Command::Chat { model: Some(ref m) }) if m == "Claude 3 Opus")
        );
    }
}
