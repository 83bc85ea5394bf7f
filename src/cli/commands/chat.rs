use anyhow::Result;

use crate::chat::ChatSession;
use crate::cli::CommandError;
use crate::config::ConfigStore;
use crate::translation::{Dispatcher, models};

pub struct ChatOptions {
    pub model: Option<String>,
}

pub async fn run_chat(options: ChatOptions) -> Result<()> {
    let store = ConfigStore::new()?;
    let mut config = store.load();

    // A label given on the command line lasts for this session only.
    if let Some(label) = options.model {
        models::resolve(&label).map_err(|e| CommandError::new(exitcode::USAGE, e.to_string()))?;
        config.model_label = label;
    }

    let mut session = ChatSession::new(store, config, Dispatcher::http()?);
    session.run().await
}
