use anyhow::{bail, Result};
use cliclack::spinner;
use console::style;
use docent::client::RelayClient;
use docent::session::ChatSession;
use docent::store::FileDocumentStore;
use std::path::Path;

use crate::document::{self, Extraction};

pub async fn execute(language: &str, path: Option<&Path>, server: &str) -> Result<()> {
    let store = FileDocumentStore::default_location()?;
    let document = document::load(path, &store, Extraction::Required)?.document;

    let client = RelayClient::new(server)?;
    let mut session = ChatSession::new(client, document.name(), document.text().map(String::from));

    let spin = spinner();
    spin.start(format!("Translating {} to {}", document.name(), language));
    match session.translate(language).await {
        Some(translation) if translation.is_failed() => {
            spin.stop(style(translation.text()).red());
            bail!("Translation to {} failed", language)
        }
        Some(translation) => {
            spin.stop(format!("Translated to {}", language));
            println!("{}", translation.text());
            Ok(())
        }
        None => {
            spin.stop(style("Nothing to translate").red());
            bail!("{} has no text to translate", document.name())
        }
    }
}
