use anyhow::Result;
use cliclack::{input, spinner};
use console::style;
use docent::client::RelayClient;
use docent::session::ChatSession;
use docent::store::FileDocumentStore;
use std::io::{self, Write};
use std::path::Path;

use crate::document::{self, Extraction, SaveStatus};
use crate::input::{self, ChatInput, HELP};

/// Prints the reply as it streams in. Updates carry the whole reply so far, so only
/// the part not yet on screen is written.
#[derive(Default)]
struct ReplyPrinter {
    shown: String,
}

impl ReplyPrinter {
    fn update(&mut self, text: &str) {
        if let Some(new) = text.strip_prefix(self.shown.as_str()) {
            print!("{}", new);
            let _ = io::stdout().flush();
        } else {
            // not an extension of what is on screen, start over on a fresh line
            println!();
            print!("{}", text);
        }
        self.shown.clear();
        self.shown.push_str(text);
    }

    /// Settle the output once the reply is final, which may be a fallback message
    fn finish(self, content: &str) {
        if self.shown == content {
            println!();
        } else {
            if !self.shown.is_empty() {
                println!();
            }
            println!("{}", style(content).yellow());
        }
        println!();
    }
}

pub async fn execute(path: Option<&Path>, server: &str) -> Result<()> {
    cliclack::intro(style(" docent ").on_cyan().black())?;

    let store = FileDocumentStore::default_location()?;
    let spin = spinner();
    spin.start("Extracting document text");
    let loaded = match document::load(path, &store, Extraction::Optional) {
        Ok(loaded) => loaded,
        Err(e) => {
            spin.stop(style("Could not load a document").red());
            return Err(e);
        }
    };
    let document = loaded.document;
    spin.stop(format!("Loaded {}", document.name()));
    if let Some(warning) = loaded.warning {
        cliclack::log::warning(format!(
            "{}\nChatting without the document text, quote passages with /explain, /ask or /summarize",
            warning
        ))?;
    }
    if let SaveStatus::Skipped(reason) = loaded.status {
        cliclack::log::warning(format!("Not kept for the next session: {}", reason))?;
    }

    let client = RelayClient::new(server)?;
    let mut session = ChatSession::new(client, document.name(), document.text().map(String::from));

    if let Some(greeting) = session.transcript().first() {
        println!("{}\n", greeting.content);
    }
    println!(
        "{}",
        style("Type a question, /help for commands, or \"exit\" to leave.").dim()
    );

    loop {
        let line: String = input("Message:").placeholder("").interact()?;

        match input::parse(&line) {
            ChatInput::Exit => break,
            ChatInput::Empty => continue,
            ChatInput::Help => println!("{}\n", HELP),
            ChatInput::Invalid(message) => cliclack::log::warning(message)?,
            ChatInput::Message(text) => {
                let mut printer = ReplyPrinter::default();
                let reply = session.send(&text, |so_far| printer.update(so_far)).await;
                printer.finish(&reply.content);
            }
            ChatInput::Selection(action, text) => {
                let mut printer = ReplyPrinter::default();
                let reply = session
                    .send_selection(action, &text, |so_far| printer.update(so_far))
                    .await;
                printer.finish(&reply.content);
            }
            ChatInput::Translate(language) => {
                let spin = spinner();
                spin.start(format!("Translating to {}", language));
                match session.translate(&language).await {
                    Some(translation) if translation.is_failed() => {
                        spin.stop(style(translation.text()).red());
                    }
                    Some(translation) => {
                        spin.stop(format!("Translation ({})", language));
                        println!("{}\n", translation.text());
                    }
                    None => spin.stop(style("The document has no text to translate").red()),
                }
            }
        }
    }

    cliclack::outro("Goodbye")?;
    Ok(())
}
