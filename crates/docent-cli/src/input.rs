use docent::session::SelectionAction;
use std::str::FromStr;

/// One line typed at the chat prompt
#[derive(Debug, PartialEq)]
pub enum ChatInput {
    Message(String),
    Selection(SelectionAction, String),
    Translate(String),
    Help,
    Exit,
    Empty,
    /// A command that could not be used, with what to tell the user
    Invalid(String),
}

pub fn parse(line: &str) -> ChatInput {
    let line = line.trim();
    if line.is_empty() {
        return ChatInput::Empty;
    }
    if line.eq_ignore_ascii_case("exit") {
        return ChatInput::Exit;
    }

    let Some(command) = line.strip_prefix('/') else {
        return ChatInput::Message(line.to_string());
    };

    let (name, rest) = match command.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (command, ""),
    };
    let name = name.to_ascii_lowercase();

    match name.as_str() {
        "exit" | "quit" => ChatInput::Exit,
        "help" => ChatInput::Help,
        "translate" if rest.is_empty() => {
            ChatInput::Invalid("Usage: /translate <language>".to_string())
        }
        "translate" => ChatInput::Translate(rest.to_string()),
        _ => match SelectionAction::from_str(&name) {
            Ok(_) if rest.is_empty() => ChatInput::Invalid(format!("Usage: /{} <text>", name)),
            Ok(action) => ChatInput::Selection(action, rest.to_string()),
            Err(_) => ChatInput::Invalid(format!("Unknown command /{}, try /help", name)),
        },
    }
}

pub const HELP: &str = "\
/explain <text>      explain a passage from the document
/ask <text>          ask about a passage
/summarize <text>    summarize a passage
/translate <lang>    translate the whole document
exit                 leave the chat";
