use indoc::indoc;

use crate::models::message::ChatMessage;

pub const CHAT_PREAMBLE: &str = indoc! {"
    You are a helpful AI assistant that specializes in analyzing and explaining document content.
    You help users understand PDF documents by:
    - Providing clear explanations of complex concepts
    - Summarizing content when requested
    - Answering questions about specific sections
    - Offering additional context and examples
    - Breaking down technical terms and jargon

    Always be helpful, accurate, and educational in your responses."};

const DOCUMENT_LEAD_IN: &str = "Here is the full document content for reference:";

/// Build the system message that grounds the conversation in the document.
///
/// The document text is appended verbatim, so it is always the tail of the content.
/// An empty document counts as no document.
pub fn chat_system_message(document_text: Option<&str>) -> ChatMessage {
    match document_text.filter(|text| !text.is_empty()) {
        Some(text) => ChatMessage::system(format!(
            "{}\n\n{}\n\n{}",
            CHAT_PREAMBLE, DOCUMENT_LEAD_IN, text
        )),
        None => ChatMessage::system(CHAT_PREAMBLE),
    }
}

/// The outbound conversation: one synthesized system message followed by the caller's messages
pub fn chat_messages(document_text: Option<&str>, messages: &[ChatMessage]) -> Vec<ChatMessage> {
    let mut outbound = Vec::with_capacity(messages.len() + 1);
    outbound.push(chat_system_message(document_text));
    outbound.extend_from_slice(messages);
    outbound
}

pub fn translation_instruction(target_language: &str) -> String {
    format!(
        "You are a professional translator. Translate the following text to {}. \
         Maintain the original formatting, structure, and meaning. \
         Only return the translated text without any additional explanations or comments.",
        target_language
    )
}

pub fn translation_messages(text: &str, target_language: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(translation_instruction(target_language)),
        ChatMessage::user(text),
    ]
}
