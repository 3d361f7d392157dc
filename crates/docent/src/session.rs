use chrono::{DateTime, Utc};
use strum_macros::{Display, EnumString};

use crate::client::RelayClient;
use crate::models::message::ChatMessage;
use crate::models::role::Role;
use crate::stream::consumer::{self, Outcome};

pub const TRANSLATION_FALLBACK: &str = "Translation failed, please try again.";

/// State of the latest translation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translation {
    Complete(String),
    Failed,
}

impl Translation {
    pub fn is_failed(&self) -> bool {
        matches!(self, Translation::Failed)
    }

    /// The text to show the user, the fallback message when the request failed
    pub fn text(&self) -> &str {
        match self {
            Translation::Complete(text) => text,
            Translation::Failed => TRANSLATION_FALLBACK,
        }
    }
}

/// Canned requests about a passage the user picked out of the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum SelectionAction {
    Explain,
    Ask,
    Summarize,
}

impl SelectionAction {
    pub fn prompt(&self, selected_text: &str) -> String {
        match self {
            SelectionAction::Explain => {
                format!("Please explain this text from the document: \"{}\"", selected_text)
            }
            SelectionAction::Ask => format!(
                "I have a question about this text: \"{}\". Can you help me understand it better?",
                selected_text
            ),
            SelectionAction::Summarize => {
                format!("Please summarize this text: \"{}\"", selected_text)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    Normal,
    Selection { selected_text: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub role: Role,
    pub content: String,
    pub kind: EntryKind,
    pub timestamp: DateTime<Utc>,
}

impl TranscriptEntry {
    fn new<S: Into<String>>(role: Role, content: S, kind: EntryKind) -> Self {
        Self {
            role,
            content: content.into(),
            kind,
            timestamp: Utc::now(),
        }
    }

    pub fn to_message(&self) -> ChatMessage {
        ChatMessage::new(self.role, self.content.clone())
    }
}

pub fn greeting(file_name: &str) -> String {
    format!(
        "Hello! I'm your AI learning assistant for \"{}\". I can help you understand the document by:\n\n\
         • **Explaining** complex concepts and terminology\n\
         • **Summarizing** sections or the entire document\n\
         • **Answering questions** about specific content\n\
         • **Providing context** and additional examples\n\
         • **Breaking down** technical information\n\n\
         Select any text in the document and I'll help you understand it better!",
        file_name
    )
}

/// Owns everything the user sees for one document: the transcript, the document text
/// and the latest translation. Views read it through accessors and change it only
/// through these methods.
pub struct ChatSession {
    client: RelayClient,
    file_name: String,
    document_text: Option<String>,
    transcript: Vec<TranscriptEntry>,
    translation: Option<Translation>,
}

impl ChatSession {
    pub fn new<S: Into<String>>(
        client: RelayClient,
        file_name: S,
        document_text: Option<String>,
    ) -> Self {
        let file_name = file_name.into();
        let transcript = vec![TranscriptEntry::new(
            Role::Assistant,
            greeting(&file_name),
            EntryKind::Normal,
        )];

        Self {
            client,
            file_name,
            document_text: document_text.filter(|text| !text.is_empty()),
            transcript,
            translation: None,
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn document_text(&self) -> Option<&str> {
        self.document_text.as_deref()
    }

    pub fn set_document_text(&mut self, text: String) {
        self.document_text = Some(text).filter(|text| !text.is_empty());
        self.translation = None;
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    pub fn translation(&self) -> Option<&Translation> {
        self.translation.as_ref()
    }

    /// Send a message typed by the user.
    ///
    /// `on_update` sees the whole assistant reply so far each time more text arrives.
    /// The returned entry holds the final reply, or a fallback message.
    pub async fn send<F>(&mut self, content: &str, on_update: F) -> &TranscriptEntry
    where
        F: FnMut(&str),
    {
        let entry = TranscriptEntry::new(Role::User, content, EntryKind::Normal);
        self.exchange(entry, on_update).await
    }

    pub async fn send_selection<F>(
        &mut self,
        action: SelectionAction,
        selected_text: &str,
        on_update: F,
    ) -> &TranscriptEntry
    where
        F: FnMut(&str),
    {
        let entry = TranscriptEntry::new(
            Role::User,
            action.prompt(selected_text),
            EntryKind::Selection {
                selected_text: selected_text.to_string(),
            },
        );
        self.exchange(entry, on_update).await
    }

    async fn exchange<F>(&mut self, user_entry: TranscriptEntry, mut on_update: F) -> &TranscriptEntry
    where
        F: FnMut(&str),
    {
        self.transcript.push(user_entry);
        let messages: Vec<ChatMessage> = self
            .transcript
            .iter()
            .map(TranscriptEntry::to_message)
            .collect();

        let outcome = match self
            .client
            .chat(&messages, self.document_text.as_deref())
            .await
        {
            Ok(body) => {
                self.transcript
                    .push(TranscriptEntry::new(Role::Assistant, "", EntryKind::Normal));
                let transcript = &mut self.transcript;
                consumer::consume(body, |text: &str| {
                    if let Some(reply) = transcript.last_mut() {
                        reply.content.clear();
                        reply.content.push_str(text);
                    }
                    on_update(text);
                })
                .await
            }
            Err(e) => {
                tracing::warn!("Chat request to {} failed: {}", self.client.base_url(), e);
                self.transcript
                    .push(TranscriptEntry::new(Role::Assistant, "", EntryKind::Normal));
                Outcome::Failed(e.to_string())
            }
        };

        let reply = outcome.into_message();
        let last = self.transcript.len() - 1;
        let entry = &mut self.transcript[last];
        entry.content = reply;
        entry
    }

    /// Translate the document text. Returns `None` when there is nothing to translate.
    pub async fn translate(&mut self, target_language: &str) -> Option<&Translation> {
        let text = self.document_text.as_deref()?;
        let translation = match self.client.translate(text, target_language).await {
            Ok(translated) => Translation::Complete(translated),
            Err(e) => {
                tracing::warn!("Translation to {} failed: {}", target_language, e);
                Translation::Failed
            }
        };
        self.translation = Some(translation);
        self.translation.as_ref()
    }
}
