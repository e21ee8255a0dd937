//! Chat conversation state.
//!
//! A `ChatSession` is an explicit view-model: the input changes only through
//! `set_input`, a send is split into `begin_send` and one of
//! `receive_reply`/`receive_failure`, and the backend call happens in between
//! without holding the session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const GREETING: &str = "Bonjour ! Je suis votre assistant médical virtuel. Posez-moi des questions sur les médicaments, les interactions ou la génétique.";
pub const CONNECTION_FAILURE: &str =
    "❌ Une erreur est survenue lors de la connexion au serveur. Réessayez plus tard.";

/// Longest transcript kept per session. The greeting stays; the oldest exchanges go first.
pub const MAX_TRANSCRIPT_MESSAGES: usize = 200;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub text: String,
    pub is_bot: bool,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    fn new(text: impl Into<String>, is_bot: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            is_bot,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: Uuid,
    pub messages: Vec<ChatMessage>,
    pub input: String,
    pub is_typing: bool,
    pub last_activity: DateTime<Utc>,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    /// A fresh conversation opened by the assistant's greeting.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            messages: vec![ChatMessage::new(GREETING, true)],
            input: String::new(),
            is_typing: false,
            last_activity: Utc::now(),
        }
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Moves the current input into the transcript as a user message.
    ///
    /// Returns the text to send, or `None` (and changes nothing) when the input
    /// is blank or a reply is still pending.
    pub fn begin_send(&mut self) -> Option<String> {
        if self.is_typing || self.input.trim().is_empty() {
            return None;
        }
        let text = std::mem::take(&mut self.input);
        self.push(ChatMessage::new(text.clone(), false));
        self.is_typing = true;
        Some(text)
    }

    pub fn receive_reply(&mut self, text: impl Into<String>) {
        self.push(ChatMessage::new(text, true));
        self.is_typing = false;
    }

    pub fn receive_failure(&mut self) {
        self.receive_reply(CONNECTION_FAILURE);
    }

    fn push(&mut self, message: ChatMessage) {
        self.last_activity = message.timestamp;
        self.messages.push(message);
        if self.messages.len() > MAX_TRANSCRIPT_MESSAGES {
            let excess = self.messages.len() - MAX_TRANSCRIPT_MESSAGES;
            self.messages.drain(1..=excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_starts_with_greeting() {
        let session = ChatSession::new();
        assert_eq!(session.messages.len(), 1);
        assert!(session.messages[0].is_bot);
        assert_eq!(session.messages[0].text, GREETING);
        assert!(!session.is_typing);
    }

    #[test]
    fn test_blank_input_is_not_sent() {
        let mut session = ChatSession::new();
        session.set_input("   ");
        assert_eq!(session.begin_send(), None);
        assert_eq!(session.messages.len(), 1);
        assert!(!session.is_typing);
        assert_eq!(session.input, "   ");
    }

    #[test]
    fn test_send_then_reply() {
        let mut session = ChatSession::new();
        session.set_input("Interactions de l'abacavir ?");

        let sent = session.begin_send();
        assert_eq!(sent.as_deref(), Some("Interactions de l'abacavir ?"));
        assert!(session.input.is_empty());
        assert!(session.is_typing);
        assert!(!session.messages[1].is_bot);

        session.receive_reply("Aucune interaction majeure connue.");
        assert!(!session.is_typing);
        assert_eq!(session.messages.len(), 3);
        assert!(session.messages.last().unwrap().is_bot);
    }

    #[test]
    fn test_failure_appends_error_message() {
        let mut session = ChatSession::new();
        session.set_input("question");
        session.begin_send();
        session.receive_failure();

        assert!(!session.is_typing);
        assert_eq!(session.messages.last().unwrap().text, CONNECTION_FAILURE);
    }

    #[test]
    fn test_no_second_send_while_reply_pending() {
        let mut session = ChatSession::new();
        session.set_input("first");
        assert_eq!(session.begin_send().as_deref(), Some("first"));

        session.set_input("second");
        assert_eq!(session.begin_send(), None);
        assert_eq!(session.messages.len(), 2);
        assert_eq!(session.input, "second");

        session.receive_reply("answer");
        assert_eq!(session.begin_send().as_deref(), Some("second"));
    }

    #[test]
    fn test_transcript_is_capped_and_keeps_greeting() {
        let mut session = ChatSession::new();
        for i in 0..MAX_TRANSCRIPT_MESSAGES {
            session.set_input(format!("q{i}"));
            session.begin_send();
            session.receive_reply(format!("a{i}"));
        }

        assert_eq!(session.messages.len(), MAX_TRANSCRIPT_MESSAGES);
        assert_eq!(session.messages[0].text, GREETING);
        assert_eq!(
            session.messages.last().unwrap().text,
            format!("a{}", MAX_TRANSCRIPT_MESSAGES - 1)
        );
    }

    #[test]
    fn test_activity_tracks_latest_message() {
        let mut session = ChatSession::new();
        let opened = session.last_activity;
        session.set_input("question");
        session.begin_send();
        assert!(session.last_activity >= opened);
        assert_eq!(session.last_activity, session.messages[1].timestamp);
    }

    #[test]
    fn test_message_ids_are_unique() {
        let mut session = ChatSession::new();
        session.set_input("a");
        session.begin_send();
        session.receive_reply("b");
        let ids: std::collections::HashSet<_> = session.messages.iter().map(|m| m.id).collect();
        assert_eq!(ids.len(), session.messages.len());
    }
}
