//! Chat session state: the transcript sent to the server and the history
//! shown on screen.
//!
//! The two diverge on purpose. Error entries and the "thinking" placeholder
//! are display-only; only user and assistant turns ever reach the server.

use chrono::{DateTime, Local};

use crate::client::ApiError;
use crate::logging;
use crate::models::{ChatMessage, ChatRequest};

// === Constants ===

pub const CHAT_TEMPERATURE: f64 = 0.7;
pub const THINKING_LABEL: &str = "Pensando";
pub const CHAT_FALLBACK: &str = "Erro ao processar mensagem";
pub const ERROR_PREFIX: &str = "Erro: ";

// === Types ===

/// Kind of a rendered chat entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    User,
    Assistant,
    System,
    Thinking,
}

/// One line item in the chat pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEntry {
    pub kind: EntryKind,
    pub content: String,
    pub at: DateTime<Local>,
}

impl ChatEntry {
    fn new(kind: EntryKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
            at: Local::now(),
        }
    }
}

/// A request ready to be sent, tagged with the ticket its reply must carry.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatTurn {
    pub ticket: u64,
    pub request: ChatRequest,
}

/// Result of [`ChatSession::submit`].
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Nothing but whitespace was typed.
    Empty,
    /// A previous message is still waiting for its reply.
    Busy,
    Sent(ChatTurn),
}

// === ChatSession ===

/// Owned chat state. Idle → awaiting → (rendered | error shown) → idle.
#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    transcript: Vec<ChatMessage>,
    history: Vec<ChatEntry>,
    next_ticket: u64,
    in_flight: Option<u64>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages that will be sent with the next request.
    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    /// Everything rendered in the chat pane, placeholder included.
    pub fn history(&self) -> &[ChatEntry] {
        &self.history
    }

    pub fn is_awaiting(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Append a user turn and build the request that carries the whole
    /// transcript.
    pub fn submit(&mut self, text: &str) -> SubmitOutcome {
        let message = text.trim();
        if message.is_empty() {
            return SubmitOutcome::Empty;
        }
        if self.in_flight.is_some() {
            return SubmitOutcome::Busy;
        }

        self.transcript.push(ChatMessage::user(message));
        self.history.push(ChatEntry::new(EntryKind::User, message));
        self.history
            .push(ChatEntry::new(EntryKind::Thinking, THINKING_LABEL));

        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.in_flight = Some(ticket);

        SubmitOutcome::Sent(ChatTurn {
            ticket,
            request: ChatRequest {
                messages: self.transcript.clone(),
                stream: false,
                temperature: CHAT_TEMPERATURE,
            },
        })
    }

    /// Apply the reply for `ticket`. Returns `false` when the reply no longer
    /// belongs to this session (for example after [`ChatSession::clear`]).
    pub fn complete(&mut self, ticket: u64, result: Result<String, ApiError>) -> bool {
        if self.in_flight != Some(ticket) {
            logging::warn(format!("Ignoring stale chat reply (ticket {ticket})"));
            return false;
        }
        self.in_flight = None;
        self.remove_placeholder();

        match result {
            Ok(content) => {
                self.history
                    .push(ChatEntry::new(EntryKind::Assistant, content.clone()));
                self.transcript.push(ChatMessage::assistant(content));
            }
            Err(err) => {
                logging::error(format!("Chat error: {err}"));
                let text = format!("{ERROR_PREFIX}{}", err.reason(CHAT_FALLBACK));
                self.history.push(ChatEntry::new(EntryKind::System, text));
            }
        }
        true
    }

    /// Start a new conversation. A reply still in flight will be dropped.
    pub fn clear(&mut self) {
        self.transcript.clear();
        self.history.clear();
        self.in_flight = None;
    }

    fn remove_placeholder(&mut self) {
        if let Some(pos) = self
            .history
            .iter()
            .rposition(|entry| entry.kind == EntryKind::Thinking)
        {
            self.history.remove(pos);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use pretty_assertions::assert_eq;
    use reqwest::StatusCode;

    fn sent(outcome: SubmitOutcome) -> ChatTurn {
        match outcome {
            SubmitOutcome::Sent(turn) => turn,
            other => panic!("expected a request, got {other:?}"),
        }
    }

    fn kinds(session: &ChatSession) -> Vec<EntryKind> {
        session.history().iter().map(|entry| entry.kind).collect()
    }

    #[test]
    fn blank_submit_changes_nothing() {
        let mut session = ChatSession::new();
        assert_eq!(session.submit(""), SubmitOutcome::Empty);
        assert_eq!(session.submit("  \n\t "), SubmitOutcome::Empty);
        assert!(session.transcript().is_empty());
        assert!(session.history().is_empty());
        assert!(!session.is_awaiting());
    }

    #[test]
    fn submit_sends_trimmed_transcript_and_shows_placeholder() {
        let mut session = ChatSession::new();
        let turn = sent(session.submit("  Olá  "));

        assert_eq!(turn.request.messages, vec![ChatMessage::user("Olá")]);
        assert!(!turn.request.stream);
        assert_eq!(turn.request.temperature, 0.7);
        assert_eq!(kinds(&session), vec![EntryKind::User, EntryKind::Thinking]);
        assert!(session.is_awaiting());
    }

    #[test]
    fn success_adds_two_transcript_entries() {
        let mut session = ChatSession::new();
        let turn = sent(session.submit("Olá"));
        assert!(session.complete(turn.ticket, Ok("Oi!".to_string())));

        assert_eq!(session.transcript().len(), 2);
        assert_eq!(session.transcript()[1], ChatMessage::assistant("Oi!"));
        assert_eq!(kinds(&session), vec![EntryKind::User, EntryKind::Assistant]);
        assert!(!session.is_awaiting());
    }

    #[test]
    fn failure_is_shown_but_never_sent_back() {
        let mut session = ChatSession::new();
        let turn = sent(session.submit("Olá"));
        let err = ApiError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: Some("OpenAI API key not configured".to_string()),
        };
        assert!(session.complete(turn.ticket, Err(err)));

        assert_eq!(session.transcript().len(), 1);
        let last = session.history().last().expect("entry");
        assert_eq!(last.kind, EntryKind::System);
        assert_eq!(last.content, "Erro: OpenAI API key not configured");

        let next = sent(session.submit("De novo"));
        let roles: Vec<Role> = next.request.messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::User]);
    }

    #[test]
    fn failure_without_detail_uses_fallback() {
        let mut session = ChatSession::new();
        let turn = sent(session.submit("Olá"));
        let err = ApiError::Status {
            status: StatusCode::BAD_GATEWAY,
            detail: None,
        };
        session.complete(turn.ticket, Err(err));
        assert_eq!(
            session.history().last().map(|e| e.content.as_str()),
            Some("Erro: Erro ao processar mensagem")
        );
    }

    #[test]
    fn second_submit_while_awaiting_is_refused() {
        let mut session = ChatSession::new();
        let _turn = sent(session.submit("primeira"));
        assert_eq!(session.submit("segunda"), SubmitOutcome::Busy);
        assert_eq!(session.transcript().len(), 1);
    }

    #[test]
    fn clear_drops_pending_reply() {
        let mut session = ChatSession::new();
        let turn = sent(session.submit("Olá"));
        session.clear();

        assert!(!session.complete(turn.ticket, Ok("tarde demais".to_string())));
        assert!(session.transcript().is_empty());
        assert!(session.history().is_empty());
    }
}
