//! Events posted by request tasks back to the UI loop.
//!
//! Each reply carries the ticket it was issued with so the receiving state
//! can tell whether it is still the one on screen.

use crate::client::ApiError;
use crate::core::panel::ActionKind;
use crate::models::{CompletionResponse, HealthResponse};

/// Completion of a background request.
#[derive(Debug)]
pub enum Event {
    /// Reply to a chat submission
    ChatReply {
        ticket: u64,
        result: Result<CompletionResponse, ApiError>,
    },

    /// Reply to a panel action
    ActionReply {
        kind: ActionKind,
        ticket: u64,
        result: Result<CompletionResponse, ApiError>,
    },

    /// Result of the startup health probe
    Health {
        result: Result<HealthResponse, ApiError>,
    },
}
