//! Terminal-independent controller state for the portal client.
//!
//! - `tabs`: which panel is visible
//! - `chat`: chat transcript and rendered history
//! - `panel`: the four single-shot action panels
//! - `input`: editable text fields
//! - `dispatch` / `events`: background requests and their replies

pub mod chat;
pub mod dispatch;
pub mod events;
pub mod input;
pub mod panel;
pub mod tabs;
