//! Terminal UI (TUI) module for Brain CLI.

// === Submodules ===

pub mod app;
pub mod history;
pub mod scrolling;
pub mod ui;

// === Re-exports ===

pub use app::TuiOptions;
pub use ui::run_tui;
