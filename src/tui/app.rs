//! Application state for the Brain TUI.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::core::chat::{ChatSession, ChatTurn, SubmitOutcome};
use crate::core::events::Event;
use crate::core::input::TextInput;
use crate::core::panel::{ActionKind, ActionPanel, ActionTurn, Language};
use crate::core::tabs::{Tab, TabSwitcher};
use crate::models::{CompletionResponse, Usage};
use crate::palette::{UiTheme, ui_theme};

use super::scrolling::ScrollState;

// === Constants ===

const SCROLL_PAGE: usize = 10;
const BUSY_NOTICE: &str = "Aguarde a resposta anterior antes de enviar outra mensagem.";
const NEW_CONVERSATION_NOTICE: &str = "Nova conversa iniciada.";

// === Types ===

/// Configuration required to bootstrap the TUI.
#[derive(Debug, Clone)]
pub struct TuiOptions {
    pub base_url: String,
    pub default_language: Language,
    pub theme: String,
}

/// Actions the event loop has to carry out on behalf of the state.
#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    Quit,
    SendChat(ChatTurn),
    RunAction(ActionTurn),
}

/// Global UI state for the TUI.
pub struct App {
    pub tabs: TabSwitcher,
    pub chat: ChatSession,
    pub chat_input: TextInput,
    pub panels: Vec<ActionPanel>,
    /// Lines scrolled up from the bottom of the chat history.
    pub chat_scroll: ScrollState,
    /// Lines scrolled down from the top of each panel's result, in
    /// `ActionKind::ALL` order.
    pub result_scrolls: Vec<ScrollState>,
    pub status_message: Option<String>,
    pub backend_status: Option<String>,
    pub backend_healthy: Option<bool>,
    pub last_usage: Option<Usage>,
    pub last_model: Option<String>,
    pub base_url: String,
    pub ui_theme: UiTheme,
}

// === App State ===

impl App {
    pub fn new(options: TuiOptions) -> Self {
        let TuiOptions {
            base_url,
            default_language,
            theme,
        } = options;

        Self {
            tabs: TabSwitcher::new(),
            chat: ChatSession::new(),
            chat_input: TextInput::new(),
            panels: ActionKind::ALL
                .iter()
                .map(|kind| ActionPanel::new(*kind, default_language))
                .collect(),
            chat_scroll: ScrollState::default(),
            result_scrolls: vec![ScrollState::default(); ActionKind::ALL.len()],
            status_message: None,
            backend_status: None,
            backend_healthy: None,
            last_usage: None,
            last_model: None,
            base_url,
            ui_theme: ui_theme(&theme),
        }
    }

    pub fn panel(&self, kind: ActionKind) -> &ActionPanel {
        let index = action_index(kind);
        &self.panels[index]
    }

    pub fn panel_mut(&mut self, kind: ActionKind) -> &mut ActionPanel {
        let index = action_index(kind);
        &mut self.panels[index]
    }

    pub fn result_scroll(&self, kind: ActionKind) -> ScrollState {
        self.result_scrolls[action_index(kind)]
    }

    pub fn result_scroll_mut(&mut self, kind: ActionKind) -> &mut ScrollState {
        &mut self.result_scrolls[action_index(kind)]
    }

    fn active_panel_mut(&mut self) -> Option<&mut ActionPanel> {
        let kind = self.tabs.active().action()?;
        Some(self.panel_mut(kind))
    }

    // === Key Handling ===

    /// Route a key press. Returns the request (or quit) the loop must act on.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<AppAction> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Char('c') if ctrl => return Some(AppAction::Quit),
            KeyCode::F(n @ 1..=5) => {
                if let Some(tab) = Tab::from_index(usize::from(n) - 1) {
                    self.tabs.open(tab);
                }
                return None;
            }
            KeyCode::Right if ctrl => {
                self.tabs.next();
                return None;
            }
            KeyCode::Left if ctrl => {
                self.tabs.previous();
                return None;
            }
            _ => {}
        }

        if self.tabs.is_active(Tab::Chat) {
            self.handle_chat_key(key)
        } else {
            self.handle_panel_key(key)
        }
    }

    fn handle_chat_key(&mut self, key: KeyEvent) -> Option<AppAction> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Enter if is_newline_modifier(key.modifiers) => {
                self.chat_input.insert_newline();
            }
            KeyCode::Enter => return self.submit_chat(),
            KeyCode::Char('l') if ctrl => self.new_conversation(),
            KeyCode::PageUp => self.chat_scroll.forward(SCROLL_PAGE),
            KeyCode::PageDown => self.chat_scroll.back(SCROLL_PAGE),
            KeyCode::Home if ctrl => self.chat_scroll.to_end(),
            KeyCode::End if ctrl => self.chat_scroll.to_start(),
            _ => edit_input(&mut self.chat_input, key),
        }
        None
    }

    fn handle_panel_key(&mut self, key: KeyEvent) -> Option<AppAction> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if key.code == KeyCode::F(9) || (ctrl && key.code == KeyCode::Char('r')) {
            return self.run_active_panel();
        }

        let kind = self.tabs.active().action()?;
        let scroll = self.result_scroll_mut(kind);
        match key.code {
            KeyCode::PageUp => {
                scroll.back(SCROLL_PAGE);
                return None;
            }
            KeyCode::PageDown => {
                scroll.forward(SCROLL_PAGE);
                return None;
            }
            KeyCode::Home if ctrl => {
                scroll.to_start();
                return None;
            }
            KeyCode::End if ctrl => {
                scroll.to_end();
                return None;
            }
            _ => {}
        }

        let panel = self.panel_mut(kind);
        match key.code {
            KeyCode::Tab => panel.focus_next(),
            KeyCode::BackTab => panel.focus_previous(),
            KeyCode::Left if panel.language_focused() => {
                panel.set_language(panel.language().previous());
            }
            KeyCode::Right if panel.language_focused() => {
                panel.set_language(panel.language().next());
            }
            KeyCode::Enter => {
                let multiline = panel.focused_spec().is_some_and(|spec| spec.multiline);
                if multiline {
                    if let Some(input) = panel.focused_input_mut() {
                        input.insert_newline();
                    }
                } else {
                    return self.run_active_panel();
                }
            }
            _ => {
                if let Some(input) = panel.focused_input_mut() {
                    edit_input(input, key);
                }
            }
        }
        None
    }

    /// Insert pasted text into whichever field has focus.
    pub fn handle_paste(&mut self, text: &str) {
        if self.tabs.is_active(Tab::Chat) {
            self.chat_input.insert_str(text);
        } else if let Some(input) = self
            .active_panel_mut()
            .and_then(ActionPanel::focused_input_mut)
        {
            input.insert_str(text);
        }
    }

    // === Operations ===

    /// Submit the chat composer. The input is cleared only when a request
    /// actually goes out.
    pub fn submit_chat(&mut self) -> Option<AppAction> {
        match self.chat.submit(self.chat_input.text()) {
            SubmitOutcome::Empty => None,
            SubmitOutcome::Busy => {
                self.status_message = Some(BUSY_NOTICE.to_string());
                None
            }
            SubmitOutcome::Sent(turn) => {
                self.chat_input.clear();
                self.chat_scroll.to_start();
                self.status_message = None;
                Some(AppAction::SendChat(turn))
            }
        }
    }

    pub fn run_active_panel(&mut self) -> Option<AppAction> {
        let kind = self.tabs.active().action()?;
        self.result_scroll_mut(kind).to_start();
        self.panel_mut(kind).run().map(AppAction::RunAction)
    }

    pub fn new_conversation(&mut self) {
        self.chat.clear();
        self.chat_scroll.to_start();
        self.last_usage = None;
        self.status_message = Some(NEW_CONVERSATION_NOTICE.to_string());
    }

    /// Fold a background reply into the state.
    pub fn apply_event(&mut self, event: Event) {
        match event {
            Event::ChatReply { ticket, result } => {
                let result = result.map(|response| self.take_reply(response));
                if self.chat.complete(ticket, result) {
                    self.chat_scroll.to_start();
                }
            }
            Event::ActionReply {
                kind,
                ticket,
                result,
            } => {
                let result = result.map(|response| self.take_reply(response));
                if self.panel_mut(kind).complete(ticket, result) {
                    self.result_scroll_mut(kind).to_start();
                }
            }
            Event::Health { result } => match result {
                Ok(health) => {
                    let name = health.app_name.as_deref().unwrap_or("backend");
                    let version = health
                        .version
                        .as_deref()
                        .map(|v| format!(" v{v}"))
                        .unwrap_or_default();
                    self.backend_healthy = Some(health.is_healthy());
                    self.backend_status = Some(format!("{name}{version} ({})", health.status));
                }
                Err(err) => {
                    self.backend_healthy = Some(false);
                    self.backend_status = Some(format!("Backend indisponível: {err}"));
                }
            },
        }
    }
}

impl App {
    /// Remember usage and model of a reply and return its text.
    fn take_reply(&mut self, response: CompletionResponse) -> String {
        if response.usage.is_some() {
            self.last_usage.clone_from(&response.usage);
        }
        if response.model.is_some() {
            self.last_model.clone_from(&response.model);
        }
        response.into_content()
    }
}

// === Helpers ===

fn action_index(kind: ActionKind) -> usize {
    ActionKind::ALL
        .iter()
        .position(|candidate| *candidate == kind)
        .unwrap_or(0)
}

/// Shift+Enter inserts a newline. Alt+Enter does too, for terminals that do
/// not report Shift on Enter.
fn is_newline_modifier(modifiers: KeyModifiers) -> bool {
    modifiers.intersects(KeyModifiers::SHIFT | KeyModifiers::ALT)
}

fn edit_input(input: &mut TextInput, key: KeyEvent) {
    let plain = !key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);
    match key.code {
        KeyCode::Char(c) if plain => input.insert_char(c),
        KeyCode::Backspace => input.delete_char(),
        KeyCode::Delete => input.delete_char_forward(),
        KeyCode::Left => input.move_cursor_left(),
        KeyCode::Right => input.move_cursor_right(),
        KeyCode::Up => input.move_cursor_up(),
        KeyCode::Down => input.move_cursor_down(),
        KeyCode::Home => input.move_cursor_start(),
        KeyCode::End => input.move_cursor_end(),
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => input.clear(),
        _ => {}
    }
}
