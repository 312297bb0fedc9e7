//! Tab switching between the chat and the four action panels.

use crate::core::panel::ActionKind;
use crate::logging;

/// One selectable panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Tab {
    #[default]
    Chat,
    Document,
    CodeGeneration,
    CodeReview,
    Data,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::Chat,
        Tab::Document,
        Tab::CodeGeneration,
        Tab::CodeReview,
        Tab::Data,
    ];

    /// Selector label shown in the tab bar.
    pub fn label(self) -> &'static str {
        match self {
            Tab::Chat => "Chat",
            Tab::Document => "Análise de Documentos",
            Tab::CodeGeneration => "Geração de Código",
            Tab::CodeReview => "Revisão de Código",
            Tab::Data => "Análise de Dados",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Tab::Chat => 0,
            Tab::Document => 1,
            Tab::CodeGeneration => 2,
            Tab::CodeReview => 3,
            Tab::Data => 4,
        }
    }

    pub fn from_index(index: usize) -> Option<Tab> {
        Tab::ALL.get(index).copied()
    }

    /// The panel action behind this tab, if any.
    pub fn action(self) -> Option<ActionKind> {
        match self {
            Tab::Chat => None,
            Tab::Document => Some(ActionKind::Document),
            Tab::CodeGeneration => Some(ActionKind::CodeGeneration),
            Tab::CodeReview => Some(ActionKind::CodeReview),
            Tab::Data => Some(ActionKind::Data),
        }
    }
}

/// Tracks which panel and selector are active. Exactly one is active at a
/// time, so opening a tab implicitly deactivates every other one.
#[derive(Debug, Clone, Default)]
pub struct TabSwitcher {
    active: Tab,
}

impl TabSwitcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Tab {
        self.active
    }

    pub fn is_active(&self, tab: Tab) -> bool {
        self.active == tab
    }

    /// Activate `tab`, the selector that triggered the switch.
    pub fn open(&mut self, tab: Tab) {
        if self.active != tab {
            logging::info(format!("Switching tab: {} -> {}", self.active.label(), tab.label()));
        }
        self.active = tab;
    }

    pub fn next(&mut self) {
        let index = (self.active.index() + 1) % Tab::ALL.len();
        self.open(Tab::ALL[index]);
    }

    pub fn previous(&mut self) {
        let len = Tab::ALL.len();
        let index = (self.active.index() + len - 1) % len;
        self.open(Tab::ALL[index]);
    }

    /// Selector states in display order.
    pub fn selectors(&self) -> impl Iterator<Item = (Tab, bool)> + '_ {
        Tab::ALL.iter().map(|tab| (*tab, self.is_active(*tab)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_activates_exactly_one_selector() {
        let mut tabs = TabSwitcher::new();
        assert_eq!(tabs.active(), Tab::Chat);

        tabs.open(Tab::CodeReview);
        let active: Vec<Tab> = tabs
            .selectors()
            .filter(|(_, active)| *active)
            .map(|(tab, _)| tab)
            .collect();
        assert_eq!(active, vec![Tab::CodeReview]);
    }

    #[test]
    fn next_and_previous_wrap() {
        let mut tabs = TabSwitcher::new();
        tabs.previous();
        assert_eq!(tabs.active(), Tab::Data);
        tabs.next();
        assert_eq!(tabs.active(), Tab::Chat);
        tabs.next();
        assert_eq!(tabs.active(), Tab::Document);
    }

    #[test]
    fn index_round_trips_for_every_tab() {
        for tab in Tab::ALL {
            assert_eq!(Tab::from_index(tab.index()), Some(tab));
        }
        assert_eq!(Tab::from_index(5), None);
    }

    #[test]
    fn only_chat_has_no_action() {
        assert_eq!(Tab::Chat.action(), None);
        assert_eq!(Tab::Data.action(), Some(ActionKind::Data));
    }
}
