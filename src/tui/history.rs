//! TUI rendering helpers for chat history.

use ratatui::style::{Modifier, Style, Stylize};
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthChar;

use crate::core::chat::{ChatEntry, EntryKind};
use crate::palette;

/// Render one chat entry into terminal lines. `tick` animates the
/// placeholder dots.
pub fn entry_lines(entry: &ChatEntry, width: u16, tick: usize) -> Vec<Line<'static>> {
    let stamp = entry.at.format("%H:%M").to_string();
    match entry.kind {
        EntryKind::User => render_message("Você", &stamp, &entry.content, user_style(), width),
        EntryKind::Assistant => {
            render_message("Brain", &stamp, &entry.content, assistant_style(), width)
        }
        EntryKind::System => {
            render_message("Sistema", &stamp, &entry.content, system_style(), width)
        }
        EntryKind::Thinking => {
            let dots = ".".repeat(tick % 4);
            vec![Line::from(vec![
                Span::styled("Brain", assistant_style().add_modifier(Modifier::BOLD)),
                Span::raw(" "),
                Span::styled(format!("{}{dots}", entry.content), thinking_style()),
            ])]
        }
    }
}

/// Render the whole history, separating entries with a blank line.
pub fn history_lines(entries: &[ChatEntry], width: u16, tick: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (i, entry) in entries.iter().enumerate() {
        if i > 0 {
            lines.push(Line::from(""));
        }
        lines.extend(entry_lines(entry, width, tick));
    }
    lines
}

fn render_message(
    prefix: &str,
    stamp: &str,
    content: &str,
    style: Style,
    width: u16,
) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(vec![
        Span::styled(prefix.to_string(), style.add_modifier(Modifier::BOLD)),
        Span::raw(" "),
        Span::styled(stamp.to_string(), Style::default().fg(palette::TEXT_DIM)),
    ])];

    let indent = "  ";
    let content_width = usize::from(width).saturating_sub(indent.len()).max(1);
    for line in content.lines() {
        for part in wrap_line(line, content_width) {
            lines.push(Line::from(vec![
                Span::raw(indent),
                Span::styled(part, style),
            ]));
        }
    }
    if content.is_empty() {
        lines.push(Line::from(Span::raw(indent)));
    }
    lines
}

/// Hard-wrap a line at `width` display columns, keeping whitespace intact
/// so code stays indented.
pub fn wrap_line(text: &str, width: usize) -> Vec<String> {
    if width == 0 || text.is_empty() {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;

    for ch in text.chars() {
        let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
        if current_width + ch_width > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
            current_width = 0;
        }
        current.push(ch);
        current_width += ch_width;
    }
    lines.push(current);
    lines
}

fn user_style() -> Style {
    Style::default().fg(palette::GREEN)
}

fn assistant_style() -> Style {
    Style::default().fg(palette::TEXT_PRIMARY)
}

fn system_style() -> Style {
    Style::default().fg(palette::STATUS_ERROR).italic()
}

fn thinking_style() -> Style {
    Style::default()
        .fg(palette::TEXT_MUTED)
        .add_modifier(Modifier::ITALIC | Modifier::DIM)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;

    fn entry(kind: EntryKind, content: &str) -> ChatEntry {
        ChatEntry {
            kind,
            content: content.to_string(),
            at: Local::now(),
        }
    }

    fn plain(line: &Line<'_>) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    #[test]
    fn wrap_keeps_indentation() {
        assert_eq!(wrap_line("    let x = 1;", 8), vec!["    let ", "x = 1;"]);
        assert_eq!(wrap_line("", 8), vec![String::new()]);
    }

    #[test]
    fn wrap_counts_wide_chars() {
        assert_eq!(wrap_line("日本語", 4), vec!["日本", "語"]);
    }

    #[test]
    fn message_has_header_then_indented_body() {
        let lines = entry_lines(&entry(EntryKind::System, "Erro: falhou"), 40, 0);
        assert!(plain(&lines[0]).starts_with("Sistema "));
        assert_eq!(plain(&lines[1]), "  Erro: falhou");
    }

    #[test]
    fn placeholder_animates() {
        let thinking = entry(EntryKind::Thinking, "Pensando");
        assert_eq!(plain(&entry_lines(&thinking, 40, 0)[0]), "Brain Pensando");
        assert_eq!(plain(&entry_lines(&thinking, 40, 3)[0]), "Brain Pensando...");
    }

    #[test]
    fn history_separates_entries() {
        let entries = vec![entry(EntryKind::User, "oi"), entry(EntryKind::Assistant, "olá")];
        let lines = history_lines(&entries, 40, 0);
        assert_eq!(lines.len(), 5);
        assert_eq!(plain(&lines[2]), "");
    }
}
