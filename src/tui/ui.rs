//! TUI event loop and rendering logic for Brain CLI.

use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyEventKind,
        KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
        supports_keyboard_enhancement,
    },
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
};
use tokio::sync::mpsc;

use crate::core::dispatch::Dispatcher;
use crate::core::events::Event as ReplyEvent;
use crate::core::input::TextInput;
use crate::core::panel::{ActionPanel, ResultState};
use crate::core::tabs::Tab;
use crate::logging;
use crate::palette;

use super::app::{App, AppAction, TuiOptions};
use super::history::{history_lines, wrap_line};

// === Constants ===

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const PLACEHOLDER_FRAME: Duration = Duration::from_millis(400);
const COMPOSER_MAX_LINES: u16 = 6;

/// Run the interactive TUI event loop.
///
/// # Examples
///
/// ```ignore
/// # use crate::tui::TuiOptions;
/// # async fn example(dispatcher: Dispatcher, rx: Receiver<Event>, options: TuiOptions) -> anyhow::Result<()> {
/// crate::tui::run_tui(dispatcher, rx, options).await
/// # }
/// ```
pub async fn run_tui(
    dispatcher: Dispatcher,
    mut rx_event: mpsc::Receiver<ReplyEvent>,
    options: TuiOptions,
) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let enhanced_keys = supports_keyboard_enhancement().unwrap_or(false);
    if enhanced_keys {
        // Needed for terminals to report Shift on Enter.
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        )?;
    }
    logging::set_suspended(true);

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let mut app = App::new(options);

    dispatcher.check_health();
    let result = run_event_loop(&mut terminal, &mut app, &dispatcher, &mut rx_event).await;

    logging::set_suspended(false);
    if enhanced_keys {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    dispatcher: &Dispatcher,
    rx_event: &mut mpsc::Receiver<ReplyEvent>,
) -> Result<()> {
    let started = Instant::now();

    loop {
        // Replies first, so a finished request shows up on this frame.
        while let Ok(event) = rx_event.try_recv() {
            app.apply_event(event);
        }

        let tick = placeholder_tick(started);
        terminal.draw(|f| render(f, &mut *app, tick))?;

        if !event::poll(POLL_INTERVAL)? {
            // Let request tasks make progress between frames.
            tokio::task::yield_now().await;
            continue;
        }

        let action = match event::read()? {
            Event::Paste(text) => {
                app.handle_paste(&text);
                None
            }
            Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key),
            _ => None,
        };

        match action {
            Some(AppAction::Quit) => return Ok(()),
            Some(AppAction::SendChat(turn)) => dispatcher.send_chat(turn),
            Some(AppAction::RunAction(turn)) => dispatcher.send_action(turn),
            None => {}
        }
    }
}

fn placeholder_tick(started: Instant) -> usize {
    let frames = started.elapsed().as_millis() / PLACEHOLDER_FRAME.as_millis();
    usize::try_from(frames).unwrap_or(0)
}

// === Rendering ===

/// Draw one frame and record how far each visible view can scroll.
fn render(f: &mut Frame, app: &mut App, tick: usize) {
    let size = f.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(size);

    render_header(f, chunks[0], app);
    render_tab_bar(f, chunks[1], app);

    match app.tabs.active().action() {
        None => {
            let max = render_chat(f, chunks[2], app, tick);
            app.chat_scroll.set_max(max);
        }
        Some(kind) => {
            let max = render_panel(f, chunks[2], app, app.panel(kind));
            app.result_scroll_mut(kind).set_max(max);
        }
    }

    render_footer(f, chunks[3], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let (dot, dot_style) = match app.backend_healthy {
        Some(true) => ("●", Style::default().fg(palette::GREEN)),
        Some(false) => ("●", Style::default().fg(palette::STATUS_ERROR)),
        None => ("○", Style::default().fg(palette::TEXT_DIM)),
    };
    let backend = app
        .backend_status
        .clone()
        .unwrap_or_else(|| "verificando backend...".to_string());

    let line = Line::from(vec![
        Span::styled(
            " e-BrAIn.Tech ",
            Style::default()
                .fg(palette::TEXT_PRIMARY)
                .bg(app.ui_theme.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(app.base_url.clone(), Style::default().fg(palette::TEXT_MUTED)),
        Span::raw("  "),
        Span::styled(dot, dot_style),
        Span::raw(" "),
        Span::styled(backend, Style::default().fg(palette::TEXT_MUTED)),
    ]);
    let header = Paragraph::new(line).style(Style::default().bg(app.ui_theme.header_bg));
    f.render_widget(header, area);
}

fn render_tab_bar(f: &mut Frame, area: Rect, app: &App) {
    let titles: Vec<Line> = app
        .tabs
        .selectors()
        .map(|(tab, active)| {
            let marker = if active { "▸" } else { " " };
            Line::from(format!("{marker}F{} {}", tab.index() + 1, tab.label()))
        })
        .collect();
    let tabs = Tabs::new(titles)
        .select(app.tabs.active().index())
        .style(Style::default().fg(palette::TEXT_MUTED))
        .highlight_style(
            Style::default()
                .fg(palette::TEXT_PRIMARY)
                .bg(app.ui_theme.accent)
                .add_modifier(Modifier::BOLD),
        )
        .divider("│");
    f.render_widget(tabs, area);
}

fn render_chat(f: &mut Frame, area: Rect, app: &App, tick: usize) -> usize {
    let composer_lines = u16::try_from(app.chat_input.line_count())
        .unwrap_or(u16::MAX)
        .clamp(1, COMPOSER_MAX_LINES);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(composer_lines + 2)])
        .split(area);

    let turns = app.chat.transcript().len();
    let history_title = match turns {
        0 => " Conversa ".to_string(),
        1 => " Conversa (1 mensagem) ".to_string(),
        n => format!(" Conversa ({n} mensagens) "),
    };
    let history_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette::TEXT_DIM))
        .title(history_title);
    let inner = history_block.inner(chunks[0]);
    let lines = history_lines(app.chat.history(), inner.width, tick);

    let visible = usize::from(inner.height);
    let max_offset = lines.len().saturating_sub(visible);
    let offset = max_offset.saturating_sub(app.chat_scroll.offset().min(max_offset));
    let body = if lines.is_empty() {
        Paragraph::new(Line::from(Span::styled(
            "Digite sua mensagem e pressione Enter.",
            Style::default().fg(palette::TEXT_DIM).italic(),
        )))
    } else {
        Paragraph::new(lines).scroll((u16::try_from(offset).unwrap_or(u16::MAX), 0))
    };
    f.render_widget(body.block(history_block), chunks[0]);

    let title = if app.chat.is_awaiting() {
        " Mensagem (aguardando resposta) "
    } else {
        " Mensagem "
    };
    render_input(f, chunks[1], &app.chat_input, title, true, app.ui_theme.composer_bg, app);
    max_offset
}

fn render_panel(f: &mut Frame, area: Rect, app: &App, panel: &ActionPanel) -> usize {
    let kind = panel.kind();
    let mut constraints = Vec::new();
    for spec in kind.fields() {
        constraints.push(if spec.multiline {
            Constraint::Min(5)
        } else {
            Constraint::Length(3)
        });
    }
    if kind.has_language() {
        constraints.push(Constraint::Length(3));
    }
    let result_index = constraints.len();
    constraints.push(Constraint::Percentage(45));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (index, spec) in kind.fields().iter().enumerate() {
        let Some(input) = panel.input(index) else {
            continue;
        };
        let title = format!(" {} ", spec.label);
        let focused = panel.focus() == index;
        render_input(
            f,
            chunks[index],
            input,
            &title,
            focused,
            app.ui_theme.composer_bg,
            app,
        );
    }

    if kind.has_language() {
        let focused = panel.language_focused();
        let area = chunks[kind.fields().len()];
        let line = Line::from(vec![
            Span::styled("◀ ", Style::default().fg(palette::TEXT_DIM)),
            Span::styled(
                panel.language().label(),
                Style::default()
                    .fg(palette::TEXT_PRIMARY)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" ▶", Style::default().fg(palette::TEXT_DIM)),
        ]);
        let block = field_block(" Linguagem ", focused, app);
        f.render_widget(Paragraph::new(line).block(block), area);
    }

    let scroll = app.result_scroll(kind).offset();
    render_result(f, chunks[result_index], panel, scroll)
}

/// Draw the result area scrolled `scroll` lines down. Returns the largest
/// useful scroll offset.
fn render_result(f: &mut Frame, area: Rect, panel: &ActionPanel, scroll: usize) -> usize {
    let style = match panel.state() {
        ResultState::Hidden | ResultState::Done => Style::default().fg(palette::TEXT_PRIMARY),
        ResultState::Processing => Style::default().fg(palette::TEXT_MUTED).italic(),
        ResultState::Invalid => Style::default().fg(palette::STATUS_WARNING),
        ResultState::Failed => Style::default().fg(palette::STATUS_ERROR),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette::TEXT_DIM))
        .title(" Resultado ");

    let inner = block.inner(area);
    let width = usize::from(inner.width).max(1);
    let lines: Vec<Line> = panel
        .result()
        .unwrap_or_default()
        .split('\n')
        .flat_map(|line| wrap_line(line, width))
        .map(Line::from)
        .collect();

    let max_offset = lines.len().saturating_sub(usize::from(inner.height));
    let offset = scroll.min(max_offset);
    let paragraph = Paragraph::new(lines)
        .style(style)
        .scroll((u16::try_from(offset).unwrap_or(u16::MAX), 0))
        .block(block);
    f.render_widget(paragraph, area);
    max_offset
}

fn field_block<'a>(title: &'a str, focused: bool, app: &App) -> Block<'a> {
    let border = if focused {
        Style::default().fg(app.ui_theme.accent)
    } else {
        Style::default().fg(palette::TEXT_DIM)
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(title)
}

/// Draw an input field and, when focused, place the terminal cursor in it.
fn render_input(
    f: &mut Frame,
    area: Rect,
    input: &TextInput,
    title: &str,
    focused: bool,
    bg: ratatui::style::Color,
    app: &App,
) {
    let block = field_block(title, focused, app);
    let inner = block.inner(area);

    let (row, col) = input.cursor_row_col();
    let height = usize::from(inner.height.max(1));
    let width = usize::from(inner.width.max(1));
    let scroll_y = row.saturating_sub(height - 1);
    let scroll_x = col.saturating_sub(width - 1);

    let lines: Vec<Line> = input
        .text()
        .split('\n')
        .map(|line| Line::from(line.to_string()))
        .collect();
    let paragraph = Paragraph::new(lines)
        .style(Style::default().fg(palette::TEXT_PRIMARY).bg(bg))
        .scroll((
            u16::try_from(scroll_y).unwrap_or(u16::MAX),
            u16::try_from(scroll_x).unwrap_or(u16::MAX),
        ))
        .block(block);
    f.render_widget(paragraph, area);

    if focused {
        let x = inner.x + u16::try_from(col - scroll_x).unwrap_or(0);
        let y = inner.y + u16::try_from(row - scroll_y).unwrap_or(0);
        f.set_cursor_position(Position::new(x, y));
    }
}

fn render_footer(f: &mut Frame, area: Rect, app: &App) {
    let hints = if app.tabs.is_active(Tab::Chat) {
        "Enter enviar · Shift+Enter nova linha · Ctrl+L nova conversa · PgUp/PgDn rolar · Ctrl+C sair"
    } else {
        "Tab campo · ←/→ linguagem · Ctrl+R executar · PgUp/PgDn resultado · Ctrl+C sair"
    };

    let mut spans = Vec::new();
    if let Some(status) = app.status_message.as_deref() {
        spans.push(Span::styled(
            format!("{status}  "),
            Style::default().fg(palette::STATUS_WARNING),
        ));
    }
    if let Some(model) = app.last_model.as_deref() {
        spans.push(Span::styled(
            format!("{model}  "),
            Style::default().fg(palette::TEXT_MUTED),
        ));
    }
    if let Some(usage) = app.last_usage.as_ref() {
        spans.push(Span::styled(
            format!(
                "{} tokens ({}↑ {}↓)  ",
                usage.total_tokens, usage.prompt_tokens, usage.completion_tokens
            ),
            Style::default().fg(palette::STATUS_INFO),
        ));
    }
    spans.push(Span::styled(hints, Style::default().fg(palette::TEXT_DIM)));

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::panel::{ActionKind, Language};
    use crate::models::CompletionResponse;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::backend::TestBackend;

    fn app() -> App {
        App::new(TuiOptions {
            base_url: "http://localhost:8000".to_string(),
            default_language: Language::Python,
            theme: "default".to_string(),
        })
    }

    fn screen(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn chat_tab_renders_history_and_hints() {
        let mut app = app();
        app.chat_input.set_text("Olá");
        app.submit_chat();

        let mut terminal = Terminal::new(TestBackend::new(100, 20)).expect("terminal");
        terminal.draw(|f| render(f, &mut app, 0)).expect("draw");
        let text = screen(&terminal);

        assert!(text.contains("Você"));
        assert!(text.contains("Pensando"));
        assert!(text.contains("Enter enviar"));
    }

    #[test]
    fn panel_tab_renders_result_text() {
        let mut app = app();
        app.tabs.open(Tab::CodeReview);
        app.panel_mut(ActionKind::CodeReview).run();

        let mut terminal = Terminal::new(TestBackend::new(100, 24)).expect("terminal");
        terminal.draw(|f| render(f, &mut app, 0)).expect("draw");
        let text = screen(&terminal);

        assert!(text.contains("Resultado"));
        assert!(text.contains("Por favor, forneça o código para revisar."));
        assert!(text.contains("Python"));
    }

    #[test]
    fn long_result_scrolls_to_its_last_line() {
        let mut app = app();
        app.tabs.open(Tab::CodeGeneration);
        app.panel_mut(ActionKind::CodeGeneration)
            .set_field(0, "sessenta linhas");
        let turn = app
            .panel_mut(ActionKind::CodeGeneration)
            .run()
            .expect("request");
        let code: Vec<String> = (1..=60).map(|n| format!("linha {n}")).collect();
        app.apply_event(ReplyEvent::ActionReply {
            kind: ActionKind::CodeGeneration,
            ticket: turn.ticket,
            result: Ok(CompletionResponse {
                content: Some(code.join("\n")),
                ..CompletionResponse::default()
            }),
        });

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).expect("terminal");
        terminal.draw(|f| render(f, &mut app, 0)).expect("draw");
        let first = screen(&terminal);
        assert!(first.contains("linha 1 "));
        assert!(!first.contains("linha 60"));

        for _ in 0..10 {
            app.handle_key(KeyEvent::new(KeyCode::PageDown, KeyModifiers::NONE));
            terminal.draw(|f| render(f, &mut app, 0)).expect("draw");
        }
        let scrolled = screen(&terminal);
        assert!(scrolled.contains("linha 60"));
        assert!(!scrolled.contains("linha 1 "));

        app.handle_key(KeyEvent::new(KeyCode::PageUp, KeyModifiers::NONE));
        terminal.draw(|f| render(f, &mut app, 0)).expect("draw");
        assert!(!screen(&terminal).contains("linha 60"));
    }

    #[test]
    fn chat_page_down_returns_to_newest_after_overscroll() {
        let mut app = app();
        for n in 0..30 {
            app.chat_input.set_text(format!("mensagem {n}"));
            let Some(AppAction::SendChat(turn)) = app.submit_chat() else {
                panic!("expected request");
            };
            app.apply_event(ReplyEvent::ChatReply {
                ticket: turn.ticket,
                result: Ok(CompletionResponse {
                    content: Some(format!("resposta {n}")),
                    ..CompletionResponse::default()
                }),
            });
        }

        let mut terminal = Terminal::new(TestBackend::new(80, 20)).expect("terminal");
        terminal.draw(|f| render(f, &mut app, 0)).expect("draw");
        for _ in 0..50 {
            app.handle_key(KeyEvent::new(KeyCode::PageUp, KeyModifiers::NONE));
            terminal.draw(|f| render(f, &mut app, 0)).expect("draw");
        }
        assert!(screen(&terminal).contains("mensagem 0"));

        let pages = app.chat_scroll.offset().div_ceil(10);
        for _ in 0..pages {
            app.handle_key(KeyEvent::new(KeyCode::PageDown, KeyModifiers::NONE));
        }
        assert_eq!(app.chat_scroll.offset(), 0);
        terminal.draw(|f| render(f, &mut app, 0)).expect("draw");
        assert!(screen(&terminal).contains("resposta 29"));
    }
}
