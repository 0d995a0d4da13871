use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};
use ratatui::Frame;

use crate::rows::{format_row, RowKind};
use crate::tui_state::{InputMode, WatchUiState};
use crate::Session;

const ELLIPSIS: &str = "…";
const CHROME_ROWS: usize = 6;

pub(crate) fn viewport_rows_for(height: u16, ui: &WatchUiState) -> usize {
    let mut reserved = CHROME_ROWS + ui.event_log.len();
    if ui.help_visible {
        reserved += 1;
    }
    (height as usize).saturating_sub(reserved)
}

pub(crate) fn render_watch(frame: &mut Frame<'_>, ui: &WatchUiState, session: &Session) {
    let engine = &session.engine;
    let content_width = (frame.area().width as usize).saturating_sub(2).max(16);

    let header_text = truncate_to_width(
        format!(
            "HoneyPot | {} | {}",
            engine.title().unwrap_or("untitled"),
            if engine.root_expression().is_empty() {
                "no state detected"
            } else {
                engine.root_expression()
            }
        )
        .as_str(),
        content_width,
    );
    let poll_text = truncate_to_width(
        format!(
            "polling: {} every {}ms | filter: {}",
            if engine.options().automatic { "on" } else { "off" },
            session.interval().as_millis(),
            engine.view().pattern()
        )
        .as_str(),
        content_width,
    );

    let mut lines_out: Vec<Line<'_>> = Vec::new();
    lines_out.push(Line::from(header_text));
    lines_out.push(Line::from(Span::styled(
        poll_text,
        Style::default().fg(Color::Gray),
    )));
    lines_out.push(Line::from(Span::styled(
        "─".repeat(content_width),
        Style::default().fg(Color::Gray),
    )));

    let viewport = ui.viewport_rows.max(1);
    for (offset, row) in ui.rows.iter().skip(ui.scroll_offset).take(viewport).enumerate() {
        let selected = ui.scroll_offset + offset == ui.selected;
        let editing = matches!(&ui.input, InputMode::Edit { path, .. } if *path == row.path);
        let text = match (&ui.input, editing) {
            (InputMode::Edit { buffer, .. }, true) => {
                format!("{}{} = {}_", "  ".repeat(row.depth), row.label, buffer)
            }
            _ => format_row(row),
        };
        let mut style = match &row.kind {
            RowKind::Container { .. } => Style::default().fg(Color::Blue),
            RowKind::Leaf { changed: true, .. } => Style::default().fg(Color::Yellow),
            RowKind::Leaf { locked: true, .. } => Style::default().fg(Color::Red),
            RowKind::Leaf { .. } => Style::default(),
        };
        if row.highlighted {
            style = style.add_modifier(Modifier::UNDERLINED);
        }
        if selected {
            style = style.fg(Color::Green).add_modifier(Modifier::BOLD);
        }
        let prefix = if selected { "> " } else { "  " };
        lines_out.push(Line::from(Span::styled(
            truncate_to_width(format!("{}{}", prefix, text).as_str(), content_width),
            style,
        )));
    }
    for _ in ui.rows.len().saturating_sub(ui.scroll_offset).min(viewport)..viewport {
        lines_out.push(Line::from(" "));
    }

    lines_out.push(Line::from(Span::styled(
        "─".repeat(content_width),
        Style::default().fg(Color::Gray),
    )));
    for line in &ui.event_log {
        lines_out.push(Line::from(Span::styled(
            truncate_to_width(line, content_width),
            Style::default().fg(Color::Magenta),
        )));
    }
    let status_text = match &ui.input {
        InputMode::Filter { buffer } => format!("filter> {}_", buffer),
        InputMode::Edit { path, .. } => format!("editing {} (enter write, esc cancel)", path),
        InputMode::Browse => format!("status: {}", ui.status),
    };
    lines_out.push(Line::from(Span::styled(
        truncate_to_width(&status_text, content_width),
        Style::default().fg(Color::Gray),
    )));
    lines_out.push(Line::from(Span::styled(
        truncate_to_width(
            "keys: up/down move | enter edit/toggle | l lock | f refresh | / filter | c/e collapse/expand | a auto | p poll | u clear | h help | q quit",
            content_width,
        ),
        Style::default().fg(Color::Yellow),
    )));
    if ui.help_visible {
        lines_out.push(Line::from(Span::styled(
            truncate_to_width(
                "yellow rows changed since you last looked, red rows are locked and re-written every poll.",
                content_width,
            ),
            Style::default().fg(Color::Magenta),
        )));
    }

    let paragraph = Paragraph::new(lines_out).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, frame.area());
}

pub(crate) fn truncate_to_width(value: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    let chars = value.chars().collect::<Vec<_>>();
    if chars.len() <= width {
        return value.to_string();
    }
    if width == 1 {
        return ELLIPSIS.to_string();
    }
    let mut out = chars.into_iter().take(width - 1).collect::<String>();
    out.push_str(ELLIPSIS);
    out
}
