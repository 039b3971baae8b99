//! Entry rendering for the builder view

use crate::state::EntryField;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Draw a single builder entry as a bordered one-line box
pub fn draw_entry(frame: &mut Frame, area: Rect, entry: &EntryField, is_active: bool) {
    let style = if is_active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let display_value = entry.display_value();
    let display_str = if display_value.is_empty() && !is_active {
        "(empty)".to_string()
    } else {
        display_value
    };

    let cursor = if is_active { "▌" } else { "" };

    let content = Paragraph::new(Line::from(vec![
        Span::styled(display_str, style),
        Span::styled(cursor, Style::default().fg(Color::Cyan)),
    ]));

    let block = Block::default()
        .title(format!(" {} ", entry.label))
        .borders(Borders::ALL)
        .border_style(style);

    frame.render_widget(content.wrap(Wrap { trim: false }).block(block), area);
}
