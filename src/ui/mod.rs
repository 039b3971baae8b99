//! UI module for rendering the TUI

mod builder;
mod entry_renderer;
mod fill;
mod forms_list;
mod templates;

use crate::app::App;
use crate::state::View;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Reserve bottom line for status bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    match &app.state.current_view {
        View::Forms => forms_list::draw(frame, chunks[0], app),
        View::Templates => templates::draw(frame, chunks[0], app),
        View::Builder => builder::draw(frame, chunks[0], app),
        View::Fill => fill::draw(frame, chunks[0], app),
    }

    draw_status_bar(frame, chunks[1], app);
}

/// Draw the status bar
fn draw_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![];

    // Backend status: red when unreachable or after a failed call
    let conn_status = if app.state.backend_connected && app.state.backend_ok {
        Span::styled(" ● ", Style::default().fg(Color::Green))
    } else {
        Span::styled(" ● ", Style::default().fg(Color::Red))
    };
    spans.push(conn_status);

    // Media activity
    if let Some(phase) = app.capture_phase() {
        let label = match phase {
            crate::capture::CapturePhase::SpeechDetected => "🎤 hearing you ",
            _ => "🎤 listening ",
        };
        spans.push(Span::styled(label, Style::default().fg(Color::Yellow)));
    } else if app.is_playing() {
        spans.push(Span::styled(
            "🔊 playing ",
            Style::default().fg(Color::Yellow),
        ));
    }

    // View-specific hints
    let hints = get_view_hints(app);
    spans.push(Span::styled(hints, Style::default().fg(Color::DarkGray)));

    // Transient feedback
    if let Some(msg) = &app.state.status_message {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(msg, Style::default().fg(Color::Green)));
    }

    let status = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(status, area);
}

/// Get keyboard hints for the current view
fn get_view_hints(app: &App) -> String {
    if app.state.confirm_delete.is_some() {
        return "Delete this form? y:yes  any other key:no".to_string();
    }
    match app.state.current_view {
        View::Forms => {
            "j/k:nav  Enter:fill  n:new  t:templates  d:delete  r:refresh  q:quit".to_string()
        }
        View::Templates => "j/k:nav  Enter:create form  Esc:back".to_string(),
        View::Builder => {
            "Tab:next  Enter:cycle/select  ^S:save  Esc:cancel".to_string()
        }
        View::Fill => {
            "Enter:send  ^V:voice  ^K:skip  Tab:fields  ^U:submit  ^R:restart  ^Y:copy  Esc:back"
                .to_string()
        }
    }
}
