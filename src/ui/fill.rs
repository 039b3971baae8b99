//! Conversational fill view: chat panel plus live form state

use crate::app::App;
use crate::state::{ChatRole, FillFocus};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(40),    // Chat panel
            Constraint::Length(38), // Form panel
        ])
        .split(area);

    draw_chat(frame, chunks[0], app);
    draw_form(frame, chunks[1], app);
}

fn draw_chat(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Log
            Constraint::Length(3), // Input line
        ])
        .split(area);

    draw_chat_log(frame, chunks[0], app);
    draw_input_line(frame, chunks[1], app);
}

fn draw_chat_log(frame: &mut Frame, area: Rect, app: &App) {
    let title = app
        .state
        .schema
        .as_ref()
        .map(|s| format!(" {} ", s.title))
        .unwrap_or_else(|| " Conversation ".to_string());

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let mut lines: Vec<Line> = Vec::new();
    for message in &app.state.chat {
        let (prefix_style, text_style) = match message.role {
            ChatRole::User => (
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                Style::default(),
            ),
            ChatRole::Agent => (
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
                Style::default(),
            ),
            ChatRole::Advisory => (
                Style::default().fg(Color::Yellow),
                Style::default().fg(Color::Yellow),
            ),
        };
        lines.push(Line::from(vec![
            Span::styled(
                format!("{} ", message.timestamp.format("%H:%M")),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(format!("{:>5}  ", message.role.prefix()), prefix_style),
            Span::styled(message.content.clone(), text_style),
        ]));
    }
    if app.state.turn_pending {
        lines.push(Line::from(Span::styled(
            "       agent is thinking…",
            Style::default().fg(Color::DarkGray),
        )));
    }

    // Keep the tail visible
    let visible = area.height.saturating_sub(2) as usize;
    let scroll = lines.len().saturating_sub(visible) as u16;

    let log = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    frame.render_widget(log, area);
}

fn draw_input_line(frame: &mut Frame, area: Rect, app: &App) {
    let input_focused = app.state.fill_focus == FillFocus::Input && app.state.field_edit.is_none();

    let (title, content, color) = if let Some(preview) = app.capture_preview() {
        let text = if preview.is_empty() {
            "listening…".to_string()
        } else {
            preview
        };
        (" 🎤 Voice ", text, Color::Yellow)
    } else {
        let color = if input_focused {
            Color::Cyan
        } else {
            Color::DarkGray
        };
        (" Your answer ", app.state.chat_input.clone(), color)
    };

    let cursor = if input_focused && !app.capture_active() {
        "▌"
    } else {
        ""
    };

    let input = Paragraph::new(Line::from(vec![
        Span::raw(content),
        Span::styled(cursor, Style::default().fg(Color::Cyan)),
    ]))
    .block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color)),
    );
    frame.render_widget(input, area);
}

fn draw_form(frame: &mut Frame, area: Rect, app: &App) {
    let Some(schema) = &app.state.schema else {
        return;
    };
    let fields_focused = app.state.fill_focus == FillFocus::Fields;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Progress
            Constraint::Min(3),    // Fields
            Constraint::Length(3), // Edit line
        ])
        .split(area);

    // Progress gauge over all fields, completion over required ones
    let completion = app.state.form_data.completion(schema);
    let gauge_color = if completion.is_complete() {
        Color::Green
    } else {
        Color::Cyan
    };
    let gauge = Gauge::default()
        .block(Block::default().title(" Progress ").borders(Borders::ALL))
        .gauge_style(Style::default().fg(gauge_color))
        .percent(completion.progress_percent())
        .label(format!(
            "{}/{} fields",
            completion.collected_fields, completion.total_fields
        ));
    frame.render_widget(gauge, chunks[0]);

    // Field list with status markers
    let border_color = if fields_focused {
        Color::Cyan
    } else {
        Color::DarkGray
    };
    let block = Block::default()
        .title(" Fields ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    let items: Vec<ListItem> = schema
        .ordered_fields()
        .iter()
        .map(|field| {
            let state = app.state.form_data.get(&field.name);
            let marker = state.map(|s| s.status.marker()).unwrap_or("○");
            let value = app.state.form_data.value(&field.name);
            let required = if field.validation.required { "*" } else { " " };

            let value_span = if value.is_empty() {
                let hint = field.hint().unwrap_or_else(|| "—".to_string());
                Span::styled(hint, Style::default().fg(Color::DarkGray))
            } else {
                Span::raw(value.to_string())
            };

            ListItem::new(Line::from(vec![
                Span::raw(format!("{marker} ")),
                Span::styled(required, Style::default().fg(Color::Red)),
                Span::styled(
                    format!("{}: ", field.label),
                    Style::default().fg(Color::DarkGray),
                ),
                value_span,
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    let selected = fields_focused.then_some(app.state.field_cursor);
    let mut list_state = ListState::default().with_selected(selected);
    frame.render_stateful_widget(list, chunks[1], &mut list_state);

    draw_edit_line(frame, chunks[2], app);
}

fn draw_edit_line(frame: &mut Frame, area: Rect, app: &App) {
    let Some(edit) = &app.state.field_edit else {
        let hint = if app.state.session_complete {
            Paragraph::new(Span::styled(
                "All set. ^U submits",
                Style::default().fg(Color::Green),
            ))
            .block(Block::default().borders(Borders::ALL))
        } else {
            Paragraph::new(Span::styled(
                "e edits the selected field",
                Style::default().fg(Color::DarkGray),
            ))
            .block(Block::default().borders(Borders::ALL).border_style(
                Style::default().fg(Color::DarkGray),
            ))
        };
        frame.render_widget(hint, area);
        return;
    };

    let input = Paragraph::new(Line::from(vec![
        Span::raw(edit.buffer.clone()),
        Span::styled("▌", Style::default().fg(Color::Cyan)),
    ]))
    .block(
        Block::default()
            .title(format!(" Edit {} ", edit.name))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    frame.render_widget(input, area);
}
