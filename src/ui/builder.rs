//! Form builder view

use super::entry_renderer::draw_entry;
use crate::app::App;
use crate::state::BUTTONS_ROW;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

const BUTTON_LABELS: [&str; 3] = ["Cancel", "Add Field", "Save"];

pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
    // Entries on the left, added fields on the right
    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(46),    // Entry column
            Constraint::Length(32), // Added fields
        ])
        .split(area);

    draw_entries(frame, main_chunks[0], app);
    draw_added_fields(frame, main_chunks[1], app);
}

fn draw_entries(frame: &mut Frame, area: Rect, app: &App) {
    let builder = &app.state.builder;

    let block = Block::default()
        .title(" Create Form ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Length(3), // Description
            Constraint::Length(3), // Field name
            Constraint::Length(3), // Field label
            Constraint::Length(3), // Field type
            Constraint::Length(3), // Options
            Constraint::Length(3), // Required
            Constraint::Length(1), // Buttons
            Constraint::Min(0),
        ])
        .split(inner);

    for index in 0..BUTTONS_ROW {
        if let Some(entry) = builder.entry(index) {
            draw_entry(
                frame,
                chunks[index],
                entry,
                builder.active_entry_index == index,
            );
        }
    }

    draw_buttons(frame, chunks[BUTTONS_ROW], app);
}

fn draw_buttons(frame: &mut Frame, area: Rect, app: &App) {
    let builder = &app.state.builder;
    let buttons_active = builder.is_buttons_row_active();

    let mut spans = vec![Span::raw(" ")];
    for (index, label) in BUTTON_LABELS.iter().enumerate() {
        let selected = buttons_active && builder.selected_button == index;
        let style = if selected {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else if buttons_active {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!("[ {label} ]"), style));
        spans.push(Span::raw("  "));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_added_fields(frame: &mut Frame, area: Rect, app: &App) {
    let builder = &app.state.builder;

    let block = Block::default()
        .title(format!(" Fields ({}) ", builder.added.len()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let items: Vec<ListItem> = builder
        .added
        .iter()
        .map(|field| {
            let required = if field.validation.required { "*" } else { " " };
            ListItem::new(Line::from(vec![
                Span::styled(required, Style::default().fg(Color::Red)),
                Span::raw(field.name.clone()),
                Span::styled(
                    format!("  {}", field.field_type.label()),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}
