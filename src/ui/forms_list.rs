//! Form manager list view

use crate::app::App;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title(" Forms ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    if app.state.forms.is_empty() {
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from("  No forms yet."),
            Line::from(""),
            Line::from(Span::styled(
                "  Press n to build one, or t to start from a template.",
                Style::default().fg(Color::DarkGray),
            )),
        ])
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = app
        .state
        .forms
        .iter()
        .map(|form| {
            let marked_for_delete =
                app.state.confirm_delete.as_deref() == Some(form.id.as_str());
            let mut spans = vec![Span::raw(form.title.clone())];
            spans.push(Span::styled(
                format!("  {} fields", form.field_count),
                Style::default().fg(Color::DarkGray),
            ));
            if form.response_count > 0 {
                spans.push(Span::styled(
                    format!("  {} responses", form.response_count),
                    Style::default().fg(Color::DarkGray),
                ));
            }
            if marked_for_delete {
                spans.push(Span::styled(
                    "  delete?",
                    Style::default().fg(Color::Red),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut list_state = ListState::default().with_selected(Some(app.state.selected_form_index));
    frame.render_stateful_widget(list, area, &mut list_state);
}
