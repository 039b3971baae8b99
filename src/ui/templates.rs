//! Template picker view

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
        .title(" New Form from Template ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    if app.state.templates.is_empty() {
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from("  No templates available."),
        ])
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = app
        .state
        .templates
        .iter()
        .map(|template| {
            let mut spans = vec![Span::raw(template.title.clone())];
            if let Some(description) = &template.description {
                spans.push(Span::styled(
                    format!("  {description}"),
                    Style::default().fg(Color::DarkGray),
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

    let mut list_state =
        ListState::default().with_selected(Some(app.state.selected_template_index));
    frame.render_stateful_widget(list, area, &mut list_state);
}
