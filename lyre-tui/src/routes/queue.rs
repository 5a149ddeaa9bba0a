use anyhow::Result;
use lyre_core::SchedulerHandle;
use ratatui::{
    Frame,
    crossterm::event::KeyCode,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use crate::{
    router::{RouteAction, RouteHandler},
    state::AppState,
    states::queue::QueueRow,
};

/// Queue route
#[derive(Debug, Clone)]
pub struct QueueRoute;

impl RouteHandler for QueueRoute {
    fn render(&self, frame: &mut Frame, area: Rect, state: &AppState) {
        draw_queue_panel(frame, area, state);
    }

    fn handle_input(
        &mut self,
        key: KeyCode,
        state: &mut AppState,
        _handle: &SchedulerHandle,
    ) -> Result<RouteAction> {
        match key {
            KeyCode::Up => state.queue.prev(),
            KeyCode::Down => state.queue.next(),
            _ => {}
        }
        Ok(RouteAction::None)
    }

    fn name(&self) -> &str {
        "Queue"
    }

    fn help_items(&self, _state: &AppState) -> Vec<(&str, &str)> {
        vec![
            ("↑/↓", "Navigate"),
            ("N/P", "Next/Prev"),
            ("S", "Stop"),
            ("Tab", "Switch Tab"),
            ("Q", "Quit"),
        ]
    }
}

pub fn draw_queue_panel(f: &mut Frame, area: Rect, state: &AppState) {
    let snapshot = &state.queue.snapshot;
    let title = format!(
        " Queue ({} upcoming, {} suspended) ",
        snapshot.upcoming(),
        snapshot.suspended_depth
    );
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    if state.queue.is_empty() {
        let empty_msg = Paragraph::new("Queue is empty. Pick something in Library.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(empty_msg, area);
        return;
    }

    let items: Vec<ListItem> = state
        .queue
        .rows()
        .into_iter()
        .map(|row| match row {
            QueueRow::Header(text) => ListItem::new(text).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            QueueRow::Track(id) => {
                let is_current = state.audio.track == Some(id);
                let prefix = if is_current { "▶ " } else { "  " };
                let style = if is_current {
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                };
                ListItem::new(format!("{}{}", prefix, state.track_label(id))).style(style)
            }
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(">> ");

    // Ratatui needs a mutable ListState for offsets; render from a copy
    let mut list_state = state.queue.list_state.clone();
    f.render_stateful_widget(list, area, &mut list_state);
}
