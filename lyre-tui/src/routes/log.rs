use anyhow::Result;
use lyre_core::SchedulerHandle;
use ratatui::{
    Frame,
    crossterm::event::KeyCode,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders},
};
use tui_logger::{TuiLoggerWidget, TuiWidgetEvent, TuiWidgetState};

use crate::{
    router::{RouteAction, RouteHandler},
    state::AppState,
};

/// Log route backed by the tui-logger buffer
pub struct LogRoute {
    widget_state: TuiWidgetState,
}

impl std::fmt::Debug for LogRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogRoute").finish_non_exhaustive()
    }
}

impl LogRoute {
    pub fn new() -> Self {
        Self {
            widget_state: TuiWidgetState::new(),
        }
    }
}

impl RouteHandler for LogRoute {
    fn render(&self, frame: &mut Frame, area: Rect, _state: &AppState) {
        let log_widget = TuiLoggerWidget::default()
            .block(
                Block::default()
                    .title(" 📋 Log (PgUp/PgDn to Scroll) ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .style_error(Style::default().fg(Color::Red))
            .style_warn(Style::default().fg(Color::Yellow))
            .style_info(Style::default().fg(Color::Green))
            .style_debug(Style::default().fg(Color::Blue))
            .style(Style::default().fg(Color::White))
            .state(&self.widget_state);

        frame.render_widget(log_widget, area);
    }

    fn handle_input(
        &mut self,
        key: KeyCode,
        _state: &mut AppState,
        _handle: &SchedulerHandle,
    ) -> Result<RouteAction> {
        let event = match key {
            KeyCode::Up | KeyCode::PageUp => TuiWidgetEvent::PrevPageKey,
            KeyCode::Down | KeyCode::PageDown => TuiWidgetEvent::NextPageKey,
            // Leave page mode and follow new records again
            KeyCode::End => TuiWidgetEvent::EscapeKey,
            _ => return Ok(RouteAction::None),
        };
        self.widget_state.transition(event);
        Ok(RouteAction::None)
    }

    fn name(&self) -> &str {
        "Log"
    }

    fn help_items(&self, _state: &AppState) -> Vec<(&str, &str)> {
        vec![
            ("↑/↓", "Scroll"),
            ("End", "Follow"),
            ("Tab", "Switch Tab"),
            ("Q", "Quit"),
        ]
    }
}
