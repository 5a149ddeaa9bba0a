use anyhow::Result;
use lyre_core::SchedulerHandle;
use ratatui::{
    Frame,
    crossterm::event::KeyCode,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
};

use crate::{
    router::{RouteAction, RouteHandler},
    state::AppState,
    states::AudioState,
};

/// Playback route - the default view
#[derive(Debug, Clone)]
pub struct PlaybackRoute;

impl RouteHandler for PlaybackRoute {
    fn render(&self, frame: &mut Frame, area: Rect, state: &AppState) {
        draw_playback_panel(frame, area, state);
    }

    fn handle_input(
        &mut self,
        key: KeyCode,
        _state: &mut AppState,
        handle: &SchedulerHandle,
    ) -> Result<RouteAction> {
        match key {
            KeyCode::Right => handle.next(),
            KeyCode::Left => handle.previous(),
            _ => {}
        }
        Ok(RouteAction::None)
    }

    fn name(&self) -> &str {
        "Playback"
    }

    fn help_items(&self, _state: &AppState) -> Vec<(&str, &str)> {
        vec![
            ("Space", "Play/Pause"),
            ("N/P", "Next/Prev"),
            ("S", "Stop"),
            ("Shift+S", "Stop All"),
            ("Tab", "Switch Tab"),
            ("Q", "Quit"),
        ]
    }
}

pub fn draw_playback_panel(f: &mut Frame, area: Rect, state: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8), // Now playing info
            Constraint::Length(3), // Progress bar
            Constraint::Min(0),
        ])
        .split(area);

    draw_now_playing(f, chunks[0], state);
    draw_progress(f, chunks[1], state);
}

fn draw_now_playing(f: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default()
        .title(" 🎵 Now Playing ")
        .borders(Borders::ALL)
        .border_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );

    let inner = block.inner(area);
    f.render_widget(block, area);

    let audio = &state.audio;
    if audio.track.is_none() {
        let text = Paragraph::new("Nothing playing").style(Style::default().fg(Color::DarkGray));
        f.render_widget(text, inner);
        return;
    }

    let mut text = vec![
        Line::from(Span::styled(
            audio.title.as_str(),
            Style::default().fg(Color::White).bold(),
        )),
        Line::from(Span::styled(
            audio.artist.as_str(),
            Style::default().fg(Color::Gray),
        )),
        Line::from(Span::styled(
            audio.album.as_str(),
            Style::default().fg(Color::DarkGray),
        )),
    ];
    if !audio.format.is_empty() {
        text.push(Line::from(Span::styled(
            audio.format.as_str(),
            Style::default().fg(Color::DarkGray),
        )));
    }
    if audio.is_paused {
        text.push(Line::from(Span::styled(
            "⏸ Paused",
            Style::default().fg(Color::Yellow),
        )));
    }

    f.render_widget(Paragraph::new(text), inner);
}

fn draw_progress(f: &mut Frame, area: Rect, state: &AppState) {
    let audio = &state.audio;
    let progress_pct = (audio.progress() * 100.0) as u16;
    let label = format!(
        "{} / {}",
        AudioState::format_time(audio.position),
        AudioState::format_time(audio.duration)
    );

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL))
        .gauge_style(Style::default().fg(Color::Cyan).bg(Color::DarkGray))
        .percent(progress_pct)
        .label(label);

    f.render_widget(gauge, area);
}
