use anyhow::Result;
use lyre_core::SchedulerHandle;
use ratatui::{
    Frame,
    crossterm::event::KeyCode,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

use crate::{
    router::{RouteAction, RouteHandler},
    routes::playback::PlaybackRoute,
    state::AppState,
    states::{LibraryColumn, PlacementDialog},
};

/// Library route - handles both browsing and the placement dialog as internal state
#[derive(Debug, Clone)]
pub struct LibraryRoute;

impl RouteHandler for LibraryRoute {
    fn render(&self, frame: &mut Frame, area: Rect, state: &AppState) {
        draw_library_panel(frame, area, state);
        if let Some(dialog) = &state.library_view.dialog {
            draw_placement_dialog(frame, area, dialog);
        }
    }

    fn handle_input(
        &mut self,
        key: KeyCode,
        state: &mut AppState,
        handle: &SchedulerHandle,
    ) -> Result<RouteAction> {
        let view = &mut state.library_view;

        if !view.is_dialog_open() {
            match key {
                KeyCode::Up => view.prev(),
                KeyCode::Down => view.next(),
                KeyCode::Left => view.focus_left(),
                KeyCode::Right => view.focus_right(),
                KeyCode::Enter => view.open_dialog(),
                KeyCode::Char('a') => view.open_everything_dialog(),
                _ => {}
            }
            return Ok(RouteAction::None);
        }
        let Some(dialog) = view.dialog.as_mut() else {
            return Ok(RouteAction::None);
        };

        match key {
            KeyCode::Up => dialog.prev(),
            KeyCode::Down => dialog.next(),
            KeyCode::Char('x') => dialog.toggle_shuffle(),
            KeyCode::Esc => view.close_dialog(),
            KeyCode::Enter => {
                let Some(choice) = dialog.choice() else {
                    return Ok(RouteAction::None);
                };
                let options = dialog.options();
                let source = dialog.source.clone();
                let title = dialog.title.clone();
                view.close_dialog();

                if let Err(e) = handle.start_playback(&source, options.clone()) {
                    log::error!("Could not start playback of {}: {}", title, e);
                    state.error_message = Some(e.to_string());
                    return Ok(RouteAction::None);
                }
                state.error_message = None;
                state.status_message = format!("{}: {}", choice, title);

                if options.placement().is_disruptive() {
                    return Ok(RouteAction::Replace(Box::new(PlaybackRoute)));
                }
            }
            _ => {}
        }
        Ok(RouteAction::None)
    }

    fn name(&self) -> &str {
        "Library"
    }

    fn help_items(&self, state: &AppState) -> Vec<(&str, &str)> {
        if state.library_view.is_dialog_open() {
            vec![
                ("↑/↓", "Choose"),
                ("X", "Shuffle"),
                ("Enter", "Confirm"),
                ("Esc", "Cancel"),
            ]
        } else {
            vec![
                ("↑/↓/←/→", "Navigate"),
                ("Enter", "Play..."),
                ("A", "Play All..."),
                ("Tab", "Switch Tab"),
                ("Q", "Quit"),
            ]
        }
    }
}

fn column<'a>(
    f: &mut Frame,
    area: Rect,
    title: &'a str,
    items: Vec<ListItem<'a>>,
    list_state: &ListState,
    focused: bool,
) {
    let block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        });

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(if focused { ">> " } else { "   " });

    let mut list_state = list_state.clone();
    f.render_stateful_widget(list, area, &mut list_state);
}

pub fn draw_library_panel(f: &mut Frame, area: Rect, state: &AppState) {
    let view = &state.library_view;

    if view.library().is_empty() {
        let empty_msg = Paragraph::new("Library is empty. Pass audio files or folders on the command line.")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().title(" Library ").borders(Borders::ALL));
        f.render_widget(empty_msg, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Percentage(30),
            Constraint::Percentage(40),
        ])
        .split(area);

    let artists = view.artist_names().into_iter().map(ListItem::new).collect();
    column(
        f,
        chunks[0],
        "Artists",
        artists,
        &view.artists,
        view.focus == LibraryColumn::Artists,
    );

    let albums = view.album_names().into_iter().map(ListItem::new).collect();
    column(
        f,
        chunks[1],
        "Albums",
        albums,
        &view.albums,
        view.focus == LibraryColumn::Albums,
    );

    let tracks = view
        .track_ids()
        .into_iter()
        .filter_map(|id| view.library().track(id))
        .map(|track| {
            let number = track
                .metadata
                .track_number
                .map(|n| format!("{:>2}. ", n))
                .unwrap_or_default();
            ListItem::new(format!("{}{}", number, track.title()))
        })
        .collect();
    column(
        f,
        chunks[2],
        "Tracks",
        tracks,
        &view.tracks,
        view.focus == LibraryColumn::Tracks,
    );
}

fn draw_placement_dialog(f: &mut Frame, area: Rect, dialog: &PlacementDialog) {
    let choices = PlacementDialog::choices();
    let dialog_width = 44.min(area.width);
    let dialog_height = (choices.len() as u16 + 4).min(area.height);
    let x = area.x + (area.width.saturating_sub(dialog_width)) / 2;
    let y = area.y + (area.height.saturating_sub(dialog_height)) / 2;
    let dialog_area = Rect::new(x, y, dialog_width, dialog_height);

    // Clear the area behind dialog
    f.render_widget(Clear, dialog_area);

    let block = Block::default()
        .title(format!(" {} ", dialog.title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let inner = block.inner(dialog_area);
    f.render_widget(block, dialog_area);

    let mut text: Vec<Line> = choices
        .iter()
        .enumerate()
        .map(|(i, choice)| {
            let is_selected = i == dialog.selected;
            let style = if is_selected {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            let prefix = if is_selected { "> " } else { "  " };
            Line::from(Span::styled(format!("{}{}", prefix, choice), style))
        })
        .collect();

    let shuffle = if dialog.shuffle { "[x]" } else { "[ ]" };
    text.push(Line::from(Span::styled(
        format!("  {} Shuffle", shuffle),
        Style::default().fg(Color::Magenta),
    )));

    f.render_widget(Paragraph::new(text), inner);
}
