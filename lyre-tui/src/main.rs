use std::{io, sync::Arc, time::Duration};

use anyhow::{Context, bail};
use clap::Parser;
use lyre_core::{
    Library, PlaybackEvent, PlaybackScheduler, SchedulerHandle,
    decoder::SymphoniaDecoder, output::RodioSink, scan,
};
use ratatui::{
    backend::CrosstermBackend,
    crossterm::{
        event::{self, Event, KeyCode, KeyEventKind},
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    },
};

mod cli;
mod router;
mod routes;
mod state;
mod states;
mod ui;

use cli::Cli;
use router::{Router, next_tab, route_for_name};
use routes::playback::PlaybackRoute;
use state::AppState;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.headless {
        env_logger::Builder::new()
            .filter_level(cli.log_level())
            .init();
    } else {
        // Initialize tui_logger for TUI log display
        tui_logger::init_logger(cli.log_level())
            .map_err(|e| anyhow::anyhow!("Failed to init tui_logger: {:?}", e))?;
        tui_logger::set_default_level(cli.log_level());
    }

    log::info!("Starting Lyre");

    let library = Arc::new(scan::scan_paths(&cli.paths));
    log::info!(
        "Library: {} tracks by {} artists",
        library.len(),
        library.artists().len()
    );

    let (scheduler, handle) = PlaybackScheduler::new(
        Arc::clone(&library),
        Box::new(SymphoniaDecoder::new()),
        Box::new(RodioSink::default()),
        cli.scheduler_config(),
    );
    let scheduler_thread = scheduler.spawn().context("Failed to start the scheduler")?;

    let started = if library.is_empty() {
        Ok(())
    } else {
        handle
            .start_playback(&cli.initial_source(), cli.initial_options())
            .context("Failed to start playback")
    };

    let result = started.and_then(|()| {
        if cli.headless {
            run_headless(&handle, library.is_empty())
        } else {
            run_tui(&handle, library)
        }
    });

    // Ensure clean shutdown
    handle.exit();
    if scheduler_thread.join().is_err() {
        log::error!("Scheduler thread panicked");
    }
    result
}

/// Play everything once, logging to stderr
fn run_headless(handle: &SchedulerHandle, empty: bool) -> anyhow::Result<()> {
    if empty {
        bail!("No playable audio files found");
    }

    let mut started = false;
    for event in handle.events().iter() {
        match event {
            PlaybackEvent::TrackStarted { track, .. } => {
                started = true;
                if let Some(entry) = handle.library().track(track) {
                    log::info!("Now playing {} - {}", entry.title(), entry.artist());
                }
            }
            PlaybackEvent::TrackSkipped { track, reason } => {
                started = true;
                log::warn!("Skipped {}: {}", track, reason);
            }
            PlaybackEvent::QueueChanged(_) => started = true,
            PlaybackEvent::Idle if started => break,
            PlaybackEvent::Shutdown => break,
            _ => {}
        }
    }
    Ok(())
}

fn run_tui(handle: &SchedulerHandle, library: Arc<Library>) -> anyhow::Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let mut state = AppState::new(library);
    let mut router = Router::new(Box::new(PlaybackRoute));

    let result = event_loop(&mut terminal, &mut state, &mut router, handle);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn event_loop(
    terminal: &mut ratatui::Terminal<CrosstermBackend<io::Stdout>>,
    state: &mut AppState,
    router: &mut Router,
    handle: &SchedulerHandle,
) -> anyhow::Result<()> {
    loop {
        // Handle scheduler events
        while let Ok(event) = handle.events().try_recv() {
            state.handle_event(event);
        }
        state.refresh(&handle.now_playing());
        if state.shutdown {
            return Ok(());
        }

        terminal.draw(|f| ui::draw(f, state, router))?;

        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && handle_global_keys(key.code, state, handle, router)?
        {
            return Ok(());
        }
    }
}

/// Keys handled before the current route sees them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GlobalKey {
    Quit,
    Toggle,
    Stop,
    StopAll,
    Next,
    Previous,
    NextTab,
}

fn global_key(key: KeyCode, state: &AppState) -> Option<GlobalKey> {
    // An open dialog takes every key but quit
    if state.library_view.is_dialog_open() && key != KeyCode::Char('q') {
        return None;
    }
    match key {
        KeyCode::Char('q') => Some(GlobalKey::Quit),
        KeyCode::Char(' ') => Some(GlobalKey::Toggle),
        KeyCode::Char('s') => Some(GlobalKey::Stop),
        KeyCode::Char('S') => Some(GlobalKey::StopAll),
        KeyCode::Char('n') => Some(GlobalKey::Next),
        KeyCode::Char('p') => Some(GlobalKey::Previous),
        KeyCode::Tab => Some(GlobalKey::NextTab),
        _ => None,
    }
}

/// Handle global keys and delegate route-specific input to router
fn handle_global_keys(
    key: KeyCode,
    state: &mut AppState,
    handle: &SchedulerHandle,
    router: &mut Router,
) -> anyhow::Result<bool> {
    match global_key(key, state) {
        Some(GlobalKey::Quit) => {
            handle.exit();
            return Ok(true);
        }
        Some(GlobalKey::Toggle) => handle.toggle(),
        Some(GlobalKey::Stop) => handle.stop(),
        Some(GlobalKey::StopAll) => handle.stop_all(),
        Some(GlobalKey::Next) => handle.next(),
        Some(GlobalKey::Previous) => handle.previous(),
        Some(GlobalKey::NextTab) => {
            let next_route = route_for_name(next_tab(router.current().name()));
            router.replace(next_route, state, handle)?;
        }
        None => {
            // Delegate to the current route's input handler
            let action = router.current_mut().handle_input(key, state, handle)?;
            router.execute_action(action, state, handle)?;
        }
    }
    Ok(false)
}
