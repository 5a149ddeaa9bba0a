use anyhow::Result;
use lyre_core::SchedulerHandle;
use ratatui::{Frame, crossterm::event::KeyCode, layout::Rect};

use crate::{
    routes::{library::LibraryRoute, log::LogRoute, playback::PlaybackRoute, queue::QueueRoute},
    state::AppState,
};

/// Trait that all routes must implement
pub trait RouteHandler: std::fmt::Debug {
    /// Render this route's UI
    fn render(&self, frame: &mut Frame, area: Rect, state: &AppState);

    /// Handle keyboard input for this route
    fn handle_input(
        &mut self,
        key: KeyCode,
        state: &mut AppState,
        handle: &SchedulerHandle,
    ) -> Result<RouteAction>;

    /// Display name, also used as the tab name
    fn name(&self) -> &str;

    fn on_enter(&mut self, _state: &mut AppState, _handle: &SchedulerHandle) -> Result<()> {
        Ok(())
    }

    fn on_exit(&mut self, _state: &mut AppState, _handle: &SchedulerHandle) -> Result<()> {
        Ok(())
    }

    /// Key hints shown in the controls bar
    fn help_items(&self, _state: &AppState) -> Vec<(&str, &str)> {
        vec![("Tab", "Switch Tab"), ("Q", "Quit")]
    }
}

/// Actions that can be returned from route handlers
#[derive(Debug)]
pub enum RouteAction {
    /// Do nothing, stay on current route
    None,
    /// Replace current route with a new one
    Replace(Box<dyn RouteHandler>),
}

/// Holds the active route
pub struct Router {
    current: Box<dyn RouteHandler>,
}

impl Router {
    pub fn new(initial_route: Box<dyn RouteHandler>) -> Self {
        Self {
            current: initial_route,
        }
    }

    pub fn current(&self) -> &dyn RouteHandler {
        self.current.as_ref()
    }

    pub fn current_mut(&mut self) -> &mut Box<dyn RouteHandler> {
        &mut self.current
    }

    pub fn execute_action(
        &mut self,
        action: RouteAction,
        state: &mut AppState,
        handle: &SchedulerHandle,
    ) -> Result<()> {
        match action {
            RouteAction::None => Ok(()),
            RouteAction::Replace(route) => self.replace(route, state, handle),
        }
    }

    /// Replace current route (used for tab switching)
    pub fn replace(
        &mut self,
        mut new_route: Box<dyn RouteHandler>,
        state: &mut AppState,
        handle: &SchedulerHandle,
    ) -> Result<()> {
        self.current.on_exit(state, handle)?;
        new_route.on_enter(state, handle)?;
        self.current = new_route;
        Ok(())
    }
}

/// Get a route handler for a given tab name
pub fn route_for_name(name: &str) -> Box<dyn RouteHandler> {
    match name {
        "Queue" => Box::new(QueueRoute),
        "Library" => Box::new(LibraryRoute),
        "Log" => Box::new(LogRoute::new()),
        _ => Box::new(PlaybackRoute),
    }
}

/// All main tab names in order
pub fn tab_names() -> &'static [&'static str] {
    &["Playback", "Queue", "Library", "Log"]
}

/// Name of the tab after `current`, wrapping around
pub fn next_tab(current: &str) -> &'static str {
    let tabs = tab_names();
    let current_idx = tabs.iter().position(|n| *n == current).unwrap_or(0);
    tabs[(current_idx + 1) % tabs.len()]
}
