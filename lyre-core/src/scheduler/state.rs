//! What plays next: the current list, queued lists, history and suspended contexts.
//!
//! Pure state, mutated only by the scheduler thread. Every transition is
//! synchronous so it can be tested without audio or threads.

use std::{collections::VecDeque, mem};

use crate::{
    commands::{Placement, PlaybackCommand, PlaybackOptions},
    events::QueueSnapshot,
    library::TrackId,
    playlist::PlayList,
};

/// Playback context set aside by a suspending `Play`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuspendedContext {
    pub queued: VecDeque<PlayList>,
    pub history: Vec<TrackId>,
}

/// What the scheduler does with the interrupted track after [`SchedulerState::apply`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Drop the interrupted track, if any, and pick the next one
    Continue,
    /// Keep streaming the interrupted track from where it was
    Resume,
    Exit,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulerState {
    current: PlayList,
    queued: VecDeque<PlayList>,
    /// Most recent last
    history: Vec<TrackId>,
    /// Innermost last
    suspended: Vec<SuspendedContext>,
}

impl SchedulerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> &PlayList {
        &self.current
    }

    pub fn queued(&self) -> &VecDeque<PlayList> {
        &self.queued
    }

    /// Played tracks, oldest first
    pub fn history(&self) -> &[TrackId] {
        &self.history
    }

    pub fn suspended_depth(&self) -> usize {
        self.suspended.len()
    }

    /// Tracks left in the current list and the queued lists
    pub fn pending(&self) -> usize {
        self.current.len() + self.queued.iter().map(PlayList::len).sum::<usize>()
    }

    /// Nothing left to play at any nesting level
    pub fn is_idle(&self) -> bool {
        self.current.is_empty()
            && self.queued.iter().all(PlayList::is_empty)
            && self.suspended.is_empty()
    }

    /// Refill the current list: queued lists first, then the innermost
    /// suspended context. Returns false when nothing is left.
    pub fn pull_next_list(&mut self) -> bool {
        loop {
            if let Some(list) = self.queued.pop_front() {
                if list.is_empty() {
                    continue;
                }
                self.current = list;
                return true;
            }

            match self.suspended.pop() {
                Some(context) => {
                    log::debug!(
                        "Resuming suspended context ({} left)",
                        self.suspended.len()
                    );
                    self.queued = context.queued;
                    self.history = context.history;
                }
                None => return false,
            }
        }
    }

    /// Pop the track to play next, pulling a new list when the current one is empty
    pub fn next_track(&mut self) -> Option<TrackId> {
        if self.current.is_empty() && !self.pull_next_list() {
            return None;
        }
        self.current.pop_front()
    }

    pub fn track_finished(&mut self, track: TrackId) {
        self.history.push(track);
    }

    /// Apply a command returned by the track player, or received while idle
    /// (`interrupted` is `None` then).
    pub fn apply(&mut self, interrupted: Option<TrackId>, command: PlaybackCommand) -> Flow {
        match command {
            PlaybackCommand::Pause | PlaybackCommand::Resume | PlaybackCommand::Toggle => {
                match interrupted {
                    Some(track) => {
                        log::warn!("{} reached the scheduler while {} was playing", command.name(), track);
                        Flow::Resume
                    }
                    None => {
                        log::debug!("Ignoring {} while idle", command.name());
                        Flow::Continue
                    }
                }
            }
            PlaybackCommand::Stop => {
                self.stop();
                Flow::Continue
            }
            PlaybackCommand::StopAll => {
                self.suspended.clear();
                self.stop();
                Flow::Continue
            }
            PlaybackCommand::Next => {
                if let Some(track) = interrupted {
                    self.history.push(track);
                }
                Flow::Continue
            }
            PlaybackCommand::Previous => {
                if let Some(track) = interrupted {
                    self.current.push_front(track);
                }
                if let Some(previous) = self.history.pop() {
                    self.current.push_front(previous);
                }
                Flow::Continue
            }
            PlaybackCommand::Play(list, options) => self.place(interrupted, list, options),
            PlaybackCommand::Exit => Flow::Exit,
        }
    }

    /// Drop this nesting level and restore the one below it
    fn stop(&mut self) {
        self.current.clear();
        self.queued.clear();
        self.history.clear();
        if let Some(context) = self.suspended.pop() {
            self.queued = context.queued;
            self.history = context.history;
        }
    }

    fn place(
        &mut self,
        interrupted: Option<TrackId>,
        mut list: PlayList,
        options: PlaybackOptions,
    ) -> Flow {
        if options.placement_count() > 1 {
            log::warn!(
                "Several placements requested, using {:?}",
                options.placement()
            );
        }
        if options.shuffle() {
            list.shuffle();
        }

        let placement = options.placement();
        log::debug!("Placing {} tracks: {:?}", list.len(), placement);

        match placement {
            Placement::StopCurrent => {
                self.suspended.clear();
                self.queued.clear();
                self.history.clear();
                self.current = list;
            }
            Placement::SuspendCurrent => {
                if let Some(track) = interrupted {
                    self.current.push_front(track);
                }
                if !self.current.is_empty() {
                    let remainder = mem::take(&mut self.current);
                    self.queued.push_front(remainder);
                }
                self.suspended.push(SuspendedContext {
                    queued: mem::take(&mut self.queued),
                    history: mem::take(&mut self.history),
                });
                self.current = list;
            }
            Placement::AfterCurrentTrack => self.current.prepend(list),
            Placement::AfterCurrentList => {
                if !list.is_empty() {
                    self.queued.push_front(list);
                }
            }
            Placement::AfterEverything => {
                if !list.is_empty() {
                    self.queued.push_back(list);
                }
            }
        }

        if placement.is_disruptive() || interrupted.is_none() {
            Flow::Continue
        } else {
            Flow::Resume
        }
    }

    pub fn snapshot(&self) -> QueueSnapshot {
        QueueSnapshot {
            current: self.current.to_vec(),
            queued: self.queued.iter().map(PlayList::to_vec).collect(),
            history: self.history.iter().rev().copied().collect(),
            suspended_depth: self.suspended.len(),
        }
    }
}
