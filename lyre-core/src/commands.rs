use std::{collections::BTreeSet, ops::BitOr};

use strum::{EnumIter, IntoStaticStr};

use crate::playlist::PlayList;

/// Commands sent from any thread to the playback scheduler
#[derive(Debug, Clone, PartialEq, Eq, IntoStaticStr)]
pub enum PlaybackCommand {
    /// Pause output of the current track
    Pause,
    /// Resume a paused track
    Resume,
    /// Flip between paused and playing
    Toggle,
    /// Drop the current nesting level and resume the one below it
    Stop,
    /// Drop every nesting level and go idle
    StopAll,
    /// Go back to the most recently finished track
    Previous,
    /// Skip to the next track
    Next,
    /// Shut the scheduler thread down
    Exit,
    /// Insert a list of tracks according to the placement in the options
    Play(PlayList, PlaybackOptions),
}

impl PlaybackCommand {
    pub fn play(list: PlayList, options: impl Into<PlaybackOptions>) -> Self {
        PlaybackCommand::Play(list, options.into())
    }

    /// Pause-family commands are absorbed by the track player
    pub fn is_pause_control(&self) -> bool {
        matches!(
            self,
            PlaybackCommand::Pause | PlaybackCommand::Resume | PlaybackCommand::Toggle
        )
    }

    pub fn name(&self) -> &'static str {
        self.into()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, strum::Display)]
pub enum PlaybackOption {
    #[strum(serialize = "Shuffle")]
    Shuffle,
    #[strum(serialize = "Play now")]
    StopCurrentPlayback,
    #[strum(serialize = "Play now, resume later")]
    SuspendCurrentPlayback,
    #[strum(serialize = "Play after this list")]
    PlayAfterCurrentList,
    #[strum(serialize = "Play next")]
    PlayAfterCurrentTrack,
    #[strum(serialize = "Add to queue")]
    PlayAfterEverything,
}

impl PlaybackOption {
    pub fn is_placement(self) -> bool {
        self != PlaybackOption::Shuffle
    }
}

/// Where a `Play` list lands relative to what is playing and queued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    StopCurrent,
    SuspendCurrent,
    AfterCurrentTrack,
    AfterCurrentList,
    AfterEverything,
}

impl Placement {
    /// Disruptive placements end the track that is playing
    pub fn is_disruptive(self) -> bool {
        matches!(self, Placement::StopCurrent | Placement::SuspendCurrent)
    }
}

/// A set of [`PlaybackOption`]s. Flags combine with `|`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackOptions {
    options: BTreeSet<PlaybackOption>,
}

impl PlaybackOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, option: PlaybackOption) -> Self {
        self.options.insert(option);
        self
    }

    pub fn contains(&self, option: PlaybackOption) -> bool {
        self.options.contains(&option)
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn shuffle(&self) -> bool {
        self.contains(PlaybackOption::Shuffle)
    }

    pub fn iter(&self) -> impl Iterator<Item = PlaybackOption> + '_ {
        self.options.iter().copied()
    }

    /// Resolve the placement; when several are set the most disruptive wins,
    /// when none is set the list goes after everything.
    pub fn placement(&self) -> Placement {
        if self.contains(PlaybackOption::StopCurrentPlayback) {
            Placement::StopCurrent
        } else if self.contains(PlaybackOption::SuspendCurrentPlayback) {
            Placement::SuspendCurrent
        } else if self.contains(PlaybackOption::PlayAfterCurrentTrack) {
            Placement::AfterCurrentTrack
        } else if self.contains(PlaybackOption::PlayAfterCurrentList) {
            Placement::AfterCurrentList
        } else {
            Placement::AfterEverything
        }
    }

    pub fn placement_count(&self) -> usize {
        self.options.iter().filter(|o| o.is_placement()).count()
    }
}

impl From<PlaybackOption> for PlaybackOptions {
    fn from(option: PlaybackOption) -> Self {
        PlaybackOptions::new().with(option)
    }
}

impl FromIterator<PlaybackOption> for PlaybackOptions {
    fn from_iter<I: IntoIterator<Item = PlaybackOption>>(iter: I) -> Self {
        Self {
            options: iter.into_iter().collect(),
        }
    }
}

impl BitOr for PlaybackOptions {
    type Output = PlaybackOptions;

    fn bitor(mut self, rhs: PlaybackOptions) -> PlaybackOptions {
        self.options.extend(rhs.options);
        self
    }
}

impl BitOr<PlaybackOption> for PlaybackOptions {
    type Output = PlaybackOptions;

    fn bitor(self, rhs: PlaybackOption) -> PlaybackOptions {
        self.with(rhs)
    }
}

impl BitOr for PlaybackOption {
    type Output = PlaybackOptions;

    fn bitor(self, rhs: PlaybackOption) -> PlaybackOptions {
        PlaybackOptions::from(self).with(rhs)
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn default_placement_is_after_everything() {
        assert_eq!(PlaybackOptions::new().placement(), Placement::AfterEverything);
        assert_eq!(
            PlaybackOptions::from(PlaybackOption::Shuffle).placement(),
            Placement::AfterEverything
        );
    }

    #[test]
    fn shuffle_is_orthogonal_to_placement() {
        let options = PlaybackOption::Shuffle | PlaybackOption::PlayAfterCurrentTrack;
        assert!(options.shuffle());
        assert_eq!(options.placement(), Placement::AfterCurrentTrack);
        assert_eq!(options.placement_count(), 1);
    }

    #[test]
    fn most_disruptive_placement_wins() {
        let options = PlaybackOption::PlayAfterEverything
            | PlaybackOption::SuspendCurrentPlayback
            | PlaybackOption::PlayAfterCurrentList;
        assert_eq!(options.placement(), Placement::SuspendCurrent);

        let options = options | PlaybackOption::StopCurrentPlayback;
        assert_eq!(options.placement(), Placement::StopCurrent);
    }

    #[test]
    fn options_are_a_set() {
        let options = PlaybackOption::Shuffle | PlaybackOption::Shuffle;
        assert_eq!(options.iter().count(), 1);
        assert_eq!(PlaybackOption::iter().filter(|o| o.is_placement()).count(), 5);
    }

    #[test]
    fn command_names_for_logging() {
        assert_eq!(PlaybackCommand::StopAll.name(), "StopAll");
        let play = PlaybackCommand::play(PlayList::new(), PlaybackOption::Shuffle);
        assert_eq!(play.name(), "Play");
        assert!(PlaybackCommand::Toggle.is_pause_control());
        assert!(!play.is_pause_control());
    }
}
