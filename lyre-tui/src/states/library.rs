use std::sync::Arc;

use lyre_core::{Library, PlaySource, PlaybackOption, PlaybackOptions, TrackId};
use ratatui::widgets::ListState;
use strum::IntoEnumIterator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LibraryColumn {
    #[default]
    Artists,
    Albums,
    Tracks,
}

/// Dialog asking where a selection should go in the queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementDialog {
    pub source: PlaySource,
    pub title: String,
    pub selected: usize,
    pub shuffle: bool,
}

impl PlacementDialog {
    pub fn new(source: PlaySource, title: impl Into<String>) -> Self {
        Self {
            source,
            title: title.into(),
            selected: 0,
            shuffle: false,
        }
    }

    /// Placement choices in menu order
    pub fn choices() -> Vec<PlaybackOption> {
        PlaybackOption::iter().filter(|o| o.is_placement()).collect()
    }

    pub fn next(&mut self) {
        self.selected = (self.selected + 1) % Self::choices().len();
    }

    pub fn prev(&mut self) {
        let len = Self::choices().len();
        self.selected = (self.selected + len - 1) % len;
    }

    pub fn toggle_shuffle(&mut self) {
        self.shuffle = !self.shuffle;
    }

    pub fn choice(&self) -> Option<PlaybackOption> {
        Self::choices().get(self.selected).copied()
    }

    pub fn options(&self) -> PlaybackOptions {
        let mut options = PlaybackOptions::new();
        if let Some(placement) = self.choice() {
            options = options.with(placement);
        }
        if self.shuffle {
            options = options.with(PlaybackOption::Shuffle);
        }
        options
    }
}

/// Artist / album / track browser over the scanned library
#[derive(Debug, Clone)]
pub struct LibraryState {
    library: Arc<Library>,
    pub focus: LibraryColumn,
    pub artists: ListState,
    pub albums: ListState,
    pub tracks: ListState,
    pub dialog: Option<PlacementDialog>,
}

fn step(list: &mut ListState, len: usize, forward: bool) {
    if len == 0 {
        list.select(None);
        return;
    }
    let i = match (list.selected(), forward) {
        (Some(i), true) if i + 1 < len => i + 1,
        (Some(_), true) | (None, _) => 0,
        (Some(0), false) => len - 1,
        (Some(i), false) => i - 1,
    };
    list.select(Some(i));
}

impl LibraryState {
    pub fn new(library: Arc<Library>) -> Self {
        let mut state = Self {
            library,
            focus: LibraryColumn::Artists,
            artists: ListState::default(),
            albums: ListState::default(),
            tracks: ListState::default(),
            dialog: None,
        };
        if !state.library.artists().is_empty() {
            state.artists.select(Some(0));
        }
        state.reset_albums();
        state
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn artist_names(&self) -> Vec<&str> {
        self.library.artists().iter().map(|a| a.name.as_str()).collect()
    }

    pub fn album_names(&self) -> Vec<&str> {
        self.selected_artist()
            .map(|artist| artist.albums.iter().map(|a| a.name.as_str()).collect())
            .unwrap_or_default()
    }

    pub fn track_ids(&self) -> Vec<TrackId> {
        self.selected_album()
            .map(|album| album.tracks.clone())
            .unwrap_or_default()
    }

    fn selected_artist(&self) -> Option<&lyre_core::library::Artist> {
        self.library.artists().get(self.artists.selected()?)
    }

    fn selected_album(&self) -> Option<&lyre_core::library::Album> {
        self.selected_artist()?.albums.get(self.albums.selected()?)
    }

    fn reset_albums(&mut self) {
        let has_albums = !self.album_names().is_empty();
        self.albums.select(has_albums.then_some(0));
        self.reset_tracks();
    }

    fn reset_tracks(&mut self) {
        let has_tracks = !self.track_ids().is_empty();
        self.tracks.select(has_tracks.then_some(0));
    }

    pub fn next(&mut self) {
        self.move_selection(true);
    }

    pub fn prev(&mut self) {
        self.move_selection(false);
    }

    fn move_selection(&mut self, forward: bool) {
        match self.focus {
            LibraryColumn::Artists => {
                let len = self.library.artists().len();
                step(&mut self.artists, len, forward);
                self.reset_albums();
            }
            LibraryColumn::Albums => {
                let len = self.album_names().len();
                step(&mut self.albums, len, forward);
                self.reset_tracks();
            }
            LibraryColumn::Tracks => {
                let len = self.track_ids().len();
                step(&mut self.tracks, len, forward);
            }
        }
    }

    pub fn focus_right(&mut self) {
        self.focus = match self.focus {
            LibraryColumn::Artists => LibraryColumn::Albums,
            _ => LibraryColumn::Tracks,
        };
    }

    pub fn focus_left(&mut self) {
        self.focus = match self.focus {
            LibraryColumn::Tracks => LibraryColumn::Albums,
            _ => LibraryColumn::Artists,
        };
    }

    /// What the focused column points at, with a display title
    pub fn selected_source(&self) -> Option<(PlaySource, String)> {
        let artist = self.selected_artist()?;
        match self.focus {
            LibraryColumn::Artists => Some((PlaySource::Artist(artist.name.clone()), artist.name.clone())),
            LibraryColumn::Albums => {
                let album = self.selected_album()?;
                Some((
                    PlaySource::Album {
                        artist: artist.name.clone(),
                        album: album.name.clone(),
                    },
                    album.name.clone(),
                ))
            }
            LibraryColumn::Tracks => {
                let id = *self.selected_album()?.tracks.get(self.tracks.selected()?)?;
                let title = self.library.track(id)?.title();
                Some((PlaySource::Track(id), title))
            }
        }
    }

    pub fn open_dialog(&mut self) {
        if let Some((source, title)) = self.selected_source() {
            self.dialog = Some(PlacementDialog::new(source, title));
        }
    }

    pub fn open_everything_dialog(&mut self) {
        if !self.library.is_empty() {
            self.dialog = Some(PlacementDialog::new(PlaySource::Everything, "Everything"));
        }
    }

    pub fn close_dialog(&mut self) {
        self.dialog = None;
    }

    pub fn is_dialog_open(&self) -> bool {
        self.dialog.is_some()
    }
}
