//! The track catalog: tracks grouped by artist and album, plus named playlists.
//!
//! Tracks are owned here and addressed everywhere else by [`TrackId`].

use std::{
    collections::{BTreeMap, HashMap},
    fmt::Display,
    path::{Path, PathBuf},
};

use crate::{error::LibraryError, metadata::TrackMetadata, playlist::PlayList};

pub const UNKNOWN: &str = "unknown";

/// Stable handle of a catalog track
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TrackId(pub usize);

impl Display for TrackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct Track {
    pub id: TrackId,
    pub path: PathBuf,
    pub metadata: TrackMetadata,
}

impl Track {
    /// Tag title, or the file stem when the file carries none
    pub fn title(&self) -> String {
        self.metadata.title.clone().unwrap_or_else(|| {
            self.path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| self.path.to_string_lossy().to_string())
        })
    }

    pub fn artist(&self) -> &str {
        self.metadata.artist.as_deref().unwrap_or(UNKNOWN)
    }

    pub fn album(&self) -> &str {
        self.metadata.album.as_deref().unwrap_or(UNKNOWN)
    }
}

#[derive(Debug, Clone)]
pub struct Album {
    pub name: String,
    pub tracks: Vec<TrackId>,
}

#[derive(Debug, Clone)]
pub struct Artist {
    pub name: String,
    pub albums: Vec<Album>,
}

impl Artist {
    pub fn album(&self, name: &str) -> Option<&Album> {
        self.albums.iter().find(|album| album.name == name)
    }

    /// Every track of the artist, album by album
    pub fn tracks(&self) -> impl Iterator<Item = TrackId> + '_ {
        self.albums.iter().flat_map(|album| album.tracks.iter().copied())
    }
}

/// What a `startPlayback` request wants to hear
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaySource {
    Track(TrackId),
    Album { artist: String, album: String },
    Artist(String),
    Playlist(String),
    Everything,
}

#[derive(Debug, Default)]
pub struct Library {
    tracks: Vec<Track>,
    artists: Vec<Artist>,
    artist_index: HashMap<String, usize>,
    playlists: BTreeMap<String, PlayList>,
}

impl Library {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a track and file it under its artist and album
    pub fn add_track(&mut self, path: impl AsRef<Path>, metadata: TrackMetadata) -> TrackId {
        let id = TrackId(self.tracks.len());
        let track = Track {
            id,
            path: path.as_ref().to_path_buf(),
            metadata,
        };

        let artist_name = track.artist().to_string();
        let album_name = track.album().to_string();

        let artist_pos = match self.artist_index.get(&artist_name) {
            Some(&pos) => pos,
            None => {
                self.artists.push(Artist {
                    name: artist_name.clone(),
                    albums: Vec::new(),
                });
                self.artist_index.insert(artist_name, self.artists.len() - 1);
                self.artists.len() - 1
            }
        };

        let artist = &mut self.artists[artist_pos];
        match artist.albums.iter_mut().find(|album| album.name == album_name) {
            Some(album) => album.tracks.push(id),
            None => artist.albums.push(Album {
                name: album_name,
                tracks: vec![id],
            }),
        }

        self.tracks.push(track);
        id
    }

    pub fn add_playlist(&mut self, name: impl Into<String>, tracks: PlayList) {
        self.playlists.insert(name.into(), tracks);
    }

    /// `None` means the handle is stale or foreign
    pub fn track(&self, id: TrackId) -> Option<&Track> {
        self.tracks.get(id.0)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn artists(&self) -> &[Artist] {
        &self.artists
    }

    pub fn artist(&self, name: &str) -> Option<&Artist> {
        self.artist_index.get(name).map(|&pos| &self.artists[pos])
    }

    pub fn playlists(&self) -> impl Iterator<Item = (&str, &PlayList)> {
        self.playlists.iter().map(|(name, list)| (name.as_str(), list))
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Resolve a source into the ordered list of tracks to hand to the scheduler
    pub fn tracks_of(&self, source: &PlaySource) -> Result<PlayList, LibraryError> {
        match source {
            PlaySource::Track(id) => self
                .track(*id)
                .map(|track| PlayList::from(vec![track.id]))
                .ok_or(LibraryError::UnknownTrack(*id)),
            PlaySource::Album { artist, album } => {
                let entry = self
                    .artist(artist)
                    .ok_or_else(|| LibraryError::UnknownArtist(artist.clone()))?;
                entry
                    .album(album)
                    .map(|album| album.tracks.iter().copied().collect())
                    .ok_or_else(|| LibraryError::UnknownAlbum {
                        artist: artist.clone(),
                        album: album.clone(),
                    })
            }
            PlaySource::Artist(name) => self
                .artist(name)
                .map(|artist| artist.tracks().collect())
                .ok_or_else(|| LibraryError::UnknownArtist(name.clone())),
            PlaySource::Playlist(name) => self
                .playlists
                .get(name)
                .cloned()
                .ok_or_else(|| LibraryError::UnknownPlaylist(name.clone())),
            PlaySource::Everything => Ok(self
                .artists
                .iter()
                .flat_map(|artist| artist.tracks())
                .collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagged(title: &str, artist: Option<&str>, album: Option<&str>) -> TrackMetadata {
        TrackMetadata {
            title: Some(title.to_string()),
            artist: artist.map(str::to_string),
            album: album.map(str::to_string),
            ..Default::default()
        }
    }

    fn sample_library() -> Library {
        let mut library = Library::new();
        library.add_track("/m/a1.flac", tagged("a1", Some("Alpha"), Some("First")));
        library.add_track("/m/b1.flac", tagged("b1", Some("Beta"), Some("Only")));
        library.add_track("/m/a2.flac", tagged("a2", Some("Alpha"), Some("Second")));
        library.add_track("/m/a3.flac", tagged("a3", Some("Alpha"), Some("First")));
        library.add_track("/m/loose.mp3", TrackMetadata::default());
        library
    }

    #[test]
    fn groups_by_artist_then_album() {
        let library = sample_library();
        let names: Vec<_> = library.artists().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["Alpha", "Beta", UNKNOWN]);

        let alpha = library.artist("Alpha").unwrap();
        assert_eq!(alpha.albums.len(), 2);
        assert_eq!(alpha.album("First").unwrap().tracks, vec![TrackId(0), TrackId(3)]);
    }

    #[test]
    fn tracks_of_artist_walks_albums_in_order() {
        let library = sample_library();
        let list = library
            .tracks_of(&PlaySource::Artist("Alpha".to_string()))
            .unwrap();
        assert_eq!(list.to_vec(), vec![TrackId(0), TrackId(3), TrackId(2)]);
    }

    #[test]
    fn tracks_of_everything_covers_the_catalog() {
        let library = sample_library();
        let list = library.tracks_of(&PlaySource::Everything).unwrap();
        assert_eq!(list.len(), library.len());
    }

    #[test]
    fn untagged_track_falls_back_to_file_stem() {
        let library = sample_library();
        let track = library.track(TrackId(4)).unwrap();
        assert_eq!(track.title(), "loose");
        assert_eq!(track.artist(), UNKNOWN);
        assert_eq!(track.album(), UNKNOWN);
    }

    #[test]
    fn unknown_sources_are_errors() {
        let library = sample_library();
        assert!(matches!(
            library.tracks_of(&PlaySource::Track(TrackId(99))),
            Err(LibraryError::UnknownTrack(TrackId(99)))
        ));
        assert!(matches!(
            library.tracks_of(&PlaySource::Album {
                artist: "Alpha".to_string(),
                album: "Missing".to_string()
            }),
            Err(LibraryError::UnknownAlbum { .. })
        ));
        assert!(matches!(
            library.tracks_of(&PlaySource::Playlist("none".to_string())),
            Err(LibraryError::UnknownPlaylist(_))
        ));
    }

    #[test]
    fn playlists_resolve_in_their_own_order() {
        let mut library = sample_library();
        library.add_playlist("mix", PlayList::from(vec![TrackId(2), TrackId(1)]));
        let list = library
            .tracks_of(&PlaySource::Playlist("mix".to_string()))
            .unwrap();
        assert_eq!(list.to_vec(), vec![TrackId(2), TrackId(1)]);
        assert_eq!(library.playlists().count(), 1);
    }
}
