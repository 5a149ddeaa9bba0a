use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use lofty::{
    file::{AudioFile, TaggedFileExt},
    probe::Probe,
    tag::Accessor,
};
use walkdir::WalkDir;

use crate::{
    library::{Library, TrackId},
    metadata::{ChannelLayout, TrackMetadata},
    playlist::PlayList,
};

const SUPPORTED_EXTENSIONS: &[&str] = &["mp3", "wav", "flac", "ogg", "m4a", "aac", "opus"];
const PLAYLIST_EXTENSIONS: &[&str] = &["m3u", "m3u8"];

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

pub fn is_supported(path: &Path) -> bool {
    has_extension(path, SUPPORTED_EXTENSIONS)
}

pub fn is_playlist(path: &Path) -> bool {
    has_extension(path, PLAYLIST_EXTENSIONS)
}

/// Expand files and directories into the sorted list of playable files.
///
/// Explicit files are kept even with an unknown extension, playlists
/// excepted; directories are walked recursively and filtered.
pub fn discover_audio_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    discover(paths, is_supported, |p| !is_playlist(p))
}

/// `.m3u` playlists among the given files and directories
pub fn discover_playlists(paths: &[PathBuf]) -> Vec<PathBuf> {
    discover(paths, is_playlist, is_playlist)
}

fn discover(
    paths: &[PathBuf],
    in_dir: impl Fn(&Path) -> bool,
    explicit: impl Fn(&Path) -> bool,
) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(path)
                .follow_links(true)
                .into_iter()
                .filter_map(|entry| match entry {
                    Ok(entry) => Some(entry),
                    Err(e) => {
                        log::warn!("Skipping unreadable entry under {:?}: {}", path, e);
                        None
                    }
                })
                .filter(|entry| entry.file_type().is_file())
                .map(|entry| entry.into_path())
                .filter(|p| in_dir(p))
                .collect();
            found.sort_by_key(|p| p.to_string_lossy().to_lowercase());
            files.extend(found);
        } else if path.is_file() {
            if explicit(path) {
                files.push(path.clone());
            }
        } else {
            log::warn!("Path does not exist: {:?}", path);
        }
    }

    files
}

/// Entries of an m3u playlist, relative ones resolved against `base`
pub fn parse_m3u(contents: &str, base: &Path) -> Vec<PathBuf> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| {
            let entry = Path::new(line);
            if entry.is_absolute() {
                entry.to_path_buf()
            } else {
                base.join(entry)
            }
        })
        .collect()
}

fn path_key(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

fn add_file(library: &mut Library, file: &Path) -> TrackId {
    let metadata = read_track_metadata(file).unwrap_or_else(|e| {
        log::warn!("Failed to read metadata of {:?}: {:#}", file, e);
        fallback_metadata(file)
    });
    library.add_track(file, metadata)
}

/// Resolve a playlist file into library tracks.
///
/// Entries outside the scanned paths are added to the library; missing
/// files are dropped.
fn load_playlist(
    file: &Path,
    library: &mut Library,
    known: &mut HashMap<PathBuf, TrackId>,
) -> anyhow::Result<PlayList> {
    let contents = fs::read_to_string(file).context("Failed to read the playlist")?;
    let base = file.parent().unwrap_or_else(|| Path::new(""));

    let mut list = PlayList::new();
    for entry in parse_m3u(&contents, base) {
        let key = path_key(&entry);
        let id = match known.get(&key) {
            Some(&id) => id,
            None if entry.is_file() => {
                let id = add_file(library, &entry);
                known.insert(key, id);
                id
            }
            None => {
                log::warn!("Playlist {:?} names a missing file {:?}", file, entry);
                continue;
            }
        };
        list.push_back(id);
    }
    Ok(list)
}

/// Build a catalog from files and directories
pub fn scan_paths(paths: &[PathBuf]) -> Library {
    let mut library = Library::new();
    let mut known = HashMap::new();

    for file in discover_audio_files(paths) {
        let id = add_file(&mut library, &file);
        known.insert(path_key(&file), id);
    }

    for file in discover_playlists(paths) {
        let name = file
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| file.to_string_lossy().to_string());
        match load_playlist(&file, &mut library, &mut known) {
            Ok(list) if list.is_empty() => log::warn!("Playlist {:?} has no playable entries", file),
            Ok(list) => {
                log::debug!("Playlist {:?}: {} tracks", name, list.len());
                library.add_playlist(name, list);
            }
            Err(e) => log::warn!("Skipping playlist {:?}: {:#}", file, e),
        }
    }

    log::info!(
        "Library scanned: {} tracks by {} artists, {} playlists",
        library.len(),
        library.artists().len(),
        library.playlists().count()
    );
    library
}

/// Read tags and stream properties with lofty
pub fn read_track_metadata(path: &Path) -> anyhow::Result<TrackMetadata> {
    let tagged_file = Probe::open(path)
        .context("Failed to open the file")?
        .read()
        .context("Failed to read the tags")?;

    let properties = tagged_file.properties();
    let num_channels = properties.channels().map(u16::from).unwrap_or(0);

    let mut metadata = TrackMetadata {
        sample_rate: properties.sample_rate().unwrap_or(0),
        num_channels,
        channel_layout: ChannelLayout::from_channels(num_channels),
        duration: Some(properties.duration()),
        ..fallback_metadata(path)
    };

    if let Some(tag) = tagged_file.primary_tag().or_else(|| tagged_file.first_tag()) {
        metadata.title = tag.title().map(|s| s.to_string());
        metadata.artist = tag.artist().map(|s| s.to_string());
        metadata.album = tag.album().map(|s| s.to_string());
        metadata.genre = tag.genre().map(|s| s.to_string());
        metadata.track_number = tag.track();
    }

    log::debug!("Metadata loaded: {:?} by {:?}", metadata.title, metadata.artist);
    Ok(metadata)
}

fn fallback_metadata(path: &Path) -> TrackMetadata {
    let format = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_lowercase();

    TrackMetadata {
        format,
        ..Default::default()
    }
}
