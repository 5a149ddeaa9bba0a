pub mod audio;
pub mod library;
pub mod queue;

pub use audio::AudioState;
pub use library::{LibraryColumn, LibraryState, PlacementDialog};
pub use queue::QueueState;
