pub mod library;
pub mod log;
pub mod playback;
pub mod queue;
