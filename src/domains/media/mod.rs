// Declare submodules for the media domain
pub mod types;
pub mod picker;
pub mod saver;

pub use types::{Asset, MediaKind, PickedMedia};
pub use picker::{MediaPicker, FileSystemPicker, PickOutcome};
pub use saver::{MediaSaver, LocalMediaSaver, FallbackSaver, SaveDestination};
