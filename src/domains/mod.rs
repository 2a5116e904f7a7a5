pub mod compression;
pub mod core;
pub mod media;

pub use compression::{CompressionLevel, CompressionResult, CompressionService};
pub use media::{Asset, MediaKind};
