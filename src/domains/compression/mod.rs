// Declare submodules for the compression domain
pub mod types;
pub mod mapper;
pub mod settings;
pub mod service;
pub mod session;
pub mod compressors;

// Re-export key types
pub use types::{CompressionResult, EncodingParameters};
pub use mapper::{
    compression_ratio, encoding_parameters, format_file_size, level_to_quality,
    CompressionBucket, CompressionLevel, CompressionLevelInfo,
};
pub use settings::CompressionSettings;
pub use service::{CompressionService, CompressionServiceImpl};
pub use session::{CompressionSession, CompressionTicket, SessionSnapshot};
pub use compressors::{Compressor, LocalMediaEncoder, MediaEncoder};
