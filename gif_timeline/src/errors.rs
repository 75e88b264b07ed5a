//! Error types for the GIF timeline codec

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    /// The input does not expose frame count, loop count and frame duration.
    #[error("Input is not an animated GIF: missing animation metadata")]
    MissingAnimationMetadata,

    #[error("Image too large: {width}x{height} exceeds {limit} pixel limit")]
    TooLarge { width: u32, height: u32, limit: u64 },

    #[error("Corrupt GIF data: {0}")]
    Corrupt(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("Failed to allocate GIF container: {0}")]
    AllocationFailed(String),

    #[error("Failed to finalize GIF container: {0}")]
    FinalizationFailed(String),

    #[error("Failed to write GIF file: {0}")]
    WriteFailed(#[source] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Error, Debug)]
pub enum WatermarkError {
    #[error("Invalid font data")]
    InvalidFont,

    #[error("Label {label_width}x{label_height} does not fit into {width}x{height} image")]
    LabelTooLarge {
        label_width: u32,
        label_height: u32,
        width: u32,
        height: u32,
    },
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}
