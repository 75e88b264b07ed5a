//! GIF Timeline - Animated GIF frame editing
//!
//! A Rust-based animated GIF editor core with:
//! - Container metadata scanning and animation detection
//! - Decoding into an editable, always non-empty frame timeline
//! - Timeline editing (insert, remove, replace, reorder)
//! - Encoding with per-frame delays and a global loop count
//! - Optional text watermarking over frame bitmaps
//! - Python bindings behind the `python` feature

mod config;
mod errors;
mod frame;
mod timeline;
mod decode;
mod encode;
mod session;

pub mod metadata;
pub mod classify;
pub mod watermark;

#[cfg(feature = "python")]
mod python;

pub use config::{CodecConfig, DEFAULT_FRAME_DURATION, DEFAULT_LOOP_COUNT};
pub use errors::{ConfigError, DecodeError, EncodeError, SessionError, WatermarkError};
pub use frame::Frame;
pub use timeline::Timeline;
pub use decode::{AnimatedGif, Decoder};
pub use encode::{delay_centiseconds, Encoder};
pub use session::Session;
pub use classify::is_animated;
pub use watermark::{stamp_all, Stamp, TextWatermark};
