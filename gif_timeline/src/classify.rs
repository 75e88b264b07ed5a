//! Animated GIF detection
//!
//! A cheap pre-check run before decoding. Only the container structure is
//! read; no pixel data is decompressed.
//!
//! This is a heuristic with a known false-negative surface: a well-formed
//! single-frame GIF, or an animation without a NETSCAPE2.0 loop block or
//! without a Graphic Control Extension on its first frame, is reported as
//! not animated even though browsers would play it.

use crate::metadata::{self, GifMetadata};

/// Check if data is an animated GIF
pub fn is_animated(data: &[u8]) -> bool {
    metadata::scan(data)
        .map(|meta| is_animated_metadata(&meta))
        .unwrap_or(false)
}

/// Check already scanned metadata: all animation properties readable and
/// more than one frame
pub fn is_animated_metadata(meta: &GifMetadata) -> bool {
    meta.has_animation_metadata() && meta.frame_count() > 1
}

/// Get GIF frame count, 0 for non-GIF data
pub fn frame_count(data: &[u8]) -> usize {
    metadata::scan(data).map(|meta| meta.frame_count()).unwrap_or(0)
}
