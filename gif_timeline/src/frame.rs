//! A single animation frame

use image::DynamicImage;
use std::time::Duration;

use crate::config::DEFAULT_FRAME_DURATION;

/// One still image plus its display duration.
///
/// A frame without a bitmap is a placeholder. It only exists as the sole
/// frame of an otherwise empty [`Timeline`](crate::Timeline).
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub bitmap: Option<DynamicImage>,
    duration: Duration,
}

impl Frame {
    /// Create a frame. A zero duration is replaced by
    /// [`DEFAULT_FRAME_DURATION`]; sessions substitute their configured
    /// default before reaching here.
    pub fn new(bitmap: DynamicImage, duration: Duration) -> Self {
        Self {
            bitmap: Some(bitmap),
            duration: non_zero(duration),
        }
    }

    /// Create a frame shown for the default duration
    pub fn still(bitmap: DynamicImage) -> Self {
        Self::new(bitmap, DEFAULT_FRAME_DURATION)
    }

    pub fn placeholder() -> Self {
        Self {
            bitmap: None,
            duration: DEFAULT_FRAME_DURATION,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.bitmap.is_none()
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn set_duration(&mut self, duration: Duration) {
        self.duration = non_zero(duration);
    }
}

fn non_zero(duration: Duration) -> Duration {
    if duration.is_zero() {
        DEFAULT_FRAME_DURATION
    } else {
        duration
    }
}
