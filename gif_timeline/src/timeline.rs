//! Ordered, always non-empty frame sequence

use std::time::Duration;

use crate::frame::Frame;

/// The frames of an animation in display order.
///
/// A timeline is never empty. An empty project is represented by a single
/// placeholder frame, which is discarded as soon as real content arrives.
/// Every editing operation is total: bad indices are ignored or clamped.
#[derive(Clone, Debug, PartialEq)]
pub struct Timeline {
    frames: Vec<Frame>,
}

impl Timeline {
    /// Create a timeline holding only the placeholder
    pub fn new() -> Self {
        Self {
            frames: vec![Frame::placeholder()],
        }
    }

    /// Build a timeline from decoded frames. An empty list yields the placeholder.
    pub fn from_frames(frames: Vec<Frame>) -> Self {
        if frames.is_empty() {
            Self::new()
        } else {
            Self { frames }
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always false; present for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// True when the timeline is the canonical empty-project sentinel
    pub fn is_placeholder(&self) -> bool {
        self.frames.len() == 1 && self.frames[0].is_placeholder()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn get(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Frame> {
        self.frames.iter()
    }

    /// Number of frames carrying a bitmap, i.e. what an encode would write
    pub fn bitmap_count(&self) -> usize {
        self.frames.iter().filter(|f| f.bitmap.is_some()).count()
    }

    /// Sum of all frame durations, placeholders excluded
    pub fn total_duration(&self) -> Duration {
        self.frames
            .iter()
            .filter(|f| f.bitmap.is_some())
            .map(Frame::duration)
            .sum()
    }

    /// Owned copy for handing to an encoder running elsewhere
    pub fn snapshot(&self) -> Vec<Frame> {
        self.frames.clone()
    }

    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }

    /// Overwrite the frame at `index`, returning the previous one
    pub fn replace(&mut self, index: usize, frame: Frame) -> Option<Frame> {
        match self.frames.get_mut(index) {
            Some(slot) => Some(std::mem::replace(slot, frame)),
            None => {
                log::warn!("replace: index {} out of range (len {})", index, self.frames.len());
                None
            }
        }
    }

    /// Remove the frame at `index`.
    ///
    /// The last remaining frame is never removed; it is reset to the
    /// placeholder instead and the old frame is returned.
    pub fn remove(&mut self, index: usize) -> Option<Frame> {
        if index >= self.frames.len() {
            log::warn!("remove: index {} out of range (len {})", index, self.frames.len());
            return None;
        }

        if self.frames.len() == 1 {
            return Some(std::mem::replace(&mut self.frames[0], Frame::placeholder()));
        }

        Some(self.frames.remove(index))
    }

    /// Insert frames coming from outside the timeline (another file, a drop).
    ///
    /// On a placeholder timeline the placeholder is discarded and the frames
    /// become the whole timeline. Otherwise they are spliced in at `index`
    /// (clamped to the end) keeping their relative order.
    pub fn insert_external(&mut self, frames: Vec<Frame>, index: usize) {
        if frames.is_empty() {
            return;
        }

        if self.is_placeholder() {
            self.frames = frames;
            return;
        }

        let index = index.min(self.frames.len());
        self.frames.splice(index..index, frames);
    }

    /// Add a frame at the end, replacing the placeholder if present
    pub fn append(&mut self, frame: Frame) {
        if self.is_placeholder() {
            self.frames[0] = frame;
        } else {
            self.frames.push(frame);
        }
    }

    /// Move the frame at `from` so it lands where a drop indicator at
    /// `drop_position` points. `drop_position` is an index into the
    /// timeline as it looks before the move, so positions after `from`
    /// shift left by one once the frame is taken out.
    ///
    /// Returns false when `from` is out of range.
    pub fn move_frame(&mut self, from: usize, drop_position: usize) -> bool {
        if from >= self.frames.len() {
            log::warn!("move: index {} out of range (len {})", from, self.frames.len());
            return false;
        }

        let drop_position = drop_position.min(self.frames.len());
        let target = if from < drop_position {
            drop_position - 1
        } else {
            drop_position
        };

        let frame = self.frames.remove(from);
        self.frames.insert(target, frame);
        true
    }

    /// Change how long the frame at `index` is shown
    pub fn set_duration(&mut self, index: usize, duration: Duration) -> bool {
        match self.frames.get_mut(index) {
            Some(frame) => {
                frame.set_duration(duration);
                true
            }
            None => {
                log::warn!("set_duration: index {} out of range (len {})", index, self.frames.len());
                false
            }
        }
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a Timeline {
    type Item = &'a Frame;
    type IntoIter = std::slice::Iter<'a, Frame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}
