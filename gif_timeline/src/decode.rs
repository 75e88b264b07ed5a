//! Animated GIF decoding into an editable timeline

use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, DynamicImage};
use std::io::Cursor;
use std::path::Path;
use std::time::Duration;

use crate::config::CodecConfig;
use crate::errors::DecodeError;
use crate::frame::Frame;
use crate::metadata;
use crate::timeline::Timeline;

/// Frames and global loop count of an animation
#[derive(Clone, Debug, PartialEq)]
pub struct AnimatedGif {
    pub frames: Timeline,
    /// Loop count, 0 meaning forever
    pub loops: u16,
}

pub struct Decoder {
    config: CodecConfig,
}

impl Decoder {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    /// Decode an animated GIF into a timeline.
    ///
    /// The stream must expose a frame count, a loop count and a duration for
    /// its first frame, otherwise `MissingAnimationMetadata` is returned.
    /// Frames are composited onto the full canvas, each one an independent
    /// bitmap.
    pub fn decode(&self, data: &[u8]) -> Result<AnimatedGif, DecodeError> {
        let meta = metadata::scan(data).ok_or(DecodeError::MissingAnimationMetadata)?;
        if !meta.has_animation_metadata() {
            return Err(DecodeError::MissingAnimationMetadata);
        }
        let loops = meta.loop_count.ok_or(DecodeError::MissingAnimationMetadata)?;

        let (width, height) = (meta.width as u32, meta.height as u32);
        if (width as u64) * (height as u64) > self.config.max_pixels {
            return Err(DecodeError::TooLarge {
                width,
                height,
                limit: self.config.max_pixels,
            });
        }

        log::debug!(
            "Decoding GIF {}x{} with {} frames, loop count {}",
            width,
            height,
            meta.frame_count(),
            loops
        );

        let decoder = GifDecoder::new(Cursor::new(data))?;
        let mut frames = Vec::with_capacity(meta.frame_count());

        for (index, frame) in decoder.into_frames().enumerate() {
            let bitmap = DynamicImage::ImageRgba8(frame?.into_buffer());
            let delay = meta.frames.get(index).and_then(|f| f.delay_cs);
            frames.push(Frame::new(bitmap, self.frame_duration(index, delay)));
        }

        if frames.len() != meta.frame_count() {
            log::warn!(
                "Decoded {} frames but container declares {}",
                frames.len(),
                meta.frame_count()
            );
        }

        if frames.is_empty() {
            return Err(DecodeError::MissingAnimationMetadata);
        }

        Ok(AnimatedGif {
            frames: Timeline::from_frames(frames),
            loops,
        })
    }

    /// Read and decode a GIF file
    pub fn decode_file<P: AsRef<Path>>(&self, path: P) -> Result<AnimatedGif, DecodeError> {
        let data = std::fs::read(path)?;
        self.decode(&data)
    }

    fn frame_duration(&self, index: usize, delay_cs: Option<u16>) -> Duration {
        match delay_cs {
            Some(cs) if cs > 0 => Duration::from_millis(cs as u64 * 10),
            _ => {
                log::warn!("Frame {} has no usable delay, using default", index);
                self.config.default_frame_duration()
            }
        }
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new(CodecConfig::default())
    }
}
