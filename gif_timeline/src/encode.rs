//! Animated GIF encoding

use gif::Repeat;
use rayon::prelude::*;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tempfile::NamedTempFile;

use crate::config::CodecConfig;
use crate::decode::{AnimatedGif, Decoder};
use crate::errors::EncodeError;
use crate::frame::Frame;
use crate::metadata;

pub struct Encoder {
    config: CodecConfig,
}

impl Encoder {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    /// Encode frames into an animated GIF.
    ///
    /// Frames without a bitmap are skipped. If none remain, the output is a
    /// valid container with a 1x1 screen, the loop block and no frames.
    /// The canvas is as large as the largest frame; every frame is drawn at
    /// the top-left corner and cleared before the next one, so no frame
    /// shows pixels of its predecessor.
    pub fn encode(&self, frames: &[Frame], loops: u16) -> Result<Vec<u8>, EncodeError> {
        let retained: Vec<&Frame> = frames.iter().filter(|f| f.bitmap.is_some()).collect();

        log::debug!(
            "Encoding {} of {} frames, loop count {}",
            retained.len(),
            frames.len(),
            loops
        );

        // Palette quantization dominates, so it runs in parallel; frames are
        // written in order afterwards
        let speed = self.config.quantize_speed();
        let gif_frames = retained
            .par_iter()
            .enumerate()
            .map(|(index, frame)| to_gif_frame(index, frame, speed))
            .collect::<Result<Vec<_>, EncodeError>>()?;

        let width = gif_frames.iter().map(|f| f.width).max().unwrap_or(1);
        let height = gif_frames.iter().map(|f| f.height).max().unwrap_or(1);

        let mut encoder = gif::Encoder::new(Vec::new(), width, height, &[])
            .map_err(|e| EncodeError::AllocationFailed(e.to_string()))?;

        let repeat = match loops {
            0 => Repeat::Infinite,
            n => Repeat::Finite(n),
        };
        encoder
            .set_repeat(repeat)
            .map_err(|e| EncodeError::AllocationFailed(format!("Failed to set loop count: {}", e)))?;

        for (index, frame) in gif_frames.iter().enumerate() {
            encoder.write_frame(frame).map_err(|e| {
                EncodeError::FinalizationFailed(format!("Failed to write frame {}: {}", index, e))
            })?;
        }

        let output = encoder
            .into_inner()
            .map_err(|e| EncodeError::FinalizationFailed(e.to_string()))?;

        verify_output(&output, gif_frames.len(), loops)?;
        Ok(output)
    }

    /// Encode and load the result back as an animation, the way a viewer
    /// would see the saved file
    pub fn encode_to_image(&self, frames: &[Frame], loops: u16) -> Result<AnimatedGif, EncodeError> {
        let output = self.encode(frames, loops)?;
        Decoder::new(self.config.clone())
            .decode(&output)
            .map_err(|e| EncodeError::FinalizationFailed(format!("Encoded output does not decode: {}", e)))
    }

    /// Encode and write to `path`.
    ///
    /// The file is written to a temporary sibling first and renamed over
    /// the destination, so a failed save leaves any existing file untouched.
    pub fn encode_and_save<P: AsRef<Path>>(
        &self,
        frames: &[Frame],
        loops: u16,
        path: P,
    ) -> Result<(), EncodeError> {
        let output = self.encode(frames, loops)?;
        write_atomic(path.as_ref(), &output)?;
        log::debug!("Saved {} bytes to {}", output.len(), path.as_ref().display());
        Ok(())
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new(CodecConfig::default())
    }
}

/// Convert a duration to GIF delay units (hundredths of a second)
pub fn delay_centiseconds(duration: Duration) -> u16 {
    let cs = (duration.as_secs_f64() * 100.0).round();
    cs.clamp(1.0, u16::MAX as f64) as u16
}

fn to_gif_frame(index: usize, frame: &Frame, speed: i32) -> Result<gif::Frame<'static>, EncodeError> {
    let Some(bitmap) = &frame.bitmap else {
        return Err(EncodeError::AllocationFailed(format!("Frame {} has no bitmap", index)));
    };

    let rgba = bitmap.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(EncodeError::AllocationFailed(format!("Frame {} is empty", index)));
    }
    if width > u16::MAX as u32 || height > u16::MAX as u32 {
        return Err(EncodeError::AllocationFailed(format!(
            "Frame {} is {}x{}, exceeds GIF maximum (65535x65535)",
            index, width, height
        )));
    }

    let mut pixels = rgba.into_raw();
    let mut gif_frame = gif::Frame::from_rgba_speed(width as u16, height as u16, &mut pixels, speed);
    gif_frame.delay = delay_centiseconds(frame.duration());
    gif_frame.dispose = gif::DisposalMethod::Background;
    Ok(gif_frame)
}

/// Re-scan the finished stream so malformed bytes never reach the caller
fn verify_output(output: &[u8], expected_frames: usize, loops: u16) -> Result<(), EncodeError> {
    let meta = metadata::scan(output)
        .ok_or_else(|| EncodeError::FinalizationFailed("Output has no GIF header".to_string()))?;

    if !meta.complete {
        return Err(EncodeError::FinalizationFailed("Output is missing the trailer".to_string()));
    }
    if meta.frame_count() != expected_frames {
        return Err(EncodeError::FinalizationFailed(format!(
            "Output has {} frames, expected {}",
            meta.frame_count(),
            expected_frames
        )));
    }
    if meta.loop_count != Some(loops) {
        return Err(EncodeError::FinalizationFailed("Output loop count mismatch".to_string()));
    }
    Ok(())
}

/// Write to a uniquely named temporary file in the destination directory,
/// then rename it over `path`. The temporary file is removed on any failure.
fn write_atomic(path: &Path, data: &[u8]) -> Result<(), EncodeError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir).map_err(EncodeError::WriteFailed)?;
    temp.write_all(data).map_err(EncodeError::WriteFailed)?;
    temp.as_file().sync_all().map_err(EncodeError::WriteFailed)?;

    temp.persist(path).map_err(|e| EncodeError::WriteFailed(e.error))?;
    Ok(())
}
