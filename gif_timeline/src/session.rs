//! Editing session: one timeline plus its loop count

use std::path::Path;
use std::time::Duration;

use crate::classify;
use crate::config::CodecConfig;
use crate::decode::{AnimatedGif, Decoder};
use crate::encode::Encoder;
use crate::errors::SessionError;
use crate::frame::Frame;
use crate::timeline::Timeline;
use crate::watermark::{self, Stamp};

/// State of one editing session.
///
/// Every fallible operation works on a copy or decodes up front, so a
/// failure leaves the timeline and loop count as they were.
pub struct Session {
    timeline: Timeline,
    loops: u16,
    decoder: Decoder,
    encoder: Encoder,
    config: CodecConfig,
}

impl Session {
    /// Start an empty project
    pub fn new(config: CodecConfig) -> Self {
        Self {
            timeline: Timeline::new(),
            loops: config.default_loops,
            decoder: Decoder::new(config.clone()),
            encoder: Encoder::new(config.clone()),
            config,
        }
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn timeline_mut(&mut self) -> &mut Timeline {
        &mut self.timeline
    }

    pub fn loops(&self) -> u16 {
        self.loops
    }

    pub fn set_loops(&mut self, loops: u16) {
        self.loops = loops;
    }

    /// Change how long the frame at `index` is shown. A zero duration
    /// falls back to the configured default.
    pub fn set_duration(&mut self, index: usize, duration: Duration) -> bool {
        let duration = if duration.is_zero() {
            self.config.default_frame_duration()
        } else {
            duration
        };
        self.timeline.set_duration(index, duration)
    }

    /// Replace the whole project with a decoded animation
    pub fn open(&mut self, data: &[u8]) -> Result<(), SessionError> {
        let AnimatedGif { frames, loops } = self.decoder.decode(data)?;
        log::info!("Opened animation with {} frames", frames.len());
        self.timeline = frames;
        self.loops = loops;
        Ok(())
    }

    /// Insert an external file at `index`.
    ///
    /// Animated GIFs contribute all their frames; anything else is loaded
    /// as a single still frame shown for the default duration. Returns the
    /// number of frames inserted.
    pub fn import(&mut self, data: &[u8], index: usize) -> Result<usize, SessionError> {
        let frames = self.load_frames(data)?;
        let count = frames.len();
        self.timeline.insert_external(frames, index);
        Ok(count)
    }

    /// Replace the frame at `index` with a still image, keeping its duration
    pub fn replace_with_image(&mut self, index: usize, data: &[u8]) -> Result<bool, SessionError> {
        let Some(current) = self.timeline.get(index) else {
            return Ok(false);
        };
        let duration = if current.is_placeholder() {
            self.config.default_frame_duration()
        } else {
            current.duration()
        };

        let bitmap = image::load_from_memory(data)?;
        Ok(self.timeline.replace(index, Frame::new(bitmap, duration)).is_some())
    }

    /// Encode the project without touching the timeline
    pub fn encode(&self) -> Result<Vec<u8>, SessionError> {
        Ok(self.encoder.encode(self.timeline.frames(), self.loops)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SessionError> {
        self.encoder.encode_and_save(self.timeline.frames(), self.loops, path)?;
        Ok(())
    }

    /// Stamp `text` onto every frame bitmap. Frames the stamper rejects keep
    /// their original bitmap.
    pub fn apply_watermark<S: Stamp>(&mut self, stamper: &S, text: &str) {
        let indices: Vec<usize> = self
            .timeline
            .iter()
            .enumerate()
            .filter(|(_, f)| f.bitmap.is_some())
            .map(|(i, _)| i)
            .collect();
        let images = self
            .timeline
            .iter()
            .filter_map(|f| f.bitmap.clone())
            .collect();

        let stamped = watermark::stamp_all(stamper, images, text);

        for (index, bitmap) in indices.into_iter().zip(stamped) {
            if let Some(frame) = self.timeline.get(index) {
                let duration = frame.duration();
                self.timeline.replace(index, Frame::new(bitmap, duration));
            }
        }
    }

    fn load_frames(&self, data: &[u8]) -> Result<Vec<Frame>, SessionError> {
        if classify::is_animated(data) {
            let gif = self.decoder.decode(data)?;
            return Ok(gif.frames.into_frames());
        }

        let bitmap = image::load_from_memory(data)?;
        Ok(vec![Frame::new(bitmap, self.config.default_frame_duration())])
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(CodecConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{DecodeError, WatermarkError};
    use crate::metadata::tests::build_gif;
    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png_bytes(color: [u8; 4]) -> Vec<u8> {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba(color)));
        let mut output = Vec::new();
        image.write_to(&mut Cursor::new(&mut output), ImageFormat::Png).unwrap();
        output
    }

    struct Brighten;

    impl Stamp for Brighten {
        fn stamp(&self, image: &DynamicImage, _text: &str) -> Result<DynamicImage, WatermarkError> {
            Ok(image.brighten(10))
        }
    }

    #[test]
    fn test_new_session_is_placeholder() {
        let session = Session::default();
        assert!(session.timeline().is_placeholder());
        assert_eq!(session.loops(), 0);
    }

    #[test]
    fn test_open_replaces_project() {
        let mut session = Session::default();
        session.open(&build_gif(Some(3), &[Some(10), Some(20)])).unwrap();
        assert_eq!(session.timeline().len(), 2);
        assert_eq!(session.loops(), 3);
    }

    #[test]
    fn test_failed_open_keeps_state() {
        let mut session = Session::default();
        session.open(&build_gif(Some(3), &[Some(10), Some(20)])).unwrap();

        let result = session.open(&build_gif(None, &[Some(10), Some(10), Some(10)]));
        assert!(matches!(
            result,
            Err(SessionError::Decode(DecodeError::MissingAnimationMetadata))
        ));
        assert_eq!(session.timeline().len(), 2);
        assert_eq!(session.loops(), 3);
    }

    #[test]
    fn test_import_animation_into_placeholder() {
        let mut session = Session::default();
        let inserted = session.import(&build_gif(Some(0), &[Some(10), Some(10), Some(10)]), 0).unwrap();
        assert_eq!(inserted, 3);
        assert_eq!(session.timeline().len(), 3);
    }

    #[test]
    fn test_import_still_image() {
        let mut session = Session::default();
        session.import(&build_gif(Some(0), &[Some(10), Some(10)]), 0).unwrap();
        session.import(&png_bytes([255, 0, 0, 255]), 1).unwrap();

        assert_eq!(session.timeline().len(), 3);
        let still = session.timeline().get(1).unwrap();
        assert_eq!(still.duration(), Duration::from_millis(200));
        assert_eq!(still.bitmap.as_ref().unwrap().width(), 2);
    }

    #[test]
    fn test_import_garbage_keeps_state() {
        let mut session = Session::default();
        assert!(session.import(b"garbage", 0).is_err());
        assert!(session.timeline().is_placeholder());
    }

    #[test]
    fn test_replace_with_image_keeps_duration() {
        let mut session = Session::default();
        session.open(&build_gif(Some(0), &[Some(50), Some(10)])).unwrap();
        assert!(session.replace_with_image(0, &png_bytes([0, 0, 255, 255])).unwrap());

        let frame = session.timeline().get(0).unwrap();
        assert_eq!(frame.duration(), Duration::from_millis(500));
        assert_eq!(frame.bitmap.as_ref().unwrap().width(), 2);
        assert!(!session.replace_with_image(5, &png_bytes([0, 0, 255, 255])).unwrap());
    }

    #[test]
    fn test_watermark_skips_placeholder_and_keeps_durations() {
        let mut session = Session::default();
        session.import(&png_bytes([0, 0, 0, 255]), 0).unwrap();
        session.set_duration(0, Duration::from_millis(70));
        session.apply_watermark(&Brighten, "demo");

        let frame = session.timeline().get(0).unwrap();
        assert_eq!(frame.duration(), Duration::from_millis(70));
        assert_eq!(frame.bitmap.as_ref().unwrap().to_rgba8().get_pixel(0, 0)[0], 10);
    }

    #[test]
    fn test_zero_duration_uses_configured_default() {
        let config = CodecConfig {
            default_frame_duration_ms: 50,
            ..CodecConfig::default()
        };
        let mut session = Session::new(config);
        session.import(&png_bytes([0, 0, 0, 255]), 0).unwrap();
        assert_eq!(session.timeline().get(0).unwrap().duration(), Duration::from_millis(50));

        assert!(session.set_duration(0, Duration::from_millis(300)));
        assert!(session.set_duration(0, Duration::ZERO));
        assert_eq!(session.timeline().get(0).unwrap().duration(), Duration::from_millis(50));
        assert!(!session.set_duration(3, Duration::ZERO));
    }

    #[test]
    fn test_save_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("project.gif");

        let mut session = Session::default();
        session.import(&png_bytes([255, 0, 0, 255]), 0).unwrap();
        session.import(&png_bytes([0, 255, 0, 255]), 1).unwrap();
        session.set_loops(2);
        session.save(&path).unwrap();

        let mut reopened = Session::default();
        reopened.open(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(reopened.timeline().len(), 2);
        assert_eq!(reopened.loops(), 2);
    }
}
