//! Codec configuration

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::errors::ConfigError;

/// Loop count written for new projects: 0 means loop forever
pub const DEFAULT_LOOP_COUNT: u16 = 0;

/// Display duration used when the source does not provide one
pub const DEFAULT_FRAME_DURATION: Duration = Duration::from_millis(200);

/// Settings shared by the decoder, encoder and editing session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    pub default_loops: u16,
    pub default_frame_duration_ms: u64,
    /// NeuQuant sampling speed, 1 (best) to 30 (fastest)
    pub quantize_speed: i32,
    /// Upper bound on logical screen pixels accepted by the decoder
    pub max_pixels: u64,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            default_loops: DEFAULT_LOOP_COUNT,
            default_frame_duration_ms: DEFAULT_FRAME_DURATION.as_millis() as u64,
            quantize_speed: 10,
            max_pixels: 100_000_000,
        }
    }
}

impl CodecConfig {
    pub fn default_frame_duration(&self) -> Duration {
        Duration::from_millis(self.default_frame_duration_ms)
    }

    /// Quantizer speed clamped to the range the palette quantizer accepts
    pub fn quantize_speed(&self) -> i32 {
        self.quantize_speed.clamp(1, 30)
    }

    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: CodecConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_frame_duration_ms == 0 {
            return Err(ConfigError::Invalid(
                "default_frame_duration_ms must be greater than zero".to_string(),
            ));
        }
        if self.max_pixels == 0 {
            return Err(ConfigError::Invalid("max_pixels must be greater than zero".to_string()));
        }
        Ok(())
    }
}
