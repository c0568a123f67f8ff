//! Pipeline configuration

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};

/// Smallest allowed sampling interval (process every frame)
pub const MIN_FRAME_SKIP: u32 = 1;

/// Largest allowed sampling interval
pub const MAX_FRAME_SKIP: u32 = 30;

/// Per-file pipeline options, read once before processing starts and held
/// fixed for the duration of one file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Run detection and recognition on every Nth video frame
    pub frame_skip: u32,
    /// Keep recognized text that fails the allow-list (still deduplicated)
    pub show_raw: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            frame_skip: 10,
            show_raw: false,
        }
    }
}

impl PipelineConfig {
    /// Create a validated configuration
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::InvalidConfig` when `frame_skip` is outside
    /// 1..=30.
    pub fn new(frame_skip: u32, show_raw: bool) -> Result<Self, PipelineError> {
        if !(MIN_FRAME_SKIP..=MAX_FRAME_SKIP).contains(&frame_skip) {
            return Err(PipelineError::InvalidConfig(format!(
                "frame_skip must be between {MIN_FRAME_SKIP} and {MAX_FRAME_SKIP}, got {frame_skip}"
            )));
        }
        Ok(Self {
            frame_skip,
            show_raw,
        })
    }

    /// Create a configuration that processes every video frame
    #[must_use]
    pub fn every_frame() -> Self {
        Self {
            frame_skip: 1,
            show_raw: false,
        }
    }
}
