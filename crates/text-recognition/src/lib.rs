//! Text recognition over plate regions using Tesseract 5.x
//!
//! Wraps Tesseract (via `leptess`) as the recognition collaborator of the
//! pipeline: one cropped plate region in, zero or more (text, confidence)
//! candidates out. The engine is configured for Latin and Bengali at the
//! same time, since Bangladeshi plates mix both in the wild.
//!
//! Candidates carry their recognition confidence, but downstream filtering
//! is vocabulary-based; confidence is surfaced for diagnostics only.

pub mod pipeline;

use image::RgbImage;
use leptess::{LepTess, Variable};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use plate_ocr_common::{ProcessingError, TextCandidate};

/// Configuration for text recognition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognizerConfig {
    /// Tesseract language codes (e.g., "eng+ben")
    pub languages: String,
    /// Minimum confidence threshold (0-100); 0 keeps every candidate
    pub min_confidence: i32,
    /// Page segmentation mode (see Tesseract PSM)
    pub page_segmentation_mode: u32,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            languages: "eng+ben".to_string(),
            // The allow-list, not confidence, decides what is kept
            min_confidence: 0,
            page_segmentation_mode: 6, // PSM_SINGLE_BLOCK: plate crops are one text block
        }
    }
}

/// Errors that can occur during text recognition
#[derive(Error, Debug)]
pub enum RecognitionError {
    #[error("Failed to initialize Tesseract: {0}")]
    InitError(String),

    #[error("Failed to run recognition: {0}")]
    RecognitionFailed(String),

    #[error("Invalid region dimensions: {0}")]
    InvalidRegionDimensions(String),
}

impl From<RecognitionError> for ProcessingError {
    fn from(err: RecognitionError) -> Self {
        ProcessingError::Other(err.to_string())
    }
}

/// Text recognizer wrapping a Tesseract engine
pub struct TextRecognizer {
    config: RecognizerConfig,
}

impl TextRecognizer {
    /// Create a new text recognizer
    ///
    /// Verifies up front that Tesseract can initialize with the configured
    /// language pair, so a missing traineddata file fails before any media
    /// is processed.
    pub fn new(config: RecognizerConfig) -> Result<Self, RecognitionError> {
        let _test_init = LepTess::new(None, &config.languages).map_err(|e| {
            RecognitionError::InitError(format!(
                "Failed to initialize Tesseract with languages '{}': {}. \
                 Make sure the language data is installed (e.g. tesseract-ocr-ben)",
                config.languages, e
            ))
        })?;

        Ok(Self { config })
    }

    /// Recognize text in one plate region
    ///
    /// Returns zero or more candidates, one per detected word box. Text is
    /// trimmed of surrounding whitespace; empty results are dropped. No
    /// ordering is guaranteed among candidates from one region.
    pub fn recognize(&self, region: &RgbImage) -> Result<Vec<TextCandidate>, RecognitionError> {
        let (width, height) = region.dimensions();

        if width == 0 || height == 0 {
            return Err(RecognitionError::InvalidRegionDimensions(format!(
                "Region dimensions must be non-zero (got {width}x{height})"
            )));
        }

        let mut lt = LepTess::new(None, &self.config.languages)
            .map_err(|e| RecognitionError::InitError(format!("Failed to initialize Tesseract: {e}")))?;

        lt.set_variable(
            Variable::TesseditPagesegMode,
            &self.config.page_segmentation_mode.to_string(),
        )
        .map_err(|e| RecognitionError::InitError(format!("Failed to set PSM: {e}")))?;

        // leptess expects encoded image data, so encode the region to PNG in memory
        let mut png_buf = std::io::Cursor::new(Vec::new());
        region
            .write_to(&mut png_buf, image::ImageFormat::Png)
            .map_err(|e| {
                RecognitionError::RecognitionFailed(format!("Failed to encode region to PNG: {e}"))
            })?;

        lt.set_image_from_mem(png_buf.get_ref()).map_err(|e| {
            RecognitionError::RecognitionFailed(format!("Failed to set image from memory: {e}"))
        })?;

        // get_component_boxes() returns None when no text is found (e.g. a
        // blank crop); that is an empty result, not an error
        let boxes = match lt.get_component_boxes(leptess::capi::TessPageIteratorLevel_RIL_WORD, true)
        {
            Some(boxes) => boxes,
            None => return Ok(Vec::new()),
        };

        let mut candidates = Vec::new();

        for bbox in &boxes {
            let geom = bbox.get_geometry();

            lt.set_rectangle(geom.x, geom.y, geom.w, geom.h);

            let text = lt.get_utf8_text().unwrap_or_default().trim().to_string();

            if text.is_empty() {
                continue;
            }

            let confidence = lt.mean_text_conf() as f32 / 100.0;

            if (confidence * 100.0) as i32 >= self.config.min_confidence {
                debug!(
                    "Recognized '{}' with confidence {:.2}%",
                    text,
                    confidence * 100.0
                );

                candidates.push(TextCandidate { text, confidence });
            }
        }

        Ok(candidates)
    }
}
