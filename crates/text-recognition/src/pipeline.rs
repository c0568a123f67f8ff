//! Pipeline seam for the Tesseract recognizer

use image::RgbImage;
use plate_extract_core::Recognizer;
use plate_ocr_common::{Result, TextCandidate};

use crate::TextRecognizer;

impl Recognizer for TextRecognizer {
    fn recognize(&mut self, region: &RgbImage) -> Result<Vec<TextCandidate>> {
        Ok(TextRecognizer::recognize(self, region)?)
    }
}
