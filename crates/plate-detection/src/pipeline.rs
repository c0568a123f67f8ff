//! Pipeline seam for the ONNX plate detector

use image::RgbImage;
use plate_extract_core::Detector;
use plate_ocr_common::{PlateDetection, Result};

use crate::PlateDetector;

impl Detector for PlateDetector {
    fn detect(&mut self, image: &RgbImage) -> Result<Vec<PlateDetection>> {
        Ok(PlateDetector::detect(self, image)?)
    }
}
