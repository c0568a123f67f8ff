//! Region-of-interest extraction
//!
//! Crops one sub-image per detection box, in detection order. Boxes are
//! rounded and clipped to the frame bounds; boxes that degenerate to zero
//! area after clipping are skipped rather than failing the frame.

use image::RgbImage;
use tracing::debug;
use plate_ocr_common::PlateDetection;

/// Crop plate regions out of a frame
#[must_use]
pub fn extract_regions(image: &RgbImage, detections: &[PlateDetection]) -> Vec<RgbImage> {
    let (width, height) = image.dimensions();
    let mut regions = Vec::with_capacity(detections.len());

    for detection in detections {
        let Some(rect) = detection.bbox.to_pixel_rect(width, height) else {
            debug!("Skipping degenerate detection box {:?}", detection.bbox);
            continue;
        };

        let region = image::imageops::crop_imm(image, rect.x1, rect.y1, rect.width(), rect.height())
            .to_image();
        regions.push(region);
    }

    regions
}
