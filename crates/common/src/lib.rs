/// Common types and utilities for license-plate text extraction
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Processing errors
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("No video stream found")]
    NoVideoStream,

    #[error("Corrupted file: {0}")]
    CorruptedFile(String),

    #[error("FFmpeg error: {0}")]
    FFmpegError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    ImageError(String),

    #[error("Other error: {0}")]
    Other(String),
}

impl From<image::ImageError> for ProcessingError {
    fn from(err: image::ImageError) -> Self {
        ProcessingError::ImageError(err.to_string())
    }
}

/// Result type for processing operations
pub type Result<T> = std::result::Result<T, ProcessingError>;

/// Still-image extensions the pipeline accepts
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Video container extensions the pipeline accepts
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mkv"];

/// Kind of media a file holds, decided from its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Classify a file path as image or video by extension
    ///
    /// # Errors
    ///
    /// Returns `ProcessingError::UnsupportedFormat` for unknown or missing
    /// extensions, before any decoding is attempted.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
            Ok(MediaKind::Image)
        } else if VIDEO_EXTENSIONS.contains(&extension.as_str()) {
            Ok(MediaKind::Video)
        } else {
            Err(ProcessingError::UnsupportedFormat(format!(
                "{} (expected one of: {}, {})",
                path.display(),
                IMAGE_EXTENSIONS.join("/"),
                VIDEO_EXTENSIONS.join("/")
            )))
        }
    }
}

/// Bounding box with normalized coordinates (0-1)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundingBox {
    /// X coordinate of top-left corner (normalized 0-1)
    pub x: f32,
    /// Y coordinate of top-left corner (normalized 0-1)
    pub y: f32,
    /// Width of box (normalized 0-1)
    pub width: f32,
    /// Height of box (normalized 0-1)
    pub height: f32,
}

impl BoundingBox {
    /// Create a new bounding box
    #[must_use]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Get center coordinates
    #[must_use]
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Get area of bounding box
    #[must_use]
    #[inline]
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Calculate Intersection over Union (`IoU`) with another box
    #[must_use]
    #[inline]
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = (self.x + self.width).min(other.x + other.width);
        let y2 = (self.y + self.height).min(other.y + other.height);

        let intersection_width = (x2 - x1).max(0.0);
        let intersection_height = (y2 - y1).max(0.0);
        let intersection_area = intersection_width * intersection_height;

        let union_area = self.area() + other.area() - intersection_area;

        if union_area > 0.0 {
            intersection_area / union_area
        } else {
            0.0
        }
    }

    /// Project onto an image of the given pixel dimensions
    ///
    /// Coordinates are rounded to integers and clipped to the image bounds.
    /// Returns `None` when the clipped rectangle has zero or negative area,
    /// so degenerate detector output is skipped rather than crashing a crop.
    #[must_use]
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    pub fn to_pixel_rect(&self, image_width: u32, image_height: u32) -> Option<PixelRect> {
        let clamp_x = |v: f32| {
            (v * image_width as f32)
                .round()
                .clamp(0.0, image_width as f32)
        };
        let clamp_y = |v: f32| {
            (v * image_height as f32)
                .round()
                .clamp(0.0, image_height as f32)
        };

        let x1 = clamp_x(self.x) as u32;
        let y1 = clamp_y(self.y) as u32;
        let x2 = clamp_x(self.x + self.width) as u32;
        let y2 = clamp_y(self.y + self.height) as u32;

        if x2 <= x1 || y2 <= y1 {
            return None;
        }

        Some(PixelRect { x1, y1, x2, y2 })
    }
}

/// Axis-aligned rectangle in pixel coordinates, guaranteed inside the image
/// it was clipped against and to have strictly positive area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl PixelRect {
    /// Width in pixels
    #[must_use]
    pub fn width(&self) -> u32 {
        self.x2 - self.x1
    }

    /// Height in pixels
    #[must_use]
    pub fn height(&self) -> u32 {
        self.y2 - self.y1
    }
}

/// One detected plate region in a frame or image
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlateDetection {
    /// Detector confidence score (0-1)
    pub confidence: f32,
    /// Bounding box with normalized coordinates
    pub bbox: BoundingBox,
    /// Frame index (for video processing, None for single images)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_idx: Option<u64>,
}

/// One (text, confidence) candidate returned by the recognizer for a region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextCandidate {
    /// Recognized text, trimmed of surrounding whitespace
    pub text: String,
    /// Recognition confidence score (0.0-1.0)
    pub confidence: f32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_media_kind_from_path() {
        assert_eq!(
            MediaKind::from_path(&PathBuf::from("plate.jpg")).unwrap(),
            MediaKind::Image
        );
        assert_eq!(
            MediaKind::from_path(&PathBuf::from("PLATE.PNG")).unwrap(),
            MediaKind::Image
        );
        assert_eq!(
            MediaKind::from_path(&PathBuf::from("dashcam.mp4")).unwrap(),
            MediaKind::Video
        );
        assert_eq!(
            MediaKind::from_path(&PathBuf::from("clip.mkv")).unwrap(),
            MediaKind::Video
        );
    }

    #[test]
    fn test_media_kind_unsupported() {
        assert!(MediaKind::from_path(&PathBuf::from("notes.txt")).is_err());
        assert!(MediaKind::from_path(&PathBuf::from("no_extension")).is_err());
    }

    #[test]
    fn test_bbox_iou() {
        let box1 = BoundingBox::new(0.0, 0.0, 0.5, 0.5);
        let box2 = BoundingBox::new(0.25, 0.25, 0.5, 0.5);

        // Overlapping boxes should have IoU > 0
        let iou = box1.iou(&box2);
        assert!(iou > 0.0 && iou < 1.0);

        // Identical boxes should have IoU = 1.0
        let box3 = BoundingBox::new(0.0, 0.0, 0.5, 0.5);
        let iou_same = box1.iou(&box3);
        assert!((iou_same - 1.0).abs() < 0.001);

        // Non-overlapping boxes should have IoU = 0
        let box4 = BoundingBox::new(0.6, 0.6, 0.3, 0.3);
        let iou_none = box1.iou(&box4);
        assert_eq!(iou_none, 0.0);
    }

    #[test]
    fn test_bbox_area_and_center() {
        let bbox = BoundingBox::new(0.1, 0.2, 0.4, 0.6);
        assert!((bbox.area() - 0.24).abs() < 1e-6);
        let (cx, cy) = bbox.center();
        assert_eq!(cx, 0.3);
        assert_eq!(cy, 0.5);
    }

    #[test]
    fn test_to_pixel_rect_rounds_and_clips() {
        let bbox = BoundingBox::new(0.1, 0.1, 0.5, 0.5);
        let rect = bbox.to_pixel_rect(100, 200).unwrap();
        assert_eq!(
            rect,
            PixelRect {
                x1: 10,
                y1: 20,
                x2: 60,
                y2: 120
            }
        );
        assert_eq!(rect.width(), 50);
        assert_eq!(rect.height(), 100);

        // Box hanging off the right/bottom edge is clipped to the image
        let bbox = BoundingBox::new(0.8, 0.9, 0.5, 0.5);
        let rect = bbox.to_pixel_rect(100, 100).unwrap();
        assert_eq!(
            rect,
            PixelRect {
                x1: 80,
                y1: 90,
                x2: 100,
                y2: 100
            }
        );
    }

    #[test]
    fn test_to_pixel_rect_degenerate() {
        // Zero-width box rounds to nothing
        let bbox = BoundingBox::new(0.5, 0.5, 0.0, 0.2);
        assert!(bbox.to_pixel_rect(100, 100).is_none());

        // Box entirely outside the image clips to zero area
        let bbox = BoundingBox::new(1.2, 1.2, 0.3, 0.3);
        assert!(bbox.to_pixel_rect(100, 100).is_none());

        // Negative-size box never produces a crop
        let bbox = BoundingBox::new(0.5, 0.5, -0.2, -0.2);
        assert!(bbox.to_pixel_rect(100, 100).is_none());
    }
}
