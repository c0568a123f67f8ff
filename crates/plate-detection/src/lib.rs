//! License-plate detection using a YOLO-style model via ONNX Runtime
//!
//! Runs a single-class YOLO detector exported to ONNX over RGB frames and
//! returns plate bounding boxes. The model is an external pretrained
//! artifact; this crate only owns preprocessing, inference, and
//! post-processing (confidence filtering and non-maximum suppression).
//!
//! # Example
//! ```no_run
//! use plate_ocr_detection::{PlateDetector, PlateDetectorConfig};
//! use image::open;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PlateDetectorConfig::default();
//! let mut detector = PlateDetector::new("best.onnx", config)?;
//!
//! let img = open("car.jpg")?.to_rgb8();
//! for detection in detector.detect(&img)? {
//!     println!("plate at {:?} ({:.2}%)", detection.bbox, detection.confidence * 100.0);
//! }
//! # Ok(())
//! # }
//! ```

pub mod pipeline;

use image::RgbImage;
use ndarray::Array;
use ort::{
    execution_providers::CPUExecutionProvider,
    session::{builder::GraphOptimizationLevel, Session, SessionOutputs},
    value::TensorRef,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};
use plate_ocr_common::{BoundingBox, PlateDetection, ProcessingError};

/// Configuration for plate detection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlateDetectorConfig {
    /// Minimum confidence threshold for detections (0.0-1.0)
    pub confidence_threshold: f32,
    /// `IoU` threshold for non-maximum suppression (0.0-1.0)
    pub iou_threshold: f32,
    /// Maximum number of detections to return per image
    pub max_detections: usize,
    /// Input image size (the model expects a square input, default 640x640)
    pub input_size: u32,
}

impl Default for PlateDetectorConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.25,
            iou_threshold: 0.45,
            max_detections: 50,
            input_size: 640,
        }
    }
}

impl PlateDetectorConfig {
    /// Create a fast detection config (higher thresholds, fewer detections)
    #[must_use]
    pub fn fast() -> Self {
        Self {
            confidence_threshold: 0.5,
            iou_threshold: 0.5,
            max_detections: 20,
            input_size: 640,
        }
    }

    /// Create an accurate detection config (lower thresholds, more detections)
    #[must_use]
    pub fn accurate() -> Self {
        Self {
            confidence_threshold: 0.15,
            iou_threshold: 0.4,
            max_detections: 100,
            input_size: 640,
        }
    }
}

/// Error types for plate detection
#[derive(Debug, Error)]
pub enum DetectionError {
    #[error("Model file not found: {0}")]
    ModelNotFound(String),

    #[error("Failed to load model: {0}")]
    ModelLoad(String),

    #[error("Inference error: {0}")]
    Inference(String),
}

impl From<DetectionError> for ProcessingError {
    fn from(err: DetectionError) -> Self {
        ProcessingError::Other(err.to_string())
    }
}

/// Plate detector holding a loaded ONNX session
pub struct PlateDetector {
    session: Session,
    config: PlateDetectorConfig,
}

impl PlateDetector {
    /// Create a new plate detector from an ONNX model path
    ///
    /// The session is loaded once with full graph optimizations and CPU
    /// execution, then reused for every frame.
    pub fn new<P: AsRef<Path>>(
        model_path: P,
        config: PlateDetectorConfig,
    ) -> Result<Self, DetectionError> {
        let model_path = model_path.as_ref();
        info!("Loading plate model from {:?}", model_path);

        let session = create_cpu_session(model_path)?;

        info!("Plate model loaded successfully");

        Ok(Self { session, config })
    }

    /// Detect plates in a single RGB image
    pub fn detect(&mut self, image: &RgbImage) -> Result<Vec<PlateDetection>, DetectionError> {
        debug!(
            "Running plate detection on {}x{} image",
            image.width(),
            image.height()
        );

        let input_array = preprocess_image(image, &self.config);

        // Zero-copy tensor: use view instead of clone
        let input_tensor = TensorRef::from_array_view(input_array.view())
            .map_err(|e| DetectionError::Inference(e.to_string()))?;

        let outputs = self
            .session
            .run(ort::inputs![input_tensor])
            .map_err(|e| DetectionError::Inference(e.to_string()))?;

        let detections = postprocess_outputs(outputs, &self.config)?;

        debug!("Detected {} plates", detections.len());

        Ok(detections)
    }
}

/// Create a CPU-only ONNX session with graph optimizations
fn create_cpu_session(model_path: &Path) -> Result<Session, DetectionError> {
    if !model_path.exists() {
        return Err(DetectionError::ModelNotFound(
            model_path.display().to_string(),
        ));
    }

    // Physical core count, overridable for tests to avoid thread contention
    let num_threads = std::env::var("PLATE_EXTRACT_THREADS")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or_else(num_cpus::get_physical);

    Session::builder()
        .map_err(|e| DetectionError::ModelLoad(e.to_string()))?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(|e| DetectionError::ModelLoad(e.to_string()))?
        .with_intra_threads(num_threads)
        .map_err(|e| DetectionError::ModelLoad(e.to_string()))?
        .with_memory_pattern(true)
        .map_err(|e| DetectionError::ModelLoad(e.to_string()))?
        .with_execution_providers([CPUExecutionProvider::default().build()])
        .map_err(|e| DetectionError::ModelLoad(e.to_string()))?
        .commit_from_file(model_path)
        .map_err(|e| DetectionError::ModelLoad(e.to_string()))
}

/// Preprocess image to model input format (1, 3, H, W) normalized to [0, 1]
fn preprocess_image(
    image: &RgbImage,
    config: &PlateDetectorConfig,
) -> Array<f32, ndarray::Dim<[usize; 4]>> {
    let input_size = config.input_size;

    let resized = image::imageops::resize(
        image,
        input_size,
        input_size,
        image::imageops::FilterType::Triangle,
    );

    let mut input_array = Array::zeros((1, 3, input_size as usize, input_size as usize));

    for y in 0..input_size as usize {
        for x in 0..input_size as usize {
            let pixel = resized.get_pixel(x as u32, y as u32);
            input_array[[0, 0, y, x]] = f32::from(pixel[0]) / 255.0;
            input_array[[0, 1, y, x]] = f32::from(pixel[1]) / 255.0;
            input_array[[0, 2, y, x]] = f32::from(pixel[2]) / 255.0;
        }
    }

    input_array
}

/// Post-process model outputs to plate detections
///
/// The single-class YOLO head emits (1, 5, anchors): 4 box coordinates in
/// center format followed by one plate probability per anchor.
fn postprocess_outputs(
    outputs: SessionOutputs,
    config: &PlateDetectorConfig,
) -> Result<Vec<PlateDetection>, DetectionError> {
    let output = &outputs[0];

    let (shape, data) = output
        .try_extract_tensor::<f32>()
        .map_err(|e| DetectionError::Inference(format!("Failed to extract tensor: {e}")))?;

    debug!("ONNX output shape: {:?}", shape);

    let dims = shape.as_ref();
    if dims.len() != 3 {
        return Err(DetectionError::Inference(format!(
            "Expected 3D output tensor, got {}D",
            dims.len()
        )));
    }

    let num_features = dims[1] as usize;
    let num_anchors = dims[2] as usize;
    if num_features < 5 {
        return Err(DetectionError::Inference(format!(
            "Expected at least 5 output features, got {num_features}"
        )));
    }

    let mut raw_detections = Vec::with_capacity(num_anchors / 10);

    // Data layout: [batch, features, anchors], so anchor i's feature f is at
    // data[f * num_anchors + i]
    for anchor_idx in 0..num_anchors {
        let get_feature = |feature_idx: usize| data[feature_idx * num_anchors + anchor_idx];

        let x_center = get_feature(0);
        let y_center = get_feature(1);
        let width = get_feature(2);
        let height = get_feature(3);
        let confidence = get_feature(4);

        if confidence < config.confidence_threshold {
            continue;
        }

        // Convert from center format to corner format and normalize
        let input_size = config.input_size as f32;
        let bbox = BoundingBox::new(
            (x_center - width / 2.0) / input_size,
            (y_center - height / 2.0) / input_size,
            width / input_size,
            height / input_size,
        );

        raw_detections.push(PlateDetection {
            confidence,
            bbox,
            frame_idx: None,
        });
    }

    debug!("Raw detections before NMS: {}", raw_detections.len());

    let detections = apply_nms(raw_detections, config);

    Ok(detections
        .into_iter()
        .take(config.max_detections)
        .collect())
}

/// Apply non-maximum suppression to remove duplicate detections
fn apply_nms(
    mut detections: Vec<PlateDetection>,
    config: &PlateDetectorConfig,
) -> Vec<PlateDetection> {
    detections.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep = Vec::with_capacity(detections.len());

    while !detections.is_empty() {
        // swap_remove(0) is O(1); order no longer matters once the best
        // remaining detection has been taken
        let current = detections.swap_remove(0);

        detections.retain(|det| det.bbox.iou(&current.bbox) < config.iou_threshold);

        keep.push(current);
    }

    debug!("Detections after NMS: {}", keep.len());
    keep
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detection(confidence: f32, x: f32, y: f32, w: f32, h: f32) -> PlateDetection {
        PlateDetection {
            confidence,
            bbox: BoundingBox::new(x, y, w, h),
            frame_idx: None,
        }
    }

    #[test]
    fn test_config_defaults() {
        let config = PlateDetectorConfig::default();
        assert_eq!(config.confidence_threshold, 0.25);
        assert_eq!(config.iou_threshold, 0.45);
        assert_eq!(config.max_detections, 50);
        assert_eq!(config.input_size, 640);
    }

    #[test]
    fn test_config_presets() {
        let fast = PlateDetectorConfig::fast();
        assert_eq!(fast.confidence_threshold, 0.5);
        assert_eq!(fast.max_detections, 20);

        let accurate = PlateDetectorConfig::accurate();
        assert_eq!(accurate.confidence_threshold, 0.15);
        assert_eq!(accurate.max_detections, 100);
    }

    #[test]
    fn test_nms_suppresses_overlaps() {
        let config = PlateDetectorConfig::default();
        let detections = vec![
            detection(0.9, 0.1, 0.1, 0.3, 0.2),
            // Nearly identical box with lower confidence: suppressed
            detection(0.6, 0.11, 0.1, 0.3, 0.2),
            // Far away box: kept
            detection(0.7, 0.6, 0.6, 0.2, 0.2),
        ];

        let kept = apply_nms(detections, &config);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].confidence, 0.9);
        assert_eq!(kept[1].confidence, 0.7);
    }

    #[test]
    fn test_nms_keeps_best_first() {
        let config = PlateDetectorConfig::default();
        let detections = vec![
            detection(0.3, 0.5, 0.5, 0.2, 0.1),
            detection(0.8, 0.5, 0.5, 0.2, 0.1),
        ];

        let kept = apply_nms(detections, &config);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].confidence, 0.8);
    }

    #[test]
    fn test_preprocess_shape() {
        let img = RgbImage::new(320, 240);
        let config = PlateDetectorConfig::default();
        let array = preprocess_image(&img, &config);
        assert_eq!(array.shape(), &[1, 3, 640, 640]);
    }

    #[test]
    fn test_missing_model() {
        let result = PlateDetector::new("nonexistent.onnx", PlateDetectorConfig::default());
        assert!(matches!(result, Err(DetectionError::ModelNotFound(_))));
    }
}
