//! Per-file extraction pipeline
//!
//! One `PlatePipeline` run covers one uploaded file, image or video, start
//! to finish: detect plate regions, crop them, recognize text, filter it
//! against the plate vocabulary, and collect each distinct string once.
//!
//! Processing is strictly sequential. A detector or recognizer failure on
//! one frame or region contributes zero results and is logged; it never
//! aborts the rest of the file. Only failure to open the input at all is
//! fatal.

use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

use plate_ocr_allowlist::classify;
use plate_ocr_common::{MediaKind, PlateDetection, ProcessingError, TextCandidate};
use plate_ocr_decoder::decode_frames;

use crate::collector::ResultCollector;
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::roi::extract_regions;
use crate::sampler::FrameSampler;

/// Plate-region detector seam
///
/// Implemented by the ONNX detector; tests substitute fakes.
pub trait Detector {
    /// Detect plate regions in one RGB frame
    fn detect(&mut self, image: &RgbImage) -> plate_ocr_common::Result<Vec<PlateDetection>>;
}

/// Text recognizer seam
pub trait Recognizer {
    /// Recognize text candidates in one cropped plate region
    fn recognize(&mut self, region: &RgbImage) -> plate_ocr_common::Result<Vec<TextCandidate>>;
}

/// Diagnostic trail entry: one candidate that reached the filter policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateRecord {
    /// Recognized text (trimmed)
    pub text: String,
    /// Recognizer confidence (0.0-1.0)
    pub confidence: f32,
    /// Whether the text passed the allow-list
    pub accepted: bool,
    /// Frame the candidate came from (None for single images)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_idx: Option<u64>,
}

/// Outcome of processing one file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    /// Distinct collected strings in first-seen order
    pub texts: Vec<String>,
    /// Every candidate that reached the filter, with its verdict
    pub candidates: Vec<CandidateRecord>,
    /// Total frames decoded (1 for a still image)
    pub frames_decoded: u64,
    /// Frames that got the full detect/recognize pass
    pub frames_sampled: u64,
    /// Total plate detections across sampled frames
    pub detections: u64,
}

/// Mutable state accumulated over one file's run
#[derive(Default)]
struct RunState {
    collector: ResultCollector,
    candidates: Vec<CandidateRecord>,
    frames_sampled: u64,
    detections: u64,
}

impl RunState {
    fn into_report(self, frames_decoded: u64) -> PipelineReport {
        PipelineReport {
            texts: self.collector.into_entries(),
            candidates: self.candidates,
            frames_decoded,
            frames_sampled: self.frames_sampled,
            detections: self.detections,
        }
    }
}

/// The per-file pipeline, generic over its two model collaborators
pub struct PlatePipeline<D: Detector, R: Recognizer> {
    detector: D,
    recognizer: R,
    config: PipelineConfig,
}

impl<D: Detector, R: Recognizer> PlatePipeline<D, R> {
    /// Assemble a pipeline from its collaborators and options
    pub fn new(detector: D, recognizer: R, config: PipelineConfig) -> Self {
        Self {
            detector,
            recognizer,
            config,
        }
    }

    /// Process one file to completion and build its report
    ///
    /// # Errors
    ///
    /// Fails when the file has an unsupported extension or cannot be
    /// opened. Frame-local failures mid-video are logged and skipped.
    pub fn process_file(&mut self, path: &Path) -> Result<PipelineReport, PipelineError> {
        match MediaKind::from_path(path)? {
            MediaKind::Image => self.process_image(path),
            MediaKind::Video => self.process_video(path),
        }
    }

    fn process_image(&mut self, path: &Path) -> Result<PipelineReport, PipelineError> {
        info!("Processing image {:?}", path);

        let image = image::open(path)
            .map_err(ProcessingError::from)?
            .to_rgb8();

        let mut state = RunState::default();
        self.run_frame(&image, None, &mut state);
        state.frames_sampled = 1;

        Ok(state.into_report(1))
    }

    fn process_video(&mut self, path: &Path) -> Result<PipelineReport, PipelineError> {
        info!(
            "Processing video {:?} (every {} frames)",
            path, self.config.frame_skip
        );

        let mut sampler = FrameSampler::new(self.config.frame_skip);
        let mut state = RunState::default();

        let frames_decoded = decode_frames(path, |frame| {
            if !sampler.admit() {
                return Ok(());
            }

            let frame_idx = frame.frame_number;
            let image = match frame.into_rgb_image() {
                Ok(image) => image,
                Err(e) => {
                    warn!("Skipping frame {}: {}", frame_idx, e);
                    return Ok(());
                }
            };

            self.run_frame(&image, Some(frame_idx), &mut state);
            state.frames_sampled += 1;
            Ok(())
        })?;

        Ok(state.into_report(frames_decoded))
    }

    /// Detect, crop, recognize, and filter one frame or image
    fn run_frame(&mut self, image: &RgbImage, frame_idx: Option<u64>, state: &mut RunState) {
        let mut detections = match self.detector.detect(image) {
            Ok(detections) => detections,
            Err(e) => {
                warn!("Detection failed on frame {:?}: {}", frame_idx, e);
                return;
            }
        };

        for detection in &mut detections {
            detection.frame_idx = frame_idx;
        }
        state.detections += detections.len() as u64;

        for region in extract_regions(image, &detections) {
            let candidates = match self.recognizer.recognize(&region) {
                Ok(candidates) => candidates,
                Err(e) => {
                    warn!("Recognition failed on frame {:?}: {}", frame_idx, e);
                    continue;
                }
            };

            for candidate in candidates {
                self.apply_policy(candidate, frame_idx, state);
            }
        }
    }

    /// Allow-list policy: accepted text is collected; rejected text is
    /// collected only in raw mode; either way each distinct string is
    /// admitted at most once per file
    fn apply_policy(&self, candidate: TextCandidate, frame_idx: Option<u64>, state: &mut RunState) {
        let text = candidate.text.trim();
        let accepted = classify(text);

        if accepted || self.config.show_raw {
            if state.collector.offer(text) {
                debug!("Collected '{}' (accepted: {})", text, accepted);
            }
        }

        state.candidates.push(CandidateRecord {
            text: text.to_string(),
            confidence: candidate.confidence,
            accepted,
            frame_idx,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plate_ocr_common::BoundingBox;
    use std::path::PathBuf;

    /// Detector returning a canned detection list on every call
    struct FakeDetector {
        detections: plate_ocr_common::Result<Vec<PlateDetection>>,
    }

    impl FakeDetector {
        fn boxes(boxes: &[(f32, f32, f32, f32)]) -> Self {
            Self {
                detections: Ok(boxes
                    .iter()
                    .map(|&(x, y, w, h)| PlateDetection {
                        confidence: 0.9,
                        bbox: BoundingBox::new(x, y, w, h),
                        frame_idx: None,
                    })
                    .collect()),
            }
        }

        fn failing() -> Self {
            Self {
                detections: Err(ProcessingError::Other("detector exploded".to_string())),
            }
        }
    }

    impl Detector for FakeDetector {
        fn detect(&mut self, _image: &RgbImage) -> plate_ocr_common::Result<Vec<PlateDetection>> {
            match &self.detections {
                Ok(d) => Ok(d.clone()),
                Err(_) => Err(ProcessingError::Other("detector exploded".to_string())),
            }
        }
    }

    /// Recognizer handing out one canned candidate list per region, in order
    struct FakeRecognizer {
        per_region: Vec<Vec<TextCandidate>>,
        calls: usize,
    }

    impl FakeRecognizer {
        fn new(per_region: Vec<Vec<&str>>) -> Self {
            Self {
                per_region: per_region
                    .into_iter()
                    .map(|texts| {
                        texts
                            .into_iter()
                            .map(|text| TextCandidate {
                                text: text.to_string(),
                                confidence: 0.8,
                            })
                            .collect()
                    })
                    .collect(),
                calls: 0,
            }
        }
    }

    impl Recognizer for FakeRecognizer {
        fn recognize(&mut self, _region: &RgbImage) -> plate_ocr_common::Result<Vec<TextCandidate>> {
            let candidates = self.per_region.get(self.calls).cloned().unwrap_or_default();
            self.calls += 1;
            Ok(candidates)
        }
    }

    fn write_test_image(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("plate.png");
        RgbImage::new(64, 64).save(&path).unwrap();
        path
    }

    #[test]
    fn test_image_pipeline_filters_and_dedups() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_test_image(&dir);

        let detector = FakeDetector::boxes(&[(0.0, 0.0, 0.5, 0.5), (0.5, 0.5, 0.4, 0.4)]);
        let recognizer = FakeRecognizer::new(vec![
            vec!["ঢাকা", "JUNK"],
            vec!["ঢাকা", "১২৩৪"],
        ]);

        let mut pipeline =
            PlatePipeline::new(detector, recognizer, PipelineConfig::default());
        let report = pipeline.process_file(&path).unwrap();

        assert_eq!(report.texts, vec!["ঢাকা", "১২৩৪"]);
        assert_eq!(report.detections, 2);
        assert_eq!(report.frames_decoded, 1);
        assert_eq!(report.frames_sampled, 1);

        // Every candidate reached the policy and carries its verdict
        assert_eq!(report.candidates.len(), 4);
        let junk = report
            .candidates
            .iter()
            .find(|c| c.text == "JUNK")
            .unwrap();
        assert!(!junk.accepted);
    }

    #[test]
    fn test_raw_mode_retains_rejected_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_test_image(&dir);

        let detector = FakeDetector::boxes(&[(0.0, 0.0, 0.5, 0.5)]);
        let recognizer = FakeRecognizer::new(vec![vec!["JUNK", "ঢাকা", "JUNK"]]);

        let config = PipelineConfig {
            show_raw: true,
            ..Default::default()
        };
        let mut pipeline = PlatePipeline::new(detector, recognizer, config);
        let report = pipeline.process_file(&path).unwrap();

        // Rejected text is kept in raw mode, still deduplicated, in one list
        assert_eq!(report.texts, vec!["JUNK", "ঢাকা"]);
    }

    #[test]
    fn test_accepted_results_satisfy_classify_when_raw_off() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_test_image(&dir);

        let detector = FakeDetector::boxes(&[(0.0, 0.0, 0.9, 0.9)]);
        let recognizer =
            FakeRecognizer::new(vec![vec!["abc", "০১২", "xyz", "গ", ""]]);

        let mut pipeline =
            PlatePipeline::new(detector, recognizer, PipelineConfig::default());
        let report = pipeline.process_file(&path).unwrap();

        assert!(report.texts.iter().all(|t| classify(t)));
        assert_eq!(report.texts, vec!["০১২", "গ"]);
    }

    #[test]
    fn test_detector_failure_yields_empty_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_test_image(&dir);

        let detector = FakeDetector::failing();
        let recognizer = FakeRecognizer::new(vec![]);

        let mut pipeline =
            PlatePipeline::new(detector, recognizer, PipelineConfig::default());
        let report = pipeline.process_file(&path).unwrap();

        // One bad frame means zero results, not an aborted run
        assert!(report.texts.is_empty());
        assert_eq!(report.detections, 0);
    }

    #[test]
    fn test_unsupported_extension_rejected_up_front() {
        let detector = FakeDetector::boxes(&[]);
        let recognizer = FakeRecognizer::new(vec![]);

        let mut pipeline =
            PlatePipeline::new(detector, recognizer, PipelineConfig::default());
        let result = pipeline.process_file(Path::new("document.pdf"));
        assert!(result.is_err());
    }

    #[test]
    fn test_unreadable_image_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not a png").unwrap();

        let detector = FakeDetector::boxes(&[]);
        let recognizer = FakeRecognizer::new(vec![]);

        let mut pipeline =
            PlatePipeline::new(detector, recognizer, PipelineConfig::default());
        assert!(pipeline.process_file(&path).is_err());
    }
}
