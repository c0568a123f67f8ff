//! Plate Extract Core - per-file text extraction pipeline
//!
//! Ties the detection and recognition collaborators together: sample frames,
//! crop detected plate regions, recognize text, filter it against the plate
//! vocabulary, and collect each distinct string once. The detector and
//! recognizer are trait seams so the pipeline can be exercised without
//! model files.

pub mod collector;
pub mod config;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod roi;
pub mod sampler;

pub use collector::ResultCollector;
pub use config::PipelineConfig;
pub use error::PipelineError;
pub use pipeline::{CandidateRecord, Detector, PipelineReport, PlatePipeline, Recognizer};
pub use sampler::FrameSampler;
