//! The one and only command: process a media file end to end

use anyhow::{Context as _, Result};
use clap::Args;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

use plate_extract_core::{export, PipelineConfig, PlatePipeline};
use plate_ocr_detection::{PlateDetector, PlateDetectorConfig};
use plate_ocr_recognition::{RecognizerConfig, TextRecognizer};

#[derive(Args)]
pub struct ProcessCommand {
    /// Input media file (jpg/jpeg/png image or mp4/avi/mkv video)
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Path to the plate detection ONNX model
    #[arg(long, default_value = "models/best.onnx")]
    model: PathBuf,

    /// Run detection on every Nth video frame
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..=30))]
    pub frame_skip: u32,

    /// Also keep recognized text that fails the allow-list
    #[arg(long)]
    pub show_raw: bool,

    /// CSV output path
    #[arg(long, default_value = "ocr_results.csv")]
    csv: PathBuf,

    /// Write the full run report (all candidates, with confidences) as JSON
    #[arg(long)]
    json: Option<PathBuf>,

    /// Tesseract language codes for recognition
    #[arg(long, default_value = "eng+ben")]
    languages: String,

    /// Minimum detector confidence (0.0-1.0)
    #[arg(long, default_value_t = 0.25)]
    confidence: f32,
}

impl ProcessCommand {
    pub fn execute(self) -> Result<()> {
        let start = Instant::now();

        if !self.input.exists() {
            anyhow::bail!("Input file does not exist: {}", self.input.display());
        }

        let config = PipelineConfig::new(self.frame_skip, self.show_raw)?;

        info!(
            "Options: frame_skip={}, show_raw={}, languages={}",
            self.frame_skip, self.show_raw, self.languages
        );

        let detector = PlateDetector::new(
            &self.model,
            PlateDetectorConfig {
                confidence_threshold: self.confidence,
                ..Default::default()
            },
        )
        .context("Failed to load plate detection model")?;

        let recognizer = TextRecognizer::new(RecognizerConfig {
            languages: self.languages.clone(),
            ..Default::default()
        })
        .context("Failed to initialize text recognizer")?;

        let mut pipeline = PlatePipeline::new(detector, recognizer, config);
        let report = pipeline
            .process_file(&self.input)
            .with_context(|| format!("Could not process file {}", self.input.display()))?;

        println!(
            "✓ Processed {} frame(s) ({} sampled, {} plate detections) in {:.2}s",
            report.frames_decoded,
            report.frames_sampled,
            report.detections,
            start.elapsed().as_secs_f64()
        );

        if report.texts.is_empty() {
            println!("⚠ No valid text detected");
        } else {
            print_table(&report.texts);

            export::write_csv(&self.csv, &report.texts)
                .with_context(|| format!("Failed to write CSV to {}", self.csv.display()))?;
            println!("Results saved to {}", self.csv.display());
        }

        if let Some(json_path) = &self.json {
            export::write_json_report(json_path, &report)
                .with_context(|| format!("Failed to write report to {}", json_path.display()))?;
            println!("Report saved to {}", json_path.display());
        }

        Ok(())
    }
}

/// Render the result table on stdout
fn print_table(texts: &[String]) {
    println!("\nDetected Text ({} unique)", texts.len());
    for (idx, text) in texts.iter().enumerate() {
        println!("{:>4}  {}", idx + 1, text);
    }
    println!();
}
