/// Video frame decoder
///
/// Streams decoded frames out of a video file one at a time, converted to
/// RGB24, in presentation order. Uses multi-threaded software decoding via
/// libavcodec (`ffmpeg-next`).
///
/// The decode loop is deliberately forgiving: a packet that fails to decode
/// is skipped, and a truncated or corrupt tail simply ends the stream, so
/// callers see a shorter stream rather than an error. Only failure to open
/// the input or to set up the decoder is reported.
use ffmpeg_next as ffmpeg;
use image::RgbImage;
use std::path::Path;
use tracing::{debug, warn};

use plate_ocr_common::{ProcessingError, Result};

/// Decoded video frame in RGB24
#[derive(Debug, Clone)]
pub struct Frame {
    /// Frame number (0-indexed, counts every decoded frame)
    pub frame_number: u64,
    /// Frame timestamp in seconds
    pub timestamp: f64,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Raw RGB24 data (row-major, 3 bytes per pixel)
    pub data: Vec<u8>,
}

impl Frame {
    /// Convert into an `image::RgbImage`
    ///
    /// # Errors
    ///
    /// Returns `ProcessingError::ImageError` if the buffer length does not
    /// match the stated dimensions.
    pub fn into_rgb_image(self) -> Result<RgbImage> {
        let (width, height) = (self.width, self.height);
        RgbImage::from_raw(width, height, self.data).ok_or_else(|| {
            ProcessingError::ImageError(format!(
                "frame buffer does not match {width}x{height} RGB24"
            ))
        })
    }
}

/// Initialize `FFmpeg` library
fn init_ffmpeg() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        ffmpeg::init().expect("Failed to initialize FFmpeg");
    });
}

/// Decode a video file, invoking `on_frame` for every decoded frame
///
/// Returns the total number of frames handed to the callback. The decoder,
/// scaler, and demuxer are dropped (and the file handle released) on every
/// exit path, normal or early.
///
/// # Errors
///
/// Returns an error if:
/// - The input file cannot be opened
/// - No video stream is found
/// - The decoder or scaler cannot be created
/// - The callback itself returns an error
#[allow(clippy::cast_precision_loss)]
pub fn decode_frames<F>(input_path: &Path, mut on_frame: F) -> Result<u64>
where
    F: FnMut(Frame) -> Result<()>,
{
    init_ffmpeg();

    let mut ictx = ffmpeg::format::input(&input_path)
        .map_err(|e| ProcessingError::FFmpegError(format!("Failed to open input file: {e}")))?;

    let video_stream = ictx
        .streams()
        .best(ffmpeg::media::Type::Video)
        .ok_or(ProcessingError::NoVideoStream)?;

    let stream_index = video_stream.index();
    let time_base = video_stream.time_base();
    let codec_params = video_stream.parameters();

    let mut decoder = ffmpeg::codec::context::Context::from_parameters(codec_params)
        .map_err(|e| ProcessingError::FFmpegError(format!("Failed to create context: {e}")))?
        .decoder()
        .video()
        .map_err(|e| ProcessingError::FFmpegError(format!("Failed to create decoder: {e}")))?;

    let width = decoder.width();
    let height = decoder.height();
    let src_format = decoder.format();

    let mut scaler = ffmpeg::software::scaling::Context::get(
        src_format,
        width,
        height,
        ffmpeg::format::Pixel::RGB24,
        width,
        height,
        ffmpeg::software::scaling::Flags::BILINEAR,
    )
    .map_err(|e| ProcessingError::FFmpegError(format!("Failed to create scaler: {e}")))?;

    let mut frame_number = 0u64;
    let mut decoded_frame = ffmpeg::util::frame::video::Video::empty();
    let mut converted_frame = ffmpeg::util::frame::video::Video::empty();

    for (stream, packet) in ictx.packets() {
        if stream.index() != stream_index {
            continue;
        }

        // Undecodable packets are skipped, not fatal
        if decoder.send_packet(&packet).is_err() {
            warn!("Skipping undecodable packet at frame {}", frame_number);
            continue;
        }

        while decoder.receive_frame(&mut decoded_frame).is_ok() {
            emit_frame(
                &decoded_frame,
                &mut converted_frame,
                &mut scaler,
                time_base,
                &mut frame_number,
                &mut on_frame,
            )?;
        }
    }

    // Flush decoder
    decoder.send_eof().ok();
    while decoder.receive_frame(&mut decoded_frame).is_ok() {
        emit_frame(
            &decoded_frame,
            &mut converted_frame,
            &mut scaler,
            time_base,
            &mut frame_number,
            &mut on_frame,
        )?;
    }

    debug!("Decoded {} frames from {:?}", frame_number, input_path);

    Ok(frame_number)
}

/// Convert one decoded frame to RGB24 and hand it to the callback
#[allow(clippy::cast_precision_loss)]
fn emit_frame<F>(
    decoded_frame: &ffmpeg::util::frame::video::Video,
    converted_frame: &mut ffmpeg::util::frame::video::Video,
    scaler: &mut ffmpeg::software::scaling::Context,
    time_base: ffmpeg::Rational,
    frame_number: &mut u64,
    on_frame: &mut F,
) -> Result<()>
where
    F: FnMut(Frame) -> Result<()>,
{
    let timestamp = decoded_frame.timestamp().unwrap_or(0) as f64 * f64::from(time_base.0)
        / f64::from(time_base.1);

    scaler
        .run(decoded_frame, converted_frame)
        .map_err(|e| ProcessingError::FFmpegError(format!("Failed to convert frame: {e}")))?;

    let data = copy_rgb_frame_data(converted_frame);

    let frame = Frame {
        frame_number: *frame_number,
        timestamp,
        width: converted_frame.width(),
        height: converted_frame.height(),
        data,
    };
    *frame_number += 1;

    on_frame(frame)
}

/// Copy RGB24 frame data from an `FFmpeg` frame to a contiguous buffer
///
/// Strides can be wider than the row payload, so rows are copied
/// individually.
fn copy_rgb_frame_data(frame: &ffmpeg::util::frame::video::Video) -> Vec<u8> {
    let width = frame.width() as usize;
    let height = frame.height() as usize;
    let stride = frame.stride(0);
    let plane_data = frame.data(0);

    let mut data = Vec::with_capacity(width * height * 3);
    for y in 0..height {
        let row_start = y * stride;
        let row_end = row_start + (width * 3);
        data.extend_from_slice(&plane_data[row_start..row_end]);
    }
    data
}
