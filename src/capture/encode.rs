use crate::error::DeviceError;
use crate::frame::{CapturedFrame, FrameData, FrameFormat};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, ImageFormat};
use std::borrow::Cow;
use tracing::debug;

/// Encode a raw frame as a base64 JPEG still at its native resolution.
///
/// MJPEG frames are decoded and re-encoded so that every payload carries the
/// requested quality.
pub fn encode_frame(frame: &FrameData, quality: u8) -> Result<CapturedFrame, DeviceError> {
    if !frame.validate_size() {
        return Err(DeviceError::FrameEncoding {
            details: format!(
                "Frame {} has {} bytes, expected {:?}",
                frame.id,
                frame.data.len(),
                frame.expected_size()
            ),
        });
    }

    // MJPEG headers are authoritative over the dimensions the stream reported
    let (rgb, width, height): (Cow<'_, [u8]>, u32, u32) = match frame.format {
        FrameFormat::Rgb24 => (Cow::Borrowed(frame.data.as_slice()), frame.width, frame.height),
        FrameFormat::Mjpeg => {
            let decoded = image::load_from_memory_with_format(&frame.data, ImageFormat::Jpeg)
                .map_err(|e| DeviceError::FrameEncoding {
                    details: format!("Failed to decode MJPEG frame {}: {}", frame.id, e),
                })?
                .to_rgb8();
            let (width, height) = decoded.dimensions();
            if (width, height) != (frame.width, frame.height) {
                debug!(
                    "Frame {} decoded as {}x{}, stream reported {}x{}",
                    frame.id, width, height, frame.width, frame.height
                );
            }
            (Cow::Owned(decoded.into_raw()), width, height)
        }
    };

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, quality)
        .encode(&rgb, width, height, ColorType::Rgb8)
        .map_err(|e| DeviceError::FrameEncoding {
            details: format!("Failed to encode frame {}: {}", frame.id, e),
        })?;

    debug!(
        "Encoded frame {} as JPEG ({}x{}, q={}, {} bytes)",
        frame.id,
        width,
        height,
        quality,
        jpeg.len()
    );

    Ok(CapturedFrame {
        image_base64: STANDARD.encode(&jpeg),
        width,
        height,
        captured_at: frame.timestamp,
    })
}
