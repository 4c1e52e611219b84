use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::SystemTime;

/// Pixel layout of a raw frame pulled from a camera stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameFormat {
    /// Motion JPEG, one compressed image per frame
    Mjpeg,
    /// Packed 8-bit RGB
    Rgb24,
}

impl FrameFormat {
    /// Get bytes per pixel for the format
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            FrameFormat::Mjpeg => 0, // Variable size, compressed
            FrameFormat::Rgb24 => 3,
        }
    }

    pub fn is_compressed(&self) -> bool {
        matches!(self, FrameFormat::Mjpeg)
    }
}

/// A frame as it came off the stream, at the stream's native resolution
#[derive(Debug, Clone)]
pub struct FrameData {
    pub id: u64,
    pub timestamp: SystemTime,
    pub data: Arc<Vec<u8>>,
    pub width: u32,
    pub height: u32,
    pub format: FrameFormat,
}

impl FrameData {
    pub fn new(
        id: u64,
        timestamp: SystemTime,
        data: Vec<u8>,
        width: u32,
        height: u32,
        format: FrameFormat,
    ) -> Self {
        Self {
            id,
            timestamp,
            data: Arc::new(data),
            width,
            height,
            format,
        }
    }

    /// Get the expected frame size for uncompressed formats
    pub fn expected_size(&self) -> Option<usize> {
        if self.format.is_compressed() {
            None
        } else {
            Some(self.width as usize * self.height as usize * self.format.bytes_per_pixel())
        }
    }

    /// Validate frame data size against expected size
    pub fn validate_size(&self) -> bool {
        match self.expected_size() {
            Some(expected) => self.data.len() == expected,
            None => !self.data.is_empty(),
        }
    }
}

/// Encoded still ready for submission.
///
/// Produced once per completed countdown and moved into the submitter; the
/// payload is never retained after the request is built.
#[derive(Clone, PartialEq, Eq)]
pub struct CapturedFrame {
    /// Base64 of the JPEG bytes, without a `data:` URL prefix
    pub image_base64: String,
    pub width: u32,
    pub height: u32,
    pub captured_at: SystemTime,
}

impl CapturedFrame {
    /// `data:image/jpeg;base64,...` form used by the preview surface
    pub fn data_url(&self) -> String {
        format!("data:image/jpeg;base64,{}", self.image_base64)
    }
}

impl std::fmt::Debug for CapturedFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapturedFrame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("payload_len", &self.image_base64.len())
            .finish()
    }
}
