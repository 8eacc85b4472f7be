//! Camera capture
//!
//! The capture surface is an external collaborator (webcam, IP camera,
//! still file), so it sits behind the [`FrameSource`] trait. Frames are
//! validated on construction: anything that does not decode to a non-empty
//! raster is rejected as unavailable.

mod snapshot;
mod still;

pub use snapshot::SnapshotCamera;
pub use still::StillImage;

use base64::Engine;
use chrono::{DateTime, Utc};

use crate::{Error, Result};

/// A timestamped raster image ready for transport
///
/// Holds the encoded bytes (JPEG or PNG) rather than raw pixels; frames are
/// produced, sent to the vision model, and dropped — never retained.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// MIME type of the encoded bytes
    pub mime: &'static str,
    /// Encoded image bytes
    pub data: Vec<u8>,
    /// Capture timestamp
    pub captured_at: DateTime<Utc>,
}

impl Frame {
    /// Build a frame from encoded image bytes, validating the payload
    ///
    /// # Errors
    ///
    /// Returns `Error::Camera` if the bytes do not decode or the image has
    /// zero dimensions (a stream that has not produced a usable frame yet)
    pub fn from_encoded(data: Vec<u8>) -> Result<Self> {
        let format = image::guess_format(&data)
            .map_err(|e| Error::Camera(format!("unrecognized frame payload: {e}")))?;

        let mime = match format {
            image::ImageFormat::Png => "image/png",
            image::ImageFormat::Jpeg => "image/jpeg",
            other => {
                return Err(Error::Camera(format!(
                    "unsupported frame format: {other:?}"
                )));
            }
        };

        let img = image::load_from_memory_with_format(&data, format)
            .map_err(|e| Error::Camera(format!("frame decode failed: {e}")))?;

        let (width, height) = (img.width(), img.height());
        if width == 0 || height == 0 {
            return Err(Error::Camera("frame has zero dimensions".to_string()));
        }

        Ok(Self {
            width,
            height,
            mime,
            data,
            captured_at: Utc::now(),
        })
    }

    /// Encode the frame for the wire: raw base64, no data-URL prefix
    #[must_use]
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.data)
    }
}

/// Source of camera frames
///
/// `capture` fails with `Error::Camera` when no usable frame is available;
/// the control loop treats that as "skip this tick", not as a fault.
#[async_trait::async_trait]
pub trait FrameSource: Send + Sync {
    /// Capture the current frame
    async fn capture(&self) -> Result<Frame>;
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal valid 1x1 PNG
    pub(crate) fn tiny_png() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(1, 1, image::Rgb([255, 0, 0]));
        let mut bytes = Vec::new();
        img.write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )
        .unwrap();
        bytes
    }

    #[test]
    fn test_frame_from_png() {
        let frame = Frame::from_encoded(tiny_png()).unwrap();
        assert_eq!(frame.width, 1);
        assert_eq!(frame.height, 1);
        assert_eq!(frame.mime, "image/png");
    }

    #[test]
    fn test_frame_rejects_garbage() {
        let err = Frame::from_encoded(vec![0, 1, 2, 3]).unwrap_err();
        assert!(matches!(err, Error::Camera(_)));
    }

    #[test]
    fn test_base64_has_no_data_url_prefix() {
        let frame = Frame::from_encoded(tiny_png()).unwrap();
        let encoded = frame.to_base64();
        assert!(!encoded.starts_with("data:"));
        assert!(!encoded.is_empty());
    }
}
