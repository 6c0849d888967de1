//! Video frame types and processing

use std::io::Cursor;
use std::str::FromStr;

use image::{DynamicImage, GrayImage, ImageFormat, ImageReader, RgbImage, RgbaImage};

use crate::FrameError;

/// Pixel format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// Packed 8-bit RGB
    Rgb24,
    /// Packed 8-bit RGBA
    Rgba32,
    /// Single 8-bit luma plane
    Gray8,
    /// YUV 4:2:0, full Y plane followed by interleaved VU (camera native)
    Nv21,
    /// JPEG compressed frame
    Mjpeg,
    H264,
}

impl PixelFormat {
    /// Expected buffer length for raw formats, `None` for compressed formats
    pub fn expected_len(&self, width: u32, height: u32) -> Option<usize> {
        let w = width as usize;
        let h = height as usize;
        let pixels = w.checked_mul(h)?;
        match self {
            PixelFormat::Rgb24 => pixels.checked_mul(3),
            PixelFormat::Rgba32 => pixels.checked_mul(4),
            PixelFormat::Gray8 => Some(pixels),
            PixelFormat::Nv21 => {
                let chroma = w.div_ceil(2).checked_mul(h.div_ceil(2))?.checked_mul(2)?;
                pixels.checked_add(chroma)
            }
            PixelFormat::Mjpeg | PixelFormat::H264 => None,
        }
    }

    /// Whether frames in this format can be decoded to RGB
    pub fn is_decodable(&self) -> bool {
        !matches!(self, PixelFormat::H264)
    }
}

impl FromStr for PixelFormat {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rgb24" | "rgb" => Ok(PixelFormat::Rgb24),
            "rgba32" | "rgba" => Ok(PixelFormat::Rgba32),
            "gray8" | "gray" => Ok(PixelFormat::Gray8),
            "nv21" => Ok(PixelFormat::Nv21),
            "mjpeg" | "jpeg" => Ok(PixelFormat::Mjpeg),
            "h264" => Ok(PixelFormat::H264),
            _ => Err(FrameError::UnknownFormat(s.to_string())),
        }
    }
}

/// Camera frame as delivered by the capture collaborator
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// Pixel data in `format` layout
    pub data: Vec<u8>,
    /// Frame width
    pub width: u32,
    /// Frame height
    pub height: u32,
    /// Pixel layout of `data`
    pub format: PixelFormat,
    /// Capture timestamp (nanoseconds)
    pub timestamp_ns: u64,
    /// Frame sequence number
    pub sequence: u64,
}

impl VideoFrame {
    /// Create a new video frame
    pub fn new(
        data: Vec<u8>,
        width: u32,
        height: u32,
        format: PixelFormat,
        timestamp_ns: u64,
        sequence: u64,
    ) -> Self {
        Self {
            data,
            width,
            height,
            format,
            timestamp_ns,
            sequence,
        }
    }

    /// Create an RGB frame (timestamp and sequence zeroed)
    pub fn rgb(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self::new(data, width, height, PixelFormat::Rgb24, 0, 0)
    }

    /// Check that the buffer is usable for detection
    pub fn validate(&self) -> Result<(), FrameError> {
        if self.data.is_empty() {
            return Err(FrameError::Empty);
        }
        if self.width == 0 || self.height == 0 {
            return Err(FrameError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if !self.format.is_decodable() {
            return Err(FrameError::Unsupported(self.format));
        }
        if let Some(expected) = self.format.expected_len(self.width, self.height) {
            if self.data.len() != expected {
                return Err(FrameError::LengthMismatch {
                    expected,
                    actual: self.data.len(),
                });
            }
        }
        if self.format == PixelFormat::Mjpeg {
            // Header only; boxes are scaled by the declared size
            let reader = ImageReader::with_format(Cursor::new(self.data.as_slice()), ImageFormat::Jpeg);
            let decoded = reader
                .into_dimensions()
                .map_err(|e| FrameError::Decode(e.to_string()))?;
            if decoded != (self.width, self.height) {
                return Err(FrameError::InvalidDimensions {
                    width: self.width,
                    height: self.height,
                });
            }
        }
        Ok(())
    }

    /// Decode to a packed RGB image
    pub fn to_rgb(&self) -> Result<RgbImage, FrameError> {
        self.validate()?;
        let size_err = || FrameError::Decode("buffer does not match dimensions".into());

        let rgb = match self.format {
            PixelFormat::Rgb24 => {
                RgbImage::from_raw(self.width, self.height, self.data.clone()).ok_or_else(size_err)?
            }
            PixelFormat::Rgba32 => {
                let rgba = RgbaImage::from_raw(self.width, self.height, self.data.clone())
                    .ok_or_else(size_err)?;
                DynamicImage::ImageRgba8(rgba).to_rgb8()
            }
            PixelFormat::Gray8 => {
                let gray = GrayImage::from_raw(self.width, self.height, self.data.clone())
                    .ok_or_else(size_err)?;
                DynamicImage::ImageLuma8(gray).to_rgb8()
            }
            PixelFormat::Nv21 => nv21_to_rgb(&self.data, self.width, self.height),
            PixelFormat::Mjpeg => {
                let img = image::load_from_memory_with_format(&self.data, ImageFormat::Jpeg)
                    .map_err(|e| FrameError::Decode(e.to_string()))?;
                img.to_rgb8()
            }
            PixelFormat::H264 => return Err(FrameError::Unsupported(self.format)),
        };

        Ok(rgb)
    }

    /// Average luminance normalized to [0, 1]
    pub fn mean_luminance(&self) -> Result<f32, FrameError> {
        self.validate()?;
        let pixel_count = (self.width as usize) * (self.height as usize);

        let sum: u64 = match self.format {
            // Luma plane comes first for both layouts
            PixelFormat::Gray8 | PixelFormat::Nv21 => {
                self.data[..pixel_count].iter().map(|&y| y as u64).sum()
            }
            PixelFormat::Rgb24 => self.data.chunks_exact(3).map(luma).sum(),
            PixelFormat::Rgba32 => self.data.chunks_exact(4).map(luma).sum(),
            PixelFormat::Mjpeg | PixelFormat::H264 => {
                let rgb = self.to_rgb()?;
                let decoded_pixels = rgb.width() as usize * rgb.height() as usize;
                let sum: u64 = rgb.as_raw().chunks_exact(3).map(luma).sum();
                return Ok(sum as f32 / (decoded_pixels.max(1) as f32 * 255.0));
            }
        };

        Ok(sum as f32 / (pixel_count as f32 * 255.0))
    }
}

/// Luminance formula: 0.299*R + 0.587*G + 0.114*B
fn luma(pixel: &[u8]) -> u64 {
    (pixel[0] as f32 * 0.299 + pixel[1] as f32 * 0.587 + pixel[2] as f32 * 0.114) as u64
}

/// BT.601 conversion of an NV21 buffer, caller has validated the length
fn nv21_to_rgb(data: &[u8], width: u32, height: u32) -> RgbImage {
    let w = width as usize;
    let h = height as usize;
    let chroma_stride = w.div_ceil(2) * 2;
    let (luma_plane, chroma_plane) = data.split_at(w * h);

    RgbImage::from_fn(width, height, |x, y| {
        let (x, y) = (x as usize, y as usize);
        let c = luma_plane[y * w + x] as f32;
        let uv = (y / 2) * chroma_stride + (x / 2) * 2;
        let v = chroma_plane[uv] as f32 - 128.0;
        let u = chroma_plane[uv + 1] as f32 - 128.0;

        let r = c + 1.402 * v;
        let g = c - 0.344_136 * u - 0.714_136 * v;
        let b = c + 1.772 * u;
        image::Rgb([
            r.clamp(0.0, 255.0) as u8,
            g.clamp(0.0, 255.0) as u8,
            b.clamp(0.0, 255.0) as u8,
        ])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_validate_rejects_empty_buffer() {
        let frame = VideoFrame::rgb(vec![], 4, 4);
        assert_eq!(frame.validate(), Err(FrameError::Empty));
    }

    #[test]
    fn test_validate_rejects_length_mismatch() {
        let frame = VideoFrame::rgb(vec![0; 10], 4, 4);
        assert_eq!(
            frame.validate(),
            Err(FrameError::LengthMismatch { expected: 48, actual: 10 })
        );
    }

    #[test]
    fn test_validate_rejects_h264() {
        let frame = VideoFrame::new(vec![0; 64], 4, 4, PixelFormat::H264, 0, 0);
        assert_eq!(frame.validate(), Err(FrameError::Unsupported(PixelFormat::H264)));
        assert!(frame.to_rgb().is_err());
    }

    #[test]
    fn test_pixel_format_from_str() {
        assert_eq!("NV21".parse::<PixelFormat>(), Ok(PixelFormat::Nv21));
        assert_eq!("jpeg".parse::<PixelFormat>(), Ok(PixelFormat::Mjpeg));
        assert_eq!(
            "yuv444".parse::<PixelFormat>(),
            Err(FrameError::UnknownFormat("yuv444".to_string()))
        );
    }

    #[test]
    fn test_nv21_expected_len_odd_dimensions() {
        // 3x3 luma + 2x2 chroma pairs
        assert_eq!(PixelFormat::Nv21.expected_len(3, 3), Some(9 + 8));
        assert_eq!(PixelFormat::Nv21.expected_len(4, 2), Some(8 + 4));
    }

    #[test]
    fn test_nv21_neutral_chroma_is_gray() {
        let mut data = vec![200u8; 4 * 2];
        data.extend_from_slice(&[128u8; 4]);
        let frame = VideoFrame::new(data, 4, 2, PixelFormat::Nv21, 0, 0);

        let rgb = frame.to_rgb().unwrap();
        assert_eq!(rgb.dimensions(), (4, 2));
        assert_eq!(rgb.get_pixel(3, 1).0, [200, 200, 200]);
    }

    #[test]
    fn test_mean_luminance_white_and_black() {
        let white = VideoFrame::rgb(vec![255; 2 * 2 * 3], 2, 2);
        let black = VideoFrame::rgb(vec![0; 2 * 2 * 3], 2, 2);

        assert!(white.mean_luminance().unwrap() > 0.99);
        assert_eq!(black.mean_luminance().unwrap(), 0.0);
    }

    #[test]
    fn test_mean_luminance_uses_luma_plane() {
        let mut data = vec![51u8; 4];
        data.extend_from_slice(&[0u8; 2]);
        let frame = VideoFrame::new(data, 2, 2, PixelFormat::Nv21, 0, 0);

        assert!((frame.mean_luminance().unwrap() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_rgba_drops_alpha() {
        let frame = VideoFrame::new(vec![10, 20, 30, 255], 1, 1, PixelFormat::Rgba32, 0, 0);
        assert_eq!(frame.to_rgb().unwrap().get_pixel(0, 0).0, [10, 20, 30]);
    }

    fn jpeg(width: u32, height: u32) -> Vec<u8> {
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb([200, 200, 200])))
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Jpeg)
            .unwrap();
        buf
    }

    #[test]
    fn test_mjpeg_declared_size_must_match() {
        let data = jpeg(8, 4);

        let frame = VideoFrame::new(data.clone(), 8, 4, PixelFormat::Mjpeg, 0, 0);
        assert!(frame.validate().is_ok());
        assert_eq!(frame.to_rgb().unwrap().dimensions(), (8, 4));

        let frame = VideoFrame::new(data, 16, 8, PixelFormat::Mjpeg, 0, 0);
        assert_eq!(
            frame.validate(),
            Err(FrameError::InvalidDimensions {
                width: 16,
                height: 8
            })
        );
        assert!(frame.mean_luminance().is_err());
    }

    #[test]
    fn test_mjpeg_garbage_rejected() {
        let frame = VideoFrame::new(vec![1, 2, 3, 4], 2, 2, PixelFormat::Mjpeg, 0, 0);
        assert!(matches!(frame.validate(), Err(FrameError::Decode(_))));
    }

    proptest! {
        #[test]
        fn prop_uniform_gray_luminance(value: u8, width in 1u32..16, height in 1u32..16) {
            let frame = VideoFrame::new(
                vec![value; (width * height) as usize],
                width,
                height,
                PixelFormat::Gray8,
                0,
                0,
            );
            let luminance = frame.mean_luminance().unwrap();
            prop_assert!((luminance - value as f32 / 255.0).abs() < 1e-5);
        }
    }
}
