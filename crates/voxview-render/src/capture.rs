//! Screen capture: rendering into an owned frame and writing it to disk.
//!
//! The crate does not rasterize; the embedder supplies a [`RenderSurface`]
//! that produces frames at a requested size, and capture handles
//! magnification, anti-aliasing, and file encoding.

use std::path::Path;

use image::{ImageBuffer, Rgba};
use serde::{Deserialize, Serialize};

/// An owned RGBA8 pixel rectangle, row-major with top-left origin.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl FrameBuffer {
    /// Wraps raw RGBA pixel data.
    ///
    /// # Errors
    /// Returns [`CaptureError::InvalidImageData`] if the buffer length does
    /// not match `width * height * 4`.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, CaptureError> {
        if pixels.len() != width as usize * height as usize * 4 {
            return Err(CaptureError::InvalidImageData);
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Creates a frame filled with one RGBA color.
    #[must_use]
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        Self {
            width,
            height,
            pixels: rgba.repeat(width as usize * height as usize),
        }
    }

    /// Returns the width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the raw RGBA bytes.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Returns the RGBA value at (x, y).
    ///
    /// # Panics
    /// Panics if the position is out of range.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    /// Box-filters the frame down by an integer factor. Trailing pixels that
    /// do not fill a full box are discarded.
    #[must_use]
    pub fn downsample(&self, factor: u32) -> FrameBuffer {
        if factor <= 1 {
            return self.clone();
        }
        let out_w = self.width / factor;
        let out_h = self.height / factor;
        let samples = factor * factor;
        let mut pixels = Vec::with_capacity(out_w as usize * out_h as usize * 4);
        for oy in 0..out_h {
            for ox in 0..out_w {
                let mut acc = [0u32; 4];
                for sy in 0..factor {
                    for sx in 0..factor {
                        let p = self.pixel(ox * factor + sx, oy * factor + sy);
                        for (a, v) in acc.iter_mut().zip(p) {
                            *a += u32::from(v);
                        }
                    }
                }
                for a in acc {
                    pixels.push((a / samples) as u8);
                }
            }
        }
        FrameBuffer {
            width: out_w,
            height: out_h,
            pixels,
        }
    }

    fn into_image(self) -> Result<ImageBuffer<Rgba<u8>, Vec<u8>>, CaptureError> {
        ImageBuffer::from_raw(self.width, self.height, self.pixels)
            .ok_or(CaptureError::InvalidImageData)
    }
}

/// Source of rendered frames. Implemented by the embedding application's
/// render window; capture drives it at the sizes it needs.
pub trait RenderSurface {
    /// Renders the current scene into a frame of exactly the given size.
    ///
    /// # Errors
    /// Implementations report failures as [`CaptureError::Render`].
    fn render_frame(&mut self, width: u32, height: u32) -> Result<FrameBuffer, CaptureError>;
}

/// Options for screen capture.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CaptureOptions {
    /// Supersample the render 2x and box-filter back down.
    pub anti_aliasing: bool,
    /// Integer magnification of the output size (clamped to >= 1).
    pub magnification: u32,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            anti_aliasing: false,
            magnification: 1,
        }
    }
}

/// Error type for capture operations.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("failed to save image: {0}")]
    IoError(#[from] std::io::Error),

    #[error("image encoding error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("unsupported image format: {0:?}")]
    UnsupportedFormat(String),

    #[error("invalid image data")]
    InvalidImageData,

    #[error("render failed: {0}")]
    Render(String),
}

/// Renders the scene and writes it to `filename`, format inferred from the
/// extension (png, jpg/jpeg, bmp, tif/tiff).
///
/// The surface is asked for a frame of `magnification x` the given viewport
/// size; with anti-aliasing the render is supersampled 2x on top of that and
/// box-filtered back down.
///
/// # Errors
/// Fails when the surface cannot render, the extension is unsupported, or
/// the file cannot be written.
pub fn capture_to_file(
    surface: &mut dyn RenderSurface,
    viewport_width: u32,
    viewport_height: u32,
    filename: &str,
    options: &CaptureOptions,
) -> Result<(), CaptureError> {
    let magnification = options.magnification.max(1);
    let out_w = viewport_width * magnification;
    let out_h = viewport_height * magnification;
    let supersample = if options.anti_aliasing { 2 } else { 1 };

    let frame = surface.render_frame(out_w * supersample, out_h * supersample)?;
    if frame.width() != out_w * supersample || frame.height() != out_h * supersample {
        return Err(CaptureError::Render(format!(
            "surface returned {}x{} frame, expected {}x{}",
            frame.width(),
            frame.height(),
            out_w * supersample,
            out_h * supersample
        )));
    }
    let frame = if supersample > 1 {
        frame.downsample(supersample)
    } else {
        frame
    };

    log::info!("capturing {}x{} frame to {filename}", frame.width(), frame.height());
    save_frame(frame, Path::new(filename))
}

/// Encodes a frame as PNG in memory.
///
/// # Errors
/// Fails when the frame data is malformed or encoding fails.
pub fn encode_png(frame: FrameBuffer) -> Result<Vec<u8>, CaptureError> {
    let img = frame.into_image()?;
    let mut buffer = std::io::Cursor::new(Vec::new());
    img.write_to(&mut buffer, image::ImageFormat::Png)?;
    Ok(buffer.into_inner())
}

fn save_frame(frame: FrameBuffer, path: &Path) -> Result<(), CaptureError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let img = frame.into_image()?;
    match extension.as_str() {
        "png" => img.save_with_format(path, image::ImageFormat::Png)?,
        "tif" | "tiff" => img.save_with_format(path, image::ImageFormat::Tiff)?,
        // No alpha in these containers.
        "jpg" | "jpeg" => {
            let rgb = image::DynamicImage::ImageRgba8(img).to_rgb8();
            rgb.save_with_format(path, image::ImageFormat::Jpeg)?;
        }
        "bmp" => {
            let rgb = image::DynamicImage::ImageRgba8(img).to_rgb8();
            rgb.save_with_format(path, image::ImageFormat::Bmp)?;
        }
        _ => return Err(CaptureError::UnsupportedFormat(extension)),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Renders a horizontal luminance gradient at any requested size.
    struct GradientSurface;

    impl RenderSurface for GradientSurface {
        fn render_frame(&mut self, width: u32, height: u32) -> Result<FrameBuffer, CaptureError> {
            let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
            for _y in 0..height {
                for x in 0..width {
                    let l = (x * 255 / width.max(1)) as u8;
                    pixels.extend_from_slice(&[l, l, l, 255]);
                }
            }
            FrameBuffer::new(width, height, pixels)
        }
    }

    fn temp_path(name: &str) -> String {
        std::env::temp_dir()
            .join(format!("voxview_capture_{}_{name}", std::process::id()))
            .to_string_lossy()
            .into_owned()
    }

    #[test]
    fn test_frame_buffer_rejects_short_data() {
        assert!(matches!(
            FrameBuffer::new(4, 4, vec![0; 10]),
            Err(CaptureError::InvalidImageData)
        ));
    }

    #[test]
    fn test_downsample_averages_boxes() {
        let mut pixels = Vec::new();
        // 2x2 frame: two black, two white.
        pixels.extend_from_slice(&[0, 0, 0, 255]);
        pixels.extend_from_slice(&[255, 255, 255, 255]);
        pixels.extend_from_slice(&[255, 255, 255, 255]);
        pixels.extend_from_slice(&[0, 0, 0, 255]);
        let frame = FrameBuffer::new(2, 2, pixels).unwrap();
        let small = frame.downsample(2);
        assert_eq!((small.width(), small.height()), (1, 1));
        assert_eq!(small.pixel(0, 0), [127, 127, 127, 255]);
    }

    #[test]
    fn test_capture_png_honors_magnification() {
        let path = temp_path("mag.png");
        let options = CaptureOptions {
            magnification: 3,
            ..CaptureOptions::default()
        };
        capture_to_file(&mut GradientSurface, 20, 10, &path, &options).unwrap();

        let img = image::open(&path).unwrap();
        assert_eq!((img.width(), img.height()), (60, 30));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_capture_with_anti_aliasing_keeps_output_size() {
        let path = temp_path("aa.png");
        let options = CaptureOptions {
            anti_aliasing: true,
            magnification: 1,
        };
        capture_to_file(&mut GradientSurface, 16, 8, &path, &options).unwrap();

        let img = image::open(&path).unwrap();
        assert_eq!((img.width(), img.height()), (16, 8));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_capture_unsupported_extension() {
        let err = capture_to_file(
            &mut GradientSurface,
            8,
            8,
            &temp_path("frame.webp"),
            &CaptureOptions::default(),
        );
        assert!(matches!(err, Err(CaptureError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_capture_unwritable_path_fails() {
        let err = capture_to_file(
            &mut GradientSurface,
            8,
            8,
            "/nonexistent-dir/frame.png",
            &CaptureOptions::default(),
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_encode_png_round_trips() {
        let frame = FrameBuffer::filled(5, 4, [10, 20, 30, 255]);
        let bytes = encode_png(frame).unwrap();
        let img = image::load_from_memory(&bytes).unwrap();
        assert_eq!((img.width(), img.height()), (5, 4));
    }
}
